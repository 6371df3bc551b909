//! # HCO WebAssembly Bindings
//!
//! JavaScript-friendly bindings to the game engine using wasm-bindgen. The
//! page owns keyboard handling, layout and colours; it maps key presses to
//! direction codes and renders whatever board this wrapper hands back.

use hco_core::{Cell, Direction, Element, Game, StepResult};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of a step operation, serialized for JavaScript.
#[derive(Serialize)]
pub struct JsStepResult {
    /// The updated board (16 cells, row-major): "H", "C", "O" or null.
    pub board: Vec<Cell>,
    /// Current total score.
    pub score: u32,
    /// Points earned from this move.
    pub reward: u32,
    /// Whether the board changed.
    pub changed: bool,
    /// Whether the game is over.
    pub done: bool,
}

/// WebAssembly wrapper for the game.
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game with the given seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WasmGame {
        WasmGame {
            game: Game::new(seed),
        }
    }

    /// Start over with a fresh board, reseeding the spawner.
    pub fn restart(&mut self, seed: u64) {
        self.game.reset(seed);
    }

    /// Execute a move in the given direction.
    ///
    /// Direction codes: 0 = Up, 1 = Down, 2 = Left, 3 = Right. Any other
    /// code leaves the game untouched.
    pub fn step(&mut self, direction: u8) -> JsValue {
        let result = match Direction::from_u8(direction) {
            Some(direction) => self.game.step(direction),
            None => StepResult {
                changed: false,
                reward: 0,
                done: self.game.is_done(),
            },
        };
        self.create_js_result(result)
    }

    /// Execute a move named by a key or word ("left", "w", ...).
    #[wasm_bindgen(js_name = stepNamed)]
    pub fn step_named(&mut self, name: &str) -> JsValue {
        let result = self.game.step_named(name);
        self.create_js_result(result)
    }

    /// Get the board as 16 codes: 0 = empty, 1 = H, 2 = C, 3 = O.
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> Vec<u8> {
        self.game
            .board()
            .cells()
            .iter()
            .map(|cell| cell.map_or(0, |element| element.index() as u8 + 1))
            .collect()
    }

    /// Get the board as symbols ("H", "C", "O", or "" for empty).
    #[wasm_bindgen(js_name = getSymbols)]
    pub fn get_symbols(&self) -> Vec<String> {
        self.game
            .board()
            .cells()
            .iter()
            .map(|cell| cell.map(|element| element.to_string()).unwrap_or_default())
            .collect()
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u32 {
        self.game.score()
    }

    #[wasm_bindgen(js_name = isDone)]
    pub fn is_done(&self) -> bool {
        self.game.is_done()
    }

    /// The furthest element reached, as a code (see `getBoard`).
    #[wasm_bindgen(js_name = getMaxElement)]
    pub fn get_max_element(&self) -> u8 {
        self.game
            .max_element()
            .map_or(0, |element: Element| element.index() as u8 + 1)
    }

    /// Get legal moves as an array of 4 flags [Up, Down, Left, Right].
    #[wasm_bindgen(js_name = getLegalActions)]
    pub fn get_legal_actions(&self) -> Vec<u8> {
        self.game
            .legal_moves()
            .iter()
            .map(|&legal| u8::from(legal))
            .collect()
    }

    fn create_js_result(&self, result: StepResult) -> JsValue {
        let js_result = JsStepResult {
            board: self.game.board().cells().to_vec(),
            score: self.game.score(),
            reward: result.reward,
            changed: result.changed,
            done: result.done,
        };
        serde_wasm_bindgen::to_value(&js_result).unwrap_or(JsValue::NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_codes() {
        let game = WasmGame::new(42);
        let codes = game.get_board();
        assert_eq!(codes.len(), 16);
        assert_eq!(codes.iter().filter(|&&c| c == 1).count(), 2);
        assert!(codes.iter().all(|&c| c <= 1));
        assert_eq!(game.get_max_element(), 1);
    }

    #[test]
    fn test_symbols_match_codes() {
        let game = WasmGame::new(7);
        for (code, symbol) in game.get_board().iter().zip(game.get_symbols()) {
            assert_eq!(*code == 1, symbol == "H");
            assert_eq!(*code == 0, symbol.is_empty());
        }
    }

    #[test]
    fn test_legal_actions_are_flags() {
        let game = WasmGame::new(3);
        let legal = game.get_legal_actions();
        assert_eq!(legal.len(), 4);
        assert!(legal.iter().all(|&flag| flag <= 1));
        assert!(legal.contains(&1));
    }
}
