//! # HCO Game Core Engine
//!
//! A pure Rust implementation of a 2048 variant where tiles advance
//! through the element progression `H -> C -> O` instead of doubling.
//! Randomness is injected, so games are reproducible from a seed, and the
//! whole game state is a small `Copy` snapshot replaced on every move.
//!
//! All four directions share one slide primitive: the board is rotated so
//! the requested direction points left, slid left, and rotated back.
//!
//! ## Example
//!
//! ```rust
//! use hco_core::{Direction, Game};
//!
//! let mut game = Game::new(42); // Create game with seed 42
//! let result = game.step(Direction::Left);
//! println!("Score: {}, Changed: {}", game.score(), result.changed);
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

pub mod board;
pub mod element;
mod error;

pub use board::{Board, Cell};
pub use element::Element;
pub use error::{Error, Result};

/// The four move directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

/// Clockwise quarter-turns that restore a board's orientation after it was
/// slid left, indexed by `Direction as usize`. The board is first turned by
/// the complement so the direction points left.
const RESTORE_TURNS: [u8; 4] = [
    1, // Up
    3, // Down
    0, // Left
    2, // Right
];

impl Direction {
    /// All four directions, in the order used by [`GameState::legal_moves`].
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        Self::ALL.get(value as usize).copied()
    }

    /// Rotation count for this direction: left 0, up 1, right 2, down 3.
    pub fn rotations(self) -> u8 {
        RESTORE_TURNS[self as usize]
    }
}

impl std::str::FromStr for Direction {
    type Err = Error;

    /// Accepts `up/down/left/right` and the `w/s/a/d` keys, any case.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            _ => Err(Error::UnknownDirection(s.to_string())),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Slide a board in `direction` without spawning, returning the moved
/// board and the merge points.
pub fn slide(board: &Board, direction: Direction) -> (Board, u32) {
    let turns = direction.rotations();
    let (moved, reward) = board.rotate(4 - turns).move_left();
    (moved.rotate(turns), reward)
}

/// True if no direction changes the board.
pub fn is_stuck(board: &Board) -> bool {
    Direction::ALL
        .iter()
        .all(|&direction| slide(board, direction).0 == *board)
}

/// Result of executing a step (move) in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub reward: u32,
    /// Whether the game is over (no legal moves remaining).
    pub done: bool,
}

/// An immutable snapshot of a game: board, score and game-over flag.
///
/// Moves never patch a snapshot; they produce the next one. Deserializing
/// recomputes the game-over flag from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SavedState")]
pub struct GameState {
    board: Board,
    score: u32,
    game_over: bool,
}

/// Serialized form of a [`GameState`]; any `game_over` field is ignored.
#[derive(Deserialize)]
struct SavedState {
    board: Board,
    score: u32,
}

impl From<SavedState> for GameState {
    fn from(saved: SavedState) -> Self {
        GameState::from_board(saved.board, saved.score)
    }
}

impl GameState {
    /// A fresh game: two `H` tiles on an otherwise empty board, score 0.
    pub fn initialize<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let board = Board::EMPTY.with_random_tile(rng).with_random_tile(rng);
        Self::from_board(board, 0)
    }

    /// Wrap an arbitrary board, deriving the game-over flag from it.
    pub fn from_board(board: Board, score: u32) -> Self {
        GameState {
            board,
            score,
            game_over: is_stuck(&board),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Whether a move in `direction` would change the board.
    pub fn can_move(&self, direction: Direction) -> bool {
        slide(&self.board, direction).0 != self.board
    }

    /// The legal moves as a boolean array [Up, Down, Left, Right].
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|direction| self.can_move(direction))
    }

    /// Compute the state after moving in `direction`.
    ///
    /// A move on a finished game, or one that leaves the board as it was,
    /// returns `self` untouched. Otherwise one tile is spawned, the merge
    /// points are added, and the new board is probed for any legal move.
    pub fn apply<R: Rng + ?Sized>(self, direction: Direction, rng: &mut R) -> (Self, StepResult) {
        let unchanged = StepResult {
            changed: false,
            reward: 0,
            done: self.game_over,
        };
        if self.game_over {
            return (self, unchanged);
        }

        let (moved, reward) = slide(&self.board, direction);
        if moved == self.board {
            trace!(%direction, "move has no effect");
            return (self, unchanged);
        }

        let score = self.score.saturating_add(reward);
        let next = Self::from_board(moved.with_random_tile(rng), score);
        let result = StepResult {
            changed: true,
            reward,
            done: next.game_over,
        };
        (next, result)
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        write!(f, "{}", self.board)
    }
}

/// The move orchestrator: owns the current [`GameState`] and the random
/// source used for spawning, and swaps in a new state on each move.
#[derive(Clone)]
pub struct Game<R = SmallRng> {
    state: GameState,
    rng: R,
}

impl Game<SmallRng> {
    /// Create a new game with the given seed.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    /// Reset the game to initial state with a new seed.
    pub fn reset(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
        self.restart();
    }
}

impl<R: Rng> Game<R> {
    /// Start a game drawing its randomness from `rng`.
    pub fn with_rng(mut rng: R) -> Self {
        let state = GameState::initialize(&mut rng);
        Game { state, rng }
    }

    /// Resume from an existing snapshot.
    pub fn from_state(state: GameState, rng: R) -> Self {
        Game { state, rng }
    }

    /// Throw the current game away and deal a fresh board.
    pub fn restart(&mut self) {
        self.state = GameState::initialize(&mut self.rng);
        debug!("game restarted");
    }

    /// Execute a move in the given direction.
    ///
    /// If the move doesn't change the board, nothing happens: no tile is
    /// spawned and the score stays put.
    #[instrument(level = "debug", skip(self), fields(score = self.state.score))]
    pub fn step(&mut self, direction: Direction) -> StepResult {
        let (next, result) = self.state.apply(direction, &mut self.rng);
        if result.changed {
            debug!(reward = result.reward, "move accepted");
            if result.done {
                debug!(score = next.score, "game over");
            }
        }
        self.state = next;
        result
    }

    /// Execute a move named by text input; unrecognized names are a no-op.
    pub fn step_named(&mut self, name: &str) -> StepResult {
        match name.parse::<Direction>() {
            Ok(direction) => self.step(direction),
            Err(err) => {
                debug!(%err, "ignoring input");
                StepResult {
                    changed: false,
                    reward: 0,
                    done: self.state.game_over,
                }
            }
        }
    }
}

impl<R> Game<R> {
    /// The current snapshot.
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Check if the game is over (no legal moves available).
    pub fn is_done(&self) -> bool {
        self.state.game_over
    }

    /// Get the legal moves as a boolean array [Up, Down, Left, Right].
    pub fn legal_moves(&self) -> [bool; 4] {
        self.state.legal_moves()
    }

    pub fn max_element(&self) -> Option<Element> {
        self.state.board.max_element()
    }

    pub fn empty_count(&self) -> usize {
        self.state.board.empty_count()
    }
}

impl<R> std::fmt::Debug for Game<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game").field("state", &self.state).finish()
    }
}

impl<R> std::fmt::Display for Game<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.state)
    }
}

// =============================================================================
// Tests
// =============================================================================
