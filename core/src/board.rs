//! The 4x4 board and the direction-free primitives the orchestrator
//! composes: quarter-turn rotation, slide-left with merging, and spawning.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::element::Element;
use crate::{Error, Result};

/// Side length of the square board.
pub const SIZE: usize = 4;

/// Number of cells on the board.
pub const CELLS: usize = SIZE * SIZE;

/// A single cell: an element or empty.
pub type Cell = Option<Element>;

/// The 4x4 grid, stored as 16 cells in row-major order
/// (indices 0-3 are row 0, 4-7 are row 1, etc.).
///
/// Boards are small `Copy` values; every operation returns a new board
/// instead of mutating in place.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    /// A board with no tiles.
    pub const EMPTY: Board = Board {
        cells: [None; CELLS],
    };

    pub fn new(cells: [Cell; CELLS]) -> Self {
        Board { cells }
    }

    /// Build a board from a slice that must hold exactly 16 cells.
    pub fn from_cells(cells: &[Cell]) -> Result<Self> {
        let cells: [Cell; CELLS] = cells.try_into().map_err(|_| Error::BadLength(cells.len()))?;
        Ok(Board { cells })
    }

    /// Parse a board from 16 symbols: `H`, `C`, `O`, and `.` or `_` for
    /// an empty cell. Whitespace is ignored, so rows may be spaced out.
    ///
    /// ```
    /// use hco_core::{Board, Element};
    /// let board = Board::parse("HH.. .... .... ...O").unwrap();
    /// assert_eq!(board.get(0, 1), Some(Element::H));
    /// assert_eq!(board.get(3, 3), Some(Element::O));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let cells = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '.' | '_' => Ok(None),
                other => Element::from_symbol(other).map(Some),
            })
            .collect::<Result<Vec<Cell>>>()?;
        Self::from_cells(&cells)
    }

    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * SIZE + col]
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Number of occupied cells.
    pub fn tile_count(&self) -> usize {
        CELLS - self.empty_count()
    }

    /// The furthest-advanced element on the board, if any.
    pub fn max_element(&self) -> Option<Element> {
        self.cells.iter().flatten().copied().max()
    }

    /// Rotate the grid 90 degrees clockwise, `times` times (modulo 4).
    pub fn rotate(&self, times: u8) -> Board {
        let mut board = *self;
        for _ in 0..times % 4 {
            board = board.rotate_once();
        }
        board
    }

    fn rotate_once(&self) -> Board {
        let mut rotated = [None; CELLS];
        for row in 0..SIZE {
            for col in 0..SIZE {
                rotated[row * SIZE + col] = self.cells[(SIZE - 1 - col) * SIZE + row];
            }
        }
        Board { cells: rotated }
    }

    /// Slide every row towards column 0, merging equal neighbours once.
    ///
    /// Returns the new board and the points earned from merges.
    pub fn move_left(&self) -> (Board, u32) {
        let mut cells = self.cells;
        let mut reward = 0;
        for row in 0..SIZE {
            let start = row * SIZE;
            let mut line = [None; SIZE];
            line.copy_from_slice(&cells[start..start + SIZE]);
            reward += compress_and_merge(&mut line);
            cells[start..start + SIZE].copy_from_slice(&line);
        }
        (Board { cells }, reward)
    }

    /// Place an `H` tile in an empty cell chosen uniformly with `rng`.
    ///
    /// A full board is returned unchanged.
    pub fn with_random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let empty_cells: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i)
            .collect();

        if empty_cells.is_empty() {
            return *self;
        }

        let idx = empty_cells[rng.gen_range(0..empty_cells.len())];
        trace!(idx, "spawned tile");
        let mut cells = self.cells;
        cells[idx] = Some(Element::FIRST);
        Board { cells }
    }
}

/// Compress and merge one line towards index 0, returning the merge points.
///
/// 1. Compress: move all tiles to the front, keeping their order
/// 2. Merge: one left-to-right pass; each tile merges at most once and a
///    pair with no next element stays as it is
/// 3. Compress again
fn compress_and_merge(line: &mut [Cell; SIZE]) -> u32 {
    compress(line);

    let mut reward = 0;
    for i in 0..SIZE - 1 {
        if let (Some(left), Some(right)) = (line[i], line[i + 1]) {
            if left != right {
                continue;
            }
            if let Some(merged) = left.next() {
                line[i] = Some(merged);
                line[i + 1] = None;
                reward += merged.merge_reward();
            }
        }
    }

    compress(line);
    reward
}

fn compress(line: &mut [Cell; SIZE]) {
    let mut write_idx = 0;
    for read_idx in 0..SIZE {
        if line[read_idx].is_some() {
            if write_idx != read_idx {
                line[write_idx] = line[read_idx].take();
            }
            write_idx += 1;
        }
    }
}

fn symbol(cell: Cell) -> char {
    cell.map_or('.', Element::symbol)
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board(")?;
        for (row, line) in self.cells.chunks_exact(SIZE).enumerate() {
            if row > 0 {
                write!(f, " ")?;
            }
            for &cell in line {
                write!(f, "{}", symbol(cell))?;
            }
        }
        write!(f, ")")
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "+-----+-----+-----+-----+")?;
        for line in self.cells.chunks_exact(SIZE) {
            write!(f, "|")?;
            for &cell in line {
                match cell {
                    Some(element) => write!(f, "{:^5}|", element.symbol())?,
                    None => write!(f, "     |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "+-----+-----+-----+-----+")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use Element::{C, H, O};

    fn line(cells: [Cell; SIZE]) -> ([Cell; SIZE], u32) {
        let mut line = cells;
        let reward = compress_and_merge(&mut line);
        (line, reward)
    }

    // -------------------------------------------------------------------------
    // Line compaction and merging
    // -------------------------------------------------------------------------

    #[test]
    fn test_compress_simple() {
        let mut cells = [None, Some(H), None, Some(C)];
        compress(&mut cells);
        assert_eq!(cells, [Some(H), Some(C), None, None]);
    }

    #[test]
    fn test_compress_all_empty() {
        let mut cells = [None; SIZE];
        compress(&mut cells);
        assert_eq!(cells, [None; SIZE]);
    }

    #[test]
    fn test_merge_pair() {
        assert_eq!(
            line([Some(H), Some(H), None, None]),
            ([Some(C), None, None, None], 2)
        );
    }

    #[test]
    fn test_merge_across_gap() {
        assert_eq!(
            line([Some(C), None, None, Some(C)]),
            ([Some(O), None, None, None], 3)
        );
    }

    #[test]
    fn test_no_chained_merge() {
        // The fresh C must not swallow the trailing H.
        assert_eq!(
            line([Some(H), Some(H), Some(H), None]),
            ([Some(C), Some(H), None, None], 2)
        );
    }

    #[test]
    fn test_no_double_merge_of_new_tile() {
        // [C, H, H] -> [C, C], not [O]
        assert_eq!(
            line([Some(C), Some(H), Some(H), None]),
            ([Some(C), Some(C), None, None], 2)
        );
    }

    #[test]
    fn test_two_pairs() {
        assert_eq!(
            line([Some(H), Some(H), Some(H), Some(H)]),
            ([Some(C), Some(C), None, None], 4)
        );
    }

    #[test]
    fn test_terminal_elements_never_merge() {
        assert_eq!(
            line([Some(O), Some(O), None, None]),
            ([Some(O), Some(O), None, None], 0)
        );
        assert_eq!(
            line([None, Some(O), None, Some(O)]),
            ([Some(O), Some(O), None, None], 0)
        );
    }

    #[test]
    fn test_pair_after_terminal_pair_still_merges() {
        assert_eq!(
            line([Some(O), Some(O), Some(C), Some(C)]),
            ([Some(O), Some(O), Some(O), None], 3)
        );
    }

    // -------------------------------------------------------------------------
    // Board operations
    // -------------------------------------------------------------------------

    #[test]
    fn test_move_left_sums_rows() {
        let board = Board::parse("HH.. .CC. H.H. OOHH").unwrap();
        let (moved, reward) = board.move_left();
        assert_eq!(moved, Board::parse("C... O... C... OOC.").unwrap());
        assert_eq!(reward, 2 + 3 + 2 + 2);
    }

    #[test]
    fn test_rotate_once_clockwise() {
        let board = Board::parse("H... .... .... C..O").unwrap();
        // Top-left goes to top-right, bottom-left to top-left.
        assert_eq!(board.rotate(1), Board::parse("C..H .... .... O...").unwrap());
    }

    #[test]
    fn test_rotation_identity() {
        let board = Board::parse("HCO. .H.C O..H CC.O").unwrap();
        assert_eq!(board.rotate(1).rotate(3), board);
        assert_eq!(board.rotate(4), board);
        assert_eq!(board.rotate(0), board);
        assert_eq!(board.rotate(2).rotate(3), board.rotate(1));
    }

    #[test]
    fn test_from_cells_rejects_wrong_length() {
        assert_eq!(Board::from_cells(&[None; 15]), Err(Error::BadLength(15)));
        assert!(Board::from_cells(&[None; 16]).is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Board::parse("HH.. ...."), Err(Error::BadLength(8)));
        assert_eq!(
            Board::parse("HX.. .... .... ...."),
            Err(Error::BadSymbol('X'))
        );
    }

    #[test]
    fn test_spawn_fills_one_empty_cell_with_h() {
        let mut rng = SmallRng::seed_from_u64(7);
        let board = Board::parse("CCCC OOOO C.CC OOOO").unwrap();
        let spawned = board.with_random_tile(&mut rng);
        assert_eq!(spawned.get(2, 1), Some(H));
        assert_eq!(spawned.empty_count(), 0);
    }

    #[test]
    fn test_spawn_on_full_board_is_noop() {
        let mut rng = SmallRng::seed_from_u64(7);
        let board = Board::parse("HCHC CHCH HCHC CHCH").unwrap();
        assert_eq!(board.with_random_tile(&mut rng), board);
    }

    #[test]
    fn test_spawn_is_deterministic_for_seed() {
        let a = Board::EMPTY.with_random_tile(&mut SmallRng::seed_from_u64(99));
        let b = Board::EMPTY.with_random_tile(&mut SmallRng::seed_from_u64(99));
        assert_eq!(a, b);
        assert_eq!(a.tile_count(), 1);
    }

    #[test]
    fn test_observers() {
        let board = Board::parse("H... .C.. .... ...O").unwrap();
        assert_eq!(board.tile_count(), 3);
        assert_eq!(board.empty_count(), 13);
        assert_eq!(board.max_element(), Some(O));
        assert_eq!(Board::EMPTY.max_element(), None);
    }

    #[test]
    fn test_debug_and_display() {
        let board = Board::parse("H... .C.. .... ...O").unwrap();
        assert_eq!(format!("{:?}", board), "Board(H... .C.. .... ...O)");
        let display = board.to_string();
        assert!(display.contains("+-----+"));
        assert!(display.contains("  H  |"));
    }
}
