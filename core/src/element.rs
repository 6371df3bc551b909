//! The element progression tiles advance through when they merge.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A tile's element. Two equal neighbours merge into the next element of
/// the progression `H -> C -> O`; `O` is the last step and never merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Element {
    H = 0,
    C = 1,
    O = 2,
}

impl Element {
    /// The full progression, in merge order.
    pub const PROGRESSION: [Element; 3] = [Element::H, Element::C, Element::O];

    /// The element every spawned tile starts as.
    pub const FIRST: Element = Element::H;

    /// The element two merged copies of `self` become, or `None` for the
    /// last element of the progression.
    pub fn next(self) -> Option<Element> {
        Self::PROGRESSION.get(self.index() + 1).copied()
    }

    /// Position in the progression (H = 0, C = 1, O = 2).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Points awarded when a merge produces this element.
    pub fn merge_reward(self) -> u32 {
        self.index() as u32 + 1
    }

    pub fn symbol(self) -> char {
        match self {
            Element::H => 'H',
            Element::C => 'C',
            Element::O => 'O',
        }
    }

    /// Parse a single element symbol (case-insensitive).
    pub fn from_symbol(symbol: char) -> Result<Element> {
        match symbol.to_ascii_uppercase() {
            'H' => Ok(Element::H),
            'C' => Ok(Element::C),
            'O' => Ok(Element::O),
            _ => Err(Error::BadSymbol(symbol)),
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
