/// Errors raised while building boards or directions from external input.
///
/// Engine operations on a well-formed board never fail.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("board must have exactly 16 cells, got {0}")]
    BadLength(usize),
    #[error("unknown cell symbol {0:?}")]
    BadSymbol(char),
    #[error("unknown direction {0:?}")]
    UnknownDirection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
