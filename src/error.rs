use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HuffmanError {
    #[error("cannot decode bits without a tree built from non-empty input")]
    EmptyInput,

    #[error("symbol {0:?} has no code in the code table")]
    UnknownSymbol(char),

    // The stream ended while the cursor sat on an internal node. `offset` is
    // the bit position where the unfinished code word began.
    #[error("bit stream ended inside the code word starting at bit {offset}")]
    TruncatedStream { offset: usize },

    #[error("invalid bit {found:?} at position {position}, expected '0' or '1'")]
    InvalidBit { position: usize, found: char },

    #[error("code for symbol {symbol:?} would need {length} bits, at most 64 are supported")]
    CodeTooLong { symbol: char, length: usize },
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
