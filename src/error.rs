//! Error kinds shared by every stage of the block compressor.
//!
//! All of these are block-fatal. Compressing a block is deterministic, so a failure means a
//! precondition was violated and nothing is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BzError {
    /// extract_min on an empty priority queue. Signals a broken tree build.
    #[error("extract_min called on an empty priority queue")]
    EmptyQueue,

    /// Bijective encoding is only defined for positive run lengths.
    #[error("cannot encode a run of length {0}, runs must be positive")]
    InvalidRunLength(usize),

    /// A digit sequence encodes a run longer than usize can hold.
    #[error("run length digits overflow at token {0}")]
    RunOverflow(usize),

    #[error("end-of-block marker {symbol} already present at position {position}")]
    DuplicateMarker { symbol: u16, position: usize },

    #[error("symbol {0} is outside the alphabet or has no codeword")]
    UnknownSymbol(u16),

    #[error("bitstream holds an invalid codeword at bit {0}")]
    UnknownCodeword(usize),

    #[error("bitstream ended before the end-of-block marker")]
    TruncatedStream,

    #[error("rank {rank} is outside the rank list of {size} symbols")]
    InvalidRank { rank: u16, size: usize },

    #[error("marker row {row} does not hold the end-of-block marker (block length {len})")]
    InvalidMarkerRow { row: usize, len: usize },

    /// Block lengths and rotation offsets are stored as u32.
    #[error("block of {0} symbols is too large")]
    BlockTooLarge(usize),

    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(&'static str),

    #[error("invalid compressed frame: {0}")]
    InvalidFrame(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BzError>;
