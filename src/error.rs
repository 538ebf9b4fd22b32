//! Error types for the flato library.

use std::fmt;

/// Result type alias for flato operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the compression engine.
///
/// Compression itself never fails; these cover caller mistakes at the API
/// boundary. The engine's state is unchanged when an error is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Compression level outside the supported 0-9 range.
    InvalidLevel(u8),
    /// Buffer offset/count pair out of range for the given buffer.
    BufferRange {
        /// Requested offset into the buffer.
        offset: usize,
        /// Requested byte count starting at `offset`.
        count: usize,
        /// Actual buffer length.
        len: usize,
    },
    /// `set_input` was called while previous input is still unconsumed.
    InputPending,
    /// `set_dictionary` was called after compression already started.
    DictionaryAfterData,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLevel(level) => {
                write!(f, "Invalid compression level {}: must be 0-9", level)
            }
            Error::BufferRange { offset, count, len } => {
                write!(
                    f,
                    "Buffer range out of bounds: offset {} + count {} exceeds length {}",
                    offset, count, len
                )
            }
            Error::InputPending => {
                write!(f, "Previous input has not been fully consumed")
            }
            Error::DictionaryAfterData => {
                write!(f, "Dictionary must be set before any input is compressed")
            }
        }
    }
}

impl std::error::Error for Error {}
