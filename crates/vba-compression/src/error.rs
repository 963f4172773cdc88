//! Error types for container decompression.

use thiserror::Error;

/// Errors raised while decompressing a compressed container.
///
/// Compression itself is infallible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    /// The input has no signature byte.
    #[error("compressed container is empty")]
    Empty,

    /// The first byte is not `0x01`.
    #[error("invalid container signature 0x{found:02X}, expected 0x01")]
    InvalidSignature { found: u8 },

    /// A chunk header carries a signature other than `0b011`.
    #[error("invalid chunk signature {found:#05b} at offset {offset}")]
    InvalidChunkSignature { offset: usize, found: u16 },

    /// The data ends in the middle of a chunk.
    #[error("truncated chunk at offset {offset}")]
    TruncatedChunk { offset: usize },

    /// A copy token points before the start of its chunk.
    #[error("copy token at offset {offset} refers {distance} bytes back, only {available} available")]
    InvalidCopyToken {
        offset: usize,
        distance: usize,
        available: usize,
    },
}

/// Result type alias for decompression.
pub type Result<T> = std::result::Result<T, CompressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompressionError::InvalidSignature { found: 0x02 };
        assert_eq!(
            format!("{err}"),
            "invalid container signature 0x02, expected 0x01"
        );

        let err = CompressionError::TruncatedChunk { offset: 7 };
        assert_eq!(format!("{err}"), "truncated chunk at offset 7");
    }
}
