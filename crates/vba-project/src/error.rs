//! Error types for the vba-project crate.
//!
//! Four kinds of failure exist, each raised at a fixed point:
//! - [`ValidationError`]: rejected model mutation (bad name, GUID, state)
//! - [`EncodingError`]: a value that cannot be represented in its field
//! - [`FramingError`]: a record whose declared size disagrees with its payload
//! - [`DecodingError`]: truncated or unexpected bytes while reading back
//!
//! [`ProjectError`] combines them for operations that can hit more than one.

use thiserror::Error;

/// Rejected change to the project model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is not a valid VBA identifier.
    #[error("'{name}' is not a valid VBA identifier")]
    InvalidIdentifier { name: String },

    /// A module with the same name (ignoring case) already exists.
    #[error("duplicate module name: {name}")]
    DuplicateModule { name: String },

    /// Name that cannot be used for a stream in the `VBA` storage.
    #[error("invalid stream name '{name}': {reason}")]
    InvalidStreamName { name: String, reason: &'static str },

    /// Two modules would share a stream (names compared ignoring case).
    #[error("duplicate stream name: {name}")]
    DuplicateStream { name: String },

    /// Visibility state other than 0 or 255.
    #[error("invalid visibility state {value}, expected 0 (hidden) or 255 (visible)")]
    InvalidVisibilityState { value: i64 },

    /// Protection flags with bits outside user/host/VBE protection.
    #[error("invalid protection state 0x{value:08X}")]
    InvalidProtectionState { value: u32 },

    /// Malformed `{8-4-4-4-12}` GUID text.
    #[error("malformed GUID '{value}', expected {{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}}")]
    InvalidGuid { value: String },

    /// Malformed registered library identifier.
    #[error("malformed LIBID '{value}': {message}")]
    InvalidLibid { value: String, message: String },

    /// Codepage with no known character encoding.
    #[error("unsupported codepage {codepage}")]
    UnsupportedCodepage { codepage: u16 },
}

impl ValidationError {
    /// Create an InvalidIdentifier error.
    pub fn invalid_identifier(name: impl Into<String>) -> Self {
        Self::InvalidIdentifier { name: name.into() }
    }

    /// Create a DuplicateModule error.
    pub fn duplicate_module(name: impl Into<String>) -> Self {
        Self::DuplicateModule { name: name.into() }
    }

    /// Create an InvalidStreamName error.
    pub fn invalid_stream_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidStreamName {
            name: name.into(),
            reason,
        }
    }

    /// Create an InvalidGuid error.
    pub fn invalid_guid(value: impl Into<String>) -> Self {
        Self::InvalidGuid {
            value: value.into(),
        }
    }

    /// Create an InvalidLibid error.
    pub fn invalid_libid(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidLibid {
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Value outside the representable domain of its field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Text contains characters the codepage cannot represent.
    #[error("{field}: '{text}' cannot be encoded in codepage {codepage}")]
    Unmappable {
        field: &'static str,
        text: String,
        codepage: u16,
    },

    /// Payload longer than its length prefix can describe.
    #[error("{field}: {len} bytes exceeds the limit of {limit}")]
    TooLong {
        field: &'static str,
        len: usize,
        limit: usize,
    },
}

impl EncodingError {
    /// Create a TooLong error.
    pub fn too_long(field: &'static str, len: usize, limit: usize) -> Self {
        Self::TooLong { field, len, limit }
    }
}

/// Declared record size disagrees with the payload it frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record 0x{id:04X} at offset {offset}: declared size {declared}, payload is {actual} bytes")]
pub struct FramingError {
    pub id: u16,
    pub offset: usize,
    pub declared: usize,
    pub actual: usize,
}

/// Bytes that cannot be read back into the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    /// Fewer bytes remain than a field claims.
    #[error("unexpected end of data at offset {offset}: need {needed} bytes, {remaining} remain")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A record id other than the one the format requires here.
    #[error("unexpected record 0x{found:04X} at offset {offset}, expected {expected}")]
    UnexpectedRecord {
        offset: usize,
        found: u16,
        expected: &'static str,
    },

    /// Bytes that are not valid in the expected text encoding.
    #[error("{field}: invalid {encoding} text")]
    InvalidText {
        field: &'static str,
        encoding: &'static str,
    },

    /// The two halves of a dual-encoded string name different things.
    #[error("{field}: codepage text '{ansi}' does not match unicode text '{unicode}'")]
    DualMismatch {
        field: &'static str,
        ansi: String,
        unicode: String,
    },

    /// A field value outside its domain.
    #[error("{field}: invalid value {value}")]
    InvalidValue { field: &'static str, value: u64 },

    /// Data left over after the terminator record.
    #[error("{count} trailing bytes after the directory terminator")]
    TrailingBytes { count: usize },
}

/// Combined error type for project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    /// Compressed stream could not be expanded.
    #[error("decompression failed: {0}")]
    Compression(#[from] vba_compression::CompressionError),
}

/// Result type for project operations.
pub type Result<T> = std::result::Result<T, ProjectError>;
