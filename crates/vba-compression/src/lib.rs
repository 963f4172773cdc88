//! MS-OVBA compression for VBA project streams.
//!
//! VBA hosts store the `dir` stream and every module's source text in a
//! run-length style compressed container. This crate implements both
//! directions of that container format.
//!
//! # Container layout
//!
//! | Part            | Size     | Description                                     |
//! |-----------------|----------|-------------------------------------------------|
//! | Signature byte  | 1        | Always `0x01`                                   |
//! | Chunk header    | 2        | Size - 3 (bits 0-11), `0b011` (12-14), flag (15) |
//! | Chunk body      | variable | Token sequences, or 4096 raw bytes              |
//!
//! Each chunk covers at most 4096 decompressed bytes. A token sequence is
//! one flag byte followed by up to eight tokens: a literal byte (flag bit
//! clear) or a two-byte copy token (flag bit set) referring back into the
//! current chunk.
//!
//! # Example
//!
//! ```
//! use vba_compression::{compress, decompress};
//!
//! let source = b"Attribute VB_Name = \"Module1\"\r\nSub Foo()\r\nEnd Sub\r\n";
//! let packed = compress(source);
//! assert_eq!(decompress(&packed).unwrap(), source);
//! ```

mod compress;
mod decompress;
mod error;
mod token;

pub use compress::compress;
pub use decompress::decompress;
pub use error::{CompressionError, Result};
pub use token::{CHUNK_SIZE, MAX_COMPRESSED_CHUNK_SIZE, SIGNATURE_BYTE};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
