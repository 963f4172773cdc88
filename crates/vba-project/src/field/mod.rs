//! Field-level codecs for the directory stream.
//!
//! Every directory record is built from four primitives:
//! - fixed little-endian integers ([`FixedInt`])
//! - `Id`/`Size` framed records ([`IdSizeField`])
//! - 4-byte length-prefixed byte strings ([`RecordWriter::sized`])
//! - dual-encoded strings, codepage plus UTF-16LE ([`DualEncodedString`])
//!
//! Writers compute every size from the bytes they frame; readers check
//! every declared size against what remains and what is consumed.

pub mod ids;
mod reader;
mod string;
mod writer;

pub use reader::ByteReader;
pub use string::{DualEncodedString, DualIds, decode_utf16le, encode_utf16le};
pub use writer::{IdSizeField, RecordWriter};

/// Little-endian fixed-width integer.
pub trait FixedInt: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Append the little-endian encoding to `out`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Read from exactly `WIDTH` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Widened value for error reporting.
    fn as_u64(self) -> u64;
}

macro_rules! impl_fixed_int {
    ($($ty:ty),*) => {
        $(
            impl FixedInt for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$ty>::from_le_bytes(raw)
                }

                fn as_u64(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

impl_fixed_int!(u8, u16, u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_int_little_endian() {
        let mut out = Vec::new();
        0x1234u16.write_le(&mut out);
        0xDEAD_BEEFu32.write_le(&mut out);
        0x7Fu8.write_le(&mut out);
        assert_eq!(out, [0x34, 0x12, 0xEF, 0xBE, 0xAD, 0xDE, 0x7F]);

        assert_eq!(u16::read_le(&out[0..2]), 0x1234);
        assert_eq!(u32::read_le(&out[2..6]), 0xDEAD_BEEF);
        assert_eq!(u8::read_le(&out[6..]), 0x7F);
    }
}
