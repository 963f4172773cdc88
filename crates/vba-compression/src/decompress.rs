//! Container decompression.

use crate::error::{CompressionError, Result};
use crate::token::{CHUNK_SIGNATURE, CHUNK_SIZE, CopyTokenLayout, SIGNATURE_BYTE, unpack_header};

/// Decompress an MS-OVBA compressed container.
///
/// # Errors
///
/// Fails when the signature byte or a chunk signature is wrong, when a
/// chunk is truncated, or when a copy token refers before its chunk.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let (&signature, _) = data.split_first().ok_or(CompressionError::Empty)?;
    if signature != SIGNATURE_BYTE {
        return Err(CompressionError::InvalidSignature { found: signature });
    }

    let mut out = Vec::with_capacity(data.len() * 2);
    let mut offset = 1usize;

    while offset < data.len() {
        let header_bytes = data
            .get(offset..offset + 2)
            .ok_or(CompressionError::TruncatedChunk { offset })?;
        let header = u16::from_le_bytes([header_bytes[0], header_bytes[1]]);
        let (size, chunk_signature, compressed) = unpack_header(header);
        if chunk_signature != CHUNK_SIGNATURE {
            return Err(CompressionError::InvalidChunkSignature {
                offset,
                found: chunk_signature,
            });
        }

        let chunk_end = offset + size;
        if chunk_end > data.len() {
            return Err(CompressionError::TruncatedChunk { offset });
        }
        let body = &data[offset + 2..chunk_end];
        if compressed {
            decompress_chunk(body, offset + 2, &mut out)?;
        } else {
            let raw = body
                .get(..CHUNK_SIZE)
                .ok_or(CompressionError::TruncatedChunk { offset })?;
            out.extend_from_slice(raw);
        }
        offset = chunk_end;
    }

    Ok(out)
}

/// Expand one compressed chunk body, appending to `out`.
///
/// `base` is the body's offset within the container, used in errors.
fn decompress_chunk(body: &[u8], base: usize, out: &mut Vec<u8>) -> Result<()> {
    let chunk_start = out.len();
    let mut pos = 0usize;

    while pos < body.len() {
        let flags = body[pos];
        pos += 1;

        for bit in 0..8 {
            if pos >= body.len() {
                break;
            }
            if flags & (1 << bit) == 0 {
                out.push(body[pos]);
                pos += 1;
                continue;
            }

            let token_bytes = body
                .get(pos..pos + 2)
                .ok_or(CompressionError::TruncatedChunk { offset: base + pos })?;
            let token = u16::from_le_bytes([token_bytes[0], token_bytes[1]]);
            let available = out.len() - chunk_start;
            let (distance, length) = CopyTokenLayout::at(available).unpack(token);
            if distance > available {
                return Err(CompressionError::InvalidCopyToken {
                    offset: base + pos,
                    distance,
                    available,
                });
            }
            pos += 2;

            // Byte by byte: the source may overlap what is being written.
            let source = out.len() - distance;
            for index in 0..length {
                let byte = out[source + index];
                out.push(byte);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress;

    #[test]
    fn test_empty_container() {
        assert_eq!(decompress(&[0x01]).unwrap(), Vec::<u8>::new());
        assert_eq!(decompress(&[]), Err(CompressionError::Empty));
    }

    #[test]
    fn test_bad_signature() {
        assert_eq!(
            decompress(&[0x02, 0x03, 0xB0]),
            Err(CompressionError::InvalidSignature { found: 0x02 })
        );
    }

    #[test]
    fn test_bad_chunk_signature() {
        let result = decompress(&[0x01, 0x03, 0x80, 0x00, 0x61]);
        assert!(matches!(
            result,
            Err(CompressionError::InvalidChunkSignature { offset: 1, .. })
        ));
    }

    #[test]
    fn test_overlapping_copy() {
        let data = decompress(&[0x01, 0x03, 0xB0, 0x02, 0x61, 0x06, 0x00]).unwrap();
        assert_eq!(data, b"aaaaaaaaaa");
    }

    #[test]
    fn test_copy_token_before_chunk_start() {
        // Flag bit 0 set: the very first token is a copy token.
        let result = decompress(&[0x01, 0x02, 0xB0, 0x01, 0x00, 0x00]);
        assert!(matches!(
            result,
            Err(CompressionError::InvalidCopyToken { available: 0, .. })
        ));
    }

    #[test]
    fn test_truncated_raw_chunk() {
        let result = decompress(&[0x01, 0xFF, 0x3F, 0x61, 0x62]);
        assert_eq!(result, Err(CompressionError::TruncatedChunk { offset: 1 }));
    }

    #[test]
    fn test_truncated_compressed_chunk() {
        let text = b"abcdefghijklmnopqrstuvwxyz0123456789".repeat(3);
        let packed = compress(&text);
        assert_eq!(decompress(&packed).unwrap(), text);

        for cut in 1..=5 {
            let short = &packed[..packed.len() - cut];
            assert_eq!(
                decompress(short),
                Err(CompressionError::TruncatedChunk { offset: 1 }),
                "cut {cut}"
            );
        }
    }

    #[test]
    fn test_multi_chunk_roundtrip() {
        let text = "Sub Foo()\r\n    Debug.Print \"hello\"\r\nEnd Sub\r\n".repeat(300);
        let packed = compress(text.as_bytes());
        assert!(packed.len() < text.len());
        assert_eq!(decompress(&packed).unwrap(), text.as_bytes());
    }
}
