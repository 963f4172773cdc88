//! Chunk headers and copy tokens.

/// Maximum number of decompressed bytes covered by one chunk.
pub const CHUNK_SIZE: usize = 4096;

/// Maximum size of a chunk including its two-byte header.
pub const MAX_COMPRESSED_CHUNK_SIZE: usize = CHUNK_SIZE + 2;

/// First byte of every compressed container.
pub const SIGNATURE_BYTE: u8 = 0x01;

/// Fixed value stored in bits 12-14 of every chunk header.
pub(crate) const CHUNK_SIGNATURE: u16 = 0b011;

/// Set when the chunk body holds token sequences instead of raw bytes.
const COMPRESSED_FLAG: u16 = 0x8000;

/// Bit layout of a copy token at a given position inside a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CopyTokenLayout {
    pub length_mask: u16,
    pub offset_mask: u16,
    pub bit_count: u32,
    pub max_length: usize,
}

impl CopyTokenLayout {
    /// Layout for a token emitted `position` bytes into the decompressed chunk.
    ///
    /// The offset part gets just enough bits to reach the chunk start,
    /// never fewer than 4.
    pub fn at(position: usize) -> Self {
        let mut bit_count = 0u32;
        while (1usize << bit_count) < position {
            bit_count += 1;
        }
        let bit_count = bit_count.max(4);
        let length_mask = 0xFFFFu16 >> bit_count;
        Self {
            length_mask,
            offset_mask: !length_mask,
            bit_count,
            max_length: usize::from(length_mask) + 3,
        }
    }

    pub fn pack(&self, offset: usize, length: usize) -> u16 {
        let offset_part = ((offset - 1) as u16) << (16 - self.bit_count);
        let length_part = (length - 3) as u16;
        offset_part | length_part
    }

    /// Returns `(offset, length)`.
    pub fn unpack(&self, token: u16) -> (usize, usize) {
        let length = usize::from(token & self.length_mask) + 3;
        let offset = usize::from((token & self.offset_mask) >> (16 - self.bit_count)) + 1;
        (offset, length)
    }
}

/// Build a chunk header for a chunk of `size` bytes (header included).
pub(crate) fn pack_header(size: usize, compressed: bool) -> u16 {
    let mut header = ((size - 3) as u16) & 0x0FFF;
    header |= CHUNK_SIGNATURE << 12;
    if compressed {
        header |= COMPRESSED_FLAG;
    }
    header
}

/// Split a chunk header into `(size, signature, compressed)`.
pub(crate) fn unpack_header(header: u16) -> (usize, u16, bool) {
    let size = usize::from(header & 0x0FFF) + 3;
    let signature = (header >> 12) & 0x07;
    (size, signature, header & COMPRESSED_FLAG != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_minimum_bit_count() {
        let layout = CopyTokenLayout::at(1);
        assert_eq!(layout.bit_count, 4);
        assert_eq!(layout.length_mask, 0x0FFF);
        assert_eq!(layout.offset_mask, 0xF000);
        assert_eq!(layout.max_length, 4098);
    }

    #[test]
    fn test_layout_grows_with_position() {
        assert_eq!(CopyTokenLayout::at(16).bit_count, 4);
        assert_eq!(CopyTokenLayout::at(17).bit_count, 5);
        assert_eq!(CopyTokenLayout::at(4096).bit_count, 12);
    }

    #[test]
    fn test_pack_unpack_token() {
        let layout = CopyTokenLayout::at(300);
        let token = layout.pack(257, 10);
        assert_eq!(layout.unpack(token), (257, 10));
    }

    #[test]
    fn test_header_fields() {
        let header = pack_header(28, true);
        assert_eq!(header, 0xB019);
        assert_eq!(unpack_header(header), (28, CHUNK_SIGNATURE, true));

        let raw = pack_header(MAX_COMPRESSED_CHUNK_SIZE, false);
        assert_eq!(raw, 0x3FFF);
    }
}
