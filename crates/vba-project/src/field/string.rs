//! Dual-encoded strings: a codepage (MBCS) half and a UTF-16LE half.

use super::{ByteReader, RecordWriter};
use crate::codepage::Codepage;
use crate::error::{DecodingError, EncodingError};

/// Record ids for the two halves of a dual-encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualIds {
    pub id: u16,
    pub unicode_id: u16,
}

impl DualIds {
    #[must_use]
    pub const fn new(id: u16, unicode_id: u16) -> Self {
        Self { id, unicode_id }
    }
}

/// The same logical text stored twice.
///
/// Both halves are length-prefixed independently. A value built with
/// [`DualEncodedString::new`] always has halves naming the same text;
/// values read back from bytes are checked by [`DualEncodedString::text`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DualEncodedString {
    ansi: Vec<u8>,
    unicode: Vec<u8>,
}

impl DualEncodedString {
    /// Encode `text` in both the codepage and UTF-16LE.
    ///
    /// # Errors
    ///
    /// Fails when `text` has characters the codepage cannot represent.
    pub fn new(field: &'static str, text: &str, codepage: Codepage) -> Result<Self, EncodingError> {
        Ok(Self {
            ansi: codepage.encode(field, text)?,
            unicode: encode_utf16le(text),
        })
    }

    /// Wrap raw halves, as read from a stream.
    #[must_use]
    pub fn from_parts(ansi: Vec<u8>, unicode: Vec<u8>) -> Self {
        Self { ansi, unicode }
    }

    #[must_use]
    pub fn ansi(&self) -> &[u8] {
        &self.ansi
    }

    #[must_use]
    pub fn unicode(&self) -> &[u8] {
        &self.unicode
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ansi.is_empty() && self.unicode.is_empty()
    }

    /// Reject a codepage half longer than `limit` bytes.
    pub fn check_limit(&self, field: &'static str, limit: usize) -> Result<(), EncodingError> {
        if self.ansi.len() > limit {
            return Err(EncodingError::too_long(field, self.ansi.len(), limit));
        }
        Ok(())
    }

    /// Decode both halves and require that they agree.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::DualMismatch`] when the halves name
    /// different text, or [`DecodingError::InvalidText`] when either half
    /// is not valid in its encoding.
    pub fn text(&self, field: &'static str, codepage: Codepage) -> Result<String, DecodingError> {
        let ansi = codepage.decode(field, &self.ansi)?;
        let unicode = decode_utf16le(field, &self.unicode)?;
        if ansi != unicode {
            return Err(DecodingError::DualMismatch {
                field,
                ansi,
                unicode,
            });
        }
        Ok(unicode)
    }

    /// Write `id`, size, codepage bytes, then `unicode_id`, size, UTF-16 bytes.
    pub fn encode(
        &self,
        ids: DualIds,
        field: &'static str,
        out: &mut RecordWriter,
    ) -> Result<(), EncodingError> {
        out.record(ids.id, field, &self.ansi)?
            .record(ids.unicode_id, field, &self.unicode)?;
        Ok(())
    }

    /// Read both halves, checking each record id.
    pub fn decode(
        reader: &mut ByteReader<'_>,
        ids: DualIds,
        field: &'static str,
    ) -> Result<Self, DecodingError> {
        let ansi = reader.record(ids.id, field)?.to_vec();
        let unicode = reader.record(ids.unicode_id, field)?.to_vec();
        Ok(Self { ansi, unicode })
    }
}

/// UTF-16LE bytes of `text`, without terminator.
#[must_use]
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Decode UTF-16LE bytes.
///
/// # Errors
///
/// Fails on an odd byte count or unpaired surrogates.
pub fn decode_utf16le(field: &'static str, bytes: &[u8]) -> Result<String, DecodingError> {
    let invalid = DecodingError::InvalidText {
        field,
        encoding: "UTF-16LE",
    };
    if bytes.len() % 2 != 0 {
        return Err(invalid);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME_IDS: DualIds = DualIds::new(0x0016, 0x003E);

    #[test]
    fn test_dual_layout() {
        let name = DualEncodedString::new("ReferenceName", "stdole", Codepage::WINDOWS_1252).unwrap();
        let mut out = RecordWriter::new();
        name.encode(NAME_IDS, "ReferenceName", &mut out).unwrap();
        insta::assert_snapshot!(
            hex::encode(out.as_bytes()),
            @"1600060000007374646f6c653e000c0000007300740064006f006c006500"
        );
    }

    #[test]
    fn test_empty_name_still_framed() {
        let name = DualEncodedString::new("ReferenceName", "", Codepage::WINDOWS_1252).unwrap();
        let mut out = RecordWriter::new();
        name.encode(NAME_IDS, "ReferenceName", &mut out).unwrap();
        assert_eq!(
            out.as_bytes(),
            [0x16, 0x00, 0, 0, 0, 0, 0x3E, 0x00, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_decode_round_trip() {
        let cp = Codepage::WINDOWS_1252;
        let name = DualEncodedString::new("ModuleName", "Übersicht", cp).unwrap();
        let mut out = RecordWriter::new();
        name.encode(NAME_IDS, "ModuleName", &mut out).unwrap();

        let mut reader = ByteReader::new(out.as_bytes());
        let decoded = DualEncodedString::decode(&mut reader, NAME_IDS, "ModuleName").unwrap();
        assert_eq!(decoded, name);
        assert_eq!(decoded.text("ModuleName", cp).unwrap(), "Übersicht");
    }

    #[test]
    fn test_mismatched_halves() {
        let dual = DualEncodedString::from_parts(b"Module1".to_vec(), encode_utf16le("Module2"));
        assert!(matches!(
            dual.text("ModuleName", Codepage::WINDOWS_1252),
            Err(DecodingError::DualMismatch { .. })
        ));
    }

    #[test]
    fn test_odd_utf16_length() {
        assert!(decode_utf16le("ModuleName", &[0x41, 0x00, 0x42]).is_err());
    }

    #[test]
    fn test_limit() {
        let long = "a".repeat(129);
        let dual = DualEncodedString::new("ProjectName", &long, Codepage::WINDOWS_1252).unwrap();
        assert_eq!(
            dual.check_limit("ProjectName", 128),
            Err(EncodingError::too_long("ProjectName", 129, 128))
        );
    }
}
