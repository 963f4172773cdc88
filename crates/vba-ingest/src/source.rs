//! Reading module source files.

use std::path::Path;

use encoding_rs::Encoding;
use vba_project::Codepage;

use crate::error::{DiscoveryError, Result};

/// Read a source file as text.
///
/// A byte order mark selects its encoding; otherwise valid UTF-8 is taken
/// as UTF-8 and anything else is decoded with `codepage`.
///
/// # Errors
///
/// Fails when the file cannot be read or the bytes are invalid in every
/// candidate encoding.
pub fn read_source(path: &Path, codepage: Codepage) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| DiscoveryError::file_read(path, e))?;
    decode_source(&bytes, codepage).ok_or_else(|| DiscoveryError::Undecodable {
        path: path.to_path_buf(),
        codepage: codepage.get(),
    })
}

/// Decode source bytes; `None` when no candidate encoding accepts them.
#[must_use]
pub fn decode_source(bytes: &[u8], codepage: Codepage) -> Option<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_strict(encoding, &bytes[bom_len..]);
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }
    decode_strict(codepage.encoding(), bytes)
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_preferred() {
        let text = decode_source("Debug.Print \"Grüße\"".as_bytes(), Codepage::WINDOWS_1252);
        assert_eq!(text.as_deref(), Some("Debug.Print \"Grüße\""));
    }

    #[test]
    fn test_bom_removed() {
        let text = decode_source(b"\xEF\xBB\xBFSub Foo()", Codepage::WINDOWS_1252);
        assert_eq!(text.as_deref(), Some("Sub Foo()"));

        let text = decode_source(b"\xFF\xFEA\x00", Codepage::WINDOWS_1252);
        assert_eq!(text.as_deref(), Some("A"));
    }

    #[test]
    fn test_codepage_fallback() {
        // "Grüße" as written by a Western European VBA editor.
        let text = decode_source(b"Gr\xFC\xDFe", Codepage::WINDOWS_1252);
        assert_eq!(text.as_deref(), Some("Grüße"));
    }

    #[test]
    fn test_undecodable() {
        let shift_jis = Codepage::new(932).unwrap();
        assert_eq!(decode_source(b"\x81", shift_jis), None);
    }
}
