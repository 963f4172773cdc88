//! Codepage handling for the ANSI half of dual-encoded strings.
//!
//! VBA stores most names twice: once in the project codepage (MBCS) and
//! once in UTF-16LE. The codepage number is written to the directory
//! stream as-is; the matching character encoding comes from `encoding_rs`.

use std::fmt;

use encoding_rs::Encoding;

use crate::error::{DecodingError, EncodingError, ValidationError};

/// A Windows codepage with a known character encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codepage(u16);

impl Codepage {
    /// Western European (the codepage Office writes for en-US projects).
    pub const WINDOWS_1252: Self = Self(1252);

    /// Validate a codepage number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedCodepage`] when no encoding
    /// is known for `codepage`.
    pub fn new(codepage: u16) -> Result<Self, ValidationError> {
        match encoding_for(codepage) {
            Some(_) => Ok(Self(codepage)),
            None => Err(ValidationError::UnsupportedCodepage { codepage }),
        }
    }

    /// The raw codepage number.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// The character encoding backing this codepage.
    #[must_use]
    pub fn encoding(self) -> &'static Encoding {
        encoding_for(self.0).unwrap_or(encoding_rs::WINDOWS_1252)
    }

    /// Encode `text` in this codepage.
    ///
    /// # Errors
    ///
    /// Fails when a character has no mapping in the codepage.
    pub fn encode(self, field: &'static str, text: &str) -> Result<Vec<u8>, EncodingError> {
        let (bytes, _, had_errors) = self.encoding().encode(text);
        if had_errors {
            return Err(EncodingError::Unmappable {
                field,
                text: text.to_string(),
                codepage: self.0,
            });
        }
        Ok(bytes.into_owned())
    }

    /// Decode bytes written in this codepage.
    pub fn decode(self, field: &'static str, bytes: &[u8]) -> Result<String, DecodingError> {
        self.encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(std::borrow::Cow::into_owned)
            .ok_or(DecodingError::InvalidText {
                field,
                encoding: self.encoding().name(),
            })
    }
}

impl Default for Codepage {
    fn default() -> Self {
        Self::WINDOWS_1252
    }
}

impl fmt::Display for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.encoding().name())
    }
}

impl TryFrom<u16> for Codepage {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn encoding_for(codepage: u16) -> Option<&'static Encoding> {
    let encoding = match codepage {
        866 => encoding_rs::IBM866,
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1252 => encoding_rs::WINDOWS_1252,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        10000 => encoding_rs::MACINTOSH,
        20866 => encoding_rs::KOI8_R,
        21866 => encoding_rs::KOI8_U,
        20932 => encoding_rs::EUC_JP,
        54936 => encoding_rs::GB18030,
        65001 => encoding_rs::UTF_8,
        _ => return None,
    };
    Some(encoding)
}
