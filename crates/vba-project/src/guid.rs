//! Braced GUID text as VBA writes it: `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`.

use uuid::Uuid;

use crate::error::ValidationError;

/// Length of the hyphenated form between the braces.
const HYPHENATED_LEN: usize = 36;

/// Format as uppercase braced text.
#[must_use]
pub fn format_guid(guid: &Uuid) -> String {
    format!("{{{}}}", guid.hyphenated().to_string().to_uppercase())
}

/// Parse braced GUID text.
///
/// # Errors
///
/// Rejects missing braces, the simple (unhyphenated) form, and non-hex digits.
pub fn parse_braced(text: &str) -> Result<Uuid, ValidationError> {
    let inner = text
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| ValidationError::invalid_guid(text))?;
    if inner.len() != HYPHENATED_LEN {
        return Err(ValidationError::invalid_guid(text));
    }
    Uuid::parse_str(inner).map_err(|_| ValidationError::invalid_guid(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_uppercase() {
        let guid = parse_braced("{0d11c8a2-3c5d-4c1e-9b0f-52d6a3a8e7c1}").unwrap();
        assert_eq!(format_guid(&guid), "{0D11C8A2-3C5D-4C1E-9B0F-52D6A3A8E7C1}");
    }

    #[test]
    fn test_rejects_malformed() {
        for text in [
            "0D11C8A2-3C5D-4C1E-9B0F-52D6A3A8E7C1",
            "{0D11C8A23C5D4C1E9B0F52D6A3A8E7C1}",
            "{0D11C8A2-3C5D-4C1E-9B0F-52D6A3A8E7C}",
            "{0D11C8A2-3C5D-4C1E-9B0F-52D6A3A8E7CZ}",
            "{}",
        ] {
            assert_eq!(parse_braced(text), Err(ValidationError::invalid_guid(text)));
        }
    }
}
