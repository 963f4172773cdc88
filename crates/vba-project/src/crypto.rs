//! Data encryption for the `CMG`, `DPB` and `GC` lines (MS-OVBA 2.4.3).
//!
//! This is obfuscation rather than security: every byte is XORed with a
//! running key derived from the previous plain and encrypted bytes.
//!
//! ```text
//! Seed | VersionEnc | ProjKeyEnc | IgnoredEnc (0..3) | DataLengthEnc (4) | DataEnc
//! ```

use crate::error::DecodingError;

/// Only version defined by the format.
pub const ENCRYPTION_VERSION: u8 = 2;

/// Key derived from the project id text: the wrapping sum of its bytes.
#[must_use]
pub fn project_key(project_id: &str) -> u8 {
    project_id.bytes().fold(0u8, u8::wrapping_add)
}

/// Running state shared by encryption and decryption.
struct KeyStream {
    unencrypted_1: u8,
    encrypted_1: u8,
    encrypted_2: u8,
}

impl KeyStream {
    fn new(key: u8, key_enc: u8, version_enc: u8) -> Self {
        Self {
            unencrypted_1: key,
            encrypted_1: key_enc,
            encrypted_2: version_enc,
        }
    }

    fn mask(&self) -> u8 {
        self.encrypted_2.wrapping_add(self.unencrypted_1)
    }

    fn advance(&mut self, plain: u8, encrypted: u8) {
        self.encrypted_2 = self.encrypted_1;
        self.encrypted_1 = encrypted;
        self.unencrypted_1 = plain;
    }

    fn encrypt(&mut self, plain: u8) -> u8 {
        let encrypted = plain ^ self.mask();
        self.advance(plain, encrypted);
        encrypted
    }

    fn decrypt(&mut self, encrypted: u8) -> u8 {
        let plain = encrypted ^ self.mask();
        self.advance(plain, encrypted);
        plain
    }
}

fn ignored_length(seed: u8) -> usize {
    usize::from((seed & 6) / 2)
}

/// Encrypt `data` with the given seed and project key.
///
/// Ignored bytes are written as zero so the output depends only on the inputs.
#[must_use]
pub fn encrypt(seed: u8, key: u8, data: &[u8]) -> Vec<u8> {
    let version_enc = seed ^ ENCRYPTION_VERSION;
    let key_enc = seed ^ key;
    let mut stream = KeyStream::new(key, key_enc, version_enc);

    // Data longer than 4 GiB never reaches this point: it comes from
    // protection flags, a password hash or a single visibility byte.
    let length = u32::try_from(data.len()).unwrap_or(u32::MAX);

    let mut out = Vec::with_capacity(3 + 3 + 4 + data.len());
    out.extend_from_slice(&[seed, version_enc, key_enc]);
    for _ in 0..ignored_length(seed) {
        out.push(stream.encrypt(0));
    }
    for byte in length.to_le_bytes().into_iter().chain(data.iter().copied()) {
        out.push(stream.encrypt(byte));
    }
    out
}

/// Decrypt bytes produced by [`encrypt`], returning the project key and data.
///
/// # Errors
///
/// Fails on truncated input or an unknown version.
pub fn decrypt(bytes: &[u8]) -> Result<(u8, Vec<u8>), DecodingError> {
    let eof = |offset: usize, needed: usize| DecodingError::UnexpectedEof {
        offset,
        needed,
        remaining: bytes.len().saturating_sub(offset),
    };

    let [seed, version_enc, key_enc, rest @ ..] = bytes else {
        return Err(eof(0, 3));
    };
    let version = seed ^ version_enc;
    if version != ENCRYPTION_VERSION {
        return Err(DecodingError::InvalidValue {
            field: "EncryptionVersion",
            value: u64::from(version),
        });
    }
    let key = seed ^ key_enc;
    let mut stream = KeyStream::new(key, *key_enc, *version_enc);

    let header = ignored_length(*seed) + 4;
    if rest.len() < header {
        return Err(eof(3, header));
    }
    let mut plain = rest.iter().map(|&byte| stream.decrypt(byte));
    let mut length = [0u8; 4];
    for (slot, byte) in length
        .iter_mut()
        .zip(plain.by_ref().skip(ignored_length(*seed)))
    {
        *slot = byte;
    }
    let length = u32::from_le_bytes(length) as usize;

    let data: Vec<u8> = plain.take(length).collect();
    if data.len() < length {
        return Err(eof(3 + header, length));
    }
    Ok((key, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_key() {
        assert_eq!(project_key(""), 0);
        assert_eq!(project_key("AB"), 0x41 + 0x42);
        // 38 bytes of braces, hyphens and digits wrap around.
        let key = project_key("{00000000-0000-0000-0000-000000000000}");
        assert_eq!(key, ((0x7B + 0x7D + 4 * 0x2D + 32 * 0x30) % 256) as u8);
    }

    #[test]
    fn test_header_bytes() {
        let out = encrypt(0x07, 0xDF, &[0xFF]);
        assert_eq!(out[0], 0x07);
        assert_eq!(out[1], 0x07 ^ 2);
        assert_eq!(out[2], 0x07 ^ 0xDF);
        // seed & 6 = 6 -> three ignored bytes, four length bytes, one data byte
        assert_eq!(out.len(), 3 + 3 + 4 + 1);
    }

    #[test]
    fn test_first_byte_mask() {
        // Seed 0 has no ignored bytes; the first encrypted byte is the low
        // length byte XORed with (VersionEnc + ProjKey).
        let key = 0x10;
        let out = encrypt(0x00, key, &[0xAA, 0xBB]);
        assert_eq!(out[3], 2 ^ 2u8.wrapping_add(key));
    }

    #[test]
    fn test_round_trip() {
        for seed in [0x00, 0x02, 0x41, 0x86, 0xFF] {
            let data = [0x00, 0x01, 0x02, 0x03, 0xFE];
            let (key, decrypted) = decrypt(&encrypt(seed, 0x5A, &data)).unwrap();
            assert_eq!(key, 0x5A);
            assert_eq!(decrypted, data);
        }
    }

    #[test]
    fn test_decrypt_errors() {
        assert!(decrypt(&[0x01]).is_err());
        let mut bytes = encrypt(0x10, 0x20, &[1, 2, 3]);
        bytes[1] ^= 0x01;
        assert!(matches!(
            decrypt(&bytes),
            Err(DecodingError::InvalidValue { field: "EncryptionVersion", .. })
        ));
        let bytes = encrypt(0x10, 0x20, &[1, 2, 3]);
        assert!(decrypt(&bytes[..bytes.len() - 1]).is_err());
    }
}
