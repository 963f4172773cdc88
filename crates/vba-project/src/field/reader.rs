//! Cursor over directory stream bytes.

use super::FixedInt;
use crate::error::{DecodingError, FramingError, ProjectError};

/// Forward-only reader that tracks its offset for error reporting.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the data.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next record id without consuming it.
    #[must_use]
    pub fn peek_id(&self) -> Option<u16> {
        self.data
            .get(self.pos..self.pos + 2)
            .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Consume `len` bytes.
    ///
    /// # Errors
    ///
    /// Fails without consuming anything when fewer than `len` bytes remain.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodingError> {
        if len > self.remaining() {
            return Err(DecodingError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a fixed-width little-endian integer.
    pub fn read<T: FixedInt>(&mut self) -> Result<T, DecodingError> {
        self.take(T::WIDTH).map(T::read_le)
    }

    /// Read exactly `N` bytes into an array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodingError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a 4-byte length and the bytes it counts.
    pub fn sized(&mut self) -> Result<&'a [u8], DecodingError> {
        let start = self.pos;
        let len = self.read::<u32>()? as usize;
        self.take(len).inspect_err(|_| self.pos = start)
    }

    /// Consume a record id, failing if it is not `id`.
    pub fn expect_id(&mut self, id: u16, expected: &'static str) -> Result<(), DecodingError> {
        let offset = self.pos;
        let found = self.read::<u16>()?;
        if found != id {
            return Err(DecodingError::UnexpectedRecord {
                offset,
                found,
                expected,
            });
        }
        Ok(())
    }

    /// Read an `Id`/`Size` record with the given id, returning its payload.
    pub fn record(&mut self, id: u16, expected: &'static str) -> Result<&'a [u8], DecodingError> {
        self.expect_id(id, expected)?;
        self.sized()
    }

    /// Read a record whose payload must be exactly one integer.
    ///
    /// # Errors
    ///
    /// Returns a [`FramingError`] when the declared size is not the
    /// integer's width.
    pub fn record_int<T: FixedInt>(&mut self, id: u16, expected: &'static str) -> Result<T, ProjectError> {
        let offset = self.pos;
        let payload = self.record(id, expected)?;
        if payload.len() != T::WIDTH {
            return Err(FramingError {
                id,
                offset,
                declared: payload.len(),
                actual: T::WIDTH,
            }
            .into());
        }
        Ok(T::read_le(payload))
    }

    /// Read an `Id`/`Size` record and parse its payload with `parse`.
    ///
    /// The payload must be consumed exactly: running short or leaving
    /// bytes behind is reported as a [`FramingError`] for `id`.
    pub fn framed<T, F>(&mut self, id: u16, expected: &'static str, parse: F) -> Result<T, ProjectError>
    where
        F: FnOnce(&mut ByteReader<'a>) -> Result<T, ProjectError>,
    {
        let offset = self.pos;
        let payload = self.record(id, expected)?;
        let mut inner = ByteReader::new(payload);
        let value = parse(&mut inner).map_err(|err| match err {
            ProjectError::Decoding(DecodingError::UnexpectedEof {
                needed, remaining, ..
            }) => FramingError {
                id,
                offset,
                declared: payload.len(),
                actual: payload.len() + needed - remaining,
            }
            .into(),
            other => other,
        })?;
        finish_framed(&inner, id, offset)?;
        Ok(value)
    }

    /// Read a record that must carry an empty payload.
    pub fn marker(&mut self, id: u16, expected: &'static str) -> Result<(), ProjectError> {
        let offset = self.pos;
        self.expect_id(id, expected)?;
        let reserved = self.read::<u32>()?;
        if reserved != 0 {
            return Err(FramingError {
                id,
                offset,
                declared: reserved as usize,
                actual: 0,
            }
            .into());
        }
        Ok(())
    }

    /// Consume the record only if the next id is `id`.
    pub fn marker_if(&mut self, id: u16, expected: &'static str) -> Result<bool, ProjectError> {
        if self.peek_id() != Some(id) {
            return Ok(false);
        }
        self.marker(id, expected)?;
        Ok(true)
    }
}

fn finish_framed(reader: &ByteReader<'_>, id: u16, offset: usize) -> Result<(), FramingError> {
    if reader.is_empty() {
        return Ok(());
    }
    Err(FramingError {
        id,
        offset,
        declared: reader.data.len(),
        actual: reader.pos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_integers() {
        let mut reader = ByteReader::new(&[0x01, 0x00, 0x04, 0x00, 0x00, 0x00]);
        assert_eq!(reader.read::<u16>().unwrap(), 1);
        assert_eq!(reader.read::<u32>().unwrap(), 4);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_take_past_end() {
        let mut reader = ByteReader::new(&[0x01, 0x02]);
        let err = reader.read::<u32>().unwrap_err();
        assert_eq!(
            err,
            DecodingError::UnexpectedEof {
                offset: 0,
                needed: 4,
                remaining: 2
            }
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_sized_claims_too_much() {
        let mut reader = ByteReader::new(&[0x09, 0x00, 0x00, 0x00, b'a', b'b']);
        assert!(matches!(
            reader.sized(),
            Err(DecodingError::UnexpectedEof { needed: 9, .. })
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_record_int_size_mismatch() {
        // PROJECTSYSKIND claiming a 2-byte payload
        let mut reader = ByteReader::new(&[0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00]);
        let err = reader.record_int::<u32>(0x0001, "PROJECTSYSKIND").unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Framing(FramingError {
                id: 0x0001,
                declared: 2,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_framed_leftover_bytes() {
        // declared 6, parser consumes only 4
        let data = [0x0D, 0x00, 0x06, 0x00, 0x00, 0x00, 1, 2, 3, 4, 5, 6];
        let mut reader = ByteReader::new(&data);
        let err = reader
            .framed(0x000D, "REFERENCEREGISTERED", |inner| Ok(inner.read::<u32>()?))
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Framing(FramingError {
                declared: 6,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_framed_short_payload() {
        let data = [0x0D, 0x00, 0x02, 0x00, 0x00, 0x00, 1, 2];
        let mut reader = ByteReader::new(&data);
        let err = reader
            .framed(0x000D, "REFERENCEREGISTERED", |inner| Ok(inner.read::<u32>()?))
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Framing(FramingError {
                declared: 2,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_unexpected_record() {
        let mut reader = ByteReader::new(&[0x02, 0x00]);
        assert!(matches!(
            reader.expect_id(0x0001, "PROJECTSYSKIND"),
            Err(DecodingError::UnexpectedRecord { found: 0x0002, .. })
        ));
    }
}
