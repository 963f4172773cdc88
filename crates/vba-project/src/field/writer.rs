//! Record writer for building directory stream bytes.

use super::{ByteReader, FixedInt};
use crate::error::{DecodingError, EncodingError};

/// Byte buffer with helpers for every directory field shape.
///
/// Size fields are always derived from the bytes being framed.
#[derive(Debug, Default, Clone)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fixed-width little-endian integer.
    pub fn int<T: FixedInt>(&mut self, value: T) -> &mut Self {
        value.write_le(&mut self.buf);
        self
    }

    /// Append raw bytes with no framing.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a 4-byte length followed by `bytes`.
    ///
    /// # Errors
    ///
    /// Fails when `bytes` is longer than a `u32` can describe.
    pub fn sized(&mut self, field: &'static str, bytes: &[u8]) -> Result<&mut Self, EncodingError> {
        let len = length_u32(field, bytes.len())?;
        self.int(len).bytes(bytes);
        Ok(self)
    }

    /// Append an `Id`/`Size` framed record.
    pub fn record(
        &mut self,
        id: u16,
        field: &'static str,
        payload: &[u8],
    ) -> Result<&mut Self, EncodingError> {
        self.int(id).sized(field, payload)
    }

    /// Append a record whose payload is a single fixed-width integer.
    pub fn record_int<T: FixedInt>(&mut self, id: u16, value: T) -> &mut Self {
        // WIDTH is at most 4, always representable.
        self.int(id).int(T::WIDTH as u32).int(value)
    }

    /// Append a record with an empty payload (`Id` followed by zero).
    pub fn marker(&mut self, id: u16) -> &mut Self {
        self.int(id).int(0u32)
    }

    /// Build a payload with `build`, then frame it under `id`.
    ///
    /// Nested records are encoded bottom-up: the inner bytes exist before
    /// their size is written.
    pub fn nested<F>(&mut self, id: u16, field: &'static str, build: F) -> Result<&mut Self, EncodingError>
    where
        F: FnOnce(&mut RecordWriter) -> Result<(), EncodingError>,
    {
        let mut inner = RecordWriter::new();
        build(&mut inner)?;
        self.record(id, field, inner.as_bytes())
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// A 2-byte record id, a 4-byte size and the payload it frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSizeField {
    pub id: u16,
    pub payload: Vec<u8>,
}

impl IdSizeField {
    /// Header bytes preceding the payload.
    pub const HEADER_LEN: usize = 6;

    pub fn new(id: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// Total encoded length.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_LEN + self.payload.len()
    }

    /// Encode with a size recomputed from the payload.
    pub fn encode(&self, field: &'static str, out: &mut RecordWriter) -> Result<(), EncodingError> {
        out.record(self.id, field, &self.payload)?;
        Ok(())
    }

    /// Decode one record of any id.
    ///
    /// # Errors
    ///
    /// Fails when fewer bytes remain than the size field claims.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodingError> {
        let id = reader.read::<u16>()?;
        let payload = reader.sized()?;
        Ok(Self::new(id, payload))
    }
}

fn length_u32(field: &'static str, len: usize) -> Result<u32, EncodingError> {
    u32::try_from(len).map_err(|_| EncodingError::too_long(field, len, u32::MAX as usize))
}
