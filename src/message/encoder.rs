//! Byte writer that enforces field widths on encode.
use std::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};

use crate::message::{EncodeError, OverflowPolicy};

/// Largest payload a one-byte length field can describe.
pub const MAX_PAYLOAD_LENGTH: usize = u8::MAX as usize;

/// Serializes signal and capability fields into a byte buffer.
#[derive(Debug)]
pub struct Encoder {
    buf: Vec<u8>,
    policy: OverflowPolicy,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new(policy: OverflowPolicy) -> Self {
        Self { buf: Vec::new(), policy }
    }

    /// Create an empty encoder that shares the overflow policy of `self`.
    pub fn nested(&self) -> Self {
        Self::new(self.policy)
    }

    /// Fit `value` into a field of `width` bits.
    ///
    /// Values that do not fit are either masked (with a warning) or rejected, depending on
    /// the overflow policy.
    pub fn field(&self, name: &'static str, value: u8, width: u32) -> Result<u8, EncodeError> {
        let max = u8::MAX >> (u8::BITS - width);
        if value <= max {
            return Ok(value);
        }

        match self.policy {
            OverflowPolicy::Clamp => {
                warn!("Value {} of field {} exceeds maximum {}, truncating", value, name, max);
                Ok(value & max)
            }
            OverflowPolicy::Reject => Err(EncodeError::FieldOverflow {
                field: name,
                value,
                max,
            }),
        }
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Append a little-endian `u16`.
    pub fn push_u16(&mut self, value: u16) {
        let mut bytes = [0; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
    }

    /// Append raw bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append `payload`, prefixed with its one-byte length.
    pub fn push_length_prefixed(&mut self, payload: &[u8]) -> Result<(), EncodeError> {
        let length = u8::try_from(payload.len()).map_err(|_| EncodeError::PayloadTooLarge {
            length: payload.len(),
            max: MAX_PAYLOAD_LENGTH,
        })?;

        self.push(length);
        self.extend(payload);
        Ok(())
    }

    /// Finish encoding.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_clamps_by_default() {
        let encoder = Encoder::new(OverflowPolicy::Clamp);

        assert_eq!(encoder.field("acp_seid", 63, 6), Ok(63));
        assert_eq!(encoder.field("acp_seid", 100, 6), Ok(36));
        assert_eq!(encoder.field("transaction_label", 0x1F, 4), Ok(0x0F));
        assert_eq!(encoder.field("media_codec_type", 0xFF, 8), Ok(0xFF));
    }

    #[test]
    fn test_field_rejects_overflow() {
        let encoder = Encoder::new(OverflowPolicy::Reject);

        assert_eq!(
            encoder.field("media_type", 16, 4),
            Err(EncodeError::FieldOverflow {
                field: "media_type",
                value: 16,
                max: 15
            })
        );
    }

    #[test]
    fn test_length_prefix_limit() {
        let mut encoder = Encoder::new(OverflowPolicy::Clamp);

        encoder.push_length_prefixed(&[0xAA; 255]).unwrap();
        assert_eq!(
            encoder.push_length_prefixed(&[0xAA; 256]),
            Err(EncodeError::PayloadTooLarge { length: 256, max: 255 })
        );

        let bytes = encoder.into_bytes();
        assert_eq!(bytes.len(), 256);
        assert_eq!(bytes[0], 0xFF);
    }
}
