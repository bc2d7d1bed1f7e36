//! Cursor over a received payload.
use std::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};

use crate::message::ParseError;

/// Reads fields from the front of a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    span: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `span`.
    pub fn new(span: &'a [u8]) -> Self {
        Self { span }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], ParseError> {
        if self.span.len() < count {
            return Err(ParseError::TruncatedPacket {
                expected: count,
                found: self.span.len(),
            });
        }

        let (head, tail) = self.span.split_at(count);
        self.span = tail;
        Ok(head)
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    /// Read a little-endian `u16`.
    pub fn u16(&mut self) -> Result<u16, ParseError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    /// Read a SEID byte (bits 2 to 7).
    pub fn seid(&mut self) -> Result<u8, ParseError> {
        Ok((self.u8()? >> 2) & 0x3F)
    }

    /// Read a value of an enumerated wire type.
    pub fn enumerated<T>(&mut self) -> Result<T, ParseError>
    where
        T: TryFrom<u8, Error = ParseError>,
    {
        T::try_from(self.u8()?)
    }

    /// Consume everything that is left, borrowing it.
    pub fn tail(&mut self) -> &'a [u8] {
        core::mem::take(&mut self.span)
    }

    /// Consume everything that is left.
    pub fn rest(&mut self) -> Vec<u8> {
        self.tail().to_vec()
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.span
    }

    /// Ensure that the payload was fully consumed.
    pub fn finish(self) -> Result<(), ParseError> {
        match self.span.len() {
            0 => Ok(()),
            count => Err(ParseError::TrailingBytes { count }),
        }
    }
}
