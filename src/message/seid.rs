//! Stream endpoint descriptors, as returned by a discover response.
use byteorder::{ByteOrder, LittleEndian};
use proc_bitfield::bitfield;

use crate::message::codes::Tsep;
use crate::message::encoder::Encoder;
use crate::message::{EncodeError, ParseError};

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    /// A raw endpoint descriptor, read as a little-endian `u16`.
    ///
    /// Bits 0, 8 to 10 are reserved.
    pub struct RawSeidInformation(pub u16): Debug, FromStorage, IntoStorage {
        /// Media type of the endpoint (second byte, upper nibble).
        pub media_type: u8 @ 12..=15,
        /// Whether the endpoint is a source or a sink.
        pub tsep: u8 [try_get Tsep, set Tsep] @ 11..=11,
        /// The endpoint identifier (first byte, bits 2 to 7).
        pub acp_seid: u8 @ 2..=7,
        /// The endpoint is already configured by another peer.
        pub in_use: bool @ 1,
    }
}

/// Describes one stream endpoint of the acceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeidInformation {
    /// The endpoint is already configured by another peer.
    pub in_use: bool,
    /// The endpoint identifier (6 bits).
    pub acp_seid: u8,
    /// Direction of the endpoint.
    pub tsep: Tsep,
    /// Media type (4 bits), zero for audio.
    pub media_type: u8,
}

impl Default for SeidInformation {
    fn default() -> Self {
        Self {
            in_use: false,
            acp_seid: 0,
            tsep: Tsep::Source,
            media_type: 0,
        }
    }
}

impl SeidInformation {
    /// Encoded size in bytes.
    pub const SIZE: usize = 2;

    /// Describe an idle audio endpoint.
    pub fn new(acp_seid: u8, tsep: Tsep) -> Self {
        Self {
            acp_seid,
            tsep,
            ..Default::default()
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        Self::SIZE
    }

    /// Parse one descriptor, returning the remaining bytes.
    pub fn parse(span: &[u8]) -> Result<(Self, &[u8]), ParseError> {
        if span.len() < Self::SIZE {
            return Err(ParseError::TruncatedPacket {
                expected: Self::SIZE,
                found: span.len(),
            });
        }

        let raw = RawSeidInformation(LittleEndian::read_u16(&span[..Self::SIZE]));
        let information = Self {
            in_use: raw.in_use(),
            acp_seid: raw.acp_seid(),
            tsep: raw.tsep()?,
            media_type: raw.media_type(),
        };

        Ok((information, &span[Self::SIZE..]))
    }

    pub(crate) fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        let raw = RawSeidInformation(0)
            .with_in_use(self.in_use)
            .with_acp_seid(encoder.field("SeidInformation::acp_seid", self.acp_seid, 6)?)
            .with_tsep(self.tsep)
            .with_media_type(encoder.field("SeidInformation::media_type", self.media_type, 4)?);

        encoder.push_u16(raw.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::OverflowPolicy;

    #[test]
    fn test_seid_information_layout() {
        let information = SeidInformation {
            in_use: true,
            acp_seid: 1,
            tsep: Tsep::Sink,
            media_type: 0,
        };

        let mut encoder = Encoder::new(OverflowPolicy::Clamp);
        information.encode(&mut encoder).unwrap();
        assert_eq!(encoder.into_bytes(), [0x06, 0x08]);

        let (parsed, remaining) = SeidInformation::parse(&[0x06, 0x08, 0xAB]).unwrap();
        assert_eq!(parsed, information);
        assert_eq!(remaining, [0xAB]);
    }

    #[test]
    fn test_seid_information_ignores_reserved_bits() {
        let (parsed, _) = SeidInformation::parse(&[0x05, 0x17]).unwrap();

        assert!(!parsed.in_use);
        assert_eq!(parsed.acp_seid, 1);
        assert_eq!(parsed.tsep, Tsep::Source);
        assert_eq!(parsed.media_type, 1);
    }

    #[test]
    fn test_raw_seid_information_fields() {
        let raw = RawSeidInformation(LittleEndian::read_u16(&[0x06, 0x18]));

        assert!(raw.in_use());
        assert_eq!(raw.acp_seid(), 1);
        assert_eq!(raw.tsep(), Ok(Tsep::Sink));
        assert_eq!(raw.media_type(), 1);
    }

    #[test]
    fn test_seid_information_truncated() {
        assert_eq!(
            SeidInformation::parse(&[0x04]),
            Err(ParseError::TruncatedPacket { expected: 2, found: 1 })
        );
    }
}
