//! Service capabilities, the TLV elements of capability and configuration lists.
//!
//! Every capability is framed as a category byte, a length byte and `length` payload bytes.
//! Unknown categories and malformed payloads decode into [`ServiceCapability::Generic`], so that a
//! single odd element never aborts the parse of a whole list.
use std::vec::Vec;

use proc_bitfield::bitfield;

use crate::message::codes::ServiceCategory;
use crate::message::encoder::Encoder;
use crate::message::reader::Reader;
use crate::message::{EncodeError, OverflowPolicy, ParseError};

/// Size of the category and length bytes.
pub const CAPABILITY_HEADER_SIZE: usize = 2;

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    struct HeaderCompressionFlags(pub u8): Debug, FromStorage, IntoStorage {
        pub back_ch: bool @ 7,
        pub media: bool @ 6,
        pub recovery: bool @ 5,
    }
}

/// One service capability.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceCapability {
    /// Basic media transport, no payload.
    MediaTransport,
    /// Reporting service, no payload.
    Reporting,
    /// Recovery service.
    Recovery {
        /// Recovery type, 0x01 for RFC 2733.
        recovery_type: u8,
        /// Maximum recovery window size.
        maximum_recovery_window_size: u8,
        /// Maximum number of media packets in a parity code.
        maximum_number_of_media_packets_in_parity_code: u8,
    },
    /// Content protection.
    ContentProtection {
        /// Content protection scheme.
        cp_type: u16,
        /// Scheme specific value.
        payload: Vec<u8>,
    },
    /// Robust header compression.
    HeaderCompression {
        /// Compression of the recovery channel.
        recovery: bool,
        /// Compression of the media channel.
        media: bool,
        /// A back channel is available.
        back_ch: bool,
    },
    /// Multiplexing service.
    Multiplexing {
        /// Adaptation layer fragmentation.
        frag: bool,
        /// Transport session identifiers.
        payload: Vec<u8>,
    },
    /// Media codec.
    MediaCodec {
        /// Media type (4 bits), zero for audio.
        media_type: u8,
        /// Codec, e.g. zero for SBC.
        media_codec_type: u8,
        /// Codec specific information elements.
        codec_specific_information: Vec<u8>,
    },
    /// Delay reporting, no payload.
    DelayReporting,
    /// Capability that did not decode into any of the known forms.
    Generic {
        /// Raw category byte.
        service_category: u8,
        /// Raw payload.
        payload: Vec<u8>,
    },
}

impl ServiceCapability {
    /// The raw category byte.
    pub fn service_category(&self) -> u8 {
        match self {
            Self::Generic { service_category, .. } => *service_category,
            _ => self.category().map(u8::from).unwrap_or_default(),
        }
    }

    /// The category, if known.
    pub fn category(&self) -> Option<ServiceCategory> {
        Some(match self {
            Self::MediaTransport => ServiceCategory::MediaTransport,
            Self::Reporting => ServiceCategory::Reporting,
            Self::Recovery { .. } => ServiceCategory::Recovery,
            Self::ContentProtection { .. } => ServiceCategory::ContentProtection,
            Self::HeaderCompression { .. } => ServiceCategory::HeaderCompression,
            Self::Multiplexing { .. } => ServiceCategory::Multiplexing,
            Self::MediaCodec { .. } => ServiceCategory::MediaCodec,
            Self::DelayReporting => ServiceCategory::DelayReporting,
            Self::Generic { service_category, .. } => return ServiceCategory::try_from(*service_category).ok(),
        })
    }

    /// Encoded size in bytes, including category and length.
    pub fn size(&self) -> usize {
        CAPABILITY_HEADER_SIZE
            + match self {
                Self::MediaTransport | Self::Reporting | Self::DelayReporting => 0,
                Self::Recovery { .. } => 3,
                Self::ContentProtection { payload, .. } => 2 + payload.len(),
                Self::HeaderCompression { .. } => 1,
                Self::Multiplexing { payload, .. } => 1 + payload.len(),
                Self::MediaCodec {
                    codec_specific_information,
                    ..
                } => 2 + codec_specific_information.len(),
                Self::Generic { payload, .. } => payload.len(),
            }
    }

    /// Parse one capability, returning the bytes that follow it.
    pub fn parse(span: &[u8]) -> Result<(Self, &[u8]), ParseError> {
        let mut reader = Reader::new(span);
        let service_category = reader.u8()?;
        let length = usize::from(reader.u8()?);

        let remaining = reader.remaining();
        if remaining.len() < length {
            return Err(ParseError::TruncatedPacket {
                expected: CAPABILITY_HEADER_SIZE + length,
                found: span.len(),
            });
        }
        let (payload, remaining) = remaining.split_at(length);

        let capability = match Self::parse_payload(service_category, payload) {
            Ok(capability) => capability,
            Err(error) => {
                if ServiceCategory::try_from(service_category).is_ok() {
                    warn!(
                        "Malformed capability of category {}, keeping raw payload: {:?}",
                        service_category, error
                    );
                }

                Self::Generic {
                    service_category,
                    payload: payload.to_vec(),
                }
            }
        };

        Ok((capability, remaining))
    }

    /// Parse a list of capabilities that spans the whole of `span`.
    pub fn parse_list(span: &[u8]) -> Result<Vec<Self>, ParseError> {
        let mut capabilities = Vec::new();
        let mut span = span;

        while !span.is_empty() {
            let (capability, remaining) = Self::parse(span)?;
            capabilities.push(capability);
            span = remaining;
        }

        Ok(capabilities)
    }

    fn parse_payload(service_category: u8, payload: &[u8]) -> Result<Self, ParseError> {
        let mut reader = Reader::new(payload);

        let capability = match ServiceCategory::try_from(service_category)? {
            ServiceCategory::MediaTransport => Self::MediaTransport,
            ServiceCategory::Reporting => Self::Reporting,
            ServiceCategory::Recovery => Self::Recovery {
                recovery_type: reader.u8()?,
                maximum_recovery_window_size: reader.u8()?,
                maximum_number_of_media_packets_in_parity_code: reader.u8()?,
            },
            ServiceCategory::ContentProtection => Self::ContentProtection {
                cp_type: reader.u16()?,
                payload: reader.rest(),
            },
            ServiceCategory::HeaderCompression => {
                let flags = HeaderCompressionFlags(reader.u8()?);
                Self::HeaderCompression {
                    recovery: flags.recovery(),
                    media: flags.media(),
                    back_ch: flags.back_ch(),
                }
            }
            ServiceCategory::Multiplexing => Self::Multiplexing {
                frag: reader.u8()? & 0x80 != 0,
                payload: reader.rest(),
            },
            ServiceCategory::MediaCodec => Self::MediaCodec {
                media_type: reader.u8()? >> 4,
                media_codec_type: reader.u8()?,
                codec_specific_information: reader.rest(),
            },
            ServiceCategory::DelayReporting => Self::DelayReporting,
        };

        reader.finish()?;
        Ok(capability)
    }

    /// Serialize the capability with the default overflow policy.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder::new(OverflowPolicy::default());
        self.encode(&mut encoder)?;
        Ok(encoder.into_bytes())
    }

    pub(crate) fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        let mut payload = encoder.nested();

        match self {
            Self::MediaTransport | Self::Reporting | Self::DelayReporting => {}
            Self::Recovery {
                recovery_type,
                maximum_recovery_window_size,
                maximum_number_of_media_packets_in_parity_code,
            } => {
                payload.push(*recovery_type);
                payload.push(*maximum_recovery_window_size);
                payload.push(*maximum_number_of_media_packets_in_parity_code);
            }
            Self::ContentProtection { cp_type, payload: data } => {
                payload.push_u16(*cp_type);
                payload.extend(data);
            }
            Self::HeaderCompression {
                recovery,
                media,
                back_ch,
            } => {
                let flags = HeaderCompressionFlags(0)
                    .with_recovery(*recovery)
                    .with_media(*media)
                    .with_back_ch(*back_ch);
                payload.push(flags.0);
            }
            Self::Multiplexing { frag, payload: data } => {
                payload.push(u8::from(*frag) << 7);
                payload.extend(data);
            }
            Self::MediaCodec {
                media_type,
                media_codec_type,
                codec_specific_information,
            } => {
                let media_type = payload.field("MediaCodecCapability::media_type", *media_type, 4)?;
                payload.push(media_type << 4);
                payload.push(*media_codec_type);
                payload.extend(codec_specific_information);
            }
            Self::Generic { payload: data, .. } => payload.extend(data),
        }

        encoder.push(self.service_category());
        encoder.push_length_prefixed(&payload.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_codec_capability() {
        let bytes = [0x07, 0x06, 0x00, 0x00, 0xFF, 0xFF, 0x02, 0x35];
        let (capability, remaining) = ServiceCapability::parse(&bytes).unwrap();

        assert!(remaining.is_empty());
        assert_eq!(
            capability,
            ServiceCapability::MediaCodec {
                media_type: 0,
                media_codec_type: 0,
                codec_specific_information: vec![0xFF, 0xFF, 0x02, 0x35],
            }
        );
        assert_eq!(capability.size(), 8);
        assert_eq!(capability.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_fixed_layouts() {
        let bytes = [
            0x01, 0x00, // media transport
            0x03, 0x03, 0x01, 0x10, 0x08, // recovery
            0x04, 0x03, 0x02, 0x00, 0xAA, // content protection
            0x05, 0x01, 0xA0, // header compression
            0x06, 0x02, 0x80, 0x11, // multiplexing
            0x08, 0x00, // delay reporting
        ];
        let capabilities = ServiceCapability::parse_list(&bytes).unwrap();

        assert_eq!(
            capabilities,
            [
                ServiceCapability::MediaTransport,
                ServiceCapability::Recovery {
                    recovery_type: 1,
                    maximum_recovery_window_size: 0x10,
                    maximum_number_of_media_packets_in_parity_code: 8,
                },
                ServiceCapability::ContentProtection {
                    cp_type: 2,
                    payload: vec![0xAA],
                },
                ServiceCapability::HeaderCompression {
                    recovery: true,
                    media: false,
                    back_ch: true,
                },
                ServiceCapability::Multiplexing {
                    frag: true,
                    payload: vec![0x11],
                },
                ServiceCapability::DelayReporting,
            ]
        );

        let encoded: Vec<u8> = capabilities
            .iter()
            .flat_map(|capability| capability.to_bytes().unwrap())
            .collect();
        assert_eq!(encoded, bytes);
    }

    #[test]
    fn test_round_trip_every_category() {
        let capabilities = [
            ServiceCapability::MediaTransport,
            ServiceCapability::Reporting,
            ServiceCapability::Recovery {
                recovery_type: 1,
                maximum_recovery_window_size: 0xFF,
                maximum_number_of_media_packets_in_parity_code: 0x18,
            },
            ServiceCapability::ContentProtection {
                cp_type: 0x0002,
                payload: vec![],
            },
            ServiceCapability::ContentProtection {
                cp_type: 0x1234,
                payload: vec![0x01, 0x02, 0x03],
            },
            ServiceCapability::HeaderCompression {
                recovery: false,
                media: true,
                back_ch: false,
            },
            ServiceCapability::Multiplexing {
                frag: false,
                payload: vec![0x10, 0x20],
            },
            ServiceCapability::MediaCodec {
                media_type: 0,
                media_codec_type: 0,
                codec_specific_information: vec![0xFF, 0xFF, 0x02, 0x35],
            },
            ServiceCapability::MediaCodec {
                media_type: 1,
                media_codec_type: 0xFF,
                codec_specific_information: vec![],
            },
            ServiceCapability::DelayReporting,
            ServiceCapability::Generic {
                service_category: 0x42,
                payload: vec![0x01, 0x02],
            },
            ServiceCapability::Generic {
                service_category: 0x00,
                payload: vec![],
            },
        ];

        for capability in &capabilities {
            let bytes = capability.to_bytes().unwrap();
            assert_eq!(bytes.len(), capability.size());

            let (parsed, remaining) = ServiceCapability::parse(&bytes).unwrap();
            assert!(remaining.is_empty());
            assert_eq!(&parsed, capability);
        }

        let list: Vec<u8> = capabilities
            .iter()
            .flat_map(|capability| capability.to_bytes().unwrap())
            .collect();
        assert_eq!(ServiceCapability::parse_list(&list).unwrap(), capabilities);
    }

    #[test]
    fn test_generic_fallback_is_idempotent() {
        // Unknown category.
        let bytes = [0x2A, 0x03, 0x01, 0x02, 0x03];
        let (capability, _) = ServiceCapability::parse(&bytes).unwrap();

        assert_eq!(
            capability,
            ServiceCapability::Generic {
                service_category: 0x2A,
                payload: vec![1, 2, 3],
            }
        );
        assert_eq!(capability.category(), None);
        assert_eq!(capability.to_bytes().unwrap(), bytes);

        // Known category with a malformed payload.
        let bytes = [0x03, 0x02, 0x01, 0x02];
        let (capability, _) = ServiceCapability::parse(&bytes).unwrap();

        assert_eq!(capability.category(), Some(ServiceCategory::Recovery));
        assert!(matches!(capability, ServiceCapability::Generic { .. }));
        assert_eq!(capability.to_bytes().unwrap(), bytes);

        // Empty capabilities must stay empty.
        let (capability, _) = ServiceCapability::parse(&[0x01, 0x01, 0x00]).unwrap();
        assert!(matches!(capability, ServiceCapability::Generic { .. }));
    }

    #[test]
    fn test_truncated_capability() {
        assert_eq!(
            ServiceCapability::parse(&[0x07, 0x04, 0x00]),
            Err(ParseError::TruncatedPacket { expected: 6, found: 3 })
        );
        assert_eq!(
            ServiceCapability::parse(&[0x07]),
            Err(ParseError::TruncatedPacket { expected: 1, found: 0 })
        );
    }

    #[test]
    fn test_payload_too_large() {
        let capability = ServiceCapability::MediaCodec {
            media_type: 0,
            media_codec_type: 0,
            codec_specific_information: vec![0; 254],
        };

        assert_eq!(
            capability.to_bytes(),
            Err(EncodeError::PayloadTooLarge { length: 256, max: 255 })
        );
    }

    #[test]
    fn test_media_type_clamped() {
        let capability = ServiceCapability::MediaCodec {
            media_type: 0x1F,
            media_codec_type: 2,
            codec_specific_information: vec![],
        };

        assert_eq!(capability.to_bytes().unwrap(), [0x07, 0x02, 0xF0, 0x02]);
    }
}
