//! The AVDTP signaling wire codec.
//!
//! A [`SignalingPacket`] is a two byte header followed by a signal body. The header's message type
//! and signal identifier select the [`Signal`] variant. Bodies that are malformed for their
//! identity decode into [`Signal::Unknown`] instead of failing, as do unknown capabilities inside
//! capability lists.
pub mod capability;
pub mod codes;
mod display;
pub mod encoder;
pub mod header;
pub mod reader;
pub mod seid;
pub mod signal;

use std::vec::Vec;

use encoder::Encoder;
use header::{HEADER_SIZE, MessageType, PacketType, RawHeader, SignalIdentifier};
use signal::Signal;

/// Errors that can occur while parsing packets.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Fewer bytes are available than the layout requires.
    #[error("truncated packet (expected {expected} bytes, found {found})")]
    TruncatedPacket {
        /// The number of bytes required.
        expected: usize,
        /// The number of bytes available.
        found: usize,
    },
    /// An enumerated field holds a value outside of its known set.
    #[error("unrecognized {kind} value `{value}`")]
    UnrecognizedDiscriminant {
        /// Name of the enumerated type.
        kind: &'static str,
        /// The raw value.
        value: u8,
    },
    /// The header identity has no concrete signal form.
    #[error("header does not match any concrete signal")]
    ConstraintViolation,
    /// A body was longer than its layout.
    #[error("{count} trailing bytes after signal body")]
    TrailingBytes {
        /// The number of bytes left over.
        count: usize,
    },
}

/// Errors that can occur while serializing packets.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// A payload does not fit its one-byte length field.
    #[error("payload of {length} bytes exceeds maximum of {max}")]
    PayloadTooLarge {
        /// The payload length.
        length: usize,
        /// The largest encodable length.
        max: usize,
    },
    /// A field value does not fit its bit width.
    #[error("value {value} of field {field} exceeds maximum {max}")]
    FieldOverflow {
        /// Name of the field.
        field: &'static str,
        /// The value to encode.
        value: u8,
        /// The largest encodable value.
        max: u8,
    },
}

/// What to do with field values that are wider than their wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverflowPolicy {
    /// Mask the value to the field width and log a warning.
    #[default]
    Clamp,
    /// Fail with [`EncodeError::FieldOverflow`].
    Reject,
}

/// One AVDTP signaling packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalingPacket {
    /// Fragmentation marker.
    pub packet_type: PacketType,
    /// Label that pairs responses with commands (4 bits).
    pub transaction_label: u8,
    /// The signal body, which also determines message type and signal identifier.
    pub signal: Signal,
}

impl SignalingPacket {
    /// Create a single (unfragmented) packet.
    pub fn new(transaction_label: u8, signal: Signal) -> Self {
        Self {
            packet_type: PacketType::Single,
            transaction_label,
            signal,
        }
    }

    /// Create a reply to this packet, echoing its transaction label.
    pub fn reply(&self, signal: Signal) -> Self {
        Self::new(self.transaction_label, signal)
    }

    /// The message type implied by the signal.
    pub fn message_type(&self) -> MessageType {
        self.signal.message_type()
    }

    /// The signal identifier implied by the signal.
    pub fn signal_identifier(&self) -> SignalIdentifier {
        self.signal.signal_identifier()
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.signal.size()
    }

    /// Parse a packet from one received frame.
    ///
    /// Only the header can make this fail. A body that does not decode is kept as
    /// [`Signal::Unknown`].
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let header = RawHeader::from_bytes(data)?;
        let message_type = header.message_type()?;
        let signal_identifier = header.signal_identifier()?;
        let payload = &data[HEADER_SIZE..];

        let signal = match Signal::parse_body(message_type, signal_identifier, payload) {
            Ok(signal) => signal,
            Err(error) => {
                warn!(
                    "Keeping raw body of {:?} {:?}: {:?}",
                    message_type, signal_identifier, error
                );

                Signal::Unknown {
                    message_type,
                    signal_identifier,
                    payload: payload.to_vec(),
                }
            }
        };

        Ok(Self {
            packet_type: header.packet_type()?,
            transaction_label: header.transaction_label(),
            signal,
        })
    }

    /// Serialize the packet, clamping over-wide fields.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        self.to_bytes_with(OverflowPolicy::default())
    }

    /// Serialize the packet with an explicit overflow policy.
    pub fn to_bytes_with(&self, policy: OverflowPolicy) -> Result<Vec<u8>, EncodeError> {
        let mut encoder = Encoder::new(policy);

        let header = RawHeader::new(
            self.message_type(),
            self.packet_type,
            encoder.field("transaction_label", self.transaction_label, 4)?,
            self.signal_identifier(),
        );
        encoder.extend(&header.to_bytes());
        self.signal.encode_body(&mut encoder)?;

        Ok(encoder.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::capability::ServiceCapability;
    use super::codes::{ErrorCode, Tsep};
    use std::collections::HashSet;

    use super::seid::SeidInformation;
    use super::signal::SignalKind;
    use super::*;

    // Set configuration command, label 3, acp 1, int 2, media transport and SBC codec.
    const SET_CONFIGURATION: [u8; 14] = [
        0x30, 0x03, 0x04, 0x08, 0x01, 0x00, 0x07, 0x06, 0x00, 0x00, 0xFF, 0xFF, 0x02, 0x35,
    ];

    #[test]
    fn test_parse_set_configuration() {
        let packet = SignalingPacket::parse(&SET_CONFIGURATION).unwrap();

        assert_eq!(packet.transaction_label, 3);
        assert_eq!(packet.packet_type, PacketType::Single);
        assert_eq!(packet.message_type(), MessageType::Command);
        assert_eq!(packet.signal_identifier(), SignalIdentifier::SetConfiguration);
        assert_eq!(
            packet.signal,
            Signal::SetConfigurationCommand {
                acp_seid: 1,
                int_seid: 2,
                service_capabilities: vec![
                    ServiceCapability::MediaTransport,
                    ServiceCapability::MediaCodec {
                        media_type: 0,
                        media_codec_type: 0,
                        codec_specific_information: vec![0xFF, 0xFF, 0x02, 0x35],
                    },
                ],
            }
        );
        assert_eq!(packet.size(), SET_CONFIGURATION.len());
        assert_eq!(packet.to_bytes().unwrap(), SET_CONFIGURATION);
    }

    fn sample_capabilities() -> Vec<ServiceCapability> {
        vec![
            ServiceCapability::MediaTransport,
            ServiceCapability::Recovery {
                recovery_type: 1,
                maximum_recovery_window_size: 2,
                maximum_number_of_media_packets_in_parity_code: 3,
            },
            ServiceCapability::MediaCodec {
                media_type: 0,
                media_codec_type: 0,
                codec_specific_information: vec![0xFF, 0xFF, 0x02, 0x35],
            },
            ServiceCapability::Generic {
                service_category: 0x42,
                payload: vec![0x01],
            },
        ]
    }

    fn every_signal() -> Vec<Signal> {
        let reject = ErrorCode::BadState;

        vec![
            Signal::DiscoverCommand,
            Signal::DiscoverResponse {
                seid_information: vec![
                    SeidInformation {
                        in_use: true,
                        acp_seid: 63,
                        tsep: Tsep::Sink,
                        media_type: 15,
                    },
                    SeidInformation::new(2, Tsep::Source),
                ],
            },
            Signal::DiscoverReject { error_code: reject },
            Signal::GetCapabilitiesCommand { acp_seid: 1 },
            Signal::GetCapabilitiesResponse {
                service_capabilities: sample_capabilities(),
            },
            Signal::GetCapabilitiesReject {
                error_code: ErrorCode::BadAcpSeid,
            },
            Signal::GetAllCapabilitiesCommand { acp_seid: 2 },
            Signal::GetAllCapabilitiesResponse {
                service_capabilities: sample_capabilities(),
            },
            Signal::GetAllCapabilitiesReject {
                error_code: ErrorCode::BadLength,
            },
            Signal::SetConfigurationCommand {
                acp_seid: 3,
                int_seid: 4,
                service_capabilities: sample_capabilities(),
            },
            Signal::SetConfigurationResponse,
            Signal::SetConfigurationReject {
                service_category: 0x07,
                error_code: ErrorCode::UnsupportedConfiguration,
            },
            Signal::GetConfigurationCommand { acp_seid: 5 },
            Signal::GetConfigurationResponse {
                service_capabilities: vec![ServiceCapability::DelayReporting],
            },
            Signal::GetConfigurationReject { error_code: reject },
            Signal::ReconfigureCommand {
                acp_seid: 6,
                service_capabilities: sample_capabilities(),
            },
            Signal::ReconfigureResponse,
            Signal::ReconfigureReject {
                service_category: 0x07,
                error_code: ErrorCode::A2dpInvalidSamplingFrequency,
            },
            Signal::OpenCommand { acp_seid: 7 },
            Signal::OpenResponse,
            Signal::OpenReject { error_code: reject },
            Signal::StartCommand { acp_seid: 8 },
            Signal::StartResponse,
            Signal::StartReject {
                acp_seid: 8,
                error_code: reject,
            },
            Signal::CloseCommand { acp_seid: 9 },
            Signal::CloseResponse,
            Signal::CloseReject { error_code: reject },
            Signal::SuspendCommand { acp_seid: 10 },
            Signal::SuspendResponse,
            Signal::SuspendReject {
                acp_seid: 10,
                error_code: reject,
            },
            Signal::AbortCommand { acp_seid: 11 },
            Signal::AbortResponse,
            Signal::SecurityControlCommand {
                acp_seid: 12,
                content_protection_data: vec![0x01, 0x02],
            },
            Signal::SecurityControlResponse {
                content_protection_data: vec![0x10, 0x20],
            },
            Signal::SecurityControlReject {
                error_code: ErrorCode::BadCpFormat,
            },
            Signal::GeneralReject {
                signal_identifier: SignalIdentifier::DelayReport,
            },
            Signal::delay_report(13, 250),
            Signal::DelayReportResponse,
            Signal::DelayReportReject { error_code: reject },
        ]
    }

    #[test]
    fn test_round_trip_variants() {
        let signals = every_signal();

        let kinds: HashSet<SignalKind> = signals.iter().map(Signal::kind).collect();
        assert_eq!(kinds.len(), 39);
        assert_eq!(kinds.len(), signals.len());
        assert!(!kinds.contains(&SignalKind::Unknown));

        for signal in signals {
            let packet = SignalingPacket {
                packet_type: PacketType::Continue,
                transaction_label: 0x0A,
                signal,
            };

            let bytes = packet.to_bytes().unwrap();
            assert_eq!(bytes.len(), packet.size());
            assert_eq!(SignalingPacket::parse(&bytes).unwrap(), packet);
        }
    }

    #[test]
    fn test_header_constraint_selects_variant() {
        // A discover command with a trailing byte must never become a different concrete signal.
        let packet = SignalingPacket::parse(&[0x00, 0x01, 0x04]).unwrap();

        assert_eq!(
            packet.signal,
            Signal::Unknown {
                message_type: MessageType::Command,
                signal_identifier: SignalIdentifier::Discover,
                payload: vec![0x04],
            }
        );
        assert_eq!(packet.to_bytes().unwrap(), [0x00, 0x01, 0x04]);

        let packet = SignalingPacket::parse(&[0x00, 0x01]).unwrap();
        assert_eq!(packet.signal, Signal::DiscoverCommand);
    }

    #[test]
    fn test_abort_reject_is_unknown() {
        let packet = SignalingPacket::parse(&[0x03, 0x0A, 0x31]).unwrap();

        assert_eq!(packet.signal.kind(), signal::SignalKind::Unknown);
        assert_eq!(packet.message_type(), MessageType::ResponseReject);
        assert_eq!(packet.signal_identifier(), SignalIdentifier::Abort);
    }

    #[test]
    fn test_unknown_error_code_falls_back() {
        let packet = SignalingPacket::parse(&[0x23, 0x06, 0x77]).unwrap();

        assert_eq!(packet.transaction_label, 2);
        assert!(matches!(packet.signal, Signal::Unknown { .. }));
    }

    #[test]
    fn test_top_level_errors() {
        assert_eq!(
            SignalingPacket::parse(&[0x00]),
            Err(ParseError::TruncatedPacket { expected: 2, found: 1 })
        );
        assert_eq!(
            SignalingPacket::parse(&[0x00, 0x3F]),
            Err(ParseError::UnrecognizedDiscriminant {
                kind: "SignalIdentifier",
                value: 0x3F
            })
        );
    }

    #[test]
    fn test_field_clamping() {
        let packet = SignalingPacket::new(0, Signal::GetCapabilitiesCommand { acp_seid: 100 });

        let bytes = packet.to_bytes().unwrap();
        assert_eq!(bytes, [0x00, 0x02, 36 << 2]);
        assert_eq!(
            SignalingPacket::parse(&bytes).unwrap().signal,
            Signal::GetCapabilitiesCommand { acp_seid: 36 }
        );

        assert_eq!(
            packet.to_bytes_with(OverflowPolicy::Reject),
            Err(EncodeError::FieldOverflow {
                field: "acp_seid",
                value: 100,
                max: 63
            })
        );

        let packet = SignalingPacket::new(0x13, Signal::DiscoverCommand);
        assert_eq!(packet.to_bytes().unwrap(), [0x30, 0x01]);
    }

    #[test]
    fn test_reply_echoes_label() {
        let command = SignalingPacket::new(7, Signal::OpenCommand { acp_seid: 1 });
        let response = command.reply(Signal::OpenResponse);

        assert_eq!(response.transaction_label, 7);
        assert_eq!(response.to_bytes().unwrap(), [0x72, 0x06]);
    }
}
