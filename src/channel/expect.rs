//! Expectations that received signals are matched against.
use std::vec::Vec;

use crate::message::SignalingPacket;
use crate::message::capability::ServiceCapability;
use crate::message::header::{MessageType, SignalIdentifier};
use crate::message::seid::SeidInformation;
use crate::message::signal::{Signal, SignalKind};

/// An expected field value, either exact or a wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Expected<T> {
    /// The field must equal this value.
    Exact(T),
    /// The field may hold any value.
    Any,
}

impl<T: PartialEq> Expected<T> {
    /// Whether `value` satisfies the expectation.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Exact(expected) => expected == value,
            Self::Any => true,
        }
    }
}

impl<T> From<T> for Expected<T> {
    fn from(value: T) -> Self {
        Self::Exact(value)
    }
}

/// A field of a signaling packet that a [`SignalPattern`] can leave open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// The fragmentation marker.
    PacketType,
    /// The transaction label.
    TransactionLabel,
    /// The acceptor SEID.
    AcpSeid,
    /// The initiator SEID of a set configuration command.
    IntSeid,
    /// The error code of a reject.
    ErrorCode,
    /// The rejected capability category of a configuration reject.
    ServiceCategory,
    /// The upper delay byte of a delay report.
    DelayMsb,
    /// The lower delay byte of a delay report.
    DelayLsb,
    /// The content protection data of a security control signal.
    ContentProtectionData,
    /// The whole capability list.
    ServiceCapabilities,
    /// The whole endpoint list of a discover response.
    SeidInformation,
}

impl Field {
    /// Copy this field from `from` into `to`, if both carry it.
    fn copy(self, from: &SignalingPacket, to: &mut SignalingPacket) {
        fn set<T>(to: Option<&mut T>, from: Option<T>) {
            if let (Some(to), Some(from)) = (to, from) {
                *to = from;
            }
        }

        let (source, target) = (&from.signal, &mut to.signal);
        match self {
            Self::PacketType => to.packet_type = from.packet_type,
            Self::TransactionLabel => to.transaction_label = from.transaction_label,
            Self::AcpSeid => set(target.acp_seid_mut(), source.acp_seid()),
            Self::IntSeid => set(target.int_seid_mut(), source.int_seid()),
            Self::ErrorCode => set(target.error_code_mut(), source.error_code()),
            Self::ServiceCategory => set(target.service_category_mut(), source.service_category()),
            Self::DelayMsb => set(
                target.delay_bytes_mut().map(|(msb, _)| msb),
                source.delay_bytes().map(|(msb, _)| msb),
            ),
            Self::DelayLsb => set(
                target.delay_bytes_mut().map(|(_, lsb)| lsb),
                source.delay_bytes().map(|(_, lsb)| lsb),
            ),
            Self::ContentProtectionData => set(
                target.content_protection_data_mut(),
                source.content_protection_data().map(<[u8]>::to_vec),
            ),
            Self::ServiceCapabilities => set(
                target.service_capabilities_mut(),
                source.service_capabilities().map(<[ServiceCapability]>::to_vec),
            ),
            Self::SeidInformation => set(
                target.seid_information_mut(),
                source.seid_information().map(<[SeidInformation]>::to_vec),
            ),
        }
    }
}

/// Check `received` element by element against `pattern`, then replace it with `substitute`.
///
/// The lists must have the same length.
fn match_elements<T: PartialEq + Clone>(
    received: Option<&mut Vec<T>>,
    substitute: Option<&[T]>,
    pattern: &[Expected<T>],
) -> bool {
    let (Some(received), Some(substitute)) = (received, substitute) else {
        return false;
    };

    let matches = received.len() == pattern.len()
        && received
            .iter()
            .zip(pattern)
            .all(|(value, expected)| expected.matches(value));
    if matches {
        *received = substitute.to_vec();
    }
    matches
}

/// A partially specified signaling packet.
///
/// Starts out matching exactly one packet. Builder methods turn individual fields into
/// wildcards, or match list fields element by element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalPattern {
    packet: SignalingPacket,
    wildcards: Vec<Field>,
    service_capabilities: Option<Vec<Expected<ServiceCapability>>>,
    seid_information: Option<Vec<Expected<SeidInformation>>>,
}

impl SignalPattern {
    /// Expect `signal` in a single packet with transaction label zero.
    pub fn new(signal: Signal) -> Self {
        Self::from(SignalingPacket::new(0, signal))
    }

    /// Accept any value in `field`.
    ///
    /// Fields the signal does not carry are ignored. Replaces an element-wise match of the same
    /// list.
    pub fn any(mut self, field: Field) -> Self {
        match field {
            Field::ServiceCapabilities => self.service_capabilities = None,
            Field::SeidInformation => self.seid_information = None,
            _ => {}
        }
        if !self.wildcards.contains(&field) {
            self.wildcards.push(field);
        }
        self
    }

    fn exact(&mut self, field: Field) {
        self.wildcards.retain(|wildcard| *wildcard != field);
    }

    /// Accept any transaction label.
    pub fn any_transaction_label(self) -> Self {
        self.any(Field::TransactionLabel)
    }

    /// Expect an exact transaction label.
    pub fn transaction_label(mut self, transaction_label: u8) -> Self {
        self.packet.transaction_label = transaction_label;
        self.exact(Field::TransactionLabel);
        self
    }

    /// Accept any packet type.
    pub fn any_packet_type(self) -> Self {
        self.any(Field::PacketType)
    }

    /// Accept any acceptor SEID.
    pub fn any_acp_seid(self) -> Self {
        self.any(Field::AcpSeid)
    }

    /// Accept any initiator SEID.
    pub fn any_int_seid(self) -> Self {
        self.any(Field::IntSeid)
    }

    /// Match the capability list element by element.
    ///
    /// The list must have the same length as the received one.
    pub fn service_capabilities(mut self, service_capabilities: Vec<Expected<ServiceCapability>>) -> Self {
        self.exact(Field::ServiceCapabilities);
        self.service_capabilities = Some(service_capabilities);
        self
    }

    /// Match the endpoint list of a discover response element by element.
    ///
    /// The list must have the same length as the received one.
    pub fn seid_information(mut self, seid_information: Vec<Expected<SeidInformation>>) -> Self {
        self.exact(Field::SeidInformation);
        self.seid_information = Some(seid_information);
        self
    }

    /// Whether `packet` matches the pattern.
    pub fn matches(&self, packet: &SignalingPacket) -> bool {
        let expected = &self.packet;
        if packet.signal.kind() != expected.signal.kind()
            || packet.message_type() != expected.message_type()
            || packet.signal_identifier() != expected.signal_identifier()
        {
            return false;
        }

        // Overwrite open fields with the pattern's own values, then compare the rest.
        let mut normalized = packet.clone();
        for field in &self.wildcards {
            field.copy(expected, &mut normalized);
        }

        if let Some(pattern) = &self.service_capabilities {
            if !match_elements(
                normalized.signal.service_capabilities_mut(),
                expected.signal.service_capabilities(),
                pattern,
            ) {
                return false;
            }
        }
        if let Some(pattern) = &self.seid_information {
            if !match_elements(
                normalized.signal.seid_information_mut(),
                expected.signal.seid_information(),
                pattern,
            ) {
                return false;
            }
        }

        normalized == *expected
    }
}

impl From<SignalingPacket> for SignalPattern {
    fn from(packet: SignalingPacket) -> Self {
        Self {
            packet,
            wildcards: Vec::new(),
            service_capabilities: None,
            seid_information: None,
        }
    }
}

/// What `expect_signal` waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Expectation {
    /// Any signal of this kind.
    Kind(SignalKind),
    /// A signal matching the pattern.
    Pattern(SignalPattern),
    /// Any reply (accept, reject or general reject) to a command.
    Reply {
        /// Label of the command.
        transaction_label: u8,
        /// Identifier of the command.
        signal_identifier: SignalIdentifier,
    },
}

impl Expectation {
    /// Whether `packet` meets the expectation.
    pub fn matches(&self, packet: &SignalingPacket) -> bool {
        match self {
            Self::Kind(kind) => packet.signal.kind() == *kind,
            Self::Pattern(pattern) => pattern.matches(packet),
            Self::Reply {
                transaction_label,
                signal_identifier,
            } => {
                packet.message_type() != MessageType::Command
                    && packet.transaction_label == *transaction_label
                    && packet.signal_identifier() == *signal_identifier
            }
        }
    }
}

impl From<SignalKind> for Expectation {
    fn from(kind: SignalKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<SignalPattern> for Expectation {
    fn from(pattern: SignalPattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<SignalingPacket> for Expectation {
    fn from(packet: SignalingPacket) -> Self {
        Self::Pattern(packet.into())
    }
}

impl From<Signal> for Expectation {
    fn from(signal: Signal) -> Self {
        Self::Pattern(SignalPattern::new(signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::codes::{ErrorCode, Tsep};
    use crate::message::header::PacketType;

    fn packet(transaction_label: u8, signal: Signal) -> SignalingPacket {
        SignalingPacket::new(transaction_label, signal)
    }

    #[test]
    fn test_any_transaction_label() {
        let pattern = SignalPattern::new(Signal::OpenCommand { acp_seid: 1 }).any_transaction_label();

        for label in 0..=15 {
            assert!(pattern.matches(&packet(label, Signal::OpenCommand { acp_seid: 1 })));
        }
        assert!(!pattern.matches(&packet(3, Signal::OpenCommand { acp_seid: 2 })));
        assert!(!pattern.matches(&packet(3, Signal::StartCommand { acp_seid: 1 })));

        let mut fragmented = packet(3, Signal::OpenCommand { acp_seid: 1 });
        fragmented.packet_type = PacketType::Start;
        assert!(!pattern.matches(&fragmented));
        assert!(pattern.clone().any_packet_type().matches(&fragmented));
    }

    #[test]
    fn test_exact_packet() {
        let expected: Expectation = packet(4, Signal::OpenResponse).into();

        assert!(expected.matches(&packet(4, Signal::OpenResponse)));
        assert!(!expected.matches(&packet(5, Signal::OpenResponse)));
    }

    #[test]
    fn test_any_seids_and_capabilities() {
        let pattern = SignalPattern::new(Signal::SetConfigurationCommand {
            acp_seid: 0,
            int_seid: 0,
            service_capabilities: vec![],
        })
        .any_transaction_label()
        .any_acp_seid()
        .any_int_seid()
        .service_capabilities(vec![
            Expected::Exact(ServiceCapability::MediaTransport),
            Expected::Any,
        ]);

        let received = packet(
            9,
            Signal::SetConfigurationCommand {
                acp_seid: 1,
                int_seid: 2,
                service_capabilities: vec![
                    ServiceCapability::MediaTransport,
                    ServiceCapability::MediaCodec {
                        media_type: 0,
                        media_codec_type: 0,
                        codec_specific_information: vec![0x21, 0x15, 0x02, 0x35],
                    },
                ],
            },
        );
        assert!(pattern.matches(&received));

        // The list length must match.
        let short = packet(
            9,
            Signal::SetConfigurationCommand {
                acp_seid: 1,
                int_seid: 2,
                service_capabilities: vec![ServiceCapability::MediaTransport],
            },
        );
        assert!(!pattern.matches(&short));

        let wrong_first = packet(
            9,
            Signal::SetConfigurationCommand {
                acp_seid: 1,
                int_seid: 2,
                service_capabilities: vec![ServiceCapability::DelayReporting, ServiceCapability::MediaTransport],
            },
        );
        assert!(!pattern.matches(&wrong_first));
    }

    #[test]
    fn test_any_delay_bytes() {
        let pattern = SignalPattern::new(Signal::DelayReportCommand {
            acp_seid: 1,
            delay_msb: 0,
            delay_lsb: 0,
        })
        .any_transaction_label()
        .any(Field::DelayMsb)
        .any(Field::DelayLsb);

        assert!(pattern.matches(&packet(3, Signal::delay_report(1, 100))));
        assert!(pattern.matches(&packet(3, Signal::delay_report(1, 250))));
        assert!(!pattern.matches(&packet(3, Signal::delay_report(2, 100))));

        // 100 ms is 3/232, 200 ms is 7/208.
        let lower_open = SignalPattern::new(Signal::DelayReportCommand {
            acp_seid: 1,
            delay_msb: 3,
            delay_lsb: 0,
        })
        .any(Field::DelayLsb);
        assert!(lower_open.matches(&packet(0, Signal::delay_report(1, 100))));
        assert!(!lower_open.matches(&packet(0, Signal::delay_report(1, 200))));
    }

    #[test]
    fn test_any_service_category_and_error_code() {
        let pattern = SignalPattern::new(Signal::SetConfigurationReject {
            service_category: 0,
            error_code: ErrorCode::UnsupportedConfiguration,
        })
        .any(Field::ServiceCategory);

        let reject = |service_category, error_code| {
            packet(
                0,
                Signal::SetConfigurationReject {
                    service_category,
                    error_code,
                },
            )
        };
        assert!(pattern.matches(&reject(0x07, ErrorCode::UnsupportedConfiguration)));
        assert!(!pattern.matches(&reject(0x07, ErrorCode::BadState)));

        let any_error = pattern.any(Field::ErrorCode);
        assert!(any_error.matches(&reject(0x01, ErrorCode::BadState)));

        let open_reject = SignalPattern::new(Signal::OpenReject {
            error_code: ErrorCode::Success,
        })
        .any(Field::ErrorCode);
        assert!(open_reject.matches(&packet(
            0,
            Signal::OpenReject {
                error_code: ErrorCode::SepNotInUse
            }
        )));
    }

    #[test]
    fn test_seid_information_elements() {
        let pattern = SignalPattern::new(Signal::DiscoverResponse {
            seid_information: vec![],
        })
        .any_transaction_label()
        .seid_information(vec![Expected::Any]);

        let response = |seid_information| packet(5, Signal::DiscoverResponse { seid_information });
        assert!(pattern.matches(&response(vec![SeidInformation::new(1, Tsep::Sink)])));
        assert!(pattern.matches(&response(vec![SeidInformation::new(4, Tsep::Source)])));
        assert!(!pattern.matches(&response(vec![])));
        assert!(!pattern.matches(&response(vec![
            SeidInformation::new(1, Tsep::Sink),
            SeidInformation::new(2, Tsep::Sink),
        ])));

        let sink_first = pattern.clone().seid_information(vec![
            Expected::Exact(SeidInformation::new(1, Tsep::Sink)),
            Expected::Any,
        ]);
        assert!(sink_first.matches(&response(vec![
            SeidInformation::new(1, Tsep::Sink),
            SeidInformation::new(2, Tsep::Source),
        ])));
        assert!(!sink_first.matches(&response(vec![
            SeidInformation::new(2, Tsep::Source),
            SeidInformation::new(1, Tsep::Sink),
        ])));

        let any_list = pattern.any(Field::SeidInformation);
        assert!(any_list.matches(&response(vec![])));
    }

    #[test]
    fn test_any_capability_list() {
        let pattern = SignalPattern::new(Signal::GetAllCapabilitiesResponse {
            service_capabilities: vec![],
        })
        .any_transaction_label()
        .any(Field::ServiceCapabilities);

        let response = |service_capabilities| packet(1, Signal::GetAllCapabilitiesResponse { service_capabilities });
        assert!(pattern.matches(&response(vec![])));
        assert!(pattern.matches(&response(vec![
            ServiceCapability::MediaTransport,
            ServiceCapability::DelayReporting,
        ])));
        assert!(!pattern.matches(&packet(
            1,
            Signal::GetCapabilitiesResponse {
                service_capabilities: vec![]
            }
        )));

        // An element-wise match replaces the wildcard.
        let exact = pattern.service_capabilities(vec![Expected::Exact(ServiceCapability::MediaTransport)]);
        assert!(exact.matches(&response(vec![ServiceCapability::MediaTransport])));
        assert!(!exact.matches(&response(vec![ServiceCapability::DelayReporting])));
    }

    #[test]
    fn test_any_content_protection_data() {
        let pattern = SignalPattern::new(Signal::SecurityControlCommand {
            acp_seid: 1,
            content_protection_data: vec![],
        })
        .any(Field::ContentProtectionData);

        let command = |acp_seid, content_protection_data| {
            packet(
                0,
                Signal::SecurityControlCommand {
                    acp_seid,
                    content_protection_data,
                },
            )
        };
        assert!(pattern.matches(&command(1, vec![0x01, 0x02, 0x03])));
        assert!(!pattern.matches(&command(2, vec![0x01, 0x02, 0x03])));

        let response = SignalPattern::new(Signal::SecurityControlResponse {
            content_protection_data: vec![0xAA],
        });
        assert!(!response.matches(&packet(
            0,
            Signal::SecurityControlResponse {
                content_protection_data: vec![0xBB]
            }
        )));
        assert!(response.any(Field::ContentProtectionData).matches(&packet(
            0,
            Signal::SecurityControlResponse {
                content_protection_data: vec![0xBB]
            }
        )));
    }

    #[test]
    fn test_kind_and_reply() {
        let kind = Expectation::from(SignalKind::DiscoverCommand);
        assert!(kind.matches(&packet(7, Signal::DiscoverCommand)));
        assert!(!kind.matches(&packet(7, Signal::DelayReportResponse)));

        let reply = Expectation::Reply {
            transaction_label: 2,
            signal_identifier: SignalIdentifier::Start,
        };
        assert!(reply.matches(&packet(2, Signal::StartResponse)));
        assert!(reply.matches(&packet(
            2,
            Signal::StartReject {
                acp_seid: 1,
                error_code: ErrorCode::BadState
            }
        )));
        assert!(reply.matches(&packet(
            2,
            Signal::GeneralReject {
                signal_identifier: SignalIdentifier::Start
            }
        )));
        assert!(!reply.matches(&packet(2, Signal::StartCommand { acp_seid: 1 })));
        assert!(!reply.matches(&packet(3, Signal::StartResponse)));
    }
}
