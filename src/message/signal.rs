//! Signal bodies, one variant per AVDTP command, response and reject.
//!
//! The identity of a signal (message type and signal identifier) is implied by its variant, and
//! is written into the header on serialization. Bodies that do not decode exactly fall back to
//! [`Signal::Unknown`].
use std::vec::Vec;

use uom::si::f32::Time;
use uom::si::time::microsecond;

use crate::message::capability::ServiceCapability;
use crate::message::codes::ErrorCode;
use crate::message::encoder::Encoder;
use crate::message::header::{MessageType, SignalIdentifier};
use crate::message::reader::Reader;
use crate::message::seid::SeidInformation;
use crate::message::{EncodeError, ParseError};

/// Body of a signaling packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Signal {
    DiscoverCommand,
    DiscoverResponse {
        seid_information: Vec<SeidInformation>,
    },
    DiscoverReject {
        error_code: ErrorCode,
    },
    GetCapabilitiesCommand {
        acp_seid: u8,
    },
    GetCapabilitiesResponse {
        service_capabilities: Vec<ServiceCapability>,
    },
    GetCapabilitiesReject {
        error_code: ErrorCode,
    },
    GetAllCapabilitiesCommand {
        acp_seid: u8,
    },
    GetAllCapabilitiesResponse {
        service_capabilities: Vec<ServiceCapability>,
    },
    GetAllCapabilitiesReject {
        error_code: ErrorCode,
    },
    SetConfigurationCommand {
        acp_seid: u8,
        int_seid: u8,
        service_capabilities: Vec<ServiceCapability>,
    },
    SetConfigurationResponse,
    SetConfigurationReject {
        /// Category of the first capability that was rejected.
        service_category: u8,
        error_code: ErrorCode,
    },
    GetConfigurationCommand {
        acp_seid: u8,
    },
    GetConfigurationResponse {
        service_capabilities: Vec<ServiceCapability>,
    },
    GetConfigurationReject {
        error_code: ErrorCode,
    },
    ReconfigureCommand {
        acp_seid: u8,
        service_capabilities: Vec<ServiceCapability>,
    },
    ReconfigureResponse,
    ReconfigureReject {
        service_category: u8,
        error_code: ErrorCode,
    },
    OpenCommand {
        acp_seid: u8,
    },
    OpenResponse,
    OpenReject {
        error_code: ErrorCode,
    },
    StartCommand {
        acp_seid: u8,
    },
    StartResponse,
    StartReject {
        /// First endpoint that could not be started.
        acp_seid: u8,
        error_code: ErrorCode,
    },
    CloseCommand {
        acp_seid: u8,
    },
    CloseResponse,
    CloseReject {
        error_code: ErrorCode,
    },
    SuspendCommand {
        acp_seid: u8,
    },
    SuspendResponse,
    SuspendReject {
        acp_seid: u8,
        error_code: ErrorCode,
    },
    AbortCommand {
        acp_seid: u8,
    },
    AbortResponse,
    SecurityControlCommand {
        acp_seid: u8,
        content_protection_data: Vec<u8>,
    },
    SecurityControlResponse {
        content_protection_data: Vec<u8>,
    },
    SecurityControlReject {
        error_code: ErrorCode,
    },
    /// The peer does not support the signal identifier.
    GeneralReject {
        signal_identifier: SignalIdentifier,
    },
    DelayReportCommand {
        acp_seid: u8,
        /// Delay in 1/10 ms, upper byte.
        delay_msb: u8,
        /// Delay in 1/10 ms, lower byte.
        delay_lsb: u8,
    },
    DelayReportResponse,
    DelayReportReject {
        error_code: ErrorCode,
    },
    /// A signal whose body did not decode into its concrete form.
    Unknown {
        message_type: MessageType,
        signal_identifier: SignalIdentifier,
        payload: Vec<u8>,
    },
}

/// The variant of a [`Signal`], without its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum SignalKind {
    DiscoverCommand,
    DiscoverResponse,
    DiscoverReject,
    GetCapabilitiesCommand,
    GetCapabilitiesResponse,
    GetCapabilitiesReject,
    GetAllCapabilitiesCommand,
    GetAllCapabilitiesResponse,
    GetAllCapabilitiesReject,
    SetConfigurationCommand,
    SetConfigurationResponse,
    SetConfigurationReject,
    GetConfigurationCommand,
    GetConfigurationResponse,
    GetConfigurationReject,
    ReconfigureCommand,
    ReconfigureResponse,
    ReconfigureReject,
    OpenCommand,
    OpenResponse,
    OpenReject,
    StartCommand,
    StartResponse,
    StartReject,
    CloseCommand,
    CloseResponse,
    CloseReject,
    SuspendCommand,
    SuspendResponse,
    SuspendReject,
    AbortCommand,
    AbortResponse,
    SecurityControlCommand,
    SecurityControlResponse,
    SecurityControlReject,
    GeneralReject,
    DelayReportCommand,
    DelayReportResponse,
    DelayReportReject,
    Unknown,
}

/// Fixed identities of the concrete signal kinds.
const IDENTITIES: [(SignalKind, MessageType, SignalIdentifier); 38] = {
    use MessageType::{Command as C, ResponseAccept as A, ResponseReject as R};
    use SignalIdentifier as I;
    use SignalKind as K;

    [
        (K::DiscoverCommand, C, I::Discover),
        (K::DiscoverResponse, A, I::Discover),
        (K::DiscoverReject, R, I::Discover),
        (K::GetCapabilitiesCommand, C, I::GetCapabilities),
        (K::GetCapabilitiesResponse, A, I::GetCapabilities),
        (K::GetCapabilitiesReject, R, I::GetCapabilities),
        (K::GetAllCapabilitiesCommand, C, I::GetAllCapabilities),
        (K::GetAllCapabilitiesResponse, A, I::GetAllCapabilities),
        (K::GetAllCapabilitiesReject, R, I::GetAllCapabilities),
        (K::SetConfigurationCommand, C, I::SetConfiguration),
        (K::SetConfigurationResponse, A, I::SetConfiguration),
        (K::SetConfigurationReject, R, I::SetConfiguration),
        (K::GetConfigurationCommand, C, I::GetConfiguration),
        (K::GetConfigurationResponse, A, I::GetConfiguration),
        (K::GetConfigurationReject, R, I::GetConfiguration),
        (K::ReconfigureCommand, C, I::Reconfigure),
        (K::ReconfigureResponse, A, I::Reconfigure),
        (K::ReconfigureReject, R, I::Reconfigure),
        (K::OpenCommand, C, I::Open),
        (K::OpenResponse, A, I::Open),
        (K::OpenReject, R, I::Open),
        (K::StartCommand, C, I::Start),
        (K::StartResponse, A, I::Start),
        (K::StartReject, R, I::Start),
        (K::CloseCommand, C, I::Close),
        (K::CloseResponse, A, I::Close),
        (K::CloseReject, R, I::Close),
        (K::SuspendCommand, C, I::Suspend),
        (K::SuspendResponse, A, I::Suspend),
        (K::SuspendReject, R, I::Suspend),
        (K::AbortCommand, C, I::Abort),
        (K::AbortResponse, A, I::Abort),
        (K::SecurityControlCommand, C, I::SecurityControl),
        (K::SecurityControlResponse, A, I::SecurityControl),
        (K::SecurityControlReject, R, I::SecurityControl),
        (K::DelayReportCommand, C, I::DelayReport),
        (K::DelayReportResponse, A, I::DelayReport),
        (K::DelayReportReject, R, I::DelayReport),
    ]
};

impl SignalKind {
    /// The kind of signal a header with this identity decodes into.
    ///
    /// Identities without a concrete form (an abort reject) map to [`SignalKind::Unknown`].
    pub fn from_identity(message_type: MessageType, signal_identifier: SignalIdentifier) -> Self {
        if message_type == MessageType::GeneralReject {
            return Self::GeneralReject;
        }

        IDENTITIES
            .iter()
            .find(|(_, m, s)| *m == message_type && *s == signal_identifier)
            .map_or(Self::Unknown, |(kind, _, _)| *kind)
    }

    /// The fixed message type and signal identifier of this kind.
    ///
    /// General rejects and unknown signals have no fixed identity.
    pub fn identity(&self) -> Option<(MessageType, SignalIdentifier)> {
        IDENTITIES
            .iter()
            .find(|(kind, _, _)| kind == self)
            .map(|(_, message_type, signal_identifier)| (*message_type, *signal_identifier))
    }
}

impl Signal {
    /// Create a delay report command, splitting the delay into 1/10 ms bytes.
    ///
    /// Delays beyond 6553.5 ms do not fit and are truncated to 16 bits.
    pub fn delay_report(acp_seid: u8, delay_ms: u32) -> Self {
        let delay_one_tenth = delay_ms.saturating_mul(10);
        if delay_one_tenth > u32::from(u16::MAX) {
            warn!("Delay of {} ms exceeds the delay report range, truncating", delay_ms);
        }

        Self::DelayReportCommand {
            acp_seid,
            delay_msb: ((delay_one_tenth >> 8) & 0xFF) as u8,
            delay_lsb: (delay_one_tenth & 0xFF) as u8,
        }
    }

    /// The delay carried by a delay report command.
    pub fn delay(&self) -> Option<Time> {
        match self {
            Self::DelayReportCommand {
                delay_msb, delay_lsb, ..
            } => {
                let delay_one_tenth = u16::from_be_bytes([*delay_msb, *delay_lsb]);
                Some(Time::new::<microsecond>(f32::from(delay_one_tenth) * 100.0))
            }
            _ => None,
        }
    }

    /// The variant of this signal.
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::DiscoverCommand => SignalKind::DiscoverCommand,
            Self::DiscoverResponse { .. } => SignalKind::DiscoverResponse,
            Self::DiscoverReject { .. } => SignalKind::DiscoverReject,
            Self::GetCapabilitiesCommand { .. } => SignalKind::GetCapabilitiesCommand,
            Self::GetCapabilitiesResponse { .. } => SignalKind::GetCapabilitiesResponse,
            Self::GetCapabilitiesReject { .. } => SignalKind::GetCapabilitiesReject,
            Self::GetAllCapabilitiesCommand { .. } => SignalKind::GetAllCapabilitiesCommand,
            Self::GetAllCapabilitiesResponse { .. } => SignalKind::GetAllCapabilitiesResponse,
            Self::GetAllCapabilitiesReject { .. } => SignalKind::GetAllCapabilitiesReject,
            Self::SetConfigurationCommand { .. } => SignalKind::SetConfigurationCommand,
            Self::SetConfigurationResponse => SignalKind::SetConfigurationResponse,
            Self::SetConfigurationReject { .. } => SignalKind::SetConfigurationReject,
            Self::GetConfigurationCommand { .. } => SignalKind::GetConfigurationCommand,
            Self::GetConfigurationResponse { .. } => SignalKind::GetConfigurationResponse,
            Self::GetConfigurationReject { .. } => SignalKind::GetConfigurationReject,
            Self::ReconfigureCommand { .. } => SignalKind::ReconfigureCommand,
            Self::ReconfigureResponse => SignalKind::ReconfigureResponse,
            Self::ReconfigureReject { .. } => SignalKind::ReconfigureReject,
            Self::OpenCommand { .. } => SignalKind::OpenCommand,
            Self::OpenResponse => SignalKind::OpenResponse,
            Self::OpenReject { .. } => SignalKind::OpenReject,
            Self::StartCommand { .. } => SignalKind::StartCommand,
            Self::StartResponse => SignalKind::StartResponse,
            Self::StartReject { .. } => SignalKind::StartReject,
            Self::CloseCommand { .. } => SignalKind::CloseCommand,
            Self::CloseResponse => SignalKind::CloseResponse,
            Self::CloseReject { .. } => SignalKind::CloseReject,
            Self::SuspendCommand { .. } => SignalKind::SuspendCommand,
            Self::SuspendResponse => SignalKind::SuspendResponse,
            Self::SuspendReject { .. } => SignalKind::SuspendReject,
            Self::AbortCommand { .. } => SignalKind::AbortCommand,
            Self::AbortResponse => SignalKind::AbortResponse,
            Self::SecurityControlCommand { .. } => SignalKind::SecurityControlCommand,
            Self::SecurityControlResponse { .. } => SignalKind::SecurityControlResponse,
            Self::SecurityControlReject { .. } => SignalKind::SecurityControlReject,
            Self::GeneralReject { .. } => SignalKind::GeneralReject,
            Self::DelayReportCommand { .. } => SignalKind::DelayReportCommand,
            Self::DelayReportResponse => SignalKind::DelayReportResponse,
            Self::DelayReportReject { .. } => SignalKind::DelayReportReject,
            Self::Unknown { .. } => SignalKind::Unknown,
        }
    }

    /// The message type implied by the variant.
    pub fn message_type(&self) -> MessageType {
        match (self, self.kind().identity()) {
            (Self::Unknown { message_type, .. }, _) => *message_type,
            (_, Some((message_type, _))) => message_type,
            // Only general rejects lack a fixed identity.
            (_, None) => MessageType::GeneralReject,
        }
    }

    /// The signal identifier implied by the variant.
    pub fn signal_identifier(&self) -> SignalIdentifier {
        match (self, self.kind().identity()) {
            (Self::GeneralReject { signal_identifier }, _) | (Self::Unknown { signal_identifier, .. }, _) => {
                *signal_identifier
            }
            (_, Some((_, signal_identifier))) => signal_identifier,
            (_, None) => SignalIdentifier::Discover,
        }
    }

    /// The acceptor endpoint this signal refers to, if any.
    pub fn acp_seid(&self) -> Option<u8> {
        match self {
            Self::GetCapabilitiesCommand { acp_seid }
            | Self::GetAllCapabilitiesCommand { acp_seid }
            | Self::SetConfigurationCommand { acp_seid, .. }
            | Self::GetConfigurationCommand { acp_seid }
            | Self::ReconfigureCommand { acp_seid, .. }
            | Self::OpenCommand { acp_seid }
            | Self::StartCommand { acp_seid }
            | Self::StartReject { acp_seid, .. }
            | Self::CloseCommand { acp_seid }
            | Self::SuspendCommand { acp_seid }
            | Self::SuspendReject { acp_seid, .. }
            | Self::AbortCommand { acp_seid }
            | Self::SecurityControlCommand { acp_seid, .. }
            | Self::DelayReportCommand { acp_seid, .. } => Some(*acp_seid),
            _ => None,
        }
    }

    pub(crate) fn acp_seid_mut(&mut self) -> Option<&mut u8> {
        match self {
            Self::GetCapabilitiesCommand { acp_seid }
            | Self::GetAllCapabilitiesCommand { acp_seid }
            | Self::SetConfigurationCommand { acp_seid, .. }
            | Self::GetConfigurationCommand { acp_seid }
            | Self::ReconfigureCommand { acp_seid, .. }
            | Self::OpenCommand { acp_seid }
            | Self::StartCommand { acp_seid }
            | Self::StartReject { acp_seid, .. }
            | Self::CloseCommand { acp_seid }
            | Self::SuspendCommand { acp_seid }
            | Self::SuspendReject { acp_seid, .. }
            | Self::AbortCommand { acp_seid }
            | Self::SecurityControlCommand { acp_seid, .. }
            | Self::DelayReportCommand { acp_seid, .. } => Some(acp_seid),
            _ => None,
        }
    }

    /// The initiator endpoint of a set configuration command.
    pub fn int_seid(&self) -> Option<u8> {
        match self {
            Self::SetConfigurationCommand { int_seid, .. } => Some(*int_seid),
            _ => None,
        }
    }

    pub(crate) fn int_seid_mut(&mut self) -> Option<&mut u8> {
        match self {
            Self::SetConfigurationCommand { int_seid, .. } => Some(int_seid),
            _ => None,
        }
    }

    /// The capability list carried by this signal, if any.
    pub fn service_capabilities(&self) -> Option<&[ServiceCapability]> {
        match self {
            Self::GetCapabilitiesResponse { service_capabilities }
            | Self::GetAllCapabilitiesResponse { service_capabilities }
            | Self::SetConfigurationCommand {
                service_capabilities, ..
            }
            | Self::GetConfigurationResponse { service_capabilities }
            | Self::ReconfigureCommand {
                service_capabilities, ..
            } => Some(service_capabilities.as_slice()),
            _ => None,
        }
    }

    pub(crate) fn service_capabilities_mut(&mut self) -> Option<&mut Vec<ServiceCapability>> {
        match self {
            Self::GetCapabilitiesResponse { service_capabilities }
            | Self::GetAllCapabilitiesResponse { service_capabilities }
            | Self::SetConfigurationCommand {
                service_capabilities, ..
            }
            | Self::GetConfigurationResponse { service_capabilities }
            | Self::ReconfigureCommand {
                service_capabilities, ..
            } => Some(service_capabilities),
            _ => None,
        }
    }

    /// The error code of a reject.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::DiscoverReject { error_code }
            | Self::GetCapabilitiesReject { error_code }
            | Self::GetAllCapabilitiesReject { error_code }
            | Self::SetConfigurationReject { error_code, .. }
            | Self::GetConfigurationReject { error_code }
            | Self::ReconfigureReject { error_code, .. }
            | Self::OpenReject { error_code }
            | Self::StartReject { error_code, .. }
            | Self::CloseReject { error_code }
            | Self::SuspendReject { error_code, .. }
            | Self::SecurityControlReject { error_code }
            | Self::DelayReportReject { error_code } => Some(*error_code),
            _ => None,
        }
    }

    pub(crate) fn error_code_mut(&mut self) -> Option<&mut ErrorCode> {
        match self {
            Self::DiscoverReject { error_code }
            | Self::GetCapabilitiesReject { error_code }
            | Self::GetAllCapabilitiesReject { error_code }
            | Self::SetConfigurationReject { error_code, .. }
            | Self::GetConfigurationReject { error_code }
            | Self::ReconfigureReject { error_code, .. }
            | Self::OpenReject { error_code }
            | Self::StartReject { error_code, .. }
            | Self::CloseReject { error_code }
            | Self::SuspendReject { error_code, .. }
            | Self::SecurityControlReject { error_code }
            | Self::DelayReportReject { error_code } => Some(error_code),
            _ => None,
        }
    }

    /// The category of the rejected capability, for configuration rejects.
    pub fn service_category(&self) -> Option<u8> {
        match self {
            Self::SetConfigurationReject { service_category, .. }
            | Self::ReconfigureReject { service_category, .. } => Some(*service_category),
            _ => None,
        }
    }

    pub(crate) fn service_category_mut(&mut self) -> Option<&mut u8> {
        match self {
            Self::SetConfigurationReject { service_category, .. }
            | Self::ReconfigureReject { service_category, .. } => Some(service_category),
            _ => None,
        }
    }

    /// The raw delay bytes `(msb, lsb)` of a delay report command.
    pub fn delay_bytes(&self) -> Option<(u8, u8)> {
        match self {
            Self::DelayReportCommand {
                delay_msb, delay_lsb, ..
            } => Some((*delay_msb, *delay_lsb)),
            _ => None,
        }
    }

    pub(crate) fn delay_bytes_mut(&mut self) -> Option<(&mut u8, &mut u8)> {
        match self {
            Self::DelayReportCommand {
                delay_msb, delay_lsb, ..
            } => Some((delay_msb, delay_lsb)),
            _ => None,
        }
    }

    /// The content protection data of a security control command or response.
    pub fn content_protection_data(&self) -> Option<&[u8]> {
        match self {
            Self::SecurityControlCommand {
                content_protection_data,
                ..
            }
            | Self::SecurityControlResponse {
                content_protection_data,
            } => Some(content_protection_data.as_slice()),
            _ => None,
        }
    }

    pub(crate) fn content_protection_data_mut(&mut self) -> Option<&mut Vec<u8>> {
        match self {
            Self::SecurityControlCommand {
                content_protection_data,
                ..
            }
            | Self::SecurityControlResponse {
                content_protection_data,
            } => Some(content_protection_data),
            _ => None,
        }
    }

    /// The endpoint descriptors of a discover response.
    pub fn seid_information(&self) -> Option<&[SeidInformation]> {
        match self {
            Self::DiscoverResponse { seid_information } => Some(seid_information.as_slice()),
            _ => None,
        }
    }

    pub(crate) fn seid_information_mut(&mut self) -> Option<&mut Vec<SeidInformation>> {
        match self {
            Self::DiscoverResponse { seid_information } => Some(seid_information),
            _ => None,
        }
    }

    /// Encoded body size in bytes.
    pub fn size(&self) -> usize {
        let capabilities = |list: &[ServiceCapability]| list.iter().map(ServiceCapability::size).sum::<usize>();

        match self {
            Self::DiscoverCommand
            | Self::SetConfigurationResponse
            | Self::ReconfigureResponse
            | Self::OpenResponse
            | Self::StartResponse
            | Self::CloseResponse
            | Self::SuspendResponse
            | Self::AbortResponse
            | Self::GeneralReject { .. }
            | Self::DelayReportResponse => 0,
            Self::DiscoverResponse { seid_information } => seid_information.len() * SeidInformation::SIZE,
            Self::GetCapabilitiesCommand { .. }
            | Self::GetAllCapabilitiesCommand { .. }
            | Self::GetConfigurationCommand { .. }
            | Self::OpenCommand { .. }
            | Self::StartCommand { .. }
            | Self::CloseCommand { .. }
            | Self::SuspendCommand { .. }
            | Self::AbortCommand { .. } => 1,
            Self::DiscoverReject { .. }
            | Self::GetCapabilitiesReject { .. }
            | Self::GetAllCapabilitiesReject { .. }
            | Self::GetConfigurationReject { .. }
            | Self::OpenReject { .. }
            | Self::CloseReject { .. }
            | Self::SecurityControlReject { .. }
            | Self::DelayReportReject { .. } => 1,
            Self::SetConfigurationReject { .. }
            | Self::ReconfigureReject { .. }
            | Self::StartReject { .. }
            | Self::SuspendReject { .. } => 2,
            Self::DelayReportCommand { .. } => 3,
            Self::GetCapabilitiesResponse { service_capabilities }
            | Self::GetAllCapabilitiesResponse { service_capabilities }
            | Self::GetConfigurationResponse { service_capabilities } => capabilities(service_capabilities),
            Self::SetConfigurationCommand {
                service_capabilities, ..
            } => 2 + capabilities(service_capabilities),
            Self::ReconfigureCommand {
                service_capabilities, ..
            } => 1 + capabilities(service_capabilities),
            Self::SecurityControlCommand {
                content_protection_data,
                ..
            } => 1 + content_protection_data.len(),
            Self::SecurityControlResponse {
                content_protection_data,
            } => content_protection_data.len(),
            Self::Unknown { payload, .. } => payload.len(),
        }
    }

    /// Decode the body of a signal with the given identity.
    ///
    /// Fails with [`ParseError::ConstraintViolation`] if the identity has no concrete form, and
    /// with [`ParseError::TrailingBytes`] if the body is longer than its layout.
    pub fn parse_body(
        message_type: MessageType,
        signal_identifier: SignalIdentifier,
        payload: &[u8],
    ) -> Result<Self, ParseError> {
        let mut reader = Reader::new(payload);

        let signal = match SignalKind::from_identity(message_type, signal_identifier) {
            SignalKind::DiscoverCommand => Self::DiscoverCommand,
            SignalKind::DiscoverResponse => Self::DiscoverResponse {
                seid_information: parse_seid_list(reader.tail())?,
            },
            SignalKind::DiscoverReject => Self::DiscoverReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::GetCapabilitiesCommand => Self::GetCapabilitiesCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::GetCapabilitiesResponse => Self::GetCapabilitiesResponse {
                service_capabilities: ServiceCapability::parse_list(reader.tail())?,
            },
            SignalKind::GetCapabilitiesReject => Self::GetCapabilitiesReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::GetAllCapabilitiesCommand => Self::GetAllCapabilitiesCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::GetAllCapabilitiesResponse => Self::GetAllCapabilitiesResponse {
                service_capabilities: ServiceCapability::parse_list(reader.tail())?,
            },
            SignalKind::GetAllCapabilitiesReject => Self::GetAllCapabilitiesReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::SetConfigurationCommand => Self::SetConfigurationCommand {
                acp_seid: reader.seid()?,
                int_seid: reader.seid()?,
                service_capabilities: ServiceCapability::parse_list(reader.tail())?,
            },
            SignalKind::SetConfigurationResponse => Self::SetConfigurationResponse,
            SignalKind::SetConfigurationReject => Self::SetConfigurationReject {
                service_category: reader.u8()?,
                error_code: reader.enumerated()?,
            },
            SignalKind::GetConfigurationCommand => Self::GetConfigurationCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::GetConfigurationResponse => Self::GetConfigurationResponse {
                service_capabilities: ServiceCapability::parse_list(reader.tail())?,
            },
            SignalKind::GetConfigurationReject => Self::GetConfigurationReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::ReconfigureCommand => Self::ReconfigureCommand {
                acp_seid: reader.seid()?,
                service_capabilities: ServiceCapability::parse_list(reader.tail())?,
            },
            SignalKind::ReconfigureResponse => Self::ReconfigureResponse,
            SignalKind::ReconfigureReject => Self::ReconfigureReject {
                service_category: reader.u8()?,
                error_code: reader.enumerated()?,
            },
            SignalKind::OpenCommand => Self::OpenCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::OpenResponse => Self::OpenResponse,
            SignalKind::OpenReject => Self::OpenReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::StartCommand => Self::StartCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::StartResponse => Self::StartResponse,
            SignalKind::StartReject => Self::StartReject {
                acp_seid: reader.seid()?,
                error_code: reader.enumerated()?,
            },
            SignalKind::CloseCommand => Self::CloseCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::CloseResponse => Self::CloseResponse,
            SignalKind::CloseReject => Self::CloseReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::SuspendCommand => Self::SuspendCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::SuspendResponse => Self::SuspendResponse,
            SignalKind::SuspendReject => Self::SuspendReject {
                acp_seid: reader.seid()?,
                error_code: reader.enumerated()?,
            },
            SignalKind::AbortCommand => Self::AbortCommand {
                acp_seid: reader.seid()?,
            },
            SignalKind::AbortResponse => Self::AbortResponse,
            SignalKind::SecurityControlCommand => Self::SecurityControlCommand {
                acp_seid: reader.seid()?,
                content_protection_data: reader.rest(),
            },
            SignalKind::SecurityControlResponse => Self::SecurityControlResponse {
                content_protection_data: reader.rest(),
            },
            SignalKind::SecurityControlReject => Self::SecurityControlReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::GeneralReject => Self::GeneralReject { signal_identifier },
            SignalKind::DelayReportCommand => Self::DelayReportCommand {
                acp_seid: reader.seid()?,
                delay_msb: reader.u8()?,
                delay_lsb: reader.u8()?,
            },
            SignalKind::DelayReportResponse => Self::DelayReportResponse,
            SignalKind::DelayReportReject => Self::DelayReportReject {
                error_code: reader.enumerated()?,
            },
            SignalKind::Unknown => return Err(ParseError::ConstraintViolation),
        };

        reader.finish()?;
        Ok(signal)
    }

    pub(crate) fn encode_body(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        match self {
            Self::DiscoverCommand
            | Self::SetConfigurationResponse
            | Self::ReconfigureResponse
            | Self::OpenResponse
            | Self::StartResponse
            | Self::CloseResponse
            | Self::SuspendResponse
            | Self::AbortResponse
            | Self::GeneralReject { .. }
            | Self::DelayReportResponse => {}
            Self::DiscoverResponse { seid_information } => {
                for information in seid_information {
                    information.encode(encoder)?;
                }
            }
            Self::GetCapabilitiesCommand { acp_seid }
            | Self::GetAllCapabilitiesCommand { acp_seid }
            | Self::GetConfigurationCommand { acp_seid }
            | Self::OpenCommand { acp_seid }
            | Self::StartCommand { acp_seid }
            | Self::CloseCommand { acp_seid }
            | Self::SuspendCommand { acp_seid }
            | Self::AbortCommand { acp_seid } => push_seid(encoder, "acp_seid", *acp_seid)?,
            Self::DiscoverReject { error_code }
            | Self::GetCapabilitiesReject { error_code }
            | Self::GetAllCapabilitiesReject { error_code }
            | Self::GetConfigurationReject { error_code }
            | Self::OpenReject { error_code }
            | Self::CloseReject { error_code }
            | Self::SecurityControlReject { error_code }
            | Self::DelayReportReject { error_code } => encoder.push((*error_code).into()),
            Self::GetCapabilitiesResponse { service_capabilities }
            | Self::GetAllCapabilitiesResponse { service_capabilities }
            | Self::GetConfigurationResponse { service_capabilities } => {
                encode_capabilities(encoder, service_capabilities)?
            }
            Self::SetConfigurationCommand {
                acp_seid,
                int_seid,
                service_capabilities,
            } => {
                push_seid(encoder, "acp_seid", *acp_seid)?;
                push_seid(encoder, "int_seid", *int_seid)?;
                encode_capabilities(encoder, service_capabilities)?;
            }
            Self::SetConfigurationReject {
                service_category,
                error_code,
            }
            | Self::ReconfigureReject {
                service_category,
                error_code,
            } => {
                encoder.push(*service_category);
                encoder.push((*error_code).into());
            }
            Self::ReconfigureCommand {
                acp_seid,
                service_capabilities,
            } => {
                push_seid(encoder, "acp_seid", *acp_seid)?;
                encode_capabilities(encoder, service_capabilities)?;
            }
            Self::StartReject { acp_seid, error_code } | Self::SuspendReject { acp_seid, error_code } => {
                push_seid(encoder, "acp_seid", *acp_seid)?;
                encoder.push((*error_code).into());
            }
            Self::SecurityControlCommand {
                acp_seid,
                content_protection_data,
            } => {
                push_seid(encoder, "acp_seid", *acp_seid)?;
                encoder.extend(content_protection_data);
            }
            Self::SecurityControlResponse {
                content_protection_data,
            } => encoder.extend(content_protection_data),
            Self::DelayReportCommand {
                acp_seid,
                delay_msb,
                delay_lsb,
            } => {
                push_seid(encoder, "acp_seid", *acp_seid)?;
                encoder.push(*delay_msb);
                encoder.push(*delay_lsb);
            }
            Self::Unknown { payload, .. } => encoder.extend(payload),
        }

        Ok(())
    }
}

fn parse_seid_list(mut span: &[u8]) -> Result<Vec<SeidInformation>, ParseError> {
    let mut seid_information = Vec::new();

    while !span.is_empty() {
        let (information, remaining) = SeidInformation::parse(span)?;
        seid_information.push(information);
        span = remaining;
    }

    Ok(seid_information)
}

fn push_seid(encoder: &mut Encoder, name: &'static str, seid: u8) -> Result<(), EncodeError> {
    let seid = encoder.field(name, seid, 6)?;
    encoder.push(seid << 2);
    Ok(())
}

fn encode_capabilities(encoder: &mut Encoder, capabilities: &[ServiceCapability]) -> Result<(), EncodeError> {
    capabilities
        .iter()
        .try_for_each(|capability| capability.encode(encoder))
}
