//! Tree rendering of packets, for diagnostics.
//!
//! ```text
//! OpenCommand
//! ├── transaction_label = 5 (0x5)
//! ├── packet_type       = PacketType::Single (0x0)
//! ├── message_type      = MessageType::Command (0x0)
//! ├── signal_identifier = SignalIdentifier::Open (0x6)
//! └── acp_seid          = 1 (0x1)
//! ```
use core::fmt::{self, Debug, Display, Formatter};
use std::string::String;
use std::vec::Vec;

use crate::message::SignalingPacket;
use crate::message::capability::ServiceCapability;
use crate::message::codes::ErrorCode;
use crate::message::seid::SeidInformation;
use crate::message::signal::Signal;

/// Number of bytes per line of a byte field.
const BYTES_PER_LINE: usize = 8;

enum Value<'a> {
    Int(u32),
    Flag(bool),
    Enum(&'static str, String, u8),
    Bytes(&'a [u8]),
    Node(Node<'a>),
    List(Vec<Value<'a>>),
}

struct Node<'a> {
    name: String,
    fields: Vec<(&'static str, Value<'a>)>,
}

impl Node<'_> {
    fn render(&self, f: &mut Formatter<'_>, prefix: &str) -> fmt::Result {
        writeln!(f, "{}", self.name)?;

        let align = self.fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        let last = self.fields.len().saturating_sub(1);

        for (index, (name, value)) in self.fields.iter().enumerate() {
            let (branch, indent) = if index == last { ("└── ", "    ") } else { ("├── ", "│   ") };
            render_value(
                f,
                &format!("{prefix}{branch}"),
                &format!("{prefix}{indent}"),
                name,
                align,
                value,
            )?;
        }

        Ok(())
    }
}

fn render_value(
    f: &mut Formatter<'_>,
    prefix: &str,
    indent: &str,
    name: &str,
    align: usize,
    value: &Value<'_>,
) -> fmt::Result {
    match value {
        Value::Int(value) => writeln!(f, "{prefix}{name:align$} = {value} (0x{value:x})"),
        Value::Flag(value) => writeln!(f, "{prefix}{name:align$} = {value}"),
        Value::Enum(kind, variant, raw) => {
            writeln!(f, "{prefix}{name:align$} = {kind}::{variant} (0x{raw:x})")
        }
        Value::Bytes(bytes) => {
            write!(f, "{prefix}{name:align$} = [")?;
            for (index, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
                if index > 0 {
                    writeln!(f)?;
                    write!(f, "{indent}{:width$}", "", width = align + 4)?;
                }
                for byte in chunk {
                    write!(f, " {byte:02x}")?;
                }
            }
            writeln!(f, " ]")
        }
        Value::Node(node) => {
            write!(f, "{prefix}{name:align$} = ")?;
            node.render(f, indent)
        }
        Value::List(items) => {
            writeln!(f, "{prefix}{name}")?;
            let last = items.len().saturating_sub(1);
            for (index, item) in items.iter().enumerate() {
                let (branch, nested) = if index == last { ("└── ", "    ") } else { ("├── ", "│   ") };
                render_value(
                    f,
                    &format!("{indent}{branch}"),
                    &format!("{indent}{nested}"),
                    &format!("[{index}]"),
                    5,
                    item,
                )?;
            }
            Ok(())
        }
    }
}

fn int(value: impl Into<u32>) -> Value<'static> {
    Value::Int(value.into())
}

fn enumerated<T: Debug + Copy + Into<u8>>(kind: &'static str, value: T) -> Value<'static> {
    Value::Enum(kind, format!("{value:?}"), value.into())
}

fn error_code(code: &ErrorCode) -> Value<'static> {
    enumerated("ErrorCode", *code)
}

fn capabilities(list: &[ServiceCapability]) -> Value<'_> {
    Value::List(list.iter().map(|capability| Value::Node(capability_node(capability))).collect())
}

fn seid_node(information: &SeidInformation) -> Node<'_> {
    Node {
        name: String::from("SeidInformation"),
        fields: vec![
            ("in_use", Value::Flag(information.in_use)),
            ("acp_seid", int(information.acp_seid)),
            ("tsep", enumerated("Tsep", information.tsep)),
            ("media_type", int(information.media_type)),
        ],
    }
}

fn capability_node(capability: &ServiceCapability) -> Node<'_> {
    let category = match capability.category() {
        Some(category) => enumerated("ServiceCategory", category),
        None => int(capability.service_category()),
    };

    let (name, mut fields) = match capability {
        ServiceCapability::MediaTransport => ("MediaTransportCapability", vec![]),
        ServiceCapability::Reporting => ("ReportingCapability", vec![]),
        ServiceCapability::Recovery {
            recovery_type,
            maximum_recovery_window_size,
            maximum_number_of_media_packets_in_parity_code,
        } => (
            "RecoveryCapability",
            vec![
                ("recovery_type", int(*recovery_type)),
                ("maximum_recovery_window_size", int(*maximum_recovery_window_size)),
                (
                    "maximum_number_of_media_packets_in_parity_code",
                    int(*maximum_number_of_media_packets_in_parity_code),
                ),
            ],
        ),
        ServiceCapability::ContentProtection { cp_type, payload } => (
            "ContentProtectionCapability",
            vec![("cp_type", int(*cp_type)), ("payload", Value::Bytes(payload))],
        ),
        ServiceCapability::HeaderCompression {
            recovery,
            media,
            back_ch,
        } => (
            "HeaderCompressionCapability",
            vec![
                ("recovery", Value::Flag(*recovery)),
                ("media", Value::Flag(*media)),
                ("back_ch", Value::Flag(*back_ch)),
            ],
        ),
        ServiceCapability::Multiplexing { frag, payload } => (
            "MultiplexingCapability",
            vec![("frag", Value::Flag(*frag)), ("payload", Value::Bytes(payload))],
        ),
        ServiceCapability::MediaCodec {
            media_type,
            media_codec_type,
            codec_specific_information,
        } => (
            "MediaCodecCapability",
            vec![
                ("media_type", int(*media_type)),
                ("media_codec_type", int(*media_codec_type)),
                (
                    "codec_specific_information",
                    Value::Bytes(codec_specific_information),
                ),
            ],
        ),
        ServiceCapability::DelayReporting => ("DelayReportingCapability", vec![]),
        ServiceCapability::Generic { payload, .. } => ("ServiceCapability", vec![("payload", Value::Bytes(payload))]),
    };

    fields.insert(0, ("service_category", category));
    Node {
        name: String::from(name),
        fields,
    }
}

fn signal_fields(signal: &Signal) -> Vec<(&'static str, Value<'_>)> {
    match signal {
        Signal::DiscoverCommand
        | Signal::SetConfigurationResponse
        | Signal::ReconfigureResponse
        | Signal::OpenResponse
        | Signal::StartResponse
        | Signal::CloseResponse
        | Signal::SuspendResponse
        | Signal::AbortResponse
        | Signal::GeneralReject { .. }
        | Signal::DelayReportResponse => vec![],
        Signal::DiscoverResponse { seid_information } => vec![(
            "seid_information",
            Value::List(
                seid_information
                    .iter()
                    .map(|information| Value::Node(seid_node(information)))
                    .collect(),
            ),
        )],
        Signal::GetCapabilitiesCommand { acp_seid }
        | Signal::GetAllCapabilitiesCommand { acp_seid }
        | Signal::GetConfigurationCommand { acp_seid }
        | Signal::OpenCommand { acp_seid }
        | Signal::StartCommand { acp_seid }
        | Signal::CloseCommand { acp_seid }
        | Signal::SuspendCommand { acp_seid }
        | Signal::AbortCommand { acp_seid } => vec![("acp_seid", int(*acp_seid))],
        Signal::DiscoverReject { error_code }
        | Signal::GetCapabilitiesReject { error_code }
        | Signal::GetAllCapabilitiesReject { error_code }
        | Signal::GetConfigurationReject { error_code }
        | Signal::OpenReject { error_code }
        | Signal::CloseReject { error_code }
        | Signal::SecurityControlReject { error_code }
        | Signal::DelayReportReject { error_code } => vec![("error_code", self::error_code(error_code))],
        Signal::GetCapabilitiesResponse { service_capabilities }
        | Signal::GetAllCapabilitiesResponse { service_capabilities }
        | Signal::GetConfigurationResponse { service_capabilities } => {
            vec![("service_capabilities", capabilities(service_capabilities))]
        }
        Signal::SetConfigurationCommand {
            acp_seid,
            int_seid,
            service_capabilities,
        } => vec![
            ("acp_seid", int(*acp_seid)),
            ("int_seid", int(*int_seid)),
            ("service_capabilities", capabilities(service_capabilities)),
        ],
        Signal::SetConfigurationReject {
            service_category,
            error_code,
        }
        | Signal::ReconfigureReject {
            service_category,
            error_code,
        } => vec![
            ("service_category", int(*service_category)),
            ("error_code", self::error_code(error_code)),
        ],
        Signal::ReconfigureCommand {
            acp_seid,
            service_capabilities,
        } => vec![
            ("acp_seid", int(*acp_seid)),
            ("service_capabilities", capabilities(service_capabilities)),
        ],
        Signal::StartReject { acp_seid, error_code } | Signal::SuspendReject { acp_seid, error_code } => vec![
            ("acp_seid", int(*acp_seid)),
            ("error_code", self::error_code(error_code)),
        ],
        Signal::SecurityControlCommand {
            acp_seid,
            content_protection_data,
        } => vec![
            ("acp_seid", int(*acp_seid)),
            ("content_protection_data", Value::Bytes(content_protection_data)),
        ],
        Signal::SecurityControlResponse {
            content_protection_data,
        } => vec![("content_protection_data", Value::Bytes(content_protection_data))],
        Signal::DelayReportCommand {
            acp_seid,
            delay_msb,
            delay_lsb,
        } => vec![
            ("acp_seid", int(*acp_seid)),
            ("delay_msb", int(*delay_msb)),
            ("delay_lsb", int(*delay_lsb)),
        ],
        Signal::Unknown { payload, .. } => vec![("payload", Value::Bytes(payload))],
    }
}

impl Display for SignalingPacket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match &self.signal {
            Signal::Unknown { .. } => String::from("SignalingPacket"),
            signal => format!("{:?}", signal.kind()),
        };

        let mut fields = vec![
            ("transaction_label", int(self.transaction_label)),
            ("packet_type", enumerated("PacketType", self.packet_type)),
            ("message_type", enumerated("MessageType", self.message_type())),
            (
                "signal_identifier",
                enumerated("SignalIdentifier", self.signal_identifier()),
            ),
        ];
        fields.extend(signal_fields(&self.signal));

        Node { name, fields }.render(f, "")
    }
}

impl Display for ServiceCapability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        capability_node(self).render(f, "")
    }
}

impl Display for SeidInformation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        seid_node(self).render(f, "")
    }
}
