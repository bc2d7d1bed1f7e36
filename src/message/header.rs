//! Definitions for the AVDTP signaling header.
//!
//! The header is two bytes. The first carries the message type, packet type and transaction label,
//! the second the signal identifier.
use core::convert::TryFrom;

use byteorder::{ByteOrder, LittleEndian};
use proc_bitfield::bitfield;

use crate::message::ParseError;

/// Size of the signaling header in bytes.
pub const HEADER_SIZE: usize = 2;

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    /// The raw signaling header, read as a little-endian `u16`.
    pub struct RawHeader(pub u16): Debug, FromStorage, IntoStorage {
        /// The signal identifier (second byte, bits 0 to 5).
        pub signal_identifier: u8 [try_get SignalIdentifier, set SignalIdentifier] @ 8..=13,
        /// Pairs a response with its command.
        pub transaction_label: u8 @ 4..=7,
        /// Fragmentation marker.
        pub packet_type: u8 [try_get PacketType, set PacketType] @ 2..=3,
        /// Command, accept, reject or general reject.
        pub message_type: u8 [try_get MessageType, set MessageType] @ 0..=1,
    }
}

impl RawHeader {
    /// Create a header from its fields.
    ///
    /// The transaction label must already fit into 4 bits.
    pub fn new(
        message_type: MessageType,
        packet_type: PacketType,
        transaction_label: u8,
        signal_identifier: SignalIdentifier,
    ) -> Self {
        Self(0)
            .with_message_type(message_type)
            .with_packet_type(packet_type)
            .with_transaction_label(transaction_label)
            .with_signal_identifier(signal_identifier)
    }

    /// Parse a header from the start of `buf`.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, ParseError> {
        if buf.len() < HEADER_SIZE {
            return Err(ParseError::TruncatedPacket {
                expected: HEADER_SIZE,
                found: buf.len(),
            });
        }

        let header = RawHeader(LittleEndian::read_u16(&buf[..HEADER_SIZE]));
        // Validate all enumerated fields up front.
        header.message_type()?;
        header.packet_type()?;
        header.signal_identifier()?;
        Ok(header)
    }

    /// Serialize the header.
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut buf = [0; HEADER_SIZE];
        LittleEndian::write_u16(&mut buf, self.0);
        buf
    }
}

/// Fragmentation marker of a signaling packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PacketType {
    /// The whole PDU fits into one packet.
    #[default]
    Single = 0,
    /// First fragment.
    Start = 1,
    /// Middle fragment.
    Continue = 2,
    /// Last fragment.
    End = 3,
}

impl TryFrom<u8> for PacketType {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Single),
            1 => Ok(Self::Start),
            2 => Ok(Self::Continue),
            3 => Ok(Self::End),
            _ => Err(ParseError::UnrecognizedDiscriminant {
                kind: "PacketType",
                value,
            }),
        }
    }
}

impl From<PacketType> for u8 {
    fn from(value: PacketType) -> Self {
        value as u8
    }
}

/// Kind of a signaling message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    /// A command, sent by the initiator.
    Command = 0,
    /// The acceptor did not understand the signal identifier.
    GeneralReject = 1,
    /// The command was accepted.
    ResponseAccept = 2,
    /// The command was rejected.
    ResponseReject = 3,
}

impl TryFrom<u8> for MessageType {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Command),
            1 => Ok(Self::GeneralReject),
            2 => Ok(Self::ResponseAccept),
            3 => Ok(Self::ResponseReject),
            _ => Err(ParseError::UnrecognizedDiscriminant {
                kind: "MessageType",
                value,
            }),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value as u8
    }
}

/// AVDTP signaling procedures.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalIdentifier {
    Discover = 0x01,
    GetCapabilities = 0x02,
    SetConfiguration = 0x03,
    GetConfiguration = 0x04,
    Reconfigure = 0x05,
    Open = 0x06,
    Start = 0x07,
    Close = 0x08,
    Suspend = 0x09,
    Abort = 0x0A,
    SecurityControl = 0x0B,
    GetAllCapabilities = 0x0C,
    DelayReport = 0x0D,
}

impl TryFrom<u8> for SignalIdentifier {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x01 => Self::Discover,
            0x02 => Self::GetCapabilities,
            0x03 => Self::SetConfiguration,
            0x04 => Self::GetConfiguration,
            0x05 => Self::Reconfigure,
            0x06 => Self::Open,
            0x07 => Self::Start,
            0x08 => Self::Close,
            0x09 => Self::Suspend,
            0x0A => Self::Abort,
            0x0B => Self::SecurityControl,
            0x0C => Self::GetAllCapabilities,
            0x0D => Self::DelayReport,
            _ => {
                return Err(ParseError::UnrecognizedDiscriminant {
                    kind: "SignalIdentifier",
                    value,
                });
            }
        })
    }
}

impl From<SignalIdentifier> for u8 {
    fn from(value: SignalIdentifier) -> Self {
        value as u8
    }
}
