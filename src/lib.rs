//! AVDTP signaling for A2DP conformance testing.
//!
//! The crate has two layers:
//! - [`message`], a bit-exact codec for AVDTP signaling packets and service capabilities.
//! - [`channel`], a signaling channel engine that sends signals and waits for expected ones,
//!   with wildcard matching and timeouts, plus the standard acceptor bring-up sequences.
//!
//! The engine runs on top of the channel and connection traits of `avdtp-traits`, implemented by
//! the Bluetooth stack, and a [`timers::Timer`] implemented by the application.
#![warn(missing_docs)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod channel;
pub mod counters;
pub mod message;
pub mod timers;

#[cfg(test)]
pub mod dummy;

pub use avdtp_traits::{Channel, ChannelError, ChannelListener, Connection, FrameSink};

/// The L2CAP PSM of AVDTP.
pub const AVDTP_PSM: u16 = 0x0019;

/// The role of a signaling channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Opened the signaling channel.
    Initiator,
    /// Accepted the signaling channel from the peer.
    Acceptor,
}
