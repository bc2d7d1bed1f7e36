//! AVDTP library traits.
//!
//! Provides the channel and connection traits through which the signaling engine talks to a
//! Bluetooth stack. The stack owns L2CAP, pairing and radio control; the engine only needs framed
//! byte channels and a way to open or accept them.
#![warn(missing_docs)]
use core::future::Future;

/// Channel error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// The peer refused the channel, or nobody listens on the requested PSM.
    Refused,

    /// The channel was closed before or during the operation.
    Closed,

    /// Stack specific failure.
    Other(&'static str),
}

impl core::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChannelError::Refused => f.write_str("channel refused"),
            ChannelError::Closed => f.write_str("channel closed"),
            ChannelError::Other(reason) => write!(f, "channel failure: {reason}"),
        }
    }
}

impl core::error::Error for ChannelError {}

/// Receiver of inbound frames.
///
/// The stack calls [`FrameSink::deliver`] once per received frame, and [`FrameSink::closed`]
/// once the channel is gone, possibly from its own callback context. Implementations must not
/// block.
pub trait FrameSink: Send + Sync {
    /// Deliver one complete frame.
    fn deliver(&self, frame: &[u8]);

    /// The channel closed for a reason other than [`Channel::disconnect`] on this end, such as
    /// a disconnect by the peer or a lost link.
    ///
    /// Called at most once. No frame is delivered afterwards.
    fn closed(&self);
}

/// A framed, ordered byte channel (an L2CAP basic-mode channel in practice).
pub trait Channel {
    /// Register the sink that receives every frame arriving on this channel.
    ///
    /// Replaces a previously registered sink. Frames that arrive before any sink is registered
    /// are buffered and delivered on registration, and so is a close that happened meanwhile.
    fn set_sink(&mut self, sink: Box<dyn FrameSink>);

    /// Queue one frame for transmission.
    ///
    /// This does not wait for any acknowledgment.
    fn send(&mut self, frame: &[u8]) -> Result<(), ChannelError>;

    /// Close the channel.
    ///
    /// The peer's sink learns about it through [`FrameSink::closed`]; the local sink does not.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), ChannelError>>;
}

/// Callback invoked for every incoming channel on a listened PSM.
pub type ChannelListener<C> = Box<dyn FnMut(C) + Send>;

/// A connection to one peer, able to open and accept channels.
pub trait Connection {
    /// The channel type produced by this connection.
    type Channel: Channel + Send + 'static;

    /// Open a new channel to the peer, resolving once the channel is open.
    fn create_channel(&mut self, psm: u16) -> impl Future<Output = Result<Self::Channel, ChannelError>>;

    /// Listen for channels opened by the peer on `psm`.
    ///
    /// The listener is called once per incoming channel, after the channel is open.
    fn listen(&mut self, psm: u16, listener: ChannelListener<Self::Channel>) -> Result<(), ChannelError>;
}
