//! The signaling channel engine.
//!
//! A [`SignalingChannel`] owns up to two sub-channels to one peer: the signaling channel, which
//! carries AVDTP signaling packets, and the transport channel, which carries media packets.
//! Frames received on either are queued without blocking the stack, and consumed in arrival
//! order by [`SignalingChannel::expect_signal`] and [`SignalingChannel::expect_media`].
mod acceptor;
pub mod expect;
mod slot;


use core::marker::PhantomData;
use core::time::Duration;
use std::boxed::Box;
use std::vec::Vec;

use avdtp_traits::{Channel, ChannelError, Connection};
use embassy_futures::select::{Either, select};
use futures::channel::mpsc::UnboundedReceiver;
use futures::{FutureExt, StreamExt};

use expect::Expectation;
pub use slot::Slot;
use slot::{ChannelEvent, Queues, Sinks};

use crate::counters::Counter;
use crate::message::signal::Signal;
use crate::message::{EncodeError, OverflowPolicy, ParseError, SignalingPacket};
use crate::timers::{self, Timer};
use crate::{AVDTP_PSM, Role};

/// Signaling channel errors.
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A received frame could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// A packet could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// The stack reported a channel failure.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
    /// A received signal did not meet the expectation. The signal is consumed.
    #[error("unexpected signal (expected {expected:?}, received {received:?})")]
    UnexpectedSignal {
        /// What the caller waited for.
        expected: Box<Expectation>,
        /// What arrived instead.
        received: Box<SignalingPacket>,
    },
    /// No signal arrived in time.
    #[error("timed out waiting for a signal")]
    SignalTimeout,
    /// No media packet arrived in time.
    #[error("timed out waiting for media")]
    MediaTimeout,
    /// The peer did not open the transport channel in time.
    #[error("timed out waiting for the transport channel")]
    ConnectionTimeout,
    /// The sub-channel is not connected.
    #[error("not connected")]
    NotConnected,
    /// The sub-channel is already connected.
    #[error("already connected")]
    AlreadyConnected,
}

/// Signaling channel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// PSM of both sub-channels.
    pub psm: u16,
    /// Handling of over-wide fields in sent signals.
    pub overflow_policy: OverflowPolicy,
    /// Timeout of acceptor sequences that do not take one.
    pub signal_timeout: Duration,
    /// Default timeout for media packets.
    pub media_timeout: Duration,
    /// How long [`SignalingChannel::accept_open_stream`] waits for the transport channel.
    pub stream_open_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            psm: AVDTP_PSM,
            overflow_policy: OverflowPolicy::Clamp,
            signal_timeout: Duration::from_secs(3),
            media_timeout: Duration::from_secs(3),
            stream_open_timeout: Duration::from_secs(10),
        }
    }
}

/// Wait for the next frame in `queue`, or `None` on timeout.
///
/// A frame that arrives after the timeout stays queued.
async fn receive<TIMER: Timer>(queue: &mut UnboundedReceiver<Vec<u8>>, timeout: Duration) -> Option<Vec<u8>> {
    match select(queue.next(), timers::after::<TIMER>(timeout)).await {
        Either::First(frame) => frame,
        Either::Second(_) => None,
    }
}

/// A signaling session with one peer.
pub struct SignalingChannel<CONN: Connection, TIMER: Timer> {
    connection: CONN,
    config: Config,
    role: Role,
    signaling_channel: Option<CONN::Channel>,
    transport_channel: Option<CONN::Channel>,
    signaling_queue: UnboundedReceiver<Vec<u8>>,
    transport_queue: UnboundedReceiver<Vec<u8>>,
    /// Captures and closes reported by the stack, not yet applied.
    events: UnboundedReceiver<ChannelEvent<CONN::Channel>>,
    sinks: Sinks<CONN::Channel>,
    acp_seid: u8,
    int_seid: u8,
    transaction_label: Counter,
    _timer: PhantomData<TIMER>,
}

impl<CONN: Connection, TIMER: Timer> SignalingChannel<CONN, TIMER> {
    fn new(connection: CONN, config: Config, role: Role) -> Self {
        let (sinks, queues) = Sinks::new();
        let Queues {
            signaling,
            transport,
            events,
        } = queues;

        Self {
            connection,
            config,
            role,
            signaling_channel: None,
            transport_channel: None,
            signaling_queue: signaling,
            transport_queue: transport,
            events,
            sinks,
            acp_seid: 0,
            int_seid: 0,
            transaction_label: Counter::new_transaction_label(),
            _timer: PhantomData,
        }
    }

    /// Open the signaling channel to the peer, as initiator.
    pub async fn initiate(connection: CONN) -> Result<Self, Error> {
        Self::initiate_with_config(connection, Config::default()).await
    }

    /// Open the signaling channel to the peer, as initiator, with a custom configuration.
    pub async fn initiate_with_config(connection: CONN, config: Config) -> Result<Self, Error> {
        let mut channel = Self::new(connection, config, Role::Initiator);
        channel.initiate_signaling_channel().await?;
        Ok(channel)
    }

    /// Listen for the peer's channels, as acceptor.
    ///
    /// Does not wait. The first channel the peer opens becomes the signaling channel, the next
    /// one the transport channel.
    pub fn accept(connection: CONN) -> Result<Self, Error> {
        Self::accept_with_config(connection, Config::default())
    }

    /// Listen for the peer's channels, as acceptor, with a custom configuration.
    pub fn accept_with_config(connection: CONN, config: Config) -> Result<Self, Error> {
        let mut channel = Self::new(connection, config, Role::Acceptor);
        channel.listen()?;
        Ok(channel)
    }

    /// The role of this session.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The configuration of this session.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Acceptor endpoint learned from the last accepted configuration.
    pub fn acp_seid(&self) -> u8 {
        self.acp_seid
    }

    /// Initiator endpoint learned from the last accepted configuration.
    pub fn int_seid(&self) -> u8 {
        self.int_seid
    }

    /// Whether the signaling channel is connected.
    pub fn is_connected(&mut self) -> bool {
        self.apply_events();
        self.signaling_channel.is_some()
    }

    /// Whether the transport channel is connected.
    pub fn is_transport_connected(&mut self) -> bool {
        self.apply_events();
        self.transport_channel.is_some()
    }

    fn handle(&mut self, slot: Slot) -> &mut Option<CONN::Channel> {
        match slot {
            Slot::Signaling => &mut self.signaling_channel,
            Slot::Transport => &mut self.transport_channel,
        }
    }

    fn apply(&mut self, event: ChannelEvent<CONN::Channel>) {
        match event {
            ChannelEvent::Captured(slot, channel) => *self.handle(slot) = Some(channel),
            ChannelEvent::Closed(slot) => {
                if self.handle(slot).take().is_some() {
                    info!("{:?} lost {:?} channel, closed by the peer", self.role, slot);
                }
            }
        }
    }

    /// Apply every capture and close reported so far, in order.
    fn apply_events(&mut self) {
        while let Some(Some(event)) = self.events.next().now_or_never() {
            self.apply(event);
        }
    }

    /// Allocate the transaction label for the next command.
    pub fn next_transaction_label(&mut self) -> u8 {
        self.transaction_label.next()
    }

    /// Open the signaling channel to the peer.
    ///
    /// Fails with [`Error::AlreadyConnected`] if it is open.
    pub async fn initiate_signaling_channel(&mut self) -> Result<(), Error> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        let mut channel = self.connection.create_channel(self.config.psm).await?;
        self.sinks.slots().claim(Slot::Signaling);
        channel.set_sink(self.sinks.sink(Slot::Signaling));
        self.signaling_channel = Some(channel);

        info!("{:?} opened signaling channel", self.role);
        Ok(())
    }

    /// Open the transport channel to the peer.
    ///
    /// Fails with [`Error::AlreadyConnected`] if it is open.
    pub async fn initiate_transport_channel(&mut self) -> Result<(), Error> {
        if self.is_transport_connected() {
            return Err(Error::AlreadyConnected);
        }

        let mut channel = self.connection.create_channel(self.config.psm).await?;
        self.sinks.slots().claim(Slot::Transport);
        channel.set_sink(self.sinks.sink(Slot::Transport));
        self.transport_channel = Some(channel);

        info!("{:?} opened transport channel", self.role);
        Ok(())
    }

    /// Close the signaling channel.
    ///
    /// The handle is released even if the stack fails to close the channel.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        self.apply_events();
        let mut channel = self.signaling_channel.take().ok_or(Error::NotConnected)?;
        self.sinks.slots().release(Slot::Signaling);

        channel.disconnect().await?;
        info!("{:?} closed signaling channel", self.role);
        Ok(())
    }

    /// Close the transport channel.
    ///
    /// The handle is released even if the stack fails to close the channel.
    pub async fn disconnect_transport_channel(&mut self) -> Result<(), Error> {
        self.apply_events();
        let mut channel = self.transport_channel.take().ok_or(Error::NotConnected)?;
        self.sinks.slots().release(Slot::Transport);

        channel.disconnect().await?;
        info!("{:?} closed transport channel", self.role);
        Ok(())
    }

    /// Send a signal, without waiting for a reply.
    pub fn send_signal(&mut self, packet: &SignalingPacket) -> Result<(), Error> {
        self.apply_events();
        let channel = self.signaling_channel.as_mut().ok_or(Error::NotConnected)?;
        let bytes = packet.to_bytes_with(self.config.overflow_policy)?;

        debug!("{:?} sending signal:\n{}", self.role, packet);
        channel.send(&bytes)?;
        Ok(())
    }

    /// Send a media packet on the transport channel.
    pub fn send_media(&mut self, packet: &[u8]) -> Result<(), Error> {
        self.apply_events();
        let channel = self.transport_channel.as_mut().ok_or(Error::NotConnected)?;

        debug!("{:?} sending media packet of {} bytes", self.role, packet.len());
        channel.send(packet)?;
        Ok(())
    }

    /// Wait for the next signal and check it against `expected`.
    ///
    /// A signal that does not match is consumed, and reported as [`Error::UnexpectedSignal`].
    pub async fn expect_signal(
        &mut self,
        expected: impl Into<Expectation>,
        timeout: Duration,
    ) -> Result<SignalingPacket, Error> {
        let expected = expected.into();
        let frame = receive::<TIMER>(&mut self.signaling_queue, timeout)
            .await
            .ok_or(Error::SignalTimeout)?;

        let packet = SignalingPacket::parse(&frame)?;
        if !expected.matches(&packet) {
            error!(
                "{:?} received unexpected signal, expected {:?}, received:\n{}",
                self.role, expected, packet
            );
            return Err(Error::UnexpectedSignal {
                expected: Box::new(expected),
                received: Box::new(packet),
            });
        }

        debug!("{:?} received signal:\n{}", self.role, packet);
        Ok(packet)
    }

    /// Wait for the next media packet.
    pub async fn expect_media(&mut self, timeout: Duration) -> Result<Vec<u8>, Error> {
        let packet = receive::<TIMER>(&mut self.transport_queue, timeout)
            .await
            .ok_or(Error::MediaTimeout)?;

        debug!("{:?} received media packet of {} bytes", self.role, packet.len());
        Ok(packet)
    }

    /// Send a command and wait for its reply.
    ///
    /// The command gets the next transaction label. Accepts, rejects and general rejects with the
    /// same label and signal identifier all count as reply.
    pub async fn command(&mut self, signal: Signal, timeout: Duration) -> Result<SignalingPacket, Error> {
        let command = SignalingPacket::new(self.next_transaction_label(), signal);
        self.send_signal(&command)?;

        self.expect_signal(
            Expectation::Reply {
                transaction_label: command.transaction_label,
                signal_identifier: command.signal_identifier(),
            },
            timeout,
        )
        .await
    }
}
