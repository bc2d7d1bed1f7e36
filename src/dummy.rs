//! Implements a dummy connection and timer for testing.
//!
//! [`DummyConnection::pair`] creates two connected ends. A channel created on one end is
//! delivered to the listener of the other, and frames sent on a channel arrive at its peer.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use avdtp_traits::{Channel, ChannelError, ChannelListener, Connection, FrameSink};

use crate::timers::Timer;

/// A dummy timer for testing, backed by the tokio clock.
pub struct DummyTimer {}

impl Timer for DummyTimer {
    async fn after_millis(milliseconds: u64) {
        tokio::time::sleep(Duration::from_millis(milliseconds)).await;
    }
}

#[derive(Default)]
struct ChannelState {
    sink: Option<Box<dyn FrameSink>>,
    /// Frames received while no sink was registered.
    pending: Vec<Vec<u8>>,
    closed: bool,
}

/// One end of a dummy channel.
pub struct DummyChannel {
    local: Arc<Mutex<ChannelState>>,
    peer: Arc<Mutex<ChannelState>>,
}

impl DummyChannel {
    fn pair() -> (Self, Self) {
        let a = Arc::new(Mutex::new(ChannelState::default()));
        let b = Arc::new(Mutex::new(ChannelState::default()));

        (
            Self {
                local: a.clone(),
                peer: b.clone(),
            },
            Self { local: b, peer: a },
        )
    }

    /// Take the frames that arrived while no sink was registered.
    pub fn probe_received_data(&self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.local.lock().unwrap().pending)
    }
}

impl Channel for DummyChannel {
    fn set_sink(&mut self, sink: Box<dyn FrameSink>) {
        let mut state = self.local.lock().unwrap();
        for frame in state.pending.drain(..) {
            sink.deliver(&frame);
        }
        if state.closed {
            sink.closed();
        }
        state.sink = Some(sink);
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), ChannelError> {
        let mut peer = self.peer.lock().unwrap();
        if peer.closed {
            return Err(ChannelError::Closed);
        }

        match &peer.sink {
            Some(sink) => sink.deliver(frame),
            None => peer.pending.push(frame.to_vec()),
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ChannelError> {
        self.local.lock().unwrap().closed = true;

        let mut peer = self.peer.lock().unwrap();
        if !peer.closed {
            peer.closed = true;
            if let Some(sink) = &peer.sink {
                sink.closed();
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Endpoint {
    listeners: HashMap<u16, ChannelListener<DummyChannel>>,
}

/// One end of a dummy connection.
pub struct DummyConnection {
    local: Arc<Mutex<Endpoint>>,
    peer: Arc<Mutex<Endpoint>>,
}

impl DummyConnection {
    /// Create two connected ends.
    pub fn pair() -> (Self, Self) {
        let a = Arc::new(Mutex::new(Endpoint::default()));
        let b = Arc::new(Mutex::new(Endpoint::default()));

        (
            Self {
                local: a.clone(),
                peer: b.clone(),
            },
            Self { local: b, peer: a },
        )
    }
}

impl Connection for DummyConnection {
    type Channel = DummyChannel;

    async fn create_channel(&mut self, psm: u16) -> Result<DummyChannel, ChannelError> {
        let mut peer = self.peer.lock().unwrap();
        let listener = peer.listeners.get_mut(&psm).ok_or(ChannelError::Refused)?;

        let (local, remote) = DummyChannel::pair();
        listener(remote);
        Ok(local)
    }

    fn listen(&mut self, psm: u16, listener: ChannelListener<DummyChannel>) -> Result<(), ChannelError> {
        self.local.lock().unwrap().listeners.insert(psm, listener);
        Ok(())
    }
}
