//! Sub-channel slots, and the sinks through which the stack reports frames and closes.
use core::sync::atomic::{AtomicBool, Ordering};
use std::boxed::Box;
use std::sync::Arc;
use std::vec::Vec;

use avdtp_traits::FrameSink;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

/// A sub-channel of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// Carries signaling packets.
    Signaling,
    /// Carries media packets.
    Transport,
}

/// Occupancy of the sub-channel slots, shared with the connection listener and the sinks.
#[derive(Debug, Default)]
pub(super) struct Slots {
    signaling: AtomicBool,
    transport: AtomicBool,
}

impl Slots {
    fn flag(&self, slot: Slot) -> &AtomicBool {
        match slot {
            Slot::Signaling => &self.signaling,
            Slot::Transport => &self.transport,
        }
    }

    pub(super) fn claim(&self, slot: Slot) {
        self.flag(slot).store(true, Ordering::Release);
    }

    pub(super) fn release(&self, slot: Slot) {
        self.flag(slot).store(false, Ordering::Release);
    }

    /// Claim the first free slot, signaling before transport.
    pub(super) fn claim_free(&self) -> Option<Slot> {
        [Slot::Signaling, Slot::Transport].into_iter().find(|slot| {
            self.flag(*slot)
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        })
    }
}

/// A change of a sub-channel, reported from the stack's context.
pub(super) enum ChannelEvent<C> {
    /// The listener captured a channel opened by the peer.
    Captured(Slot, C),
    /// The channel in the slot was closed, by the peer or by the stack.
    Closed(Slot),
}

/// Receiving ends of the session's queues.
pub(super) struct Queues<C> {
    pub(super) signaling: UnboundedReceiver<Vec<u8>>,
    pub(super) transport: UnboundedReceiver<Vec<u8>>,
    pub(super) events: UnboundedReceiver<ChannelEvent<C>>,
}

/// Sending ends of the session's queues. Hands out the sink of each slot.
pub(super) struct Sinks<C> {
    signaling: UnboundedSender<Vec<u8>>,
    transport: UnboundedSender<Vec<u8>>,
    events: UnboundedSender<ChannelEvent<C>>,
    slots: Arc<Slots>,
}

impl<C> Clone for Sinks<C> {
    fn clone(&self) -> Self {
        Self {
            signaling: self.signaling.clone(),
            transport: self.transport.clone(),
            events: self.events.clone(),
            slots: self.slots.clone(),
        }
    }
}

impl<C: Send + 'static> Sinks<C> {
    pub(super) fn new() -> (Self, Queues<C>) {
        let (signaling, signaling_rx) = unbounded();
        let (transport, transport_rx) = unbounded();
        let (events, events_rx) = unbounded();

        (
            Self {
                signaling,
                transport,
                events,
                slots: Arc::new(Slots::default()),
            },
            Queues {
                signaling: signaling_rx,
                transport: transport_rx,
                events: events_rx,
            },
        )
    }

    pub(super) fn slots(&self) -> &Slots {
        &self.slots
    }

    /// The sink for the channel in `slot`.
    pub(super) fn sink(&self, slot: Slot) -> Box<dyn FrameSink> {
        let frames = match slot {
            Slot::Signaling => self.signaling.clone(),
            Slot::Transport => self.transport.clone(),
        };

        Box::new(SlotSink {
            frames,
            slot,
            slots: self.slots.clone(),
            events: self.events.clone(),
        })
    }

    /// Hand a captured channel over to the session.
    ///
    /// Releases the slot if the session is gone.
    pub(super) fn capture(&self, slot: Slot, channel: C) {
        if self.events.unbounded_send(ChannelEvent::Captured(slot, channel)).is_err() {
            self.slots.release(slot);
        }
    }
}

/// Queues the frames of one slot, and frees the slot when its channel closes.
struct SlotSink<C> {
    frames: UnboundedSender<Vec<u8>>,
    slot: Slot,
    slots: Arc<Slots>,
    events: UnboundedSender<ChannelEvent<C>>,
}

impl<C: Send> FrameSink for SlotSink<C> {
    fn deliver(&self, frame: &[u8]) {
        if self.frames.unbounded_send(frame.to_vec()).is_err() {
            trace!("Dropping frame of {} bytes, queue closed", frame.len());
        }
    }

    fn closed(&self) {
        // The peer's next channel may claim the slot before the session applies the close.
        self.slots.release(self.slot);
        if self.events.unbounded_send(ChannelEvent::Closed(self.slot)).is_err() {
            trace!("{:?} channel closed after the session ended", self.slot);
        }
    }
}
