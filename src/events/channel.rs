//! Event channel built on crossbeam-channel.
//!
//! Lets the pipeline report progress to whichever front end is listening.

use super::{Event, PipelineEvent, PipelinePhase};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Sending half, cloneable across threads
#[derive(Debug, Clone)]
pub struct EventSender(Sender<Event>);

impl EventSender {
    /// Send an event; dropped silently once the receiver is gone
    pub fn send(&self, event: Event) {
        self.0.send(event).ok();
    }

    pub(crate) fn pipeline(&self, event: PipelineEvent) {
        self.send(Event::Pipeline(event));
    }

    pub(crate) fn phase(&self, phase: PipelinePhase) {
        self.pipeline(PipelineEvent::PhaseChanged { phase });
    }
}

/// Receiving half, held by the front end
#[derive(Debug)]
pub struct EventReceiver(Receiver<Event>);

impl EventReceiver {
    /// Next event; `None` once every sender is dropped and the queue is empty
    pub fn recv(&self) -> Option<Event> {
        self.0.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.0.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.0.recv_timeout(timeout)
    }

    /// Blocking iterator that ends when every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.0.iter()
    }
}

/// Factory for sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; a comparison emits only a handful of events
    pub fn new() -> (EventSender, EventReceiver) {
        split(crossbeam_channel::unbounded())
    }

    /// Bounded channel; `send` blocks while it is full
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        split(crossbeam_channel::bounded(capacity))
    }
}

fn split((tx, rx): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
    (EventSender(tx), EventReceiver(rx))
}

/// Sender whose receiver is already dropped, for silent runs
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}
