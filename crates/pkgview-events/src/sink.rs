use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc, Mutex, PoisonError,
};

use crate::LoadEvent;

/// Trait for consuming events.
///
/// Each frontend provides its own implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LoadEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: LoadEvent) {
        (**self).emit(event);
    }
}

/// Channel-based event sink.
///
/// Sends events through a standard mpsc channel. The receiver end
/// is polled on the thread that owns the view.
pub struct ChannelSink {
    sender: Sender<LoadEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<LoadEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: LoadEvent) {
        let _ = self.sender.send(event);
    }
}

/// No-op event sink for tests or headless operation.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: LoadEvent) {}
}

/// Collector sink that stores all events for inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<LoadEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<LoadEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: LoadEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Forwards every event to two sinks, `first` then `second`.
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A: EventSink, B: EventSink> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
        }
    }
}

impl<A: EventSink, B: EventSink> EventSink for TeeSink<A, B> {
    fn emit(&self, event: LoadEvent) {
        self.first.emit(event.clone());
        self.second.emit(event);
    }
}
