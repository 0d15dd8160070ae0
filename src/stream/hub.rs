use parking_lot::Mutex;
use static_assertions::*;
use std::sync::{Arc, Weak};

use super::{EventStream, Source};
use super::source::{Cancellable, Signal, Sink};

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Sink<T>)>,
}

/// Broadcast point for one kind of driver callback.
///
/// Every published value is delivered to all listeners attached at the time of publishing, in
/// publishing order. Publishing never blocks on listeners and never fails. A hub created with
/// [`unsupported`](#method.unsupported) stands for a callback the platform never makes: its
/// sources complete right away.
pub struct EventHub<T> {
    listeners: Arc<Mutex<Listeners<T>>>,
    supported: bool,
}

assert_impl_all!(EventHub<u8>: Send, Sync);

impl<T: Clone + Send + 'static> EventHub<T> {
    pub fn new() -> Self {
        Self::with_support(true)
    }

    pub fn unsupported() -> Self {
        Self::with_support(false)
    }

    pub(in crate) fn with_support(supported: bool) -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
            supported,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }

    pub fn publish(&self, value: T) {
        // Listeners run unlocked since they may attach or detach while handling the value.
        let sinks: Vec<Sink<T>> = self.listeners.lock().entries.iter()
            .map(|(_, sink)| sink.clone())
            .collect();
        if let Some((last, rest)) = sinks.split_last() {
            for sink in rest {
                sink(Signal::Next(value.clone()));
            }
            last(Signal::Next(value));
        }
    }

    /// Source attaching a listener to this hub. The hub never completes.
    pub fn source(&self) -> Source<T> {
        if !self.supported {
            return Source::empty();
        }
        let listeners = Arc::downgrade(&self.listeners);
        Source::new(move |sink| listen(&listeners, sink))
    }

    /// Subscribes to values published from now on.
    pub fn subscribe(&self) -> EventStream<T> {
        self.source().subscribe()
    }
}

impl<T: Clone + Send + 'static> Default for EventHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn listen<T: 'static>(listeners: &Weak<Mutex<Listeners<T>>>, sink: Sink<T>) -> Cancellable {
    let strong = match listeners.upgrade() {
        Some(v) => v,
        None => return Cancellable::empty(),
    };
    let id = {
        let mut l = strong.lock();
        let id = l.next_id;
        l.next_id += 1;
        l.entries.push((id, sink));
        id
    };
    let listeners = listeners.clone();
    Cancellable::new(move || {
        if let Some(listeners) = listeners.upgrade() {
            let removed = {
                let mut l = listeners.lock();
                l.entries.iter().position(|(i, _)| *i == id)
                    .map(|pos| l.entries.remove(pos))
            };
            // Dropped unlocked: the sink may own attachments that detach from this hub.
            drop(removed);
        }
    })
}
