use log::*;
use static_assertions::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::Source;
use super::source::{Cancellable, Signal};

type Action = Arc<dyn Fn() + Send + Sync>;

/// Turns attaching to a source into a request and detaching into its teardown.
///
/// `activate` runs after every attachment of a bound source, right after the upstream listener
/// is in place so that an immediate response can't be missed. `deactivate` runs when that
/// attachment is cancelled, at most once, and not at all if the source completed on its own.
/// Combined with [`share`](struct.Source.html#method.share) this yields one activation per
/// subscriber cycle.
#[derive(Clone)]
pub struct ActionBinder {
    activate: Action,
    deactivate: Action,
    active: Arc<AtomicUsize>,
}

assert_impl_all!(ActionBinder: Send, Sync);

impl ActionBinder {
    pub fn new(
        activate: impl Fn() + Send + Sync + 'static,
        deactivate: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            activate: Arc::new(activate),
            deactivate: Arc::new(deactivate),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of attachments that were activated and not yet cancelled or completed.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn bind<T: Clone + Send + 'static>(&self, source: Source<T>) -> Source<T> {
        let binder = self.clone();
        Source::new(move |sink| {
            let completed = Arc::new(AtomicBool::new(false));
            // Counted before attaching: the upstream may complete right away.
            binder.active.fetch_add(1, Ordering::SeqCst);
            let upstream = {
                let completed = completed.clone();
                let active = binder.active.clone();
                source.attach(Arc::new(move |signal: Signal<T>| {
                    if let Signal::Complete = signal {
                        if !completed.swap(true, Ordering::SeqCst) {
                            active.fetch_sub(1, Ordering::SeqCst);
                        }
                    }
                    sink(signal);
                }))
            };

            trace!("activating bound source");
            (binder.activate)();

            let binder = binder.clone();
            Cancellable::new(move || {
                drop(upstream);
                if !completed.swap(true, Ordering::SeqCst) {
                    binder.active.fetch_sub(1, Ordering::SeqCst);
                    trace!("deactivating bound source");
                    (binder.deactivate)();
                }
            })
        })
    }
}
