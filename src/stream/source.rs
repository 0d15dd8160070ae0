use parking_lot::Mutex;
use static_assertions::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::EventStream;
use super::share::SharedStream;
use crate::sync;

/// Notification pushed from a source to its sink.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Signal<T> {
    Next(T),
    Complete,
}

/// Receiving end of a source attachment.
pub type Sink<T> = Arc<dyn Fn(Signal<T>) + Send + Sync>;

/// Handle of a live attachment. Dropping or cancelling it detaches exactly once.
#[must_use]
pub struct Cancellable(Mutex<Option<Box<dyn FnOnce() + Send>>>);

assert_impl_all!(Cancellable: Send, Sync);

impl Cancellable {
    pub fn new(f: impl FnOnce() + Send + 'static) -> Self {
        Self(Mutex::new(Some(Box::new(f))))
    }

    /// Handle that has nothing to detach.
    pub fn empty() -> Self {
        Self(Mutex::new(None))
    }

    pub fn cancel(&self) {
        let f = self.0.lock().take();
        if let Some(f) = f {
            f();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.lock().is_none()
    }
}

impl Drop for Cancellable {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Cold source of values: each [`attach`](#method.attach) starts a fresh upstream attachment
/// with its own side effects.
pub struct Source<T>(Arc<dyn Fn(Sink<T>) -> Cancellable + Send + Sync>);

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Clone + Send + 'static> Source<T> {
    pub fn new(attach: impl Fn(Sink<T>) -> Cancellable + Send + Sync + 'static) -> Self {
        Self(Arc::new(attach))
    }

    /// Source that completes as soon as it's attached, without emitting anything.
    pub fn empty() -> Self {
        Self::new(|sink| {
            sink(Signal::Complete);
            Cancellable::empty()
        })
    }

    pub fn attach(&self, sink: Sink<T>) -> Cancellable {
        (self.0)(sink)
    }

    /// Drops values not matching `pred`.
    pub fn filter(self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        let pred = Arc::new(pred);
        Self::new(move |sink| {
            let pred = pred.clone();
            self.attach(Arc::new(move |signal: Signal<T>| match signal {
                Signal::Next(v) if !pred(&v) => {}
                signal => sink(signal),
            }))
        })
    }

    pub fn map<U: Clone + Send + 'static>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Source<U> {
        let f = Arc::new(f);
        Source::new(move |sink: Sink<U>| {
            let f = f.clone();
            self.attach(Arc::new(move |signal: Signal<T>| match signal {
                Signal::Next(v) => sink(Signal::Next(f(v))),
                Signal::Complete => sink(Signal::Complete),
            }))
        })
    }

    /// Interleaves values of both sources. Completes once both sources have completed.
    pub fn merge(self, other: Self) -> Self {
        Self::new(move |sink| {
            let pending = Arc::new(AtomicUsize::new(2));
            let side = |sink: Sink<T>, pending: Arc<AtomicUsize>| -> Sink<T> {
                Arc::new(move |signal: Signal<T>| match signal {
                    Signal::Next(v) => sink(Signal::Next(v)),
                    Signal::Complete => if pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                        sink(Signal::Complete);
                    }
                })
            };
            let a = self.attach(side(sink.clone(), pending.clone()));
            let b = other.attach(side(sink, pending));
            Cancellable::new(move || {
                a.cancel();
                b.cancel();
            })
        })
    }

    /// Passes the first value through and completes right after it.
    pub fn first(self) -> Self {
        Self::new(move |sink| {
            let done = Arc::new(AtomicBool::new(false));
            self.attach(Arc::new(move |signal: Signal<T>| {
                if done.swap(true, Ordering::SeqCst) {
                    return;
                }
                if let Signal::Next(v) = signal {
                    sink(Signal::Next(v));
                }
                sink(Signal::Complete);
            }))
        })
    }

    /// Attaches a new subscriber that receives values until the source completes.
    pub fn subscribe(&self) -> EventStream<T> {
        let (sender, receiver) = sync::channel();
        let attachment = self.attach(Arc::new(move |signal: Signal<T>| match signal {
            Signal::Next(v) => {
                let _ = sender.try_send(v);
            }
            Signal::Complete => {
                sender.close();
            }
        }));
        EventStream::new(receiver, attachment)
    }

    /// Multicasts this source, see [`SharedStream`](struct.SharedStream.html).
    pub fn share(self) -> SharedStream<T> {
        SharedStream::new(self)
    }
}
