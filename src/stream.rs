//! Push-based event plumbing between the driver delegate and stream consumers.
//!
//! Values flow from an [`EventHub`](struct.EventHub.html) through [`Source`](struct.Source.html)
//! operators into a [`SharedStream`](struct.SharedStream.html), which fans them out to
//! [`EventStream`](struct.EventStream.html) subscribers. Attaching to a source is what starts the
//! upstream work; dropping the returned [`Cancellable`](struct.Cancellable.html) undoes it.

mod action;
mod correlate;
mod hub;
mod share;
mod source;

use async_std::stream::Stream;
use static_assertions::*;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::sync::Receiver;

pub use action::ActionBinder;
pub use correlate::{first_outcome, Correlated};
pub use hub::EventHub;
pub use share::SharedStream;
pub use source::*;

/// Consumer end of a subscription.
///
/// Yields values in the order the producer emitted them and ends when the source completes.
/// Dropping the stream cancels the subscription.
pub struct EventStream<T> {
    receiver: Pin<Box<Receiver<T>>>,
    _subscription: Cancellable,
}

assert_impl_all!(EventStream<u8>: Send, Sync);

impl<T> EventStream<T> {
    pub(in crate) fn new(receiver: Receiver<T>, subscription: Cancellable) -> Self {
        Self {
            receiver: Box::pin(receiver),
            _subscription: subscription,
        }
    }

    /// Returns the next value if one is already available, without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Whether the source has completed and every delivered value has been consumed.
    pub fn is_terminated(&self) -> bool {
        self.receiver.is_closed() && self.receiver.is_empty()
    }
}

impl<T> Stream for EventStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<T>> {
        self.get_mut().receiver.as_mut().poll_next(cx)
    }
}
