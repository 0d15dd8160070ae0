use log::*;
use parking_lot::Mutex;
use static_assertions::*;
use std::sync::{Arc, Weak};

use super::{EventStream, Source};
use super::source::{Cancellable, Signal, Sink};
use crate::sync::{self, Sender};

struct State<T> {
    subscribers: Vec<(u64, Sender<T>)>,
    next_id: u64,
    last: Option<T>,
    upstream: Option<Cancellable>,
    // Bumped each time the upstream is attached or torn down, so that values from a torn down
    // attachment are never mistaken for current ones.
    epoch: u64,
    completed: bool,
}

/// Multicast stream that replays the latest value to new subscribers.
///
/// The first subscriber attaches the upstream source; the others share that attachment. When
/// the last subscriber goes away the upstream is detached and the cached value forgotten, so the
/// next subscriber attaches anew instead of observing a stale value. Once the upstream
/// completes the stream stays completed: later subscribers receive the final cached value, if
/// any, and the end of the stream.
///
/// Clones share the same subscribers and cache.
pub struct SharedStream<T> {
    source: Source<T>,
    state: Arc<Mutex<State<T>>>,
    // Held while the upstream is attached or torn down. Never taken while holding `state`.
    transition: Arc<Mutex<()>>,
}

assert_impl_all!(SharedStream<u8>: Send, Sync);

impl<T> Clone for SharedStream<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            state: self.state.clone(),
            transition: self.transition.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> SharedStream<T> {
    pub(in crate) fn new(source: Source<T>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(State {
                subscribers: Vec::new(),
                next_id: 0,
                last: None,
                upstream: None,
                epoch: 0,
                completed: false,
            })),
            transition: Arc::new(Mutex::new(())),
        }
    }

    pub fn subscribe(&self) -> EventStream<T> {
        let (sender, receiver) = sync::channel();
        let (id, attach_epoch) = {
            let mut s = self.state.lock();
            if let Some(v) = &s.last {
                let _ = sender.try_send(v.clone());
            }
            if s.completed {
                sender.close();
                return EventStream::new(receiver, Cancellable::empty());
            }
            let id = s.next_id;
            s.next_id += 1;
            s.subscribers.push((id, sender));
            trace!("subscriber #{} attached, {} total", id, s.subscribers.len());
            let attach_epoch = if s.subscribers.len() == 1 {
                s.epoch += 1;
                Some(s.epoch)
            } else {
                None
            };
            (id, attach_epoch)
        };

        if let Some(epoch) = attach_epoch {
            let _transition = self.transition.lock();
            self.attach_upstream(epoch);
        }

        let state = self.state.clone();
        let transition = self.transition.clone();
        EventStream::new(receiver, Cancellable::new(move || detach(&state, &transition, id)))
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// The value new subscribers would receive first.
    pub fn latest(&self) -> Option<T> {
        self.state.lock().last.clone()
    }

    pub fn is_completed(&self) -> bool {
        self.state.lock().completed
    }

    fn attach_upstream(&self, epoch: u64) {
        // Attached unlocked: the upstream may deliver values before `attach` returns.
        let upstream = self.source.attach(fan_out(Arc::downgrade(&self.state), epoch));
        let mut s = self.state.lock();
        if s.epoch == epoch && !s.completed {
            s.upstream = Some(upstream);
        } else {
            drop(s);
            drop(upstream);
        }
    }
}

fn fan_out<T: Clone + Send + 'static>(state: Weak<Mutex<State<T>>>, epoch: u64) -> Sink<T> {
    Arc::new(move |signal: Signal<T>| {
        let state = match state.upgrade() {
            Some(v) => v,
            None => return,
        };
        let mut s = state.lock();
        if s.epoch != epoch {
            return;
        }
        match signal {
            Signal::Next(v) => {
                for (_, sender) in &s.subscribers {
                    let _ = sender.try_send(v.clone());
                }
                s.last = Some(v);
            }
            Signal::Complete => {
                trace!("upstream completed, closing {} subscribers", s.subscribers.len());
                s.completed = true;
                s.subscribers.clear();
                let upstream = s.upstream.take();
                drop(s);
                drop(upstream);
            }
        }
    })
}

fn detach<T>(state: &Mutex<State<T>>, transition: &Mutex<()>, id: u64) {
    // A subscriber arriving while the upstream is being torn down must not attach it again
    // until the teardown is done.
    let _transition = transition.lock();
    let upstream = {
        let mut s = state.lock();
        s.subscribers.retain(|(i, _)| *i != id);
        trace!("subscriber #{} detached, {} left", id, s.subscribers.len());
        if s.subscribers.is_empty() && !s.completed {
            s.epoch += 1;
            s.last = None;
            s.upstream.take()
        } else {
            None
        }
    };
    // Detaching the upstream may call into the driver.
    drop(upstream);
}

#[cfg(test)]
mod test {
    use super::*;
    use async_std::prelude::*;
    use async_std::task::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::stream::EventHub;

    struct Counted {
        attached: Arc<AtomicUsize>,
        detached: Arc<AtomicUsize>,
    }

    impl Counted {
        fn wrap<T: Clone + Send + 'static>(hub: &EventHub<T>) -> (Self, Source<T>) {
            let attached = Arc::new(AtomicUsize::new(0));
            let detached = Arc::new(AtomicUsize::new(0));
            let inner = hub.source();
            let source = {
                let attached = attached.clone();
                let detached = detached.clone();
                Source::new(move |sink| {
                    attached.fetch_add(1, Ordering::SeqCst);
                    let upstream = inner.attach(sink);
                    let detached = detached.clone();
                    Cancellable::new(move || {
                        drop(upstream);
                        detached.fetch_add(1, Ordering::SeqCst);
                    })
                })
            };
            (Self { attached, detached }, source)
        }

        fn counts(&self) -> (usize, usize) {
            (self.attached.load(Ordering::SeqCst), self.detached.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn late_subscriber_gets_latest_then_live() {
        let hub = EventHub::new();
        let shared = hub.source().share();

        let mut early = shared.subscribe();
        hub.publish(-50);
        let mut late = shared.subscribe();
        hub.publish(-40);

        assert_eq!(block_on(early.next()), Some(-50));
        assert_eq!(block_on(early.next()), Some(-40));
        assert_eq!(block_on(late.next()), Some(-50));
        assert_eq!(block_on(late.next()), Some(-40));
        assert_eq!(early.try_next(), None);
        assert_eq!(late.try_next(), None);
    }

    #[test]
    fn subscriber_before_any_value_gets_only_live() {
        let hub = EventHub::new();
        let shared = hub.source().share();
        let mut s = shared.subscribe();
        assert_eq!(s.try_next(), None);
        assert_eq!(shared.latest(), None);
        hub.publish(1);
        assert_eq!(s.try_next(), Some(1));
        assert_eq!(shared.latest(), Some(1));
    }

    #[test]
    fn single_upstream_attachment() {
        let hub = EventHub::<i32>::new();
        let (counted, source) = Counted::wrap(&hub);
        let shared = source.share();

        let subs: Vec<_> = (0..5).map(|_| shared.subscribe()).collect();
        assert_eq!(counted.counts(), (1, 0));
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(shared.subscriber_count(), 5);

        let mut subs = subs.into_iter();
        for s in subs.by_ref().take(4) {
            drop(s);
            assert_eq!(counted.counts(), (1, 0));
        }
        drop(subs);
        assert_eq!(counted.counts(), (1, 1));
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn all_subscribers_see_same_sequence() {
        let hub = EventHub::new();
        let shared = hub.source().share();
        let subs: Vec<_> = (0..4).map(|_| shared.subscribe()).collect();
        for v in 0..20 {
            hub.publish(v);
        }
        for mut s in subs {
            let got: Vec<i32> = std::iter::from_fn(|| s.try_next()).collect();
            assert_eq!(got, (0..20).collect::<Vec<_>>());
        }
    }

    // Having no subscribers resets the stream: the next subscriber re-attaches the upstream
    // and doesn't see values from the previous attachment.
    #[test]
    fn reattaches_after_last_subscriber_leaves() {
        let hub = EventHub::new();
        let (counted, source) = Counted::wrap(&hub);
        let shared = source.share();

        let s = shared.subscribe();
        hub.publish(1);
        drop(s);
        assert_eq!(counted.counts(), (1, 1));
        assert_eq!(shared.latest(), None);

        let mut s = shared.subscribe();
        assert_eq!(counted.counts(), (2, 1));
        assert_eq!(s.try_next(), None);
        hub.publish(2);
        assert_eq!(s.try_next(), Some(2));
    }

    #[test]
    fn completion_is_final() {
        let hub = EventHub::new();
        let (counted, source) = Counted::wrap(&hub);
        let shared = source.first().share();

        let mut a = shared.subscribe();
        hub.publish(7);
        hub.publish(8);
        assert_eq!(block_on(a.next()), Some(7));
        assert_eq!(block_on(a.next()), None);
        assert!(shared.is_completed());
        assert_eq!(counted.counts(), (1, 1));

        let mut b = shared.subscribe();
        assert_eq!(block_on(b.next()), Some(7));
        assert_eq!(block_on(b.next()), None);
        drop(a);
        drop(b);
        assert_eq!(counted.counts(), (1, 1));
    }

    #[test]
    fn completes_during_attach() {
        let shared = Source::<i32>::empty().share();
        let mut s = shared.subscribe();
        assert_eq!(block_on(s.next()), None);
        assert!(shared.is_completed());
        assert_eq!(shared.subscriber_count(), 0);
    }

    #[test]
    fn delivers_across_threads() {
        let hub = Arc::new(EventHub::new());
        let shared = hub.source().share();
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let s = shared.subscribe();
                std::thread::spawn(move || block_on(s.take(50).collect::<Vec<u64>>()))
            })
            .collect();
        {
            let hub = hub.clone();
            std::thread::spawn(move || for v in 0..50 {
                hub.publish(v);
            }).join().unwrap();
        }
        for c in consumers {
            assert_eq!(c.join().unwrap(), (0..50).collect::<Vec<_>>());
        }
    }

    #[test]
    fn teardown_finishes_before_reattach() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (stopping_tx, stopping_rx) = sync::channel::<()>();
        let (release_tx, release_rx) = sync::channel::<()>();
        let release_rx = Arc::new(Mutex::new(Some(release_rx)));
        let hub = EventHub::<i32>::new();
        let source = {
            let log = log.clone();
            let inner = hub.source();
            Source::new(move |sink| {
                log.lock().push("start");
                let upstream = inner.attach(sink);
                let log = log.clone();
                let stopping = stopping_tx.clone();
                let release = release_rx.clone();
                Cancellable::new(move || {
                    drop(upstream);
                    let _ = stopping.try_send(());
                    let release = release.lock().take();
                    if let Some(release) = release {
                        let _ = block_on(release.recv());
                    }
                    log.lock().push("stop");
                })
            })
        };
        let shared = source.share();

        let a = shared.subscribe();
        let stopper = std::thread::spawn(move || drop(a));
        block_on(stopping_rx.recv()).unwrap();

        let subscriber = {
            let shared = shared.clone();
            std::thread::spawn(move || shared.subscribe())
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        release_tx.try_send(()).unwrap();
        stopper.join().unwrap();
        let _b = subscriber.join().unwrap();

        assert_eq!(*log.lock(), vec!["start", "stop", "start"]);
        assert_eq!(shared.subscriber_count(), 1);
        assert_eq!(hub.listener_count(), 1);
    }
}
