use super::Source;

/// Value concerning a specific target, identified by its key.
pub trait Correlated {
    type Key: PartialEq;

    fn key(&self) -> Self::Key;
}

/// Builds a one-shot request/response exchange out of independent success and failure sources.
///
/// Only values whose key equals `key` are considered. The first of them resolves the exchange,
/// failures mapped through `into_error`, and the resulting source completes right after it.
pub fn first_outcome<T, F, E>(
    key: T::Key,
    success: Source<T>,
    failure: Source<F>,
    into_error: impl Fn(F) -> E + Send + Sync + 'static,
) -> Source<Result<T, E>>
where
    T: Correlated + Clone + Send + 'static,
    T::Key: Clone + Send + Sync + 'static,
    F: Correlated<Key = T::Key> + Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let success_key = key.clone();
    success
        .filter(move |v| v.key() == success_key)
        .map(Ok)
        .merge(failure
            .filter(move |v| v.key() == key)
            .map(move |v| Err(into_error(v))))
        .first()
}

#[cfg(test)]
mod test {
    use super::*;
    use async_std::prelude::*;
    use async_std::task::block_on;

    use crate::stream::EventHub;

    #[derive(Clone, Debug, PartialEq)]
    struct Ev(u32, &'static str);

    impl Correlated for Ev {
        type Key = u32;

        fn key(&self) -> u32 {
            self.0
        }
    }

    fn hubs() -> (EventHub<Ev>, EventHub<Ev>) {
        (EventHub::new(), EventHub::new())
    }

    fn outcome(key: u32, ok: &EventHub<Ev>, fail: &EventHub<Ev>) -> Source<Result<Ev, String>> {
        first_outcome(key, ok.source(), fail.source(), |e: Ev| e.1.to_owned())
    }

    #[test]
    fn ignores_other_keys() {
        let (ok, fail) = hubs();
        let mut s = outcome(1, &ok, &fail).subscribe();
        ok.publish(Ev(2, "a"));
        fail.publish(Ev(3, "b"));
        assert_eq!(s.try_next(), None);
        ok.publish(Ev(1, "c"));
        assert_eq!(block_on(s.next()), Some(Ok(Ev(1, "c"))));
        assert_eq!(block_on(s.next()), None);
    }

    #[test]
    fn failure_maps_to_error() {
        let (ok, fail) = hubs();
        let mut s = outcome(1, &ok, &fail).subscribe();
        fail.publish(Ev(1, "boom"));
        ok.publish(Ev(1, "late"));
        assert_eq!(block_on(s.next()), Some(Err("boom".to_owned())));
        assert_eq!(block_on(s.next()), None);
    }

    #[test]
    fn resolves_once() {
        let (ok, fail) = hubs();
        let mut s = outcome(5, &ok, &fail).subscribe();
        ok.publish(Ev(5, "first"));
        fail.publish(Ev(5, "second"));
        ok.publish(Ev(5, "third"));
        let all: Vec<_> = block_on(s.by_ref().collect::<Vec<_>>());
        assert_eq!(all, vec![Ok(Ev(5, "first"))]);
    }
}
