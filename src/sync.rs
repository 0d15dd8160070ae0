use async_std::channel;

pub type Sender<T> = channel::Sender<T>;
pub type Receiver<T> = channel::Receiver<T>;

/// Subscriber delivery channel. Unbounded so that publishing never blocks the driver queue.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    channel::unbounded()
}
