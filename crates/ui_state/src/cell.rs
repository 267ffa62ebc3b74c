//! Single-writer, multi-reader observable cells backing every store.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Capabilities the stores need from a reactive container.
pub trait ReactiveCell<T> {
    fn read(&self) -> T;
    fn write(&self, value: T);
    /// Replaces the value with `f(current)`.
    fn update(&self, f: impl FnOnce(&T) -> T);
    /// Like `update`, but `None` keeps the value and wakes no subscriber.
    /// Returns whether the value was replaced.
    fn update_if(&self, f: impl FnOnce(&T) -> Option<T>) -> bool;
    fn subscribe(&self) -> watch::Receiver<T>;
}

/// [`ReactiveCell`] backed by a `tokio::sync::watch` channel. Writes never
/// block and succeed with or without subscribers.
#[derive(Debug)]
pub struct WatchCell<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for WatchCell<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> WatchCell<T> {
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Read-only view for consumers.
    pub fn readable(&self) -> Readable<T> {
        Readable {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ReactiveCell<T> for WatchCell<T> {
    fn read(&self) -> T {
        self.tx.borrow().clone()
    }

    fn write(&self, value: T) {
        self.tx.send_replace(value);
    }

    fn update(&self, f: impl FnOnce(&T) -> T) {
        self.tx.send_modify(|current| {
            let next = f(current);
            *current = next;
        });
    }

    fn update_if(&self, f: impl FnOnce(&T) -> Option<T>) -> bool {
        self.tx.send_if_modified(|current| match f(current) {
            Some(next) => {
                *current = next;
                true
            }
            None => false,
        })
    }

    fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

/// A handle that can observe a cell but not write to it.
#[derive(Debug, Clone)]
pub struct Readable<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> Readable<T> {
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }

    /// Stream yielding the current value, then every later change.
    pub fn changes(&self) -> WatchStream<T> {
        WatchStream::new(self.rx.clone())
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[test]
    fn readable_sees_latest_write() {
        let cell = WatchCell::new(1);
        let view = cell.readable();
        cell.write(2);
        cell.update(|n| n * 10);
        assert_eq!(view.get(), 20);
        assert_eq!(cell.read(), 20);
    }

    #[tokio::test]
    async fn subscribers_are_notified() {
        let cell = WatchCell::new(String::from("main"));
        let mut rx = cell.subscribe();
        rx.borrow_and_update();

        cell.write("bracket".to_string());

        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), "bracket");
    }

    #[test]
    fn declined_update_wakes_nobody() {
        let cell = WatchCell::new(3);
        let mut rx = cell.subscribe();
        rx.borrow_and_update();

        assert!(!cell.update_if(|_| None));
        assert!(!rx.has_changed().expect("sender alive"));

        assert!(cell.update_if(|n| Some(n + 1)));
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(cell.read(), 4);
    }

    #[tokio::test]
    async fn change_stream_starts_with_current_value() {
        let cell = WatchCell::new(false);
        let mut changes = cell.readable().changes();

        assert_eq!(changes.next().await, Some(false));
        cell.write(true);
        assert_eq!(changes.next().await, Some(true));
    }
}
