use std::fmt;
use std::sync::{Arc, Mutex};

/// Observer of the abstract "something changed, refresh yourself" event.
///
/// There is no payload: an observer that wants details re-reads the song.
/// Any `Fn() + Send + Sync` closure implements this automatically.
pub trait UpdateObserver: Send + Sync {
    fn refresh(&self);
}

impl<F: Fn() + Send + Sync> UpdateObserver for F {
    fn refresh(&self) {
        self()
    }
}

/// Fire-and-forget fan-out of the refresh event to registered observers.
///
/// Cloning shares the observer list. Delivery is synchronous on the
/// notifying thread with no acknowledgment and no ordering guarantee
/// across observers; `notify_all` may be called from any thread.
#[derive(Clone, Default)]
pub struct Notifier {
    observers: Arc<Mutex<Vec<Arc<dyn UpdateObserver>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn UpdateObserver>) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(observer);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn notify_all(&self) {
        // Snapshot under the lock so observers can subscribe re-entrantly.
        let snapshot: Vec<Arc<dyn UpdateObserver>> = match self.observers.lock() {
            Ok(observers) => observers.clone(),
            Err(_) => return,
        };
        for observer in snapshot {
            observer.refresh();
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_reaches_all_observers() {
        let notifier = Notifier::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let hits = first.clone();
        notifier.subscribe(Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }));
        let hits = second.clone();
        notifier.subscribe(Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }));

        notifier.notify_all();
        notifier.notify_all();

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_notify_without_observers_is_noop() {
        let notifier = Notifier::new();
        notifier.notify_all();
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn test_clone_shares_observers() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));

        let hits = count.clone();
        notifier.clone().subscribe(Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }));

        notifier.notify_all();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_notify_from_another_thread() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));

        let hits = count.clone();
        notifier.subscribe(Arc::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }));

        let remote = notifier.clone();
        std::thread::spawn(move || remote.notify_all())
            .join()
            .expect("join");

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
