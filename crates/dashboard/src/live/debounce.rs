//! Debounced values.
//!
//! A [`Debouncer`] republishes the latest pushed value once no new value has
//! arrived for the configured quiet period. Every push restarts the timer,
//! so a burst of keystrokes settles into a single emission carrying the
//! last one. Dropping the debouncer cancels a pending emission.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Trailing-edge debouncer over a `watch` channel.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: watch::Sender<T>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a debouncer seeded with `initial`.
    ///
    /// Returns the debouncer and a receiver that observes settled values. The
    /// receiver starts at `initial` with no pending change.
    #[must_use]
    pub fn new(initial: T, delay: Duration) -> (Self, watch::Receiver<T>) {
        let (input, mut pending) = watch::channel(initial.clone());
        let (output, settled) = watch::channel(initial);

        let task = tokio::spawn(async move {
            // Wait for the first value of a burst.
            while pending.changed().await.is_ok() {
                loop {
                    tokio::select! {
                        changed = pending.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                        () = tokio::time::sleep(delay) => {
                            let value = pending.borrow_and_update().clone();
                            if output.send(value).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { input, task }, settled)
    }

    /// Record a new value and restart the quiet period.
    pub fn push(&self, value: T) {
        self.input.send_replace(value);
    }

    /// The most recently pushed value, settled or not.
    #[must_use]
    pub fn latest(&self) -> T {
        self.input.borrow().clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::time::{Instant, timeout};

    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_last_value_once() {
        let (debouncer, mut settled) = Debouncer::new(String::new(), DELAY);
        let start = Instant::now();

        for value in ["l", "la", "lam", "lamp"] {
            debouncer.push(value.to_string());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        settled.changed().await.unwrap();
        assert_eq!(*settled.borrow_and_update(), "lamp");
        // Last push at 300ms, so nothing before 800ms.
        assert!(start.elapsed() >= Duration::from_millis(800));

        // No further emission without new input.
        assert!(timeout(DELAY * 4, settled.changed()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_quiet_period_emits() {
        let (debouncer, mut settled) = Debouncer::new(0_u32, DELAY);

        debouncer.push(1);
        settled.changed().await.unwrap();
        assert_eq!(*settled.borrow_and_update(), 1);

        debouncer.push(2);
        settled.changed().await.unwrap();
        assert_eq!(*settled.borrow_and_update(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_value_is_not_emitted() {
        let (_debouncer, mut settled) = Debouncer::new(7_u32, DELAY);
        assert_eq!(*settled.borrow(), 7);
        assert!(timeout(DELAY * 4, settled.changed()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_value() {
        let (debouncer, mut settled) = Debouncer::new(String::new(), DELAY);
        debouncer.push("pending".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(debouncer);

        // The task is gone, so the channel closes without emitting.
        assert!(settled.changed().await.is_err());
        assert_eq!(*settled.borrow(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_tracks_unsettled_input() {
        let (debouncer, settled) = Debouncer::new(0_u32, DELAY);
        debouncer.push(3);
        assert_eq!(debouncer.latest(), 3);
        assert_eq!(*settled.borrow(), 0);
    }
}
