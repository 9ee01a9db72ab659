//! Save Debouncing
//!
//! Coalesces a burst of mutations into one deferred save. Scheduling
//! aborts any pending save task, so only the last state within the
//! window is persisted: the last scheduled save wins.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Run `action` after the debounce window, cancelling any previously
    /// scheduled action first. Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(mut pending) = self.pending.lock() else {
            return;
        };
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Drop the pending action without running it.
    pub fn cancel(&self) {
        let Ok(mut pending) = self.pending.lock() else {
            return;
        };
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(&Debouncer, u32)) {
        let runs: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let record = {
            let runs = Arc::clone(&runs);
            move |debouncer: &Debouncer, value: u32| {
                let runs = Arc::clone(&runs);
                debouncer.schedule(async move {
                    runs.lock().unwrap().push(value);
                });
            }
        };
        (runs, record)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_last_action() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let (runs, record) = recorder();

        record(&debouncer, 1);
        record(&debouncer, 2);
        record(&debouncer, 3);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*runs.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_actions_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let (runs, record) = recorder();

        record(&debouncer, 1);
        tokio::time::sleep(Duration::from_millis(600)).await;
        record(&debouncer, 2);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*runs.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_resets_the_window() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let (runs, record) = recorder();

        record(&debouncer, 1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        // Still inside the window: the pending save is replaced and the
        // clock starts over.
        record(&debouncer, 2);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(runs.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*runs.lock().unwrap(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_action() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let (runs, record) = recorder();

        record(&debouncer, 1);
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(runs.lock().unwrap().is_empty());
    }
}
