use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Latest-wins delayed task runner.
///
/// Every `schedule` aborts whatever is still pending and issues a new
/// generation. Results carry their generation back so the owner can drop
/// anything that is no longer current, even if it slipped into a channel
/// before the abort landed.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Run `task` once `delay` has passed without another `schedule`
    pub fn schedule<F, Fut>(&mut self, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.abort_pending();
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task(generation).await;
        }));

        generation
    }

    /// Abort pending work and invalidate every generation issued so far
    pub fn cancel(&mut self) {
        self.abort_pending();
        self.generation += 1;
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn record(runs: &Arc<Mutex<Vec<u64>>>) -> impl FnOnce(u64) -> std::future::Ready<()> + Send + 'static {
        let sink = Arc::clone(runs);
        move |generation| {
            sink.lock().unwrap().push(generation);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_run_once() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(250));

        debouncer.schedule(record(&runs));
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(record(&runs));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let last = debouncer.schedule(record(&runs));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*runs.lock().unwrap(), vec![last]);
        assert_eq!(last, 3);
        assert!(debouncer.is_current(last));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_runs_before_delay() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(250));

        debouncer.schedule(record(&runs));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(runs.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_and_invalidates() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(250));

        let issued = debouncer.schedule(record(&runs));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(runs.lock().unwrap().is_empty());
        assert!(!debouncer.is_current(issued));
    }
}
