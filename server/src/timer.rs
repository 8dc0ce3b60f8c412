//! Cancellable one-shot deactivation timers.

use std::time::Duration;
use tokio::task::AbortHandle;

/// Handle to a scheduled deactivation. Dropping it cancels the task.
#[derive(Debug)]
pub struct DeactivationTimer {
    epoch: u64,
    handle: AbortHandle,
}

impl DeactivationTimer {
    /// Run `on_expire` once after `delay` on the current tokio runtime.
    ///
    /// `epoch` identifies the activation the timer was armed for.
    pub fn schedule<F>(delay: Duration, epoch: u64, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire();
        });
        Self { epoch, handle: task.abort_handle() }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for DeactivationTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let timer = DeactivationTimer::schedule(Duration::from_secs(5), 1, move || {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert!(!timer.is_finished());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(timer.is_finished());
        assert_eq!(timer.epoch(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let timer = DeactivationTimer::schedule(Duration::from_secs(5), 1, move || {
            flag.store(true, Ordering::SeqCst);
        });

        drop(timer);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
