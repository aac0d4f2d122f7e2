//! Fire-and-forget visual timers.

use std::time::Duration;

/// Runs `task` after `delay` on the current tokio runtime.
///
/// Timers carry no cancellation. Outside a runtime the task is skipped.
pub(crate) fn schedule<F>(label: &'static str, delay: Duration, task: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                task();
            });
        }
        Err(_) => {
            tracing::debug!("[Timer] No async runtime, skipping {} timer", label);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn test_without_runtime_task_is_skipped() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        schedule("test", Duration::ZERO, move || flag.store(true, Ordering::SeqCst));
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        schedule("test", Duration::from_millis(500), move || {
            flag.store(true, Ordering::SeqCst)
        });

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(!fired.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
