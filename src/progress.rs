//! Progress reporting: the observer trait and the synthetic heartbeat.
//!
//! Inject an [`Arc<dyn ProgressObserver>`] via
//! [`crate::config::ConversionConfigBuilder::progress`] to receive the
//! percentage ticks a conversion emits.
//!
//! # The heartbeat is synthetic
//!
//! The percentage is a UX signal, not a measurement: eleven fixed ticks
//! (0, 10, …, 100) regardless of how long the conversion really takes.
//! Observers see monotonically increasing percentages followed by a
//! completion message. The ticker runs on a background tokio task while
//! the real operation proceeds, so the conversion itself is never
//! artificially slowed: [`Heartbeat`] climbs to 90% on a timer and only
//! reports 100% when the operation actually finishes. An operation that
//! fails mid-flight simply stops ticking.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Called by the pipeline as the synthetic progress counter advances.
///
/// Implementations must be `Send + Sync` (ticks come from a background
/// task). Both methods have default no-op implementations so callers only
/// override what they care about.
pub trait ProgressObserver: Send + Sync {
    /// A progress tick. `percent` is monotonically increasing within one
    /// conversion and ends at 100 exactly when the operation succeeded.
    fn on_tick(&self, percent: u8, message: &str) {
        let _ = (percent, message);
    }

    /// Called once, after the 100% tick, when the operation succeeded.
    fn on_complete(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}

/// Convenience alias matching the type stored in
/// [`crate::config::ConversionConfig`].
pub type Progress = Arc<dyn ProgressObserver>;

/// Fixed-step background ticker for one conversion operation.
///
/// Emits 0% immediately, then one tick per interval up to 90%, and holds
/// there until [`Heartbeat::finish`] emits the 100% tick plus the
/// completion message. Dropping the heartbeat without finishing (the error
/// path) stops the ticker without ever reporting completion.
pub struct Heartbeat {
    observer: Progress,
    label: String,
    ticker: JoinHandle<()>,
}

impl Heartbeat {
    /// Start ticking `label… N%` against `observer`.
    pub fn start(observer: Progress, label: impl Into<String>, interval: Duration) -> Self {
        let label = label.into();
        observer.on_tick(0, &format!("{label}... 0%"));

        let ticker = tokio::spawn({
            let observer = Arc::clone(&observer);
            let label = label.clone();
            async move {
                let mut percent: u8 = 0;
                while percent < 90 {
                    tokio::time::sleep(interval).await;
                    percent += 10;
                    observer.on_tick(percent, &format!("{label}... {percent}%"));
                }
            }
        });

        Self {
            observer,
            label,
            ticker,
        }
    }

    /// Stop the ticker, emit the 100% tick, and report completion.
    pub fn finish(self, message: &str) {
        self.ticker.abort();
        self.observer
            .on_tick(100, &format!("{}... 100%", self.label));
        self.observer.on_complete(message);
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}
