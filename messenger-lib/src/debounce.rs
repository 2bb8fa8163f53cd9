//! Last-call-wins scheduling for real-time validation

use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs only the most recent of a burst of calls, once input goes quiet.
///
/// Each [`call`](Self::call) cancels the pending one and schedules the new
/// closure after the quiet period. Typical use is validating a field after
/// the user stops typing. Validation itself is pure and never needs this.
///
/// Must be used from within a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// let debouncer = Debouncer::new(Duration::from_millis(500));
///
/// // on every input event
/// let form = form.clone();
/// debouncer.call(move || render(form.validate_field("login")));
/// ```
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Schedules `f`, cancelling any call still waiting.
    ///
    /// The returned handle completes when `f` has run or was superseded.
    pub fn call<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.replace_pending(Some(token.clone())) {
            previous.cancel();
        }

        let quiet = self.quiet;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(quiet) => f(),
            }
        })
    }

    /// Cancels the pending call, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self.replace_pending(None) {
            previous.cancel();
        }
    }

    fn replace_pending(&self, token: Option<CancellationToken>) -> Option<CancellationToken> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *pending, token)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
