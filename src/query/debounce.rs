//! Keystroke debouncing for the search box.
//!
//! Raw input is pushed as it arrives; only once the text has been stable for
//! [`SEARCH_DEBOUNCE`] does [`Debouncer::poll`] release it as the new search
//! value. Callers supply the clock so tests don't sleep.

use std::time::{Duration, Instant};

/// Quiet period before typed text becomes the active search.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
    settled: String,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            settled: String::new(),
        }
    }

    /// Starts from an already active value, e.g. the `q` parameter of the
    /// current address.
    #[must_use]
    pub fn with_settled(mut self, text: impl Into<String>) -> Self {
        self.settled = text.into();
        self
    }

    /// Records raw input at `now`, restarting the quiet period.
    pub fn push(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now + self.quiet));
    }

    /// When the pending input will settle, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Releases pending input whose quiet period has elapsed by `now`.
    ///
    /// Returns `None` while input is still settling, and also when the
    /// settled text equals the active value.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((_, at)) if *at <= now);
        if !due {
            return None;
        }
        let (text, _) = self.pending.take()?;
        if text == self.settled {
            return None;
        }
        tracing::debug!(search = %text, "search input settled");
        self.settled.clone_from(&text);
        Some(text)
    }

    /// The last value released by [`poll`](Self::poll).
    #[must_use]
    pub fn settled(&self) -> &str {
        &self.settled
    }
}
