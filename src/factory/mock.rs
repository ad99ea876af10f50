//! Mock browser factory for testing.
//!
//! Lets tests drive [`BrowserManager`](crate::BrowserManager) and
//! [`HtmlToPdfConverter`](crate::HtmlToPdfConverter) through their failure
//! paths without Chrome installed.
//!
//! # Feature Flag
//!
//! Available when the `test-utils` feature is enabled, or under `#[cfg(test)]`.
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_paged::factory::mock::MockBrowserFactory;
//! use std::time::Duration;
//!
//! let factory = MockBrowserFactory::always_fails("Chrome not installed")
//!     .with_launch_delay(Duration::from_millis(20));
//! let counter = factory.counter();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use headless_chrome::Browser;

use super::BrowserFactory;
use crate::error::{ConversionError, Result};

/// Mock browser factory for testing without Chrome.
///
/// Every `create` call fails with the configured message, optionally after
/// sleeping to widen race windows. It counts every creation attempt and
/// records the highest number of `create` calls that were ever in flight at
/// the same time.
pub struct MockBrowserFactory {
    /// Error message returned by `create`.
    error_message: String,

    /// Creation attempts so far.
    creation_count: Arc<AtomicUsize>,

    /// Simulated launch latency.
    launch_delay: Duration,

    /// `create` calls currently running.
    in_flight: Arc<AtomicUsize>,

    /// Highest value `in_flight` ever reached.
    max_in_flight: Arc<AtomicUsize>,
}

impl MockBrowserFactory {
    /// Create a mock factory that always fails with the given message.
    ///
    /// ```rust,ignore
    /// let factory = MockBrowserFactory::always_fails("Chrome not installed");
    /// assert!(factory.create().is_err());
    /// ```
    pub fn always_fails<S: Into<String>>(message: S) -> Self {
        Self {
            error_message: message.into(),
            creation_count: Arc::new(AtomicUsize::new(0)),
            launch_delay: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep for `delay` inside every `create` call.
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = delay;
        self
    }

    /// Number of creation attempts made by this factory.
    pub fn creation_count(&self) -> usize {
        self.creation_count.load(Ordering::SeqCst)
    }

    /// Shared creation counter, still readable after the factory is moved
    /// into a manager.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.creation_count)
    }

    /// Shared high-water mark of concurrent `create` calls.
    ///
    /// ```rust,ignore
    /// let factory = MockBrowserFactory::always_fails("x");
    /// let peak = factory.concurrency_peak();
    /// let manager = BrowserManager::new(Box::new(factory));
    /// // ... hammer manager.get() from several threads ...
    /// assert_eq!(peak.load(Ordering::SeqCst), 1);
    /// ```
    pub fn concurrency_peak(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.max_in_flight)
    }
}

impl BrowserFactory for MockBrowserFactory {
    /// Return the configured error after the configured delay.
    ///
    /// # Errors
    ///
    /// Always returns [`ConversionError::BrowserLaunch`].
    fn create(&self) -> Result<Browser> {
        let attempt = self.creation_count.fetch_add(1, Ordering::SeqCst) + 1;

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if !self.launch_delay.is_zero() {
            std::thread::sleep(self.launch_delay);
        }
        log::debug!("MockBrowserFactory: Failing creation attempt #{}", attempt);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Err(ConversionError::BrowserLaunch(self.error_message.clone()))
    }
}

impl std::fmt::Debug for MockBrowserFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBrowserFactory")
            .field("error_message", &self.error_message)
            .field("creation_count", &self.creation_count.load(Ordering::SeqCst))
            .field("launch_delay", &self.launch_delay)
            .finish()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_factory_always_fails() {
        let factory = MockBrowserFactory::always_fails("Test error");

        match factory.create() {
            Err(ConversionError::BrowserLaunch(msg)) => assert_eq!(msg, "Test error"),
            other => panic!("Expected BrowserLaunch error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_mock_factory_creation_count() {
        let factory = MockBrowserFactory::always_fails("Test");
        let counter = factory.counter();

        assert_eq!(factory.creation_count(), 0);
        let _ = factory.create();
        let _ = factory.create();
        assert_eq!(factory.creation_count(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mock_factory_delay_still_fails() {
        let factory = MockBrowserFactory::always_fails("Slow")
            .with_launch_delay(Duration::from_millis(20));

        let start = std::time::Instant::now();
        let result = factory.create();

        assert!(matches!(result, Err(ConversionError::BrowserLaunch(ref m)) if m == "Slow"));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_mock_factory_tracks_concurrency() {
        let factory = Arc::new(
            MockBrowserFactory::always_fails("busy").with_launch_delay(Duration::from_millis(50)),
        );
        let peak = factory.concurrency_peak();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let factory = Arc::clone(&factory);
                std::thread::spawn(move || {
                    let _ = factory.create();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Unguarded calls overlap freely.
        assert!(peak.load(Ordering::SeqCst) > 1);
        assert_eq!(factory.creation_count(), 4);
    }

    #[test]
    fn test_mock_factory_debug() {
        let factory = MockBrowserFactory::always_fails("Test");
        let debug_str = format!("{:?}", factory);

        assert!(debug_str.contains("MockBrowserFactory"));
        assert!(debug_str.contains(r#"error_message: "Test""#));
    }
}
