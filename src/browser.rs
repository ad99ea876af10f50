//! Lazily launched, shared browser instance.
//!
//! Launching Chrome costs hundreds of milliseconds, so every conversion
//! reuses one long-lived browser. [`BrowserManager`] owns that browser:
//!
//! - the first [`get()`](BrowserManager::get) launches it through a
//!   [`BrowserFactory`];
//! - later calls return the same `Arc<Browser>`;
//! - concurrent first callers wait on the slot lock instead of launching
//!   a second process;
//! - a failed launch leaves the slot empty so the next caller retries;
//! - a cached browser that no longer answers is replaced;
//! - [`shutdown()`](BrowserManager::shutdown) terminates the process.
//!
//! # Architecture
//!
//! ```text
//! BrowserManager
//!   ├─ factory: Box<dyn BrowserFactory>
//!   └─ slot: Mutex<Slot>
//!        ├─ browser: Option<Arc<Browser>>
//!        ├─ launches: u64
//!        └─ shut_down: bool
//! ```
//!
//! The lock is held across the launch (that is what serializes first
//! callers) and released before the caller opens a tab, so rendering in
//! different conversions still runs in parallel. The reuse health check
//! runs outside the lock; a stalled DevTools connection only delays the
//! caller that hit it.

use std::sync::{Arc, Mutex, MutexGuard};

use headless_chrome::Browser;

use crate::error::{ConversionError, Result};
use crate::factory::BrowserFactory;

struct Slot {
    browser: Option<Arc<Browser>>,
    launches: u64,
    shut_down: bool,
}

/// Owner of the shared browser process.
///
/// # Example
///
/// ```rust,ignore
/// use html2pdf_paged::{BrowserManager, ChromeBrowserFactory};
///
/// let manager = BrowserManager::new(Box::new(ChromeBrowserFactory::with_defaults()));
///
/// let browser = manager.get()?;      // launches Chrome
/// let again = manager.get()?;        // same process
/// assert!(std::sync::Arc::ptr_eq(&browser, &again));
///
/// manager.shutdown();
/// ```
pub struct BrowserManager {
    factory: Box<dyn BrowserFactory>,
    slot: Mutex<Slot>,
}

impl BrowserManager {
    /// Create a manager; no browser is launched until the first `get()`.
    pub fn new(factory: Box<dyn BrowserFactory>) -> Self {
        Self {
            factory,
            slot: Mutex::new(Slot {
                browser: None,
                launches: 0,
                shut_down: false,
            }),
        }
    }

    /// Return the running browser, launching it on first use.
    ///
    /// A cached browser is checked with a cheap DevTools round trip
    /// (`Browser.getVersion`); if the process died or the connection timed
    /// out it is dropped and a fresh one launched.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::ManagerShutDown`] after [`shutdown()`](Self::shutdown)
    /// - [`ConversionError::BrowserLaunch`] / [`ConversionError::Configuration`]
    ///   from the factory. The slot stays empty, so the next call retries.
    pub fn get(&self) -> Result<Arc<Browser>> {
        let cached = {
            let slot = self.lock_slot();
            if slot.shut_down {
                return Err(ConversionError::ManagerShutDown);
            }
            slot.browser.clone()
        };

        if let Some(browser) = cached {
            match browser.get_version() {
                Ok(_) => {
                    log::trace!("♻️ Reusing browser");
                    return Ok(browser);
                }
                Err(e) => {
                    log::warn!("⚠️ Cached browser is unresponsive, relaunching: {}", e);
                    self.discard(&browser);
                }
            }
        }

        let mut slot = self.lock_slot();
        if slot.shut_down {
            return Err(ConversionError::ManagerShutDown);
        }
        // Another caller may have launched while the lock was released.
        if let Some(browser) = slot.browser.clone() {
            return Ok(browser);
        }

        log::debug!("🚀 No running browser, launching one");
        let browser = Arc::new(self.factory.create()?);
        slot.launches += 1;
        slot.browser = Some(Arc::clone(&browser));

        log::info!("✅ Browser launched (launch #{})", slot.launches);
        Ok(browser)
    }

    /// Drop the cached browser so the next `get()` launches a new one.
    ///
    /// Conversions holding an `Arc<Browser>` keep the old process alive
    /// until they finish.
    pub fn invalidate(&self) {
        let mut slot = self.lock_slot();
        if slot.browser.take().is_some() {
            log::warn!("🗑️ Browser (launch #{}) invalidated", slot.launches);
        }
    }

    /// Drop the cached browser only if it is still `browser`.
    ///
    /// A conversion that found its browser dead must not discard a
    /// replacement another thread has launched in the meantime.
    pub fn discard(&self, browser: &Arc<Browser>) {
        let mut slot = self.lock_slot();
        if slot.browser.as_ref().is_some_and(|current| Arc::ptr_eq(current, browser)) {
            slot.browser = None;
            log::warn!("🗑️ Browser (launch #{}) discarded after failure", slot.launches);
        }
    }

    /// Shut the manager down.
    ///
    /// Drops the cached browser (its process is killed once the last
    /// `Arc` is gone) and rejects every later `get()`. Idempotent.
    pub fn shutdown(&self) {
        let mut slot = self.lock_slot();
        if slot.shut_down {
            return;
        }

        slot.shut_down = true;
        if slot.browser.take().is_some() {
            log::info!("🛑 Browser manager shut down, browser released");
        } else {
            log::info!("🛑 Browser manager shut down (no browser was running)");
        }
    }

    /// Whether a browser is currently cached.
    pub fn is_running(&self) -> bool {
        self.lock_slot().browser.is_some()
    }

    /// Whether [`shutdown()`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.lock_slot().shut_down
    }

    /// Number of successful launches so far.
    pub fn launch_count(&self) -> u64 {
        self.lock_slot().launches
    }

    // Slot fields stay individually valid across a panic, so a poisoned
    // lock is safe to keep using.
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| {
            log::warn!("⚠️ Browser slot lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Drop for BrowserManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for BrowserManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock_slot();
        f.debug_struct("BrowserManager")
            .field("running", &slot.browser.is_some())
            .field("launches", &slot.launches)
            .field("shut_down", &slot.shut_down)
            .finish()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::mock::MockBrowserFactory;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[test]
    fn test_failed_launch_leaves_slot_empty_and_retries() {
        let factory = MockBrowserFactory::always_fails("no chrome");
        let counter = factory.counter();
        let manager = BrowserManager::new(Box::new(factory));

        assert!(matches!(manager.get(), Err(ConversionError::BrowserLaunch(_))));
        assert!(!manager.is_running());
        assert!(matches!(manager.get(), Err(ConversionError::BrowserLaunch(_))));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(manager.launch_count(), 0);
    }

    #[test]
    fn test_get_after_shutdown_is_rejected_without_launch() {
        let factory = MockBrowserFactory::always_fails("no chrome");
        let counter = factory.counter();
        let manager = BrowserManager::new(Box::new(factory));

        manager.shutdown();
        manager.shutdown();

        assert!(manager.is_shut_down());
        assert!(matches!(manager.get(), Err(ConversionError::ManagerShutDown)));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_first_calls_never_launch_in_parallel() {
        let factory =
            MockBrowserFactory::always_fails("slow").with_launch_delay(Duration::from_millis(30));
        let peak = factory.concurrency_peak();
        let counter = factory.counter();
        let manager = Arc::new(BrowserManager::new(Box::new(factory)));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || manager.get().map(|_| ()))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_err());
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }

    /// A shutdown issued during a launch applies once the launch returns.
    #[test]
    fn test_shutdown_waits_for_pending_launch() {
        let factory =
            MockBrowserFactory::always_fails("slow").with_launch_delay(Duration::from_millis(100));
        let counter = factory.counter();
        let manager = Arc::new(BrowserManager::new(Box::new(factory)));

        let launching = {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || manager.get().map(|_| ()))
        };
        while counter.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }

        manager.shutdown();

        assert!(matches!(launching.join().unwrap(), Err(ConversionError::BrowserLaunch(_))));
        assert!(matches!(manager.get(), Err(ConversionError::ManagerShutDown)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!manager.is_running());
    }

    #[test]
    fn test_invalidate_without_browser_is_noop() {
        let manager = BrowserManager::new(Box::new(MockBrowserFactory::always_fails("x")));
        manager.invalidate();
        assert!(!manager.is_running());
        assert!(!manager.is_shut_down());
    }

    #[test]
    fn test_debug_reports_state() {
        let manager = BrowserManager::new(Box::new(MockBrowserFactory::always_fails("x")));
        let debug = format!("{:?}", manager);
        assert!(debug.contains("running: false"));
        assert!(debug.contains("shut_down: false"));
    }
}
