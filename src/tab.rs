//! RAII guard for browser tabs.
//!
//! Every conversion opens exactly one tab. [`TabGuard`] closes it when the
//! guard goes out of scope, so the tab is released on success, on every
//! error path and during unwinding alike.
//!
//! # Deref Behavior
//!
//! `TabGuard` implements [`Deref<Target = Tab>`](std::ops::Deref):
//!
//! ```rust,ignore
//! let tab = TabGuard::open(&browser)?;
//!
//! tab.navigate_to("about:blank")?;        // Tab::navigate_to
//! tab.evaluate("document.title", false)?; // Tab::evaluate
//!
//! // Tab closed here
//! ```

use std::ops::Deref;
use std::sync::Arc;

use headless_chrome::{Browser, Tab};

use crate::error::{ConversionError, Result};

/// Owns one browser tab for the duration of a conversion.
pub struct TabGuard {
    tab: Arc<Tab>,
}

impl TabGuard {
    /// Open a new tab in `browser`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::TabCreationFailed`] if the browser refuses
    /// to create a target (typically because the process has died).
    pub fn open(browser: &Browser) -> Result<Self> {
        log::trace!("Creating new browser tab");
        let tab = browser.new_tab().map_err(|e| {
            log::error!("❌ Failed to create tab: {}", e);
            ConversionError::TabCreationFailed(e.to_string())
        })?;

        Ok(Self { tab })
    }

    /// Shared handle to the underlying tab.
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl Deref for TabGuard {
    type Target = Tab;

    fn deref(&self) -> &Self::Target {
        &self.tab
    }
}

impl Drop for TabGuard {
    /// Best-effort close; the PDF (or the error) is already decided by now.
    fn drop(&mut self) {
        log::trace!("Closing browser tab");

        if let Err(e) = self.tab.close(true) {
            log::warn!("⚠️ Failed to close tab (the browser reclaims it on exit): {}", e);
        } else {
            log::trace!("Tab closed");
        }
    }
}

impl std::fmt::Debug for TabGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabGuard")
            .field("target_id", self.tab.get_target_id())
            .finish()
    }
}
