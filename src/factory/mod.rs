//! Browser factory implementations.
//!
//! The [`BrowserManager`](crate::BrowserManager) never launches Chrome
//! directly; it asks a [`BrowserFactory`]. This keeps launch flags in one
//! place and lets tests substitute a factory that fails on demand.
//!
//! # Available Factories
//!
//! | Factory | Description |
//! |---------|-------------|
//! | [`ChromeBrowserFactory`] | Launches headless Chrome/Chromium |
//! | [`mock::MockBrowserFactory`] | For testing (feature-gated) |
//!
//! # Custom Factory
//!
//! ```rust,ignore
//! use html2pdf_paged::{BrowserFactory, Result};
//! use headless_chrome::Browser;
//!
//! struct RemoteChromeFactory {
//!     ws_url: String,
//! }
//!
//! impl BrowserFactory for RemoteChromeFactory {
//!     fn create(&self) -> Result<Browser> {
//!         Browser::connect(self.ws_url.clone())
//!             .map_err(|e| html2pdf_paged::ConversionError::BrowserLaunch(e.to_string()))
//!     }
//! }
//! ```

mod chrome;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chrome::{ChromeBrowserFactory, create_chrome_options};

use crate::error::Result;
use headless_chrome::Browser;

/// Trait for browser factory pattern.
///
/// # Thread Safety
///
/// Requires `Send + Sync` because the factory lives inside a
/// [`BrowserManager`](crate::BrowserManager) that is shared across threads.
pub trait BrowserFactory: Send + Sync {
    /// Launch a new browser instance.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::Configuration`](crate::ConversionError::Configuration) -
    ///   launch options could not be built
    /// - [`ConversionError::BrowserLaunch`](crate::ConversionError::BrowserLaunch) -
    ///   binary not found, launch failed, etc.
    fn create(&self) -> Result<Browser>;
}
