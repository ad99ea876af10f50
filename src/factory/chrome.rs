//! Chrome/Chromium browser factory implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_paged::ChromeBrowserFactory;
//!
//! // Auto-detect Chrome installation
//! let factory = ChromeBrowserFactory::with_defaults();
//!
//! // Or specify custom path
//! let factory = ChromeBrowserFactory::with_path("/usr/bin/google-chrome".to_string());
//! ```

use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};

use super::BrowserFactory;
use crate::config::ConverterConfig;
use crate::error::{ConversionError, Result};

/// How long an idle browser keeps its DevTools connection open.
///
/// The managed browser is long-lived; `headless_chrome` drops the connection
/// after 30 seconds without events by default.
pub const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(3600);

/// Factory for launching headless Chrome/Chromium instances.
///
/// Every browser it creates runs headless with the sandbox disabled
/// (`--no-sandbox`, `--disable-setuid-sandbox`), which is what lets the
/// converter run as root inside containers.
pub struct ChromeBrowserFactory {
    /// Generates launch options for each browser.
    launch_options_fn: Box<dyn Fn() -> Result<LaunchOptions<'static>> + Send + Sync>,
}

impl ChromeBrowserFactory {
    /// Create factory with a custom launch options function.
    ///
    /// ```rust,ignore
    /// use html2pdf_paged::{ChromeBrowserFactory, create_chrome_options, ConversionError};
    ///
    /// let factory = ChromeBrowserFactory::new(|| {
    ///     create_chrome_options(Some("/custom/path"))
    ///         .map_err(|e| ConversionError::Configuration(e.to_string()))
    /// });
    /// ```
    pub fn new<F>(launch_options_fn: F) -> Self
    where
        F: Fn() -> Result<LaunchOptions<'static>> + Send + Sync + 'static,
    {
        Self {
            launch_options_fn: Box::new(launch_options_fn),
        }
    }

    /// Create factory with auto-detected Chrome path.
    ///
    /// `headless_chrome` searches the usual install locations on Linux,
    /// macOS and Windows (and downloads a Chromium build via the `fetch`
    /// feature when nothing is installed).
    pub fn with_defaults() -> Self {
        log::debug!("🏭 Creating ChromeBrowserFactory with auto-detect");
        Self::new(|| {
            create_chrome_options(None).map_err(|e| ConversionError::Configuration(e.to_string()))
        })
    }

    /// Create factory with custom Chrome binary path.
    pub fn with_path(chrome_path: String) -> Self {
        log::debug!("🏭 Creating ChromeBrowserFactory with custom path: {}", chrome_path);
        Self::new(move || {
            create_chrome_options(Some(&chrome_path))
                .map_err(|e| ConversionError::Configuration(e.to_string()))
        })
    }

    /// Create factory honoring [`ConverterConfig::chrome_path`].
    pub fn from_config(config: &ConverterConfig) -> Self {
        match &config.chrome_path {
            Some(path) => Self::with_path(path.clone()),
            None => Self::with_defaults(),
        }
    }
}

impl BrowserFactory for ChromeBrowserFactory {
    /// Launch a new Chrome instance.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::Configuration`] if launch options generation fails.
    /// * [`ConversionError::BrowserLaunch`] if Chrome fails to launch.
    fn create(&self) -> Result<Browser> {
        log::trace!("🏭 ChromeBrowserFactory::create() called");

        let options = (self.launch_options_fn)()?;

        log::debug!("🚀 Launching Chrome browser...");
        Browser::new(options).map_err(|e| {
            log::error!("❌ Chrome launch failed: {}", e);
            ConversionError::BrowserLaunch(e.to_string())
        })
    }
}

impl std::fmt::Debug for ChromeBrowserFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeBrowserFactory").finish_non_exhaustive()
    }
}

/// Create Chrome launch options with optional custom path.
///
/// # Chrome Flags Applied
///
/// ## Sandbox
/// - `--no-sandbox`
/// - `--disable-setuid-sandbox`
///
/// ## Memory and Stability
/// - `--disable-dev-shm-usage` - Use /tmp instead of /dev/shm (container-friendly)
/// - `--disable-crash-reporter`
/// - `--disable-extensions`, `--disable-sync`, `--disable-default-apps`
///
/// ## Rendering
/// - `--hide-scrollbars` - Keep scrollbars out of printed output
/// - `--font-render-hinting=none` - Stable glyph metrics in PDFs
///
/// ## Background Work
/// - `--disable-background-timer-throttling`
/// - `--disable-backgrounding-occluded-windows`
/// - `--disable-renderer-backgrounding`
///
/// Canvas and WebGL acceleration flags are left at Chrome's defaults so
/// chart libraries that draw into `<canvas>` still render.
pub fn create_chrome_options(
    chrome_path: Option<&str>,
) -> std::result::Result<LaunchOptions<'static>, Box<dyn std::error::Error + Send + Sync>> {
    match chrome_path {
        Some(path) => log::debug!("🔧 Creating Chrome options with custom path: {}", path),
        None => log::debug!("🔧 Creating Chrome options (auto-detect browser)"),
    }

    let mut builder = LaunchOptions::default_builder();

    if let Some(path) = chrome_path {
        builder.path(Some(path.to_string().into()));
    }

    builder
        .headless(true)
        .sandbox(false)
        .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
        .args(vec![
            "--no-sandbox".as_ref(),
            "--disable-setuid-sandbox".as_ref(),
            "--disable-dev-shm-usage".as_ref(),
            "--disable-crash-reporter".as_ref(),
            "--disable-extensions".as_ref(),
            "--disable-sync".as_ref(),
            "--disable-default-apps".as_ref(),
            "--hide-scrollbars".as_ref(),
            "--font-render-hinting=none".as_ref(),
            "--disable-background-timer-throttling".as_ref(),
            "--disable-backgrounding-occluded-windows".as_ref(),
            "--disable-renderer-backgrounding".as_ref(),
        ])
        .build()
        .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
            let path_msg = chrome_path.unwrap_or("auto-detect");
            log::error!("❌ Failed to build Chrome launch options (path: {}): {}", path_msg, e);
            e.into()
        })
}

// ============================================================================
// Unit Tests
// ============================================================================
