//! Configuration for the conversion pipeline.
//!
//! This module provides [`ConverterConfig`] and [`ConverterConfigBuilder`]
//! for configuring the page-region markers, asset resolution root, Chrome
//! binary path and the load/settle timings of the render stage.
//!
//! The print layout itself (A4, fixed margins, background graphics) is not
//! configurable; see [`build_print_options`](crate::render::build_print_options).
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use html2pdf_paged::ConverterConfigBuilder;
//!
//! let config = ConverterConfigBuilder::new()
//!     .content_load_timeout(Duration::from_secs(45))
//!     .asset_root("/srv/templates")
//!     .build()
//!     .expect("Invalid configuration");
//!
//! assert_eq!(config.content_load_timeout, Duration::from_secs(45));
//! ```
//!
//! # Environment Configuration
//!
//! When the `env-config` feature is enabled, configuration can be loaded
//! from environment variables and an optional `app.env` file:
//!
//! ```rust,ignore
//! use html2pdf_paged::config::env::from_env;
//!
//! let config = from_env()?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Default selector for the element promoted to the page header.
pub const DEFAULT_PAGE_START_SELECTOR: &str = ".page_start";

/// Default selector for the element promoted to the page footer.
pub const DEFAULT_PAGE_END_SELECTOR: &str = ".page_end";

/// Configuration for the conversion pipeline.
///
/// # Fields Overview
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `chrome_path` | auto | Chrome binary path |
/// | `page_start_selector` | `.page_start` | Header marker |
/// | `page_end_selector` | `.page_end` | Footer marker |
/// | `asset_root` | cwd | Base directory for relative assets |
/// | `content_load_timeout` | 30s | Load deadline |
/// | `dynamic_settle_delay` | 3s | Settle time with canvas/svg |
/// | `static_settle_delay` | 500ms | Settle time otherwise |
/// | `ready_poll_interval` | 200ms | `window.isPageDone` polling |
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Custom Chrome/Chromium binary. `None` lets `headless_chrome` auto-detect.
    pub chrome_path: Option<String>,

    /// CSS selector marking the header region.
    pub page_start_selector: String,

    /// CSS selector marking the footer region.
    pub page_end_selector: String,

    /// Directory relative asset references are resolved against.
    ///
    /// `None` resolves against the process's current working directory at
    /// the time of each conversion.
    pub asset_root: Option<PathBuf>,

    /// Maximum time for the document to reach the load state.
    pub content_load_timeout: Duration,

    /// Settle window when the page contains `canvas` or `svg` elements.
    pub dynamic_settle_delay: Duration,

    /// Settle window for purely static pages.
    pub static_settle_delay: Duration,

    /// How often the settle loop checks `window.isPageDone`.
    pub ready_poll_interval: Duration,
}

impl Default for ConverterConfig {
    /// ```rust
    /// use html2pdf_paged::ConverterConfig;
    /// use std::time::Duration;
    ///
    /// let config = ConverterConfig::default();
    /// assert_eq!(config.page_start_selector, ".page_start");
    /// assert_eq!(config.content_load_timeout, Duration::from_secs(30));
    /// assert_eq!(config.dynamic_settle_delay, Duration::from_secs(3));
    /// assert_eq!(config.static_settle_delay, Duration::from_millis(500));
    /// ```
    fn default() -> Self {
        Self {
            chrome_path: None,
            page_start_selector: DEFAULT_PAGE_START_SELECTOR.to_string(),
            page_end_selector: DEFAULT_PAGE_END_SELECTOR.to_string(),
            asset_root: None,
            content_load_timeout: Duration::from_secs(30),
            dynamic_settle_delay: Duration::from_secs(3),
            static_settle_delay: Duration::from_millis(500),
            ready_poll_interval: Duration::from_millis(200),
        }
    }
}

impl ConverterConfig {
    /// Directory to resolve relative assets against for this conversion.
    ///
    /// Falls back to `"."` when the current directory cannot be determined.
    pub fn resolve_asset_root(&self) -> PathBuf {
        match &self.asset_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|e| {
                log::warn!("⚠️ Cannot read current directory ({}), using \".\"", e);
                PathBuf::from(".")
            }),
        }
    }
}

/// Builder for [`ConverterConfig`] with validation.
///
/// # Validation
///
/// The [`build()`](Self::build) method validates:
/// - selectors must not be empty
/// - `content_load_timeout` must be greater than 0
/// - `ready_poll_interval` must be greater than 0
/// - `static_settle_delay` must not exceed `dynamic_settle_delay`
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: ConverterConfig::default(),
        }
    }

    /// Use a specific Chrome binary instead of auto-detection.
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set the header marker selector.
    ///
    /// ```rust
    /// use html2pdf_paged::ConverterConfigBuilder;
    ///
    /// let config = ConverterConfigBuilder::new()
    ///     .page_start_selector("header.print")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.page_start_selector, "header.print");
    /// ```
    pub fn page_start_selector<S: Into<String>>(mut self, selector: S) -> Self {
        self.config.page_start_selector = selector.into();
        self
    }

    /// Set the footer marker selector.
    pub fn page_end_selector<S: Into<String>>(mut self, selector: S) -> Self {
        self.config.page_end_selector = selector.into();
        self
    }

    /// Resolve relative assets against `root` instead of the working directory.
    pub fn asset_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.asset_root = Some(root.into());
        self
    }

    /// Set the content-load deadline.
    pub fn content_load_timeout(mut self, timeout: Duration) -> Self {
        self.config.content_load_timeout = timeout;
        self
    }

    /// Set the settle window used when canvas/svg elements are present.
    pub fn dynamic_settle_delay(mut self, delay: Duration) -> Self {
        self.config.dynamic_settle_delay = delay;
        self
    }

    /// Set the settle window used for static pages.
    pub fn static_settle_delay(mut self, delay: Duration) -> Self {
        self.config.static_settle_delay = delay;
        self
    }

    /// Set the readiness polling interval.
    pub fn ready_poll_interval(mut self, interval: Duration) -> Self {
        self.config.ready_poll_interval = interval;
        self
    }

    /// Build and validate the configuration.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use html2pdf_paged::ConverterConfigBuilder;
    ///
    /// assert!(ConverterConfigBuilder::new().build().is_ok());
    ///
    /// let config = ConverterConfigBuilder::new()
    ///     .content_load_timeout(Duration::ZERO)
    ///     .build();
    /// assert!(config.is_err());
    /// ```
    pub fn build(self) -> std::result::Result<ConverterConfig, String> {
        if self.config.page_start_selector.trim().is_empty() {
            return Err("page_start_selector must not be empty".to_string());
        }

        if self.config.page_end_selector.trim().is_empty() {
            return Err("page_end_selector must not be empty".to_string());
        }

        if self.config.content_load_timeout.is_zero() {
            return Err("content_load_timeout must be greater than 0".to_string());
        }

        if self.config.ready_poll_interval.is_zero() {
            return Err("ready_poll_interval must be greater than 0".to_string());
        }

        if self.config.static_settle_delay > self.config.dynamic_settle_delay {
            return Err("static_settle_delay cannot exceed dynamic_settle_delay".to_string());
        }

        Ok(self.config)
    }
}

impl Default for ConverterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Environment Configuration (feature-gated)
// ============================================================================

/// Environment-based configuration loading.
///
/// This module is only available when the `env-config` feature is enabled.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `CHROME_PATH` | String | auto | Custom Chrome binary path |
/// | `HTML2PDF_PAGE_START_SELECTOR` | String | `.page_start` | Header marker |
/// | `HTML2PDF_PAGE_END_SELECTOR` | String | `.page_end` | Footer marker |
/// | `HTML2PDF_ASSET_ROOT` | path | cwd | Asset base directory |
/// | `HTML2PDF_LOAD_TIMEOUT_SECONDS` | u64 | 30 | Content-load deadline |
/// | `HTML2PDF_DYNAMIC_SETTLE_MS` | u64 | 3000 | Settle with canvas/svg |
/// | `HTML2PDF_STATIC_SETTLE_MS` | u64 | 500 | Settle for static pages |
/// | `HTML2PDF_READY_POLL_MS` | u64 | 200 | Readiness polling |
///
/// # Example `app.env` File
///
/// ```text
/// HTML2PDF_ASSET_ROOT=/srv/report-templates
/// HTML2PDF_LOAD_TIMEOUT_SECONDS=45
/// # CHROME_PATH=/usr/bin/chromium
/// ```
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::ConversionError;

    /// Default environment file name.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Load environment variables from `app.env` file.
    pub fn load_env_file() -> Result<std::path::PathBuf, dotenvy::Error> {
        dotenvy::from_filename(ENV_FILE_NAME)
    }

    /// Load configuration from environment variables.
    ///
    /// Loads `app.env` first if present. Unparseable numeric values fall back
    /// to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Configuration`] if the resulting values fail
    /// validation.
    pub fn from_env() -> Result<ConverterConfig, ConversionError> {
        match load_env_file() {
            Ok(path) => {
                log::info!("📄 Loaded configuration from: {:?}", path);
            }
            Err(e) => {
                log::debug!(
                    "📄 No {} file found or failed to load: {} (using environment variables and defaults)",
                    ENV_FILE_NAME,
                    e
                );
            }
        }

        from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// [`from_env`] passes `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<ConverterConfig, ConversionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ConverterConfig::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let load_timeout_seconds = lookup("HTML2PDF_LOAD_TIMEOUT_SECONDS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(defaults.content_load_timeout.as_secs());

        let mut builder = ConverterConfigBuilder::new()
            .page_start_selector(
                lookup("HTML2PDF_PAGE_START_SELECTOR").unwrap_or(defaults.page_start_selector),
            )
            .page_end_selector(
                lookup("HTML2PDF_PAGE_END_SELECTOR").unwrap_or(defaults.page_end_selector),
            )
            .content_load_timeout(Duration::from_secs(load_timeout_seconds))
            .dynamic_settle_delay(millis("HTML2PDF_DYNAMIC_SETTLE_MS", defaults.dynamic_settle_delay))
            .static_settle_delay(millis("HTML2PDF_STATIC_SETTLE_MS", defaults.static_settle_delay))
            .ready_poll_interval(millis("HTML2PDF_READY_POLL_MS", defaults.ready_poll_interval));

        if let Some(path) = lookup("CHROME_PATH").filter(|p| !p.trim().is_empty()) {
            builder = builder.chrome_path(path);
        }
        if let Some(root) = lookup("HTML2PDF_ASSET_ROOT").filter(|p| !p.trim().is_empty()) {
            builder = builder.asset_root(root);
        }

        let config = builder.build().map_err(ConversionError::Configuration)?;

        log::info!("🔧 Converter configuration:");
        log::info!("   - Chrome path: {}", config.chrome_path.as_deref().unwrap_or("auto-detect"));
        log::info!("   - Markers: {} / {}", config.page_start_selector, config.page_end_selector);
        log::info!("   - Content load timeout: {}s", config.content_load_timeout.as_secs());
        log::info!(
            "   - Settle delays: {}ms dynamic, {}ms static",
            config.dynamic_settle_delay.as_millis(),
            config.static_settle_delay.as_millis()
        );

        Ok(config)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
