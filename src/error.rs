//! Error types for HTML to PDF conversion.
//!
//! This module provides [`ConversionError`], a unified error type for every
//! stage of the pipeline, and a convenient [`Result`] type alias.
//!
//! Missing local assets are **not** errors: the inliner logs a warning and
//! leaves the reference degraded. Everything listed here aborts the
//! conversion and no partial PDF is produced.
//!
//! # Example
//!
//! ```rust
//! use html2pdf_paged::{ConversionError, Result};
//!
//! fn render_report() -> Result<Vec<u8>> {
//!     Err(ConversionError::EmptyHtml)
//! }
//!
//! match render_report() {
//!     Ok(pdf) => println!("Generated {} bytes", pdf.len()),
//!     Err(ConversionError::ContentLoadTimeout(msg)) => println!("Too slow: {}", msg),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;

/// Errors that can occur while converting HTML to PDF.
///
/// # Example
///
/// ```rust
/// use html2pdf_paged::ConversionError;
///
/// fn handle_error(error: &ConversionError) {
///     match error {
///         ConversionError::BrowserLaunch(msg) => eprintln!("Chrome failed: {}", msg),
///         ConversionError::AssetRead { path, .. } => eprintln!("Bad asset {:?}", path),
///         other => eprintln!("Conversion failed: {}", other),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The HTML input is empty or contains only whitespace.
    #[error("HTML content is required")]
    EmptyHtml,

    /// A page-start / page-end marker selector could not be parsed.
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// A local asset exists but could not be read.
    ///
    /// Raised for I/O failures and for stylesheets or scripts that are not
    /// valid UTF-8. Assets that do not exist at all only produce a warning.
    #[error("Failed to read local asset {path:?}: {source}")]
    AssetRead {
        /// Resolved path of the asset.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to launch a headless Chrome instance.
    ///
    /// # Common Causes
    ///
    /// - Chrome/Chromium binary not found or not installed
    /// - Invalid Chrome binary path specified
    /// - Insufficient permissions to execute Chrome
    /// - System resource limits exceeded
    ///
    /// # Example
    ///
    /// ```rust
    /// use html2pdf_paged::ConversionError;
    ///
    /// let error = ConversionError::BrowserLaunch("Chrome binary not found".to_string());
    /// assert_eq!(error.to_string(), "Failed to launch browser: Chrome binary not found");
    /// ```
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// Invalid configuration provided.
    ///
    /// Produced by [`ConverterConfigBuilder::build`](crate::ConverterConfigBuilder::build)
    /// and when Chrome launch options cannot be assembled.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The browser manager has been shut down.
    ///
    /// Returned by [`BrowserManager::get`](crate::BrowserManager::get) after
    /// [`BrowserManager::shutdown`](crate::BrowserManager::shutdown).
    #[error("Browser manager is shut down")]
    ManagerShutDown,

    /// The browser could not open a new tab.
    ///
    /// The cached browser is invalidated when this happens, so the next
    /// conversion launches a fresh process.
    #[error("Failed to create tab: {0}")]
    TabCreationFailed(String),

    /// The document could not be loaded into the tab.
    #[error("Failed to load content: {0}")]
    NavigationFailed(String),

    /// The document did not finish loading within the content-load timeout.
    #[error("Content load timeout: {0}")]
    ContentLoadTimeout(String),

    /// A script evaluated in the page (the dynamic-content probe) failed.
    #[error("Page evaluation failed: {0}")]
    PageEvaluation(String),

    /// The browser failed to print the page.
    #[error("PDF generation failed: {0}")]
    PdfGenerationFailed(String),

    /// The blocking conversion task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Whether retrying the same conversion could succeed.
    ///
    /// Input problems (empty HTML, bad selectors, unreadable assets,
    /// configuration) are deterministic and never worth retrying.
    ///
    /// ```rust
    /// use html2pdf_paged::ConversionError;
    ///
    /// assert!(ConversionError::ContentLoadTimeout("30s".into()).is_retryable());
    /// assert!(!ConversionError::EmptyHtml.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BrowserLaunch(_)
                | Self::TabCreationFailed(_)
                | Self::ContentLoadTimeout(_)
                | Self::Internal(_)
        )
    }
}

/// Convenience conversion from [`String`] to [`ConversionError::Configuration`].
///
/// ```rust
/// use html2pdf_paged::ConversionError;
///
/// let error: ConversionError = "invalid configuration".to_string().into();
/// assert!(matches!(error, ConversionError::Configuration(_)));
/// ```
impl From<String> for ConversionError {
    fn from(msg: String) -> Self {
        ConversionError::Configuration(msg)
    }
}

/// Convenience conversion from `&str` to [`ConversionError::Configuration`].
impl From<&str> for ConversionError {
    fn from(msg: &str) -> Self {
        ConversionError::Configuration(msg.to_string())
    }
}

/// Result type alias using [`ConversionError`].
pub type Result<T> = std::result::Result<T, ConversionError>;

// ============================================================================
// Unit Tests
// ============================================================================
