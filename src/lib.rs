//! # html2pdf-paged
//!
//! Paginated PDF generation from HTML strings through headless Chrome.
//!
//! Hand the crate a complete HTML document and get back A4 PDF bytes with a
//! repeating header and footer, local stylesheets, scripts and images
//! embedded, and time for charts to finish drawing before the page is
//! printed.
//!
//! ## Features
//!
//! - **Header/Footer Regions**: elements marked `.page_start` / `.page_end`
//!   become Chrome's per-page header and footer templates
//! - **Asset Inlining**: relative CSS, JS and image references are read from
//!   disk and embedded, so the document renders without a base URL
//! - **Render Settling**: pages with `<canvas>`/`<svg>` get a longer settle
//!   window, which `window.isPageDone = true` can end early
//! - **Shared Browser**: one lazily launched Chrome process serves every
//!   conversion; concurrent first callers never launch two
//! - **Async Entry Point**: [`generate_pdf_from_html`] runs the blocking
//!   pipeline on tokio's blocking pool
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │   HTML string                               │
//! └─────────────────┬───────────────────────────┘
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │   regions: header/footer templates          │
//! │   inline:  local CSS / JS / images          │
//! └─────────────────┬───────────────────────────┘
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │   BrowserManager (one shared Browser)       │
//! │   └─ TabGuard per conversion                │
//! │        load ─▶ settle ─▶ print (A4)         │
//! └─────────────────┬───────────────────────────┘
//!                   ▼
//!               PDF bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use html2pdf_paged::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = r#"<html><body>
//!         <div class="page_start">ACME Corp</div>
//!         <link rel="stylesheet" href="report.css">
//!         <h1>Quarterly report</h1>
//!         <div class="page_end">Confidential</div>
//!     </body></html>"#;
//!
//!     let pdf = generate_pdf_from_html(html).await?;
//!     std::fs::write("report.pdf", pdf)?;
//!
//!     shutdown_browser();
//!     Ok(())
//! }
//! ```
//!
//! ## Explicit Converter
//!
//! The free functions share a process-wide converter. For a converter with
//! its own configuration and browser:
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use html2pdf_paged::{ConverterConfigBuilder, HtmlToPdfConverter};
//!
//! let config = ConverterConfigBuilder::new()
//!     .asset_root("/srv/report-templates")
//!     .dynamic_settle_delay(Duration::from_secs(5))
//!     .build()?;
//!
//! let converter = HtmlToPdfConverter::new(config);
//! let pdf = converter.convert(&html)?; // blocking
//! ```
//!
//! ## Environment Configuration
//!
//! With the `env-config` feature (enabled by default) the process-wide
//! converter reads `app.env` and the environment on first use:
//!
//! ```text
//! CHROME_PATH=/usr/bin/chromium
//! HTML2PDF_ASSET_ROOT=/srv/report-templates
//! HTML2PDF_LOAD_TIMEOUT_SECONDS=45
//! ```
//!
//! See [`config::env`] for the full list.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `env-config` | ✅ | Load configuration from `app.env` / environment |
//! | `test-utils` | ❌ | Expose [`MockBrowserFactory`](factory::mock::MockBrowserFactory) |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, ConversionError>`](Result):
//!
//! ```rust,ignore
//! use html2pdf_paged::{ConversionError, generate_pdf_from_html};
//!
//! match generate_pdf_from_html(html).await {
//!     Ok(pdf) => save(pdf),
//!     Err(ConversionError::AssetRead { path, source }) => {
//!         eprintln!("Cannot read {}: {}", path.display(), source);
//!     }
//!     Err(e) if e.is_retryable() => retry_later(),
//!     Err(e) => eprintln!("Conversion failed: {}", e),
//! }
//! ```
//!
//! ## Testing
//!
//! For testing without Chrome, enable the `test-utils` feature and use
//! [`MockBrowserFactory`](factory::mock::MockBrowserFactory):
//!
//! ```rust,ignore
//! use html2pdf_paged::factory::mock::MockBrowserFactory;
//! use html2pdf_paged::{ConverterConfig, HtmlToPdfConverter};
//!
//! let factory = MockBrowserFactory::always_fails("Test error");
//! let converter = HtmlToPdfConverter::with_factory(ConverterConfig::default(), Box::new(factory));
//! ```

#![doc(html_root_url = "https://docs.rs/html2pdf-paged/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod browser;
pub mod config;
pub mod converter;
pub mod error;
pub mod factory;
pub mod inline;
pub mod prelude;
pub mod regions;
pub mod render;
pub mod tab;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

// Core types
pub use browser::BrowserManager;
pub use config::{ConverterConfig, ConverterConfigBuilder};
pub use converter::{HtmlToPdfConverter, PreparedDocument};
pub use error::{ConversionError, Result};
pub use factory::{BrowserFactory, ChromeBrowserFactory, create_chrome_options};
pub use tab::TabGuard;

// Pipeline stages
pub use inline::{AssetLocation, AssetResolver, InlineReport, inline_local_assets, mime_type_for};
pub use regions::{PageRegions, extract_page_regions};
pub use render::{build_print_options, render_pdf, settle_delay};

// Process-wide API
pub use converter::{browser_instance, generate_pdf_from_html, global_converter, shutdown_browser};

// Feature-gated re-exports
#[cfg(feature = "env-config")]
pub use config::env::from_env;
