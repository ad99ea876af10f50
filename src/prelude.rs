//! Convenient imports for common usage patterns.
//!
//! # Usage
//!
//! ```rust,ignore
//! use html2pdf_paged::prelude::*;
//! ```
//!
//! This imports:
//!
//! - [`generate_pdf_from_html`] - Async one-call conversion
//! - [`shutdown_browser`] - Process-wide teardown
//! - [`HtmlToPdfConverter`] - Converter with its own browser
//! - [`ConverterConfig`] / [`ConverterConfigBuilder`] - Configuration
//! - [`ConversionError`] / [`Result`] - Error handling
//! - [`BrowserFactory`] / [`ChromeBrowserFactory`] - Browser launching
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_paged::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConverterConfigBuilder::new()
//!         .page_start_selector("header.print")
//!         .page_end_selector("footer.print")
//!         .build()?;
//!
//!     let converter = Arc::new(HtmlToPdfConverter::new(config));
//!     let pdf = converter.convert_async("<h1>Hi</h1>".to_string()).await?;
//!     println!("{} bytes", pdf.len());
//!     Ok(())
//! }
//! ```

pub use crate::config::{ConverterConfig, ConverterConfigBuilder};
pub use crate::converter::{HtmlToPdfConverter, generate_pdf_from_html, shutdown_browser};
pub use crate::error::{ConversionError, Result};
pub use crate::factory::{BrowserFactory, ChromeBrowserFactory};
