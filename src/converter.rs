//! The conversion pipeline.
//!
//! [`HtmlToPdfConverter`] runs the stages in order:
//!
//! 1. reject empty input
//! 2. [`extract_page_regions`] pulls header/footer markup out
//! 3. [`inline_local_assets`] embeds local CSS/JS/images
//! 4. [`BrowserManager::get`] provides the shared browser
//! 5. [`render_pdf`] loads, settles and prints
//!
//! Steps 1 to 3 need no browser, so bad input fails fast without ever
//! launching Chrome.
//!
//! The free functions at the bottom of this module ([`generate_pdf_from_html`],
//! [`browser_instance`], [`shutdown_browser`]) share one process-wide
//! converter, configured from the environment on first use.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use headless_chrome::Browser;

use crate::browser::BrowserManager;
use crate::config::ConverterConfig;
use crate::error::{ConversionError, Result};
use crate::factory::{BrowserFactory, ChromeBrowserFactory};
use crate::inline::{AssetResolver, InlineReport, inline_local_assets};
use crate::regions::{PageRegions, extract_page_regions};
use crate::render::render_pdf;

/// A document ready for the browser.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    /// Header/footer templates; `regions.html` is the stripped, inlined body.
    pub regions: PageRegions,

    /// What the inliner embedded or could not find.
    pub assets: InlineReport,
}

/// HTML to PDF converter backed by one shared headless browser.
///
/// # Example
///
/// ```rust,ignore
/// use html2pdf_paged::{ConverterConfig, HtmlToPdfConverter};
///
/// let converter = HtmlToPdfConverter::new(ConverterConfig::default());
/// let pdf = converter.convert("<h1>Invoice</h1>")?;
/// std::fs::write("invoice.pdf", pdf)?;
/// ```
///
/// # Thread Safety
///
/// `convert` takes `&self`; share the converter behind an `Arc` and call it
/// from as many threads as needed. Each call renders in its own tab.
pub struct HtmlToPdfConverter {
    config: ConverterConfig,
    manager: BrowserManager,
}

impl HtmlToPdfConverter {
    /// Converter launching Chrome per `config.chrome_path`.
    pub fn new(config: ConverterConfig) -> Self {
        let factory = ChromeBrowserFactory::from_config(&config);
        Self::with_factory(config, Box::new(factory))
    }

    /// Converter launching browsers through a custom factory.
    pub fn with_factory(config: ConverterConfig, factory: Box<dyn BrowserFactory>) -> Self {
        Self {
            config,
            manager: BrowserManager::new(factory),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Manager owning this converter's browser.
    pub fn manager(&self) -> &BrowserManager {
        &self.manager
    }

    /// Run the browser-free stages: validation, region extraction, inlining.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::EmptyHtml`] - input is empty or whitespace
    /// - [`ConversionError::Selector`] - a marker selector is invalid
    /// - [`ConversionError::AssetRead`] - a local asset cannot be read
    pub fn prepare_document(&self, html: &str) -> Result<PreparedDocument> {
        if html.trim().is_empty() {
            log::error!("❌ Empty HTML content");
            return Err(ConversionError::EmptyHtml);
        }

        let mut regions = extract_page_regions(
            html,
            &self.config.page_start_selector,
            &self.config.page_end_selector,
        )?;

        let resolver = AssetResolver::new(self.config.resolve_asset_root());
        let (inlined, assets) = inline_local_assets(&regions.html, &resolver)?;
        regions.html = inlined;

        if !assets.missing.is_empty() {
            log::info!(
                "ℹ️ {} local asset(s) not found under {}",
                assets.missing.len(),
                resolver.base_dir().display()
            );
        }

        Ok(PreparedDocument { regions, assets })
    }

    /// Convert `html` to PDF bytes. Blocks the calling thread.
    ///
    /// # Errors
    ///
    /// Any [`ConversionError`]; see [`prepare_document`](Self::prepare_document),
    /// [`BrowserManager::get`] and [`render_pdf`]. If the browser cannot open
    /// a tab it is discarded so the next conversion relaunches it.
    pub fn convert(&self, html: &str) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        log::debug!("📄 Converting HTML document ({} bytes)", html.len());

        let document = self.prepare_document(html)?;
        let browser = self.manager.get()?;

        match render_pdf(&browser, &document.regions.html, &document.regions, &self.config) {
            Ok(pdf) => {
                log::info!(
                    "✅ PDF generated successfully: {} bytes in {:?}",
                    pdf.len(),
                    start_time.elapsed()
                );
                Ok(pdf)
            }
            Err(e) => {
                if matches!(e, ConversionError::TabCreationFailed(_)) {
                    self.manager.discard(&browser);
                }
                log::error!("❌ Conversion failed after {:?}: {}", start_time.elapsed(), e);
                Err(e)
            }
        }
    }

    /// Run [`convert`](Self::convert) on tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// As [`convert`](Self::convert), plus [`ConversionError::Internal`] if
    /// the blocking task panics or is cancelled.
    pub async fn convert_async(self: Arc<Self>, html: String) -> Result<Vec<u8>> {
        tokio::task::spawn_blocking(move || self.convert(&html))
            .await
            .map_err(|e| {
                log::error!("❌ Blocking conversion task failed: {}", e);
                ConversionError::Internal(format!("conversion task failed: {}", e))
            })?
    }
}

impl std::fmt::Debug for HtmlToPdfConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlToPdfConverter")
            .field("config", &self.config)
            .field("manager", &self.manager)
            .finish()
    }
}

// ============================================================================
// Process-wide Converter
// ============================================================================

static GLOBAL_CONVERTER: OnceLock<Arc<HtmlToPdfConverter>> = OnceLock::new();

/// The process-wide converter, created on first call.
///
/// With the `env-config` feature its configuration comes from `app.env` and
/// the environment; an invalid environment is logged and replaced by the
/// defaults.
pub fn global_converter() -> &'static Arc<HtmlToPdfConverter> {
    GLOBAL_CONVERTER.get_or_init(|| {
        log::debug!("🔧 Initializing process-wide converter");
        Arc::new(HtmlToPdfConverter::new(global_config()))
    })
}

#[cfg(feature = "env-config")]
fn global_config() -> ConverterConfig {
    crate::config::env::from_env().unwrap_or_else(|e| {
        log::error!("❌ Invalid converter environment, using defaults: {}", e);
        ConverterConfig::default()
    })
}

#[cfg(not(feature = "env-config"))]
fn global_config() -> ConverterConfig {
    ConverterConfig::default()
}

/// Convert an HTML string to PDF bytes with the process-wide converter.
///
/// Runs the blocking pipeline on tokio's blocking pool, so it can be awaited
/// from any async context without stalling the runtime.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::main]
/// async fn main() -> html2pdf_paged::Result<()> {
///     let pdf = html2pdf_paged::generate_pdf_from_html("<h1>Hello</h1>").await?;
///     std::fs::write("hello.pdf", pdf).expect("write");
///     html2pdf_paged::shutdown_browser();
///     Ok(())
/// }
/// ```
pub async fn generate_pdf_from_html(html: impl Into<String>) -> Result<Vec<u8>> {
    Arc::clone(global_converter()).convert_async(html.into()).await
}

/// The process-wide browser, launched on first call.
pub fn browser_instance() -> Result<Arc<Browser>> {
    global_converter().manager().get()
}

/// Shut down the process-wide browser.
///
/// Later calls to [`generate_pdf_from_html`] and [`browser_instance`] fail
/// with [`ConversionError::ManagerShutDown`]. Does nothing if the
/// process-wide converter was never used.
pub fn shutdown_browser() {
    match GLOBAL_CONVERTER.get() {
        Some(converter) => converter.manager().shutdown(),
        None => log::debug!("Process-wide converter never initialized, nothing to shut down"),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::mock::MockBrowserFactory;

    fn failing_converter(config: ConverterConfig) -> (HtmlToPdfConverter, Arc<std::sync::atomic::AtomicUsize>) {
        let factory = MockBrowserFactory::always_fails("no chrome in unit tests");
        let counter = factory.counter();
        (HtmlToPdfConverter::with_factory(config, Box::new(factory)), counter)
    }

    #[test]
    fn test_empty_html_rejected_before_launch() {
        let (converter, counter) = failing_converter(ConverterConfig::default());

        assert!(matches!(converter.convert(""), Err(ConversionError::EmptyHtml)));
        assert!(matches!(converter.convert(" \n\t "), Err(ConversionError::EmptyHtml)));
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_selector_rejected_before_launch() {
        let config = crate::ConverterConfigBuilder::new()
            .page_start_selector("[[")
            .build()
            .unwrap();
        let (converter, counter) = failing_converter(config);

        assert!(matches!(converter.convert("<p>x</p>"), Err(ConversionError::Selector(_))));
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prepare_document_strips_regions() {
        let (converter, _) = failing_converter(ConverterConfig::default());

        let document = converter
            .prepare_document(r#"<body><div class="page_start">Head</div><p>Body</p></body>"#)
            .unwrap();

        assert_eq!(document.regions.header_template, r#"<div class="page_start">Head</div>"#);
        assert!(document.regions.footer_template.is_empty());
        assert!(!document.regions.html.contains("Head"));
        assert_eq!(document.assets, InlineReport::default());
    }

    #[test]
    fn test_launch_failure_is_reported() {
        let (converter, counter) = failing_converter(ConverterConfig::default());

        let result = converter.convert("<p>hello</p>");

        assert!(matches!(result, Err(ConversionError::BrowserLaunch(_))));
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(!converter.manager().is_running());
    }

    #[tokio::test]
    async fn test_convert_async_propagates_errors() {
        let (converter, _) = failing_converter(ConverterConfig::default());

        let result = Arc::new(converter).convert_async(String::new()).await;

        assert!(matches!(result, Err(ConversionError::EmptyHtml)));
    }
}
