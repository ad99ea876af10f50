//! Rendering a prepared document to PDF bytes.
//!
//! # Flow
//!
//! ```text
//! open tab ─▶ write markup ─▶ readyState == "complete" ─▶ network quiet ─▶ probe canvas/svg
//!                           └──────────── content_load_timeout ────────┘          │
//!                                                                                 ▼
//!                              close tab ◀─ print A4 ◀─ settle (3s / 500ms, or window.isPageDone)
//! ```
//!
//! # Loading
//!
//! Every document is written into `about:blank` with `document.write`,
//! whatever its size, so page scripts always see the same document URL.
//! The load counts as finished once `document.readyState` is `"complete"`
//! and the number of fetched resources has not changed for
//! [`NETWORK_QUIET_WINDOW`]. Both must happen within
//! [`content_load_timeout`](crate::ConverterConfig::content_load_timeout).
//!
//! # Settling
//!
//! Charts drawn into `<canvas>` or `<svg>` often finish after the load
//! event. When the page contains either element the renderer waits up to
//! [`dynamic_settle_delay`](crate::ConverterConfig::dynamic_settle_delay),
//! otherwise up to
//! [`static_settle_delay`](crate::ConverterConfig::static_settle_delay).
//! A page can cut the wait short by setting a global flag:
//!
//! ```javascript
//! chart.on('finished', () => { window.isPageDone = true; });
//! ```
//!
//! This is a heuristic: a page that needs longer than the settle window and
//! never sets the flag is printed as it stands when the window closes.

use std::time::{Duration, Instant};

use headless_chrome::Browser;
use headless_chrome::types::PrintToPdfOptions;

use crate::config::ConverterConfig;
use crate::error::{ConversionError, Result};
use crate::regions::PageRegions;
use crate::tab::TabGuard;

// ============================================================================
// Constants
// ============================================================================

/// A4 paper width in inches.
pub const A4_WIDTH_INCHES: f64 = 8.27;

/// A4 paper height in inches.
pub const A4_HEIGHT_INCHES: f64 = 11.7;

/// CSS reference pixels per inch.
pub const CSS_PX_PER_INCH: f64 = 96.0;

/// Top margin in CSS pixels. Leaves room for the header template.
pub const MARGIN_TOP_PX: f64 = 60.0;

/// Bottom margin in CSS pixels.
pub const MARGIN_BOTTOM_PX: f64 = 20.0;

/// Left margin in CSS pixels.
pub const MARGIN_LEFT_PX: f64 = 20.0;

/// Right margin in CSS pixels.
pub const MARGIN_RIGHT_PX: f64 = 50.0;

/// Page every document is written into.
pub const BLANK_PAGE_URL: &str = "about:blank";

/// How long the resource count must stay unchanged to count as network-idle.
pub const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

const DYNAMIC_CONTENT_PROBE: &str = "document.querySelectorAll('canvas, svg').length > 0";

const DOCUMENT_COMPLETE_CHECK: &str = "document.readyState === 'complete'";

const PAGE_DONE_CHECK: &str = "window.isPageDone === true";

const RESOURCE_COUNT_CHECK: &str = "performance.getEntriesByType('resource').length";

// ============================================================================
// Print Configuration
// ============================================================================

/// Convert CSS pixels to inches.
///
/// ```rust
/// use html2pdf_paged::render::px_to_inches;
///
/// assert_eq!(px_to_inches(96.0), 1.0);
/// assert_eq!(px_to_inches(60.0), 0.625);
/// ```
pub fn px_to_inches(px: f64) -> f64 {
    px / CSS_PX_PER_INCH
}

/// Build the fixed print configuration.
///
/// - **Paper**: A4 portrait
/// - **Margins**: 60px top, 20px bottom, 20px left, 50px right
/// - **Header/Footer**: enabled, filled from `regions`
/// - **Background**: printed
///
/// Empty templates are sent as empty strings, which suppresses Chrome's
/// default date/title header.
pub fn build_print_options(regions: &PageRegions) -> Option<PrintToPdfOptions> {
    Some(PrintToPdfOptions {
        landscape: Some(false),
        display_header_footer: Some(true),
        print_background: Some(true),
        paper_width: Some(A4_WIDTH_INCHES),
        paper_height: Some(A4_HEIGHT_INCHES),
        margin_top: Some(px_to_inches(MARGIN_TOP_PX)),
        margin_bottom: Some(px_to_inches(MARGIN_BOTTOM_PX)),
        margin_left: Some(px_to_inches(MARGIN_LEFT_PX)),
        margin_right: Some(px_to_inches(MARGIN_RIGHT_PX)),
        header_template: Some(regions.header_template.clone()),
        footer_template: Some(regions.footer_template.clone()),
        ..Default::default()
    })
}

// ============================================================================
// Waiting
// ============================================================================

/// Upper bound of the settle window.
///
/// ```rust
/// use std::time::Duration;
/// use html2pdf_paged::{ConverterConfig, settle_delay};
///
/// let config = ConverterConfig::default();
/// assert_eq!(settle_delay(true, &config), Duration::from_secs(3));
/// assert_eq!(settle_delay(false, &config), Duration::from_millis(500));
/// ```
pub fn settle_delay(has_dynamic_content: bool, config: &ConverterConfig) -> Duration {
    if has_dynamic_content {
        config.dynamic_settle_delay
    } else {
        config.static_settle_delay
    }
}

/// Wait up to `max_wait`, returning early once `is_ready` reports true.
///
/// `is_ready` is checked every `poll_interval`. Returns the time actually
/// waited.
pub fn wait_for_settle<F>(max_wait: Duration, poll_interval: Duration, is_ready: F) -> Duration
where
    F: FnMut() -> bool,
{
    let (ready, elapsed) = poll_until(max_wait, poll_interval, is_ready);

    if ready {
        log::debug!("Page signaled ready after {:?}", elapsed);
    } else {
        log::debug!("Settle window of {:?} elapsed without ready signal", max_wait);
    }

    elapsed
}

/// Check `condition` every `poll_interval` until it holds or `limit` passes.
///
/// The final sleep is shortened so the loop never overshoots `limit` by
/// more than one evaluation.
fn poll_until<F>(limit: Duration, poll_interval: Duration, mut condition: F) -> (bool, Duration)
where
    F: FnMut() -> bool,
{
    let start = Instant::now();

    loop {
        if condition() {
            return (true, start.elapsed());
        }

        let elapsed = start.elapsed();
        if elapsed >= limit {
            return (false, elapsed);
        }

        std::thread::sleep(poll_interval.min(limit - elapsed));
    }
}

/// Poll `sample` until it returns the same value for `quiet_window`.
///
/// A `None` sample restarts the window.
fn wait_for_quiet<F>(
    limit: Duration,
    poll_interval: Duration,
    quiet_window: Duration,
    mut sample: F,
) -> (bool, Duration)
where
    F: FnMut() -> Option<u64>,
{
    let mut last = None;
    let mut stable_since = Instant::now();

    poll_until(limit, poll_interval, || {
        let current = sample();
        if current.is_none() || current != last {
            last = current;
            stable_since = Instant::now();
            return false;
        }
        stable_since.elapsed() >= quiet_window
    })
}

// ============================================================================
// Rendering
// ============================================================================

/// Render `html` in a fresh tab of `browser` and print it.
///
/// `html` must already be self-contained (see
/// [`inline_local_assets`](crate::inline_local_assets)); `regions` supplies
/// the header and footer templates. The tab is closed on every return path.
///
/// # Errors
///
/// - [`ConversionError::TabCreationFailed`] - the browser could not open a tab
/// - [`ConversionError::NavigationFailed`] - the markup could not be loaded
/// - [`ConversionError::ContentLoadTimeout`] - load not reached in time
/// - [`ConversionError::PageEvaluation`] - the canvas/svg probe failed
/// - [`ConversionError::PdfGenerationFailed`] - printing failed
pub fn render_pdf(
    browser: &Browser,
    html: &str,
    regions: &PageRegions,
    config: &ConverterConfig,
) -> Result<Vec<u8>> {
    let start_time = Instant::now();

    let tab = TabGuard::open(browser)?;
    tab.set_default_timeout(config.content_load_timeout);

    let load_start = Instant::now();
    load_content(&tab, html)?;
    wait_for_load(&tab, config, load_start)?;
    log::debug!("Content loaded in {:?}", load_start.elapsed());

    let dynamic = has_dynamic_content(&tab)?;
    let max_wait = settle_delay(dynamic, config);
    log::trace!(
        "Settling for up to {:?} ({} content)",
        max_wait,
        if dynamic { "dynamic" } else { "static" }
    );
    wait_for_settle(max_wait, config.ready_poll_interval, || page_signals_done(&tab));

    log::trace!("Generating PDF");
    let pdf_start = Instant::now();
    let pdf = tab.print_to_pdf(build_print_options(regions)).map_err(|e| {
        log::error!("❌ PDF generation failed: {}", e);
        ConversionError::PdfGenerationFailed(e.to_string())
    })?;

    log::debug!(
        "PDF printed in {:?} ({} bytes), total render time {:?}",
        pdf_start.elapsed(),
        pdf.len(),
        start_time.elapsed()
    );

    Ok(pdf)
}

/// Open a blank page and write `html` into it.
fn load_content(tab: &TabGuard, html: &str) -> Result<()> {
    tab.navigate_to(BLANK_PAGE_URL)
        .map_err(|e| {
            log::error!("❌ Failed to open blank page: {}", e);
            ConversionError::NavigationFailed(e.to_string())
        })?
        .wait_until_navigated()
        .map_err(|e| {
            log::error!("❌ Blank page load timed out: {}", e);
            ConversionError::ContentLoadTimeout(e.to_string())
        })?;

    log::trace!("Writing {} bytes of markup into {}", html.len(), BLANK_PAGE_URL);
    let script = document_write_script(html)?;
    tab.evaluate(&script, false).map_err(|e| {
        log::error!("❌ Failed to write document: {}", e);
        ConversionError::NavigationFailed(e.to_string())
    })?;
    Ok(())
}

/// Script replacing the current document with `html`.
fn document_write_script(html: &str) -> Result<String> {
    let literal = serde_json::to_string(html)
        .map_err(|e| ConversionError::NavigationFailed(format!("cannot encode document: {}", e)))?;
    Ok(format!("document.open(); document.write({}); document.close();", literal))
}

/// Wait for `readyState == "complete"`, then for the network to go quiet.
fn wait_for_load(tab: &TabGuard, config: &ConverterConfig, load_start: Instant) -> Result<()> {
    let remaining = config.content_load_timeout.saturating_sub(load_start.elapsed());
    let (complete, _) = poll_until(remaining, config.ready_poll_interval, || {
        evaluate_bool(tab, DOCUMENT_COMPLETE_CHECK).unwrap_or(false)
    });
    if !complete {
        return Err(load_timeout("document did not reach readyState complete", config));
    }

    let remaining = config.content_load_timeout.saturating_sub(load_start.elapsed());
    let (quiet, waited) = wait_for_quiet(
        remaining,
        config.ready_poll_interval,
        NETWORK_QUIET_WINDOW,
        || evaluate_u64(tab, RESOURCE_COUNT_CHECK),
    );
    if !quiet {
        return Err(load_timeout("network did not go idle", config));
    }

    log::trace!("Network idle after {:?}", waited);
    Ok(())
}

fn load_timeout(what: &str, config: &ConverterConfig) -> ConversionError {
    log::error!("❌ Load timed out: {} within {:?}", what, config.content_load_timeout);
    ConversionError::ContentLoadTimeout(format!(
        "{} within {:?}",
        what, config.content_load_timeout
    ))
}

fn has_dynamic_content(tab: &TabGuard) -> Result<bool> {
    let dynamic = evaluate_bool(tab, DYNAMIC_CONTENT_PROBE).map_err(|e| {
        log::error!("❌ Dynamic content probe failed: {}", e);
        ConversionError::PageEvaluation(e)
    })?;

    log::debug!("Dynamic content (canvas/svg) present: {}", dynamic);
    Ok(dynamic)
}

fn page_signals_done(tab: &TabGuard) -> bool {
    evaluate_bool(tab, PAGE_DONE_CHECK).unwrap_or(false)
}

/// Evaluate `expression`; non-boolean results count as `false`.
fn evaluate_bool(tab: &TabGuard, expression: &str) -> std::result::Result<bool, String> {
    tab.evaluate(expression, false)
        .map(|result| result.value.and_then(|v| v.as_bool()).unwrap_or(false))
        .map_err(|e| e.to_string())
}

fn evaluate_u64(tab: &TabGuard, expression: &str) -> Option<u64> {
    tab.evaluate(expression, false)
        .ok()
        .and_then(|result| result.value)
        .and_then(|v| v.as_u64())
}

// ============================================================================
// Unit Tests
// ============================================================================
