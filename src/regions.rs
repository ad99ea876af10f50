//! Header and footer extraction.
//!
//! Documents mark the markup that should repeat on every printed page with
//! two selectors (`.page_start` and `.page_end` by default). The first
//! element matching each selector is serialized and handed to Chrome as the
//! header or footer template; every matching element is then removed from
//! the body so it is not printed twice.
//!
//! ```rust
//! use html2pdf_paged::extract_page_regions;
//!
//! let html = r#"<html><body>
//!     <div class="page_start">ACME Corp</div>
//!     <p>Quarterly report</p>
//!     <div class="page_end">Confidential</div>
//! </body></html>"#;
//!
//! let regions = extract_page_regions(html, ".page_start", ".page_end").unwrap();
//!
//! assert_eq!(regions.header_template, r#"<div class="page_start">ACME Corp</div>"#);
//! assert_eq!(regions.footer_template, r#"<div class="page_end">Confidential</div>"#);
//! assert!(!regions.html.contains("ACME Corp"));
//! assert!(regions.html.contains("Quarterly report"));
//! ```

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use crate::error::{ConversionError, Result};

/// Output of [`extract_page_regions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRegions {
    /// Document markup with every marker element removed.
    pub html: String,

    /// Outer markup of the first page-start element, or empty.
    pub header_template: String,

    /// Outer markup of the first page-end element, or empty.
    pub footer_template: String,
}

impl PageRegions {
    /// Whether the document carried neither a header nor a footer.
    pub fn is_unmarked(&self) -> bool {
        self.header_template.is_empty() && self.footer_template.is_empty()
    }
}

/// Pull header and footer markup out of `html`.
///
/// The page-end pass runs on the tree the page-start pass already stripped,
/// so an end marker nested inside a start marker is gone before it can be
/// picked up as the footer.
///
/// When neither selector matches, `html` is returned unchanged (it is not
/// re-serialized).
///
/// # Errors
///
/// Returns [`ConversionError::Selector`] if either selector cannot be parsed.
pub fn extract_page_regions(
    html: &str,
    page_start_selector: &str,
    page_end_selector: &str,
) -> Result<PageRegions> {
    let document = kuchiki::parse_html().one(html);

    let header_template = take_region(&document, page_start_selector)?;
    let footer_template = take_region(&document, page_end_selector)?;

    let regions = match (header_template, footer_template) {
        (None, None) => {
            log::debug!(
                "No '{}' / '{}' markers found, document left as is",
                page_start_selector,
                page_end_selector
            );
            PageRegions {
                html: html.to_string(),
                ..PageRegions::default()
            }
        }
        (header, footer) => PageRegions {
            html: document.to_string(),
            header_template: header.unwrap_or_default(),
            footer_template: footer.unwrap_or_default(),
        },
    };

    log::debug!(
        "📑 Page regions: header {} bytes, footer {} bytes",
        regions.header_template.len(),
        regions.footer_template.len()
    );

    Ok(regions)
}

/// Detach every element matching `selector`; return the first one's markup.
fn take_region(document: &NodeRef, selector: &str) -> Result<Option<String>> {
    let matches: Vec<NodeRef> = document
        .select(selector)
        .map_err(|()| {
            log::error!("❌ Invalid marker selector: {:?}", selector);
            ConversionError::Selector(selector.to_string())
        })?
        .map(|element| element.as_node().clone())
        .collect();

    let Some(first) = matches.first() else {
        return Ok(None);
    };

    let markup = first.to_string();
    if matches.len() > 1 {
        log::debug!(
            "'{}' matched {} elements, using the first and removing all",
            selector,
            matches.len()
        );
    }

    for node in &matches {
        node.detach();
    }

    Ok(Some(markup))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = ".page_start";
    const END: &str = ".page_end";

    #[test]
    fn test_extracts_header_and_footer() {
        let html = r#"<html><head></head><body><header class="page_start"><b>Logo</b></header><main>Body</main><footer class="page_end">Page footer</footer></body></html>"#;

        let regions = extract_page_regions(html, START, END).unwrap();

        assert_eq!(regions.header_template, r#"<header class="page_start"><b>Logo</b></header>"#);
        assert_eq!(regions.footer_template, r#"<footer class="page_end">Page footer</footer>"#);
        assert_eq!(
            regions.html,
            "<html><head></head><body><main>Body</main></body></html>"
        );
        assert!(!regions.is_unmarked());
    }

    #[test]
    fn test_unmarked_document_is_returned_verbatim() {
        // Not even well-formed: a re-serialization would add html/head/body.
        let html = "<p>Just a paragraph  </p>\n<!-- keep me -->";

        let regions = extract_page_regions(html, START, END).unwrap();

        assert_eq!(regions.html, html);
        assert!(regions.header_template.is_empty());
        assert!(regions.footer_template.is_empty());
        assert!(regions.is_unmarked());
    }

    #[test]
    fn test_multiple_matches_first_wins_all_removed() {
        let html = r#"<body><div class="page_start">one</div><p>x</p><div class="page_start">two</div></body>"#;

        let regions = extract_page_regions(html, START, END).unwrap();

        assert_eq!(regions.header_template, r#"<div class="page_start">one</div>"#);
        assert!(regions.footer_template.is_empty());
        assert!(!regions.html.contains("one"));
        assert!(!regions.html.contains("two"));
        assert!(regions.html.contains("<p>x</p>"));
    }

    #[test]
    fn test_footer_only() {
        let html = r#"<body><p>content</p><div class="page_end">bye</div></body>"#;

        let regions = extract_page_regions(html, START, END).unwrap();

        assert!(regions.header_template.is_empty());
        assert_eq!(regions.footer_template, r#"<div class="page_end">bye</div>"#);
        assert!(!regions.html.contains("bye"));
    }

    /// A footer marker inside the header leaves with the header.
    #[test]
    fn test_end_marker_nested_in_start_marker() {
        let html = r#"<body><div class="page_start">head<span class="page_end">inner</span></div><p>x</p></body>"#;

        let regions = extract_page_regions(html, START, END).unwrap();

        assert!(regions.header_template.contains("inner"));
        assert!(regions.footer_template.is_empty());
        assert!(!regions.html.contains("inner"));
    }

    #[test]
    fn test_custom_selectors() {
        let html = r#"<body><div id="top">T</div><div data-role="bottom">B</div></body>"#;

        let regions = extract_page_regions(html, "#top", "[data-role=bottom]").unwrap();

        assert_eq!(regions.header_template, r#"<div id="top">T</div>"#);
        assert_eq!(regions.footer_template, r#"<div data-role="bottom">B</div>"#);
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let result = extract_page_regions("<p>x</p>", "[[nope", END);
        assert!(matches!(result, Err(ConversionError::Selector(ref s)) if s == "[[nope"));

        let result = extract_page_regions("<p>x</p>", START, ":::");
        assert!(matches!(result, Err(ConversionError::Selector(_))));
    }
}
