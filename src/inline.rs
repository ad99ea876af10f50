//! Local asset inlining.
//!
//! The renderer loads the document from a `data:` URL (or `about:blank`),
//! which has no base directory, so relative references such as
//! `<link href="css/report.css">` cannot be fetched by Chrome. Before
//! rendering, every local stylesheet, script and image is read from disk
//! and embedded into the markup:
//!
//! | Element | Local reference becomes |
//! |---------|-------------------------|
//! | `link[rel="stylesheet"]` | `<style>` with the file's text, same position |
//! | `script[src]` | inline script body, `src` removed |
//! | `img[src]` | `data:<mime>;base64,<payload>` |
//!
//! Remote references (`http:`, `https:`, `//host/...`) and `data:` URIs are
//! left alone. A reference to a file that does not exist is logged and
//! degraded, never fatal: the stylesheet link is dropped, scripts and images
//! keep their `src`.
//!
//! # Example
//!
//! ```rust,ignore
//! use html2pdf_paged::{AssetResolver, inline_local_assets};
//!
//! let resolver = AssetResolver::new("/srv/report-templates");
//! let (html, report) = inline_local_assets(&template, &resolver)?;
//!
//! println!("inlined {} stylesheets", report.stylesheets);
//! ```

use std::path::{Path, PathBuf};

use base64::Engine as _;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use crate::error::{ConversionError, Result};

// ============================================================================
// Reference Resolution
// ============================================================================

/// Where an asset reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// Fetched by the browser itself (`http:`, `https:`, `//host/...`).
    Remote,

    /// Already embedded (`data:` URI).
    Embedded,

    /// A path on the local filesystem.
    Local(PathBuf),
}

/// Resolves `href` / `src` values to [`AssetLocation`]s.
///
/// Relative paths are joined onto the resolver's base directory; absolute
/// paths and `file:` URLs are used as they are.
///
/// ```rust
/// use std::path::PathBuf;
/// use html2pdf_paged::{AssetLocation, AssetResolver};
///
/// let resolver = AssetResolver::new("/srv/site");
///
/// assert_eq!(resolver.resolve("https://cdn.example.com/a.css"), AssetLocation::Remote);
/// assert_eq!(resolver.resolve("data:image/png;base64,AAAA"), AssetLocation::Embedded);
/// assert_eq!(
///     resolver.resolve("css/print.css"),
///     AssetLocation::Local(PathBuf::from("/srv/site/css/print.css"))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AssetResolver {
    base_dir: PathBuf,
}

impl AssetResolver {
    /// Resolver rooted at `base_dir`.
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolver rooted at the current working directory.
    pub fn from_current_dir() -> Self {
        Self::new(crate::ConverterConfig::default().resolve_asset_root())
    }

    /// Directory relative references are joined onto.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Classify and resolve a reference.
    pub fn resolve(&self, reference: &str) -> AssetLocation {
        let reference = reference.trim();

        // Schemes match case-insensitively; `//host/...` inherits the page
        // scheme, so it is remote too.
        if starts_with_ignore_case(reference, "http://")
            || starts_with_ignore_case(reference, "https://")
            || reference.starts_with("//")
        {
            return AssetLocation::Remote;
        }

        if starts_with_ignore_case(reference, "data:") {
            return AssetLocation::Embedded;
        }

        if starts_with_ignore_case(reference, "file:") {
            return match url::Url::parse(reference).map(|u| u.to_file_path()) {
                Ok(Ok(path)) => AssetLocation::Local(path),
                _ => {
                    log::debug!("Cannot map {:?} to a local path, leaving it to the browser", reference);
                    AssetLocation::Remote
                }
            };
        }

        let path = Path::new(reference);
        if path.is_absolute() {
            AssetLocation::Local(path.to_path_buf())
        } else {
            AssetLocation::Local(self.base_dir.join(path))
        }
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// MIME type for an image path, chosen by extension.
///
/// Unknown or missing extensions fall back to `image/jpeg`.
///
/// ```rust
/// use std::path::Path;
/// use html2pdf_paged::mime_type_for;
///
/// assert_eq!(mime_type_for(Path::new("logo.PNG")), "image/png");
/// assert_eq!(mime_type_for(Path::new("chart.svg")), "image/svg+xml");
/// assert_eq!(mime_type_for(Path::new("photo")), "image/jpeg");
/// ```
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("avif") => "image/avif",
        _ => "image/jpeg",
    }
}

// ============================================================================
// Inlining
// ============================================================================

/// What [`inline_local_assets`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineReport {
    /// Stylesheet links replaced by `<style>` elements.
    pub stylesheets: usize,

    /// Scripts whose body was filled from disk.
    pub scripts: usize,

    /// Images rewritten to `data:` URIs.
    pub images: usize,

    /// Local references whose file does not exist, in document order.
    pub missing: Vec<PathBuf>,
}

impl InlineReport {
    /// Total number of embedded assets.
    pub fn inlined(&self) -> usize {
        self.stylesheets + self.scripts + self.images
    }
}

/// Embed local stylesheets, scripts and images into `html`.
///
/// Stylesheets are processed first, then scripts, then images, all on one
/// parsed tree. When no element needed touching the input is returned as
/// is.
///
/// # Errors
///
/// Returns [`ConversionError::AssetRead`] when a referenced file exists but
/// cannot be read, or when a stylesheet or script is not valid UTF-8.
pub fn inline_local_assets(html: &str, resolver: &AssetResolver) -> Result<(String, InlineReport)> {
    let document = kuchiki::parse_html().one(html);
    let mut report = InlineReport::default();

    let dropped_links = inline_stylesheets(&document, resolver, &mut report)?;
    inline_scripts(&document, resolver, &mut report)?;
    inline_images(&document, resolver, &mut report)?;

    log::debug!(
        "📦 Inlined {} stylesheet(s), {} script(s), {} image(s); {} missing",
        report.stylesheets,
        report.scripts,
        report.images,
        report.missing.len()
    );

    if report.inlined() == 0 && dropped_links == 0 {
        return Ok((html.to_string(), report));
    }

    Ok((document.to_string(), report))
}

/// Returns how many links were dropped because their file is missing.
fn inline_stylesheets(
    document: &NodeRef,
    resolver: &AssetResolver,
    report: &mut InlineReport,
) -> Result<usize> {
    let mut dropped = 0;

    for (link, href) in elements_with_attr(document, r#"link[rel="stylesheet"]"#, "href") {
        let AssetLocation::Local(path) = resolver.resolve(&href) else {
            continue;
        };

        if !path.is_file() {
            log::warn!("⚠️ Local CSS not found: {}", path.display());
            report.missing.push(path);
            link.detach();
            dropped += 1;
            continue;
        }

        let css = read_text(&path)?;
        let style = new_style_element()?;
        style.append(NodeRef::new_text(css));
        link.insert_before(style);
        link.detach();

        log::trace!("Inlined stylesheet {}", path.display());
        report.stylesheets += 1;
    }

    Ok(dropped)
}

fn inline_scripts(
    document: &NodeRef,
    resolver: &AssetResolver,
    report: &mut InlineReport,
) -> Result<()> {
    for (script, src) in elements_with_attr(document, "script[src]", "src") {
        let AssetLocation::Local(path) = resolver.resolve(&src) else {
            continue;
        };

        if !path.is_file() {
            log::warn!("⚠️ Local JS not found: {}", path.display());
            report.missing.push(path);
            continue;
        }

        let js = read_text(&path)?;
        for child in script.children().collect::<Vec<_>>() {
            child.detach();
        }
        script.append(NodeRef::new_text(js));
        if let Some(element) = script.as_element() {
            element.attributes.borrow_mut().remove("src");
        }

        log::trace!("Inlined script {}", path.display());
        report.scripts += 1;
    }

    Ok(())
}

fn inline_images(
    document: &NodeRef,
    resolver: &AssetResolver,
    report: &mut InlineReport,
) -> Result<()> {
    let engine = base64::engine::general_purpose::STANDARD;

    for (img, src) in elements_with_attr(document, "img[src]", "src") {
        let AssetLocation::Local(path) = resolver.resolve(&src) else {
            continue;
        };

        if !path.is_file() {
            log::warn!("⚠️ Local image not found: {}", path.display());
            report.missing.push(path);
            continue;
        }

        let bytes = std::fs::read(&path).map_err(|source| asset_read_error(&path, source))?;
        let data_uri = format!("data:{};base64,{}", mime_type_for(&path), engine.encode(&bytes));

        if let Some(element) = img.as_element() {
            element.attributes.borrow_mut().insert("src", data_uri);
        }

        log::trace!("Inlined image {} ({} bytes)", path.display(), bytes.len());
        report.images += 1;
    }

    Ok(())
}

/// Snapshot of `(node, attribute value)` for every match, so callers can
/// mutate the tree while iterating.
fn elements_with_attr(document: &NodeRef, selector: &str, attr: &str) -> Vec<(NodeRef, String)> {
    let Ok(matches) = document.select(selector) else {
        return Vec::new();
    };

    matches
        .filter_map(|element| {
            let value = element.attributes.borrow().get(attr)?.to_string();
            if value.trim().is_empty() {
                return None;
            }
            Some((element.as_node().clone(), value))
        })
        .collect()
}

/// Detached, empty `<style>` element.
fn new_style_element() -> Result<NodeRef> {
    let scratch = kuchiki::parse_html().one("<style></style>");
    let style = scratch
        .select_first("style")
        .map_err(|()| ConversionError::Internal("parser dropped a bare <style> element".to_string()))?;

    let node = style.as_node().clone();
    node.detach();
    Ok(node)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| asset_read_error(path, source))
}

fn asset_read_error(path: &Path, source: std::io::Error) -> ConversionError {
    log::error!("❌ Failed to read local asset {}: {}", path.display(), source);
    ConversionError::AssetRead {
        path: path.to_path_buf(),
        source,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    #[test]
    fn test_resolve_classifies_references() {
        let resolver = AssetResolver::new("/base");

        assert_eq!(resolver.resolve("http://a/x.css"), AssetLocation::Remote);
        assert_eq!(resolver.resolve("HTTPS://a/x.css"), AssetLocation::Remote);
        assert_eq!(resolver.resolve("//cdn.example.com/x.js"), AssetLocation::Remote);
        assert_eq!(resolver.resolve("data:text/css,body{}"), AssetLocation::Embedded);
        assert_eq!(
            resolver.resolve("img/logo.png"),
            AssetLocation::Local(PathBuf::from("/base/img/logo.png"))
        );
        assert_eq!(
            resolver.resolve("  ./site.css "),
            AssetLocation::Local(PathBuf::from("/base/./site.css"))
        );
    }

    #[test]
    fn test_resolve_scheme_case_and_protocol_relative() {
        let resolver = AssetResolver::new("/base");

        assert_eq!(resolver.resolve("Http://a/x.css"), AssetLocation::Remote);
        assert_eq!(resolver.resolve("hTtPs://a/x.js"), AssetLocation::Remote);
        assert_eq!(resolver.resolve("//a/x.png"), AssetLocation::Remote);
        assert_eq!(resolver.resolve("DATA:image/png;base64,AA=="), AssetLocation::Embedded);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_absolute_path_and_file_url() {
        let resolver = AssetResolver::new("/base");

        assert_eq!(
            resolver.resolve("/etc/report.css"),
            AssetLocation::Local(PathBuf::from("/etc/report.css"))
        );
        assert_eq!(
            resolver.resolve("file:///srv/assets/a%20b.css"),
            AssetLocation::Local(PathBuf::from("/srv/assets/a b.css"))
        );
    }

    #[test]
    fn test_mime_type_table() {
        let cases = [
            ("a.jpg", "image/jpeg"),
            ("a.JPEG", "image/jpeg"),
            ("a.png", "image/png"),
            ("a.gif", "image/gif"),
            ("a.bmp", "image/bmp"),
            ("a.svg", "image/svg+xml"),
            ("a.webp", "image/webp"),
            ("a.ico", "image/x-icon"),
            ("a.avif", "image/avif"),
            ("a.tiff", "image/jpeg"),
            ("noext", "image/jpeg"),
        ];
        for (name, expected) in cases {
            assert_eq!(mime_type_for(Path::new(name)), expected, "{}", name);
        }
    }

    // -------------------------------------------------------------------------
    // Stylesheets
    // -------------------------------------------------------------------------

    #[test]
    fn test_stylesheet_replaced_in_place() {
        let dir = TempDir::new().unwrap();
        write(&dir, "css/site.css", b"body { color: red; }\n.a > .b { margin: 0 }");
        let html = r#"<html><head><meta charset="utf-8"><link rel="stylesheet" href="css/site.css"><title>t</title></head><body></body></html>"#;

        let (out, report) = inline_local_assets(html, &AssetResolver::new(dir.path())).unwrap();

        assert_eq!(report.stylesheets, 1);
        assert_eq!(
            out,
            r#"<html><head><meta charset="utf-8"><style>body { color: red; }
.a > .b { margin: 0 }</style><title>t</title></head><body></body></html>"#
        );
    }

    #[test]
    fn test_missing_stylesheet_link_is_dropped() {
        let dir = TempDir::new().unwrap();
        let html = r#"<html><head><link rel="stylesheet" href="nope.css"></head><body><p>x</p></body></html>"#;

        let (out, report) = inline_local_assets(html, &AssetResolver::new(dir.path())).unwrap();

        assert!(!out.contains("<link"));
        assert!(out.contains("<p>x</p>"));
        assert_eq!(report.missing, vec![dir.path().join("nope.css")]);
        assert_eq!(report.inlined(), 0);
    }

    #[test]
    fn test_unreadable_stylesheet_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.css", &[0xff, 0xfe, 0x00, 0x41]);
        let html = r#"<link rel="stylesheet" href="bad.css">"#;

        let result = inline_local_assets(html, &AssetResolver::new(dir.path()));

        match result {
            Err(ConversionError::AssetRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected AssetRead, got {:?}", other.map(|(_, r)| r)),
        }
    }

    // -------------------------------------------------------------------------
    // Scripts and Images
    // -------------------------------------------------------------------------

    #[test]
    fn test_script_body_filled_and_src_removed() {
        let dir = TempDir::new().unwrap();
        write(&dir, "chart.js", b"window.isPageDone = 1 < 2 && true;");
        let html = r#"<body><script src="chart.js"></script><script src="missing.js"></script></body>"#;

        let (out, report) = inline_local_assets(html, &AssetResolver::new(dir.path())).unwrap();

        assert_eq!(report.scripts, 1);
        assert!(out.contains("<script>window.isPageDone = 1 < 2 && true;</script>"));
        assert!(out.contains(r#"<script src="missing.js"></script>"#));
        assert_eq!(report.missing, vec![dir.path().join("missing.js")]);
    }

    #[test]
    fn test_image_becomes_data_uri() {
        let dir = TempDir::new().unwrap();
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        write(&dir, "logo.png", &png);
        let html = r#"<body><img src="logo.png" alt="logo"><img src="gone.gif"></body>"#;

        let (out, report) = inline_local_assets(html, &AssetResolver::new(dir.path())).unwrap();

        let expected = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        );
        assert!(out.contains(&expected), "got: {}", out);
        assert!(out.contains(r#"src="gone.gif""#));
        assert_eq!(report.images, 1);
        assert_eq!(report.missing.len(), 1);
    }

    #[test]
    fn test_remote_and_embedded_references_untouched() {
        let dir = TempDir::new().unwrap();
        let html = concat!(
            r#"<html><head><link rel="stylesheet" href="https://cdn.example.com/a.css">"#,
            r#"<script src="//cdn.example.com/b.js"></script></head>"#,
            r#"<body><img src="data:image/gif;base64,R0lGODlhAQABAAAAACw="></body></html>"#
        );

        let (out, report) = inline_local_assets(html, &AssetResolver::new(dir.path())).unwrap();

        assert_eq!(out, html);
        assert_eq!(report, InlineReport::default());
    }

    #[test]
    fn test_absolute_path_reference() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "abs.css", b"h1{}");
        let html = format!(r#"<link rel="stylesheet" href="{}">"#, path.display());

        let (out, report) = inline_local_assets(&html, &AssetResolver::new("/nonexistent")).unwrap();

        assert_eq!(report.stylesheets, 1);
        assert!(out.contains("<style>h1{}</style>"));
    }
}
