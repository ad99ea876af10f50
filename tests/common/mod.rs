//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use html2pdf_paged::factory::mock::MockBrowserFactory;
use html2pdf_paged::{ConverterConfig, ConverterConfigBuilder, HtmlToPdfConverter};

/// Initialize logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scratch directory for asset files, removed on drop.
pub struct AssetDir {
    dir: tempfile::TempDir,
}

impl AssetDir {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("html2pdf-it-")
            .tempdir()
            .expect("create asset dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let file = self.path().join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&file, contents).expect("write asset");
        file
    }

    /// Configuration resolving assets inside this directory.
    pub fn config(&self) -> ConverterConfig {
        ConverterConfigBuilder::new()
            .asset_root(self.path().to_path_buf())
            .build()
            .expect("valid config")
    }
}

/// Converter whose browser launches always fail, plus its launch counter.
pub fn failing_converter(config: ConverterConfig) -> (HtmlToPdfConverter, Arc<AtomicUsize>) {
    let factory = MockBrowserFactory::always_fails("Chrome unavailable in tests");
    let counter = factory.counter();
    (HtmlToPdfConverter::with_factory(config, Box::new(factory)), counter)
}

/// Document exercising both markers and all three asset kinds.
pub const REPORT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="css/report.css">
  <script src="js/chart.js"></script>
</head>
<body>
  <div class="page_start"><span>ACME Corp</span></div>
  <h1>Quarterly report</h1>
  <img src="img/logo.png" alt="logo">
  <div class="page_end">Confidential</div>
</body>
</html>"#;
