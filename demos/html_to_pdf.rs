//! Convert a small report with header, footer and a chart to `report.pdf`.
//!
//! ```text
//! RUST_LOG=debug cargo run --example html_to_pdf
//! ```
//!
//! Pass a path to convert your own file instead; relative assets are then
//! resolved against the current working directory.

use html2pdf_paged::prelude::*;

const SAMPLE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body { font-family: sans-serif; }
    .page_start, .page_end { font-size: 10px; width: 100%; text-align: center; }
  </style>
</head>
<body>
  <div class="page_start">ACME Corp · Quarterly report</div>

  <h1>Revenue</h1>
  <canvas id="chart" width="400" height="200"></canvas>
  <script>
    const ctx = document.getElementById('chart').getContext('2d');
    [40, 90, 65, 120].forEach((v, i) => {
      ctx.fillStyle = '#3a6ea5';
      ctx.fillRect(20 + i * 90, 200 - v, 60, v);
    });
    window.isPageDone = true;
  </script>

  <div class="page_end">Confidential</div>
</body>
</html>"#;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let html = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).map_err(|source| ConversionError::AssetRead {
            path: path.into(),
            source,
        })?,
        None => SAMPLE.to_string(),
    };

    let pdf = generate_pdf_from_html(html).await;
    shutdown_browser();
    let pdf = pdf?;

    std::fs::write("report.pdf", &pdf)
        .map_err(|e| ConversionError::Internal(format!("cannot write report.pdf: {}", e)))?;
    log::info!("📄 Wrote report.pdf ({} bytes)", pdf.len());

    Ok(())
}
