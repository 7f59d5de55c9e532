//! # Closing Report (plain text)
//!
//! Writes the end-of-day report as `fechamento_DD-MM-YYYY.txt`.
//!
//! ## Layout
//! ```text
//! Fechamento - Ousadia Vest
//! Data: 01/03/2024 18:02:11
//!
//! Caixa anterior: R$ 120,10
//! Estoque anterior: R$ 2.310,00
//!
//! Resumo de Vendas Hoje:
//! Camisa — Qtd: 2 — Total: R$ 50,00
//! ----------------------------------------
//! TOTAL DO DIA: R$ 50,00
//! ```

use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use till_core::{ClosingReport, CurrencyFormat, ReportGenerator};
use tracing::info;

/// Report generator writing one text file per closing.
#[derive(Debug)]
pub struct TextReportGenerator {
    dir: PathBuf,
    store_name: String,
    format: CurrencyFormat,
    written: Option<PathBuf>,
}

impl TextReportGenerator {
    pub fn new(dir: impl Into<PathBuf>, store_name: impl Into<String>, format: CurrencyFormat) -> Self {
        TextReportGenerator {
            dir: dir.into(),
            store_name: store_name.into(),
            format,
            written: None,
        }
    }

    /// File written by the last successful render.
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }
}

impl ReportGenerator for TextReportGenerator {
    type Error = io::Error;

    fn render(&mut self, report: &ClosingReport) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let closed_at = report.closed_at.with_timezone(&Local);
        let (path, mut file) = create_report_file(&self.dir, &report_file_stem(closed_at))?;
        file.write_all(render_text(report, &self.store_name, &self.format).as_bytes())?;

        info!(path = %path.display(), "Closing report written");
        self.written = Some(path);
        Ok(())
    }
}

/// `fechamento_DD-MM-YYYY`, dated in local time.
pub fn report_file_stem(closed_at: DateTime<Local>) -> String {
    format!("fechamento_{}", closed_at.format("%d-%m-%Y"))
}

/// Creates the first of `stem.txt`, `stem_2.txt`, ... that does not exist
/// yet, so a second closing on the same day keeps the first report. The
/// file is created exclusively: a name taken between attempts is skipped,
/// never truncated.
fn create_report_file(dir: &Path, stem: &str) -> io::Result<(PathBuf, File)> {
    let candidates = std::iter::once(dir.join(format!("{stem}.txt")))
        .chain((2u32..).map(|n| dir.join(format!("{stem}_{n}.txt"))));

    for path in candidates {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free report name for {stem}"),
    ))
}

pub fn render_text(report: &ClosingReport, store_name: &str, format: &CurrencyFormat) -> String {
    let mut out = String::new();
    let closed_at = report.closed_at.with_timezone(&Local);

    // Writing to a String cannot fail
    let _ = writeln!(out, "Fechamento - {store_name}");
    let _ = writeln!(out, "Data: {}", closed_at.format("%d/%m/%Y %H:%M:%S"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Caixa anterior: {}", format.format(report.prior_cash));
    let _ = writeln!(
        out,
        "Estoque anterior: {}",
        format.format(report.prior_stock_valuation)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Resumo de Vendas Hoje:");

    if report.sales_by_name.is_empty() {
        let _ = writeln!(out, "Nenhuma venda.");
    }
    for (name, tally) in &report.sales_by_name {
        let _ = writeln!(
            out,
            "{name} — Qtd: {} — Total: {}",
            tally.count,
            format.format(tally.total)
        );
    }

    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "TOTAL DO DIA: {}", format.format(report.current_cash));
    out
}
