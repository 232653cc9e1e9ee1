//! `ro export` — write the summary + detail sheet.

use anyhow::Result;
use clap::Args;
use rollout_core::ports::SheetExporter;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::load_project_config;
use crate::output::{pretty_kv, render, OutputMode};
use crate::session;
use crate::sheet::CsvSheetExporter;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// CSV file to write.
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    path: String,
    versions: usize,
    items: usize,
}

pub fn run_export(args: &ExportArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let catalog = session::open_catalog(project_root, &config)?;

    let book = catalog.export_book();
    let report = ExportReport {
        path: args.path.display().to_string(),
        versions: book.summary.len(),
        items: book.detail.len(),
    };
    CsvSheetExporter::new(args.path.clone()).export(&book)?;

    render(output, &report, |r, w| {
        pretty_kv(
            w,
            "exported",
            format!("{} version(s), {} item(s) -> {}", r.versions, r.items, r.path),
        )
    })
}
