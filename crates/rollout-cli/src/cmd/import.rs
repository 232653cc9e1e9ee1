//! `ro import` — replace the collection from a CSV sheet.

use anyhow::{bail, Result};
use clap::Args;
use rollout_core::ports::SheetImporter;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::load_project_config;
use crate::output::{pretty_kv, render, render_error, CliError, OutputMode};
use crate::session;
use crate::sheet::CsvSheetImporter;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import.
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ImportReport {
    versions: usize,
    items: usize,
    production_version_id: Option<u64>,
}

pub fn run_import(args: &ImportArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let mut catalog = session::open_catalog(project_root, &config)?;

    // Parse first; nothing touches the store until the whole sheet is in.
    let bundle = match CsvSheetImporter::new(args.path.clone()).import() {
        Ok(bundle) => bundle,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("import failed: {err}"),
                    "fix the sheet and retry; the store was not modified",
                    "import_failed",
                ),
            )?;
            bail!("import failed");
        }
    };

    let report = ImportReport {
        versions: bundle.versions.len(),
        items: bundle.versions.iter().map(|v| v.cdus.len()).sum(),
        production_version_id: bundle.production_version_id,
    };
    catalog.replace_all(bundle.versions, bundle.production_version_id);
    session::save_catalog(project_root, &config, &catalog)?;

    render(output, &report, |r, w| {
        pretty_kv(
            w,
            "imported",
            format!("{} version(s), {} item(s)", r.versions, r.items),
        )
    })
}
