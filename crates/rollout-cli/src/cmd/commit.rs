//! `ro commit` — close the staged batch, keeping the applied edits.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::Path;

use crate::config::load_project_config;
use crate::output::{pretty_kv, render, OutputMode};
use crate::session;

#[derive(Args, Debug, Default)]
pub struct CommitArgs {}

#[derive(Debug, Serialize)]
struct CommitReport {
    committed: usize,
}

pub fn run_commit(_args: &CommitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let mut catalog = session::open_catalog(project_root, &config)?;

    let applied = catalog.commit_changes();
    session::save_catalog(project_root, &config, &catalog)?;

    let report = CommitReport {
        committed: applied.len(),
    };
    render(output, &report, |r, w| {
        pretty_kv(w, "committed", format!("{} change(s)", r.committed))
    })
}
