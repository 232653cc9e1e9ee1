//! `ro discard` — close the staged batch, rolling back to the snapshot.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use std::path::Path;

use crate::config::load_project_config;
use crate::output::{pretty_kv, render, render_error, CliError, OutputMode};
use crate::session;

#[derive(Args, Debug, Default)]
pub struct DiscardArgs {}

#[derive(Debug, Serialize)]
struct DiscardReport {
    discarded: usize,
}

pub fn run_discard(_args: &DiscardArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let mut catalog = session::open_catalog(project_root, &config)?;

    let dropped = match catalog.discard_changes() {
        Ok(dropped) => dropped,
        Err(err) => {
            // The staged content is intact; persist it so nothing is lost.
            session::save_catalog(project_root, &config, &catalog)?;
            render_error(
                output,
                &CliError::with_details(
                    format!("rollback failed: {err}"),
                    "the staged batch is still open; fix the session file and retry",
                    "rollback_failed",
                ),
            )?;
            bail!("rollback failed");
        }
    };
    session::save_catalog(project_root, &config, &catalog)?;

    let report = DiscardReport {
        discarded: dropped.len(),
    };
    render(output, &report, |r, w| {
        pretty_kv(w, "discarded", format!("{} change(s)", r.discarded))
    })
}
