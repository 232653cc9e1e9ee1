//! `ro stats` — per-status totals, raw and unique.

use anyhow::Result;
use clap::Args;
use rollout_core::stats::StatusCounts;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::config::load_project_config;
use crate::output::{pretty_section, render, OutputMode};
use crate::session;

#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub versions: usize,
    pub raw: StatusCounts,
    pub unique: StatusCounts,
}

pub fn run_stats(_args: &StatsArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let catalog = session::open_catalog(project_root, &config)?;

    let report = StatsReport {
        versions: catalog.versions().len(),
        raw: catalog.stats_raw(),
        unique: catalog.stats_unique(),
    };
    render(output, &report, render_stats)
}

fn render_stats(report: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("{} version(s)", report.versions))?;
    writeln!(w, "{:<24} {:>6} {:>8}", "status", "raw", "unique")?;
    for ((status, raw), (_, unique)) in report
        .raw
        .entries()
        .into_iter()
        .zip(report.unique.entries())
    {
        writeln!(w, "{:<24} {:>6} {:>8}", status.to_string(), raw, unique)?;
    }
    writeln!(
        w,
        "{:<24} {:>6} {:>8}",
        "total",
        report.raw.total(),
        report.unique.total()
    )
}
