//! `ro list` — flat work-item listing across versions.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::config::load_project_config;
use crate::output::{pretty_section, render, OutputMode};
use crate::session;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only items of this version id.
    #[arg(long)]
    pub version: Option<u64>,
    /// Only items with this status.
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
struct ItemRow {
    id: u64,
    version: String,
    name: String,
    status: String,
    uuid: String,
}

pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let catalog = session::open_catalog(project_root, &config)?;

    let rows: Vec<ItemRow> = catalog
        .versions()
        .iter()
        .filter(|v| args.version.is_none_or(|id| v.id == id))
        .flat_map(|version| {
            version.cdus.iter().map(|cdu| ItemRow {
                id: cdu.id,
                version: version.number.clone(),
                name: cdu.name.clone(),
                status: cdu.status.to_string(),
                uuid: cdu.uuid.as_str().to_string(),
            })
        })
        .filter(|row| {
            args.status
                .as_deref()
                .is_none_or(|wanted| row.status == wanted)
        })
        .collect();

    render(output, &rows, render_items)
}

fn render_items(rows: &Vec<ItemRow>, w: &mut dyn Write) -> std::io::Result<()> {
    if rows.is_empty() {
        return writeln!(w, "no work items");
    }
    pretty_section(w, &format!("{} work item(s)", rows.len()))?;
    for row in rows {
        writeln!(
            w,
            "{:>4}  {:<10} {:<24} {}",
            row.id, row.version, row.name, row.status
        )?;
    }
    Ok(())
}
