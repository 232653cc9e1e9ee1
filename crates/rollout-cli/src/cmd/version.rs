//! `ro version` — version lifecycle: add, duplicate, remove, list, and
//! the production marker toggle.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use rollout_core::DuplicateIdentity;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use super::now_us;
use crate::config::load_project_config;
use crate::output::{pretty_kv, pretty_section, render, OutputMode};
use crate::session;

#[derive(Args, Debug)]
pub struct VersionArgs {
    #[command(subcommand)]
    pub command: VersionCommand,
}

#[derive(Subcommand, Debug)]
pub enum VersionCommand {
    /// Create a version.
    Add {
        /// Display number, e.g. "12.4.1".
        number: String,
        /// Deployment date (free-form, e.g. 2024-05-02).
        #[arg(long, default_value = "")]
        date: String,
        /// Deployment time (free-form, e.g. 21:30).
        #[arg(long, default_value = "")]
        time: String,
    },
    /// Duplicate a version's work items into a new version.
    Dup {
        /// Source version id.
        id: u64,
        /// Display number for the copy.
        number: String,
        /// Mint fresh uuids instead of sharing logical identity.
        #[arg(long)]
        fresh_uuids: bool,
    },
    /// Delete a version and its whole item subtree.
    Rm {
        id: u64,
    },
    /// Toggle the production marker on a version.
    Prod {
        id: u64,
    },
    /// List all versions.
    List,
}

#[derive(Debug, Serialize)]
struct VersionRow {
    id: u64,
    number: String,
    date: String,
    items: usize,
    production: bool,
}

pub fn run_version(args: &VersionArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let mut catalog = session::open_catalog(project_root, &config)?;

    match &args.command {
        VersionCommand::Add { number, date, time } => {
            let id = catalog.create_version(number, date, time, now_us());
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "id": id, "number": number }), |_, w| {
                pretty_kv(w, "created", format!("version {number} (id {id})"))
            })
        }
        VersionCommand::Dup {
            id,
            number,
            fresh_uuids,
        } => {
            let identity = if *fresh_uuids {
                DuplicateIdentity::Fresh
            } else {
                DuplicateIdentity::Shared
            };
            let Some(copy) = catalog.duplicate_version(*id, number, identity, now_us()) else {
                bail!("version {id} not found");
            };
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "id": copy, "number": number }), |_, w| {
                pretty_kv(w, "duplicated", format!("version {id} -> {number} (id {copy})"))
            })
        }
        VersionCommand::Rm { id } => {
            if !catalog.delete_version(*id, now_us()) {
                bail!("version {id} not found");
            }
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "removed": id }), |_, w| {
                pretty_kv(w, "removed", format!("version {id}"))
            })
        }
        VersionCommand::Prod { id } => {
            let Some(marker) = catalog.toggle_production(*id, now_us()) else {
                bail!("version {id} not found");
            };
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "production": marker }), |_, w| {
                match marker {
                    Some(id) => pretty_kv(w, "production", format!("version {id}")),
                    None => pretty_kv(w, "production", "none"),
                }
            })
        }
        VersionCommand::List => {
            let production = catalog.production_version_id();
            let rows: Vec<VersionRow> = catalog
                .versions()
                .iter()
                .map(|v| VersionRow {
                    id: v.id,
                    number: v.number.clone(),
                    date: v.deploy_date.clone(),
                    items: v.cdus.len(),
                    production: production == Some(v.id),
                })
                .collect();
            render(output, &rows, render_version_table)
        }
    }
}

fn render_version_table(rows: &Vec<VersionRow>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "versions")?;
    for row in rows {
        writeln!(
            w,
            "{:>4}  {:<12} {:<12} {:>3} items{}",
            row.id,
            row.number,
            row.date,
            row.items,
            if row.production { "  [production]" } else { "" },
        )?;
    }
    Ok(())
}
