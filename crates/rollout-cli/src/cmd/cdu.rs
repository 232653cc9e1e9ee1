//! `ro cdu` — work item lifecycle: add, field edits, removal, party and
//! observation list edits, and a detail view.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use rollout_core::model::{Party, Role, Status};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use super::now_us;
use crate::config::load_project_config;
use crate::output::{pretty_kv, pretty_section, render, OutputMode};
use crate::session;

#[derive(Args, Debug)]
pub struct CduArgs {
    #[command(subcommand)]
    pub command: CduCommand,
}

#[derive(Subcommand, Debug)]
pub enum CduCommand {
    /// Create a work item in a version.
    Add {
        /// Owning version id.
        version_id: u64,
        name: String,
    },
    /// Edit one or more fields of a work item.
    Set {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// One of: in-development, pending-certification, certified-ok,
        /// in-production.
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a work item.
    Rm {
        id: u64,
    },
    /// Add a responsible party, or remove one by index with --remove.
    Party {
        id: u64,
        /// Party name (required unless --remove).
        name: Option<String>,
        /// One of: dev, analysis-functional, ux, analyst, qa.
        #[arg(long, default_value = "dev")]
        role: String,
        /// Remove the party at this index instead of adding.
        #[arg(long)]
        remove: Option<usize>,
    },
    /// Add a free-text observation, or remove one by index with --remove.
    Note {
        id: u64,
        text: Option<String>,
        #[arg(long)]
        remove: Option<usize>,
    },
    /// Show a work item with its history.
    Show {
        id: u64,
    },
}

pub fn run_cdu(args: &CduArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let mut catalog = session::open_catalog(project_root, &config)?;

    match &args.command {
        CduCommand::Add { version_id, name } => {
            let Some(id) = catalog.create_cdu(*version_id, name, now_us()) else {
                bail!("version {version_id} not found");
            };
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "id": id, "name": name }), |_, w| {
                pretty_kv(w, "created", format!("{name} (id {id})"))
            })
        }
        CduCommand::Set {
            id,
            name,
            description,
            status,
        } => {
            if name.is_none() && description.is_none() && status.is_none() {
                bail!("nothing to set: pass --name, --description and/or --status");
            }
            // Parse everything before staging anything.
            let status = status.as_deref().map(Status::from_str).transpose()?;
            let now = now_us();
            let mut edits = 0usize;
            if let Some(name) = name {
                if catalog.set_cdu_name(*id, name, now) {
                    edits += 1;
                }
            }
            if let Some(description) = description {
                if catalog.set_cdu_description(*id, description, now) {
                    edits += 1;
                }
            }
            if let Some(status) = status {
                if catalog.set_cdu_status(*id, status, now) {
                    edits += 1;
                }
            }
            if edits == 0 {
                bail!("work item {id} not found");
            }
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "id": id, "edits": edits }), |_, w| {
                pretty_kv(w, "staged", format!("{edits} edit(s) on item {id}"))
            })
        }
        CduCommand::Rm { id } => {
            if !catalog.delete_cdu(*id, now_us()) {
                bail!("work item {id} not found");
            }
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "removed": id }), |_, w| {
                pretty_kv(w, "removed", format!("work item {id}"))
            })
        }
        CduCommand::Party {
            id,
            name,
            role,
            remove,
        } => {
            let now = now_us();
            if let Some(index) = remove {
                if !catalog.remove_party(*id, *index, now) {
                    bail!("work item {id} has no party at index {index}");
                }
            } else {
                let Some(name) = name else {
                    bail!("party name required (or use --remove <index>)");
                };
                let party = Party {
                    name: name.clone(),
                    role: Role::from_str(role)?,
                };
                if catalog.add_party(*id, party, now).is_none() {
                    bail!("work item {id} not found");
                }
            }
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "id": id }), |_, w| {
                pretty_kv(w, "staged", format!("party edit on item {id}"))
            })
        }
        CduCommand::Note { id, text, remove } => {
            let now = now_us();
            if let Some(index) = remove {
                if !catalog.remove_observation(*id, *index, now) {
                    bail!("work item {id} has no observation at index {index}");
                }
            } else {
                let Some(text) = text else {
                    bail!("observation text required (or use --remove <index>)");
                };
                if catalog.add_observation(*id, text, now).is_none() {
                    bail!("work item {id} not found");
                }
            }
            session::save_catalog(project_root, &config, &catalog)?;
            render(output, &serde_json::json!({ "id": id }), |_, w| {
                pretty_kv(w, "staged", format!("observation edit on item {id}"))
            })
        }
        CduCommand::Show { id } => {
            let Some((version, cdu)) = catalog.store().locate_cdu(*id) else {
                bail!("work item {id} not found");
            };
            let detail = CduDetail {
                id: cdu.id,
                uuid: cdu.uuid.as_str().to_string(),
                name: cdu.name.clone(),
                description: cdu.description.clone(),
                status: cdu.status.to_string(),
                version: version.number.clone(),
                parties: cdu
                    .parties
                    .iter()
                    .map(|p| format!("{} ({})", p.name, p.role))
                    .collect(),
                observations: cdu.observations.clone(),
                history: cdu
                    .history
                    .iter()
                    .map(|h| HistoryLine {
                        kind: h.kind.to_string(),
                        field: h.field.clone(),
                        before: h.before.clone(),
                        after: h.after.clone(),
                    })
                    .collect(),
            };
            render(output, &detail, render_detail)
        }
    }
}

#[derive(Debug, Serialize)]
struct CduDetail {
    id: u64,
    uuid: String,
    name: String,
    description: String,
    status: String,
    version: String,
    parties: Vec<String>,
    observations: Vec<String>,
    history: Vec<HistoryLine>,
}

#[derive(Debug, Serialize)]
struct HistoryLine {
    kind: String,
    field: Option<String>,
    before: Option<String>,
    after: Option<String>,
}

fn render_detail(detail: &CduDetail, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("{} (id {})", detail.name, detail.id))?;
    pretty_kv(w, "version", &detail.version)?;
    pretty_kv(w, "status", &detail.status)?;
    pretty_kv(w, "uuid", &detail.uuid)?;
    if !detail.description.is_empty() {
        pretty_kv(w, "description", &detail.description)?;
    }
    for party in &detail.parties {
        pretty_kv(w, "party", party)?;
    }
    for note in &detail.observations {
        pretty_kv(w, "note", note)?;
    }
    if !detail.history.is_empty() {
        writeln!(w, "history:")?;
        for line in &detail.history {
            writeln!(
                w,
                "  {} {} {} -> {}",
                line.kind,
                line.field.as_deref().unwrap_or("-"),
                line.before.as_deref().unwrap_or("-"),
                line.after.as_deref().unwrap_or("-"),
            )?;
        }
    }
    Ok(())
}
