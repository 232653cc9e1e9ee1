//! `ro pending` — review the staged batch before committing.

use anyhow::Result;
use clap::Args;
use rollout_core::{ChangeKind, ChangeTarget, PendingChange};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::config::load_project_config;
use crate::output::{pretty_section, render, OutputMode};
use crate::session;

#[derive(Args, Debug, Default)]
pub struct PendingArgs {}

#[derive(Debug, Serialize)]
struct PendingReport {
    staging: bool,
    changes: Vec<PendingLine>,
}

#[derive(Debug, Serialize)]
struct PendingLine {
    kind: String,
    target: String,
    field: Option<String>,
    index: Option<usize>,
    item: String,
    version: String,
    before: serde_json::Value,
    after: serde_json::Value,
}

pub fn run_pending(_args: &PendingArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let catalog = session::open_catalog(project_root, &config)?;

    let report = PendingReport {
        staging: catalog.is_staging(),
        changes: catalog.pending().iter().map(line).collect(),
    };
    render(output, &report, render_pending)
}

fn line(change: &PendingChange) -> PendingLine {
    PendingLine {
        kind: kind_label(change.kind).to_string(),
        target: match change.target {
            ChangeTarget::Version(id) => format!("version {id}"),
            ChangeTarget::Cdu(id) => format!("item {id}"),
        },
        field: change.field.clone(),
        index: change.index,
        item: change.item_label.clone(),
        version: change.version_label.clone(),
        before: change.before.clone(),
        after: change.after.clone(),
    }
}

const fn kind_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Create => "create",
        ChangeKind::Delete => "delete",
        ChangeKind::FieldEdit => "edit",
        ChangeKind::ListAdd => "add",
        ChangeKind::ListRemove => "remove",
    }
}

fn render_pending(report: &PendingReport, w: &mut dyn Write) -> std::io::Result<()> {
    if report.changes.is_empty() {
        return writeln!(w, "no pending changes");
    }
    pretty_section(w, &format!("{} pending change(s)", report.changes.len()))?;
    for change in &report.changes {
        let label = if change.item.is_empty() {
            format!("v{}", change.version)
        } else {
            format!("{} @ v{}", change.item, change.version)
        };
        writeln!(
            w,
            "{:<7} {:<14} {:<24} {} -> {}",
            change.kind,
            change.field.as_deref().unwrap_or("-"),
            label,
            change.before,
            change.after,
        )?;
    }
    Ok(())
}
