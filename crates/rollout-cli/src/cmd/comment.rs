//! `ro comment` — categorized version notes.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use rollout_core::model::CommentCategory;
use std::path::Path;
use std::str::FromStr;

use super::now_us;
use crate::config::load_project_config;
use crate::output::{pretty_kv, render, OutputMode};
use crate::session;

#[derive(Args, Debug)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub command: CommentCommand,
}

#[derive(Subcommand, Debug)]
pub enum CommentCommand {
    /// Add a note to a version under a category.
    Add {
        version_id: u64,
        /// One of: improvements, releases, hot-fixes, general.
        category: String,
        text: String,
    },
    /// Remove a note by category and index.
    Rm {
        version_id: u64,
        category: String,
        index: usize,
    },
}

pub fn run_comment(args: &CommentArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let config = load_project_config(project_root)?;
    let mut catalog = session::open_catalog(project_root, &config)?;

    match &args.command {
        CommentCommand::Add {
            version_id,
            category,
            text,
        } => {
            let category = CommentCategory::from_str(category)?;
            let Some(index) = catalog.add_comment(*version_id, category, text, now_us()) else {
                bail!("version {version_id} not found");
            };
            session::save_catalog(project_root, &config, &catalog)?;
            render(
                output,
                &serde_json::json!({ "version": version_id, "category": category, "index": index }),
                |_, w| pretty_kv(w, "staged", format!("{category} note on version {version_id}")),
            )
        }
        CommentCommand::Rm {
            version_id,
            category,
            index,
        } => {
            let category = CommentCategory::from_str(category)?;
            if !catalog.delete_comment(*version_id, category, *index, now_us()) {
                bail!("version {version_id} has no {category} note at index {index}");
            }
            session::save_catalog(project_root, &config, &catalog)?;
            render(
                output,
                &serde_json::json!({ "version": version_id, "category": category, "index": index }),
                |_, w| pretty_kv(w, "removed", format!("{category} note {index}")),
            )
        }
    }
}
