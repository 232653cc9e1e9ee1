//! `ro init` — create the `.rollout/` project directory.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::Path;

use crate::config::ProjectConfig;
use crate::output::{pretty_kv, render, OutputMode};

#[derive(Args, Debug, Default)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
struct InitReport {
    root: String,
    created: bool,
}

pub fn run_init(_args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let dir = project_root.join(".rollout");
    let created = if dir.is_dir() {
        false
    } else {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        let config = toml::to_string_pretty(&ProjectConfig::default())
            .context("encoding default config")?;
        std::fs::write(dir.join("config.toml"), config)
            .with_context(|| format!("writing {}", dir.join("config.toml").display()))?;
        tracing::info!(root = %project_root.display(), "project initialized");
        true
    };

    let report = InitReport {
        root: project_root.display().to_string(),
        created,
    };
    render(output, &report, |r, w| {
        if r.created {
            pretty_kv(w, "initialized", &r.root)
        } else {
            pretty_kv(w, "already set up", &r.root)
        }
    })
}
