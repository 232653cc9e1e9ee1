#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;
mod session;
mod sheet;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputMode;
use rollout_core::window::WindowParams;
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "rollout: deployment-version tracker with staged, reviewable edits",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        OutputMode::resolve(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Initialize a rollout project in the current directory")]
    Init(cmd::init::InitArgs),

    #[command(about = "Version lifecycle: add, duplicate, remove, list, production marker")]
    Version(cmd::version::VersionArgs),

    #[command(about = "Work item lifecycle: add, edit, remove, parties, observations")]
    Cdu(cmd::cdu::CduArgs),

    #[command(about = "Categorized version notes")]
    Comment(cmd::comment::CommentArgs),

    #[command(about = "Review the staged batch")]
    Pending(cmd::pending::PendingArgs),

    #[command(about = "Commit the staged batch")]
    Commit(cmd::commit::CommitArgs),

    #[command(about = "Discard the staged batch, rolling back to the snapshot")]
    Discard(cmd::discard::DiscardArgs),

    #[command(about = "Per-status totals, raw and unique")]
    Stats(cmd::stats::StatsArgs),

    #[command(about = "Flat work-item listing")]
    List(cmd::list::ListArgs),

    #[command(about = "Replace the collection from a CSV sheet")]
    Import(cmd::import::ImportArgs),

    #[command(about = "Export the summary + detail sheet")]
    Export(cmd::export::ExportArgs),

    #[command(about = "Interactive windowed work-item table")]
    Tui {
        /// Restrict the table to one version id.
        #[arg(long)]
        version: Option<u64>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROLLOUT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "rollout=debug,info"
        } else {
            "rollout=info,warn"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn run_tui(version: Option<u64>) -> Result<()> {
    let project_root = std::env::current_dir()?;
    let config = config::load_project_config(&project_root)?;
    let mut catalog = session::open_catalog(&project_root, &config)?;

    let params = WindowParams::new(
        config.ui.row_height,
        config.ui.visible_rows,
        config.ui.buffer_rows,
    );
    tui::table::run_table_tui(&mut catalog, version, params)?;

    // Whatever was staged (or committed) in the session is persisted.
    session::save_catalog(&project_root, &config, &catalog)
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode();

    match cli.command {
        Commands::Init(args) => cmd::init::run_init(&args, output, &project_root),
        Commands::Version(args) => cmd::version::run_version(&args, output, &project_root),
        Commands::Cdu(args) => cmd::cdu::run_cdu(&args, output, &project_root),
        Commands::Comment(args) => cmd::comment::run_comment(&args, output, &project_root),
        Commands::Pending(args) => cmd::pending::run_pending(&args, output, &project_root),
        Commands::Commit(args) => cmd::commit::run_commit(&args, output, &project_root),
        Commands::Discard(args) => cmd::discard::run_discard(&args, output, &project_root),
        Commands::Stats(args) => cmd::stats::run_stats(&args, output, &project_root),
        Commands::List(args) => cmd::list::run_list(&args, output, &project_root),
        Commands::Import(args) => cmd::import::run_import(&args, output, &project_root),
        Commands::Export(args) => cmd::export::run_export(&args, output, &project_root),
        Commands::Tui { version } => run_tui(version),
    }
}
