// SPDX-License-Identifier: MIT OR Apache-2.0

//! `actoriac`: load an inventory and a workflow document, run the main
//! workflow to completion through a [`GroupBinding`], and exit with the
//! status the session ended in.
//!
//! Exit codes: `0` session COMPLETED, `1` session FAILED, `2` the run
//! never reached a session (bad inventory/workflow, I/O failure).

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use actoriac_actor::{GroupBinding, OutputKind, OutputMultiplexer};
use actoriac_core::{Clock, ConfigError, SystemClock};
use actoriac_store::{SessionStore, StoreError};
use actoriac_workflow::{load_workflow, parse_inventory, ActionDispatcher};

/// The union of failure modes that can abort a run before a session status
/// is reached: a bad inventory/workflow document, or a session-store I/O
/// failure. Distinct from [`actoriac_core::IacError`], which that crate
/// cannot extend with a store-crate variant without an upward dependency.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "actoriac", version, about = "Run declarative workflows against SSH-reachable hosts")]
struct Args {
    /// Path to the main workflow document (YAML or JSON).
    #[arg(long)]
    workflow: PathBuf,

    /// Path to an INI-like inventory file.
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Directory holding per-workflow overlay documents.
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Restrict execution to these hosts (comma-separated).
    #[arg(long, value_delimiter = ',')]
    limit: Option<Vec<String>>,

    /// Emit DEBUG-level logs to stderr.
    #[arg(long)]
    verbose: bool,

    /// Prompt for a sudo password and export it as `SUDO_PASSWORD`.
    #[arg(long)]
    ask_pass: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// `$XDG_DATA_HOME/actoriac/sessions`, falling back to a relative
/// `.actoriac/sessions` when no data directory can be resolved.
fn session_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("actoriac").join("sessions"))
        .unwrap_or_else(|| PathBuf::from(".actoriac/sessions"))
}

fn drain_output(output: &OutputMultiplexer) {
    let mut sources = output.sources();
    sources.sort();
    for source in sources {
        for line in output.lines_for(&source) {
            match line.kind {
                OutputKind::Stderr => eprintln!("{source}: {}", line.text),
                OutputKind::Stdout | OutputKind::Info => println!("{source}: {}", line.text),
            }
        }
    }
}

async fn run() -> Result<bool, CliError> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.ask_pass {
        let password = rpassword::prompt_password("sudo password: ")?;
        std::env::set_var("SUDO_PASSWORD", password);
    }

    let inventory_name = args
        .inventory
        .as_ref()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned());
    let inventory = match &args.inventory {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Some(parse_inventory(&text)?)
        }
        None => None,
    };

    let document = load_workflow(&args.workflow, args.overlay.as_deref())?;
    let workflow_base_dir =
        args.workflow.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    let clock = SystemClock;
    let store = SessionStore::open(session_dir())?;
    let output = Arc::new(OutputMultiplexer::new());

    let node_count = inventory.as_ref().and_then(|inv| inv.hosts_in(None).ok()).map(|h| h.len());
    let cwd = std::env::current_dir()?.display().to_string();
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let overlay_name = args.overlay.as_ref().map(|p| p.display().to_string());

    let session_id = store.start_session(
        document.name.clone(),
        overlay_name,
        inventory_name,
        node_count,
        cwd,
        command_line,
        clock.epoch_ms(),
    )?;

    let mut group = GroupBinding::new(
        inventory,
        args.limit,
        store,
        output.clone(),
        session_id,
        workflow_base_dir,
        args.overlay,
        document,
        clock,
    );

    let (result, status) = group.run_main_workflow().await;
    group.dispatch("this", "printSessionSummary", &[]).await;
    drain_output(&output);
    println!("{status:?}: {}", result.result);

    Ok(result.success)
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("actoriac: {e}");
            ExitCode::from(2)
        }
    }
}
