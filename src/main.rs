//! # docnav
//!
//! Incremental filtering and expand/collapse navigation for static
//! documentation sidebars.
//!
//! ## Usage
//!
//! Launch the interactive search view:
//! ```sh
//! docnav target/doc/index.html
//! ```
//!
//! Show the indexed tree:
//! ```sh
//! docnav --tree index.html
//! ```
//!
//! Run one query:
//! ```sh
//! docnav -q setup:install index.html
//! ```

mod cli;

use clap::Parser as ClapParser;
use cli::{Cli, OutputFormat};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use docnav::{Config, NavTree, Session};
use indextree::NodeId;
use serde_json::json;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();
    init_logging(args.verbose, args.is_interactive());

    let config = load_config(&args)?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let Some(file) = args.file.clone() else {
        eprintln!("Error: documentation page argument is required");
        eprintln!("\nUsage: docnav [OPTIONS] <FILE>");
        eprintln!("       docnav --tree <FILE>");
        eprintln!("       docnav -q <QUERY> <FILE>");
        process::exit(1);
    };

    let mut session = Session::load(&file, &config)
        .wrap_err_with(|| format!("failed to index {}", file.display()))?;

    if args.is_interactive() {
        return run_tui(session, config, file);
    }

    if let Some(ref query) = args.query {
        let outcome = session.set_query(query);
        print_query(&session, &outcome, &args.output)?;
    } else if args.tree {
        print_tree(session.tree(), &args.output)?;
    }

    Ok(())
}

/// Resolve config: explicit path > default location > defaults, then CLI overrides.
fn load_config(args: &Cli) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load(),
    };

    config.index.skipped_categories.extend(args.skip.iter().cloned());
    if let Some(min) = args.min_query_len {
        config.search.min_query_len = min;
    }
    if args.no_animation {
        config.animation.enabled = false;
    }

    Ok(config)
}

/// Log to stderr in CLI mode; in TUI mode log to a file so the alternate
/// screen stays clean. `DOCNAV_LOG` overrides the level.
fn init_logging(verbose: u8, interactive: bool) {
    let level = match verbose {
        0 if interactive => "info",
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("DOCNAV_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("docnav={}", level)));

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    // Without a writable log file the TUI runs without logging
    let Some(file) = log_file_path().and_then(|path| open_log_file(&path)) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn log_file_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("docnav").join("docnav.log"))
}

fn open_log_file(path: &Path) -> Option<std::fs::File> {
    std::fs::create_dir_all(path.parent()?).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}

fn run_tui(session: Session, config: Config, file: PathBuf) -> Result<()> {
    let file_path = file.canonicalize().unwrap_or(file);

    enable_raw_mode().inspect_err(|e| {
        eprintln!("Failed to enable raw mode: {}", e);
    })?;
    stdout().execute(EnterAlternateScreen).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;

    let backend = ratatui::backend::CrosstermBackend::new(stdout());
    let mut terminal = ratatui::Terminal::new(backend).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;

    let app = docnav::tui::App::new(session, config, file_path);
    let result = docnav::tui::run(&mut terminal, app);

    // Cleanup terminal state
    stdout().execute(LeaveAlternateScreen).ok();
    disable_raw_mode().ok();

    result
}

fn print_query(
    session: &Session,
    outcome: &docnav::FilterOutcome,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            for row in session.rows() {
                let marker = match (row.expandable, row.open) {
                    (true, true) => "▼ ",
                    (true, false) => "▶ ",
                    (false, _) => "  ",
                };
                println!("{}{}{}", "  ".repeat(row.depth), marker, row.name);
            }
        }
        OutputFormat::Tree => {
            let tree = session.tree();
            let state = session.state();
            print!(
                "{}",
                tree.render_filtered(|id| state.is_shown(tree.node(id).element))
            );
        }
        OutputFormat::Json => {
            let output = json!({
                "query": outcome.query,
                "policy": outcome.policy,
                "matched": outcome.matched,
                "nodes": session.rows(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_tree(tree: &NavTree, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Tree | OutputFormat::Plain => print!("{}", tree.render_tree()),
        OutputFormat::Json => {
            let nodes: Vec<_> = tree
                .children(tree.root())
                .map(|id| node_json(tree, id))
                .collect();
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
    }
    Ok(())
}

fn node_json(tree: &NavTree, id: NodeId) -> serde_json::Value {
    let node = tree.node(id);
    let children: Vec<_> = tree.children(id).map(|c| node_json(tree, c)).collect();
    json!({
        "name": node.name,
        "label": node.label,
        "kind": node.kind,
        "expandable": node.expandable,
        "keep_expanded": node.keep_expanded,
        "children": children,
    })
}
