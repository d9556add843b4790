mod config;
mod convert;
mod display;
mod repl;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Print Unix timestamps as local calendar dates, one per line
#[derive(Parser)]
#[command(name = "tsprint", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of <config dir>/tsprint/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        display::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr and are filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load(cli.config.as_deref())?;

    let color = config.color
        && !cli.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }

    // The only place the host zone is chosen; the loop just uses what it is given.
    let mut converter = repl::Converter::new(
        Local,
        io::stdout().lock(),
        config.prompt,
        display::Style::new(color),
    );

    let (tx, rx) = mpsc::sync_channel(repl::INPUT_BACKLOG);

    #[cfg(unix)]
    repl::forward_interrupts(tx.clone(), converter.interrupt_flag())
        .context("failed to install SIGINT handler")?;

    // Left blocked on stdin if the loop stops first; process exit ends it.
    thread::spawn(move || repl::read_lines(io::stdin().lock(), &tx));

    converter.run(rx).context("failed to write to stdout")?;

    debug!(state = ?converter.state(), "stopped");
    Ok(())
}
