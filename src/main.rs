//! bue-admin binary entry point.
//!
//! Parses settings, sends logs to a file, puts the terminal in raw mode,
//! runs the TUI event loop and restores the terminal on exit.
//!
use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use bue_admin::app;
use bue_admin::config::{Cli, Settings};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> bue_admin::Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();
}

/// Send logs to `cli.log_file`; `RUST_LOG` overrides the `-v` level.
fn init_logging(cli: &Cli) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("open log file {}", cli.log_file))?;
    let filter = EnvFilter::builder().with_default_directive(cli.log_level().into()).from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut settings = Settings::load_or_init(&cli.config);
    settings.apply_cli(&cli);
    settings.validate()?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let mut terminal = init_terminal().context("init terminal")?;
    let res = app::run(&mut terminal, &settings, shutdown.clone()).await;
    shutdown.cancel();
    restore_terminal(&mut terminal);

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err:#}");
    }
    Ok(())
}
