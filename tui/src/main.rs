//! buddy TUI Entry Point
//!
//! Usage:
//!   buddy-tui [OPTIONS]
//!
//! Options:
//!   --base-url <URL>             Chat relay (default: http://localhost:5000)
//!   --typewriter-delay-ms <MS>   Delay between typed characters
//!   --sound                      Ring the terminal bell while typing
//!   --config <FILE>              Configuration file
//!
//! Logs go to a file (`--log-file`, default `buddy-tui.log` in the temp
//! directory); filter them with `RUST_LOG`.

use std::fs::File;
use std::io;
use std::panic;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use buddy_tui::{App, Cli};
use presenter_core::config::{default_config_path, load_config_from_path};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: buddy-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin/stdout are piped, or SSH ran without -t.");
        std::process::exit(1);
    }

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("buddy-tui.log"));
    init_logging(&log_path)?;

    let config_path = cli.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("failed to load configuration")?;
    cli.to_overrides()
        .apply(&mut config)
        .context("invalid command-line settings")?;
    tracing::info!(
        source = ?config.source(),
        file = ?config.config_file_path,
        base_url = %config.transport.base_url,
        "configuration loaded"
    );

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut app = App::new(&config)?;

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file: {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    Ok(())
}
