use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kanban_client::{
    api::{HttpTaskApi, TaskApi},
    board_view::BoardView,
    config::Args,
    kanban_board::BoardController,
    ui::{self, TerminalPrompter},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::File, io, sync::Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;
    info!(api = args.base_url(), "kanban board starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;

    let api = HttpTaskApi::new(args.base_url(), args.timeout())
        .context("failed to build HTTP client")?;
    match runtime.block_on(api.health()) {
        Ok(message) => info!(%message, "backend reachable"),
        Err(err) => warn!(error = %err, "backend health check failed"),
    }

    let mut controller =
        BoardController::new(api, TerminalPrompter, BoardView::full(), args.base_url());
    // Initial page-load fetch; failures are already on the board as a diagnostic.
    if let Err(err) = runtime.block_on(controller.load()) {
        warn!(error = %err, "initial load failed");
    }

    // Terminal setup
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &runtime, &mut controller);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("kanban board stopped");
    result.context("board event loop failed")
}

fn init_tracing(args: &Args) -> anyhow::Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("failed to open log file {}", args.log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
