//! # glyphterm
//!
//! Opens a window sized for the configured grid, starts the login shell on
//! a pseudo-terminal and draws its output with a bitmap font.

use anyhow::{Context, Result};
use clap::Parser as _;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

use glyphterm::{
    spawn_terminal, Cli, ExitReason, FrontendEvent, ProxyPresenter, Terminal, WindowApp,
};
use glyphterm_core::{Event, TermConfig};
use glyphterm_emulator::Parser;
use glyphterm_render::{FontAtlas, Padding, Renderer};
use glyphterm_session::{EventBridge, InputEncoder, Session, DEFAULT_SHUTDOWN_GRACE};

fn main() {
    if let Err(e) = start() {
        eprintln!("{}", fatal_message(&e));
        std::process::exit(1);
    }
}

/// Load the configuration, set up logging, then run.
///
/// Configuration errors happen before any subscriber exists, so they are
/// only reported on stderr by `main`.
fn start() -> Result<()> {
    let config = load_config(&Cli::parse())?;
    init_logging(&config.log_level);
    run(config).inspect_err(|e| tracing::error!("{:#}", e))
}

fn load_config(cli: &Cli) -> Result<TermConfig> {
    cli.load_config().context("Invalid configuration")
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

/// One-line diagnostic printed for fatal errors.
fn fatal_message(err: &anyhow::Error) -> String {
    format!("glyphterm: {:#}", err)
}

fn run(config: TermConfig) -> Result<()> {
    tracing::info!("glyphterm v{} starting", env!("CARGO_PKG_VERSION"));

    let dimensions = config.dimensions();
    let atlas = FontAtlas::from_settings(&config.font).context("Failed to load font atlas")?;
    let renderer = Renderer::new(dimensions, atlas, Padding::from(&config.window));
    let frame_size = renderer.frame_size();

    let event_loop = EventLoop::<FrontendEvent>::with_user_event()
        .build()
        .context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let proxy = event_loop.create_proxy();

    let (events, receiver) = EventBridge::new();
    let (mut session, writer) = Session::open(dimensions, &config.terminal, events.clone())
        .context("Failed to start shell")?;

    let terminal = Terminal::new(
        Parser::init(dimensions),
        renderer,
        InputEncoder::new(config.terminal.arrow_layout),
        writer,
        ProxyPresenter::new(proxy.clone()),
    )?;
    let handle =
        spawn_terminal(terminal, receiver, proxy).context("Failed to start terminal thread")?;

    let mut app = WindowApp::new(config.window.title.clone(), frame_size, events.clone());
    let loop_result = event_loop.run_app(&mut app);

    // Unblock the terminal thread if the window went away first
    let _ = events.push(Event::Quit);
    let window_error = app.take_error();
    drop(app);
    drop(events);

    let outcome = match handle.join() {
        Ok(outcome) => outcome,
        Err(_) => anyhow::bail!("Terminal thread panicked"),
    };
    session.shutdown(DEFAULT_SHUTDOWN_GRACE)?;

    loop_result.context("Window event loop failed")?;
    if let Some(e) = window_error {
        return Err(e).context("Window failed");
    }
    match outcome? {
        ExitReason::Quit => tracing::info!("Window closed, shell terminated"),
        ExitReason::ChildExited => tracing::info!(
            "Shell exited with status {:?}",
            session.exit_status()
        ),
    }
    Ok(())
}
