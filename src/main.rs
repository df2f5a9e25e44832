use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use kstats::{
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{
        Action, CrosstermEventSource, EventSource, FixedTicker, KstatsEvent, Runner, Ticker,
    },
    session::Report,
    ui::SessionView,
    FingerMap, SessionController,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    fs::OpenOptions,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

/// typing tui that measures keystroke latency per finger and hand transition
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type through a word list while every keystroke transition is timed and classified as same finger, different finger on the same hand, or cross-hand."
)]
pub struct Cli {
    /// newline-delimited word source
    words: Option<PathBuf>,

    /// maximum number of characters per line
    #[clap(short = 'w', long)]
    width: Option<usize>,

    /// statistics refresh interval in milliseconds
    #[clap(short = 'r', long)]
    refresh_ms: Option<u64>,

    /// write logs to this file (filter with KSTATS_LOG, default info)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// print the final report as JSON after leaving the terminal UI
    #[clap(long)]
    json: bool,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_env("KSTATS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let store = FileConfigStore::new();
    let config: Config = store
        .load()
        .with_overrides(cli.words.clone(), cli.width, cli.refresh_ms);
    config.validate()?;
    if cli.save_config {
        store.save(&config)?;
    }

    let fingers = FingerMap::qwerty();
    let mut session =
        SessionController::from_path(&config.words_path, config.max_line_width, &fingers)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.refresh_interval()),
    );
    let result = run(&mut terminal, &runner, &mut session);

    // restore the terminal before reporting any error
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let report = result?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Event loop: keypresses and refresh ticks are handled one at a time, so
/// the report never observes a half-applied keypress.
fn run<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    runner: &Runner<E, T>,
    session: &mut SessionController<'_>,
) -> anyhow::Result<Report> {
    let mut report = session.report();

    loop {
        terminal.draw(|f| {
            let view = SessionView {
                session: &*session,
                report: &report,
            };
            f.render_widget(&view, f.area());
        })?;

        match runner.step() {
            KstatsEvent::Tick | KstatsEvent::Resize => {}
            KstatsEvent::Key(key) => match Action::from_key(&key) {
                Some(Action::Quit) => break,
                Some(Action::Type(c)) => {
                    session.on_key_press(c);
                }
                None => continue,
            },
        }
        report = session.report();
    }

    tracing::info!(
        total = session.counters().total,
        correct = session.counters().correct,
        "session closed"
    );
    Ok(session.report())
}
