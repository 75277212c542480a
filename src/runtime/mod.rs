use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::{App, UiEvent};
use crate::engine::RodioEngine;
use crate::library::{FsMediaIndex, MediaIndex};
use crate::permission::FsAccess;
use crate::poller::TimerThread;

mod event_loop;
mod logging;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "spindle", version)]
#[command(about = "A terminal music player with a library grid and a spinning now-playing view")]
pub struct Args {
    /// Music directory to index. Defaults to `library.root`, then the current directory.
    pub dir: Option<PathBuf>,
    /// Config file to read instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of library grid columns.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=2))]
    pub columns: Option<u16>,
    /// Log filter used when `RUST_LOG` is unset (e.g. `debug`, `spindle=trace`).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let (mut settings, problem) = settings::load_settings(args.config.clone());
    if let Some(columns) = args.columns {
        settings.ui.grid_span = columns;
    }

    let _log_guard = logging::init(&settings.log, args.log_level.as_deref())?;
    settings::report(problem.as_deref());

    let root = args
        .dir
        .clone()
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"));
    info!(version = env!("CARGO_PKG_VERSION"), "starting spindle");

    let fs_index = FsMediaIndex::new(root.clone(), settings.library.clone());
    info!(root = %fs_index.root().display(), "media index ready");
    let collection = fs_index.collection().clone();
    let index: Arc<dyn MediaIndex> = Arc::new(fs_index);

    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>();

    let timer_tx = ui_tx.clone();
    let timer = TimerThread::spawn(move |tick| timer_tx.send(UiEvent::Tick(tick)).is_ok())?;

    let mut app = App::new(
        Arc::clone(&index),
        collection,
        Box::new(FsAccess::new(root)),
        Box::new(timer),
        &settings.ui,
        &settings.controls,
    );

    let engine_tx = ui_tx.clone();
    match RodioEngine::spawn(Arc::clone(&index), &settings.audio, move |event| {
        let _ = engine_tx.send(UiEvent::Engine(event));
    }) {
        Ok(engine) => app.attach_engine(Box::new(engine)),
        Err(e) => {
            warn!(error = %e, "playback disabled");
            app.show_toast(format!("Playback disabled: {e}"));
        }
    }
    app.start();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &ui_rx);

    // Stop and release the engine even when the loop failed.
    app.handle(UiEvent::Quit);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    run_result
}
