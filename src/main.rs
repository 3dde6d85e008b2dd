mod app;
mod config;
mod event;
mod game;
mod input;
mod ui;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use event::{Event, EventHandler};

#[derive(Parser)]
#[command(name = "dung-dodge")]
#[command(about = "Dodge falling obstacles in your terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file overriding geometry and timings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for obstacle placement (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write logs; the terminal itself is the game screen
    #[arg(long, default_value = "dung-dodge.log")]
    log_file: PathBuf,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_file);

    let config = Config::load_or_default(cli.config.as_deref());
    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "dung-dodge starting");

    let mut terminal = enter_terminal()?;
    let result = run(&mut terminal, &config, seed);

    // Always try to restore the terminal, even if the loop failed.
    if let Err(err) = leave_terminal(&mut terminal) {
        tracing::error!(error = %err, "failed to restore terminal");
    }
    result
}

fn run(terminal: &mut Tui, config: &Config, seed: u64) -> Result<()> {
    let mut app = App::new(config, seed);
    let events = EventHandler::new(Duration::from_millis(16)); // ~60 FPS

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        match events.next()? {
            Event::Tick => {}
            Event::Key(key) => app.on_key(key),
        }
        app.on_tick();

        if app.should_quit {
            tracing::info!(score = app.session.score(), "quit");
            return Ok(());
        }
    }
}

fn enter_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn leave_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn init_tracing(path: &Path) {
    let file = match File::create(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("logging disabled, cannot open {}: {err}", path.display());
            return;
        }
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}
