use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc,
    time::Duration,
};

use study_casino::{
    app::{App, Control, Settings, TICK_RATE_MS},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{self, ChannelEventSource, FixedTicker, Runner},
    stats::{export_csv, MemoryStatsStore, Report, SqliteStatsStore, StatsStore},
    ui,
};

/// spin the wheel, study the subject it lands on, prove it
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "study-casino",
    version,
    about,
    long_about = "A study timer with a casino twist: spin a roulette wheel for a subject and a duration, study until the countdown ends, write down what you learned, and collect tokens, streaks and achievements."
)]
pub struct Cli {
    /// sessions per week to aim for (overrides the config file)
    #[clap(short = 'g', long)]
    weekly_goal: Option<u32>,

    /// tokens awarded per completed session (overrides the config file)
    #[clap(long)]
    tokens: Option<u32>,

    /// path to the stats database
    #[clap(long)]
    db: Option<PathBuf>,

    /// path to the config file
    #[clap(long)]
    config: Option<PathBuf>,

    /// keep session history in memory only
    #[clap(long)]
    no_persist: bool,

    /// print the progress dashboard and exit
    #[clap(long, conflicts_with = "export")]
    stats: bool,

    /// write the session history as CSV to this path and exit
    #[clap(long)]
    export: Option<PathBuf>,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,

    /// log debug output
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Layer command line overrides on top of the loaded config
    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(goal) = self.weekly_goal {
            config.weekly_goal = goal;
        }
        if let Some(tokens) = self.tokens {
            config.tokens_per_session = tokens;
        }
        config
    }

    fn open_store(&self) -> Result<Box<dyn StatsStore>, Box<dyn Error>> {
        if self.no_persist {
            return Ok(Box::new(MemoryStatsStore::new()));
        }
        let path = self
            .db
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("study_casino_stats.db"));
        tracing::debug!(path = %path.display(), "opening stats database");
        Ok(Box::new(SqliteStatsStore::open(&path)?))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&log_path, cli.verbose) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config_store = cli.config_store();
    let config = cli.apply_overrides(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
        tracing::info!(path = %config_store.path().display(), "config saved");
    }

    let store = cli.open_store()?;

    if cli.stats {
        let stats = store.snapshot(config.weekly_goal, Local::now().date_naive())?;
        println!("{}", Report(&stats));
        return Ok(());
    }

    if let Some(path) = &cli.export {
        let history = store.history()?;
        export_csv(&history, File::create(path)?)?;
        println!("exported {} sessions to {}", history.len(), path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!(?config, "starting");
    let result = start_tui(&mut terminal, &config, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
    store: Box<dyn StatsStore>,
) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    runtime::spawn_terminal_reader(tx.clone());

    let runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = App::new(
        Settings::from_config(config),
        store,
        Box::new(rand::thread_rng()),
        tx,
    );

    terminal.draw(|f| ui::draw(&app, f))?;
    loop {
        if app.handle(runner.step()) == Control::Quit {
            break;
        }
        terminal.draw(|f| ui::draw(&app, f))?;
    }

    tracing::info!("bye");
    Ok(())
}
