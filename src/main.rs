mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mathsprint::{
    app_dirs::AppDirs,
    config::{Backend, Config, ConfigStore, FileConfigStore},
    leaderboard::Category,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    scoreboard::{
        cache::DEFAULT_CAPACITY, CachedScoreboard, CsvScoreboard, RetryConfig, RetryingRecorder,
        ScoreboardEntry, ScoreboardQuery, ScoreboardStore, SqliteScoreboard,
    },
    Difficulty, Game, Operator, Outcome, Phase, SessionConfig,
};
use ratatui::{
    backend::{Backend as TerminalBackend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

/// timed arithmetic sprint with a shared scoreboard
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Answer as many arithmetic prompts as you can in 60 seconds. A correct answer scores a point, a wrong one loses a point, and every finished game lands on the shared scoreboard."
)]
pub struct Cli {
    /// name recorded on the scoreboard (blank records as "anonymous")
    #[clap(short = 'u', long)]
    username: Option<String>,

    /// difficulty preset
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// operator for normal games
    #[clap(short = 'o', long, value_enum)]
    operator: Option<Operator>,

    /// scoreboard storage backend
    #[clap(long, value_enum)]
    backend: Option<Backend>,

    /// scoreboard file (CSV file or SQLite database, depending on backend)
    #[clap(long)]
    scoreboard: Option<PathBuf>,

    /// open on the scoreboard instead of the start screen
    #[clap(long)]
    show_scoreboard: bool,
}

impl Cli {
    /// Layer explicit flags over the persisted config
    fn apply(&self, config: &mut Config) {
        if let Some(ref username) = self.username {
            config.username = username.clone();
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(operator) = self.operator {
            config.operator = operator;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(ref path) = self.scoreboard {
            config.scoreboard_path = Some(path.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Start,
    Playing,
    Results,
    Scoreboard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyResult {
    Continue,
    Quit,
}

pub struct App {
    pub config: Config,
    pub game: Game,
    pub state: AppState,
    pub input: String,
    pub alert: Option<Outcome>,
    pub store: Arc<dyn ScoreboardStore>,
    pub board_tab: usize,
    pub status: Option<String>,
}

impl App {
    pub fn new(config: Config, store: Arc<dyn ScoreboardStore>) -> Self {
        let session = SessionConfig::new(
            config.username.clone(),
            config.difficulty,
            config.operator,
        );
        let recorder = RetryingRecorder::new(Arc::clone(&store), RetryConfig::default());

        Self {
            config,
            game: Game::new(session, Box::new(recorder)),
            state: AppState::Start,
            input: String::new(),
            alert: None,
            store,
            board_tab: 0,
            status: None,
        }
    }

    pub fn start_game(&mut self) {
        self.game.set_username(self.config.username.clone());
        match self
            .game
            .start(self.config.operator, self.config.difficulty)
        {
            Ok(_) => {
                self.state = AppState::Playing;
                self.input.clear();
                self.alert = None;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn submit(&mut self) {
        match self.game.submit_raw(&self.input) {
            Ok(submission) => {
                self.alert = Some(submission.outcome);
                self.input = self.game.retained_input().to_string();
                if submission.finished.is_some() {
                    self.state = AppState::Results;
                }
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Playing && self.game.tick().is_some() {
            self.state = AppState::Results;
        }
    }

    pub fn end_game(&mut self) {
        self.game.end_game();
        self.state = AppState::Results;
    }

    pub fn new_game(&mut self) {
        self.game.reset();
        self.input.clear();
        self.alert = None;
        self.status = None;
        self.state = AppState::Start;
    }

    pub fn toggle_difficulty(&mut self) {
        self.config.difficulty = match self.config.difficulty {
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Normal,
        };
    }

    pub fn cycle_operator(&mut self, forward: bool) {
        if self.config.difficulty == Difficulty::Hard {
            return;
        }
        let len = Operator::ALL.len();
        let idx = Operator::ALL
            .iter()
            .position(|op| *op == self.config.operator)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.config.operator = Operator::ALL[next];
    }

    pub fn categories() -> Vec<Category> {
        Category::all()
    }

    pub fn current_category(&self) -> Category {
        let cats = Self::categories();
        cats[self.board_tab % cats.len()]
    }

    pub fn scoreboard_rows(&self) -> Result<Vec<ScoreboardEntry>, String> {
        let cat = self.current_category();
        self.store
            .query(cat.difficulty, cat.operator)
            .map_err(|err| err.to_string())
    }

    pub fn on_key(&mut self, key: KeyEvent) -> KeyResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            if self.game.phase() == Phase::Active {
                self.game.end_game();
            }
            return KeyResult::Quit;
        }

        match self.state {
            AppState::Start => match key.code {
                KeyCode::Esc => return KeyResult::Quit,
                KeyCode::Enter => self.start_game(),
                KeyCode::Tab => self.state = AppState::Scoreboard,
                KeyCode::Left | KeyCode::Right => self.toggle_difficulty(),
                KeyCode::Up => self.cycle_operator(false),
                KeyCode::Down => self.cycle_operator(true),
                KeyCode::Backspace => {
                    self.config.username.pop();
                }
                KeyCode::Char(c) => self.config.username.push(c),
                _ => {}
            },
            AppState::Playing => match key.code {
                KeyCode::Esc => self.end_game(),
                KeyCode::Enter => self.submit(),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Esc => return KeyResult::Quit,
                KeyCode::Enter | KeyCode::Char('n') => self.new_game(),
                KeyCode::Tab | KeyCode::Char('s') => self.state = AppState::Scoreboard,
                _ => {}
            },
            AppState::Scoreboard => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return KeyResult::Quit,
                KeyCode::Left => {
                    let len = Self::categories().len();
                    self.board_tab = (self.board_tab + len - 1) % len;
                }
                KeyCode::Right => {
                    self.board_tab = (self.board_tab + 1) % Self::categories().len();
                }
                KeyCode::Tab | KeyCode::Char('b') | KeyCode::Backspace => {
                    self.state = if self.game.has_finished() {
                        AppState::Results
                    } else {
                        AppState::Start
                    };
                }
                _ => {}
            },
        }

        KeyResult::Continue
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn ScoreboardStore>, Box<dyn Error>> {
    let path = config.resolved_scoreboard_path();
    let max_age = Duration::from_secs(config.cache_ttl_secs);
    tracing::info!(backend = ?config.backend, path = %path.display(), "opening scoreboard");

    let store: Arc<dyn ScoreboardStore> = match config.backend {
        Backend::Csv => Arc::new(CachedScoreboard::with_limits(
            CsvScoreboard::new(path),
            max_age,
            DEFAULT_CAPACITY,
        )),
        Backend::Sqlite => Arc::new(CachedScoreboard::with_limits(
            SqliteScoreboard::open(path)?,
            max_age,
            DEFAULT_CAPACITY,
        )),
    };
    Ok(store)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(err) = logging::init_file_logging(&AppDirs::log_path()) {
        eprintln!("logging disabled: {err}");
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply(&mut config);

    let store = open_store(&config)?;
    let mut app = App::new(config, store);
    if cli.show_scoreboard {
        app.state = AppState::Scoreboard;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = config_store.save(&app.config) {
        tracing::warn!(%err, "could not save config");
    }

    run_result
}

fn start_tui<B: TerminalBackend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                let was_playing = app.state == AppState::Playing;
                if app.on_key(key) == KeyResult::Quit {
                    break;
                }
                // the first second of a game is a full second
                if !was_playing && app.state == AppState::Playing {
                    runner.reset_clock();
                }
            }
        }
    }

    Ok(())
}
