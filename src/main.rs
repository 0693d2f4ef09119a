mod action;
mod app;
mod config;
mod event;
mod filer;
mod keys;
mod macros;
mod spawn;
mod theme;
mod ui;

use std::io;
use std::panic::{self, AssertUnwindSafe};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event as TermEvent};
use crossterm::execute;
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{parse_startup_dirs, App};
use crate::config::paths::PathFlags;
use crate::event::{Event, EventLoop, ShutdownOutcome};
use crate::filer::exclude::parse_exclude_lines;
use crate::filer::{ExcludeSet, Filer};

#[derive(Parser)]
#[command(name = "goful")]
#[command(about = "Multi-pane terminal file manager")]
#[command(version)]
struct Cli {
  /// Directories seeding the active workspace's panes, one per pane
  dirs: Vec<String>,

  /// Override path to state.json (or GOFUL_STATE_PATH)
  #[arg(long)]
  state: Option<String>,

  /// Override path to the cmdline history (or GOFUL_HISTORY_PATH)
  #[arg(long)]
  history: Option<String>,

  /// Override path to the external-command config (or GOFUL_COMMANDS_FILE)
  #[arg(long)]
  commands: Option<String>,

  /// Override path to the filename exclude list (or GOFUL_EXCLUDES_FILE)
  #[arg(long = "exclude-names")]
  exclude_names: Option<String>,

  /// Override path to the comparison colors config (or GOFUL_COMPARE_COLORS)
  #[arg(long = "compare-colors")]
  compare_colors: Option<String>,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  let flags = PathFlags {
    state: cli.state,
    history: cli.history,
    commands: cli.commands,
    exclude_names: cli.exclude_names,
    compare_colors: cli.compare_colors,
  };
  let paths = config::paths::resolve(&flags, &|key| std::env::var(key).ok());
  if env_set("GOFUL_DEBUG_PATHS") {
    eprintln!("DEBUG: {}", paths.debug_line());
  }

  let mut exclude = ExcludeSet::default();
  match std::fs::read_to_string(&paths.excludes.path) {
    Ok(content) => {
      exclude.configure(&parse_exclude_lines(&content), true);
    }
    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
    Err(err) => {
      eprintln!("WARN: failed to read exclude list {}: {err}", paths.excludes.path.display());
    }
  }

  let (command_entries, commands_err) =
    config::commands::load(&paths.commands.path, std::env::consts::OS);
  if config::commands::debug_enabled() {
    eprintln!(
      "DEBUG: loaded {} external command(s) from {}",
      command_entries.len(),
      paths.commands.path.display()
    );
  }
  let (compare_colors, colors_err) = config::colors::load(&paths.compare_colors.path);

  let filer = config::state::load(&paths.state.path)
    .map(config::state::restore)
    .unwrap_or_else(Filer::new);
  let history = config::history::History::load(&paths.history.path).unwrap_or_default();

  let mut app = App::new(filer, exclude, history, &command_entries, compare_colors);
  if let Some(err) = commands_err {
    app.message.error(format!("{err:#}"));
  }
  if let Some(err) = colors_err {
    app.message.error(format!("{err:#}"));
  }

  let (seed_dirs, seed_warnings) = parse_startup_dirs(&cli.dirs);
  for warning in seed_warnings {
    app.message.error(warning);
  }
  let seeded = app.seed_startup_dirs(&seed_dirs);
  if env_set("GOFUL_DEBUG_WORKSPACE") {
    if seeded {
      for (i, dir) in seed_dirs.iter().enumerate() {
        eprintln!("DEBUG: window={} path={}", i + 1, dir.display());
      }
    } else {
      eprintln!("DEBUG: no startup directories; using persisted workspace state");
    }
  }

  let is_tmux = detect_tmux();
  app.set_terminal_builder(spawn::default_terminal(is_tmux));

  // $PAGER on the cursor file under `i`.
  let pager = std::env::var("PAGER").unwrap_or_else(|_| "less".to_string());
  app.filer.merge_keymap(
    [("i".to_string(), crate::action::Action::SpawnCmd(format!("{pager} %f")))].into(),
  );

  // Terminal init failures are fatal and exit non-zero before the loop.
  setup_terminal()?;
  let original_hook = panic::take_hook();
  panic::set_hook(Box::new(move |info| {
    let _ = restore_terminal();
    original_hook(info);
  }));
  set_terminal_title(is_tmux);

  let events = EventLoop::new();
  app.set_sender(events.sender());
  app.message.info("Welcome to goful");
  app.dispatch(crate::action::Action::ReloadAll);

  let result = run_loop(&mut app, &events);

  let _ = restore_terminal();
  if events.shutdown() == ShutdownOutcome::TimedOut {
    eprintln!("WARN: event poller did not stop within the shutdown timeout");
  }

  if let Err(err) = config::state::save(&paths.state.path, &config::state::snapshot(&app.filer)) {
    eprintln!("WARN: failed to save state: {err:#}");
  }
  if let Err(err) = app.history.save(&paths.history.path) {
    eprintln!("WARN: failed to save history: {err:#}");
  }

  result
}

fn run_loop(app: &mut App, events: &EventLoop) -> Result<()> {
  let backend = CrosstermBackend::new(io::stdout());
  let mut terminal = Terminal::new(backend)?;

  loop {
    terminal.draw(|frame| ui::draw(frame, app))?;

    match events.next()? {
      Event::Term(TermEvent::Key(key)) => {
        if let Some(token) = keys::key_token(key) {
          app.input(&token);
        }
      }
      Event::Term(TermEvent::Mouse(mouse)) => app.handle_mouse(mouse),
      // Layout is recomputed from the frame size at draw time.
      Event::Term(_) => {}
      Event::Callback { f, done } => {
        // A panicking callback must not take the loop down.
        if panic::catch_unwind(AssertUnwindSafe(|| f(app))).is_err() {
          app.message.error("internal error: a scheduled callback panicked");
        }
        let _ = done.send(());
      }
      // Interrupt pairs are consumed inside EventLoop::next.
      Event::Interrupt => {}
      Event::Tick => {}
    }

    if let Some(args) = app.should_suspend.take() {
      restore_terminal()?;
      let run = spawn::run_suspended(&args);
      setup_terminal()?;
      terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
      if let Err(err) = run {
        app.message.error(format!("{err:#}"));
      }
      app.dispatch(crate::action::Action::ReloadAll);
    }

    if app.should_quit {
      return Ok(());
    }
  }
}

fn setup_terminal() -> Result<()> {
  enable_raw_mode()?;
  execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
  Ok(())
}

fn restore_terminal() -> Result<()> {
  disable_raw_mode()?;
  execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
  Ok(())
}

fn detect_tmux() -> bool {
  if cfg!(target_os = "macos") {
    std::env::var("TERM_PROGRAM").map(|v| v.contains("tmux")).unwrap_or(false)
  } else {
    std::env::var("TERM").map(|v| v.contains("screen")).unwrap_or(false)
  }
}

fn set_terminal_title(is_tmux: bool) {
  use std::io::Write;
  let mut stdout = io::stdout();
  if is_tmux {
    let _ = stdout.write_all(b"\x1bkgoful\x1b\\");
  } else {
    let _ = stdout.write_all(b"\x1b]0;goful\x07");
  }
}

fn env_set(key: &str) -> bool {
  std::env::var(key).map(|v| !v.is_empty()).unwrap_or(false)
}
