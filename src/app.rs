//! The application aggregate: one Filer, one modal-widget slot, the
//! linked-navigation flag, the bars, and everything the main loop
//! dispatches into. All state here is touched only from the main
//! thread; background work comes back through the callback channel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::action::Action;
use crate::config::colors::CompareColors;
use crate::config::commands::{self, Entry as CommandEntry};
use crate::config::history::History;
use crate::event::{EventSender, Ticker};
use crate::filer::directory::{expand_tilde, ListOptions};
use crate::filer::workspace::{Layout, WorkspaceNavigator};
use crate::filer::{
  ops, ExcludeSet, Filer, SortKind, TreeWalker, WalkStep,
};
use crate::macros::{self, MacroContext};
use crate::spawn::{self, ArgBuilder};
use crate::theme::Theme;
use crate::ui::cmdline::{Cmdline, CmdlineMode, CmdlineOutcome};
use crate::ui::help::{Help, HelpOutcome};
use crate::ui::menu::{Menu, MenuItem, MenuOutcome};
use crate::ui::message::MessageBar;
use crate::ui::progress::ProgressBar;
use crate::ui::toolbar::{ToolbarButton, ToolbarLayout};

/// Two clicks at the same cell within this window open the target.
pub const DOUBLE_CLICK_THRESHOLD: Duration = Duration::from_millis(400);

const WHEEL_SCROLL_STEP: i32 = 3;

/// The modal-widget slot. While one is mounted it owns all key input;
/// unmounting is just dropping the value.
pub enum Modal {
  Cmdline(Cmdline),
  Menu(Menu),
  Help(Help),
}

#[derive(Debug, Default)]
struct SyncResult {
  succeeded: usize,
  skipped: usize,
  failed_panes: Vec<usize>,
}

pub struct App {
  pub filer: Filer,
  pub theme: Theme,
  pub message: MessageBar,
  pub progress: ProgressBar,
  pub toolbar: ToolbarLayout,
  pub modal: Option<Modal>,
  pub exclude: ExcludeSet,
  pub history: History,
  pub linked_nav: bool,
  pub ignore_failures: bool,
  pub should_quit: bool,
  /// Argv to run with the terminal suspended; the outer loop handles it.
  pub should_suspend: Option<Vec<String>>,
  shell: ArgBuilder,
  terminal: ArgBuilder,
  sender: Option<EventSender>,
  menus: HashMap<String, Vec<MenuItem>>,
  last_click: Option<(Instant, u16, u16)>,
  diff_status_message: Option<String>,
  diff_ticker: Option<Ticker>,
}

impl App {
  pub fn new(
    filer: Filer,
    exclude: ExcludeSet,
    history: History,
    command_entries: &[CommandEntry],
    compare_colors: CompareColors,
  ) -> Self {
    let mut theme = Theme::default_scheme();
    theme.compare = compare_colors;
    Self {
      filer,
      theme,
      message: MessageBar::default(),
      progress: ProgressBar::default(),
      toolbar: ToolbarLayout::default(),
      modal: None,
      exclude,
      history,
      linked_nav: true,
      ignore_failures: false,
      should_quit: false,
      should_suspend: None,
      shell: spawn::default_shell(),
      terminal: spawn::default_terminal(false),
      sender: None,
      menus: build_menus(command_entries),
      last_click: None,
      diff_status_message: None,
      diff_ticker: None,
    }
  }

  /// A bare app for unit tests: default filer, no sender, no config.
  #[allow(dead_code)] // used in tests
  pub fn new_for_tests() -> Self {
    Self::new(
      Filer::new(),
      ExcludeSet::default(),
      History::default(),
      &commands::defaults(std::env::consts::OS),
      CompareColors::default(),
    )
  }

  pub fn set_sender(&mut self, sender: EventSender) {
    self.sender = Some(sender);
  }

  pub fn set_terminal_builder(&mut self, builder: ArgBuilder) {
    self.terminal = builder;
  }

  fn opts_parts(&self) -> (ExcludeSet, bool) {
    (self.exclude.clone(), self.filer.dirs_first)
  }

  // ---- input routing ----

  /// One canonical key token: the mounted modal first, else the finder,
  /// else the filer's extmap/keymap dispatch.
  pub fn input(&mut self, key: &str) {
    if self.modal.is_some() {
      self.modal_input(key);
      return;
    }
    if self.finder_input(key) {
      return;
    }
    match self.filer.action_for(key) {
      Some(action) => self.dispatch(action),
      None => {}
    }
  }

  fn modal_input(&mut self, key: &str) {
    enum Decision {
      Keep,
      Close,
      RunCmdline(CmdlineMode, String),
      RunItem(MenuItem),
    }

    let Some(mut modal) = self.modal.take() else { return };
    let decision = match &mut modal {
      Modal::Cmdline(cmdline) => match cmdline.input(key) {
        CmdlineOutcome::Pending => Decision::Keep,
        CmdlineOutcome::Cancel => Decision::Close,
        CmdlineOutcome::Submit(text) => Decision::RunCmdline(cmdline.mode.clone(), text),
      },
      Modal::Menu(menu) => match menu.input(key) {
        MenuOutcome::Pending => Decision::Keep,
        MenuOutcome::Cancel => Decision::Close,
        MenuOutcome::Chosen(idx) => Decision::RunItem(menu.items[idx].clone()),
      },
      Modal::Help(help) => match help.input(key) {
        HelpOutcome::Pending => Decision::Keep,
        HelpOutcome::Close => Decision::Close,
      },
    };

    match decision {
      Decision::Keep => self.modal = Some(modal),
      Decision::Close => {}
      Decision::RunCmdline(mode, text) => self.run_cmdline(mode, &text),
      Decision::RunItem(item) => self.dispatch_with_offset(item.action, item.offset),
    }
  }

  /// The finder owns its own keymap while attached. Returns true when
  /// the key was consumed.
  fn finder_input(&mut self, key: &str) -> bool {
    if self.filer.dir().finder.is_none() {
      return false;
    }
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    let dir = self.filer.dir_mut();
    match key {
      "C-h" | "backspace" => {
        if let Some(finder) = &mut dir.finder {
          finder.delete_backward_char();
        }
        let _ = dir.reload(opts);
        true
      }
      "C-g" | "C-[" => {
        dir.close_finder(opts);
        true
      }
      _ => {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
          (Some(c), None) if c != ' ' => {
            if let Some(finder) = &mut dir.finder {
              finder.insert_char(c);
            }
            let _ = dir.reload(opts);
            true
          }
          _ => false,
        }
      }
    }
  }

  // ---- action dispatch ----

  pub fn dispatch(&mut self, action: Action) {
    self.dispatch_with_offset(action, 0);
  }

  fn dispatch_with_offset(&mut self, action: Action, offset: i32) {
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };

    match action {
      Action::Quit => self.should_quit = true,

      Action::CreateWorkspace => self.filer.create_workspace(opts),
      Action::CloseWorkspace => self.filer.close_workspace(opts),
      Action::NextWorkspace => self.filer.move_workspace(1, opts),
      Action::PrevWorkspace => self.filer.move_workspace(-1, opts),
      Action::SetWorkspace(idx) => self.filer.set_workspace(idx, opts),
      Action::EditWorkspaceTitle => {
        let title = self.filer.workspace().title.clone();
        self.open_cmdline(Cmdline::with_text(CmdlineMode::WorkspaceTitle, &title, Vec::new()));
      }

      Action::CreateDir => self.filer.workspace_mut().create_dir(opts),
      Action::CloseDir => self.filer.workspace_mut().close_dir(opts),
      Action::ReloadAll => {
        for err in self.filer.workspace_mut().reload_all(opts) {
          self.message.error(err);
        }
      }
      Action::FocusNext => self.filer.workspace_mut().move_focus(1, opts),
      Action::FocusPrev => self.filer.workspace_mut().move_focus(-1, opts),
      Action::SwapNextDir => self.filer.workspace_mut().swap_next_dir(opts),
      Action::SwapPrevDir => self.filer.workspace_mut().swap_prev_dir(opts),
      Action::ChdirNeighbor => {
        if let Err(err) = self.filer.workspace_mut().chdir_neighbor(opts) {
          self.message.error(format!("{err:#}"));
        }
        self.filer.workspace_mut().rebuild_comparison_index();
      }

      Action::LinkedParent => self.linked_parent(),
      Action::ToggleLinkedNav => self.toggle_linked_nav(),
      Action::ChdirHome => self.chdir_focused("~"),
      Action::ChdirRoot => self.chdir_focused("/"),
      Action::Chdir(target) => self.chdir_focused(&target),
      Action::EnterDir => self.enter_dir_linked(),

      Action::CursorMove(n) => {
        self.filer.dir_mut().move_cursor(n);
        self.mirror_cursor();
      }
      Action::MoveTop => {
        self.filer.dir_mut().move_top();
        self.mirror_cursor();
      }
      Action::MoveBottom => {
        self.filer.dir_mut().move_bottom();
        self.mirror_cursor();
      }
      Action::Scroll(n) => self.filer.dir_mut().scroll(n),
      Action::PageDown => {
        self.filer.dir_mut().page_down();
        self.mirror_cursor();
      }
      Action::PageUp => {
        self.filer.dir_mut().page_up();
        self.mirror_cursor();
      }

      Action::ToggleMark => self.filer.dir_mut().toggle_mark(),
      Action::InvertMark => self.filer.dir_mut().invert_mark(),
      Action::ResetPane => {
        if self.filer.workspace().is_diff_search_active() {
          self.cancel_diff_search();
        } else {
          let dir = self.filer.dir_mut();
          dir.mark_clear();
          dir.close_finder(opts);
        }
      }
      Action::StartFinder => self.filer.dir_mut().open_finder(),

      Action::OpenShell => {
        let history = self.history.entries("shell").to_vec();
        self.open_cmdline(Cmdline::new(CmdlineMode::Shell, history));
      }
      Action::OpenShellSuspend => {
        let history = self.history.entries("shell").to_vec();
        self.open_cmdline(Cmdline::new(CmdlineMode::ShellSuspend, history));
      }
      Action::StartChdir => {
        let history = self.history.entries("chdir").to_vec();
        self.open_cmdline(Cmdline::new(CmdlineMode::Chdir, history));
      }
      Action::StartGlob => {
        let history = self.history.entries("glob").to_vec();
        self.open_cmdline(Cmdline::new(CmdlineMode::Glob, history));
      }
      Action::StartGlobdir => {
        let history = self.history.entries("glob").to_vec();
        self.open_cmdline(Cmdline::new(CmdlineMode::Globdir, history));
      }
      Action::Mkdir => self.open_cmdline(Cmdline::new(CmdlineMode::Mkdir, Vec::new())),
      Action::Touch => self.open_cmdline(Cmdline::new(CmdlineMode::Touch, Vec::new())),
      Action::Rename => {
        let Some(entry) = self.filer.file() else { return };
        if entry.is_parent() {
          return;
        }
        let name = entry.name.clone();
        let ext_len = entry.ext().chars().count() as i32;
        let mut cmdline =
          Cmdline::with_text(CmdlineMode::Rename { from: name.clone() }, &name, Vec::new());
        cmdline.move_cursor(-ext_len);
        self.open_cmdline(cmdline);
      }
      Action::Copy => {
        let sources = self.selected_paths();
        if sources.is_empty() {
          return;
        }
        let neighbor = self.filer.workspace().next_dir().path.to_string_lossy().to_string();
        self.open_cmdline(Cmdline::with_text(
          CmdlineMode::CopyTo { sources },
          &neighbor,
          Vec::new(),
        ));
      }
      Action::Move => {
        let sources = self.selected_paths();
        if sources.is_empty() {
          return;
        }
        let neighbor = self.filer.workspace().next_dir().path.to_string_lossy().to_string();
        self.open_cmdline(Cmdline::with_text(
          CmdlineMode::MoveTo { sources },
          &neighbor,
          Vec::new(),
        ));
      }
      Action::Remove => {
        let targets = self.selected_paths();
        if targets.is_empty() {
          return;
        }
        self.open_cmdline(Cmdline::new(CmdlineMode::RemoveConfirm { targets }, Vec::new()));
      }

      Action::SortBy(kind) => self.sort_by(kind),
      Action::TogglePriority => {
        self.filer.dirs_first = !self.filer.dirs_first;
        let (exclude, dirs_first) = self.opts_parts();
        let opts = ListOptions { exclude: &exclude, dirs_first };
        self.filer.workspace_mut().reload_all(opts);
      }
      Action::SetLayout(layout) => self.filer.workspace_mut().set_layout(layout),
      Action::ToggleHidden => {
        let dir = self.filer.dir_mut();
        dir.show_hidden = !dir.show_hidden;
        if let Err(err) = dir.reload(opts) {
          self.message.error(format!("{err:#}"));
        }
        self.filer.workspace_mut().rebuild_comparison_index();
      }

      Action::Menu(name) => self.open_menu(&name),
      Action::Help => self.modal = Some(Modal::Help(Help::new(&self.filer.keymap))),

      Action::ToggleExcludes => self.toggle_excludes(),
      Action::ToggleComparisonColors => {
        let enabled = self.theme.toggle_comparison();
        let state = if enabled { "enabled" } else { "disabled" };
        self.message.info(format!("comparison colors {state}"));
        if enabled {
          self.filer.workspace_mut().rebuild_comparison_index();
        }
      }
      Action::CalculateDigest => self.calculate_digest(),
      Action::StartDiffSearch => self.start_diff_search(),
      Action::ContinueDiffSearch => self.continue_diff_search(),

      Action::SyncMode => self.open_cmdline(Cmdline::new(
        CmdlineMode::SyncPrefix { ignore_failures: self.ignore_failures },
        Vec::new(),
      )),
      Action::SyncCopy => self.start_sync(SyncOp::Copy),
      Action::SyncDelete => self.start_sync(SyncOp::Delete),
      Action::SyncRename => self.start_sync(SyncOp::Rename),
      Action::ToggleIgnoreFailures => {
        self.ignore_failures = !self.ignore_failures;
        let state = if self.ignore_failures { "enabled" } else { "disabled" };
        self.message.info(format!("sync ignore-failures {state}"));
      }
      Action::CopyAll => self.start_all_panes(false),
      Action::MoveAll => self.start_all_panes(true),

      Action::Open => {
        let opener = if cfg!(target_os = "macos") {
          "open %f %&"
        } else {
          "xdg-open %f %&"
        };
        self.spawn_command(opener);
      }
      Action::ShellCmd(template) => {
        let history = self.history.entries("shell").to_vec();
        let mut cmdline = Cmdline::with_text(CmdlineMode::Shell, &template, history);
        cmdline.move_cursor(offset);
        self.open_cmdline(cmdline);
      }
      Action::SpawnCmd(template) => self.spawn_command(&template),

      Action::None => {}
    }
  }

  fn open_cmdline(&mut self, cmdline: Cmdline) {
    self.modal = Some(Modal::Cmdline(cmdline));
  }

  fn open_menu(&mut self, name: &str) {
    match self.menus.get(name) {
      Some(items) => self.modal = Some(Modal::Menu(Menu::new(name, items.clone()))),
      None => self.message.error(format!("no menu named {name:?}")),
    }
  }

  fn selected_paths(&self) -> Vec<String> {
    let dir = self.filer.dir();
    if dir.is_mark() {
      return dir.markfile_paths();
    }
    match dir.file() {
      Some(entry) if !entry.is_parent() => vec![entry.path.to_string_lossy().to_string()],
      _ => Vec::new(),
    }
  }

  fn chdir_focused(&mut self, target: &str) {
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    if let Err(err) = self.filer.dir_mut().chdir(target, opts) {
      self.message.error(format!("{err:#}"));
      let home = expand_tilde("~").to_string_lossy().to_string();
      let _ = self.filer.dir_mut().chdir(&home, opts);
    }
    let ws = self.filer.workspace_mut();
    let _ = ws.attach(opts);
    ws.rebuild_comparison_index();
  }

  fn sort_by(&mut self, kind: SortKind) {
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    if self.linked_nav {
      self.filer.workspace_mut().sort_all_by(kind, opts);
    } else {
      self.filer.dir_mut().sort_by(kind, opts);
      self.filer.workspace_mut().rebuild_comparison_index();
    }
  }

  fn toggle_excludes(&mut self) {
    let (enabled, has_rules, count) = self.exclude.toggle();
    if !has_rules {
      self.message.info("exclude list inactive (no rules loaded)");
      return;
    }
    let state = if enabled { "enabled" } else { "disabled" };
    self.message.info(format!("filename excludes {state} ({count} entries)"));
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    self.filer.workspace_mut().reload_all(opts);
  }

  // ---- linked navigation ----

  pub fn toggle_linked_nav(&mut self) {
    self.linked_nav = !self.linked_nav;
    let state = if self.linked_nav { "enabled" } else { "disabled" };
    self.message.info(format!("linked navigation {state}"));
  }

  /// Parent navigation: non-focused panes first, then the focused one,
  /// then a single index rebuild.
  pub fn linked_parent(&mut self) {
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    if self.linked_nav {
      self.filer.workspace_mut().chdir_all_to_parent(opts);
    }
    if let Err(err) = self.filer.dir_mut().chdir("..", opts) {
      self.message.error(format!("{err:#}"));
    }
    let ws = self.filer.workspace_mut();
    let _ = ws.attach(opts);
    ws.rebuild_comparison_index();
  }

  /// Enter the cursor directory. In linked mode the other panes follow
  /// first; any pane lacking the subdirectory auto-disables the mode
  /// with a count in the message bar.
  pub fn enter_dir_linked(&mut self) {
    let Some(entry) = self.filer.file() else { return };
    if !entry.is_dir() {
      return;
    }
    if entry.is_parent() {
      self.linked_parent();
      return;
    }
    let name = entry.name.clone();
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };

    if self.linked_nav {
      let (_navigated, skipped) =
        self.filer.workspace_mut().chdir_all_to_subdir_no_rebuild(&name, opts);
      if skipped > 0 {
        self.linked_nav = false;
        self
          .message
          .info(format!("linked navigation disabled: {skipped} window(s) missing '{name}'"));
      }
    }

    if let Err(err) = self.filer.dir_mut().enter_dir(opts) {
      self.message.error(format!("{err:#}"));
    }
    let ws = self.filer.workspace_mut();
    let _ = ws.attach(opts);
    ws.rebuild_comparison_index();
  }

  /// Mirrors the focused cursor to the other panes by name; panes
  /// lacking the target hide their cursor.
  fn mirror_cursor(&mut self) {
    if !self.linked_nav {
      return;
    }
    let Some(entry) = self.filer.file() else { return };
    let name = entry.name.clone();
    let ws = self.filer.workspace_mut();
    let focus = ws.focus;
    for (i, dir) in ws.dirs.iter_mut().enumerate() {
      if i != focus {
        dir.set_cursor_by_name(&name);
      }
    }
  }

  // ---- comparison and difference search ----

  fn calculate_digest(&mut self) {
    let Some(entry) = self.filer.file() else { return };
    if entry.is_parent() {
      self.message.info("cannot calculate digest for the parent entry");
      return;
    }
    let name = entry.name.clone();
    let count = self.filer.workspace().calculate_digest_for_file(&name);
    if count > 0 {
      self.message.info(format!("calculated digest for {count} files named {name:?}"));
    } else {
      self.message.info(format!("no matching files with equal size for {name:?}"));
    }
  }

  fn compare_all_digests(&mut self) {
    let names = match &self.filer.workspace().comparison {
      Some(index) => index.shared_filenames(),
      None => Vec::new(),
    };
    if names.is_empty() {
      self.message.info("nothing to compare");
      return;
    }
    let mut total = 0;
    for name in &names {
      total += self.filer.workspace().calculate_digest_for_file(name);
    }
    self.message.info(format!("calculated digests for {total} files ({} names)", names.len()));
  }

  pub fn start_diff_search(&mut self) {
    if self.filer.workspace().dirs.len() < 2 {
      self.message.error("difference search requires at least 2 windows");
      return;
    }
    let path = self.filer.dir().path.to_string_lossy().to_string();
    let ws = self.filer.workspace_mut();
    ws.start_diff_search();
    if let Some(state) = &mut ws.diff_search {
      state.searching = true;
      state.current_path = path;
    }
    if let Some(ticker) = self.diff_ticker.take() {
      ticker.stop();
    }
    if let Some(sender) = &self.sender {
      self.diff_ticker = Some(Ticker::start(sender.clone(), Duration::from_secs(1)));
    }
    self.find_next_diff("");
  }

  pub fn continue_diff_search(&mut self) {
    if !self.filer.workspace().is_diff_search_active() {
      self.message.error("no active difference search");
      return;
    }
    let Some(state) = self.filer.workspace().diff_search.as_ref() else { return };
    let start_after = {
      if !state.last_diff_name.is_empty() {
        state.last_diff_name.trim_end_matches('/').to_string()
      } else {
        match self.filer.file() {
          Some(entry) if !entry.is_parent() => entry.name.clone(),
          _ => String::new(),
        }
      }
    };
    self.find_next_diff(&start_after);
  }

  fn find_next_diff(&mut self, start_after: &str) {
    let (exclude, dirs_first) = self.opts_parts();
    let (step, state) = {
      let ws = self.filer.workspace_mut();
      let Some(mut state) = ws.diff_search.take() else { return };
      state.searching = true;
      let step = {
        let opts = ListOptions { exclude: &exclude, dirs_first };
        let mut nav = WorkspaceNavigator::new(ws, opts);
        TreeWalker::new(&mut nav, start_after).run(&mut state)
      };
      (step, state)
    };

    match step {
      WalkStep::FoundDiff { name, reason, .. } => {
        let mut state = state;
        state.set_last_diff(&name, &reason);
        let plain = name.trim_end_matches('/').to_string();
        let ws = self.filer.workspace_mut();
        ws.set_cursor_by_name_all(&plain);
        ws.diff_search = Some(state);
        self.diff_status_message = Some(format!("Different: {name} - {reason}"));
      }
      WalkStep::Complete => {
        self.filer.workspace_mut().clear_diff_search();
        self.diff_status_message = None;
        if let Some(ticker) = self.diff_ticker.take() {
          ticker.stop();
        }
        self.message.info("difference search complete - all differences found");
      }
    }
  }

  /// Cancels an active search: every pane returns to its recorded
  /// starting path and the state is cleared.
  pub fn cancel_diff_search(&mut self) {
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    let ws = self.filer.workspace_mut();
    ws.chdir_all_to_initial(opts);
    ws.clear_diff_search();
    self.diff_status_message = None;
    if let Some(ticker) = self.diff_ticker.take() {
      ticker.stop();
    }
    self.message.info("difference search cancelled");
  }

  pub fn diff_status_text(&self) -> String {
    if let Some(text) = &self.diff_status_message {
      return text.clone();
    }
    self
      .filer
      .workspace()
      .diff_search
      .as_ref()
      .map(|s| s.status_text())
      .unwrap_or_default()
  }

  // ---- mouse ----

  pub fn handle_mouse(&mut self, ev: MouseEvent) {
    // Modal widgets own the screen; pointer input is dropped.
    if self.modal.is_some() {
      return;
    }
    match ev.kind {
      MouseEventKind::Down(MouseButton::Left) => self.handle_left_click(ev.column, ev.row),
      MouseEventKind::ScrollUp => self.wheel_scroll(ev.column, ev.row, -WHEEL_SCROLL_STEP),
      MouseEventKind::ScrollDown => self.wheel_scroll(ev.column, ev.row, WHEEL_SCROLL_STEP),
      _ => {}
    }
  }

  /// Two clicks at identical coordinates within the threshold count as
  /// a double-click; the tracking state updates on every call.
  pub fn is_double_click(&mut self, x: u16, y: u16) -> bool {
    let now = Instant::now();
    let is_double = matches!(
      self.last_click,
      Some((at, lx, ly)) if now.duration_since(at) < DOUBLE_CLICK_THRESHOLD && lx == x && ly == y
    );
    self.last_click = Some((now, x, y));
    is_double
  }

  fn handle_left_click(&mut self, x: u16, y: u16) {
    if let Some(button) = self.toolbar.button_at(x, y) {
      self.invoke_toolbar_button(button);
      return;
    }
    if let Some(tab) = self.toolbar.tab_at(x, y) {
      let (exclude, dirs_first) = self.opts_parts();
      let opts = ListOptions { exclude: &exclude, dirs_first };
      self.filer.set_workspace(tab, opts);
      return;
    }

    let Some((idx, dir)) = self.filer.workspace().directory_at(x, y) else {
      return;
    };
    let file_idx = dir.file_index_at_y(y);
    let focus = self.filer.workspace().focus;

    if idx != focus {
      let (exclude, dirs_first) = self.opts_parts();
      let opts = ListOptions { exclude: &exclude, dirs_first };
      self.filer.workspace_mut().set_focus(idx, opts);
    }
    if let Some(file_idx) = file_idx {
      self.filer.dir_mut().set_cursor(file_idx);
    }

    if self.is_double_click(x, y) && file_idx.is_some() {
      let Some(entry) = self.filer.file() else { return };
      if entry.is_dir() {
        self.enter_dir_linked();
      } else {
        let name = entry.name.clone();
        if self.linked_nav {
          let ws = self.filer.workspace_mut();
          for dir in &mut ws.dirs {
            if dir.find_file_by_name(&name).is_some() {
              dir.set_cursor_by_name(&name);
            }
          }
        }
        self.input("C-m");
      }
    }
  }

  /// Wheel scrolling moves the pane under the pointer without moving
  /// focus; outside every pane it falls back to the focused one.
  fn wheel_scroll(&mut self, x: u16, y: u16, amount: i32) {
    let ws = self.filer.workspace_mut();
    let idx = ws.directory_at(x, y).map(|(i, _)| i).unwrap_or(ws.focus);
    ws.dirs[idx].move_cursor(amount);
  }

  pub fn invoke_toolbar_button(&mut self, button: ToolbarButton) {
    match button {
      ToolbarButton::Parent => self.linked_parent(),
      ToolbarButton::Linked => self.toggle_linked_nav(),
      ToolbarButton::Compare => self.compare_all_digests(),
      ToolbarButton::SyncCopy => self.start_sync(SyncOp::Copy),
      ToolbarButton::SyncDelete => self.start_sync(SyncOp::Delete),
      ToolbarButton::SyncRename => self.start_sync(SyncOp::Rename),
      ToolbarButton::IgnoreFailures => self.dispatch(Action::ToggleIgnoreFailures),
    }
  }

  // ---- sync operations across panes ----

  fn start_sync(&mut self, op: SyncOp) {
    let Some(entry) = self.filer.file() else {
      self.message.error("no file selected");
      return;
    };
    if entry.is_parent() {
      self.message.error("no file selected");
      return;
    }
    let name = entry.name.clone();
    let ignore_failures = self.ignore_failures;
    match op {
      SyncOp::Copy => {
        let mut cmdline = Cmdline::with_text(
          CmdlineMode::SyncCopy { name: name.clone(), ignore_failures },
          &name,
          Vec::new(),
        );
        let ext_len = Path::new(&name)
          .extension()
          .map(|e| e.len() as i32 + 1)
          .unwrap_or(0);
        cmdline.move_cursor(-ext_len);
        self.open_cmdline(cmdline);
      }
      SyncOp::Delete => self.open_cmdline(Cmdline::new(
        CmdlineMode::SyncDelete { name, ignore_failures },
        Vec::new(),
      )),
      SyncOp::Rename => {
        let mut cmdline = Cmdline::with_text(
          CmdlineMode::SyncRename { name: name.clone(), ignore_failures },
          &name,
          Vec::new(),
        );
        let ext_len = Path::new(&name)
          .extension()
          .map(|e| e.len() as i32 + 1)
          .unwrap_or(0);
        cmdline.move_cursor(-ext_len);
        self.open_cmdline(cmdline);
      }
    }
  }

  /// Walks the panes from the focused index and applies `apply` to the
  /// named file wherever it exists. A failure stops the walk unless
  /// ignore-failures is on.
  fn execute_sync<F>(&mut self, op: &str, filename: &str, ignore: bool, apply: F)
  where
    F: Fn(&Path, &Path) -> std::io::Result<()>,
  {
    let ws = self.filer.workspace();
    let len = ws.dirs.len();
    let mut result = SyncResult::default();

    for i in 0..len {
      let idx = (ws.focus + i) % len;
      let dir = &ws.dirs[idx];
      let Some(file) = dir.find_file_by_name(filename) else {
        result.skipped += 1;
        continue;
      };
      match apply(&file.path, &dir.path) {
        Ok(()) => result.succeeded += 1,
        Err(_) => {
          result.failed_panes.push(idx + 1);
          if !ignore {
            break;
          }
        }
      }
    }

    self.report_sync_result(op, filename, &result);
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    for err in self.filer.workspace_mut().reload_all(opts) {
      self.message.error(err);
    }
  }

  fn execute_sync_copy(&mut self, filename: &str, new_name: &str, ignore: bool) {
    let new_name = new_name.to_string();
    self.execute_sync("copy", filename, ignore, move |path, dir| {
      ops::copy_path(path, &dir.join(&new_name))
    });
  }

  fn execute_sync_delete(&mut self, filename: &str, ignore: bool) {
    self.execute_sync("delete", filename, ignore, |path, _dir| ops::remove_path(path));
  }

  fn execute_sync_rename(&mut self, filename: &str, new_name: &str, ignore: bool) {
    let new_name = new_name.to_string();
    self.execute_sync("rename", filename, ignore, move |path, dir| {
      std::fs::rename(path, dir.join(&new_name))
    });
  }

  fn report_sync_result(&mut self, op: &str, filename: &str, result: &SyncResult) {
    if result.failed_panes.is_empty() {
      if result.skipped > 0 {
        self.message.info(format!(
          "{op} '{filename}': {} succeeded, {} skipped (file not found)",
          result.succeeded, result.skipped
        ));
      } else {
        self
          .message
          .info(format!("{op} '{filename}': {} succeeded", result.succeeded));
      }
    } else {
      self.message.error(format!(
        "{op} '{filename}': {} succeeded, {} failed (panes {:?}), {} skipped",
        result.succeeded,
        result.failed_panes.len(),
        result.failed_panes,
        result.skipped
      ));
    }
  }

  // ---- multi-target copy/move ----

  fn other_pane_paths(&self) -> Vec<String> {
    let ws = self.filer.workspace();
    (1..ws.dirs.len())
      .map(|offset| {
        let idx = (ws.focus + offset) % ws.dirs.len();
        ws.dirs[idx].path.to_string_lossy().to_string()
      })
      .collect()
  }

  fn start_all_panes(&mut self, move_files: bool) {
    let dests = self.other_pane_paths();
    if dests.is_empty() {
      self.message.info("only one pane visible - use the regular copy/move");
      return;
    }
    let sources = self.selected_paths();
    if sources.is_empty() {
      self.message.error("no files selected");
      return;
    }
    let mode = if move_files {
      CmdlineMode::MoveAllConfirm { sources, dests }
    } else {
      CmdlineMode::CopyAllConfirm { sources, dests }
    };
    self.open_cmdline(Cmdline::new(mode, Vec::new()));
  }

  fn transfer_to_all(&mut self, sources: &[String], dests: &[String], move_files: bool) {
    let total: f64 = sources
      .iter()
      .map(|s| ops::path_size(Path::new(s)) as f64)
      .sum::<f64>()
      * dests.len() as f64;
    self.progress.start(total, sources.len() * dests.len());

    let mut failures = 0;
    let mut done = 0;
    for source in sources {
      let source = Path::new(source);
      let Some(name) = source.file_name() else { continue };
      let size = ops::path_size(source) as f64;
      let last_dest = dests.len().saturating_sub(1);
      for (i, dest) in dests.iter().enumerate() {
        self.progress.start_task(&name.to_string_lossy());
        let target = Path::new(dest).join(name);
        let res = if move_files && i == last_dest {
          ops::move_path(source, &target)
        } else {
          ops::copy_path(source, &target)
        };
        match res {
          Ok(()) => done += 1,
          Err(err) => {
            failures += 1;
            self.message.error(format!("{}: {err}", target.display()));
          }
        }
        self.progress.update(size);
        self.progress.finish_task();
      }
    }
    self.progress.finish();

    let verb = if move_files { "moved" } else { "copied" };
    if failures == 0 {
      self
        .message
        .info(format!("{verb} {done} item(s) to {} destination(s)", dests.len()));
    } else {
      self
        .message
        .error(format!("{verb} with {failures} failure(s): {done} item(s) done"));
    }
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    self.filer.workspace_mut().reload_all(opts);
    self.filer.dir_mut().mark_clear();
  }

  /// Single-destination transfer. With a live event loop the work runs
  /// on a worker thread and mutates UI state only through synchronous
  /// callbacks, yielding a frame between items via the interrupt pair.
  fn transfer_to(&mut self, sources: Vec<String>, dest: String, move_files: bool) {
    let Some(sender) = self.sender.clone() else {
      self.transfer_to_all(&sources, &[dest], move_files);
      return;
    };

    thread::spawn(move || {
      let total: f64 = sources.iter().map(|s| ops::path_size(Path::new(s)) as f64).sum();
      let count = sources.len();
      sender.schedule_sync(move |app| app.progress.start(total, count));

      let mut failures: Vec<String> = Vec::new();
      for source in &sources {
        let source = Path::new(source);
        let Some(name) = source.file_name() else { continue };
        let display = name.to_string_lossy().to_string();
        let size = ops::path_size(source) as f64;
        {
          let display = display.clone();
          sender.schedule_sync(move |app| app.progress.start_task(&display));
        }
        let mut target = Path::new(&dest).join(name);
        if !move_files && target.exists() {
          target = ops::unique_dest_path(&target);
        }
        let res = if move_files {
          ops::move_path(source, &target)
        } else {
          ops::copy_path(source, &target)
        };
        if let Err(err) = res {
          failures.push(format!("{display}: {err}"));
        }
        sender.schedule_sync(move |app| {
          app.progress.update(size);
          app.progress.finish_task();
        });
        // Let the loop draw a frame between items.
        sender.interrupt();
      }

      let verb = if move_files { "moved" } else { "copied" };
      let done = sources.len() - failures.len();
      sender.schedule_sync(move |app| {
        app.progress.finish();
        for failure in &failures {
          app.message.error(failure.clone());
        }
        if failures.is_empty() {
          app.message.info(format!("{verb} {done} item(s)"));
        }
        let (exclude, dirs_first) = app.opts_parts();
        let opts = ListOptions { exclude: &exclude, dirs_first };
        app.filer.workspace_mut().reload_all(opts);
        app.filer.dir_mut().mark_clear();
      });
    });
  }

  // ---- cmdline submission ----

  fn run_cmdline(&mut self, mode: CmdlineMode, text: &str) {
    if let Some(history_mode) = mode.history_mode() {
      self.history.add(history_mode, text);
    }
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };

    match mode {
      CmdlineMode::Shell => self.spawn_command(text),
      CmdlineMode::ShellSuspend => {
        let (cmd, _) = macros::expand(text, &self.macro_context());
        self.should_suspend = Some((self.shell)(&cmd));
      }
      CmdlineMode::Chdir => self.chdir_focused(text),
      CmdlineMode::Glob => {
        let dir = self.filer.dir_mut();
        dir.open_finder();
        if let Some(finder) = &mut dir.finder {
          finder.pattern = text.to_string();
        }
        if let Err(err) = dir.reload(opts) {
          self.message.error(format!("{err:#}"));
        }
      }
      CmdlineMode::Globdir => {
        self.filer.dir_mut().glob_recursive(text, opts);
        self.filer.workspace_mut().rebuild_comparison_index();
      }
      CmdlineMode::Mkdir => {
        let target = self.filer.dir().path.join(text);
        match std::fs::create_dir_all(&target) {
          Ok(()) => {
            self.message.info(format!("created {}", target.display()));
            self.reload_focused();
            self.filer.dir_mut().set_cursor_by_name(text);
          }
          Err(err) => self.message.error(format!("mkdir {}: {err}", target.display())),
        }
      }
      CmdlineMode::Touch => {
        let target = self.filer.dir().path.join(text);
        if target.exists() {
          self.message.error(format!("{} already exists", target.display()));
          return;
        }
        match std::fs::File::create(&target) {
          Ok(_) => {
            self.reload_focused();
            self.filer.dir_mut().set_cursor_by_name(text);
          }
          Err(err) => self.message.error(format!("touch {}: {err}", target.display())),
        }
      }
      CmdlineMode::Rename { from } => {
        let dir_path = self.filer.dir().path.clone();
        match std::fs::rename(dir_path.join(&from), dir_path.join(text)) {
          Ok(()) => {
            self.reload_focused();
            self.filer.dir_mut().set_cursor_by_name(text);
          }
          Err(err) => self.message.error(format!("rename {from}: {err}")),
        }
      }
      CmdlineMode::CopyTo { sources } => {
        let dest = expand_tilde(text).to_string_lossy().to_string();
        self.transfer_to(sources, dest, false);
      }
      CmdlineMode::MoveTo { sources } => {
        let dest = expand_tilde(text).to_string_lossy().to_string();
        self.transfer_to(sources, dest, true);
      }
      CmdlineMode::RemoveConfirm { targets } => {
        if !is_yes(text) {
          return;
        }
        let mut removed = 0;
        for target in &targets {
          match ops::remove_path(Path::new(target)) {
            Ok(()) => removed += 1,
            Err(err) => self.message.error(format!("{target}: {err}")),
          }
        }
        self.message.info(format!("removed {removed} file(s)"));
        for err in self.filer.workspace_mut().reload_all(opts) {
          self.message.error(err);
        }
      }
      CmdlineMode::WorkspaceTitle => {
        if !text.is_empty() {
          self.filer.workspace_mut().title = text.to_string();
        }
      }
      CmdlineMode::SyncPrefix { ignore_failures } => match text {
        "!" => self.open_cmdline(Cmdline::new(
          CmdlineMode::SyncPrefix { ignore_failures: !ignore_failures },
          Vec::new(),
        )),
        "c" => {
          self.ignore_failures = ignore_failures;
          self.start_sync(SyncOp::Copy);
        }
        "d" => {
          self.ignore_failures = ignore_failures;
          self.start_sync(SyncOp::Delete);
        }
        "r" => {
          self.ignore_failures = ignore_failures;
          self.start_sync(SyncOp::Rename);
        }
        _ => {}
      },
      CmdlineMode::SyncCopy { name, ignore_failures } => {
        if text == name {
          self.message.error("sync copy needs a different name");
          return;
        }
        self.execute_sync_copy(&name, text, ignore_failures);
      }
      CmdlineMode::SyncDelete { name, ignore_failures } => {
        if is_yes(text) {
          self.execute_sync_delete(&name, ignore_failures);
        }
      }
      CmdlineMode::SyncRename { name, ignore_failures } => {
        if text == name || text.is_empty() {
          return;
        }
        self.execute_sync_rename(&name, text, ignore_failures);
      }
      CmdlineMode::CopyAllConfirm { sources, dests } => {
        if is_yes(text) {
          self.transfer_to_all(&sources, &dests, false);
        }
      }
      CmdlineMode::MoveAllConfirm { sources, dests } => {
        if is_yes(text) {
          self.transfer_to_all(&sources, &dests, true);
        }
      }
    }
  }

  fn reload_focused(&mut self) {
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    if let Err(err) = self.filer.dir_mut().reload(opts) {
      self.message.error(format!("{err:#}"));
    }
    self.filer.workspace_mut().rebuild_comparison_index();
  }

  // ---- spawning ----

  /// Snapshot of filer state for macro expansion.
  pub fn macro_context(&self) -> MacroContext {
    let ws = self.filer.workspace();
    let dir = ws.dir();
    let (file_name, file_path) = match dir.file() {
      Some(entry) => (entry.name.clone(), entry.path.to_string_lossy().to_string()),
      None => (String::new(), String::new()),
    };
    MacroContext {
      file_name,
      file_path,
      mark_names: dir.markfile_names(),
      mark_paths: dir.markfile_paths(),
      dir_base: dir.base_name(),
      dir_path: dir.path.to_string_lossy().to_string(),
      next_dir_base: ws.next_dir().base_name(),
      next_dir_path: ws.next_dir().path.to_string_lossy().to_string(),
      other_dir_bases: (1..ws.dirs.len())
        .map(|offset| ws.dirs[(ws.focus + offset) % ws.dirs.len()].base_name())
        .collect(),
      other_dir_paths: self.other_pane_paths(),
    }
  }

  /// Expands and launches a command template: `%&` through the shell
  /// detached, everything else through the terminal.
  pub fn spawn_command(&mut self, template: &str) {
    let (cmd, background) = macros::expand(template, &self.macro_context());
    let args = if background { (self.shell)(&cmd) } else { (self.terminal)(&cmd) };
    if args.is_empty() {
      return;
    }
    self.message.info(args.join(" "));
    let Some(sender) = self.sender.clone() else { return };
    if let Err(err) = spawn::spawn_detached(&args, &cmd, sender) {
      self.message.error(format!("{err:#}"));
    }
  }

  // ---- startup ----

  /// Replaces the active workspace's panes one-to-one with the seed
  /// directories, reusing pane objects where possible. Returns whether
  /// seeding happened.
  pub fn seed_startup_dirs(&mut self, dirs: &[PathBuf]) -> bool {
    if dirs.is_empty() {
      return false;
    }
    let (exclude, dirs_first) = self.opts_parts();
    let opts = ListOptions { exclude: &exclude, dirs_first };
    let ws = self.filer.workspace_mut();

    let mut next = Vec::with_capacity(dirs.len());
    for (idx, path) in dirs.iter().enumerate() {
      let mut dir = if idx < ws.dirs.len() {
        ws.dirs[idx].clone()
      } else {
        crate::filer::Directory::new(path.clone())
      };
      let _ = dir.chdir(&path.to_string_lossy(), opts);
      next.push(dir);
    }
    ws.dirs = next;
    ws.focus = 0;
    for err in ws.reload_all(opts) {
      self.message.error(err);
    }
    let geometry = self.filer.workspace().geometry;
    self.filer.workspace_mut().resize(geometry);
    true
  }
}

enum SyncOp {
  Copy,
  Delete,
  Rename,
}

fn is_yes(text: &str) -> bool {
  matches!(text.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Normalizes positional CLI arguments into absolute directory paths,
/// collecting a warning per dropped argument.
pub fn parse_startup_dirs(args: &[String]) -> (Vec<PathBuf>, Vec<String>) {
  let mut dirs = Vec::new();
  let mut warnings = Vec::new();
  for raw in args {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      continue;
    }
    let expanded = expand_tilde(trimmed);
    let absolute = if expanded.is_absolute() {
      expanded
    } else {
      match std::env::current_dir() {
        Ok(cwd) => cwd.join(expanded),
        Err(err) => {
          warnings.push(format!("{trimmed}: {err}"));
          continue;
        }
      }
    };
    match std::fs::metadata(&absolute) {
      Ok(meta) if meta.is_dir() => dirs.push(absolute),
      Ok(_) => warnings.push(format!("{} is not a directory", absolute.display())),
      Err(err) => warnings.push(format!("{}: {err}", absolute.display())),
    }
  }
  (dirs, warnings)
}

fn build_menus(command_entries: &[CommandEntry]) -> HashMap<String, Vec<MenuItem>> {
  let mut menus = HashMap::new();

  menus.insert(
    "sort".to_string(),
    vec![
      MenuItem::new("n", "sort name          ", Action::SortBy(SortKind::Name)),
      MenuItem::new("N", "sort name decending", Action::SortBy(SortKind::NameRev)),
      MenuItem::new("s", "sort size          ", Action::SortBy(SortKind::Size)),
      MenuItem::new("S", "sort size decending", Action::SortBy(SortKind::SizeRev)),
      MenuItem::new("t", "sort time          ", Action::SortBy(SortKind::Mtime)),
      MenuItem::new("T", "sort time decending", Action::SortBy(SortKind::MtimeRev)),
      MenuItem::new("e", "sort ext           ", Action::SortBy(SortKind::Ext)),
      MenuItem::new("E", "sort ext decending ", Action::SortBy(SortKind::ExtRev)),
      MenuItem::new(".", "toggle priority    ", Action::TogglePriority),
    ],
  );

  menus.insert(
    "layout".to_string(),
    vec![
      MenuItem::new("t", "tile       ", Action::SetLayout(Layout::Tile)),
      MenuItem::new("T", "tile-top   ", Action::SetLayout(Layout::TileTop)),
      MenuItem::new("b", "tile-bottom", Action::SetLayout(Layout::TileBottom)),
      MenuItem::new("r", "one-row    ", Action::SetLayout(Layout::OneRow)),
      MenuItem::new("c", "one-column ", Action::SetLayout(Layout::OneColumn)),
      MenuItem::new("f", "fullscreen ", Action::SetLayout(Layout::Fullscreen)),
    ],
  );

  menus.insert(
    "view".to_string(),
    vec![
      MenuItem::new("l", "layout menu             ", Action::Menu("layout".into())),
      MenuItem::new("n", "toggle filename excludes", Action::ToggleExcludes),
      MenuItem::new(".", "toggle show hidden files", Action::ToggleHidden),
      MenuItem::new("c", "toggle comparison colors", Action::ToggleComparisonColors),
      MenuItem::new("=", "calculate file digest   ", Action::CalculateDigest),
      MenuItem::new("[", "start diff search       ", Action::StartDiffSearch),
      MenuItem::new("]", "continue diff search    ", Action::ContinueDiffSearch),
    ],
  );

  menus.insert(
    "command".to_string(),
    vec![
      MenuItem::new("c", "copy         ", Action::Copy),
      MenuItem::new("m", "move         ", Action::Move),
      MenuItem::new("D", "delete       ", Action::Remove),
      MenuItem::new("k", "mkdir        ", Action::Mkdir),
      MenuItem::new("n", "newfile      ", Action::Touch),
      MenuItem::new("r", "rename       ", Action::Rename),
      MenuItem::new("d", "chdir        ", Action::StartChdir),
      MenuItem::new("g", "glob         ", Action::StartGlob),
      MenuItem::new("G", "globdir      ", Action::StartGlobdir),
    ],
  );

  menus.insert(
    "bookmark".to_string(),
    vec![
      MenuItem::new("t", "~/Desktop  ", Action::Chdir("~/Desktop".into())),
      MenuItem::new("c", "~/Documents", Action::Chdir("~/Documents".into())),
      MenuItem::new("d", "~/Downloads", Action::Chdir("~/Downloads".into())),
      MenuItem::new("e", "/etc       ", Action::Chdir("/etc".into())),
      MenuItem::new("u", "/usr       ", Action::Chdir("/usr".into())),
      MenuItem::new("x", "/media     ", Action::Chdir("/media".into())),
    ],
  );

  menus.insert(
    "editor".to_string(),
    vec![
      MenuItem::new("c", "vscode      ", Action::SpawnCmd("code %f %&".into())),
      MenuItem::new("e", "emacs client", Action::SpawnCmd("emacsclient -n %f %&".into())),
      MenuItem::new("v", "vim         ", Action::SpawnCmd("vim %f".into())),
    ],
  );

  menus.insert(
    "image".to_string(),
    vec![
      MenuItem::new("x", "default", Action::Open),
      MenuItem::new("e", "eog    ", Action::SpawnCmd("eog %f %&".into())),
      MenuItem::new("g", "gimp   ", Action::SpawnCmd("gimp %m %&".into())),
    ],
  );

  menus.insert(
    "media".to_string(),
    vec![
      MenuItem::new("x", "default", Action::Open),
      MenuItem::new("m", "mpv    ", Action::SpawnCmd("mpv %f".into())),
      MenuItem::new("v", "vlc    ", Action::SpawnCmd("vlc %f %&".into())),
    ],
  );

  menus.insert(
    "archive".to_string(),
    vec![
      MenuItem::new("z", "zip    ", Action::ShellCmd("zip -roD %x.zip %m".into())),
      MenuItem::new("t", "tar    ", Action::ShellCmd("tar cvf %x.tar %m".into())),
      MenuItem::new("g", "tar.gz ", Action::ShellCmd("tar cvfz %x.tgz %m".into())),
      MenuItem::new("b", "tar.bz2", Action::ShellCmd("tar cvfj %x.bz2 %m".into())),
      MenuItem::new("x", "tar.xz ", Action::ShellCmd("tar cvfJ %x.txz %m".into())),
      MenuItem::new(
        "Z",
        "extract zip for %m",
        Action::ShellCmd("for i in %m; do unzip \"$i\" -d ./; done".into()),
      ),
      MenuItem::new(
        "T",
        "extract tar for %m",
        Action::ShellCmd("for i in %m; do tar xvf \"$i\" -C ./; done".into()),
      ),
    ],
  );

  // External commands: file entries first, grouped into their menus.
  for entry in command_entries {
    let action = if entry.run_menu.is_empty() {
      Action::ShellCmd(entry.command.clone())
    } else {
      Action::Menu(entry.run_menu.clone())
    };
    let mut item = MenuItem::new(&entry.key, &entry.label, action);
    item.offset = entry.offset;
    menus.entry(entry.menu.clone()).or_default().push(item);
  }

  menus
}
