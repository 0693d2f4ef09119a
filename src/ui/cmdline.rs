use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::theme::Theme;

/// What a submitted cmdline means. Carried by the widget so the App can
/// interpret the text without the widget knowing filer internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdlineMode {
  Shell,
  ShellSuspend,
  Chdir,
  Glob,
  Globdir,
  Mkdir,
  Touch,
  Rename { from: String },
  CopyTo { sources: Vec<String> },
  MoveTo { sources: Vec<String> },
  RemoveConfirm { targets: Vec<String> },
  WorkspaceTitle,
  /// Waits for one of c/d/r, or `!` to flip ignore-failures.
  SyncPrefix { ignore_failures: bool },
  SyncCopy { name: String, ignore_failures: bool },
  SyncDelete { name: String, ignore_failures: bool },
  SyncRename { name: String, ignore_failures: bool },
  CopyAllConfirm { sources: Vec<String>, dests: Vec<String> },
  MoveAllConfirm { sources: Vec<String>, dests: Vec<String> },
}

impl CmdlineMode {
  /// The history bucket this mode feeds, when any.
  pub fn history_mode(&self) -> Option<&'static str> {
    match self {
      CmdlineMode::Shell | CmdlineMode::ShellSuspend => Some("shell"),
      CmdlineMode::Chdir => Some("chdir"),
      CmdlineMode::Glob | CmdlineMode::Globdir => Some("glob"),
      _ => None,
    }
  }

  pub fn prompt(&self) -> String {
    match self {
      CmdlineMode::Shell => "$ ".to_string(),
      CmdlineMode::ShellSuspend => "$! ".to_string(),
      CmdlineMode::Chdir => "chdir: ".to_string(),
      CmdlineMode::Glob => "glob: ".to_string(),
      CmdlineMode::Globdir => "globdir: ".to_string(),
      CmdlineMode::Mkdir => "mkdir: ".to_string(),
      CmdlineMode::Touch => "newfile: ".to_string(),
      CmdlineMode::Rename { from } => format!("rename {from} to: "),
      CmdlineMode::CopyTo { sources } => format!("copy {} file(s) to: ", sources.len()),
      CmdlineMode::MoveTo { sources } => format!("move {} file(s) to: ", sources.len()),
      CmdlineMode::RemoveConfirm { targets } => {
        format!("remove {} file(s)? [y/n]: ", targets.len())
      }
      CmdlineMode::WorkspaceTitle => "workspace title: ".to_string(),
      CmdlineMode::SyncPrefix { ignore_failures } => {
        if *ignore_failures {
          "Sync! [c]opy [d]elete [r]ename (ignore failures): ".to_string()
        } else {
          "Sync [c]opy [d]elete [r]ename [!]ignore: ".to_string()
        }
      }
      CmdlineMode::SyncCopy { name, .. } => format!("sync copy {name} as: "),
      CmdlineMode::SyncDelete { name, .. } => format!("sync delete {name}? [y/n]: "),
      CmdlineMode::SyncRename { name, .. } => format!("sync rename {name} to: "),
      CmdlineMode::CopyAllConfirm { sources, dests } => {
        format!("copy {} file(s) to {} pane(s)? [y/n]: ", sources.len(), dests.len())
      }
      CmdlineMode::MoveAllConfirm { sources, dests } => {
        format!("move {} file(s) to {} pane(s)? [y/n]: ", sources.len(), dests.len())
      }
    }
  }
}

/// What a key did to the cmdline.
#[derive(Debug, PartialEq, Eq)]
pub enum CmdlineOutcome {
  Pending,
  Cancel,
  Submit(String),
}

/// One-line text box with an Emacs keymap and per-mode history.
#[derive(Debug)]
pub struct Cmdline {
  pub mode: CmdlineMode,
  text: Vec<char>,
  cursor: usize,
  history: Vec<String>,
  history_pos: Option<usize>,
}

impl Cmdline {
  pub fn new(mode: CmdlineMode, history: Vec<String>) -> Self {
    Self { mode, text: Vec::new(), cursor: 0, history, history_pos: None }
  }

  pub fn with_text(mode: CmdlineMode, text: &str, history: Vec<String>) -> Self {
    let chars: Vec<char> = text.chars().collect();
    let cursor = chars.len();
    Self { mode, text: chars, cursor, history, history_pos: None }
  }

  pub fn text(&self) -> String {
    self.text.iter().collect()
  }

  pub fn set_text(&mut self, text: &str) {
    self.text = text.chars().collect();
    self.cursor = self.text.len();
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn move_cursor(&mut self, delta: i32) {
    let next = self.cursor as i64 + delta as i64;
    self.cursor = next.clamp(0, self.text.len() as i64) as usize;
  }

  fn insert_char(&mut self, c: char) {
    self.text.insert(self.cursor, c);
    self.cursor += 1;
  }

  fn delete_backward(&mut self) {
    if self.cursor > 0 {
      self.cursor -= 1;
      self.text.remove(self.cursor);
    }
  }

  fn delete_forward(&mut self) {
    if self.cursor < self.text.len() {
      self.text.remove(self.cursor);
    }
  }

  fn kill_line(&mut self) {
    self.text.truncate(self.cursor);
  }

  fn backward_word(&mut self) {
    while self.cursor > 0 && self.text[self.cursor - 1].is_whitespace() {
      self.cursor -= 1;
    }
    while self.cursor > 0 && !self.text[self.cursor - 1].is_whitespace() {
      self.cursor -= 1;
    }
  }

  fn forward_word(&mut self) {
    let len = self.text.len();
    while self.cursor < len && self.text[self.cursor].is_whitespace() {
      self.cursor += 1;
    }
    while self.cursor < len && !self.text[self.cursor].is_whitespace() {
      self.cursor += 1;
    }
  }

  fn delete_backward_word(&mut self) {
    let end = self.cursor;
    self.backward_word();
    self.text.drain(self.cursor..end);
  }

  fn history_up(&mut self) {
    if self.history.is_empty() {
      return;
    }
    let next = match self.history_pos {
      None => self.history.len() - 1,
      Some(0) => 0,
      Some(pos) => pos - 1,
    };
    self.history_pos = Some(next);
    self.set_text(&self.history[next].clone());
  }

  fn history_down(&mut self) {
    let Some(pos) = self.history_pos else { return };
    if pos + 1 >= self.history.len() {
      self.history_pos = None;
      self.set_text("");
    } else {
      self.history_pos = Some(pos + 1);
      self.set_text(&self.history[pos + 1].clone());
    }
  }

  /// Handles one canonical key token.
  pub fn input(&mut self, key: &str) -> CmdlineOutcome {
    match key {
      "C-m" => return CmdlineOutcome::Submit(self.text()),
      "C-g" | "C-[" => return CmdlineOutcome::Cancel,
      "C-a" | "home" => self.cursor = 0,
      "C-e" | "end" => self.cursor = self.text.len(),
      "C-f" | "right" => self.move_cursor(1),
      "C-b" | "left" => self.move_cursor(-1),
      "M-f" => self.forward_word(),
      "M-b" => self.backward_word(),
      "C-d" | "delete" => self.delete_forward(),
      "C-h" | "backspace" => self.delete_backward(),
      "M-h" => self.delete_backward_word(),
      "C-k" => self.kill_line(),
      "C-p" | "up" => self.history_up(),
      "C-n" | "down" => self.history_down(),
      _ => {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
          self.insert_char(c);
        }
      }
    }
    CmdlineOutcome::Pending
  }

  pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let prompt = self.mode.prompt();
    let style = Style::default().fg(theme.text).bg(theme.bg_bar);
    buf.set_style(area, style);
    buf.set_string(area.x, area.y, &prompt, style.add_modifier(Modifier::BOLD));

    let text_x = area.x + prompt.chars().count() as u16;
    buf.set_string(text_x, area.y, self.text(), style);
    let cursor_x = text_x + self.cursor as u16;
    if cursor_x < area.right() {
      let cell_style = style.add_modifier(Modifier::REVERSED);
      let under: String = self.text.get(self.cursor).map(|c| c.to_string()).unwrap_or(" ".into());
      buf.set_string(cursor_x, area.y, under, cell_style);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn feed(cmdline: &mut Cmdline, text: &str) {
    for c in text.chars() {
      cmdline.input(&c.to_string());
    }
  }

  #[test]
  fn test_typing_and_submit() {
    let mut c = Cmdline::new(CmdlineMode::Shell, Vec::new());
    feed(&mut c, "ls -la");
    assert_eq!(c.input("C-m"), CmdlineOutcome::Submit("ls -la".into()));
  }

  #[test]
  fn test_cancel_tokens() {
    let mut c = Cmdline::new(CmdlineMode::Shell, Vec::new());
    assert_eq!(c.input("C-g"), CmdlineOutcome::Cancel);
    assert_eq!(c.input("C-["), CmdlineOutcome::Cancel);
  }

  #[test]
  fn test_editing_motions() {
    let mut c = Cmdline::new(CmdlineMode::Shell, Vec::new());
    feed(&mut c, "hello world");

    c.input("C-a");
    assert_eq!(c.cursor(), 0);
    c.input("C-e");
    assert_eq!(c.cursor(), 11);
    c.input("M-b");
    assert_eq!(c.cursor(), 6);
    c.input("backspace");
    assert_eq!(c.text(), "helloworld");
    c.input("C-k");
    assert_eq!(c.text(), "hello");
  }

  #[test]
  fn test_delete_backward_word() {
    let mut c = Cmdline::new(CmdlineMode::Shell, Vec::new());
    feed(&mut c, "rm -rf target");
    c.input("M-h");
    assert_eq!(c.text(), "rm -rf ");
  }

  #[test]
  fn test_mid_line_insert() {
    let mut c = Cmdline::new(CmdlineMode::Shell, Vec::new());
    feed(&mut c, "ac");
    c.input("C-b");
    c.input("b");
    assert_eq!(c.text(), "abc");
    assert_eq!(c.cursor(), 2);
  }

  #[test]
  fn test_history_navigation() {
    let mut c = Cmdline::new(CmdlineMode::Shell, vec!["first".into(), "second".into()]);
    c.input("C-p");
    assert_eq!(c.text(), "second");
    c.input("C-p");
    assert_eq!(c.text(), "first");
    c.input("C-p");
    assert_eq!(c.text(), "first", "clamped at the oldest entry");
    c.input("C-n");
    assert_eq!(c.text(), "second");
    c.input("C-n");
    assert_eq!(c.text(), "", "walking past the newest clears the line");
  }

  #[test]
  fn test_with_text_rename_offset() {
    let mut c = Cmdline::with_text(
      CmdlineMode::Rename { from: "report.txt".into() },
      "report.txt",
      Vec::new(),
    );
    assert_eq!(c.cursor(), 10);
    c.move_cursor(-4);
    assert_eq!(c.cursor(), 6, "cursor parked before the extension");
  }

  #[test]
  fn test_history_modes() {
    assert_eq!(CmdlineMode::Shell.history_mode(), Some("shell"));
    assert_eq!(CmdlineMode::Chdir.history_mode(), Some("chdir"));
    assert_eq!(CmdlineMode::WorkspaceTitle.history_mode(), None);
  }

  #[test]
  fn test_multichar_tokens_not_inserted() {
    let mut c = Cmdline::new(CmdlineMode::Shell, Vec::new());
    c.input("pgup");
    c.input("M-x");
    assert_eq!(c.text(), "");
  }

  #[test]
  fn test_sync_prefix_prompts() {
    let plain = CmdlineMode::SyncPrefix { ignore_failures: false };
    assert!(plain.prompt().contains("[!]ignore"));
    let ignoring = CmdlineMode::SyncPrefix { ignore_failures: true };
    assert!(ignoring.prompt().contains("ignore failures"));
  }
}
