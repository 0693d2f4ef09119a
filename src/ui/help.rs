use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::action::{Action, Keymap};
use crate::theme::Theme;

#[derive(Debug, PartialEq)]
pub enum HelpOutcome {
  Pending,
  Close,
}

/// The keystroke catalog popup, built from the live keymap so custom
/// bindings show up as bound.
#[derive(Debug)]
pub struct Help {
  lines: Vec<String>,
  scroll: usize,
}

fn describe(action: &Action) -> String {
  match action {
    Action::Quit => "quit".into(),
    Action::CreateWorkspace => "create workspace".into(),
    Action::CloseWorkspace => "close workspace".into(),
    Action::NextWorkspace => "next workspace".into(),
    Action::PrevWorkspace => "previous workspace".into(),
    Action::SetWorkspace(i) => format!("workspace {}", i + 1),
    Action::EditWorkspaceTitle => "edit workspace title".into(),
    Action::CreateDir => "create pane".into(),
    Action::CloseDir => "close pane".into(),
    Action::ReloadAll => "reload all panes".into(),
    Action::FocusNext => "focus next pane".into(),
    Action::FocusPrev => "focus previous pane".into(),
    Action::SwapNextDir => "swap with next pane".into(),
    Action::SwapPrevDir => "swap with previous pane".into(),
    Action::ChdirNeighbor => "adopt neighbor path".into(),
    Action::LinkedParent => "parent directory (linked)".into(),
    Action::ToggleLinkedNav => "toggle linked navigation".into(),
    Action::ChdirHome => "go home".into(),
    Action::ChdirRoot => "go to filesystem root".into(),
    Action::Chdir(path) => format!("change directory to {path}"),
    Action::EnterDir => "enter directory".into(),
    Action::CursorMove(n) if *n > 0 => format!("cursor down {n}"),
    Action::CursorMove(n) => format!("cursor up {}", -n),
    Action::MoveTop => "cursor to top".into(),
    Action::MoveBottom => "cursor to bottom".into(),
    Action::Scroll(n) if *n > 0 => "scroll down".into(),
    Action::Scroll(_) => "scroll up".into(),
    Action::PageDown => "page down".into(),
    Action::PageUp => "page up".into(),
    Action::ToggleMark => "toggle mark".into(),
    Action::InvertMark => "invert marks".into(),
    Action::ResetPane => "clear marks and finder".into(),
    Action::StartFinder => "incremental finder".into(),
    Action::OpenShell => "shell command".into(),
    Action::OpenShellSuspend => "shell command (suspend)".into(),
    Action::StartChdir => "change directory".into(),
    Action::StartGlob => "glob files".into(),
    Action::StartGlobdir => "glob recursively".into(),
    Action::Touch => "new file".into(),
    Action::Mkdir => "new directory".into(),
    Action::Copy => "copy".into(),
    Action::Move => "move".into(),
    Action::Rename => "rename".into(),
    Action::Remove => "remove".into(),
    Action::SortBy(kind) => format!("sort by {}", kind.label()),
    Action::TogglePriority => "toggle directory sort priority".into(),
    Action::SetLayout(layout) => format!("layout: {layout:?}"),
    Action::ToggleHidden => "toggle hidden files".into(),
    Action::Menu(name) => format!("{name} menu"),
    Action::Help => "this help".into(),
    Action::ToggleExcludes => "toggle filename excludes".into(),
    Action::ToggleComparisonColors => "toggle comparison colors".into(),
    Action::CalculateDigest => "calculate file digest".into(),
    Action::StartDiffSearch => "start difference search".into(),
    Action::ContinueDiffSearch => "continue difference search".into(),
    Action::SyncMode => "sync operation prompt".into(),
    Action::SyncCopy => "sync copy".into(),
    Action::SyncDelete => "sync delete".into(),
    Action::SyncRename => "sync rename".into(),
    Action::ToggleIgnoreFailures => "toggle ignore-failures".into(),
    Action::CopyAll => "copy to all panes".into(),
    Action::MoveAll => "move to all panes".into(),
    Action::Open => "open".into(),
    Action::ShellCmd(cmd) => cmd.clone(),
    Action::SpawnCmd(cmd) => cmd.clone(),
    Action::None => "nothing".into(),
  }
}

impl Help {
  pub fn new(keymap: &Keymap) -> Self {
    let mut rows: Vec<(String, String)> = keymap
      .iter()
      .map(|(key, action)| (key.clone(), describe(action)))
      .collect();
    rows.sort();
    let lines = rows
      .into_iter()
      .map(|(key, desc)| format!("{key:>10}  {desc}"))
      .collect();
    Self { lines, scroll: 0 }
  }

  pub fn input(&mut self, key: &str) -> HelpOutcome {
    match key {
      "q" | "C-g" | "C-[" | "?" => HelpOutcome::Close,
      "C-n" | "down" | "j" => {
        if self.scroll + 1 < self.lines.len() {
          self.scroll += 1;
        }
        HelpOutcome::Pending
      }
      "C-p" | "up" | "k" => {
        self.scroll = self.scroll.saturating_sub(1);
        HelpOutcome::Pending
      }
      "C-v" | "pgdn" => {
        self.scroll = (self.scroll + 10).min(self.lines.len().saturating_sub(1));
        HelpOutcome::Pending
      }
      "M-v" | "pgup" => {
        self.scroll = self.scroll.saturating_sub(10);
        HelpOutcome::Pending
      }
      _ => HelpOutcome::Pending,
    }
  }

  pub fn render(&self, screen: Rect, buf: &mut Buffer, theme: &Theme) {
    let width = screen.width.saturating_sub(8).clamp(20, 70);
    let height = screen.height.saturating_sub(4).max(5);
    let x = screen.x + (screen.width.saturating_sub(width)) / 2;
    let y = screen.y + (screen.height.saturating_sub(height)) / 2;
    let area = Rect::new(x, y, width, height);

    Clear.render(area, buf);
    Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border))
      .title("keys")
      .title_style(Style::default().add_modifier(Modifier::BOLD))
      .render(area, buf);

    let rows = height.saturating_sub(2) as usize;
    for (i, line) in self.lines.iter().skip(self.scroll).take(rows).enumerate() {
      let text: String = line.chars().take(width.saturating_sub(2) as usize).collect();
      buf.set_string(x + 1, y + 1 + i as u16, text, Style::default().fg(theme.text));
    }
  }
}
