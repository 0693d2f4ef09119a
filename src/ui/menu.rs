use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::action::Action;
use crate::theme::Theme;

#[derive(Debug, Clone)]
pub struct MenuItem {
  pub key: String,
  pub label: String,
  pub action: Action,
  /// Cursor offset applied after a ShellCmd action opens the cmdline.
  pub offset: i32,
}

impl MenuItem {
  pub fn new(key: &str, label: &str, action: Action) -> Self {
    Self { key: key.to_string(), label: label.to_string(), action, offset: 0 }
  }
}

#[derive(Debug, PartialEq)]
pub enum MenuOutcome {
  Pending,
  Cancel,
  Chosen(usize),
}

/// Modal list widget: move with C-n/C-p, confirm with C-m, or hit an
/// item's shortcut key directly.
#[derive(Debug, Clone)]
pub struct Menu {
  pub name: String,
  pub items: Vec<MenuItem>,
  pub cursor: usize,
}

impl Menu {
  pub fn new(name: &str, items: Vec<MenuItem>) -> Self {
    Self { name: name.to_string(), items, cursor: 0 }
  }

  pub fn move_cursor(&mut self, delta: i32) {
    if self.items.is_empty() {
      return;
    }
    let len = self.items.len() as i64;
    self.cursor = ((self.cursor as i64 + delta as i64).rem_euclid(len)) as usize;
  }

  pub fn input(&mut self, key: &str) -> MenuOutcome {
    match key {
      "C-n" | "down" => {
        self.move_cursor(1);
        MenuOutcome::Pending
      }
      "C-p" | "up" => {
        self.move_cursor(-1);
        MenuOutcome::Pending
      }
      "M-<" | "home" => {
        self.cursor = 0;
        MenuOutcome::Pending
      }
      "M->" | "end" => {
        self.cursor = self.items.len().saturating_sub(1);
        MenuOutcome::Pending
      }
      "C-m" => {
        if self.items.is_empty() {
          MenuOutcome::Cancel
        } else {
          MenuOutcome::Chosen(self.cursor)
        }
      }
      "C-g" | "C-[" => MenuOutcome::Cancel,
      key => match self.items.iter().position(|item| item.key == key) {
        Some(idx) => {
          self.cursor = idx;
          MenuOutcome::Chosen(idx)
        }
        None => MenuOutcome::Pending,
      },
    }
  }

  pub fn render(&self, screen: Rect, buf: &mut Buffer, theme: &Theme) {
    let width = self
      .items
      .iter()
      .map(|i| i.key.chars().count() + i.label.chars().count() + 4)
      .max()
      .unwrap_or(10)
      .max(self.name.chars().count() + 4) as u16;
    let height = self.items.len() as u16 + 2;
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    let x = screen.x + (screen.width.saturating_sub(width)) / 2;
    let y = screen.y + (screen.height.saturating_sub(height)) / 2;
    let area = Rect::new(x, y, width, height);

    Clear.render(area, buf);
    Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border))
      .title(self.name.clone())
      .render(area, buf);

    for (i, item) in self.items.iter().enumerate() {
      let row = y + 1 + i as u16;
      if row >= area.bottom() - 1 {
        break;
      }
      let style = if i == self.cursor {
        Style::default().fg(theme.text).add_modifier(Modifier::REVERSED)
      } else {
        Style::default().fg(theme.text)
      };
      let line = format!("{} {}", item.key, item.label);
      let avail = width.saturating_sub(2) as usize;
      let line: String = line.chars().take(avail).collect();
      buf.set_string(x + 1, row, line, style);
    }
  }
}
