use ratatui::style::{Color, Modifier, Style};

use crate::config::colors::CompareColors;
use crate::filer::{CompareState, DigestCompare, SizeCompare, TimeCompare};

#[derive(Debug, Clone)]
pub struct Theme {
  pub text: Color,
  pub text_dim: Color,
  pub border: Color,
  pub directory: Color,
  pub symlink: Color,
  pub symlink_dir: Color,
  pub executable: Color,
  pub marked: Color,
  pub info: Color,
  pub error: Color,
  pub bg_bar: Color,
  pub compare: CompareColors,
  /// Comparison coloring toggle; on by default.
  pub comparison_enabled: bool,
}

impl Theme {
  pub fn default_scheme() -> Self {
    Self {
      text: Color::Indexed(252),
      text_dim: Color::DarkGray,
      border: Color::Indexed(240),
      directory: Color::Indexed(75),
      symlink: Color::Indexed(140),
      symlink_dir: Color::Indexed(134),
      executable: Color::Indexed(114),
      marked: Color::Indexed(208),
      info: Color::Indexed(150),
      error: Color::Indexed(167),
      bg_bar: Color::Indexed(236),
      compare: CompareColors::default(),
      comparison_enabled: true,
    }
  }

  pub fn toggle_comparison(&mut self) -> bool {
    self.comparison_enabled = !self.comparison_enabled;
    self.comparison_enabled
  }

  fn base(&self, color: Color) -> Style {
    Style::default().fg(color)
  }

  /// Per-kind style for an entry outside comparison coloring.
  pub fn entry_style(&self, entry: &crate::filer::FileEntry, focused: bool) -> Style {
    let style = if entry.marked {
      self.base(self.marked)
    } else if entry.is_symlink() {
      if entry.is_dir() {
        self.base(self.symlink_dir)
      } else {
        self.base(self.symlink)
      }
    } else if entry.is_dir() {
      self.base(self.directory)
    } else if entry.is_exec() {
      self.base(self.executable)
    } else {
      self.base(self.text)
    };
    reversed(style, focused)
  }

  /// Name style when the comparison index marks the name present.
  pub fn compare_name_style(&self, focused: bool) -> Style {
    let style = self
      .base(self.compare.name_present)
      .add_modifier(Modifier::BOLD);
    reversed(style, focused)
  }

  /// Size-column style: color per size verdict, underline for equal
  /// digests, crossed-out for differing digests.
  pub fn compare_size_style(&self, cmp: &CompareState, base: Style, focused: bool) -> Style {
    let mut style = match cmp.size {
      SizeCompare::Equal => self.base(self.compare.size_equal),
      SizeCompare::Smallest => self.base(self.compare.size_smallest),
      SizeCompare::Largest => self.base(self.compare.size_largest),
      _ => base,
    };
    match cmp.digest {
      DigestCompare::Equal => style = style.add_modifier(Modifier::UNDERLINED),
      DigestCompare::Different => style = style.add_modifier(Modifier::CROSSED_OUT),
      _ => {}
    }
    reversed(style, focused)
  }

  pub fn compare_time_style(&self, cmp: &CompareState, base: Style, focused: bool) -> Style {
    let style = match cmp.time {
      TimeCompare::Equal => self.base(self.compare.time_equal),
      TimeCompare::Earliest => self.base(self.compare.time_earliest),
      TimeCompare::Latest => self.base(self.compare.time_latest),
      _ => base,
    };
    reversed(style, focused)
  }
}

fn reversed(style: Style, on: bool) -> Style {
  if on {
    style.add_modifier(Modifier::REVERSED)
  } else {
    style
  }
}

impl Default for Theme {
  fn default() -> Self {
    Self::default_scheme()
  }
}
