use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::theme::Theme;

/// The single-row toolbar: one-character action buttons on the even
/// columns, workspace tabs, the diff-search badge, then per-pane path
/// crumbs. Drawing records every clickable span for hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
  Parent,
  Linked,
  Compare,
  SyncCopy,
  SyncDelete,
  SyncRename,
  IgnoreFailures,
}

impl ToolbarButton {
  pub const ALL: [ToolbarButton; 7] = [
    ToolbarButton::Parent,
    ToolbarButton::Linked,
    ToolbarButton::Compare,
    ToolbarButton::SyncCopy,
    ToolbarButton::SyncDelete,
    ToolbarButton::SyncRename,
    ToolbarButton::IgnoreFailures,
  ];

  pub fn glyph(self) -> char {
    match self {
      ToolbarButton::Parent => '^',
      ToolbarButton::Linked => 'L',
      ToolbarButton::Compare => '=',
      ToolbarButton::SyncCopy => 'C',
      ToolbarButton::SyncDelete => 'D',
      ToolbarButton::SyncRename => 'R',
      ToolbarButton::IgnoreFailures => '!',
    }
  }

  pub fn id(self) -> &'static str {
    match self {
      ToolbarButton::Parent => "parent",
      ToolbarButton::Linked => "linked",
      ToolbarButton::Compare => "compare",
      ToolbarButton::SyncCopy => "synccopy",
      ToolbarButton::SyncDelete => "syncdelete",
      ToolbarButton::SyncRename => "syncrename",
      ToolbarButton::IgnoreFailures => "ignorefailures",
    }
  }
}

/// Clickable spans recorded by the last toolbar draw.
#[derive(Debug, Clone, Default)]
pub struct ToolbarLayout {
  row: u16,
  buttons: Vec<(ToolbarButton, u16)>,
  tabs: Vec<(usize, u16, u16)>,
}

impl ToolbarLayout {
  /// Maps a click to at most one button; gap columns miss.
  pub fn button_at(&self, x: u16, y: u16) -> Option<ToolbarButton> {
    if y != self.row {
      return None;
    }
    self
      .buttons
      .iter()
      .find(|(_, bx)| *bx == x)
      .map(|(button, _)| *button)
  }

  /// Maps a click to a workspace-tab index.
  pub fn tab_at(&self, x: u16, y: u16) -> Option<usize> {
    if y != self.row {
      return None;
    }
    self
      .tabs
      .iter()
      .find(|(_, x1, x2)| x >= *x1 && x <= *x2)
      .map(|(idx, _, _)| *idx)
  }
}

pub struct ToolbarParams<'a> {
  pub linked: bool,
  pub ignore_failures: bool,
  pub workspace_titles: &'a [String],
  pub current_workspace: usize,
  pub diff_status: Option<String>,
  /// Pane crumbs: (title, focused).
  pub panes: &'a [(String, bool)],
}

/// Draws the toolbar row and returns the recorded spans.
pub fn render_toolbar(
  params: &ToolbarParams,
  area: Rect,
  buf: &mut Buffer,
  theme: &Theme,
) -> ToolbarLayout {
  let mut layout = ToolbarLayout { row: area.y, ..Default::default() };
  let base = Style::default().fg(theme.text).bg(theme.bg_bar);
  let reverse = base.add_modifier(Modifier::REVERSED);
  buf.set_style(area, base);

  let mut x = area.x;
  for button in ToolbarButton::ALL {
    if x >= area.right() {
      return layout;
    }
    let on = match button {
      ToolbarButton::Linked => params.linked,
      ToolbarButton::IgnoreFailures => params.ignore_failures,
      _ => false,
    };
    let style = if on { reverse } else { base };
    buf.set_string(x, area.y, button.glyph().to_string(), style);
    layout.buttons.push((button, x));
    x = x.saturating_add(2);
  }

  for (idx, title) in params.workspace_titles.iter().enumerate() {
    let label = format!(" {title} ");
    if x + label.len() as u16 > area.right() {
      break;
    }
    let style = if idx == params.current_workspace { reverse } else { base };
    buf.set_string(x, area.y, &label, style);
    layout.tabs.push((idx, x, x + label.len() as u16 - 1));
    x += label.len() as u16;
  }

  if x + 3 <= area.right() {
    buf.set_string(x, area.y, " | ", base);
    x += 3;
  }

  if let Some(status) = &params.diff_status {
    if !status.is_empty() && x + 1 < area.right() {
      let avail = (area.right() - x) as usize;
      let text: String = status.chars().take(avail).collect();
      buf.set_string(x, area.y, &text, reverse);
      x += text.chars().count() as u16 + 1;
    }
  }

  if !params.panes.is_empty() && x < area.right() {
    let remaining = (area.right() - x) as usize;
    let per_pane = remaining / params.panes.len();
    for (i, (title, focused)) in params.panes.iter().enumerate() {
      if per_pane < 5 {
        break;
      }
      let style = if *focused { reverse } else { base };
      let tag = format!("[{}] ", i + 1);
      let width = per_pane.saturating_sub(tag.len());
      let mut crumb: String = title.chars().take(width).collect();
      if title.chars().count() > width && width > 0 {
        crumb.pop();
        crumb.push('~');
      }
      buf.set_string(x, area.y, &tag, style);
      buf.set_string(x + tag.len() as u16, area.y, &crumb, style);
      x += per_pane as u16;
    }
  }

  layout
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draw(params: &ToolbarParams) -> (ToolbarLayout, Buffer) {
    let area = Rect::new(0, 0, 100, 1);
    let mut buf = Buffer::empty(area);
    let theme = Theme::default_scheme();
    let layout = render_toolbar(params, area, &mut buf, &theme);
    (layout, buf)
  }

  fn params<'a>(titles: &'a [String], panes: &'a [(String, bool)]) -> ToolbarParams<'a> {
    ToolbarParams {
      linked: true,
      ignore_failures: false,
      workspace_titles: titles,
      current_workspace: 0,
      diff_status: None,
      panes,
    }
  }

  #[test]
  fn test_buttons_on_even_columns() {
    let titles = vec!["1".to_string()];
    let panes = Vec::new();
    let (layout, buf) = draw(&params(&titles, &panes));

    // ^ L = C D R ! with one-cell gaps.
    for (i, button) in ToolbarButton::ALL.iter().enumerate() {
      let x = (i * 2) as u16;
      assert_eq!(layout.button_at(x, 0), Some(*button));
      assert_eq!(buf[(x, 0)].symbol(), button.glyph().to_string());
    }
  }

  #[test]
  fn test_hit_test_matches_scenario() {
    let titles = vec!["1".to_string()];
    let panes = Vec::new();
    let (layout, _) = draw(&params(&titles, &panes));

    assert_eq!(layout.button_at(6, 0), Some(ToolbarButton::SyncCopy));
    assert_eq!(layout.button_at(6, 0).unwrap().id(), "synccopy");
    assert_eq!(layout.button_at(7, 0), None, "gap column");
    assert_eq!(layout.button_at(12, 0).unwrap().id(), "ignorefailures");
    assert_eq!(layout.button_at(0, 1), None, "wrong row");
  }

  #[test]
  fn test_toggle_buttons_reverse_video() {
    let titles = vec!["1".to_string()];
    let panes = Vec::new();
    let mut p = params(&titles, &panes);
    p.linked = true;
    p.ignore_failures = false;
    let (_, buf) = draw(&p);

    // Linked button at x=2 reversed, ignore-failures at x=12 not.
    assert!(buf[(2, 0)].style().add_modifier.contains(Modifier::REVERSED));
    assert!(!buf[(12, 0)].style().add_modifier.contains(Modifier::REVERSED));
    // Plain action buttons are never reversed.
    assert!(!buf[(6, 0)].style().add_modifier.contains(Modifier::REVERSED));
  }

  #[test]
  fn test_workspace_tabs_recorded_and_clickable() {
    let titles = vec!["alpha".to_string(), "beta".to_string()];
    let panes = Vec::new();
    let (layout, _) = draw(&params(&titles, &panes));

    // Tabs start after the 7 buttons (x = 14).
    assert_eq!(layout.tab_at(14, 0), Some(0));
    let second_tab_x = 14 + " alpha ".len() as u16;
    assert_eq!(layout.tab_at(second_tab_x, 0), Some(1));
    assert_eq!(layout.tab_at(second_tab_x, 1), None);
  }

  #[test]
  fn test_truncated_on_narrow_terminal() {
    let titles = vec!["1".to_string()];
    let panes = Vec::new();
    let area = Rect::new(0, 0, 5, 1);
    let mut buf = Buffer::empty(area);
    let theme = Theme::default_scheme();
    let layout = render_toolbar(&params(&titles, &panes), area, &mut buf, &theme);
    assert!(layout.buttons.len() < ToolbarButton::ALL.len());
    assert!(layout.button_at(0, 0).is_some());
  }
}
