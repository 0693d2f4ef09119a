use chrono::{DateTime, Local};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Widget};

use crate::filer::{ComparisonIndex, Directory, FileEntry};
use crate::theme::Theme;

const SIZE_WIDTH: usize = 8;
const TIME_WIDTH: usize = 15;

pub fn format_size(bytes: u64) -> String {
  const UNIT: f64 = 1024.0;
  if bytes < 1024 {
    return format!("{bytes}B");
  }
  let mut value = bytes as f64 / UNIT;
  for suffix in ["K", "M", "G", "T", "P"] {
    if value < UNIT {
      return format!("{value:.1}{suffix}");
    }
    value /= UNIT;
  }
  format!("{value:.1}E")
}

pub fn format_mtime(entry: &FileEntry) -> String {
  let time: DateTime<Local> = entry.mtime.into();
  time.format("%y-%m-%d %H:%M").to_string()
}

fn truncate_fill(s: &str, width: usize) -> String {
  let mut out: String = s.chars().take(width).collect();
  if s.chars().count() > width && width > 0 {
    out.pop();
    out.push('~');
  }
  while out.chars().count() < width {
    out.push(' ');
  }
  out
}

/// Draws one directory pane: bordered, title on the top edge, entries
/// with comparison coloring on the name, size and time columns when the
/// workspace index knows the name.
pub fn render_pane(
  dir: &Directory,
  pane_idx: usize,
  focused_pane: bool,
  comparison: Option<&ComparisonIndex>,
  area: Rect,
  buf: &mut Buffer,
  theme: &Theme,
) {
  if area.width < 4 || area.height < 3 {
    return;
  }
  let border_style = if focused_pane {
    Style::default().fg(theme.directory)
  } else {
    Style::default().fg(theme.border)
  };
  let title = truncate_fill(&dir.title, area.width.saturating_sub(4) as usize);
  Block::default()
    .borders(Borders::ALL)
    .border_style(border_style)
    .title(title.trim_end().to_string())
    .render(area, buf);

  let inner = Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2);
  let rows = inner.height as usize;

  for (row, entry) in dir.entries.iter().skip(dir.offset).take(rows).enumerate() {
    let idx = dir.offset + row;
    let on_cursor = focused_pane && idx == dir.cursor && !dir.is_cursor_hidden();
    render_entry(
      entry,
      pane_idx,
      on_cursor,
      comparison,
      Rect::new(inner.x, inner.y + row as u16, inner.width, 1),
      buf,
      theme,
    );
  }

  if let Some(finder) = &dir.finder {
    let label = format!("/{}", finder.pattern);
    let w = (inner.width as usize).min(label.chars().count());
    let y = area.y + area.height - 1;
    buf.set_string(area.x + 1, y, truncate_fill(&label, w), Style::default().fg(theme.info));
  }
}

fn render_entry(
  entry: &FileEntry,
  pane_idx: usize,
  on_cursor: bool,
  comparison: Option<&ComparisonIndex>,
  area: Rect,
  buf: &mut Buffer,
  theme: &Theme,
) {
  let cmp = comparison
    .filter(|_| theme.comparison_enabled)
    .and_then(|idx| idx.get(pane_idx, &entry.name))
    .filter(|c| c.name_present);

  let base = theme.entry_style(entry, on_cursor);

  let width = area.width as usize;
  let stat_width = SIZE_WIDTH + 1 + TIME_WIDTH;
  let name_width = width.saturating_sub(stat_width);

  let prefix = if entry.marked { "*" } else { " " };
  let display = format!("{prefix}{}{}", entry.name, entry.suffix());
  let name_text = truncate_fill(&display, name_width);
  let name_style = match cmp {
    Some(_) => theme.compare_name_style(on_cursor),
    None => base,
  };
  buf.set_string(area.x, area.y, &name_text, name_style);

  if width <= stat_width {
    return;
  }
  let size_text = if entry.is_dir() && !entry.is_parent() {
    format!("{:>SIZE_WIDTH$}", "<DIR>")
  } else if entry.is_parent() {
    format!("{:>SIZE_WIDTH$}", "")
  } else {
    format!("{:>SIZE_WIDTH$}", format_size(entry.size))
  };
  let size_style = match &cmp {
    Some(c) => theme.compare_size_style(c, base, on_cursor),
    None => base,
  };
  buf.set_string(area.x + name_width as u16, area.y, &size_text, size_style);

  let time_text = format!(" {}", format_mtime(entry));
  let time_style = match &cmp {
    Some(c) => theme.compare_time_style(c, base, on_cursor),
    None => base,
  };
  buf.set_string(
    area.x + (name_width + SIZE_WIDTH) as u16,
    area.y,
    truncate_fill(&time_text, TIME_WIDTH),
    time_style,
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filer::directory::ListOptions;
  use crate::filer::ExcludeSet;
  use ratatui::style::Modifier;
  use std::fs;
  use std::path::PathBuf;
  use std::sync::atomic::{AtomicU32, Ordering};

  static COUNTER: AtomicU32 = AtomicU32::new(0);

  fn test_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("goful_pane_{prefix}_{id}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn test_format_size() {
    assert_eq!(format_size(0), "0B");
    assert_eq!(format_size(999), "999B");
    assert_eq!(format_size(2048), "2.0K");
    assert_eq!(format_size(5 * 1024 * 1024), "5.0M");
    assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0G");
  }

  #[test]
  fn test_truncate_fill() {
    assert_eq!(truncate_fill("abc", 5), "abc  ");
    assert_eq!(truncate_fill("abcdef", 4), "abc~");
    assert_eq!(truncate_fill("", 3), "   ");
  }

  #[test]
  fn test_render_pane_draws_entries_and_cursor() {
    let root = test_dir("render");
    fs::write(root.join("aaa.txt"), "x").unwrap();
    fs::write(root.join("bbb.txt"), "y").unwrap();

    let exclude = ExcludeSet::default();
    let mut dir = Directory::new(root.clone());
    dir.resize(Rect::new(0, 0, 60, 10));
    dir.reload(ListOptions { exclude: &exclude, dirs_first: false }).unwrap();
    dir.set_cursor_by_name("aaa.txt");

    let area = Rect::new(0, 0, 60, 10);
    let mut buf = Buffer::empty(area);
    let theme = Theme::default_scheme();
    render_pane(&dir, 0, true, None, area, &mut buf, &theme);

    // Row 1 is "..", row 2 is aaa.txt with the cursor highlight.
    let row: String = (1..20).map(|x| buf[(x, 2)].symbol().to_string()).collect();
    assert!(row.contains("aaa.txt"));
    assert!(buf[(2, 2)].style().add_modifier.contains(Modifier::REVERSED));
    assert!(!buf[(2, 3)].style().add_modifier.contains(Modifier::REVERSED));

    let _ = fs::remove_dir_all(&root);
  }

  #[test]
  fn test_hidden_cursor_not_highlighted() {
    let root = test_dir("hidden_cursor");
    fs::write(root.join("only"), "x").unwrap();

    let exclude = ExcludeSet::default();
    let mut dir = Directory::new(root.clone());
    dir.resize(Rect::new(0, 0, 60, 10));
    dir.reload(ListOptions { exclude: &exclude, dirs_first: false }).unwrap();
    dir.set_cursor_by_name("absent-name");
    assert!(dir.is_cursor_hidden());

    let area = Rect::new(0, 0, 60, 10);
    let mut buf = Buffer::empty(area);
    let theme = Theme::default_scheme();
    render_pane(&dir, 0, true, None, area, &mut buf, &theme);

    for y in 1..9 {
      assert!(
        !buf[(2, y)].style().add_modifier.contains(Modifier::REVERSED),
        "row {y} should not carry a cursor highlight"
      );
    }

    let _ = fs::remove_dir_all(&root);
  }

  #[test]
  fn test_marked_entry_prefix() {
    let root = test_dir("marked");
    fs::write(root.join("pick"), "x").unwrap();

    let exclude = ExcludeSet::default();
    let mut dir = Directory::new(root.clone());
    dir.resize(Rect::new(0, 0, 60, 10));
    dir.reload(ListOptions { exclude: &exclude, dirs_first: false }).unwrap();
    dir.set_cursor_by_name("pick");
    dir.toggle_mark();

    let area = Rect::new(0, 0, 60, 10);
    let mut buf = Buffer::empty(area);
    let theme = Theme::default_scheme();
    render_pane(&dir, 0, false, None, area, &mut buf, &theme);

    assert_eq!(buf[(1, 2)].symbol(), "*");

    let _ = fs::remove_dir_all(&root);
  }

  #[test]
  fn test_comparison_styles_applied() {
    let r0 = test_dir("cmp0");
    let r1 = test_dir("cmp1");
    fs::write(r0.join("f"), "aa").unwrap();
    fs::write(r1.join("f"), "aaaa").unwrap();

    let exclude = ExcludeSet::default();
    let opts = ListOptions { exclude: &exclude, dirs_first: false };
    let mut d0 = Directory::new(r0.clone());
    d0.resize(Rect::new(0, 0, 60, 10));
    d0.reload(opts).unwrap();
    let mut d1 = Directory::new(r1.clone());
    d1.reload(opts).unwrap();

    let index = ComparisonIndex::build(&[d0.clone(), d1]).unwrap();
    let theme = Theme::default_scheme();
    let area = Rect::new(0, 0, 60, 10);
    let mut buf = Buffer::empty(area);
    render_pane(&d0, 0, false, Some(&index), area, &mut buf, &theme);

    // Name cell carries the name-present color.
    let name_cell = buf[(2, 2)].style();
    assert_eq!(name_cell.fg, Some(theme.compare.name_present));
    // Size field (right-aligned block before the time) carries the
    // smallest-size color.
    let size_x = (60 - 2 - (8 + 1 + 15) + 7) as u16;
    let size_cell = buf[(size_x, 2)].style();
    assert_eq!(size_cell.fg, Some(theme.compare.size_smallest));

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }

  #[test]
  fn test_comparison_disabled_uses_plain_styles() {
    let r0 = test_dir("plain0");
    let r1 = test_dir("plain1");
    fs::write(r0.join("f"), "aa").unwrap();
    fs::write(r1.join("f"), "aaaa").unwrap();

    let exclude = ExcludeSet::default();
    let opts = ListOptions { exclude: &exclude, dirs_first: false };
    let mut d0 = Directory::new(r0.clone());
    d0.resize(Rect::new(0, 0, 60, 10));
    d0.reload(opts).unwrap();
    let mut d1 = Directory::new(r1.clone());
    d1.reload(opts).unwrap();

    let index = ComparisonIndex::build(&[d0.clone(), d1]).unwrap();
    let mut theme = Theme::default_scheme();
    theme.comparison_enabled = false;
    let area = Rect::new(0, 0, 60, 10);
    let mut buf = Buffer::empty(area);
    render_pane(&d0, 0, false, Some(&index), area, &mut buf, &theme);

    let name_cell = buf[(2, 2)].style();
    assert_eq!(name_cell.fg, Some(theme.text));

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }
}
