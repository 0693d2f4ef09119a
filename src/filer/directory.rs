use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use ratatui::layout::Rect;

use super::entry::FileEntry;
use super::exclude::ExcludeSet;
use super::sort::{sort_entries, SortKind};
use crate::macros::quote;

/// Listing options threaded from the App into every reload: the exclude
/// set and the directories-first priority are app-wide, not per-pane.
#[derive(Clone, Copy)]
pub struct ListOptions<'a> {
  pub exclude: &'a ExcludeSet,
  pub dirs_first: bool,
}

/// In-pane incremental filter. While attached, the visible set narrows
/// to names containing the pattern and the finder owns its own keymap.
#[derive(Debug, Clone, Default)]
pub struct Finder {
  pub pattern: String,
}

impl Finder {
  pub fn insert_char(&mut self, c: char) {
    self.pattern.push(c);
  }

  pub fn delete_backward_char(&mut self) {
    self.pattern.pop();
  }

  /// Substring match, or a wildcard match when the pattern carries
  /// `*`/`?` (as set up by the glob cmdline).
  pub fn matches(&self, name: &str) -> bool {
    if self.pattern.is_empty() {
      return true;
    }
    if self.pattern.contains('*') || self.pattern.contains('?') {
      return wildcard_match(&self.pattern, name);
    }
    name.contains(self.pattern.as_str())
  }
}

/// Iterative `*`/`?` glob over chars; `*` spans any run, `?` one rune.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
  let p: Vec<char> = pattern.chars().collect();
  let n: Vec<char> = name.chars().collect();
  let (mut pi, mut ni) = (0usize, 0usize);
  let mut star: Option<(usize, usize)> = None;
  while ni < n.len() {
    if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
      pi += 1;
      ni += 1;
    } else if pi < p.len() && p[pi] == '*' {
      star = Some((pi, ni));
      pi += 1;
    } else if let Some((sp, sn)) = star {
      pi = sp + 1;
      ni = sn + 1;
      star = Some((sp, sn + 1));
    } else {
      return false;
    }
  }
  while pi < p.len() && p[pi] == '*' {
    pi += 1;
  }
  pi == p.len()
}

/// One pane's filesystem view: an ordered, filtered listing with a
/// cursor and viewport. Exclusively owned by its Workspace.
#[derive(Debug, Clone)]
pub struct Directory {
  pub path: PathBuf,
  pub entries: Vec<FileEntry>,
  pub cursor: usize,
  pub offset: usize,
  pub sort: SortKind,
  pub show_hidden: bool,
  pub finder: Option<Finder>,
  pub title: String,
  pub geometry: Rect,
  cursor_hidden: bool,
}

impl Directory {
  pub fn new(path: PathBuf) -> Self {
    let title = abbr_path(&path);
    Self {
      path,
      entries: Vec::new(),
      cursor: 0,
      offset: 0,
      sort: SortKind::Name,
      show_hidden: false,
      finder: None,
      title,
      geometry: Rect::default(),
      cursor_hidden: false,
    }
  }

  /// Resolves `target` against the current path (absolute, relative,
  /// `..`, `~`, `/`) and reloads. The caller handles fallback on error.
  pub fn chdir(&mut self, target: &str, opts: ListOptions) -> Result<()> {
    let resolved = resolve_path(&self.path, target);
    std::fs::read_dir(&resolved)
      .with_context(|| format!("cannot open {}", resolved.display()))?;
    self.path = resolved;
    self.title = abbr_path(&self.path);
    self.finder = None;
    self.cursor = 0;
    self.offset = 0;
    self.reload(opts)
  }

  /// Re-stats the path and rebuilds the listing: `..` first unless at
  /// the filesystem root, exclude filter, hidden filter, finder filter,
  /// sort, cursor clamp.
  pub fn reload(&mut self, opts: ListOptions) -> Result<()> {
    let read = std::fs::read_dir(&self.path)
      .with_context(|| format!("cannot read {}", self.path.display()))?;

    let marked: Vec<String> = self
      .entries
      .iter()
      .filter(|e| e.marked)
      .map(|e| e.name.clone())
      .collect();

    let mut entries = Vec::new();
    if self.path.parent().is_some() {
      entries.push(FileEntry::parent_of(&self.path));
    }
    for item in read.flatten() {
      let name = item.file_name().to_string_lossy().to_string();
      if opts.exclude.matches(&name) {
        continue;
      }
      let Some(mut entry) = FileEntry::stat(&self.path, &name) else {
        continue;
      };
      if !self.show_hidden && entry.is_hidden() {
        continue;
      }
      if let Some(finder) = &self.finder {
        if !finder.matches(&name) {
          continue;
        }
      }
      entry.marked = marked.contains(&name);
      entries.push(entry);
    }
    sort_entries(&mut entries, self.sort, opts.dirs_first);
    self.entries = entries;
    self.clamp_cursor();
    self.cursor_hidden = false;
    Ok(())
  }

  pub fn sort_by(&mut self, kind: SortKind, opts: ListOptions) {
    self.sort = kind;
    sort_entries(&mut self.entries, kind, opts.dirs_first);
    self.clamp_cursor();
  }

  fn clamp_cursor(&mut self) {
    if self.entries.is_empty() {
      self.cursor = 0;
    } else if self.cursor >= self.entries.len() {
      self.cursor = self.entries.len() - 1;
    }
    self.adjust_offset();
  }

  /// Rows available for entries inside the bordered pane.
  pub fn page_size(&self) -> usize {
    self.geometry.height.saturating_sub(2) as usize
  }

  fn adjust_offset(&mut self) {
    let visible = self.page_size();
    if visible == 0 {
      return;
    }
    if self.cursor < self.offset {
      self.offset = self.cursor;
    } else if self.cursor >= self.offset + visible {
      self.offset = self.cursor - visible + 1;
    }
  }

  pub fn set_cursor(&mut self, idx: usize) {
    self.cursor = idx;
    self.cursor_hidden = false;
    self.clamp_cursor();
  }

  pub fn move_cursor(&mut self, delta: i32) {
    if self.entries.is_empty() {
      return;
    }
    let len = self.entries.len() as i64;
    let next = (self.cursor as i64 + delta as i64).clamp(0, len - 1);
    self.cursor = next as usize;
    self.cursor_hidden = false;
    self.adjust_offset();
  }

  pub fn move_top(&mut self) {
    self.set_cursor(0);
  }

  pub fn move_bottom(&mut self) {
    if !self.entries.is_empty() {
      self.set_cursor(self.entries.len() - 1);
    }
  }

  pub fn page_down(&mut self) {
    self.move_cursor(self.page_size().max(1) as i32);
  }

  pub fn page_up(&mut self) {
    self.move_cursor(-(self.page_size().max(1) as i32));
  }

  /// Moves the viewport; the cursor follows so it stays visible.
  pub fn scroll(&mut self, amount: i32) {
    let visible = self.page_size();
    if visible == 0 || self.entries.is_empty() {
      return;
    }
    let max_offset = self.entries.len().saturating_sub(visible);
    let next = (self.offset as i64 + amount as i64).clamp(0, max_offset as i64);
    self.offset = next as usize;
    if self.cursor < self.offset {
      self.cursor = self.offset;
    } else if self.cursor >= self.offset + visible {
      self.cursor = self.offset + visible - 1;
    }
  }

  /// Positions the cursor on the named entry; when absent the cursor is
  /// flagged hidden so linked moves do not highlight a wrong row.
  pub fn set_cursor_by_name(&mut self, name: &str) {
    match self.index_by_name(name) {
      Some(idx) => {
        self.cursor = idx;
        self.cursor_hidden = false;
        self.adjust_offset();
      }
      None => self.cursor_hidden = true,
    }
  }

  pub fn is_cursor_hidden(&self) -> bool {
    self.cursor_hidden
  }

  pub fn index_by_name(&self, name: &str) -> Option<usize> {
    self.entries.iter().position(|e| e.name == name)
  }

  pub fn find_file_by_name(&self, name: &str) -> Option<&FileEntry> {
    self.entries.iter().find(|e| e.name == name)
  }

  /// The cursor entry, when any.
  pub fn file(&self) -> Option<&FileEntry> {
    self.entries.get(self.cursor)
  }

  pub fn base_name(&self) -> String {
    self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_else(|| self.path.to_string_lossy().to_string())
  }

  /// Chdirs into the cursor entry when it is a directory.
  pub fn enter_dir(&mut self, opts: ListOptions) -> Result<()> {
    let Some(entry) = self.file() else { return Ok(()) };
    if !entry.is_dir() {
      return Ok(());
    }
    let target = entry.path.to_string_lossy().to_string();
    self.chdir(&target, opts)
  }

  // Mark handling. `..` never participates in multi-selection.

  pub fn toggle_mark(&mut self) {
    if let Some(entry) = self.entries.get_mut(self.cursor) {
      if !entry.is_parent() {
        entry.marked = !entry.marked;
      }
    }
    self.move_cursor(1);
  }

  pub fn invert_mark(&mut self) {
    for entry in &mut self.entries {
      if !entry.is_parent() {
        entry.marked = !entry.marked;
      }
    }
  }

  pub fn mark_clear(&mut self) {
    for entry in &mut self.entries {
      entry.marked = false;
    }
  }

  pub fn is_mark(&self) -> bool {
    self.entries.iter().any(|e| e.marked)
  }

  pub fn mark_count(&self) -> usize {
    self.entries.iter().filter(|e| e.marked).count()
  }

  pub fn markfile_names(&self) -> Vec<String> {
    self
      .entries
      .iter()
      .filter(|e| e.marked)
      .map(|e| e.name.clone())
      .collect()
  }

  pub fn markfile_paths(&self) -> Vec<String> {
    self
      .entries
      .iter()
      .filter(|e| e.marked)
      .map(|e| e.path.to_string_lossy().to_string())
      .collect()
  }

  #[allow(dead_code)] // used in tests
  pub fn markfile_quoted_names(&self) -> Vec<String> {
    self.markfile_names().iter().map(|n| quote(n)).collect()
  }

  #[allow(dead_code)] // used in tests
  pub fn markfile_quoted_paths(&self) -> Vec<String> {
    self.markfile_paths().iter().map(|p| quote(p)).collect()
  }

  // Finder.

  pub fn open_finder(&mut self) {
    self.finder = Some(Finder::default());
  }

  pub fn close_finder(&mut self, opts: ListOptions) {
    if self.finder.take().is_some() {
      let _ = self.reload(opts);
    }
  }

  /// Replaces the listing with every entry under the current path whose
  /// relative path matches the wildcard pattern, recursing into
  /// subdirectories. Used by the globdir cmdline.
  pub fn glob_recursive(&mut self, pattern: &str, opts: ListOptions) {
    let mut found = Vec::new();
    let base = self.path.clone();
    collect_glob(&base, &base, pattern, opts, &mut found);
    let mut entries = Vec::new();
    if self.path.parent().is_some() {
      entries.push(FileEntry::parent_of(&self.path));
    }
    entries.extend(found);
    sort_entries(&mut entries, self.sort, opts.dirs_first);
    self.entries = entries;
    self.cursor = 0;
    self.offset = 0;
    self.cursor_hidden = false;
  }

  // Geometry and pointer mapping.

  pub fn resize(&mut self, rect: Rect) {
    self.geometry = rect;
    self.adjust_offset();
  }

  pub fn contains(&self, x: u16, y: u16) -> bool {
    let g = self.geometry;
    x >= g.x && x < g.x + g.width && y >= g.y && y < g.y + g.height
  }

  /// Maps a screen row inside the pane to an entry index. Border rows
  /// and rows past the listing return None.
  pub fn file_index_at_y(&self, y: u16) -> Option<usize> {
    let g = self.geometry;
    if g.height < 3 || y <= g.y || y >= g.y + g.height - 1 {
      return None;
    }
    let row = (y - g.y - 1) as usize;
    let idx = self.offset + row;
    if idx < self.entries.len() {
      Some(idx)
    } else {
      None
    }
  }
}

fn collect_glob(
  base: &Path,
  dir: &Path,
  pattern: &str,
  opts: ListOptions,
  out: &mut Vec<FileEntry>,
) {
  let Ok(read) = std::fs::read_dir(dir) else { return };
  for item in read.flatten() {
    let name = item.file_name().to_string_lossy().to_string();
    if opts.exclude.matches(&name) {
      continue;
    }
    let Some(mut entry) = FileEntry::stat(dir, &name) else { continue };
    let relative = entry
      .path
      .strip_prefix(base)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|_| name.clone());
    let is_dir = entry.is_dir() && !entry.is_symlink();
    if wildcard_match(pattern, &name) {
      entry.name = relative.clone();
      out.push(entry);
    }
    if is_dir {
      collect_glob(base, &dir.join(&name), pattern, opts, out);
    }
  }
}

/// Resolves a chdir target against `current`: `~` expansion, absolute
/// paths as-is, relative paths joined then normalized without touching
/// the filesystem (symlinked components keep their spelled path).
pub fn resolve_path(current: &Path, target: &str) -> PathBuf {
  let expanded = expand_tilde(target);
  let joined = if expanded.is_absolute() {
    expanded
  } else {
    current.join(expanded)
  };
  normalize(&joined)
}

pub fn expand_tilde(target: &str) -> PathBuf {
  if target == "~" {
    return dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
  }
  if let Some(rest) = target.strip_prefix("~/") {
    return dirs::home_dir()
      .unwrap_or_else(|| PathBuf::from("/"))
      .join(rest);
  }
  PathBuf::from(target)
}

fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for comp in path.components() {
    match comp {
      Component::CurDir => {}
      Component::ParentDir => {
        if !out.pop() {
          out.push("..");
        }
      }
      other => out.push(other.as_os_str()),
    }
  }
  if out.as_os_str().is_empty() {
    PathBuf::from("/")
  } else {
    out
  }
}

/// Abbreviates the home prefix to `~` for pane titles and crumbs.
pub fn abbr_path(path: &Path) -> String {
  if let Some(home) = dirs::home_dir() {
    if let Ok(rest) = path.strip_prefix(&home) {
      if rest.as_os_str().is_empty() {
        return "~".to_string();
      }
      return format!("~/{}", rest.display());
    }
  }
  path.to_string_lossy().to_string()
}
