use std::path::PathBuf;

use anyhow::{Context, Result};
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

use super::compare::{CompareState, ComparisonIndex};
use super::diffsearch::{DiffSearchState, Navigator};
use super::directory::{Directory, ListOptions};
use super::sort::SortKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
  #[default]
  Tile,
  TileTop,
  TileBottom,
  OneRow,
  OneColumn,
  Fullscreen,
}

fn home_dir() -> PathBuf {
  dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// The process working directory is global state; tests that move or
/// assert it serialize on this lock.
#[cfg(test)]
pub static TEST_CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// An ordered set of directory panes with a focused index and a layout.
/// The focused pane's path doubles as the process working directory
/// while the workspace is visible.
#[derive(Debug)]
pub struct Workspace {
  pub title: String,
  pub dirs: Vec<Directory>,
  pub focus: usize,
  pub layout: Layout,
  pub comparison: Option<ComparisonIndex>,
  pub diff_search: Option<DiffSearchState>,
  pub geometry: Rect,
}

impl Workspace {
  pub fn new(title: &str, dirs: Vec<Directory>) -> Self {
    assert!(!dirs.is_empty(), "a workspace holds at least one pane");
    Self {
      title: title.to_string(),
      dirs,
      focus: 0,
      layout: Layout::Tile,
      comparison: None,
      diff_search: None,
      geometry: Rect::default(),
    }
  }

  pub fn dir(&self) -> &Directory {
    &self.dirs[self.focus]
  }

  pub fn dir_mut(&mut self) -> &mut Directory {
    let focus = self.focus;
    &mut self.dirs[focus]
  }

  pub fn next_index(&self) -> usize {
    (self.focus + 1) % self.dirs.len()
  }

  pub fn prev_index(&self) -> usize {
    (self.focus + self.dirs.len() - 1) % self.dirs.len()
  }

  pub fn next_dir(&self) -> &Directory {
    &self.dirs[self.next_index()]
  }

  /// Prepends a new home-rooted pane and focuses it.
  pub fn create_dir(&mut self, opts: ListOptions) {
    let mut dir = Directory::new(home_dir());
    let _ = dir.reload(opts);
    self.dirs.insert(0, dir);
    self.focus = 0;
    let _ = self.attach(opts);
    self.allocate();
    self.rebuild_comparison_index();
  }

  /// Removes the focused pane; at least one always remains.
  pub fn close_dir(&mut self, opts: ListOptions) {
    if self.dirs.len() < 2 {
      return;
    }
    self.dirs.remove(self.focus);
    if self.focus >= self.dirs.len() {
      self.focus = self.dirs.len() - 1;
    }
    let _ = self.attach(opts);
    self.allocate();
    self.rebuild_comparison_index();
  }

  /// Wrap-around focus move; the process chdirs to the new pane.
  pub fn move_focus(&mut self, amount: i32, opts: ListOptions) {
    let len = self.dirs.len() as i64;
    self.focus = ((self.focus as i64 + amount as i64).rem_euclid(len)) as usize;
    let _ = self.attach(opts);
  }

  pub fn set_focus(&mut self, idx: usize, opts: ListOptions) {
    self.focus = idx.min(self.dirs.len() - 1);
    let _ = self.attach(opts);
  }

  /// Syncs the process working directory to the focused pane, falling
  /// back to home when the pane's path has gone away.
  pub fn attach(&mut self, opts: ListOptions) -> Result<()> {
    let path = self.dir().path.clone();
    if let Err(err) = std::env::set_current_dir(&path) {
      let home = home_dir();
      let _ = self.dir_mut().chdir(&home.to_string_lossy(), opts);
      let _ = std::env::set_current_dir(&home);
      return Err(err).with_context(|| format!("chdir {}", path.display()));
    }
    Ok(())
  }

  /// Swaps the focused pane with the next one, following the pane.
  pub fn swap_next_dir(&mut self, opts: ListOptions) {
    let next = self.next_index();
    self.dirs.swap(self.focus, next);
    self.move_focus(1, opts);
    self.allocate();
  }

  pub fn swap_prev_dir(&mut self, opts: ListOptions) {
    let prev = self.prev_index();
    self.dirs.swap(self.focus, prev);
    self.move_focus(-1, opts);
    self.allocate();
  }

  /// Adopts the next pane's path in the focused pane.
  pub fn chdir_neighbor(&mut self, opts: ListOptions) -> Result<()> {
    let target = self.next_dir().path.to_string_lossy().to_string();
    self.dir_mut().chdir(&target, opts)
  }

  /// Reloads every pane and rebuilds the comparison index. Per-pane
  /// failures are collected, never aborting the rest.
  pub fn reload_all(&mut self, opts: ListOptions) -> Vec<String> {
    let mut errors = Vec::new();
    for dir in &mut self.dirs {
      if let Err(err) = dir.reload(opts) {
        errors.push(format!("{err:#}"));
      }
    }
    if let Err(err) = self.attach(opts) {
      errors.push(format!("{err:#}"));
    }
    self.rebuild_comparison_index();
    errors
  }

  pub fn rebuild_comparison_index(&mut self) {
    self.comparison = ComparisonIndex::build(&self.dirs);
  }

  #[allow(dead_code)] // used in tests
  pub fn get_compare_state(&self, pane: usize, name: &str) -> Option<CompareState> {
    self.comparison.as_ref()?.get(pane, name)
  }

  /// Digest computation for one shared filename.
  /// Returns the count of entries processed.
  pub fn calculate_digest_for_file(&self, name: &str) -> usize {
    match &self.comparison {
      Some(index) => index.update_digest_states(name, &self.dirs),
      None => 0,
    }
  }

  /// Chdirs every pane into the named subdirectory; used by the diff
  /// walker where the name is known to exist everywhere.
  pub fn chdir_all(&mut self, name: &str, opts: ListOptions) {
    for dir in &mut self.dirs {
      let _ = dir.chdir(name, opts);
    }
    self.rebuild_comparison_index();
  }

  /// Linked enter-dir support: every non-focused pane chdirs into
  /// `name` only when it exists as a subdirectory there. The caller
  /// advances the focused pane and rebuilds the index afterwards.
  /// Returns (navigated, skipped).
  pub fn chdir_all_to_subdir_no_rebuild(
    &mut self,
    name: &str,
    opts: ListOptions,
  ) -> (usize, usize) {
    let mut navigated = 0;
    let mut skipped = 0;
    for (i, dir) in self.dirs.iter_mut().enumerate() {
      if i == self.focus {
        continue; // the caller handles the focused pane
      }
      let target = dir.path.join(name);
      let is_dir = std::fs::metadata(&target).map(|m| m.is_dir()).unwrap_or(false);
      if is_dir && dir.chdir(name, opts).is_ok() {
        navigated += 1;
      } else {
        skipped += 1;
      }
    }
    (navigated, skipped)
  }

  /// Linked parent navigation for the non-focused panes.
  pub fn chdir_all_to_parent(&mut self, opts: ListOptions) {
    let focus = self.focus;
    for (i, dir) in self.dirs.iter_mut().enumerate() {
      if i == focus {
        continue;
      }
      let _ = dir.chdir("..", opts);
    }
    self.rebuild_comparison_index();
  }

  /// Returns every pane to its diff-search starting path.
  pub fn chdir_all_to_initial(&mut self, opts: ListOptions) -> bool {
    let Some(state) = &self.diff_search else { return false };
    if state.initial_dirs.len() != self.dirs.len() {
      return false;
    }
    let initial = state.initial_dirs.clone();
    for (dir, path) in self.dirs.iter_mut().zip(initial) {
      let _ = dir.chdir(&path.to_string_lossy(), opts);
    }
    self.rebuild_comparison_index();
    true
  }

  pub fn sort_all_by(&mut self, kind: SortKind, opts: ListOptions) {
    for dir in &mut self.dirs {
      dir.sort_by(kind, opts);
    }
    self.rebuild_comparison_index();
  }

  /// Positions every pane's cursor on the named entry; panes lacking it
  /// hide their cursor.
  pub fn set_cursor_by_name_all(&mut self, name: &str) {
    for dir in &mut self.dirs {
      dir.set_cursor_by_name(name);
    }
  }

  pub fn start_diff_search(&mut self) {
    self.diff_search = Some(DiffSearchState::new(&self.dirs));
  }

  pub fn clear_diff_search(&mut self) {
    if let Some(state) = &mut self.diff_search {
      state.clear();
    }
    self.diff_search = None;
  }

  pub fn is_diff_search_active(&self) -> bool {
    self.diff_search.as_ref().is_some_and(|s| s.active)
  }

  /// Entry listings are dropped while a workspace is hidden and rebuilt
  /// when it becomes visible again.
  pub fn set_visible(&mut self, visible: bool, opts: ListOptions) {
    if visible {
      self.reload_all(opts);
    } else {
      for dir in &mut self.dirs {
        dir.entries.clear();
      }
    }
  }

  // Layout allocation. Deterministic in (geometry, |dirs|); the last
  // pane absorbs the odd remainder in every split.

  pub fn set_layout(&mut self, layout: Layout) {
    self.layout = layout;
    self.allocate();
  }

  pub fn resize(&mut self, rect: Rect) {
    self.geometry = rect;
    self.allocate();
  }

  pub fn allocate(&mut self) {
    match self.layout {
      Layout::Tile => self.layout_tile(),
      Layout::TileTop => self.layout_tile_top(),
      Layout::TileBottom => self.layout_tile_bottom(),
      Layout::OneRow => self.layout_one_row(),
      Layout::OneColumn => self.layout_one_column(),
      Layout::Fullscreen => self.layout_fullscreen(),
    }
  }

  fn layout_tile(&mut self) {
    let Rect { x, y, width: w, height: h } = self.geometry;
    let k = self.dirs.len() - 1;
    if k < 1 {
      self.dirs[0].resize(self.geometry);
      return;
    }
    let half = w / 2;
    let wodd = w % 2;
    self.dirs[0].resize(Rect::new(x, y, half, h));
    let each = h / k as u16;
    let hodd = h % k as u16;
    for (i, dir) in self.dirs[1..k].iter_mut().enumerate() {
      dir.resize(Rect::new(x + half, y + each * i as u16, half + wodd, each));
    }
    self.dirs[k].resize(Rect::new(
      x + half,
      y + each * (k as u16 - 1),
      half + wodd,
      each + hodd,
    ));
  }

  fn layout_tile_top(&mut self) {
    let Rect { x, y, width: w, height: h } = self.geometry;
    let k = self.dirs.len() - 1;
    if k < 1 {
      self.dirs[0].resize(self.geometry);
      return;
    }
    let half = h / 2;
    let hodd = h % 2;
    let each = w / k as u16;
    let wodd = w % 2;
    self.dirs[0].resize(Rect::new(x, y, each, half));
    self.dirs[k].resize(Rect::new(x, y + half, w, half + hodd));
    if k < 2 {
      return;
    }
    for (i, dir) in self.dirs[1..k - 1].iter_mut().enumerate() {
      dir.resize(Rect::new(x + each * (i as u16 + 1), y, each, half));
    }
    self.dirs[k - 1].resize(Rect::new(x + each * (k as u16 - 1), y, each + wodd, half));
  }

  fn layout_tile_bottom(&mut self) {
    let Rect { x, y, width: w, height: h } = self.geometry;
    let k = self.dirs.len() - 1;
    if k < 1 {
      self.dirs[0].resize(self.geometry);
      return;
    }
    let half = h / 2;
    let hodd = h % 2;
    self.dirs[0].resize(Rect::new(x, y, w, half));
    let each = w / k as u16;
    let wodd = w % 2;
    for (i, dir) in self.dirs[1..k].iter_mut().enumerate() {
      dir.resize(Rect::new(x + each * i as u16, y + half, each, half + hodd));
    }
    self.dirs[k].resize(Rect::new(
      x + each * (k as u16 - 1),
      y + half,
      each + wodd,
      half + hodd,
    ));
  }

  fn layout_one_row(&mut self) {
    let Rect { x, y, width: w, height: h } = self.geometry;
    let k = self.dirs.len() as u16;
    let each = w / k;
    let wodd = w % k;
    let last = self.dirs.len() - 1;
    for (i, dir) in self.dirs[..last].iter_mut().enumerate() {
      dir.resize(Rect::new(x + each * i as u16, y, each, h));
    }
    self.dirs[last].resize(Rect::new(x + each * (k - 1), y, each + wodd, h));
  }

  fn layout_one_column(&mut self) {
    let Rect { x, y, width: w, height: h } = self.geometry;
    let k = self.dirs.len() as u16;
    let each = h / k;
    let hodd = h % k;
    let last = self.dirs.len() - 1;
    for (i, dir) in self.dirs[..last].iter_mut().enumerate() {
      dir.resize(Rect::new(x, y + each * i as u16, w, each));
    }
    self.dirs[last].resize(Rect::new(x, y + each * (k - 1), w, each + hodd));
  }

  fn layout_fullscreen(&mut self) {
    let rect = self.geometry;
    for dir in &mut self.dirs {
      dir.resize(rect);
    }
  }

  /// The pane containing (x, y) and its index. Fullscreen layout only
  /// hit-tests the focused pane since the others are not drawn.
  pub fn directory_at(&self, x: u16, y: u16) -> Option<(usize, &Directory)> {
    if self.layout == Layout::Fullscreen {
      let dir = self.dir();
      return dir.contains(x, y).then_some((self.focus, dir));
    }
    self
      .dirs
      .iter()
      .enumerate()
      .find(|(_, d)| d.contains(x, y))
  }
}

/// Adapts a Workspace to the walker's Navigator interface, keeping the
/// traversal logic free of layout and UI concerns.
pub struct WorkspaceNavigator<'a> {
  ws: &'a mut Workspace,
  exclude: super::exclude::ExcludeSet,
  dirs_first: bool,
}

impl<'a> WorkspaceNavigator<'a> {
  pub fn new(ws: &'a mut Workspace, opts: ListOptions) -> Self {
    Self {
      ws,
      exclude: opts.exclude.clone(),
      dirs_first: opts.dirs_first,
    }
  }

  fn opts(&self) -> ListOptions<'_> {
    ListOptions { exclude: &self.exclude, dirs_first: self.dirs_first }
  }
}

impl Navigator for WorkspaceNavigator<'_> {
  fn dirs(&self) -> &[Directory] {
    &self.ws.dirs
  }

  fn chdir_all(&mut self, name: &str) {
    let exclude = self.exclude.clone();
    let opts = ListOptions { exclude: &exclude, dirs_first: self.dirs_first };
    for dir in &mut self.ws.dirs {
      let _ = dir.chdir(name, opts);
    }
  }

  fn chdir_parent_all(&mut self) {
    let exclude = self.exclude.clone();
    let opts = ListOptions { exclude: &exclude, dirs_first: self.dirs_first };
    for dir in &mut self.ws.dirs {
      let _ = dir.chdir("..", opts);
    }
  }

  fn current_path(&self) -> String {
    self.ws.dir().path.to_string_lossy().to_string()
  }

  fn rebuild_index(&mut self) {
    self.ws.rebuild_comparison_index();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filer::exclude::ExcludeSet;
  use std::fs;
  use std::sync::atomic::{AtomicU32, Ordering};


  static COUNTER: AtomicU32 = AtomicU32::new(0);

  fn cwd_guard() -> std::sync::MutexGuard<'static, ()> {
    TEST_CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn test_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("goful_ws_{prefix}_{id}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  fn pane(root: &PathBuf, exclude: &ExcludeSet) -> Directory {
    let mut d = Directory::new(root.clone());
    d.reload(ListOptions { exclude, dirs_first: false }).unwrap();
    d
  }

  fn opts(exclude: &ExcludeSet) -> ListOptions<'_> {
    ListOptions { exclude, dirs_first: false }
  }

  #[test]
  fn test_move_focus_wraps_and_chdirs() {
    let _guard = cwd_guard();
    let r0 = test_dir("focus0");
    let r1 = test_dir("focus1");
    let r2 = test_dir("focus2");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new(
      "1",
      vec![pane(&r0, &exclude), pane(&r1, &exclude), pane(&r2, &exclude)],
    );

    ws.move_focus(1, opts(&exclude));
    assert_eq!(ws.focus, 1);
    assert_eq!(
      std::env::current_dir().unwrap().canonicalize().unwrap(),
      r1.canonicalize().unwrap()
    );

    ws.move_focus(2, opts(&exclude));
    assert_eq!(ws.focus, 0, "(1 + 2) mod 3");
    ws.move_focus(-1, opts(&exclude));
    assert_eq!(ws.focus, 2);
    ws.move_focus(-5, opts(&exclude));
    assert_eq!(ws.focus, 0, "(2 - 5) mod 3");

    for r in [r0, r1, r2] {
      let _ = fs::remove_dir_all(&r);
    }
  }

  #[test]
  fn test_create_and_close_dir() {
    let _guard = cwd_guard();
    let r0 = test_dir("create0");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude)]);
    ws.geometry = Rect::new(0, 0, 80, 24);

    ws.create_dir(opts(&exclude));
    assert_eq!(ws.dirs.len(), 2);
    assert_eq!(ws.focus, 0, "new pane is prepended and focused");

    ws.close_dir(opts(&exclude));
    assert_eq!(ws.dirs.len(), 1);
    ws.close_dir(opts(&exclude));
    assert_eq!(ws.dirs.len(), 1, "the last pane never closes");

    let _ = fs::remove_dir_all(&r0);
  }

  #[test]
  fn test_swap_moves_focus_with_pane() {
    let _guard = cwd_guard();
    let r0 = test_dir("swap0");
    let r1 = test_dir("swap1");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r1, &exclude)]);
    ws.geometry = Rect::new(0, 0, 80, 24);

    ws.swap_next_dir(opts(&exclude));
    assert_eq!(ws.focus, 1);
    assert_eq!(ws.dirs[1].path, r0, "the swapped pane kept focus");
    assert_eq!(ws.dirs[0].path, r1);

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }

  #[test]
  fn test_reload_all_rebuilds_index() {
    let r0 = test_dir("reload0");
    let r1 = test_dir("reload1");
    fs::write(r0.join("shared"), "x").unwrap();
    fs::write(r1.join("shared"), "x").unwrap();
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r1, &exclude)]);

    assert!(ws.comparison.is_none());
    let _guard = cwd_guard();
    let errors = ws.reload_all(opts(&exclude));
    assert!(errors.is_empty());
    assert!(ws.get_compare_state(0, "shared").is_some());

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }

  #[test]
  fn test_linked_subdir_counts_navigated_and_skipped() {
    let r0 = test_dir("link0");
    let r1 = test_dir("link1");
    let r2 = test_dir("link2");
    fs::create_dir(r0.join("common")).unwrap();
    fs::create_dir(r1.join("common")).unwrap();
    // r2 lacks `common`.
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new(
      "1",
      vec![pane(&r0, &exclude), pane(&r1, &exclude), pane(&r2, &exclude)],
    );
    ws.focus = 0;

    let (navigated, skipped) = ws.chdir_all_to_subdir_no_rebuild("common", opts(&exclude));
    assert_eq!(navigated, 1, "pane 1 followed");
    assert_eq!(skipped, 1, "pane 2 lacked the subdir");
    assert_eq!(ws.dirs[0].path, r0, "focused pane untouched");
    assert_eq!(ws.dirs[1].path, r1.join("common"));
    assert_eq!(ws.dirs[2].path, r2);

    for r in [r0, r1, r2] {
      let _ = fs::remove_dir_all(&r);
    }
  }

  #[test]
  fn test_chdir_all_to_parent_skips_focused() {
    let root = test_dir("parent");
    fs::create_dir_all(root.join("a/inner")).unwrap();
    fs::create_dir_all(root.join("b/inner")).unwrap();
    let exclude = ExcludeSet::default();
    let a = root.join("a/inner");
    let b = root.join("b/inner");
    let mut ws = Workspace::new("1", vec![pane(&a, &exclude), pane(&b, &exclude)]);
    ws.focus = 0;

    ws.chdir_all_to_parent(opts(&exclude));
    assert_eq!(ws.dirs[0].path, a, "focused pane is handled by the caller");
    assert_eq!(ws.dirs[1].path, root.join("b"));

    let _ = fs::remove_dir_all(&root);
  }

  #[test]
  fn test_set_cursor_by_name_all_hides_missing() {
    let r0 = test_dir("cursor0");
    let r1 = test_dir("cursor1");
    fs::write(r0.join("target"), "").unwrap();
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r1, &exclude)]);

    ws.set_cursor_by_name_all("target");
    assert!(!ws.dirs[0].is_cursor_hidden());
    assert_eq!(ws.dirs[0].file().unwrap().name, "target");
    assert!(ws.dirs[1].is_cursor_hidden());

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }

  #[test]
  fn test_sort_all_by_applies_everywhere() {
    let r0 = test_dir("sort0");
    let r1 = test_dir("sort1");
    for r in [&r0, &r1] {
      fs::write(r.join("big"), "xxxxx").unwrap();
      fs::write(r.join("small"), "x").unwrap();
    }
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r1, &exclude)]);

    ws.sort_all_by(SortKind::SizeRev, opts(&exclude));
    for dir in &ws.dirs {
      assert_eq!(dir.sort, SortKind::SizeRev);
      assert_eq!(dir.entries[1].name, "big");
    }

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }

  #[test]
  fn test_diff_search_lifecycle() {
    let r0 = test_dir("diff0");
    let r1 = test_dir("diff1");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r1, &exclude)]);

    assert!(!ws.is_diff_search_active());
    ws.start_diff_search();
    assert!(ws.is_diff_search_active());
    assert_eq!(
      ws.diff_search.as_ref().unwrap().initial_dirs,
      vec![r0.clone(), r1.clone()]
    );
    ws.clear_diff_search();
    assert!(!ws.is_diff_search_active());

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }

  #[test]
  fn test_layout_one_row_deterministic() {
    let r0 = test_dir("lay0");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new(
      "1",
      vec![pane(&r0, &exclude), pane(&r0, &exclude), pane(&r0, &exclude)],
    );
    ws.layout = Layout::OneRow;
    ws.resize(Rect::new(0, 1, 80, 23));

    assert_eq!(ws.dirs[0].geometry, Rect::new(0, 1, 26, 23));
    assert_eq!(ws.dirs[1].geometry, Rect::new(26, 1, 26, 23));
    assert_eq!(ws.dirs[2].geometry, Rect::new(52, 1, 28, 23), "last pane absorbs remainder");

    let _ = fs::remove_dir_all(&r0);
  }

  #[test]
  fn test_layout_tile_two_panes() {
    let r0 = test_dir("tile0");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r0, &exclude)]);
    ws.layout = Layout::Tile;
    ws.resize(Rect::new(0, 1, 81, 23));

    assert_eq!(ws.dirs[0].geometry, Rect::new(0, 1, 40, 23));
    assert_eq!(ws.dirs[1].geometry, Rect::new(40, 1, 41, 23));

    let _ = fs::remove_dir_all(&r0);
  }

  #[test]
  fn test_layout_single_pane_fills() {
    let r0 = test_dir("single");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude)]);
    for layout in [Layout::Tile, Layout::TileTop, Layout::TileBottom] {
      ws.layout = layout;
      ws.resize(Rect::new(0, 0, 80, 24));
      assert_eq!(ws.dirs[0].geometry, Rect::new(0, 0, 80, 24));
    }
    let _ = fs::remove_dir_all(&r0);
  }

  #[test]
  fn test_directory_at_hit_testing() {
    let r0 = test_dir("hit0");
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r0, &exclude)]);
    ws.layout = Layout::OneRow;
    ws.resize(Rect::new(0, 1, 80, 23));

    assert_eq!(ws.directory_at(5, 5).unwrap().0, 0);
    assert_eq!(ws.directory_at(45, 5).unwrap().0, 1);
    assert!(ws.directory_at(5, 0).is_none(), "above the panes");

    ws.layout = Layout::Fullscreen;
    ws.allocate();
    ws.focus = 1;
    assert_eq!(ws.directory_at(5, 5).unwrap().0, 1, "fullscreen hits the focused pane");

    let _ = fs::remove_dir_all(&r0);
  }

  #[test]
  fn test_workspace_navigator_adapts() {
    let r0 = test_dir("nav0");
    let r1 = test_dir("nav1");
    fs::create_dir(r0.join("sub")).unwrap();
    fs::create_dir(r1.join("sub")).unwrap();
    let exclude = ExcludeSet::default();
    let mut ws = Workspace::new("1", vec![pane(&r0, &exclude), pane(&r1, &exclude)]);

    let mut nav = WorkspaceNavigator::new(&mut ws, opts(&exclude));
    assert_eq!(nav.current_path(), r0.to_string_lossy());
    nav.chdir_all("sub");
    nav.rebuild_index();
    assert_eq!(nav.dirs()[0].path, r0.join("sub"));
    nav.chdir_parent_all();
    assert_eq!(nav.dirs()[1].path, r1);

    let _ = fs::remove_dir_all(&r0);
    let _ = fs::remove_dir_all(&r1);
  }
}
