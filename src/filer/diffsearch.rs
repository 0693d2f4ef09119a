use std::collections::BTreeSet;
use std::path::PathBuf;

use super::directory::Directory;

/// State of one difference-search session, surfaced on the diff-status
/// row. Created on start, cleared on completion or cancellation.
#[derive(Debug, Clone, Default)]
pub struct DiffSearchState {
  pub initial_dirs: Vec<PathBuf>,
  pub active: bool,
  pub searching: bool,
  pub current_path: String,
  pub files_checked: usize,
  pub last_diff_name: String,
  pub last_diff_reason: String,
}

impl DiffSearchState {
  pub fn new(dirs: &[Directory]) -> Self {
    Self {
      initial_dirs: dirs.iter().map(|d| d.path.clone()).collect(),
      active: true,
      ..Default::default()
    }
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn set_last_diff(&mut self, name: &str, reason: &str) {
    self.last_diff_name = name.to_string();
    self.last_diff_reason = reason.to_string();
    self.searching = false; // paused at a difference
  }

  /// True when every pane is back at the path recorded at search start.
  pub fn at_initial_dirs(&self, dirs: &[Directory]) -> bool {
    self.initial_dirs.len() == dirs.len()
      && self
        .initial_dirs
        .iter()
        .zip(dirs)
        .all(|(initial, d)| *initial == d.path)
  }

  pub fn status_text(&self) -> String {
    if !self.active {
      return String::new();
    }
    if self.searching {
      if self.current_path.is_empty() {
        return format!("[DIFF: searching ({} files)]", self.files_checked);
      }
      return format!(
        "[DIFF: searching {} ({} files)]",
        self.current_path, self.files_checked
      );
    }
    if !self.last_diff_name.is_empty() {
      return format!("[DIFF: {} - {}]", self.last_diff_name, self.last_diff_reason);
    }
    "[DIFF SEARCH]".to_string()
  }
}

/// Abstraction over "the current tuple of parallel directories" so the
/// walker stays independent of workspace and UI concerns.
pub trait Navigator {
  fn dirs(&self) -> &[Directory];
  fn chdir_all(&mut self, name: &str);
  fn chdir_parent_all(&mut self);
  fn current_path(&self) -> String;
  fn rebuild_index(&mut self);
}

/// Outcome of one walker run: either the traversal paused on a finding,
/// or it returned to the initial directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkStep {
  FoundDiff { name: String, reason: String, is_dir: bool },
  Complete,
}

fn find_in<'a>(dir: &'a Directory, name: &str) -> Option<&'a super::entry::FileEntry> {
  dir.entries.iter().find(|e| e.name == name && !e.is_parent())
}

/// Sorted case-sensitive union of names across panes, `..` excluded.
/// `dirs_only` selects subdirectory names, otherwise file names.
fn collect_names(dirs: &[Directory], dirs_only: bool) -> Vec<String> {
  let mut set = BTreeSet::new();
  for dir in dirs {
    for entry in &dir.entries {
      if entry.is_parent() || entry.is_dir() != dirs_only {
        continue;
      }
      set.insert(entry.name.clone());
    }
  }
  set.into_iter().collect()
}

/// Checks one name across the panes.
/// Returns (is_different, reason, is_dir).
pub fn check_difference(name: &str, dirs: &[Directory]) -> (bool, String, bool) {
  let mut present = Vec::new();
  let mut missing = Vec::new();
  for (i, dir) in dirs.iter().enumerate() {
    match find_in(dir, name) {
      Some(entry) => present.push(entry),
      None => missing.push(i + 1), // 1-indexed for display
    }
  }

  if !missing.is_empty() {
    let reason = if missing.len() == 1 {
      format!("missing in window {}", missing[0])
    } else {
      format!("missing in windows {missing:?}")
    };
    let is_dir = present.first().is_some_and(|e| e.is_dir());
    return (true, reason, is_dir);
  }

  // Directories compare by presence only; subdir traversal finds the
  // structural differences inside them.
  if present.first().is_some_and(|e| e.is_dir()) {
    return (false, String::new(), true);
  }

  let first_size = present[0].size;
  if present.iter().any(|e| e.size != first_size) {
    return (true, "size mismatch".to_string(), false);
  }
  (false, String::new(), false)
}

/// Next subdirectory strictly after `start_after` that exists as a
/// directory in every pane.
fn next_common_subdir(dirs: &[Directory], start_after: &str) -> Option<String> {
  collect_names(dirs, true)
    .into_iter()
    .filter(|name| start_after.is_empty() || name.as_str() > start_after)
    .find(|name| dirs.iter().all(|d| find_in(d, name).is_some_and(|e| e.is_dir())))
}

/// Deterministic traversal over the union of child names in parallel
/// panes. Scans files, then subdirectory structure, then descends into
/// the first common subdirectory; ascends when a level is exhausted and
/// completes when back at the recorded initial directories.
pub struct TreeWalker<'a, N: Navigator> {
  nav: &'a mut N,
  start_after: String,
}

impl<'a, N: Navigator> TreeWalker<'a, N> {
  pub fn new(nav: &'a mut N, start_after: &str) -> Self {
    Self { nav, start_after: start_after.to_string() }
  }

  pub fn run(mut self, state: &mut DiffSearchState) -> WalkStep {
    loop {
      state.current_path = self.nav.current_path();

      // Files first.
      for name in collect_names(self.nav.dirs(), false) {
        if !self.start_after.is_empty() && name.as_str() <= self.start_after.as_str() {
          continue;
        }
        state.files_checked += 1;
        let (diff, reason, is_dir) = check_difference(&name, self.nav.dirs());
        if diff {
          return WalkStep::FoundDiff { name, reason, is_dir };
        }
      }

      // Then subdirectory structure.
      for name in collect_names(self.nav.dirs(), true) {
        if !self.start_after.is_empty() && name.as_str() <= self.start_after.as_str() {
          continue;
        }
        state.files_checked += 1;
        let (diff, reason, _) = check_difference(&name, self.nav.dirs());
        if diff {
          return WalkStep::FoundDiff { name: format!("{name}/"), reason, is_dir: true };
        }
      }

      // Descend into the next common subdirectory.
      if let Some(subdir) = next_common_subdir(self.nav.dirs(), &self.start_after) {
        self.nav.chdir_all(&subdir);
        self.nav.rebuild_index();
        self.start_after.clear();
        continue;
      }

      // Level exhausted: finish at the roots, otherwise resume from the
      // next sibling of the directory being left.
      if state.at_initial_dirs(self.nav.dirs()) {
        return WalkStep::Complete;
      }
      let child = PathBuf::from(self.nav.current_path())
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
      self.nav.chdir_parent_all();
      self.nav.rebuild_index();
      self.start_after = child;
    }
  }
}
