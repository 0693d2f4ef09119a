pub mod compare;
pub mod diffsearch;
pub mod directory;
pub mod entry;
pub mod exclude;
pub mod ops;
pub mod sort;
pub mod workspace;

use std::path::PathBuf;

use crate::action::{default_extmap, default_keymap, Action, Extmap, Keymap};

pub use compare::{CompareState, ComparisonIndex, DigestCompare, SizeCompare, TimeCompare};
pub use diffsearch::{DiffSearchState, Navigator, TreeWalker, WalkStep};
pub use directory::{Directory, Finder, ListOptions};
pub use entry::{FileEntry, FileKind};
pub use exclude::ExcludeSet;
pub use sort::SortKind;
pub use workspace::{Layout, Workspace, WorkspaceNavigator};

fn home_dir() -> PathBuf {
  dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// The filer: an ordered stack of workspaces with a current index, plus
/// the key and extension dispatch tables.
pub struct Filer {
  pub workspaces: Vec<Workspace>,
  pub current: usize,
  pub keymap: Keymap,
  pub extmap: Extmap,
  /// Directories-first sort priority, applied to every pane.
  pub dirs_first: bool,
}

impl Filer {
  /// The default layout: three workspaces of two home-rooted panes.
  pub fn new() -> Self {
    let workspaces = (1..=3)
      .map(|i| {
        let dirs = vec![Directory::new(home_dir()), Directory::new(home_dir())];
        Workspace::new(&i.to_string(), dirs)
      })
      .collect();
    Self {
      workspaces,
      current: 0,
      keymap: default_keymap(),
      extmap: default_extmap(),
      dirs_first: false,
    }
  }

  pub fn workspace(&self) -> &Workspace {
    &self.workspaces[self.current]
  }

  pub fn workspace_mut(&mut self) -> &mut Workspace {
    let current = self.current;
    &mut self.workspaces[current]
  }

  pub fn dir(&self) -> &Directory {
    self.workspace().dir()
  }

  pub fn dir_mut(&mut self) -> &mut Directory {
    self.workspace_mut().dir_mut()
  }

  /// The cursor entry of the focused pane.
  pub fn file(&self) -> Option<&FileEntry> {
    self.dir().file()
  }

  /// Appends a workspace of two fresh home panes and keeps the current
  /// selection.
  pub fn create_workspace(&mut self, opts: ListOptions) {
    let title = (self.workspaces.len() + 1).to_string();
    let mut ws = Workspace::new(
      &title,
      vec![Directory::new(home_dir()), Directory::new(home_dir())],
    );
    ws.geometry = self.workspace().geometry;
    ws.set_visible(false, opts);
    ws.allocate();
    self.workspaces.push(ws);
  }

  /// Closes the current workspace; at least one always remains.
  pub fn close_workspace(&mut self, opts: ListOptions) {
    if self.workspaces.len() < 2 {
      return;
    }
    self.workspaces[self.current].set_visible(false, opts);
    self.workspaces.remove(self.current);
    if self.current >= self.workspaces.len() {
      self.current = self.workspaces.len() - 1;
    }
    self.workspaces[self.current].set_visible(true, opts);
  }

  /// Wrap-around workspace switch with visibility handling.
  pub fn move_workspace(&mut self, amount: i32, opts: ListOptions) {
    let len = self.workspaces.len() as i64;
    let next = ((self.current as i64 + amount as i64).rem_euclid(len)) as usize;
    self.set_workspace(next, opts);
  }

  pub fn set_workspace(&mut self, idx: usize, opts: ListOptions) {
    if idx >= self.workspaces.len() || idx == self.current {
      return;
    }
    self.workspaces[self.current].set_visible(false, opts);
    self.current = idx;
    self.workspaces[self.current].set_visible(true, opts);
  }

  pub fn merge_keymap(&mut self, map: Keymap) {
    self.keymap.extend(map);
  }

  pub fn merge_extmap(&mut self, map: Extmap) {
    for (key, assoc) in map {
      self.extmap.entry(key).or_default().extend(assoc);
    }
  }

  /// Resolves a key token to an action: the extmap is consulted first
  /// using the focused entry's type (`.dir` for directories, `.exec`
  /// for executables, else the extension), then the global keymap.
  pub fn action_for(&self, key: &str) -> Option<Action> {
    if let Some(assoc) = self.extmap.get(key) {
      if let Some(file) = self.file() {
        if file.is_dir() {
          if let Some(action) = assoc.get(".dir") {
            return Some(action.clone());
          }
        } else if file.is_exec() {
          if let Some(action) = assoc.get(".exec") {
            return Some(action.clone());
          }
        }
        if let Some(action) = assoc.get(&file.ext()) {
          return Some(action.clone());
        }
      }
    }
    self.keymap.get(key).cloned()
  }
}

impl Default for Filer {
  fn default() -> Self {
    Self::new()
  }
}
