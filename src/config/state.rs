//! Persisted UI state: workspace and pane layout across sessions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filer::workspace::Layout;
use crate::filer::{Directory, Filer, SortKind, Workspace};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDir {
  #[serde(rename = "Path")]
  pub path: PathBuf,
  #[serde(rename = "SortKind", default)]
  pub sort: SortKind,
  #[serde(rename = "ShowHidden", default)]
  pub show_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedWorkspace {
  pub directories: Vec<SavedDir>,
  #[serde(default)]
  pub layout: Layout,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub focus: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedState {
  pub workspaces: Vec<SavedWorkspace>,
  #[serde(default)]
  pub current: usize,
}

/// Reads the state file. Missing, unreadable or structurally invalid
/// files mean "no saved state"; the caller falls back to the default
/// layout.
pub fn load(path: &Path) -> Option<SavedState> {
  let data = std::fs::read_to_string(path).ok()?;
  let state: SavedState = serde_json::from_str(&data).ok()?;
  if state.workspaces.is_empty() {
    return None;
  }
  if state.workspaces.iter().any(|ws| ws.directories.is_empty()) {
    return None;
  }
  Some(state)
}

/// Writes the state file, creating parent directories as needed.
pub fn save(path: &Path, state: &SavedState) -> Result<()> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("create state dir {}", parent.display()))?;
  }
  let json = serde_json::to_string_pretty(state)?;
  std::fs::write(path, json).with_context(|| format!("write state {}", path.display()))
}

/// Snapshots the filer for saving.
pub fn snapshot(filer: &Filer) -> SavedState {
  SavedState {
    workspaces: filer
      .workspaces
      .iter()
      .map(|ws| SavedWorkspace {
        directories: ws
          .dirs
          .iter()
          .map(|d| SavedDir { path: d.path.clone(), sort: d.sort, show_hidden: d.show_hidden })
          .collect(),
        layout: ws.layout,
        title: ws.title.clone(),
        focus: ws.focus,
      })
      .collect(),
    current: filer.current,
  }
}

/// Builds a filer from saved state. Indices are clamped so a hand-edited
/// file cannot put the model out of range; entries are not listed yet.
pub fn restore(state: SavedState) -> Filer {
  let mut filer = Filer::new();
  let workspaces: Vec<Workspace> = state
    .workspaces
    .into_iter()
    .filter(|saved| !saved.directories.is_empty())
    .map(|saved| {
      let dirs: Vec<Directory> = saved
        .directories
        .into_iter()
        .map(|d| {
          let mut dir = Directory::new(d.path);
          dir.sort = d.sort;
          dir.show_hidden = d.show_hidden;
          dir
        })
        .collect();
      let focus = saved.focus.min(dirs.len() - 1);
      let mut ws = Workspace::new(&saved.title, dirs);
      ws.focus = focus;
      ws.layout = saved.layout;
      ws
    })
    .collect();
  if !workspaces.is_empty() {
    filer.workspaces = workspaces;
  }
  filer.current = state.current.min(filer.workspaces.len() - 1);
  filer
}
