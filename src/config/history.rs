//! Line-oriented cmdline history, one store per mode. The mode key is
//! the basename of the history file, so the default `history/shell`
//! file feeds the shell mode.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Hard cap per mode; the oldest entries are trimmed at save time.
pub const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Default)]
pub struct History {
  modes: HashMap<String, Vec<String>>,
}

fn mode_key(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| "shell".to_string())
}

impl History {
  /// Loads the file into the mode named by its basename. A missing
  /// file is first-run, not an error.
  pub fn load(path: &Path) -> Result<Self> {
    let mut history = Self::default();
    let content = match std::fs::read_to_string(path) {
      Ok(c) => c,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(history),
      Err(err) => {
        return Err(err).with_context(|| format!("read history {}", path.display()))
      }
    };
    let lines: Vec<String> = content
      .lines()
      .filter(|l| !l.is_empty())
      .map(str::to_string)
      .collect();
    history.modes.insert(mode_key(path), lines);
    Ok(history)
  }

  /// Saves the named mode's entries to the file, newest last, trimmed
  /// to the cap. Parent directories are created as needed.
  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("create history dir {}", parent.display()))?;
    }
    let entries = self.entries(&mode_key(path));
    let start = entries.len().saturating_sub(MAX_ENTRIES);
    let mut body = entries[start..].join("\n");
    if !body.is_empty() {
      body.push('\n');
    }
    std::fs::write(path, body).with_context(|| format!("write history {}", path.display()))
  }

  /// Appends an entry; an immediate duplicate of the last line is
  /// dropped, blank input is ignored.
  pub fn add(&mut self, mode: &str, line: &str) {
    if line.trim().is_empty() {
      return;
    }
    let entries = self.modes.entry(mode.to_string()).or_default();
    if entries.last().map(String::as_str) == Some(line) {
      return;
    }
    entries.push(line.to_string());
  }

  pub fn entries(&self, mode: &str) -> &[String] {
    self.modes.get(mode).map(Vec::as_slice).unwrap_or(&[])
  }
}
