//! External-command registry: user-defined menu entries loaded from a
//! JSON or YAML file, merged over the baked-in defaults.

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use serde::Deserialize;

/// The canonical menu hosting external command bindings.
pub const MENU_NAME: &str = "external-command";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Entry {
  #[serde(default)]
  pub menu: String,
  #[serde(default)]
  pub key: String,
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub command: String,
  #[serde(default, rename = "runMenu")]
  pub run_menu: String,
  #[serde(default)]
  pub offset: i32,
  #[serde(default)]
  pub platforms: Vec<String>,
  #[serde(default)]
  pub disabled: bool,
}

#[derive(Debug, Deserialize)]
struct Wrapper {
  #[serde(default, rename = "inheritDefaults")]
  inherit_defaults: Option<bool>,
  #[serde(default)]
  commands: Vec<Entry>,
}

fn entry(key: &str, label: &str, command: &str, offset: i32) -> Entry {
  Entry {
    menu: MENU_NAME.to_string(),
    key: key.to_string(),
    label: label.to_string(),
    command: command.to_string(),
    run_menu: String::new(),
    offset,
    platforms: Vec::new(),
    disabled: false,
  }
}

/// The baked-in bindings for the current platform.
pub fn defaults(os: &str) -> Vec<Entry> {
  if os == "windows" {
    return vec![
      entry("c", "copy %~f to %~D2 ", "robocopy /e %~f %~D2", 0),
      entry("m", "move %~f to %~D2 ", "move /-y %~f %~D2", 0),
      entry("D", "rd /s /q %~m     ", "rd /s /q %~m", 0),
      entry("k", "make directory   ", "mkdir ", 0),
      entry("n", "create newfile   ", "copy nul ", 0),
      entry("r", "move (rename) %f ", "move /-y %~f ./", 0),
    ];
  }
  let mut archives = entry("A", "archives menu     ", "", 0);
  archives.run_menu = "archive".to_string();
  vec![
    entry("c", "copy %m to %D2    ", "cp -vai %m %D2", 0),
    entry("m", "move %m to %D2    ", "mv -vi %m %D2", 0),
    entry("D", "remove %m files   ", "rm -vR %m", 0),
    entry("k", "make directory    ", "mkdir -vp ./", 0),
    entry("n", "create newfile    ", "touch ./", 0),
    entry("T", "time copy %f to %m", "touch -r %f %m", 0),
    entry("M", "change mode %m    ", "chmod 644 %m", -3),
    entry("r", "move (rename) %f  ", "mv -vi %f %~f", 0),
    entry("f", "find . -name      ", "find . -name \"*\"", -1),
    archives,
  ]
}

/// Loads and validates the command file. A missing file yields the
/// defaults silently; a present but broken file yields the defaults
/// plus the error for the message bar. `inheritDefaults` (default
/// true) prepends file entries to the defaults, false replaces them.
pub fn load(path: &Path, os: &str) -> (Vec<Entry>, Option<anyhow::Error>) {
  let fallback = defaults(os);
  let data = match std::fs::read_to_string(path) {
    Ok(d) => d,
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => return (fallback, None),
    Err(err) => {
      let err = anyhow!(err).context(format!("read external commands {}", path.display()));
      return (fallback, Some(err));
    }
  };

  match parse(&data, os) {
    Ok((entries, inherit)) => {
      if inherit {
        let mut merged = entries;
        merged.extend(fallback);
        (merged, None)
      } else {
        (entries, None)
      }
    }
    Err(err) => {
      let err = err.context(format!("parse external commands {}", path.display()));
      (fallback, Some(err))
    }
  }
}

/// Parses either format: a top-level array, or an object wrapping a
/// `commands` array. Returns the sanitized entries and the inherit
/// flag.
pub fn parse(data: &str, os: &str) -> Result<(Vec<Entry>, bool)> {
  let (entries, inherit) = decode(data)?;
  let sanitized = sanitize(entries, os)?;
  Ok((sanitized, inherit))
}

fn decode(data: &str) -> Result<(Vec<Entry>, bool)> {
  if let Ok(entries) = serde_json::from_str::<Vec<Entry>>(data) {
    return Ok((entries, true));
  }
  if let Ok(wrapper) = serde_json::from_str::<Wrapper>(data) {
    return Ok((wrapper.commands, wrapper.inherit_defaults.unwrap_or(true)));
  }
  if let Ok(entries) = serde_yaml::from_str::<Vec<Entry>>(data) {
    return Ok((entries, true));
  }
  if let Ok(wrapper) = serde_yaml::from_str::<Wrapper>(data) {
    return Ok((wrapper.commands, wrapper.inherit_defaults.unwrap_or(true)));
  }
  bail!("expected a JSON or YAML array, or an object with a `commands` field")
}

fn sanitize(entries: Vec<Entry>, os: &str) -> Result<Vec<Entry>> {
  let mut out = Vec::with_capacity(entries.len());
  let mut seen = std::collections::HashMap::new();

  for (idx, mut entry) in entries.into_iter().enumerate() {
    entry.menu = entry.menu.trim().to_string();
    if entry.menu.is_empty() {
      entry.menu = MENU_NAME.to_string();
    }
    entry.key = entry.key.trim().to_string();
    if entry.key.is_empty() {
      bail!("entry {idx} missing `key`");
    }
    if entry.label.trim().is_empty() {
      bail!("entry {:?} missing `label`", entry.key);
    }

    let command = entry.command.trim();
    let run_menu = entry.run_menu.trim().to_string();
    if command.is_empty() && run_menu.is_empty() {
      bail!("entry {:?} must provide `command` or `runMenu`", entry.key);
    }
    if !command.is_empty() && !run_menu.is_empty() {
      bail!("entry {:?} cannot set both `command` and `runMenu`", entry.key);
    }
    entry.run_menu = run_menu;

    if !entry.platforms.is_empty()
      && !entry.platforms.iter().any(|p| p.trim().eq_ignore_ascii_case(os))
    {
      continue; // silently dropped on foreign platforms
    }
    if entry.disabled {
      continue;
    }

    let dedupe = format!("{}|{}", entry.menu, entry.key);
    if let Some(prev) = seen.insert(dedupe.clone(), idx) {
      bail!(
        "duplicate shortcut {}/{} (entries {} and {})",
        entry.menu,
        entry.key,
        prev,
        idx
      );
    }
    out.push(entry);
  }
  Ok(out)
}

/// Debug env knob for command loading.
pub fn debug_enabled() -> bool {
  std::env::var("GOFUL_DEBUG_COMMANDS").map(|v| !v.is_empty()).unwrap_or(false)
}
