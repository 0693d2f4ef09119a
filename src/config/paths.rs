//! Persistence-path resolution: CLI flag over environment variable over
//! default, with the winning source recorded for debug output.

use std::path::PathBuf;

use crate::filer::directory::expand_tilde;

pub const DEFAULT_STATE_PATH: &str = "~/.goful/state.json";
pub const DEFAULT_HISTORY_PATH: &str = "~/.goful/history/shell";
pub const DEFAULT_COMMANDS_PATH: &str = "~/.goful/external_commands.yaml";
pub const DEFAULT_EXCLUDES_PATH: &str = "~/.goful/excludes";
pub const DEFAULT_COMPARE_COLORS_PATH: &str = "~/.goful/compare_colors.yaml";

pub const ENV_STATE: &str = "GOFUL_STATE_PATH";
pub const ENV_HISTORY: &str = "GOFUL_HISTORY_PATH";
pub const ENV_COMMANDS: &str = "GOFUL_COMMANDS_FILE";
pub const ENV_EXCLUDES: &str = "GOFUL_EXCLUDES_FILE";
pub const ENV_COMPARE_COLORS: &str = "GOFUL_COMPARE_COLORS";

/// A resolved path plus where it came from (`flag:--state`,
/// `env:GOFUL_STATE_PATH` or `default`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
  pub path: PathBuf,
  pub source: String,
}

#[derive(Debug, Clone)]
pub struct Paths {
  pub state: Resolved,
  pub history: Resolved,
  pub commands: Resolved,
  pub excludes: Resolved,
  pub compare_colors: Resolved,
}

/// Flag inputs as parsed from the command line; None means unset.
#[derive(Debug, Default, Clone)]
pub struct PathFlags {
  pub state: Option<String>,
  pub history: Option<String>,
  pub commands: Option<String>,
  pub exclude_names: Option<String>,
  pub compare_colors: Option<String>,
}

/// Applies the flag > env > default precedence. The environment lookup
/// is injected so tests stay hermetic.
pub fn resolve(flags: &PathFlags, env: &dyn Fn(&str) -> Option<String>) -> Paths {
  Paths {
    state: resolve_one(flags.state.as_deref(), ENV_STATE, DEFAULT_STATE_PATH, "--state", env),
    history: resolve_one(
      flags.history.as_deref(),
      ENV_HISTORY,
      DEFAULT_HISTORY_PATH,
      "--history",
      env,
    ),
    commands: resolve_one(
      flags.commands.as_deref(),
      ENV_COMMANDS,
      DEFAULT_COMMANDS_PATH,
      "--commands",
      env,
    ),
    excludes: resolve_one(
      flags.exclude_names.as_deref(),
      ENV_EXCLUDES,
      DEFAULT_EXCLUDES_PATH,
      "--exclude-names",
      env,
    ),
    compare_colors: resolve_one(
      flags.compare_colors.as_deref(),
      ENV_COMPARE_COLORS,
      DEFAULT_COMPARE_COLORS_PATH,
      "--compare-colors",
      env,
    ),
  }
}

fn resolve_one(
  flag: Option<&str>,
  env_key: &str,
  default: &str,
  flag_label: &str,
  env: &dyn Fn(&str) -> Option<String>,
) -> Resolved {
  if let Some(value) = flag.filter(|v| !v.is_empty()) {
    return Resolved { path: expand_tilde(value), source: format!("flag:{flag_label}") };
  }
  if let Some(value) = env(env_key).filter(|v| !v.is_empty()) {
    return Resolved { path: expand_tilde(&value), source: format!("env:{env_key}") };
  }
  Resolved { path: expand_tilde(default), source: "default".to_string() }
}

impl Paths {
  /// One line of provenance per path, for `GOFUL_DEBUG_PATHS`.
  pub fn debug_line(&self) -> String {
    format!(
      "state={} ({}) history={} ({}) commands={} ({}) excludes={} ({}) compare_colors={} ({})",
      self.state.path.display(),
      self.state.source,
      self.history.path.display(),
      self.history.source,
      self.commands.path.display(),
      self.commands.source,
      self.excludes.path.display(),
      self.excludes.source,
      self.compare_colors.path.display(),
      self.compare_colors.source,
    )
  }
}
