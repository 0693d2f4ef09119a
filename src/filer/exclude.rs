use std::collections::HashSet;

/// Case-insensitive set of entry names to hide from listings. Owned by
/// the App and handed to directories at reload time; replaces the
/// process-global set the reference kept behind a lock.
#[derive(Debug, Default, Clone)]
pub struct ExcludeSet {
  names: HashSet<String>,
  enabled: bool,
}

impl ExcludeSet {
  /// Replaces the rule set. Blank names are dropped; an empty result
  /// leaves the filter disabled regardless of `activate`.
  pub fn configure(&mut self, names: &[String], activate: bool) -> usize {
    self.names = names
      .iter()
      .map(|n| n.trim())
      .filter(|n| !n.is_empty())
      .map(|n| n.to_lowercase())
      .collect();
    self.enabled = activate && !self.names.is_empty();
    self.names.len()
  }

  /// Flips the active state when rules exist.
  /// Returns (enabled, has_rules, rule_count).
  pub fn toggle(&mut self) -> (bool, bool, usize) {
    if self.names.is_empty() {
      self.enabled = false;
      return (false, false, 0);
    }
    self.enabled = !self.enabled;
    (self.enabled, true, self.names.len())
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled && !self.names.is_empty()
  }

  pub fn matches(&self, name: &str) -> bool {
    self.is_enabled() && self.names.contains(&name.to_lowercase())
  }
}

/// Parses exclude-file content: one name per line, `#` comments and
/// blank lines ignored.
pub fn parse_exclude_lines(content: &str) -> Vec<String> {
  content
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty() && !l.starts_with('#'))
    .map(str::to_string)
    .collect()
}
