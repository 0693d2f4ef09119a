//! Comparison color scheme: a small YAML file mapping each verdict to a
//! named color or `#RRGGBB`; missing fields keep the defaults.

use std::path::Path;

use anyhow::{anyhow, Result};
use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NameColors {
  #[serde(default)]
  pub present: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SizeColors {
  #[serde(default)]
  pub equal: Option<String>,
  #[serde(default)]
  pub smallest: Option<String>,
  #[serde(default)]
  pub largest: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TimeColors {
  #[serde(default)]
  pub equal: Option<String>,
  #[serde(default)]
  pub earliest: Option<String>,
  #[serde(default)]
  pub latest: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompareColorsFile {
  #[serde(default)]
  pub name: NameColors,
  #[serde(default)]
  pub size: SizeColors,
  #[serde(default)]
  pub time: TimeColors,
}

/// The resolved palette the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareColors {
  pub name_present: Color,
  pub size_equal: Color,
  pub size_smallest: Color,
  pub size_largest: Color,
  pub time_equal: Color,
  pub time_earliest: Color,
  pub time_latest: Color,
}

impl Default for CompareColors {
  fn default() -> Self {
    Self {
      name_present: Color::Yellow,
      size_equal: Color::Cyan,
      size_smallest: Color::Red,
      size_largest: Color::Green,
      time_equal: Color::Cyan,
      time_earliest: Color::Red,
      time_latest: Color::Green,
    }
  }
}

/// Loads the scheme. A missing file is the default scheme; a present
/// but unparsable file returns the default plus the error.
pub fn load(path: &Path) -> (CompareColors, Option<anyhow::Error>) {
  let data = match std::fs::read_to_string(path) {
    Ok(d) => d,
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
      return (CompareColors::default(), None)
    }
    Err(err) => {
      let err = anyhow!(err).context(format!("read compare colors {}", path.display()));
      return (CompareColors::default(), Some(err));
    }
  };
  match parse(&data) {
    Ok(colors) => (colors, None),
    Err(err) => {
      let err = err.context(format!("parse compare colors {}", path.display()));
      (CompareColors::default(), Some(err))
    }
  }
}

pub fn parse(data: &str) -> Result<CompareColors> {
  let file: CompareColorsFile = serde_yaml::from_str(data)?;
  let defaults = CompareColors::default();
  Ok(CompareColors {
    name_present: resolve(&file.name.present, defaults.name_present),
    size_equal: resolve(&file.size.equal, defaults.size_equal),
    size_smallest: resolve(&file.size.smallest, defaults.size_smallest),
    size_largest: resolve(&file.size.largest, defaults.size_largest),
    time_equal: resolve(&file.time.equal, defaults.time_equal),
    time_earliest: resolve(&file.time.earliest, defaults.time_earliest),
    time_latest: resolve(&file.time.latest, defaults.time_latest),
  })
}

fn resolve(value: &Option<String>, fallback: Color) -> Color {
  value
    .as_deref()
    .and_then(parse_color)
    .unwrap_or(fallback)
}

/// Named colors plus `#RRGGBB`; unknown names fall back to the default
/// for that slot.
pub fn parse_color(s: &str) -> Option<Color> {
  let s = s.trim().to_lowercase();
  if s.is_empty() {
    return None;
  }
  if let Some(hex) = s.strip_prefix('#') {
    if hex.len() == 6 {
      if let Ok(value) = u32::from_str_radix(hex, 16) {
        return Some(Color::Rgb(
          ((value >> 16) & 0xff) as u8,
          ((value >> 8) & 0xff) as u8,
          (value & 0xff) as u8,
        ));
      }
    }
    return None;
  }
  let color = match s.as_str() {
    "black" => Color::Black,
    "red" => Color::Red,
    "green" => Color::Green,
    "yellow" => Color::Yellow,
    "blue" => Color::Blue,
    "magenta" | "fuchsia" => Color::Magenta,
    "cyan" | "aqua" => Color::Cyan,
    "white" => Color::White,
    "gray" | "grey" => Color::Gray,
    "darkgray" | "darkgrey" => Color::DarkGray,
    "lightred" => Color::LightRed,
    "lightgreen" | "lime" => Color::LightGreen,
    "lightyellow" => Color::LightYellow,
    "lightblue" => Color::LightBlue,
    "lightmagenta" => Color::LightMagenta,
    "lightcyan" => Color::LightCyan,
    _ => return None,
  };
  Some(color)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use std::path::PathBuf;
  use std::sync::atomic::{AtomicU32, Ordering};

  static COUNTER: AtomicU32 = AtomicU32::new(0);

  fn test_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("goful_colors_{prefix}_{id}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn test_parse_color_named_and_hex() {
    assert_eq!(parse_color("red"), Some(Color::Red));
    assert_eq!(parse_color(" CYAN "), Some(Color::Cyan));
    assert_eq!(parse_color("#ff8800"), Some(Color::Rgb(255, 136, 0)));
    assert_eq!(parse_color("#xyz"), None);
    assert_eq!(parse_color("#fff"), None, "short hex not accepted");
    assert_eq!(parse_color("nonsense"), None);
  }

  #[test]
  fn test_parse_full_scheme() {
    let yaml = r##"
name:
  present: "#ffff00"
size:
  equal: blue
  smallest: magenta
  largest: "#00ff00"
time:
  equal: white
  earliest: gray
  latest: green
"##;
    let colors = parse(yaml).unwrap();
    assert_eq!(colors.name_present, Color::Rgb(255, 255, 0));
    assert_eq!(colors.size_equal, Color::Blue);
    assert_eq!(colors.size_smallest, Color::Magenta);
    assert_eq!(colors.size_largest, Color::Rgb(0, 255, 0));
    assert_eq!(colors.time_equal, Color::White);
    assert_eq!(colors.time_earliest, Color::Gray);
    assert_eq!(colors.time_latest, Color::Green);
  }

  #[test]
  fn test_partial_scheme_keeps_defaults() {
    let yaml = "size:\n  smallest: blue\n";
    let colors = parse(yaml).unwrap();
    let defaults = CompareColors::default();
    assert_eq!(colors.size_smallest, Color::Blue);
    assert_eq!(colors.size_largest, defaults.size_largest);
    assert_eq!(colors.name_present, defaults.name_present);
  }

  #[test]
  fn test_unknown_color_falls_back() {
    let yaml = "time:\n  latest: chartreuse-ish\n";
    let colors = parse(yaml).unwrap();
    assert_eq!(colors.time_latest, CompareColors::default().time_latest);
  }

  #[test]
  fn test_load_missing_file_is_default() {
    let root = test_dir("missing");
    let (colors, err) = load(&root.join("none.yaml"));
    assert!(err.is_none());
    assert_eq!(colors, CompareColors::default());
    let _ = fs::remove_dir_all(&root);
  }

  #[test]
  fn test_load_broken_file_default_plus_error() {
    let root = test_dir("broken");
    let path = root.join("colors.yaml");
    fs::write(&path, "{{{{").unwrap();
    let (colors, err) = load(&path);
    assert!(err.is_some());
    assert_eq!(colors, CompareColors::default());
    let _ = fs::remove_dir_all(&root);
  }
}
