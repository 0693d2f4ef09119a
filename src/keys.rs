//! Canonical key tokens. Every key event is folded into a small closed
//! alphabet of strings that keymaps index: literal runes, named keys,
//! and `C-`/`M-` prefixed chords.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Normalizes a key event to its canonical token, or None for events
/// that carry no input (releases, bare modifiers).
///
/// The terminal's return key and C-m are the same token, tab and C-i
/// likewise, escape and C-[ likewise; both classical backspace codes
/// arrive here as `KeyCode::Backspace` and become `backspace`.
pub fn key_token(key: KeyEvent) -> Option<String> {
  if key.kind == KeyEventKind::Release {
    return None;
  }

  let named = match key.code {
    KeyCode::Enter => Some("C-m"),
    KeyCode::Tab => Some("C-i"),
    KeyCode::Esc => Some("C-["),
    KeyCode::Backspace => Some("backspace"),
    KeyCode::Delete => Some("delete"),
    KeyCode::Home => Some("home"),
    KeyCode::End => Some("end"),
    KeyCode::PageUp => Some("pgup"),
    KeyCode::PageDown => Some("pgdn"),
    KeyCode::Up => Some("up"),
    KeyCode::Down => Some("down"),
    KeyCode::Left => Some("left"),
    KeyCode::Right => Some("right"),
    _ => None,
  };
  if let Some(name) = named {
    return Some(with_prefixes(name, key.modifiers));
  }

  if let KeyCode::F(n) = key.code {
    return Some(with_prefixes(&format!("f{n}"), key.modifiers));
  }

  let KeyCode::Char(c) = key.code else {
    return None;
  };
  // Shift is already reflected in the rune itself.
  let modifiers = key.modifiers - KeyModifiers::SHIFT;
  Some(with_prefixes(&c.to_string(), modifiers))
}

fn with_prefixes(base: &str, modifiers: KeyModifiers) -> String {
  let mut token = String::new();
  if modifiers.contains(KeyModifiers::ALT) {
    token.push_str("M-");
  }
  if modifiers.contains(KeyModifiers::CONTROL) && !base.starts_with("C-") {
    token.push_str("C-");
  }
  token.push_str(base);
  token
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyEventState;

  fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
      code,
      modifiers,
      kind: KeyEventKind::Press,
      state: KeyEventState::NONE,
    }
  }

  #[test]
  fn test_plain_runes() {
    assert_eq!(key_token(key(KeyCode::Char('a'), KeyModifiers::NONE)).unwrap(), "a");
    assert_eq!(key_token(key(KeyCode::Char(' '), KeyModifiers::NONE)).unwrap(), " ");
    assert_eq!(key_token(key(KeyCode::Char('?'), KeyModifiers::NONE)).unwrap(), "?");
  }

  #[test]
  fn test_shift_folds_into_rune() {
    assert_eq!(key_token(key(KeyCode::Char('Q'), KeyModifiers::SHIFT)).unwrap(), "Q");
  }

  #[test]
  fn test_control_and_meta_prefixes() {
    assert_eq!(key_token(key(KeyCode::Char('n'), KeyModifiers::CONTROL)).unwrap(), "C-n");
    assert_eq!(key_token(key(KeyCode::Char('f'), KeyModifiers::ALT)).unwrap(), "M-f");
    assert_eq!(
      key_token(key(KeyCode::Char('o'), KeyModifiers::CONTROL | KeyModifiers::ALT)).unwrap(),
      "M-C-o"
    );
  }

  #[test]
  fn test_return_and_ctrl_m_are_one_token() {
    assert_eq!(key_token(key(KeyCode::Enter, KeyModifiers::NONE)).unwrap(), "C-m");
    assert_eq!(key_token(key(KeyCode::Char('m'), KeyModifiers::CONTROL)).unwrap(), "C-m");
  }

  #[test]
  fn test_tab_and_escape_aliases() {
    assert_eq!(key_token(key(KeyCode::Tab, KeyModifiers::NONE)).unwrap(), "C-i");
    assert_eq!(key_token(key(KeyCode::Char('i'), KeyModifiers::CONTROL)).unwrap(), "C-i");
    assert_eq!(key_token(key(KeyCode::Esc, KeyModifiers::NONE)).unwrap(), "C-[");
    assert_eq!(key_token(key(KeyCode::Char('['), KeyModifiers::CONTROL)).unwrap(), "C-[");
  }

  #[test]
  fn test_backspace_token() {
    assert_eq!(key_token(key(KeyCode::Backspace, KeyModifiers::NONE)).unwrap(), "backspace");
  }

  #[test]
  fn test_named_keys() {
    for (code, name) in [
      (KeyCode::Home, "home"),
      (KeyCode::End, "end"),
      (KeyCode::PageUp, "pgup"),
      (KeyCode::PageDown, "pgdn"),
      (KeyCode::Delete, "delete"),
      (KeyCode::Up, "up"),
      (KeyCode::Down, "down"),
      (KeyCode::Left, "left"),
      (KeyCode::Right, "right"),
    ] {
      assert_eq!(key_token(key(code, KeyModifiers::NONE)).unwrap(), name);
    }
  }

  #[test]
  fn test_meta_named_key() {
    assert_eq!(key_token(key(KeyCode::Up, KeyModifiers::ALT)).unwrap(), "M-up");
  }

  #[test]
  fn test_release_ignored() {
    let mut ev = key(KeyCode::Char('a'), KeyModifiers::NONE);
    ev.kind = KeyEventKind::Release;
    assert_eq!(key_token(ev), None);
  }
}
