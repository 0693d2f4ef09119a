//! `%`-macro expansion for external shell command templates.

/// Snapshot of the filer state a template can reference. Built by the
/// App right before expansion so the module stays free of UI types.
#[derive(Debug, Clone, Default)]
pub struct MacroContext {
  pub file_name: String,
  pub file_path: String,
  pub mark_names: Vec<String>,
  pub mark_paths: Vec<String>,
  pub dir_base: String,
  pub dir_path: String,
  pub next_dir_base: String,
  pub next_dir_path: String,
  /// Non-focused pane basenames, starting at focused+1 and wrapping.
  pub other_dir_bases: Vec<String>,
  /// Non-focused pane paths in the same order.
  pub other_dir_paths: Vec<String>,
}

/// Shell-safe single quoting; embedded quotes close, escape and reopen.
pub fn quote(s: &str) -> String {
  format!("'{}'", s.replace('\'', r"'\''"))
}

/// Strips the extension for `%x`/`%X`; extension-less names and names
/// that are all extension pass through.
pub fn remove_ext(name: &str) -> String {
  match name.rfind('.') {
    Some(0) | None => name.to_string(),
    Some(idx) => name[..idx].to_string(),
  }
}

fn join_list(items: &[String], quoted: bool) -> String {
  let parts: Vec<String> = items
    .iter()
    .map(|s| if quoted { quote(s) } else { s.clone() })
    .collect();
  parts.join(" ")
}

/// Expands every `%`-token in `cmd` against `ctx`.
/// Returns the expanded command and whether `%&` marked it detached.
/// `%X` forms are quoted, `%~X` raw; `%%` and `\%` are literal percents,
/// `%\X` is a literal `%X`, unknown tokens pass through verbatim.
pub fn expand(cmd: &str, ctx: &MacroContext) -> (String, bool) {
  let mut out = String::with_capacity(cmd.len());
  let mut background = false;
  let chars: Vec<char> = cmd.chars().collect();
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];

    if c == '\\' {
      // The backslash escapes the next character from expansion.
      if i + 1 < chars.len() {
        out.push(chars[i + 1]);
        i += 2;
      } else {
        out.push('\\');
        i += 1;
      }
      continue;
    }

    if c != '%' {
      out.push(c);
      i += 1;
      continue;
    }

    // A `%` token.
    let mut j = i + 1;
    if j < chars.len() && chars[j] == '%' {
      out.push('%');
      i = j + 1;
      continue;
    }
    if j < chars.len() && chars[j] == '\\' {
      // %\X is the literal token %X.
      out.push('%');
      if j + 1 < chars.len() {
        out.push(chars[j + 1]);
        i = j + 2;
      } else {
        i = j + 1;
      }
      continue;
    }

    let raw = j < chars.len() && chars[j] == '~';
    if raw {
      j += 1;
      if j < chars.len() && chars[j] == '~' {
        // A run of ~ is not a token.
        out.push_str("%~~");
        i = j + 1;
        continue;
      }
    }

    let Some(&key) = chars.get(j) else {
      out.push('%');
      if raw {
        out.push('~');
      }
      break;
    };

    let mut consumed = j + 1;
    let expanded = match key {
      'f' => Some(maybe_quote(&ctx.file_name, raw)),
      'F' => Some(maybe_quote(&ctx.file_path, raw)),
      'x' => Some(maybe_quote(&remove_ext(&ctx.file_name), raw)),
      'X' => Some(maybe_quote(&remove_ext(&ctx.file_path), raw)),
      'm' => Some(join_list(&ctx.mark_names, !raw)),
      'M' => Some(join_list(&ctx.mark_paths, !raw)),
      'd' | 'D' => {
        let paths = key == 'D';
        match chars.get(consumed) {
          Some('2') => {
            consumed += 1;
            let src = if paths { &ctx.next_dir_path } else { &ctx.next_dir_base };
            Some(maybe_quote(src, raw))
          }
          Some('@') => {
            consumed += 1;
            let list = if paths { &ctx.other_dir_paths } else { &ctx.other_dir_bases };
            Some(join_list(list, !raw))
          }
          _ => {
            let src = if paths { &ctx.dir_path } else { &ctx.dir_base };
            Some(maybe_quote(src, raw))
          }
        }
      }
      '&' => {
        background = true;
        Some(String::new())
      }
      _ => None,
    };

    match expanded {
      Some(text) => {
        out.push_str(&text);
        i = consumed;
      }
      None => {
        // Unknown token passes through verbatim.
        out.push('%');
        if raw {
          out.push('~');
        }
        out.push(key);
        i = consumed;
      }
    }
  }

  (out, background)
}

fn maybe_quote(s: &str, raw: bool) -> String {
  if raw {
    s.to_string()
  } else {
    quote(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx() -> MacroContext {
    MacroContext {
      file_name: "a file.txt".into(),
      file_path: "/home/u/w/a file.txt".into(),
      mark_names: vec!["one".into(), "two two".into()],
      mark_paths: vec!["/w/one".into(), "/w/two two".into()],
      dir_base: "w".into(),
      dir_path: "/home/u/w".into(),
      next_dir_base: "x".into(),
      next_dir_path: "/home/u/x".into(),
      other_dir_bases: vec!["x".into(), "y".into()],
      other_dir_paths: vec!["/home/u/x".into(), "/home/u/y".into()],
    }
  }

  #[test]
  fn test_quote_escapes_single_quotes() {
    assert_eq!(quote("plain"), "'plain'");
    assert_eq!(quote("it's"), r"'it'\''s'");
  }

  #[test]
  fn test_remove_ext() {
    assert_eq!(remove_ext("file.txt"), "file");
    assert_eq!(remove_ext("archive.tar.gz"), "archive.tar");
    assert_eq!(remove_ext("README"), "README");
    assert_eq!(remove_ext(".bashrc"), ".bashrc");
  }

  #[test]
  fn test_file_tokens_quoted_and_raw() {
    let (out, bg) = expand("view %f %~f", &ctx());
    assert_eq!(out, "view 'a file.txt' a file.txt");
    assert!(!bg);

    let (out, _) = expand("%F %~F", &ctx());
    assert_eq!(out, "'/home/u/w/a file.txt' /home/u/w/a file.txt");
  }

  #[test]
  fn test_ext_removed_tokens() {
    let (out, _) = expand("%x %~x %X", &ctx());
    assert_eq!(out, "'a file' a file '/home/u/w/a file'");
  }

  #[test]
  fn test_markfile_tokens() {
    let (out, _) = expand("rm %m", &ctx());
    assert_eq!(out, "rm 'one' 'two two'");
    let (out, _) = expand("rm %~m", &ctx());
    assert_eq!(out, "rm one two two");
    let (out, _) = expand("cp %M", &ctx());
    assert_eq!(out, "cp '/w/one' '/w/two two'");
  }

  #[test]
  fn test_dir_tokens() {
    let (out, _) = expand("%d %D", &ctx());
    assert_eq!(out, "'w' '/home/u/w'");
    let (out, _) = expand("%d2 %~D2", &ctx());
    assert_eq!(out, "'x' /home/u/x");
  }

  #[test]
  fn test_all_other_dirs_in_wrap_order() {
    let (out, _) = expand("%D@ %~D@ %d@ %~d@", &ctx());
    assert_eq!(
      out,
      "'/home/u/x' '/home/u/y' /home/u/x /home/u/y 'x' 'y' x y"
    );
  }

  #[test]
  fn test_background_flag() {
    let (out, bg) = expand("xdg-open %f %&", &ctx());
    assert_eq!(out, "xdg-open 'a file.txt' ");
    assert!(bg);
  }

  #[test]
  fn test_literal_percents() {
    let (out, _) = expand("date +%%s", &ctx());
    assert_eq!(out, "date +%s");
    let (out, _) = expand(r"printf \%f", &ctx());
    assert_eq!(out, "printf %f");
    let (out, _) = expand(r"%\f", &ctx());
    assert_eq!(out, "%f");
  }

  #[test]
  fn test_unknown_tokens_verbatim() {
    let (out, _) = expand("awk '{print %z}'", &ctx());
    assert_eq!(out, "awk '{print %z}'");
    let (out, _) = expand("%~z", &ctx());
    assert_eq!(out, "%~z");
  }

  #[test]
  fn test_trailing_percent() {
    let (out, _) = expand("100%", &ctx());
    assert_eq!(out, "100%");
  }

  #[test]
  fn test_empty_marks_expand_empty() {
    let mut c = ctx();
    c.mark_names.clear();
    let (out, _) = expand("rm %m", &c);
    assert_eq!(out, "rm ");
  }
}
