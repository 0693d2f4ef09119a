//! External process launching: the configured shell runs detached
//! (`%&`) commands, the configured terminal hosts interactive ones.
//! Exit status and stderr come back to the message bar through the
//! synchronous-callback channel, never directly from the worker thread.

use std::process::{Command, Output, Stdio};
use std::thread;

use anyhow::{Context, Result};

use crate::event::EventSender;

/// Builds an argv for running `cmd` somewhere. The App owns one for the
/// shell and one for the terminal.
pub type ArgBuilder = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

pub const ENV_TERMINAL_COMMAND: &str = "GOFUL_TERMINAL_COMMAND";
pub const ENV_DEBUG_TERMINAL: &str = "GOFUL_DEBUG_TERMINAL";

pub fn default_shell() -> ArgBuilder {
  Box::new(|cmd| vec!["bash".to_string(), "-c".to_string(), cmd.to_string()])
}

/// Terminal factory: an env override wins, tmux gets a new window,
/// otherwise a generic terminal emulator wrapping the shell. The
/// command always keeps the window open until a key press so output
/// stays readable.
pub fn default_terminal(is_tmux: bool) -> ArgBuilder {
  let override_args = std::env::var(ENV_TERMINAL_COMMAND)
    .ok()
    .map(|v| parse_override(&v))
    .unwrap_or_default();
  if std::env::var(ENV_DEBUG_TERMINAL).map(|v| !v.is_empty()).unwrap_or(false) {
    let strategy = if !override_args.is_empty() {
      "override"
    } else if is_tmux {
      "tmux"
    } else {
      "x-terminal-emulator"
    };
    eprintln!("DEBUG: terminal launcher strategy: {strategy}");
  }
  Box::new(move |cmd| {
    let tail = format!("{cmd}; echo; read -p 'HIT ENTER KEY'");
    if !override_args.is_empty() {
      let mut args = override_args.clone();
      args.push(tail);
      return args;
    }
    if is_tmux {
      return vec![
        "tmux".to_string(),
        "new-window".to_string(),
        "-n".to_string(),
        "goful".to_string(),
        tail,
      ];
    }
    vec![
      "x-terminal-emulator".to_string(),
      "-e".to_string(),
      "bash".to_string(),
      "-c".to_string(),
      tail,
    ]
  })
}

/// Splits the override on whitespace; quoting is deliberately not
/// interpreted, matching the documented knob.
pub fn parse_override(value: &str) -> Vec<String> {
  value.split_whitespace().map(str::to_string).collect()
}

/// Formats a finished process for the message bar.
/// Returns (text, is_error), or None when there is nothing to say.
pub fn report_for(output: &Output, cmdline: &str) -> Option<(String, bool)> {
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.lines().next().unwrap_or("").trim().to_string();
    let text = if detail.is_empty() {
      format!("{cmdline:?}: exit {}", output.status.code().unwrap_or(-1))
    } else {
      format!("{cmdline:?}: {detail}")
    };
    return Some((text, true));
  }
  let stdout = String::from_utf8_lossy(&output.stdout);
  let line = stdout.lines().next().unwrap_or("").trim().to_string();
  if line.is_empty() {
    None
  } else {
    Some((line, false))
  }
}

/// Spawns `args` detached and reports its outcome asynchronously. A
/// spawn failure (shell not installed) is retried once through `sh`.
pub fn spawn_detached(args: &[String], cmdline: &str, sender: EventSender) -> Result<()> {
  let child = match command(args).spawn() {
    Ok(child) => child,
    Err(err) => {
      // Fallback when the configured shell is missing.
      let fallback = vec!["sh".to_string(), "-c".to_string(), cmdline.to_string()];
      match command(&fallback).spawn() {
        Ok(child) => {
          report_spawn_fallback(&sender, &err.to_string());
          child
        }
        Err(_) => {
          return Err(err).with_context(|| format!("spawn {:?}", args.first()));
        }
      }
    }
  };

  let cmdline = cmdline.to_string();
  thread::spawn(move || {
    let Ok(output) = child.wait_with_output() else { return };
    if let Some((text, is_error)) = report_for(&output, &cmdline) {
      sender.schedule_sync(move |app| {
        if is_error {
          app.message.error(text.clone());
        } else {
          app.message.info(text.clone());
        }
      });
    }
  });
  Ok(())
}

fn report_spawn_fallback(sender: &EventSender, err: &str) {
  let text = format!("shell unavailable ({err}); fell back to sh");
  let sender = sender.clone();
  let msg = text.clone();
  thread::spawn(move || {
    sender.schedule_sync(move |app| app.message.error(msg.clone()));
  });
}

fn command(args: &[String]) -> Command {
  let mut cmd = Command::new(&args[0]);
  cmd
    .args(&args[1..])
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());
  cmd
}

/// Runs `args` in the foreground with inherited stdio. The caller has
/// already torn the terminal down and restores it afterwards.
pub fn run_suspended(args: &[String]) -> Result<()> {
  let status = Command::new(&args[0])
    .args(&args[1..])
    .status()
    .with_context(|| format!("run {:?}", args[0]))?;
  if !status.success() {
    anyhow::bail!("{:?} exited with {}", args.join(" "), status.code().unwrap_or(-1));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_shell_args() {
    let shell = default_shell();
    assert_eq!(shell("ls -la"), ["bash", "-c", "ls -la"]);
  }

  #[test]
  fn test_terminal_override_parsing() {
    assert_eq!(
      parse_override("alacritty -e bash -c"),
      ["alacritty", "-e", "bash", "-c"]
    );
    assert!(parse_override("  ").is_empty());
  }

  #[test]
  fn test_terminal_tmux_args() {
    // The env override is absent in test runs unless exported.
    if std::env::var(ENV_TERMINAL_COMMAND).is_ok() {
      return;
    }
    let terminal = default_terminal(true);
    let args = terminal("htop");
    assert_eq!(args[0], "tmux");
    assert!(args.last().unwrap().starts_with("htop; "));
  }

  #[cfg(unix)]
  #[test]
  fn test_report_for_success_with_output() {
    let output = Command::new("sh")
      .args(["-c", "echo done"])
      .output()
      .unwrap();
    let report = report_for(&output, "echo done").unwrap();
    assert_eq!(report, ("done".to_string(), false));
  }

  #[cfg(unix)]
  #[test]
  fn test_report_for_silent_success() {
    let output = Command::new("sh").args(["-c", "true"]).output().unwrap();
    assert!(report_for(&output, "true").is_none());
  }

  #[cfg(unix)]
  #[test]
  fn test_report_for_failure_carries_stderr() {
    let output = Command::new("sh")
      .args(["-c", "echo bad >&2; exit 3"])
      .output()
      .unwrap();
    let (text, is_error) = report_for(&output, "failing").unwrap();
    assert!(is_error);
    assert!(text.contains("bad"));
  }

  #[cfg(unix)]
  #[test]
  fn test_report_for_failure_without_stderr() {
    let output = Command::new("sh").args(["-c", "exit 7"]).output().unwrap();
    let (text, is_error) = report_for(&output, "boom").unwrap();
    assert!(is_error);
    assert!(text.contains("exit 7"));
  }

  #[cfg(unix)]
  #[test]
  fn test_run_suspended_propagates_failure() {
    assert!(run_suspended(&["true".to_string()]).is_ok());
    assert!(run_suspended(&["false".to_string()]).is_err());
    assert!(run_suspended(&["definitely-not-a-binary-xyz".to_string()]).is_err());
  }
}
