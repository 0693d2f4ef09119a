use crate::filer::sort::SortKind;
use crate::filer::workspace::Layout;

/// Everything a key, menu item or toolbar button can trigger. The
/// keymap binds canonical key tokens to these; the extmap binds them
/// per file extension under a key token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
  Quit,

  // Workspaces.
  CreateWorkspace,
  CloseWorkspace,
  NextWorkspace,
  PrevWorkspace,
  SetWorkspace(usize),
  EditWorkspaceTitle,

  // Panes.
  CreateDir,
  CloseDir,
  ReloadAll,
  FocusNext,
  FocusPrev,
  SwapNextDir,
  SwapPrevDir,
  ChdirNeighbor,

  // Navigation.
  LinkedParent,
  ToggleLinkedNav,
  ChdirHome,
  ChdirRoot,
  Chdir(String),
  EnterDir,
  CursorMove(i32),
  MoveTop,
  MoveBottom,
  Scroll(i32),
  PageDown,
  PageUp,

  // Marks and the in-pane finder.
  ToggleMark,
  InvertMark,
  ResetPane,
  StartFinder,

  // Cmdline modes.
  OpenShell,
  OpenShellSuspend,
  StartChdir,
  StartGlob,
  StartGlobdir,
  Touch,
  Mkdir,
  Copy,
  Move,
  Rename,
  Remove,

  // Sorting and layout.
  SortBy(SortKind),
  TogglePriority,
  SetLayout(Layout),
  ToggleHidden,

  // Modal widgets.
  Menu(String),
  Help,

  // Comparison and difference search.
  ToggleExcludes,
  ToggleComparisonColors,
  CalculateDigest,
  StartDiffSearch,
  ContinueDiffSearch,

  // Cross-pane sync operations.
  SyncMode,
  SyncCopy,
  SyncDelete,
  SyncRename,
  ToggleIgnoreFailures,
  CopyAll,
  MoveAll,

  // Opening and external commands.
  Open,
  ShellCmd(String),
  SpawnCmd(String),

  None,
}

pub type Keymap = std::collections::HashMap<String, Action>;
pub type Extmap = std::collections::HashMap<String, std::collections::HashMap<String, Action>>;

/// The built-in key bindings, Emacs-flavored with vi-style extras.
pub fn default_keymap() -> Keymap {
  let mut map = Keymap::new();
  let mut bind = |keys: &[&str], action: Action| {
    for key in keys {
      map.insert(key.to_string(), action.clone());
    }
  };

  bind(&["q", "Q"], Action::Quit);
  bind(&["M-C-o"], Action::CreateWorkspace);
  bind(&["M-C-w"], Action::CloseWorkspace);
  bind(&["M-f"], Action::NextWorkspace);
  bind(&["M-b"], Action::PrevWorkspace);
  bind(&["M-W"], Action::EditWorkspaceTitle);
  bind(&["C-o"], Action::CreateDir);
  bind(&["C-w"], Action::CloseDir);
  bind(&["C-l"], Action::ReloadAll);
  bind(&["C-f", "C-i", "right", "l"], Action::FocusNext);
  bind(&["C-b", "left", "h"], Action::FocusPrev);
  bind(&["F"], Action::SwapNextDir);
  bind(&["B"], Action::SwapPrevDir);
  bind(&["w"], Action::ChdirNeighbor);
  bind(&["C-h", "backspace", "u"], Action::LinkedParent);
  bind(&["M-l", "L"], Action::ToggleLinkedNav);
  bind(&["~"], Action::ChdirHome);
  bind(&["\\"], Action::ChdirRoot);
  bind(&["C-n", "down", "j"], Action::CursorMove(1));
  bind(&["C-p", "up", "k"], Action::CursorMove(-1));
  bind(&["C-d"], Action::CursorMove(5));
  bind(&["C-u"], Action::CursorMove(-5));
  bind(&["C-a", "home", "^"], Action::MoveTop);
  bind(&["C-e", "end", "$"], Action::MoveBottom);
  bind(&["M-n"], Action::Scroll(1));
  bind(&["M-p"], Action::Scroll(-1));
  bind(&["C-v", "pgdn"], Action::PageDown);
  bind(&["M-v", "pgup"], Action::PageUp);
  bind(&[" "], Action::ToggleMark);
  bind(&["M-="], Action::InvertMark);
  bind(&["C-g", "C-["], Action::ResetPane);
  bind(&["f", "/"], Action::StartFinder);
  bind(&[";"], Action::OpenShell);
  bind(&[":"], Action::OpenShellSuspend);
  bind(&["n"], Action::Touch);
  bind(&["K"], Action::Mkdir);
  bind(&["c"], Action::Copy);
  bind(&["m"], Action::Move);
  bind(&["r"], Action::Rename);
  bind(&["D"], Action::Remove);
  bind(&["d"], Action::StartChdir);
  bind(&["g"], Action::StartGlob);
  bind(&["G"], Action::StartGlobdir);
  bind(&["s"], Action::Menu("sort".into()));
  bind(&["v"], Action::Menu("view".into()));
  bind(&["x"], Action::Menu("command".into()));
  bind(&["X"], Action::Menu("external-command".into()));
  bind(&["b"], Action::Menu("bookmark".into()));
  bind(&["e"], Action::Menu("editor".into()));
  bind(&["E"], Action::ToggleExcludes);
  bind(&["C"], Action::ToggleComparisonColors);
  bind(&["="], Action::CalculateDigest);
  bind(&["["], Action::StartDiffSearch);
  bind(&["]"], Action::ContinueDiffSearch);
  bind(&["S"], Action::SyncMode);
  bind(&["!"], Action::ToggleIgnoreFailures);
  bind(&["M-c"], Action::CopyAll);
  bind(&["M-m"], Action::MoveAll);
  bind(&["C-m", "o"], Action::Open);
  bind(&["?"], Action::Help);
  map
}

/// Per-extension associations consulted before the keymap. Directories
/// enter (with linked propagation), executables run, archives extract,
/// interpreters run their scripts, media opens its menu.
pub fn default_extmap() -> Extmap {
  let mut assoc = std::collections::HashMap::new();
  let mut bind = |ext: &str, action: Action| {
    assoc.insert(ext.to_string(), action);
  };

  bind(".dir", Action::EnterDir);
  bind(".exec", Action::ShellCmd("./%f".into()));

  bind(".zip", Action::ShellCmd("unzip %f -d %D".into()));
  bind(".tar", Action::ShellCmd("tar xvf %f -C %D".into()));
  bind(".gz", Action::ShellCmd("tar xvfz %f -C %D".into()));
  bind(".tgz", Action::ShellCmd("tar xvfz %f -C %D".into()));
  bind(".bz2", Action::ShellCmd("tar xvfj %f -C %D".into()));
  bind(".xz", Action::ShellCmd("tar xvfJ %f -C %D".into()));
  bind(".txz", Action::ShellCmd("tar xvfJ %f -C %D".into()));

  bind(".go", Action::ShellCmd("go run %f".into()));
  bind(".py", Action::ShellCmd("python %f".into()));
  bind(".rb", Action::ShellCmd("ruby %f".into()));
  bind(".js", Action::ShellCmd("node %f".into()));
  bind(".rs", Action::ShellCmd("cargo script %f".into()));

  for ext in [".jpg", ".jpeg", ".gif", ".png", ".bmp"] {
    assoc.insert(ext.to_string(), Action::Menu("image".into()));
  }
  for ext in [".avi", ".mp4", ".mkv", ".wmv", ".flv", ".mp3", ".flac"] {
    assoc.insert(ext.to_string(), Action::Menu("media".into()));
  }

  let mut map = Extmap::new();
  map.insert("C-m".to_string(), assoc.clone());
  map.insert("o".to_string(), assoc);
  map
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_keymap_core_bindings() {
    let map = default_keymap();
    assert_eq!(map.get("q"), Some(&Action::Quit));
    assert_eq!(map.get("C-n"), Some(&Action::CursorMove(1)));
    assert_eq!(map.get("backspace"), Some(&Action::LinkedParent));
    assert_eq!(map.get("["), Some(&Action::StartDiffSearch));
    assert_eq!(map.get("]"), Some(&Action::ContinueDiffSearch));
    assert_eq!(map.get("="), Some(&Action::CalculateDigest));
    assert_eq!(map.get("C-m"), Some(&Action::Open));
    assert_eq!(map.get("s"), Some(&Action::Menu("sort".into())));
  }

  #[test]
  fn test_default_extmap_pseudo_extensions() {
    let map = default_extmap();
    let assoc = map.get("C-m").unwrap();
    assert_eq!(assoc.get(".dir"), Some(&Action::EnterDir));
    assert!(matches!(assoc.get(".exec"), Some(Action::ShellCmd(_))));
    assert!(matches!(assoc.get(".zip"), Some(Action::ShellCmd(_))));
    assert_eq!(map.get("o").unwrap().get(".dir"), Some(&Action::EnterDir));
  }
}
