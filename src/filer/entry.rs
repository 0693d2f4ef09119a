use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Classification of a directory entry, resolved through symlinks where it
/// matters for navigation (a symlink to a directory is enterable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
  Regular,
  Directory,
  Symlink { to_dir: bool },
  Fifo,
  Device,
  Socket,
}

/// One filesystem listing item. `name` is the base name, or the literal
/// `..` for the parent pseudo-entry. Size and mtime come from the
/// followed stat so symlinks report their target.
#[derive(Debug, Clone)]
pub struct FileEntry {
  pub name: String,
  pub path: PathBuf,
  pub size: u64,
  pub mtime: SystemTime,
  pub kind: FileKind,
  pub executable: bool,
  pub symlink_target: Option<String>,
  pub marked: bool,
}

impl FileEntry {
  /// Stats `dir/name`. Returns None when the entry cannot be stat'd at
  /// all (racing unlink); the caller drops it from the listing.
  pub fn stat(dir: &Path, name: &str) -> Option<Self> {
    let path = dir.join(name);
    let lstat = std::fs::symlink_metadata(&path).ok()?;
    // Followed stat for size/mtime/dir-ness; broken links keep the lstat.
    let stat = std::fs::metadata(&path).unwrap_or_else(|_| lstat.clone());

    let is_symlink = lstat.file_type().is_symlink();
    let symlink_target = if is_symlink {
      std::fs::read_link(&path)
        .ok()
        .map(|t| t.to_string_lossy().to_string())
    } else {
      None
    };

    let kind = if is_symlink {
      FileKind::Symlink { to_dir: stat.is_dir() }
    } else {
      classify(&lstat)
    };

    Some(Self {
      name: name.to_string(),
      path,
      size: stat.len(),
      mtime: stat.modified().unwrap_or(SystemTime::UNIX_EPOCH),
      kind,
      executable: is_executable(&stat),
      symlink_target,
      marked: false,
    })
  }

  /// The `..` pseudo-entry leading every non-root listing.
  pub fn parent_of(dir: &Path) -> Self {
    let path = dir.parent().unwrap_or(dir).to_path_buf();
    let stat = std::fs::metadata(&path).ok();
    Self {
      name: "..".to_string(),
      path,
      size: 0,
      mtime: stat
        .and_then(|m| m.modified().ok())
        .unwrap_or(SystemTime::UNIX_EPOCH),
      kind: FileKind::Directory,
      executable: false,
      symlink_target: None,
      marked: false,
    }
  }

  /// True for directories and symlinks resolving to directories.
  pub fn is_dir(&self) -> bool {
    matches!(
      self.kind,
      FileKind::Directory | FileKind::Symlink { to_dir: true }
    )
  }

  pub fn is_symlink(&self) -> bool {
    matches!(self.kind, FileKind::Symlink { .. })
  }

  pub fn is_exec(&self) -> bool {
    self.executable && !self.is_dir()
  }

  pub fn is_parent(&self) -> bool {
    self.name == ".."
  }

  /// Extension with the leading dot (`.rs`), empty for directories and
  /// extension-less names. Used as the extmap lookup key.
  pub fn ext(&self) -> String {
    if self.is_dir() {
      return String::new();
    }
    match Path::new(&self.name).extension() {
      Some(e) => format!(".{}", e.to_string_lossy()),
      None => String::new(),
    }
  }

  /// File name with the extension removed, for `%x` expansion and the
  /// split name/extension display columns.
  #[allow(dead_code)] // used in tests
  pub fn name_without_ext(&self) -> String {
    if self.is_dir() {
      return self.name.clone();
    }
    let ext = self.ext();
    if ext.is_empty() {
      self.name.clone()
    } else {
      self.name[..self.name.len() - ext.len()].to_string()
    }
  }

  /// Type suffix appended to the drawn name, ls -F style.
  pub fn suffix(&self) -> String {
    match self.kind {
      FileKind::Symlink { to_dir } => {
        let target = self.symlink_target.as_deref().unwrap_or("");
        if to_dir {
          format!("@ -> {target}/")
        } else {
          format!("@ -> {target}")
        }
      }
      FileKind::Directory => "/".to_string(),
      FileKind::Fifo => "|".to_string(),
      FileKind::Socket => "=".to_string(),
      _ if self.executable => "*".to_string(),
      _ => String::new(),
    }
  }

  pub fn is_hidden(&self) -> bool {
    self.name.starts_with('.') && !self.is_parent()
  }
}

#[cfg(unix)]
fn classify(meta: &Metadata) -> FileKind {
  use std::os::unix::fs::FileTypeExt;
  let ft = meta.file_type();
  if ft.is_dir() {
    FileKind::Directory
  } else if ft.is_fifo() {
    FileKind::Fifo
  } else if ft.is_socket() {
    FileKind::Socket
  } else if ft.is_block_device() || ft.is_char_device() {
    FileKind::Device
  } else {
    FileKind::Regular
  }
}

#[cfg(not(unix))]
fn classify(meta: &Metadata) -> FileKind {
  if meta.is_dir() {
    FileKind::Directory
  } else {
    FileKind::Regular
  }
}

#[cfg(unix)]
fn is_executable(meta: &Metadata) -> bool {
  use std::os::unix::fs::PermissionsExt;
  meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &Metadata) -> bool {
  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use std::sync::atomic::{AtomicU32, Ordering};

  static COUNTER: AtomicU32 = AtomicU32::new(0);

  fn test_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("goful_entry_{prefix}_{id}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn test_stat_regular_file() {
    let dir = test_dir("regular");
    fs::write(dir.join("test.txt"), "hello").unwrap();

    let entry = FileEntry::stat(&dir, "test.txt").unwrap();
    assert_eq!(entry.name, "test.txt");
    assert_eq!(entry.size, 5);
    assert_eq!(entry.kind, FileKind::Regular);
    assert!(!entry.is_dir());
    assert!(!entry.marked);
    assert_eq!(entry.path, dir.join("test.txt"));

    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_stat_directory() {
    let dir = test_dir("dir");
    fs::create_dir(dir.join("sub")).unwrap();

    let entry = FileEntry::stat(&dir, "sub").unwrap();
    assert_eq!(entry.kind, FileKind::Directory);
    assert!(entry.is_dir());
    assert_eq!(entry.suffix(), "/");

    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_stat_missing_entry() {
    let dir = test_dir("missing");
    assert!(FileEntry::stat(&dir, "nope.txt").is_none());
    let _ = fs::remove_dir_all(&dir);
  }

  #[cfg(unix)]
  #[test]
  fn test_symlink_to_dir_is_enterable() {
    let dir = test_dir("symlink");
    fs::create_dir(dir.join("real")).unwrap();
    std::os::unix::fs::symlink(dir.join("real"), dir.join("link")).unwrap();

    let entry = FileEntry::stat(&dir, "link").unwrap();
    assert!(entry.is_symlink());
    assert!(entry.is_dir());
    assert_eq!(entry.kind, FileKind::Symlink { to_dir: true });
    assert!(entry.suffix().starts_with("@ -> "));
    assert!(entry.suffix().ends_with('/'));

    let _ = fs::remove_dir_all(&dir);
  }

  #[cfg(unix)]
  #[test]
  fn test_broken_symlink() {
    let dir = test_dir("broken");
    std::os::unix::fs::symlink(dir.join("gone"), dir.join("link")).unwrap();

    let entry = FileEntry::stat(&dir, "link").unwrap();
    assert!(entry.is_symlink());
    assert!(!entry.is_dir());

    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_parent_pseudo_entry() {
    let dir = test_dir("parent");
    let entry = FileEntry::parent_of(&dir);
    assert_eq!(entry.name, "..");
    assert!(entry.is_parent());
    assert!(entry.is_dir());
    assert_eq!(entry.path, dir.parent().unwrap());
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_ext_and_name_without_ext() {
    let dir = test_dir("ext");
    fs::write(dir.join("archive.tar.gz"), "").unwrap();
    fs::write(dir.join("README"), "").unwrap();
    fs::create_dir(dir.join("src.d")).unwrap();

    let gz = FileEntry::stat(&dir, "archive.tar.gz").unwrap();
    assert_eq!(gz.ext(), ".gz");
    assert_eq!(gz.name_without_ext(), "archive.tar");

    let bare = FileEntry::stat(&dir, "README").unwrap();
    assert_eq!(bare.ext(), "");
    assert_eq!(bare.name_without_ext(), "README");

    let sub = FileEntry::stat(&dir, "src.d").unwrap();
    assert_eq!(sub.ext(), "", "directories have no extension");
    assert_eq!(sub.name_without_ext(), "src.d");

    let _ = fs::remove_dir_all(&dir);
  }

  #[cfg(unix)]
  #[test]
  fn test_executable_bit() {
    use std::os::unix::fs::PermissionsExt;
    let dir = test_dir("exec");
    let path = dir.join("run.sh");
    fs::write(&path, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    let entry = FileEntry::stat(&dir, "run.sh").unwrap();
    assert!(entry.is_exec());
    assert_eq!(entry.suffix(), "*");

    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_is_hidden() {
    let dir = test_dir("hidden");
    fs::write(dir.join(".config"), "").unwrap();
    fs::write(dir.join("visible"), "").unwrap();

    assert!(FileEntry::stat(&dir, ".config").unwrap().is_hidden());
    assert!(!FileEntry::stat(&dir, "visible").unwrap().is_hidden());
    assert!(!FileEntry::parent_of(&dir).is_hidden());

    let _ = fs::remove_dir_all(&dir);
  }
}
