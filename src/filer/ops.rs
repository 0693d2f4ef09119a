use std::io;
use std::path::{Path, PathBuf};

/// Returns a non-clobbering destination by appending `_copy`, `_copy2`,
/// ... while the path exists.
pub fn unique_dest_path(dest: &Path) -> PathBuf {
  if !dest.exists() {
    return dest.to_path_buf();
  }

  let stem = dest
    .file_stem()
    .map(|s| s.to_string_lossy().to_string())
    .unwrap_or_default();
  let ext = dest.extension().map(|e| e.to_string_lossy().to_string());
  let parent = dest.parent().unwrap_or(Path::new("."));

  let make_name = |suffix: &str| -> PathBuf {
    match &ext {
      Some(e) => parent.join(format!("{stem}{suffix}.{e}")),
      None => parent.join(format!("{stem}{suffix}")),
    }
  };

  let first = make_name("_copy");
  if !first.exists() {
    return first;
  }

  let mut n = 2u32;
  loop {
    let candidate = make_name(&format!("_copy{n}"));
    if !candidate.exists() {
      return candidate;
    }
    n += 1;
  }
}

/// Copies a file, symlink or directory tree to `dest`.
pub fn copy_path(source: &Path, dest: &Path) -> io::Result<()> {
  let meta = std::fs::symlink_metadata(source)?;
  if meta.file_type().is_symlink() {
    return copy_symlink(source, dest);
  }
  if meta.is_dir() {
    copy_dir_recursive(source, dest)
  } else {
    std::fs::copy(source, dest)?;
    Ok(())
  }
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
  let target = std::fs::read_link(source)?;
  std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> io::Result<()> {
  std::fs::copy(source, dest)?;
  Ok(())
}

pub fn copy_dir_recursive(source: &Path, dest: &Path) -> io::Result<()> {
  std::fs::create_dir_all(dest)?;
  for entry in std::fs::read_dir(source)? {
    let entry = entry?;
    let src_path = entry.path();
    let dst_path = dest.join(entry.file_name());
    copy_path(&src_path, &dst_path)?;
  }
  Ok(())
}

/// Moves across filesystems: a plain rename first, copy-then-delete
/// when the rename fails with a cross-device error.
pub fn move_path(source: &Path, dest: &Path) -> io::Result<()> {
  match std::fs::rename(source, dest) {
    Ok(()) => Ok(()),
    Err(_) => {
      copy_path(source, dest)?;
      remove_path(source)
    }
  }
}

pub fn remove_path(path: &Path) -> io::Result<()> {
  let meta = std::fs::symlink_metadata(path)?;
  if meta.is_dir() && !meta.file_type().is_symlink() {
    std::fs::remove_dir_all(path)
  } else {
    std::fs::remove_file(path)
  }
}

/// Total logical bytes under a path, for progress totals.
pub fn path_size(path: &Path) -> u64 {
  let Ok(meta) = std::fs::symlink_metadata(path) else { return 0 };
  if !meta.is_dir() {
    return meta.len();
  }
  let Ok(read) = std::fs::read_dir(path) else { return 0 };
  read.flatten().map(|e| path_size(&e.path())).sum()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use std::sync::atomic::{AtomicU32, Ordering};

  static COUNTER: AtomicU32 = AtomicU32::new(0);

  fn test_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("goful_ops_{prefix}_{id}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn test_unique_dest_path_no_conflict() {
    let dir = test_dir("no_conflict");
    let dest = dir.join("foo.txt");
    assert_eq!(unique_dest_path(&dest), dest);
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_unique_dest_path_incrementing() {
    let dir = test_dir("incr");
    let dest = dir.join("foo.txt");
    fs::write(&dest, "").unwrap();
    assert_eq!(unique_dest_path(&dest), dir.join("foo_copy.txt"));

    fs::write(dir.join("foo_copy.txt"), "").unwrap();
    assert_eq!(unique_dest_path(&dest), dir.join("foo_copy2.txt"));
    fs::write(dir.join("foo_copy2.txt"), "").unwrap();
    assert_eq!(unique_dest_path(&dest), dir.join("foo_copy3.txt"));
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_unique_dest_path_without_extension() {
    let dir = test_dir("no_ext");
    let dest = dir.join("foo");
    fs::write(&dest, "").unwrap();
    assert_eq!(unique_dest_path(&dest), dir.join("foo_copy"));
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_copy_file() {
    let dir = test_dir("copy_file");
    fs::write(dir.join("src.txt"), "hello").unwrap();
    copy_path(&dir.join("src.txt"), &dir.join("dst.txt")).unwrap();
    assert_eq!(fs::read_to_string(dir.join("dst.txt")).unwrap(), "hello");
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_copy_dir_recursive() {
    let dir = test_dir("copy_dir");
    let src = dir.join("src_dir");
    fs::create_dir_all(src.join("sub")).unwrap();
    fs::write(src.join("a.txt"), "aaa").unwrap();
    fs::write(src.join("sub").join("b.txt"), "bbb").unwrap();

    let dst = dir.join("dst_dir");
    copy_path(&src, &dst).unwrap();
    assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "aaa");
    assert_eq!(fs::read_to_string(dst.join("sub").join("b.txt")).unwrap(), "bbb");
    let _ = fs::remove_dir_all(&dir);
  }

  #[cfg(unix)]
  #[test]
  fn test_copy_preserves_symlink() {
    let dir = test_dir("copy_link");
    fs::write(dir.join("real"), "x").unwrap();
    std::os::unix::fs::symlink(dir.join("real"), dir.join("link")).unwrap();
    copy_path(&dir.join("link"), &dir.join("link2")).unwrap();
    assert!(fs::symlink_metadata(dir.join("link2")).unwrap().file_type().is_symlink());
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_move_path() {
    let dir = test_dir("move");
    fs::write(dir.join("a"), "data").unwrap();
    move_path(&dir.join("a"), &dir.join("b")).unwrap();
    assert!(!dir.join("a").exists());
    assert_eq!(fs::read_to_string(dir.join("b")).unwrap(), "data");
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_remove_path_file_and_tree() {
    let dir = test_dir("remove");
    fs::write(dir.join("f"), "").unwrap();
    fs::create_dir_all(dir.join("tree").join("deep")).unwrap();
    fs::write(dir.join("tree").join("deep").join("x"), "").unwrap();

    remove_path(&dir.join("f")).unwrap();
    remove_path(&dir.join("tree")).unwrap();
    assert!(!dir.join("f").exists());
    assert!(!dir.join("tree").exists());
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_path_size_recurses() {
    let dir = test_dir("size");
    fs::write(dir.join("a"), "12345").unwrap();
    fs::create_dir(dir.join("sub")).unwrap();
    fs::write(dir.join("sub").join("b"), "123").unwrap();
    assert_eq!(path_size(&dir), 8);
    let _ = fs::remove_dir_all(&dir);
  }
}
