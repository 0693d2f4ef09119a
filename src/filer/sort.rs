use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::entry::FileEntry;

/// Primary sort key plus direction. Persisted in the state file by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortKind {
  #[default]
  Name,
  NameRev,
  Size,
  SizeRev,
  Mtime,
  MtimeRev,
  Ext,
  ExtRev,
}

impl SortKind {
  pub fn label(self) -> &'static str {
    match self {
      SortKind::Name => "name",
      SortKind::NameRev => "name desc",
      SortKind::Size => "size",
      SortKind::SizeRev => "size desc",
      SortKind::Mtime => "time",
      SortKind::MtimeRev => "time desc",
      SortKind::Ext => "ext",
      SortKind::ExtRev => "ext desc",
    }
  }
}

/// Orders two entries under `kind`, with lexicographic name as the
/// tie-breaker. The `..` pinning and directories-first priority are
/// applied by the caller before this comparison.
pub fn compare(kind: SortKind, a: &FileEntry, b: &FileEntry) -> Ordering {
  let primary = match kind {
    SortKind::Name => a.name.cmp(&b.name),
    SortKind::NameRev => b.name.cmp(&a.name),
    SortKind::Size => a.size.cmp(&b.size),
    SortKind::SizeRev => b.size.cmp(&a.size),
    SortKind::Mtime => a.mtime.cmp(&b.mtime),
    SortKind::MtimeRev => b.mtime.cmp(&a.mtime),
    SortKind::Ext => a.ext().cmp(&b.ext()),
    SortKind::ExtRev => b.ext().cmp(&a.ext()),
  };
  primary.then_with(|| a.name.cmp(&b.name))
}

/// Sorts a listing in place. With `dirs_first`, directory entries come
/// before non-directories within the declared order. The `..` entry is
/// always pinned to the front when present.
pub fn sort_entries(entries: &mut [FileEntry], kind: SortKind, dirs_first: bool) {
  entries.sort_by(|a, b| {
    match (a.is_parent(), b.is_parent()) {
      (true, false) => return Ordering::Less,
      (false, true) => return Ordering::Greater,
      _ => {}
    }
    if dirs_first {
      match (a.is_dir(), b.is_dir()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
      }
    }
    compare(kind, a, b)
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filer::entry::FileKind;
  use std::path::PathBuf;
  use std::time::{Duration, SystemTime};

  fn entry(name: &str, size: u64, mtime_off: u64, dir: bool) -> FileEntry {
    FileEntry {
      name: name.to_string(),
      path: PathBuf::from("/tmp").join(name),
      size,
      mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_off),
      kind: if dir { FileKind::Directory } else { FileKind::Regular },
      executable: false,
      symlink_target: None,
      marked: false,
    }
  }

  fn names(entries: &[FileEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
  }

  #[test]
  fn test_sort_name_asc_desc() {
    let mut es = vec![entry("b", 0, 0, false), entry("a", 0, 0, false), entry("c", 0, 0, false)];
    sort_entries(&mut es, SortKind::Name, false);
    assert_eq!(names(&es), ["a", "b", "c"]);
    sort_entries(&mut es, SortKind::NameRev, false);
    assert_eq!(names(&es), ["c", "b", "a"]);
  }

  #[test]
  fn test_sort_size_ties_break_by_name() {
    let mut es = vec![
      entry("z", 10, 0, false),
      entry("a", 10, 0, false),
      entry("m", 5, 0, false),
    ];
    sort_entries(&mut es, SortKind::Size, false);
    assert_eq!(names(&es), ["m", "a", "z"]);
  }

  #[test]
  fn test_sort_mtime() {
    let mut es = vec![
      entry("new", 0, 300, false),
      entry("old", 0, 100, false),
      entry("mid", 0, 200, false),
    ];
    sort_entries(&mut es, SortKind::Mtime, false);
    assert_eq!(names(&es), ["old", "mid", "new"]);
    sort_entries(&mut es, SortKind::MtimeRev, false);
    assert_eq!(names(&es), ["new", "mid", "old"]);
  }

  #[test]
  fn test_sort_ext() {
    let mut es = vec![
      entry("a.rs", 0, 0, false),
      entry("b.md", 0, 0, false),
      entry("c", 0, 0, false),
    ];
    sort_entries(&mut es, SortKind::Ext, false);
    assert_eq!(names(&es), ["c", "b.md", "a.rs"]);
  }

  #[test]
  fn test_parent_always_first() {
    let mut es = vec![
      entry("aaa", 0, 0, false),
      entry("..", 0, 0, true),
      entry("000", 0, 0, false),
    ];
    sort_entries(&mut es, SortKind::SizeRev, false);
    assert_eq!(es[0].name, "..");
    sort_entries(&mut es, SortKind::NameRev, false);
    assert_eq!(es[0].name, "..");
  }

  #[test]
  fn test_dirs_first_priority() {
    let mut es = vec![
      entry("afile", 0, 0, false),
      entry("zdir", 0, 0, true),
      entry("bfile", 0, 0, false),
      entry("adir", 0, 0, true),
    ];
    sort_entries(&mut es, SortKind::Name, true);
    assert_eq!(names(&es), ["adir", "zdir", "afile", "bfile"]);
    sort_entries(&mut es, SortKind::Name, false);
    assert_eq!(names(&es), ["adir", "afile", "bfile", "zdir"]);
  }
}
