use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use super::directory::Directory;

/// Size verdict within a same-named group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeCompare {
  #[default]
  Unknown,
  Equal,
  Smallest,
  Largest,
  Middle,
}

/// Mtime verdict within a same-named group, after truncation to whole
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeCompare {
  #[default]
  Unknown,
  Equal,
  Earliest,
  Latest,
  Middle,
}

/// Content-digest verdict, populated lazily on explicit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestCompare {
  #[default]
  Unknown,
  Equal,
  Different,
  NotApplicable,
}

/// Per-(name, pane) comparison verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareState {
  pub name_present: bool,
  pub size: SizeCompare,
  pub time: TimeCompare,
  pub digest: DigestCompare,
}

/// Cross-pane comparison cache: name → pane index → state. Readers are
/// the render path; writers run after navigation, reload and digest
/// requests, so the lock is held briefly on both sides.
#[derive(Debug, Default)]
pub struct ComparisonIndex {
  cache: RwLock<HashMap<String, HashMap<usize, CompareState>>>,
}

struct GroupMember {
  pane: usize,
  size: u64,
  mtime_secs: u64,
}

fn mtime_secs(t: SystemTime) -> u64 {
  t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl ComparisonIndex {
  /// Builds the index from the panes' current listings. Names present
  /// in fewer than two panes are not indexed; `..` never is. Returns
  /// None when there is nothing to compare.
  pub fn build(dirs: &[Directory]) -> Option<Self> {
    if dirs.len() < 2 {
      return None;
    }

    let mut by_name: HashMap<String, Vec<GroupMember>> = HashMap::new();
    for (pane, dir) in dirs.iter().enumerate() {
      for entry in &dir.entries {
        if entry.is_parent() {
          continue;
        }
        by_name.entry(entry.name.clone()).or_default().push(GroupMember {
          pane,
          size: entry.size,
          mtime_secs: mtime_secs(entry.mtime),
        });
      }
    }

    let mut cache = HashMap::new();
    for (name, members) in by_name {
      if members.len() < 2 {
        continue;
      }
      let states = group_states(&members);
      cache.insert(name, states);
    }
    Some(Self { cache: RwLock::new(cache) })
  }

  /// The state for a file in a pane, or None when the name is absent or
  /// unique to one pane.
  pub fn get(&self, pane: usize, name: &str) -> Option<CompareState> {
    let cache = self.cache.read().ok()?;
    cache.get(name)?.get(&pane).copied()
  }

  /// Union of indexed names, used by the toolbar digest-all action.
  pub fn shared_filenames(&self) -> Vec<String> {
    match self.cache.read() {
      Ok(cache) => {
        let mut names: Vec<String> = cache.keys().cloned().collect();
        names.sort();
        names
      }
      Err(_) => Vec::new(),
    }
  }

  #[allow(dead_code)] // used in tests
  pub fn len(&self) -> usize {
    self.cache.read().map(|c| c.len()).unwrap_or(0)
  }

  #[allow(dead_code)] // used in tests
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Computes digest verdicts for one name. Files are grouped by exact
  /// listed size; a size unique in the group means NotApplicable, equal
  /// sizes get a streaming content digest each. An unreadable file stays
  /// Unknown while the rest of its group still resolves. Returns the
  /// count of entries whose digest resolved.
  pub fn update_digest_states(&self, name: &str, dirs: &[Directory]) -> usize {
    let mut cache = match self.cache.write() {
      Ok(c) => c,
      Err(_) => return 0,
    };
    let Some(states) = cache.get_mut(name) else {
      return 0;
    };

    struct FileInfo {
      pane: usize,
      path: std::path::PathBuf,
      size: u64,
    }

    let mut files = Vec::new();
    for pane in states.keys().copied().collect::<Vec<_>>() {
      let Some(dir) = dirs.get(pane) else { continue };
      if let Some(entry) = dir.find_file_by_name(name) {
        files.push(FileInfo { pane, path: entry.path.clone(), size: entry.size });
      }
    }

    let mut size_groups: HashMap<u64, Vec<&FileInfo>> = HashMap::new();
    for fi in &files {
      size_groups.entry(fi.size).or_default().push(fi);
    }

    let mut processed = 0;
    for group in size_groups.values() {
      if group.len() < 2 {
        for fi in group {
          if let Some(state) = states.get_mut(&fi.pane) {
            state.digest = DigestCompare::NotApplicable;
          }
        }
        continue;
      }

      let mut digests: HashMap<usize, u64> = HashMap::new();
      for fi in group {
        if let Ok(digest) = file_digest(&fi.path) {
          digests.insert(fi.pane, digest);
        }
      }

      let mut values = digests.values();
      let all_equal = match values.next() {
        Some(first) => values.all(|d| d == first),
        None => true,
      };

      for fi in group {
        if !digests.contains_key(&fi.pane) {
          continue; // digest failed, verdict stays Unknown
        }
        if let Some(state) = states.get_mut(&fi.pane) {
          state.digest = if all_equal {
            DigestCompare::Equal
          } else {
            DigestCompare::Different
          };
          processed += 1;
        }
      }
    }
    processed
  }
}

fn group_states(members: &[GroupMember]) -> HashMap<usize, CompareState> {
  let min_size = members.iter().map(|m| m.size).min().unwrap_or(0);
  let max_size = members.iter().map(|m| m.size).max().unwrap_or(0);
  let min_time = members.iter().map(|m| m.mtime_secs).min().unwrap_or(0);
  let max_time = members.iter().map(|m| m.mtime_secs).max().unwrap_or(0);

  members
    .iter()
    .map(|m| {
      let size = if min_size == max_size {
        SizeCompare::Equal
      } else if m.size == min_size {
        SizeCompare::Smallest
      } else if m.size == max_size {
        SizeCompare::Largest
      } else {
        SizeCompare::Middle
      };
      let time = if min_time == max_time {
        TimeCompare::Equal
      } else if m.mtime_secs == min_time {
        TimeCompare::Earliest
      } else if m.mtime_secs == max_time {
        TimeCompare::Latest
      } else {
        TimeCompare::Middle
      };
      (
        m.pane,
        CompareState { name_present: true, size, time, digest: DigestCompare::Unknown },
      )
    })
    .collect()
}

/// Streaming 64-bit content digest: the first eight bytes of the file's
/// blake3 hash.
pub fn file_digest(path: &Path) -> Result<u64> {
  let mut file = std::fs::File::open(path)?;
  let mut hasher = blake3::Hasher::new();
  let mut buf = [0u8; 65536];
  loop {
    let n = file.read(&mut buf)?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }
  let hash = hasher.finalize();
  let bytes: [u8; 8] = hash.as_bytes()[..8].try_into()?;
  Ok(u64::from_le_bytes(bytes))
}
