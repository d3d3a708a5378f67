//! Offline Read Cache
//!
//! Disk-backed cache mirroring the repository paths the journal fetches.
//! Reads go to the network first; when the remote is unreachable the last
//! fetched copy is served instead, flagged stale to the caller. Successful
//! fetches write through. Submissions never touch the cache: only reads are
//! safe to answer from stale data.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::CacheConfig;

/// Errors from the offline cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to cache path {0:?}")]
    InvalidPath(String),
}

/// Cache usage, for `growlog status`
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub files: usize,
    pub bytes: u64,
}

/// Disk-backed cache of fetched repository files
pub struct OfflineCache {
    root: PathBuf,
    enabled: bool,
}

impl OfflineCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            root: expand_home(&config.dir),
            enabled: config.enabled,
        }
    }

    /// A cache that never stores or serves anything
    pub fn disabled() -> Self {
        Self {
            root: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// On-disk location for a repository path, or None for unsafe keys
    fn path_for(&self, repo_path: &str) -> Option<PathBuf> {
        if repo_path.is_empty()
            || repo_path.starts_with('/')
            || repo_path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
        {
            return None;
        }
        let mut path = self.root.clone();
        for seg in repo_path.split('/') {
            path.push(seg);
        }
        Some(path)
    }

    /// Fetch the cached copy of a repository file, if present
    pub fn get(&self, repo_path: &str) -> Option<Vec<u8>> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(repo_path)?;
        match fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!("Cache hit for {}", repo_path);
                Some(bytes)
            }
            Err(_) => None,
        }
    }

    /// Store a freshly fetched file
    pub fn put(&self, repo_path: &str, bytes: &[u8]) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        let path = self
            .path_for(repo_path)
            .ok_or_else(|| CacheError::InvalidPath(repo_path.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(())
    }

    /// Drop everything cached
    pub fn clear(&self) -> Result<(), CacheError> {
        if self.enabled && self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        Ok(())
    }

    /// Count cached files and their total size
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        if self.enabled {
            collect_stats(&self.root, &mut stats);
        }
        stats
    }
}

fn collect_stats(dir: &Path, stats: &mut CacheStats) {
    let Ok(read) = fs::read_dir(dir) else {
        return;
    };
    for dent in read.flatten() {
        let path = dent.path();
        if path.is_dir() {
            collect_stats(&path, stats);
        } else if let Ok(meta) = dent.metadata() {
            stats.files += 1;
            stats.bytes += meta.len();
        }
    }
}

/// Expand a leading `~/` in a configured directory
fn expand_home(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> (tempfile::TempDir, OfflineCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(&CacheConfig {
            dir: dir.path().to_string_lossy().to_string(),
            enabled: true,
        });
        (dir, cache)
    }

    #[test]
    fn test_put_then_get() {
        let (_dir, cache) = temp_cache();
        cache
            .put("data/basil/index.json", br#"{"entries":[]}"#)
            .unwrap();
        assert_eq!(
            cache.get("data/basil/index.json").unwrap(),
            br#"{"entries":[]}"#
        );
    }

    #[test]
    fn test_miss_returns_none() {
        let (_dir, cache) = temp_cache();
        assert!(cache.get("data/missing.json").is_none());
    }

    #[test]
    fn test_rejects_traversal_keys() {
        let (_dir, cache) = temp_cache();
        assert!(cache.put("../escape.json", b"x").is_err());
        assert!(cache.put("/etc/passwd", b"x").is_err());
        assert!(cache.get("data/../../escape.json").is_none());
    }

    #[test]
    fn test_disabled_cache_is_inert() {
        let cache = OfflineCache::disabled();
        assert!(cache.put("data/a.json", b"x").is_ok());
        assert!(cache.get("data/a.json").is_none());
        assert_eq!(cache.stats().files, 0);
    }

    #[test]
    fn test_stats_and_clear() {
        let (_dir, cache) = temp_cache();
        cache.put("data/a.json", b"1234").unwrap();
        cache.put("data/b/c.json", b"56").unwrap();

        let stats = cache.stats();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.bytes, 6);

        cache.clear().unwrap();
        assert_eq!(cache.stats().files, 0);
    }

    #[test]
    fn test_put_overwrites() {
        let (_dir, cache) = temp_cache();
        cache.put("data/a.json", b"old").unwrap();
        cache.put("data/a.json", b"new").unwrap();
        assert_eq!(cache.get("data/a.json").unwrap(), b"new");
    }
}
