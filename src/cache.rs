//! Flat-file record of image identifiers that have already been downloaded.
//!
//! The file holds one identifier per line and only ever grows. A run reads it
//! once into a snapshot, queues new identifiers in memory, and appends them in
//! a single [`SeenIdCache::flush`].

use crate::error::BingError;
use log::{debug, warn};
use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

pub const CACHE_FILE_NAME: &str = "cache.txt";

#[derive(Debug)]
pub struct SeenIdCache {
    path: PathBuf,
    loaded: Vec<String>,
    pending: Vec<String>,
    ends_with_newline: bool,
}

impl SeenIdCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: Vec::new(),
            pending: Vec::new(),
            ends_with_newline: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache file into the snapshot, creating it empty if it does not exist.
    pub fn load(&mut self) -> Result<(), BingError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Creating empty cache file {}", self.path.display());
                fs::File::create(&self.path).map_err(|e| BingError::io(&self.path, e))?;
                fs::read(&self.path).map_err(|e| BingError::io(&self.path, e))?
            }
            Err(err) => return Err(BingError::io(&self.path, err)),
        };
        // Undecodable bytes become U+FFFD so one bad line cannot block every later run.
        let content = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = content {
            warn!(
                "Cache file {} contains invalid UTF-8, replacing undecodable bytes",
                self.path.display()
            );
        }

        self.ends_with_newline = content.is_empty() || content.ends_with('\n');
        self.loaded = content
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        debug!(
            "Loaded {} cached ids from {}",
            self.loaded.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Exact match against the snapshot taken by the last [`load`](Self::load).
    pub fn contains(&self, id: &str) -> bool {
        self.loaded.iter().any(|seen| seen == id)
    }

    /// Queue `id` for the next flush. Queuing the same id twice appends it twice.
    pub fn add(&mut self, id: impl Into<String>) {
        self.pending.push(id.into());
    }

    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Append pending ids to the file and reload. Does nothing when nothing is pending.
    pub fn flush(&mut self) -> Result<(), BingError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        if !self.ends_with_newline {
            buf.push('\n');
        }
        for id in &self.pending {
            buf.push_str(id);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BingError::io(&self.path, e))?;
        file.write_all(buf.as_bytes())
            .map_err(|e| BingError::io(&self.path, e))?;
        debug!(
            "Appended {} ids to {}",
            self.pending.len(),
            self.path.display()
        );

        self.pending.clear();
        self.load()
    }

    /// Guard that flushes this cache when dropped unless [`FlushGuard::finish`] ran first.
    pub fn flush_guard(&mut self) -> FlushGuard<'_> {
        FlushGuard {
            cache: self,
            armed: true,
        }
    }
}

pub struct FlushGuard<'a> {
    cache: &'a mut SeenIdCache,
    armed: bool,
}

impl FlushGuard<'_> {
    pub fn finish(mut self) -> Result<(), BingError> {
        self.armed = false;
        self.cache.flush()
    }
}

impl Deref for FlushGuard<'_> {
    type Target = SeenIdCache;

    fn deref(&self) -> &SeenIdCache {
        self.cache
    }
}

impl DerefMut for FlushGuard<'_> {
    fn deref_mut(&mut self) -> &mut SeenIdCache {
        self.cache
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = self.cache.flush() {
                warn!("Failed to flush id cache on drop: {}", err);
            }
        }
    }
}
