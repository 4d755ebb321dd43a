use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
};

use lru::LruCache;
use xxhash_rust::xxh3::xxh3_64;

use crate::ast::Program;

/// A stored program together with the exact source it was parsed from.
///
/// The source is kept for collision verification: the cache key is a
/// 64-bit hash of the source text, and two different sources can share a
/// hash.
struct CacheEntry {
    source:  String,
    program: Arc<Program>,
}

/// A bounded, process-wide cache of parsed programs, keyed by source text.
///
/// Keys are `xxh3` hashes of the source; hash collisions are tolerated by
/// verifying the stored source byte-for-byte on every hit, so a collision
/// degrades to a miss rather than returning the wrong program. Eviction is
/// true least-recently-used: a hit bumps the entry's recency.
///
/// The cache is safe to share across threads; all access goes through one
/// internal lock.
///
/// # Example
/// ```
/// use std::{num::NonZeroUsize, sync::Arc};
///
/// use quill::interpreter::{
///     cache::ProgramCache,
///     lexer::tokenize,
///     parser::core::parse_program,
/// };
///
/// let cache = ProgramCache::new(NonZeroUsize::new(16).unwrap());
/// let source = "1 + 2";
///
/// assert!(cache.get(source).is_none());
///
/// let program = parse_program(&tokenize(source).unwrap()).unwrap();
/// cache.put(source, Arc::new(program));
///
/// assert!(cache.get(source).is_some());
/// ```
pub struct ProgramCache {
    entries: Mutex<LruCache<u64, CacheEntry>>,
}

impl ProgramCache {
    /// Creates a cache holding at most `capacity` parsed programs.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { entries: Mutex::new(LruCache::new(capacity)) }
    }

    /// Looks up the parsed program for a source text.
    ///
    /// On a hash hit, the stored source is compared against `source`; a
    /// mismatch is treated as a miss. A verified hit bumps the entry's
    /// recency.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<Arc<Program>> {
        let key = xxh3_64(source.as_bytes());
        let mut entries = self.entries.lock().ok()?;

        // Verify with a recency-neutral peek first; a colliding miss must
        // not refresh the stale entry it collided with.
        if entries.peek(&key)?.source != source {
            return None;
        }

        let entry = entries.get(&key)?;
        Some(Arc::clone(&entry.program))
    }

    /// Stores a parsed program under its source text.
    ///
    /// An existing entry with the same key is replaced. When the cache is
    /// full, the least-recently-used entry is evicted first.
    pub fn put(&self, source: &str, program: Arc<Program>) {
        let key = xxh3_64(source.as_bytes());
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };

        entries.put(key,
                    CacheEntry { source: source.to_string(),
                                 program });
    }

    /// Returns the number of currently cached programs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns `true` if the cache holds no programs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
