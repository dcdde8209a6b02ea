//! Content-addressed artifact cache.
//!
//! Rendered artifacts are keyed by `(scene_number, parameter hash)` and
//! shared across jobs: two scenes that hash identically reuse the same
//! rendered frame. Entries are write-once; a "wrong" artifact is fixed by a
//! new parameter value (hence a new hash), never by in-place mutation.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::params::ParamHash;

/// A reference to a rendered or assembled media artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Storage location (URL or path) of the artifact.
    pub location: String,
    /// When the artifact was produced.
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Create an artifact reference stamped with the current time.
    pub fn new<S: Into<String>>(location: S) -> Self {
        Self {
            location: location.into(),
            created_at: Utc::now(),
        }
    }
}

/// Store of rendered artifacts keyed by scene number and parameter hash.
///
/// The trait keeps eviction pluggable: the in-memory implementation is
/// unbounded (prototype scale), but a bounded or disk-backed store can be
/// swapped in without touching the pipeline.
pub trait ArtifactStore: Send + Sync {
    /// Look up the artifact rendered for this scene and parameter hash.
    fn get(&self, scene_number: u32, hash: &ParamHash) -> Option<Artifact>;

    /// Record a rendered artifact.
    ///
    /// Entries are write-once: if the slot is already occupied, the existing
    /// artifact is kept and the new one is dropped.
    fn put(&self, scene_number: u32, hash: ParamHash, artifact: Artifact);

    /// Remove one entry. Returns true if it existed.
    fn evict(&self, scene_number: u32, hash: &ParamHash) -> bool;

    /// Number of cached artifacts.
    fn len(&self) -> usize;

    /// True when the cache holds no artifacts.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unbounded in-memory artifact cache.
#[derive(Debug, Default)]
pub struct InMemoryArtifactCache {
    entries: DashMap<(u32, ParamHash), Artifact>,
}

impl InMemoryArtifactCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactStore for InMemoryArtifactCache {
    fn get(&self, scene_number: u32, hash: &ParamHash) -> Option<Artifact> {
        self.entries
            .get(&(scene_number, hash.clone()))
            .map(|entry| entry.value().clone())
    }

    fn put(&self, scene_number: u32, hash: ParamHash, artifact: Artifact) {
        self.entries
            .entry((scene_number, hash))
            .or_insert(artifact);
    }

    fn evict(&self, scene_number: u32, hash: &ParamHash) -> bool {
        self.entries.remove(&(scene_number, hash.clone())).is_some()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::hash_params;
    use crate::storyboard::fixtures::scene_params;

    #[test]
    fn test_get_miss_then_hit() {
        let cache = InMemoryArtifactCache::new();
        let hash = hash_params(&scene_params("scene one"));

        assert!(cache.get(1, &hash).is_none());

        cache.put(1, hash.clone(), Artifact::new("https://cdn/frames/a.png"));
        let hit = cache.get(1, &hash).unwrap();
        assert_eq!(hit.location, "https://cdn/frames/a.png");
    }

    #[test]
    fn test_key_includes_scene_number() {
        let cache = InMemoryArtifactCache::new();
        let hash = hash_params(&scene_params("shared"));

        cache.put(1, hash.clone(), Artifact::new("frame-1.png"));
        assert!(cache.get(2, &hash).is_none());

        // Identical hashes for different scene numbers are distinct entries.
        cache.put(2, hash.clone(), Artifact::new("frame-2.png"));
        assert_eq!(cache.get(1, &hash).unwrap().location, "frame-1.png");
        assert_eq!(cache.get(2, &hash).unwrap().location, "frame-2.png");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_entries_are_write_once() {
        let cache = InMemoryArtifactCache::new();
        let hash = hash_params(&scene_params("stable"));

        cache.put(3, hash.clone(), Artifact::new("first.png"));
        cache.put(3, hash.clone(), Artifact::new("second.png"));

        assert_eq!(cache.get(3, &hash).unwrap().location, "first.png");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict() {
        let cache = InMemoryArtifactCache::new();
        let hash = hash_params(&scene_params("evictable"));

        cache.put(1, hash.clone(), Artifact::new("a.png"));
        assert!(cache.evict(1, &hash));
        assert!(!cache.evict(1, &hash));
        assert!(cache.get(1, &hash).is_none());
        assert!(cache.is_empty());
    }
}
