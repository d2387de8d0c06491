//! # Mesh Cache
//!
//! Extraction is the expensive part of a frame, so meshes are kept per chunk
//! and rebuilt only when an input changes. The key covers the chunk's own
//! content and the content of its six neighbours: a neighbour that finishes
//! generating later changes the key and the border faces get re-extracted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cubeworld_core::{ChunkCoord, ContentId};
use parking_lot::Mutex;

use crate::error::MeshResult;
use crate::extractor::FaceExtractor;
use crate::mesh::ChunkMesh;
use crate::neighbor::ChunkNeighborhood;

/// Everything a cached mesh depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshKey {
    /// Content of the meshed chunk.
    pub content: ContentId,
    /// Content of each neighbour, `None` where not loaded.
    pub neighbors: [Option<ContentId>; 6],
}

impl MeshKey {
    /// Key for a neighbourhood.
    #[must_use]
    pub fn of(neighborhood: &ChunkNeighborhood<'_>) -> Self {
        Self {
            content: neighborhood.center().content_id(),
            neighbors: neighborhood.neighbor_content_ids(),
        }
    }
}

struct CacheEntry {
    key: MeshKey,
    mesh: Arc<ChunkMesh>,
}

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshCacheStats {
    /// Cached meshes.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran extraction.
    pub misses: u64,
}

/// Thread-safe per-chunk mesh cache.
#[derive(Default)]
pub struct MeshCache {
    entries: Mutex<HashMap<ChunkCoord, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MeshCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached mesh for the neighbourhood's chunk, extracting it first if
    /// the chunk or any neighbour changed since the last call.
    ///
    /// # Errors
    ///
    /// Propagates extraction errors; nothing is cached on failure.
    pub fn get_or_extract(
        &self,
        extractor: &FaceExtractor,
        neighborhood: &ChunkNeighborhood<'_>,
    ) -> MeshResult<Arc<ChunkMesh>> {
        let coord = neighborhood.center().coord();
        let key = MeshKey::of(neighborhood);

        if let Some(entry) = self.entries.lock().get(&coord) {
            if entry.key == key {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(&entry.mesh));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // Extract without holding the lock.
        let mesh = Arc::new(extractor.extract(neighborhood.center(), neighborhood)?);
        self.entries.lock().insert(
            coord,
            CacheEntry {
                key,
                mesh: Arc::clone(&mesh),
            },
        );
        Ok(mesh)
    }

    /// The last mesh cached for `coord`, without checking freshness.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<ChunkMesh>> {
        self.entries
            .lock()
            .get(&coord)
            .map(|entry| Arc::clone(&entry.mesh))
    }

    /// Drops the entry for `coord`. Returns true if one existed.
    pub fn invalidate(&self, coord: ChunkCoord) -> bool {
        self.entries.lock().remove(&coord).is_some()
    }

    /// Keeps only entries within `radius` of `center`; returns how many were
    /// dropped.
    pub fn retain_within(&self, center: ChunkCoord, radius: u32) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|coord, _| coord.within_radius(center, radius));
        let dropped = before - entries.len();
        if dropped > 0 {
            tracing::debug!(%center, radius, dropped, "pruned mesh cache");
        }
        dropped
    }

    /// Drops everything.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of cached meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> MeshCacheStats {
        MeshCacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelRegistry;
    use cubeworld_core::{Chunk, Direction, VoxelCatalog};

    fn extractor() -> FaceExtractor {
        let catalog = Arc::new(VoxelCatalog::standard());
        let models = Arc::new(ModelRegistry::standard(&catalog).unwrap());
        FaceExtractor::new(catalog, models)
    }

    #[test]
    fn test_hit_on_unchanged_content() {
        let ex = extractor();
        let stone = ex.catalog().require("cube_game:stone").unwrap();
        let chunk = Chunk::filled(ChunkCoord::new(0, 0, 0), stone);
        let cache = MeshCache::new();

        let first = cache.get_or_extract(&ex, &ChunkNeighborhood::new(&chunk)).unwrap();
        let second = cache.get_or_extract(&ex, &ChunkNeighborhood::new(&chunk)).unwrap();
        assert!(Arc::ptr_eq(&first, &second), "Second lookup should reuse the mesh");
        assert_eq!(cache.stats(), MeshCacheStats { entries: 1, hits: 1, misses: 1 });
    }

    #[test]
    fn test_content_change_rebuilds() {
        let ex = extractor();
        let stone = ex.catalog().require("cube_game:stone").unwrap();
        let mut chunk = Chunk::filled(ChunkCoord::new(0, 0, 0), stone);
        let cache = MeshCache::new();

        let before = cache.get_or_extract(&ex, &ChunkNeighborhood::new(&chunk)).unwrap();
        chunk.set_voxel(0, 0, 0, cubeworld_core::VoxelTypeId::AIR).unwrap();
        let after = cache.get_or_extract(&ex, &ChunkNeighborhood::new(&chunk)).unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.face_count(), before.face_count(), "Removing a corner keeps the count");
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_new_neighbour_rebuilds_border() {
        let ex = extractor();
        let stone = ex.catalog().require("cube_game:stone").unwrap();
        let center = Chunk::filled(ChunkCoord::new(0, 0, 0), stone);
        let above = Chunk::filled(ChunkCoord::new(0, 1, 0), stone);
        let cache = MeshCache::new();

        let alone = cache.get_or_extract(&ex, &ChunkNeighborhood::new(&center)).unwrap();
        let hood = ChunkNeighborhood::new(&center).with_neighbor(Direction::Up, &above);
        let covered = cache.get_or_extract(&ex, &hood).unwrap();

        assert_eq!(alone.face_count(), 1536);
        assert_eq!(covered.face_count(), 1536 - 256);
        assert_eq!(cache.len(), 1, "Same coordinate, one entry");
    }

    #[test]
    fn test_invalidate_and_retain() {
        let ex = extractor();
        let cache = MeshCache::new();
        let chunks: Vec<_> = (0..5).map(|x| Chunk::new(ChunkCoord::new(x, 0, 0))).collect();
        for chunk in &chunks {
            cache.get_or_extract(&ex, &ChunkNeighborhood::new(chunk)).unwrap();
        }
        assert_eq!(cache.len(), 5);

        assert!(cache.invalidate(ChunkCoord::new(4, 0, 0)));
        assert!(!cache.invalidate(ChunkCoord::new(4, 0, 0)));
        assert_eq!(cache.retain_within(ChunkCoord::new(0, 0, 0), 1), 2);
        assert!(cache.get(ChunkCoord::new(1, 0, 0)).is_some());
        assert!(cache.get(ChunkCoord::new(2, 0, 0)).is_none());
    }
}
