//! # World Session
//!
//! Per-tick orchestration for a client:
//!
//! ```text
//! tick(focal)            -> WorldManager::update (request + periodic eviction)
//!                           prune mesh cache on eviction
//! visible_meshes(focal)  -> ready chunks in view, near to far
//!                           -> MeshCache::get_or_extract (with neighbours)
//! voxel_at(pos)          -> collision
//! ```
//!
//! Nothing here blocks on generation. A chunk that is not ready is simply
//! missing from this frame's mesh list.

use std::path::Path;
use std::sync::Arc;

use cubeworld_core::{ChunkCoord, VoxelCatalog, VoxelTypeId};
use cubeworld_meshing::{ChunkMesh, ChunkNeighborhood, FaceExtractor, MeshCache, MeshCacheStats, ModelRegistry};
use cubeworld_procedural::{UpdateReport, WorldConfig, WorldManager, WorldStats};

use crate::error::SessionResult;

/// A streamed, meshed world around one focal point.
pub struct WorldSession {
    catalog: Arc<VoxelCatalog>,
    manager: WorldManager,
    extractor: FaceExtractor,
    meshes: MeshCache,
}

impl WorldSession {
    /// Starts a session with the standard model for every solid type.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, a catalog without the terrain types,
    /// or a worker that cannot be spawned.
    pub fn new(config: WorldConfig, catalog: Arc<VoxelCatalog>) -> SessionResult<Self> {
        let models = Arc::new(ModelRegistry::standard(&catalog)?);
        Self::with_models(config, catalog, models)
    }

    /// Starts a session with custom models.
    ///
    /// # Errors
    ///
    /// As [`WorldSession::new`].
    pub fn with_models(
        config: WorldConfig,
        catalog: Arc<VoxelCatalog>,
        models: Arc<ModelRegistry>,
    ) -> SessionResult<Self> {
        let manager = WorldManager::new(config, &catalog)?;
        let extractor = FaceExtractor::new(Arc::clone(&catalog), models);
        tracing::info!(voxel_types = catalog.len(), "world session started");
        Ok(Self {
            catalog,
            manager,
            extractor,
            meshes: MeshCache::new(),
        })
    }

    /// Starts a session from a TOML config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, otherwise as
    /// [`WorldSession::new`].
    pub fn from_config_file(path: impl AsRef<Path>, catalog: Arc<VoxelCatalog>) -> SessionResult<Self> {
        Self::new(WorldConfig::load(path)?, catalog)
    }

    /// Advances streaming for a focal point. Call once per update tick.
    ///
    /// # Errors
    ///
    /// Fails after [`WorldSession::shutdown`].
    pub fn tick(&self, focal: [f64; 3]) -> SessionResult<UpdateReport> {
        let report = self.manager.update(focal)?;
        if report.evicted.is_some() {
            self.meshes
                .retain_within(report.center, self.manager.config().load_radius);
        }
        Ok(report)
    }

    /// Meshes of the ready, non-empty chunks in view of `focal`, nearest
    /// first. Cached meshes are reused until the chunk or a neighbour
    /// changes.
    ///
    /// # Errors
    ///
    /// Propagates extraction errors.
    pub fn visible_meshes(&self, focal: [f64; 3]) -> SessionResult<Vec<(ChunkCoord, Arc<ChunkMesh>)>> {
        let center = ChunkCoord::containing(focal);
        let radius = self.manager.config().visibility_radius;

        let mut visible = Vec::new();
        for coord in WorldManager::coords_for_visibility(center, radius) {
            let Some((chunk, neighbors)) = self.manager.neighborhood(coord) else {
                continue;
            };
            if chunk.is_empty() {
                continue;
            }
            let hood = ChunkNeighborhood::from_shared(&chunk, &neighbors);
            let mesh = self.meshes.get_or_extract(&self.extractor, &hood)?;
            if !mesh.is_empty() {
                visible.push((coord, mesh));
            }
        }
        Ok(visible)
    }

    /// Voxel at a world position, or `None` while its chunk is not ready.
    #[must_use]
    pub fn voxel_at(&self, world: [i32; 3]) -> Option<VoxelTypeId> {
        self.manager.voxel_at(world)
    }

    /// True if the voxel at `world` is loaded and solid.
    #[must_use]
    pub fn is_solid_at(&self, world: [i32; 3]) -> bool {
        self.voxel_at(world)
            .is_some_and(|id| self.catalog.is_solid(id))
    }

    /// The voxel catalog.
    #[must_use]
    pub fn catalog(&self) -> &VoxelCatalog {
        &self.catalog
    }

    /// The chunk manager.
    #[must_use]
    pub fn manager(&self) -> &WorldManager {
        &self.manager
    }

    /// Streaming statistics.
    #[must_use]
    pub fn world_stats(&self) -> WorldStats {
        self.manager.stats()
    }

    /// Mesh cache statistics.
    #[must_use]
    pub fn mesh_stats(&self) -> MeshCacheStats {
        self.meshes.stats()
    }

    /// Stops generation and drops cached meshes. Idempotent.
    pub fn shutdown(&self) {
        self.manager.shutdown();
        self.meshes.clear();
        tracing::info!("world session shut down");
    }
}
