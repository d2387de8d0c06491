//! # CUBEWORLD Meshing
//!
//! Face extraction for voxel chunks.
//!
//! ## Pipeline
//!
//! ```text
//! Chunk + neighbours ──> FaceExtractor ──> ChunkMesh ──> renderer
//!                             │               (quads grouped by material)
//!                       VoxelCatalog (opacity)
//!                       ModelRegistry (shapes, textures)
//! ```
//!
//! ## Core Components
//!
//! - `ModelRegistry`: box-element models and interned textures
//! - `NeighborLookup`: voxel queries across chunk borders
//! - `FaceExtractor`: transparency-aware culling and batching
//! - `MeshCache`: per-chunk cache keyed by content identity
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cubeworld_meshing::{ChunkNeighborhood, FaceExtractor, ModelRegistry};
//!
//! let catalog = Arc::new(VoxelCatalog::standard());
//! let models = Arc::new(ModelRegistry::standard(&catalog)?);
//! let extractor = FaceExtractor::new(catalog, models);
//!
//! let mesh = extractor.extract(&chunk, &ChunkNeighborhood::new(&chunk))?;
//! for (material, quads) in mesh.batches() {
//!     // one draw call per material
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod error;
pub mod extractor;
pub mod mesh;
pub mod model;
pub mod neighbor;
pub mod quad;

pub use cache::{MeshCache, MeshCacheStats, MeshKey};
pub use error::{MeshError, MeshResult};
pub use extractor::FaceExtractor;
pub use mesh::{ChunkMesh, MaterialKey};
pub use model::{ModelElement, ModelRegistry, TextureId, VoxelModel, ELEMENT_UNITS};
pub use neighbor::{ChunkNeighborhood, NeighborLookup};
pub use quad::{quad_buffers, Quad, QuadVertex, QUAD_INDICES};
