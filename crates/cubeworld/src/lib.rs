//! # CUBEWORLD
//!
//! A streamed voxel world: deterministic terrain generated on a worker pool
//! around a moving focal point, with cached, material-batched face meshes
//! for the renderer.
//!
//! ## Crates
//!
//! - `cubeworld_core`: catalog, coordinates, palette-compressed chunks
//! - `cubeworld_procedural`: noise, terrain, `WorldManager`
//! - `cubeworld_meshing`: models, `FaceExtractor`, `MeshCache`
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cubeworld::{VoxelCatalog, WorldConfig, WorldSession};
//!
//! let session = WorldSession::new(WorldConfig::production(), Arc::new(VoxelCatalog::standard()))?;
//! loop {
//!     let player = [12.5, 70.0, -3.0];
//!     session.tick(player)?;
//!     for (coord, mesh) in session.visible_meshes(player)? {
//!         // upload mesh.to_buffers() once per material
//!     }
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::WorldSession;

pub use cubeworld_core::{Chunk, ChunkCoord, Direction, VoxelCatalog, VoxelType, VoxelTypeId};
pub use cubeworld_meshing::{ChunkMesh, FaceExtractor, MaterialKey, ModelRegistry, Quad, QuadVertex};
pub use cubeworld_procedural::{TerrainGenerator, WorldConfig, WorldManager, WorldSeed};
