//! # CUBEWORLD Core
//!
//! The voxel data model shared by generation and meshing.
//!
//! ## Core Components
//!
//! - `VoxelCatalog`: immutable registry of voxel kinds, built once
//! - `ChunkCoord`: hashable, ordered chunk grid position
//! - `Direction`: the six face directions and their lookup table
//! - `Chunk`: 16³ palette-compressed voxel storage
//!
//! ## Example
//!
//! ```rust,ignore
//! use cubeworld_core::{Chunk, ChunkCoord, VoxelCatalog, VoxelTypeId};
//!
//! let catalog = VoxelCatalog::standard();
//! let stone = catalog.require("cube_game:stone")?;
//!
//! let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
//! chunk.set_voxel(1, 2, 3, stone)?;
//! assert_eq!(chunk.get_voxel(-1, 0, 0), VoxelTypeId::AIR);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod coord;
pub mod direction;
pub mod error;
pub mod palette;
pub mod voxel;

pub use chunk::{Chunk, ContentId};
pub use coord::{split_world_pos, ChunkCoord, CubeIter, CHUNK_SIZE, CHUNK_SIZE_I32, CHUNK_VOLUME};
pub use direction::{Direction, DirectionInfo, DIRECTION_TABLE};
pub use error::{CoreError, CoreResult};
pub use palette::{Palette, MAX_PALETTE_ENTRIES};
pub use voxel::{
    CatalogBuilder, VoxelCatalog, VoxelFlags, VoxelType, VoxelTypeId, DEFAULT_DOMAIN,
    MAX_VOXEL_TYPES,
};
