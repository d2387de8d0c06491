//! # Core Error Types
//!
//! All errors that can occur while building catalogs or editing chunks.

use thiserror::Error;

use crate::coord::ChunkCoord;
use crate::voxel::VoxelTypeId;

/// Errors that can occur in the voxel data model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A chunk referenced more distinct voxel types than its palette can hold.
    #[error("palette overflow in chunk {coord}: capacity {capacity} distinct types")]
    PaletteOverflow {
        /// The chunk whose palette is full.
        coord: ChunkCoord,
        /// Maximum number of palette entries.
        capacity: usize,
    },

    /// A voxel type with the same `domain:name` key was already registered.
    #[error("duplicate voxel type: {0}")]
    DuplicateVoxelType(String),

    /// No voxel type is registered under the given key.
    #[error("unknown voxel type: {0}")]
    UnknownVoxelType(String),

    /// The catalog cannot address any more voxel types.
    #[error("voxel catalog full: capacity {capacity}")]
    CatalogFull {
        /// Maximum number of types a catalog can hold.
        capacity: usize,
    },

    /// A handle does not refer to any type in this catalog.
    #[error("invalid voxel type handle: {0}")]
    InvalidVoxelType(VoxelTypeId),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
