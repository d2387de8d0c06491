//! # Meshing Error Types

use cubeworld_core::{CoreError, VoxelTypeId};
use thiserror::Error;

/// Errors raised while building models or extracting faces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An element box is empty or leaves the 16-unit voxel cell.
    #[error("malformed model element: from {from:?} to {to:?}")]
    MalformedElement {
        /// Minimum corner in 1/16 voxel units.
        from: [u8; 3],
        /// Maximum corner in 1/16 voxel units.
        to: [u8; 3],
    },

    /// A solid voxel type has no model registered.
    #[error("no model registered for voxel type {0}")]
    MissingModel(VoxelTypeId),

    /// A chunk references a type the catalog does not know.
    #[error("voxel type {0} is not in the catalog")]
    UnknownVoxelType(VoxelTypeId),

    /// A model was built with more textures than fit in a [`crate::TextureId`].
    #[error("texture table full, cannot add {0}")]
    TextureTableFull(String),

    /// Error from the voxel data model.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for meshing operations.
pub type MeshResult<T> = Result<T, MeshError>;
