//! # Chunk Meshes
//!
//! Extraction output: the visible quads of one chunk grouped by material, so
//! a renderer issues one batch per material instead of one per face.

use std::collections::BTreeMap;

use cubeworld_core::{ChunkCoord, VoxelTypeId};

use crate::model::TextureId;
use crate::quad::{quad_buffers, Quad, QuadVertex};

/// Batching key: voxel type plus face texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialKey {
    /// Voxel type the faces belong to.
    pub voxel: VoxelTypeId,
    /// Texture drawn on the faces.
    pub texture: TextureId,
}

/// Material-grouped faces of one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    coord: ChunkCoord,
    batches: BTreeMap<MaterialKey, Vec<Quad>>,
    face_count: usize,
    culled_voxels: usize,
}

impl ChunkMesh {
    /// A mesh with no faces.
    #[must_use]
    pub fn empty(coord: ChunkCoord) -> Self {
        Self {
            coord,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, key: MaterialKey, quad: Quad) {
        self.batches.entry(key).or_default().push(quad);
        self.face_count += 1;
    }

    pub(crate) fn note_culled_voxels(&mut self, voxels: usize) {
        self.culled_voxels += voxels;
    }

    /// Chunk this mesh was extracted from.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Total faces across all batches.
    #[inline]
    #[must_use]
    pub const fn face_count(&self) -> usize {
        self.face_count
    }

    /// Solid voxels skipped because every neighbour was opaque.
    #[inline]
    #[must_use]
    pub const fn culled_voxels(&self) -> usize {
        self.culled_voxels
    }

    /// Number of distinct materials.
    #[inline]
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// True if nothing is visible.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.face_count == 0
    }

    /// Batches in material order.
    pub fn batches(&self) -> impl Iterator<Item = (MaterialKey, &[Quad])> + '_ {
        self.batches.iter().map(|(key, quads)| (*key, quads.as_slice()))
    }

    /// Faces of one material.
    #[must_use]
    pub fn batch(&self, key: MaterialKey) -> Option<&[Quad]> {
        self.batches.get(&key).map(Vec::as_slice)
    }

    /// Vertex and index buffers per material, ready for upload.
    #[must_use]
    pub fn to_buffers(&self) -> Vec<(MaterialKey, Vec<QuadVertex>, Vec<u32>)> {
        self.batches
            .iter()
            .map(|(key, quads)| {
                let (vertices, indices) = quad_buffers(quads);
                (*key, vertices, indices)
            })
            .collect()
    }
}
