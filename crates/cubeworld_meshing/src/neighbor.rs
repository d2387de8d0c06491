//! # Neighbour Lookup
//!
//! Face culling at a chunk border needs the voxel on the other side. The
//! extractor asks through [`NeighborLookup`] so it never depends on how the
//! world stores its chunks.

use std::sync::Arc;

use cubeworld_core::{split_world_pos, Chunk, ContentId, Direction, VoxelTypeId};

/// World-space voxel query. Missing data reads as air.
pub trait NeighborLookup {
    /// Voxel at a world position.
    fn voxel_at(&self, world: [i32; 3]) -> VoxelTypeId;

    /// The whole loaded chunk next to the meshed one in `direction`, when
    /// the lookup has it at hand. Lets the extractor test chunks in bulk.
    fn face_neighbor(&self, _direction: Direction) -> Option<&Chunk> {
        None
    }
}

impl<F> NeighborLookup for F
where
    F: Fn([i32; 3]) -> VoxelTypeId,
{
    #[inline]
    fn voxel_at(&self, world: [i32; 3]) -> VoxelTypeId {
        self(world)
    }
}

/// A chunk and whichever of its six face neighbours are available.
#[derive(Clone, Copy, Debug)]
pub struct ChunkNeighborhood<'a> {
    center: &'a Chunk,
    neighbors: [Option<&'a Chunk>; 6],
}

impl<'a> ChunkNeighborhood<'a> {
    /// A chunk with no neighbours loaded.
    #[must_use]
    pub const fn new(center: &'a Chunk) -> Self {
        Self {
            center,
            neighbors: [None; 6],
        }
    }

    /// Borrows from shared chunks as handed out by the world manager.
    #[must_use]
    pub fn from_shared(center: &'a Arc<Chunk>, neighbors: &'a [Option<Arc<Chunk>>; 6]) -> Self {
        Self {
            center,
            neighbors: [0, 1, 2, 3, 4, 5].map(|i| neighbors[i].as_deref()),
        }
    }

    /// Sets the neighbour in `direction`.
    #[must_use]
    pub fn with_neighbor(mut self, direction: Direction, chunk: &'a Chunk) -> Self {
        self.neighbors[direction.index()] = Some(chunk);
        self
    }

    /// The chunk being meshed.
    #[inline]
    #[must_use]
    pub const fn center(&self) -> &'a Chunk {
        self.center
    }

    /// Neighbour in `direction`, if loaded.
    #[inline]
    #[must_use]
    pub const fn neighbor(&self, direction: Direction) -> Option<&'a Chunk> {
        self.neighbors[direction.index()]
    }

    /// Content identity of each neighbour (`None` where absent).
    #[must_use]
    pub fn neighbor_content_ids(&self) -> [Option<ContentId>; 6] {
        self.neighbors.map(|chunk| chunk.map(Chunk::content_id))
    }
}

impl NeighborLookup for ChunkNeighborhood<'_> {
    fn voxel_at(&self, world: [i32; 3]) -> VoxelTypeId {
        let (coord, local) = split_world_pos(world);
        let center = self.center.coord();
        if coord == center {
            return self.center.get_local(local);
        }
        Direction::ALL
            .iter()
            .find(|&&dir| center.neighbor(dir) == coord)
            .and_then(|&dir| self.neighbors[dir.index()])
            .map_or(VoxelTypeId::AIR, |chunk| chunk.get_local(local))
    }

    fn face_neighbor(&self, direction: Direction) -> Option<&Chunk> {
        self.neighbors[direction.index()]
    }
}
