//! # Chunk Storage
//!
//! A chunk is a 16x16x16 cube of voxels stored as one byte per voxel plus a
//! [`Palette`] resolving those bytes to catalog handles.
//!
//! ## Access Rules
//!
//! - Reads outside `0..16` on any axis return [`VoxelTypeId::AIR`]. Border
//!   logic can probe one step past the edge without special cases.
//! - Writes outside the chunk are ignored.
//! - When a write needs a new palette entry and the palette is full, entries
//!   no voxel refers to any more are dropped first. Only if all 256 are
//!   still referenced does the write fail with
//!   [`CoreError::PaletteOverflow`], leaving the chunk unchanged.
//!
//! ## Content Identity
//!
//! Every chunk carries a [`ContentId`]: an XOR of one hash per non-air voxel
//! keyed by position and type. Each write updates it in O(1). Equal content
//! always has an equal id, whatever the palette order, so caches can key on it.

use std::fmt;

use crate::coord::{ChunkCoord, CHUNK_SIZE, CHUNK_VOLUME};
use crate::error::{CoreError, CoreResult};
use crate::palette::{Palette, MAX_PALETTE_ENTRIES};
use crate::voxel::{VoxelCatalog, VoxelTypeId};

/// Identity of a chunk's voxel content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentId(u64);

impl ContentId {
    /// Identity of a chunk holding only air.
    pub const EMPTY: Self = Self(0);

    /// Returns the raw hash.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Hash contribution of one voxel. Air contributes nothing.
#[inline]
const fn voxel_hash(index: usize, id: VoxelTypeId) -> u64 {
    if id.is_air() {
        return 0;
    }
    // splitmix64 finalizer
    let mut z = ((index as u64) << 16 | id.raw() as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Flat index of an in-range local position (y-major, then z, then x).
#[inline]
const fn flat_index(x: usize, y: usize, z: usize) -> usize {
    (y * CHUNK_SIZE + z) * CHUNK_SIZE + x
}

#[inline]
fn local_from_signed(x: i32, y: i32, z: i32) -> Option<[usize; 3]> {
    let size = CHUNK_SIZE as i32;
    if (0..size).contains(&x) && (0..size).contains(&y) && (0..size).contains(&z) {
        Some([x as usize, y as usize, z as usize])
    } else {
        None
    }
}

/// A 16³ block of voxels.
#[derive(Clone)]
pub struct Chunk {
    coord: ChunkCoord,
    palette: Palette,
    indices: Box<[u8]>,
    content: ContentId,
}

impl Chunk {
    /// Creates an all-air chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            palette: Palette::new(),
            indices: vec![0u8; CHUNK_VOLUME].into_boxed_slice(),
            content: ContentId::EMPTY,
        }
    }

    /// Creates a chunk where every voxel is `id`.
    #[must_use]
    pub fn filled(coord: ChunkCoord, id: VoxelTypeId) -> Self {
        let (palette, local) = Palette::with_single(id);
        let content = (0..CHUNK_VOLUME).fold(0u64, |acc, index| acc ^ voxel_hash(index, id));
        Self {
            coord,
            palette,
            indices: vec![local; CHUNK_VOLUME].into_boxed_slice(),
            content: ContentId(content),
        }
    }

    /// Position of this chunk in the grid.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Voxel at a local position, or air if the position is outside.
    #[inline]
    #[must_use]
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> VoxelTypeId {
        match local_from_signed(x, y, z) {
            Some([x, y, z]) => self.palette.get(self.indices[flat_index(x, y, z)]),
            None => VoxelTypeId::AIR,
        }
    }

    /// Voxel at an unsigned local position, or air if it is outside.
    #[inline]
    #[must_use]
    pub fn get_local(&self, local: [usize; 3]) -> VoxelTypeId {
        let [x, y, z] = local;
        if x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE {
            self.palette.get(self.indices[flat_index(x, y, z)])
        } else {
            VoxelTypeId::AIR
        }
    }

    /// Stores `id` at a local position. Positions outside are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PaletteOverflow`] if `id` would be the 257th
    /// distinct type currently present in this chunk. Types that were
    /// written once and later overwritten everywhere do not count.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, id: VoxelTypeId) -> CoreResult<()> {
        let Some([x, y, z]) = local_from_signed(x, y, z) else {
            return Ok(());
        };
        self.set_local_unchecked(flat_index(x, y, z), id)
    }

    /// Stores `id` at an unsigned local position. Positions outside are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PaletteOverflow`] on palette exhaustion.
    pub fn set_local(&mut self, local: [usize; 3], id: VoxelTypeId) -> CoreResult<()> {
        let [x, y, z] = local;
        if x >= CHUNK_SIZE || y >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return Ok(());
        }
        self.set_local_unchecked(flat_index(x, y, z), id)
    }

    fn set_local_unchecked(&mut self, index: usize, id: VoxelTypeId) -> CoreResult<()> {
        let local = match self.palette.index_of_or_insert(id) {
            Some(local) => local,
            None => {
                self.compact_palette();
                self.palette
                    .index_of_or_insert(id)
                    .ok_or(CoreError::PaletteOverflow {
                        coord: self.coord,
                        capacity: MAX_PALETTE_ENTRIES,
                    })?
            }
        };

        let previous = self.palette.get(self.indices[index]);
        if previous != id {
            self.content = ContentId(
                self.content.0 ^ voxel_hash(index, previous) ^ voxel_hash(index, id),
            );
            self.indices[index] = local;
        }
        Ok(())
    }

    /// Drops palette entries that no voxel refers to and returns how many
    /// were dropped. Voxel content and [`ContentId`] are unchanged.
    pub fn compact_palette(&mut self) -> usize {
        let mut in_use = [false; MAX_PALETTE_ENTRIES];
        for &local in self.indices.iter() {
            in_use[usize::from(local)] = true;
        }

        let before = self.palette.len();
        let remap = self.palette.compact(&in_use);
        let dropped = before - self.palette.len();
        if dropped > 0 {
            for local in self.indices.iter_mut() {
                *local = remap[usize::from(*local)];
            }
        }
        dropped
    }

    /// Fills a whole horizontal layer (local `y`) with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PaletteOverflow`] on palette exhaustion.
    pub fn fill_layer(&mut self, y: usize, id: VoxelTypeId) -> CoreResult<()> {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                self.set_local([x, y, z], id)?;
            }
        }
        Ok(())
    }

    /// True if every voxel is air.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Palette index 0 is the only index that resolves to air.
        self.indices.iter().all(|&local| local == 0)
    }

    /// True if no voxel is air and every voxel hides faces behind it.
    #[must_use]
    pub fn is_fully_opaque(&self, catalog: &VoxelCatalog) -> bool {
        let opaque: Vec<bool> = self
            .palette
            .entries()
            .iter()
            .map(|&id| catalog.is_opaque(id))
            .collect();
        self.indices
            .iter()
            .all(|&local| opaque.get(usize::from(local)).copied().unwrap_or(false))
    }

    /// Number of voxels that are not air.
    #[must_use]
    pub fn non_air_count(&self) -> usize {
        self.indices.iter().filter(|&&local| local != 0).count()
    }

    /// Content identity, updated on every write.
    #[inline]
    #[must_use]
    pub const fn content_id(&self) -> ContentId {
        self.content
    }

    /// The local palette.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of palette entries in use, air included.
    #[must_use]
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    /// Raw palette indices, y-major then z then x.
    ///
    /// Together with [`Chunk::palette`] this is the complete chunk content.
    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Iterates over every voxel as `(local position, handle)`.
    pub fn iter_voxels(&self) -> impl Iterator<Item = ([usize; 3], VoxelTypeId)> + '_ {
        self.indices.iter().enumerate().map(|(index, &local)| {
            let x = index % CHUNK_SIZE;
            let z = (index / CHUNK_SIZE) % CHUNK_SIZE;
            let y = index / (CHUNK_SIZE * CHUNK_SIZE);
            ([x, y, z], self.palette.get(local))
        })
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("palette_len", &self.palette.len())
            .field("non_air", &self.non_air_count())
            .field("content", &self.content)
            .finish()
    }
}

impl PartialEq for Chunk {
    /// Equal coordinate and equal voxel content, whatever the palette order.
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
            && self.content == other.content
            && self.iter_voxels().zip(other.iter_voxels()).all(|(a, b)| a == b)
    }
}

impl Eq for Chunk {}
