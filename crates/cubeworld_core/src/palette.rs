//! # Chunk Palette
//!
//! Per-chunk table mapping an 8-bit local index to a catalog handle.
//!
//! A chunk stores one byte per voxel instead of a full handle; the palette
//! resolves that byte. Index 0 is always air, so a fresh chunk of zeroed
//! indices is already valid.

use std::collections::HashMap;

use crate::voxel::VoxelTypeId;

/// Maximum distinct voxel types a single chunk can reference.
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Ordered local palette with reverse lookup for deduplication.
#[derive(Clone, Debug)]
pub struct Palette {
    entries: Vec<VoxelTypeId>,
    reverse: HashMap<VoxelTypeId, u8>,
}

impl Palette {
    /// Creates a palette holding only air at index 0.
    #[must_use]
    pub fn new() -> Self {
        let mut reverse = HashMap::new();
        reverse.insert(VoxelTypeId::AIR, 0);
        Self {
            entries: vec![VoxelTypeId::AIR],
            reverse,
        }
    }

    /// Creates a palette for a chunk filled with `id`, returning the local
    /// index every voxel should store.
    #[must_use]
    pub fn with_single(id: VoxelTypeId) -> (Self, u8) {
        let mut palette = Self::new();
        if id.is_air() {
            return (palette, 0);
        }
        palette.entries.push(id);
        palette.reverse.insert(id, 1);
        (palette, 1)
    }

    /// Returns the local index for `id`, adding it if needed.
    ///
    /// Returns `None` when the palette already holds
    /// [`MAX_PALETTE_ENTRIES`] other types.
    pub fn index_of_or_insert(&mut self, id: VoxelTypeId) -> Option<u8> {
        if let Some(&local) = self.reverse.get(&id) {
            return Some(local);
        }
        if self.entries.len() >= MAX_PALETTE_ENTRIES {
            return None;
        }

        let local = self.entries.len() as u8;
        self.entries.push(id);
        self.reverse.insert(id, local);
        Some(local)
    }

    /// Drops every entry whose local index is not marked in `in_use`, keeping
    /// air at 0 and the survivors in their old order. Returns the old to new
    /// index map; unmarked indices map to 0.
    pub fn compact(&mut self, in_use: &[bool; MAX_PALETTE_ENTRIES]) -> [u8; MAX_PALETTE_ENTRIES] {
        let mut remap = [0u8; MAX_PALETTE_ENTRIES];
        let mut kept = vec![VoxelTypeId::AIR];
        for (old, &id) in self.entries.iter().enumerate().skip(1) {
            if in_use[old] {
                remap[old] = kept.len() as u8;
                kept.push(id);
            }
        }

        self.reverse = kept
            .iter()
            .enumerate()
            .map(|(local, &id)| (id, local as u8))
            .collect();
        self.entries = kept;
        remap
    }

    /// Returns the local index for `id` without inserting.
    #[inline]
    #[must_use]
    pub fn index_of(&self, id: VoxelTypeId) -> Option<u8> {
        self.reverse.get(&id).copied()
    }

    /// Resolves a local index. Unused indices read as air.
    #[inline]
    #[must_use]
    pub fn get(&self, local: u8) -> VoxelTypeId {
        self.entries
            .get(usize::from(local))
            .copied()
            .unwrap_or(VoxelTypeId::AIR)
    }

    /// Entries in index order.
    #[must_use]
    pub fn entries(&self) -> &[VoxelTypeId] {
        &self.entries
    }

    /// Number of entries, air included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: air is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once no further type can be added.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_PALETTE_ENTRIES
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}
