//! # Terrain Generator
//!
//! Pure function from `(seed, chunk coordinate)` to a complete [`Chunk`].
//!
//! ## Height Field
//!
//! Each column height is the sum of:
//!
//! 1. a base elevation constant,
//! 2. a broad base undulation,
//! 3. a low-frequency relief octave sampled at a **domain-warped** position,
//!    where two independent noise fields push the sample point around; this
//!    gives ridges and valleys without grid-aligned artifacts,
//! 4. a high-frequency fractal detail octave.
//!
//! ## Column Fill
//!
//! ```text
//!   y >  h               air
//!   y == h               surface    (grass)
//!   h-K <= y < h         subsurface (dirt), K = subsurface_depth
//!   y <  h-K             deep       (stone)
//! ```
//!
//! Generators hold only immutable noise tables, so one instance can serve
//! every worker thread at once.

use std::time::Instant;

use cubeworld_core::{
    Chunk, ChunkCoord, VoxelCatalog, VoxelTypeId, CHUNK_SIZE, CHUNK_SIZE_I32, DEFAULT_DOMAIN,
};

use crate::config::TerrainParams;
use crate::error::ProcResult;
use crate::noise::{SimplexNoise, WorldSeed};

/// Sub-seed purposes, one per noise field.
const PURPOSE_BASE: u64 = 0;
const PURPOSE_RELIEF: u64 = 100;
const PURPOSE_DETAIL: u64 = 200;
const PURPOSE_WARP_X: u64 = 300;
const PURPOSE_WARP_Z: u64 = 400;

/// The three voxel types a column is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainPalette {
    /// Top voxel of each column.
    pub surface: VoxelTypeId,
    /// The layer just under the surface.
    pub subsurface: VoxelTypeId,
    /// Everything deeper.
    pub deep: VoxelTypeId,
}

impl TerrainPalette {
    /// Grass over dirt over stone, resolved from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ProcError::Core(UnknownVoxelType)` if the catalog lacks one
    /// of the three built-in types.
    pub fn standard(catalog: &VoxelCatalog) -> ProcResult<Self> {
        Ok(Self {
            surface: catalog.require(&format!("{DEFAULT_DOMAIN}:grass"))?,
            subsurface: catalog.require(&format!("{DEFAULT_DOMAIN}:dirt"))?,
            deep: catalog.require(&format!("{DEFAULT_DOMAIN}:stone"))?,
        })
    }
}

/// Deterministic chunk generator.
pub struct TerrainGenerator {
    seed: WorldSeed,
    params: TerrainParams,
    palette: TerrainPalette,
    base: SimplexNoise,
    relief: SimplexNoise,
    detail: SimplexNoise,
    warp_x: SimplexNoise,
    warp_z: SimplexNoise,
}

impl TerrainGenerator {
    /// Creates a generator using the standard grass/dirt/stone palette.
    ///
    /// # Errors
    ///
    /// Fails if the parameters are invalid or the catalog lacks a built-in
    /// type.
    pub fn new(seed: WorldSeed, catalog: &VoxelCatalog, params: TerrainParams) -> ProcResult<Self> {
        Self::with_palette(seed, TerrainPalette::standard(catalog)?, params)
    }

    /// Creates a generator with an explicit palette.
    ///
    /// # Errors
    ///
    /// Returns `ProcError::InvalidConfig` if the parameters are invalid.
    pub fn with_palette(
        seed: WorldSeed,
        palette: TerrainPalette,
        params: TerrainParams,
    ) -> ProcResult<Self> {
        params.validate()?;
        Ok(Self {
            seed,
            params,
            palette,
            base: SimplexNoise::new(seed.derive(PURPOSE_BASE)),
            relief: SimplexNoise::new(seed.derive(PURPOSE_RELIEF)),
            detail: SimplexNoise::new(seed.derive(PURPOSE_DETAIL)),
            warp_x: SimplexNoise::new(seed.derive(PURPOSE_WARP_X)),
            warp_z: SimplexNoise::new(seed.derive(PURPOSE_WARP_Z)),
        })
    }

    /// The seed this generator was built from.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// The column palette.
    #[must_use]
    pub const fn palette(&self) -> TerrainPalette {
        self.palette
    }

    /// Surface height of the world column at `(world_x, world_z)`.
    #[must_use]
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let p = &self.params;
        let x = f64::from(world_x) / p.horizontal_scale;
        let z = f64::from(world_z) / p.horizontal_scale;

        // Two independent fields displace the relief sample point.
        let warp_x = self.warp_x.sample(x / p.warp_scale, z / p.warp_scale) * p.warp_amplitude;
        let warp_z = self.warp_z.sample(z / p.warp_scale, x / p.warp_scale) * p.warp_amplitude;

        let base = self.base.sample(x, z) * p.base_amplitude;
        let relief = self
            .relief
            .sample((x + warp_x) / p.relief_scale, (z + warp_z) / p.relief_scale)
            * p.relief_amplitude;
        let detail = self
            .detail
            .fractal(x * p.detail_frequency, z * p.detail_frequency, p.detail_octaves)
            * p.detail_amplitude;

        let height = (p.base_elevation + base + relief + detail).floor();
        (height as i32).max(0)
    }

    /// Voxel type at world height `world_y` in a column of height `height`.
    #[inline]
    #[must_use]
    pub fn voxel_for(&self, world_y: i32, height: i32) -> VoxelTypeId {
        let depth = self.params.subsurface_depth as i32;
        if world_y > height {
            VoxelTypeId::AIR
        } else if world_y == height {
            self.palette.surface
        } else if world_y >= height - depth {
            self.palette.subsurface
        } else {
            self.palette.deep
        }
    }

    /// Generates the chunk at `coord`.
    ///
    /// # Errors
    ///
    /// Propagates palette errors from the chunk; with three column types this
    /// cannot overflow, but custom palettes go through the same path.
    pub fn generate(&self, coord: ChunkCoord) -> ProcResult<Chunk> {
        let start = Instant::now();
        let [origin_x, origin_y, origin_z] = coord.origin();

        let mut heights = [[0i32; CHUNK_SIZE]; CHUNK_SIZE];
        for (lz, row) in heights.iter_mut().enumerate() {
            for (lx, height) in row.iter_mut().enumerate() {
                *height = self.surface_height(origin_x + lx as i32, origin_z + lz as i32);
            }
        }

        let (min_height, max_height) = heights
            .iter()
            .flatten()
            .fold((i32::MAX, i32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        let top = origin_y + CHUNK_SIZE_I32 - 1;
        let depth = self.params.subsurface_depth as i32;

        // Whole chunk above every column: nothing to write.
        if origin_y > max_height {
            return Ok(Chunk::new(coord));
        }
        // Whole chunk inside the deep layer of every column.
        if top < min_height - depth {
            return Ok(Chunk::filled(coord, self.palette.deep));
        }

        let mut chunk = Chunk::new(coord);
        for (lz, row) in heights.iter().enumerate() {
            for (lx, &height) in row.iter().enumerate() {
                for ly in 0..CHUNK_SIZE {
                    let id = self.voxel_for(origin_y + ly as i32, height);
                    if !id.is_air() {
                        chunk.set_local([lx, ly, lz], id)?;
                    }
                }
            }
        }

        tracing::trace!(
            %coord,
            micros = start.elapsed().as_micros() as u64,
            "chunk generated"
        );
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> TerrainGenerator {
        let catalog = VoxelCatalog::standard();
        TerrainGenerator::new(WorldSeed::new(seed), &catalog, TerrainParams::default()).unwrap()
    }

    #[test]
    fn test_generation_determinism() {
        let gen1 = generator(42);
        let gen2 = generator(42);

        let coord = ChunkCoord::new(5, 3, 10);
        let chunk1 = gen1.generate(coord).unwrap();
        let chunk2 = gen2.generate(coord).unwrap();

        assert_eq!(chunk1.content_id(), chunk2.content_id());
        for (a, b) in chunk1.iter_voxels().zip(chunk2.iter_voxels()) {
            assert_eq!(a, b, "Mismatch at {:?}", a.0);
        }
    }

    #[test]
    fn test_column_layers() {
        let gen = generator(7);
        let palette = gen.palette();
        let h = 60;

        assert_eq!(gen.voxel_for(61, h), VoxelTypeId::AIR);
        assert_eq!(gen.voxel_for(60, h), palette.surface);
        assert_eq!(gen.voxel_for(59, h), palette.subsurface);
        assert_eq!(gen.voxel_for(57, h), palette.subsurface);
        assert_eq!(gen.voxel_for(56, h), palette.deep);
        assert_eq!(gen.voxel_for(-100, h), palette.deep);
    }

    #[test]
    fn test_heights_are_plausible() {
        let gen = generator(42);
        for i in 0..200 {
            let h = gen.surface_height(i * 37 - 3000, i * 53 - 5000);
            assert!((0..200).contains(&h), "Height {h} out of plausible range");
        }
    }

    #[test]
    fn test_chunk_matches_height_field() {
        let gen = generator(42);
        let column_height = gen.surface_height(0, 0);
        let coord = ChunkCoord::from_world_pos(0, column_height, 0);
        let chunk = gen.generate(coord).unwrap();

        let local_y = column_height.rem_euclid(CHUNK_SIZE_I32);
        assert_eq!(chunk.get_voxel(0, local_y, 0), gen.palette().surface);
        if local_y + 1 < CHUNK_SIZE_I32 {
            assert_eq!(chunk.get_voxel(0, local_y + 1, 0), VoxelTypeId::AIR);
        }
    }

    #[test]
    fn test_sky_and_bedrock_shortcuts() {
        let gen = generator(42);

        let sky = gen.generate(ChunkCoord::new(0, 100, 0)).unwrap();
        assert!(sky.is_empty(), "Chunks far above terrain are empty");

        let deep = gen.generate(ChunkCoord::new(0, -10, 0)).unwrap();
        assert!(deep.is_fully_opaque(&VoxelCatalog::standard()));
        assert_eq!(deep.get_voxel(8, 8, 8), gen.palette().deep);
    }
}
