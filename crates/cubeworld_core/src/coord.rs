//! # Chunk Coordinates
//!
//! One hashable, totally ordered 3-integer record identifies every chunk.
//! World positions map to chunks with Euclidean division so negative
//! coordinates land in the right chunk (`-1` is in chunk `-1`, not `0`).

use std::fmt;

use crate::direction::Direction;

/// Chunk side length in voxels.
pub const CHUNK_SIZE: usize = 16;

/// [`CHUNK_SIZE`] as a signed integer.
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// Voxels per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Position of a chunk in the chunk grid.
///
/// The derived `Ord` is lexicographic on `(x, y, z)`, which gives sorted
/// collections a deterministic iteration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not voxels).
    pub x: i32,
    /// Y coordinate (in chunks, not voxels).
    pub y: i32,
    /// Z coordinate (in chunks, not voxels).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing the given world voxel.
    #[inline]
    #[must_use]
    pub const fn from_world_pos(world_x: i32, world_y: i32, world_z: i32) -> Self {
        Self {
            x: world_x.div_euclid(CHUNK_SIZE_I32),
            y: world_y.div_euclid(CHUNK_SIZE_I32),
            z: world_z.div_euclid(CHUNK_SIZE_I32),
        }
    }

    /// Chunk containing a fractional world position (e.g. the player).
    #[must_use]
    pub fn containing(focal: [f64; 3]) -> Self {
        let [x, y, z] = focal.map(|v| v.floor() as i32);
        Self::from_world_pos(x, y, z)
    }

    /// World position of the chunk's minimum corner.
    #[inline]
    #[must_use]
    pub const fn origin(self) -> [i32; 3] {
        [
            self.x * CHUNK_SIZE_I32,
            self.y * CHUNK_SIZE_I32,
            self.z * CHUNK_SIZE_I32,
        ]
    }

    /// Returns this coordinate shifted by the given amount.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// The face-adjacent chunk in `direction`.
    #[inline]
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Self {
        let [dx, dy, dz] = direction.offset();
        self.offset(dx, dy, dz)
    }

    /// Largest per-axis distance (Chebyshev metric).
    #[inline]
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        let xy = if dx > dy { dx } else { dy };
        if xy > dz {
            xy
        } else {
            dz
        }
    }

    /// Squared Euclidean distance, used for near-to-far ordering.
    #[inline]
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        let dz = self.z.abs_diff(other.z) as u64;
        dx * dx + dy * dy + dz * dz
    }

    /// True if no axis differs from `center` by more than `radius`.
    #[inline]
    #[must_use]
    pub const fn within_radius(self, center: Self, radius: u32) -> bool {
        self.chebyshev_distance(center) <= radius
    }

    /// All coordinates of the `(2r+1)³` cube around `center`.
    #[must_use]
    pub fn cube_around(center: Self, radius: u32) -> CubeIter {
        CubeIter::new(center, radius)
    }

    /// The `(2r+1)³` cube around `center`, nearest first.
    ///
    /// Ties are broken by coordinate order so the result is deterministic.
    #[must_use]
    pub fn sorted_near_to_far(center: Self, radius: u32) -> Vec<Self> {
        let mut coords: Vec<Self> = Self::cube_around(center, radius).collect();
        coords.sort_by_key(|coord| (coord.distance_squared(center), *coord));
        coords
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Splits a world voxel position into its chunk and local position.
#[inline]
#[must_use]
pub const fn split_world_pos(world: [i32; 3]) -> (ChunkCoord, [usize; 3]) {
    let chunk = ChunkCoord::from_world_pos(world[0], world[1], world[2]);
    let local = [
        world[0].rem_euclid(CHUNK_SIZE_I32) as usize,
        world[1].rem_euclid(CHUNK_SIZE_I32) as usize,
        world[2].rem_euclid(CHUNK_SIZE_I32) as usize,
    ];
    (chunk, local)
}

/// Iterator over a cube of chunk coordinates, x-major then y then z.
#[derive(Clone, Debug)]
pub struct CubeIter {
    min: ChunkCoord,
    side: u64,
    next: u64,
    total: u64,
}

impl CubeIter {
    fn new(center: ChunkCoord, radius: u32) -> Self {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let side = 2 * u64::from(radius) + 1;
        Self {
            min: center.offset(-r, -r, -r),
            side,
            next: 0,
            total: side * side * side,
        }
    }
}

impl Iterator for CubeIter {
    type Item = ChunkCoord;

    fn next(&mut self) -> Option<ChunkCoord> {
        if self.next >= self.total {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let dz = index % self.side;
        let dy = (index / self.side) % self.side;
        let dx = index / (self.side * self.side);
        Some(self.min.offset(dx as i32, dy as i32, dz as i32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CubeIter {}
