//! # Simplex Noise
//!
//! Seeded 2D coherent noise for the terrain height field.
//!
//! ## Determinism Guarantee
//!
//! The lattice hash is a permutation of `0..=255` shuffled by a ChaCha8
//! stream seeded from a [`WorldSeed`]. ChaCha output is specified bit for
//! bit, so the same seed gives the same field on every platform and run.
//! Sampling only reads the table; one instance serves all workers.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Root of all procedural randomness in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Wraps a raw seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// The raw seed.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Independent sub-seed for one noise field. Different `purpose` values
    /// give uncorrelated streams.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // splitmix64 finalizer over seed + purpose.
        let mut z = self.0 ^ purpose.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self(z ^ (z >> 31))
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x00C0_FFEE_CAFE_D00D)
    }
}

/// 2D simplex noise with values in `[-1, 1]`.
///
/// ```rust,ignore
/// let relief = SimplexNoise::new(WorldSeed::new(7).derive(1));
/// let h = relief.sample(12.5, -3.25);
/// ```
pub struct SimplexNoise {
    /// Shuffled `0..=255`, repeated once so `perm[a + perm[b]]` never wraps.
    perm: [u8; 512],
}

impl SimplexNoise {
    /// `(sqrt(3) - 1) / 2`: input space to simplex lattice.
    const SKEW: f64 = 0.366_025_403_784_438_6;
    /// `(3 - sqrt(3)) / 6`: simplex lattice back to input space.
    const UNSKEW: f64 = 0.211_324_865_405_187_1;
    /// Brings the summed corner contributions to `[-1, 1]`.
    const SCALE: f64 = 70.0;

    /// Builds the lattice hash for `seed`.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        let mut shuffled: Vec<u8> = (0..=u8::MAX).collect();
        shuffled.shuffle(&mut ChaCha8Rng::seed_from_u64(seed.value()));

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&shuffled);
        perm[256..].copy_from_slice(&shuffled);
        Self { perm }
    }

    #[inline]
    fn hash(&self, i: usize, j: usize) -> u8 {
        self.perm[i + usize::from(self.perm[j])]
    }

    /// Noise value at `(x, y)`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * Self::SKEW;
        let cell_i = (x + s).floor();
        let cell_j = (y + s).floor();
        let t = (cell_i + cell_j) * Self::UNSKEW;
        let dx = x - (cell_i - t);
        let dy = y - (cell_j - t);

        // The middle corner depends on which half of the rhombus we are in.
        let (mid_i, mid_j) = if dx > dy { (1, 0) } else { (0, 1) };
        let corners = [(0, 0), (mid_i, mid_j), (1, 1)];

        let base_i = (cell_i as i64 & 0xFF) as usize;
        let base_j = (cell_j as i64 & 0xFF) as usize;

        let total: f64 = corners
            .iter()
            .map(|&(ci, cj)| {
                let offset = (ci + cj) as f64 * Self::UNSKEW;
                let cx = dx - ci as f64 + offset;
                let cy = dy - cj as f64 + offset;
                let falloff = 0.5 - cx * cx - cy * cy;
                if falloff <= 0.0 {
                    return 0.0;
                }
                let (gx, gy) = gradient(self.hash(base_i + ci, base_j + cj));
                falloff.powi(4) * (gx * cx + gy * cy)
            })
            .sum();

        (Self::SCALE * total).clamp(-1.0, 1.0)
    }

    /// Fractal sum of `octaves` layers, each at double the frequency and
    /// half the weight of the one before, renormalised to `[-1, 1]`.
    /// Zero octaves behaves like one.
    #[must_use]
    pub fn fractal(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let layers = octaves.max(1);
        let (sum, weight) = (0..layers).fold((0.0, 0.0), |(sum, weight), layer| {
            let frequency = f64::from(1u32 << layer.min(30));
            let amplitude = 1.0 / frequency;
            (
                sum + self.sample(x * frequency, y * frequency) * amplitude,
                weight + amplitude,
            )
        });
        sum / weight
    }
}

/// One of eight gradient directions, picked by the low bits of a lattice
/// hash. Diagonals are left unnormalised, as in the reference formulation.
#[inline]
fn gradient(hash: u8) -> (f64, f64) {
    match hash & 7 {
        0 => (1.0, 0.0),
        1 => (-1.0, 0.0),
        2 => (0.0, 1.0),
        3 => (0.0, -1.0),
        4 => (1.0, 1.0),
        5 => (-1.0, 1.0),
        6 => (1.0, -1.0),
        _ => (-1.0, -1.0),
    }
}
