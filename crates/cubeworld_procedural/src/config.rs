//! # World Configuration
//!
//! Settings for generation and streaming, loaded once at startup from TOML.
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! seed = 1337
//! load_radius = 5
//!
//! [terrain]
//! base_elevation = 40.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProcError, ProcResult};
use crate::noise::WorldSeed;

/// Largest accepted load radius. A radius-64 cube is already 129³ chunks.
pub const MAX_LOAD_RADIUS: u32 = 64;

/// Noise parameters for terrain synthesis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Height added to every column.
    pub base_elevation: f64,
    /// World voxels per noise unit.
    pub horizontal_scale: f64,
    /// Amplitude of the broad base undulation.
    pub base_amplitude: f64,
    /// Wavelength divisor of the warped relief octave.
    pub relief_scale: f64,
    /// Amplitude of the warped relief octave.
    pub relief_amplitude: f64,
    /// Wavelength divisor of the two warp fields.
    pub warp_scale: f64,
    /// Displacement applied by the warp fields.
    pub warp_amplitude: f64,
    /// Frequency multiplier of the detail octave.
    pub detail_frequency: f64,
    /// Amplitude of the detail octave.
    pub detail_amplitude: f64,
    /// Fractal layers in the detail octave.
    pub detail_octaves: u32,
    /// Subsurface voxels between the surface and the deep layer.
    pub subsurface_depth: u32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_elevation: 50.0,
            horizontal_scale: 256.0,
            base_amplitude: 20.0,
            relief_scale: 15.0,
            relief_amplitude: 20.0,
            warp_scale: 20.0,
            warp_amplitude: 20.0,
            detail_frequency: 4.0,
            detail_amplitude: 2.0,
            detail_octaves: 2,
            subsurface_depth: 3,
        }
    }
}

impl TerrainParams {
    /// Checks that every scale is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> ProcResult<()> {
        let positive = [
            ("horizontal_scale", self.horizontal_scale),
            ("relief_scale", self.relief_scale),
            ("warp_scale", self.warp_scale),
            ("detail_frequency", self.detail_frequency),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ProcError::InvalidConfig(format!(
                    "terrain.{name} must be finite and positive, got {value}"
                )));
            }
        }

        let finite = [
            ("base_elevation", self.base_elevation),
            ("base_amplitude", self.base_amplitude),
            ("relief_amplitude", self.relief_amplitude),
            ("warp_amplitude", self.warp_amplitude),
            ("detail_amplitude", self.detail_amplitude),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ProcError::InvalidConfig(format!(
                    "terrain.{name} must be finite, got {value}"
                )));
            }
        }

        if self.subsurface_depth == 0 {
            return Err(ProcError::InvalidConfig(
                "terrain.subsurface_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the world manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed.
    pub seed: u64,
    /// Chunks kept loaded around the focal point (Chebyshev radius).
    pub load_radius: u32,
    /// Chunks handed to the renderer (must not exceed `load_radius`).
    pub visibility_radius: u32,
    /// Generation threads; 0 picks a count from the CPU count.
    pub worker_threads: usize,
    /// Capacity of the bounded generation queue.
    pub queue_capacity: usize,
    /// Seconds between eviction sweeps during `update`.
    pub eviction_interval_secs: u64,
    /// Terrain noise parameters.
    pub terrain: TerrainParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: WorldSeed::default().value(),
            load_radius: 7,
            visibility_radius: 6,
            worker_threads: 0,
            // A full radius-7 cube is 15³ = 3375 chunks.
            queue_capacity: 4096,
            eviction_interval_secs: 600,
            terrain: TerrainParams::default(),
        }
    }
}

impl WorldConfig {
    /// Production settings: full radius, automatic worker count.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Small radii and two workers, evicting on every update.
    #[must_use]
    pub fn testing() -> Self {
        Self {
            load_radius: 2,
            visibility_radius: 1,
            worker_threads: 2,
            queue_capacity: 1024,
            eviction_interval_secs: 0,
            ..Self::default()
        }
    }

    /// Returns a copy with a different seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The seed as a [`WorldSeed`].
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        WorldSeed::new(self.seed)
    }

    /// Time between eviction sweeps.
    #[must_use]
    pub const fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs)
    }

    /// Resolved worker count: the configured value, or
    /// `max(cpus / 4 - 1, 1)` when set to 0.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        let cpus = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        (cpus / 4).saturating_sub(1).max(1)
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::InvalidConfig`] if the load radius is above
    /// [`MAX_LOAD_RADIUS`] or below the visibility radius, if the queue has
    /// no capacity, or if a terrain parameter is unusable.
    pub fn validate(&self) -> ProcResult<()> {
        if self.load_radius > MAX_LOAD_RADIUS {
            return Err(ProcError::InvalidConfig(format!(
                "load_radius {} exceeds the maximum of {MAX_LOAD_RADIUS}",
                self.load_radius
            )));
        }
        if self.visibility_radius > self.load_radius {
            return Err(ProcError::InvalidConfig(format!(
                "visibility_radius {} exceeds load_radius {}",
                self.visibility_radius, self.load_radius
            )));
        }
        if self.queue_capacity == 0 {
            return Err(ProcError::InvalidConfig("queue_capacity must be positive".into()));
        }
        self.terrain.validate()
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::ConfigParse`] for malformed TOML or
    /// [`ProcError::InvalidConfig`] for inconsistent values.
    pub fn from_toml_str(source: &str) -> ProcResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ProcError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::ConfigRead`] if the file cannot be read, otherwise
    /// as [`WorldConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ProcResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ProcError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), seed = config.seed, "world config loaded");
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ProcError::ConfigParse`] if serialization fails.
    pub fn to_toml_string(&self) -> ProcResult<String> {
        toml::to_string(self).map_err(|e| ProcError::ConfigParse(e.to_string()))
    }
}
