//! # CUBEWORLD Procedural Generation
//!
//! Deterministic terrain and asynchronous chunk streaming.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same chunk
//! 2. **Chunked**: Every chunk is generated independently
//! 3. **Non-blocking**: The update thread never waits on a generation job
//! 4. **De-duplicated**: A coordinate has at most one job in flight
//!
//! ## Core Components
//!
//! - `SimplexNoise`: seeded 2D coherent noise
//! - `TerrainGenerator`: `(seed, coordinate) -> Chunk`
//! - `WorldManager`: chunk lifecycle, worker pool and eviction
//! - `WorldConfig`: TOML-backed settings
//!
//! ## Example
//!
//! ```rust,ignore
//! use cubeworld_core::VoxelCatalog;
//! use cubeworld_procedural::{WorldConfig, WorldManager};
//!
//! let catalog = VoxelCatalog::standard();
//! let manager = WorldManager::new(WorldConfig::production(), &catalog)?;
//!
//! // Player at world position (100, 64, 200)
//! manager.update([100.0, 64.0, 200.0])?;
//!
//! // Later frames poll; nothing blocks.
//! if let Some(stone) = manager.voxel_at([100, 40, 200]) {
//!     println!("{stone}");
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod noise;
pub mod terrain;
pub mod world_manager;

pub use config::{TerrainParams, WorldConfig, MAX_LOAD_RADIUS};
pub use error::{ProcError, ProcResult};
pub use noise::{SimplexNoise, WorldSeed};
pub use terrain::{TerrainGenerator, TerrainPalette};
pub use world_manager::{
    ChunkSource, ChunkState, Neighborhood, UpdateReport, WorldManager, WorldStats,
};
