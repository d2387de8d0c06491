//! # Procedural Error Types
//!
//! All errors that can occur while configuring, generating or streaming
//! chunks.

use cubeworld_core::{ChunkCoord, CoreError};
use thiserror::Error;

/// Errors that can occur in world generation and streaming.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcError {
    /// A chunk-level error from the voxel data model.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration values are inconsistent or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {reason}")]
    ConfigRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    /// A generation worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(String),

    /// A request radius above the supported maximum.
    #[error("radius {radius} exceeds the maximum of {max}")]
    RadiusTooLarge {
        /// Requested radius.
        radius: u32,
        /// Largest accepted radius.
        max: u32,
    },

    /// The chunk source panicked while generating this coordinate.
    #[error("chunk generation panicked at {0}")]
    GenerationPanicked(ChunkCoord),

    /// The world manager no longer accepts requests.
    #[error("world manager is shut down")]
    ShutDown,
}

/// Result type for procedural operations.
pub type ProcResult<T> = Result<T, ProcError>;
