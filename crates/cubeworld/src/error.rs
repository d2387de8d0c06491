//! # Session Errors

use cubeworld_meshing::MeshError;
use cubeworld_procedural::ProcError;
use thiserror::Error;

/// Errors surfaced by [`crate::WorldSession`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Configuration, generation or streaming failed.
    #[error("world: {0}")]
    World(#[from] ProcError),

    /// Model setup or face extraction failed.
    #[error("meshing: {0}")]
    Mesh(#[from] MeshError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
