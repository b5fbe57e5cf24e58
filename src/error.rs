//! Error types for the path tracer core.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scene loading and BVH/GPU setup.
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest file does not exist or cannot be read.
    #[error("failed to read scene manifest {path}: {source}")]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest JSON failed to parse.
    #[error("failed to parse scene manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A model's mesh file could not be fetched or read.
    #[error("failed to load mesh for model {path}: {source}")]
    MeshIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A mesh file failed to parse (malformed OBJ line).
    #[error("failed to parse mesh {path} at line {line}: {reason}")]
    MeshParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A sphere radius was not strictly positive.
    #[error("sphere radius must be positive, got {0}")]
    InvalidRadius(f32),

    /// A triangle's vertices are colinear (zero-area).
    #[error("degenerate (colinear) triangle")]
    DegenerateTriangle,

    /// No GPU adapter satisfying the requested constraints was found.
    #[error("no suitable GPU adapter available")]
    DeviceUnavailable,

    /// Pipeline or bind-group creation failed.
    #[error("failed to create GPU resource: {0}")]
    ResourceCreation(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type alias for path tracer operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_radius_message_contains_value() {
        let e = Error::InvalidRadius(-1.0);
        assert!(e.to_string().contains("-1"));
    }

    #[test]
    fn mesh_parse_message_contains_line() {
        let e = Error::MeshParse {
            path: PathBuf::from("cube.obj"),
            line: 42,
            reason: "bad face index".into(),
        };
        assert!(e.to_string().contains("42"));
        assert!(e.to_string().contains("cube.obj"));
    }
}
