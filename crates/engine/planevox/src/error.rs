//! Error types for planevox

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that terminate a conversion.
///
/// Everything recoverable (missing textures, malformed overrides, palette
/// exhaustion) goes to the [`Reporter`](crate::report::Reporter) instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("cannot encode .vox: {0}")]
    Encode(#[source] std::io::Error),

    #[error("face {face} references vertex {index} but the mesh has {count} vertices")]
    VertexIndexOutOfRange {
        face: usize,
        index: i64,
        count: usize,
    },

    #[error("mesh has no vertices or no faces")]
    EmptyMesh,

    #[error("invalid voxel size {0}: must be positive and finite")]
    InvalidVoxelSize(f32),

    #[error("{materials} materials cannot share {budget} palette slots")]
    TooManyMaterials { materials: usize, budget: usize },

    #[error("conversion produced no voxel chunks")]
    NoChunks,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for planevox operations that may fail
pub type Result<T> = std::result::Result<T, Error>;
