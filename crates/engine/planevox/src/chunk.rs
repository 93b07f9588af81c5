//! Voxel chunks: flat grids of palette indices ready for the scene writer

use glam::{Vec2, Vec3};
use std::collections::TryReserveError;

/// Largest chunk extent along either axis
pub const MAX_CHUNK_SIZE: usize = 256;

/// Source edge of a strip chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo {
    pub start: Vec3,
    pub end: Vec3,
    pub length: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkKind {
    Plane,
    Edge(EdgeInfo),
}

/// One output model, `width x height x 1` voxels.
///
/// Owns its buffer exclusively and is move-only. `position` is in grid units
/// relative to the padded grid origin: integer pivot cells for planes,
/// fractional strip centers for edges.
#[derive(Debug, PartialEq)]
pub struct VoxelChunk {
    name: String,
    width: usize,
    height: usize,
    voxels: Vec<u8>,
    pub position: Vec2,
    pub kind: ChunkKind,
}

impl VoxelChunk {
    /// Allocate an empty (all zero) chunk.
    ///
    /// Dimensions are clamped to `1..=MAX_CHUNK_SIZE`. Allocation failure is
    /// returned rather than aborting so the caller can skip the chunk.
    pub fn try_new(
        name: impl Into<String>,
        width: usize,
        height: usize,
        position: Vec2,
        kind: ChunkKind,
    ) -> Result<Self, TryReserveError> {
        let width = width.clamp(1, MAX_CHUNK_SIZE);
        let height = height.clamp(1, MAX_CHUNK_SIZE);
        let mut voxels = Vec::new();
        voxels.try_reserve_exact(width * height)?;
        voxels.resize(width * height, 0);
        Ok(Self {
            name: name.into(),
            width,
            height,
            voxels,
            position,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.voxels[x + y * self.width]
    }

    pub fn set(&mut self, x: usize, y: usize, index: u8) {
        self.voxels[x + y * self.width] = index;
    }

    /// Row-major palette indices, `x + y * width`
    pub fn voxels(&self) -> &[u8] {
        &self.voxels
    }

    pub fn solid_count(&self) -> usize {
        self.voxels.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.kind, ChunkKind::Edge(_))
    }

    pub fn edge_info(&self) -> Option<&EdgeInfo> {
        match &self.kind {
            ChunkKind::Edge(info) => Some(info),
            ChunkKind::Plane => None,
        }
    }
}

/// Inclusive bounds of the non-zero cells of a row-major buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl CropRect {
    /// `None` when every cell is zero
    pub fn of(buffer: &[u8], width: usize) -> Option<Self> {
        let mut rect: Option<CropRect> = None;
        for (i, _) in buffer.iter().enumerate().filter(|(_, &v)| v != 0) {
            let (x, y) = (i % width, i / width);
            rect = Some(match rect {
                None => CropRect {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(r) => CropRect {
                    min_x: r.min_x.min(x),
                    min_y: r.min_y.min(y),
                    max_x: r.max_x.max(x),
                    max_y: r.max_y.max(y),
                },
            });
        }
        rect
    }

    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }
}
