//! World transforms of chunks for the scene-graph file
//!
//! Chunk positions are grid units from the padded grid origin. The scene
//! graph is Y-up and centered on the mesh's vertex centroid, so OBJ `Z`
//! becomes up and OBJ `Y` becomes negative forward.

use crate::chunk::{ChunkKind, VoxelChunk};
use crate::geometry::edge_angle_degrees;
use glam::{Vec2, Vec3};

/// Voxel size that maps to a scale of 1.0
pub const REFERENCE_UNIT: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Chunk name, used as the object reference
    pub object: String,
    pub position: Vec3,
    /// Rotation about the up axis in degrees; `None` for plane chunks
    pub yaw: Option<f32>,
    pub scale: f32,
}

/// Everything needed to place chunks produced on one grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub grid_origin: Vec2,
    pub centroid: Vec2,
    pub voxel_size: f32,
}

impl SceneFrame {
    pub fn scale(&self) -> f32 {
        self.voxel_size / REFERENCE_UNIT
    }

    pub fn place(&self, chunk: &VoxelChunk) -> Placement {
        let world = self.grid_origin + chunk.position * self.voxel_size;
        let (height, yaw) = match &chunk.kind {
            ChunkKind::Plane => (0.0, None),
            ChunkKind::Edge(info) => (
                info.start.z,
                Some(-edge_angle_degrees(info.start.truncate(), info.end.truncate())),
            ),
        };
        Placement {
            object: chunk.name().to_string(),
            position: Vec3::new(world.x - self.centroid.x, height, -(world.y - self.centroid.y)),
            yaw,
            scale: self.scale(),
        }
    }

    pub fn place_all(&self, chunks: &[VoxelChunk]) -> Vec<Placement> {
        chunks.iter().map(|chunk| self.place(chunk)).collect()
    }
}
