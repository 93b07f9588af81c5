//! The padded sampling grid shared by every pass

use crate::mesh::Mesh;
use glam::Vec2;

/// Uniform XY grid covering the mesh plus one voxel of padding per side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    pub origin: Vec2,
    pub voxel_size: f32,
    pub cells_x: usize,
    pub cells_y: usize,
}

impl SampleGrid {
    /// `None` when the mesh has no vertices
    pub fn from_mesh(mesh: &Mesh, voxel_size: f32) -> Option<Self> {
        let (min, max) = mesh.bounds_xy()?;
        let pad = Vec2::splat(voxel_size);
        let (min, max) = (min - pad, max + pad);
        let cells = |extent: f32| ((extent / voxel_size).floor() as usize).max(1);
        Some(Self {
            origin: min,
            voxel_size,
            cells_x: cells(max.x - min.x),
            cells_y: cells(max.y - min.y),
        })
    }

    pub fn cell_center(&self, gx: usize, gy: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + (gx as f32 + 0.5) * self.voxel_size,
            self.origin.y + (gy as f32 + 0.5) * self.voxel_size,
        )
    }

    /// Row-major iterator over every cell's `(gx, gy)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.cells_y).flat_map(move |gy| (0..self.cells_x).map(move |gx| (gx, gy)))
    }

    /// World point to fractional grid units
    pub fn to_grid(&self, p: Vec2) -> Vec2 {
        (p - self.origin) / self.voxel_size
    }

    /// Fractional grid units back to world XY
    pub fn to_world(&self, g: Vec2) -> Vec2 {
        self.origin + g * self.voxel_size
    }
}
