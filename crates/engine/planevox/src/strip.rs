//! Edge strips: 1xN voxel chunks laid along boundary edges
//!
//! Every boundary edge with a defined material becomes one or more strips.
//! Edges longer than a chunk are first split into equal segments, and each
//! segment's strip is cut into chunks of at most [`MAX_CHUNK_SIZE`] voxels.
//! Strips sit half a discretization error off the edge midpoint and are
//! pushed outward by the seam offset so they meet the plane chunks cleanly.

use crate::boundary::{Boundary, BoundaryEdge};
use crate::chunk::{ChunkKind, EdgeInfo, VoxelChunk, MAX_CHUNK_SIZE};
use crate::grid::SampleGrid;
use crate::material::MaterialProfiles;
use crate::palette::PaletteManager;
use crate::raster::SEAM_OFFSET;
use crate::report::Reporter;
use crate::sampler::SurfaceSampler;
use glam::{Vec2, Vec3};

const MIN_PARENT_LENGTH: f32 = 1e-6;

/// How many voxels represent an edge, and where the strip sits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripPlacement {
    pub voxel_count: usize,
    /// Shift of the strip center from the edge midpoint, along the edge
    pub offset_along_edge: f32,
}

/// Pick `floor` or `ceil` of `length / voxel_size`, whichever lands closer
/// to the true length (ties go to `floor`). Never fewer than one voxel.
pub fn strip_placement(length: f32, voxel_size: f32) -> StripPlacement {
    let n_floor = (length / voxel_size).floor();
    let n_ceil = (length / voxel_size).ceil();
    let err_floor = length - n_floor * voxel_size;
    let err_ceil = n_ceil * voxel_size - length;

    let n = if err_ceil < err_floor { n_ceil } else { n_floor };
    let voxel_count = (n as usize).max(1);
    StripPlacement {
        voxel_count,
        offset_along_edge: (voxel_count as f32 * voxel_size - length) / 2.0,
    }
}

/// A stretch of a boundary edge, endpoints in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub length: f32,
}

impl EdgeSegment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            length: start.distance(end),
        }
    }

    /// Unit XY direction, or the raw delta for degenerate segments
    pub fn direction_xy(&self) -> Vec2 {
        let d = (self.end - self.start).truncate();
        let len = d.length();
        if len > MIN_PARENT_LENGTH {
            d / len
        } else {
            d
        }
    }

    /// Parameter range `(t_start, t_end)` this segment covers on a parent
    /// edge starting at `origin`.
    pub fn span_on(&self, origin: Vec3, parent_length: f32) -> (f32, f32) {
        if parent_length <= MIN_PARENT_LENGTH {
            return (0.0, 1.0);
        }
        let dist = self.start.truncate().distance(origin.truncate());
        (
            (dist / parent_length).clamp(0.0, 1.0),
            ((dist + self.length) / parent_length).clamp(0.0, 1.0),
        )
    }
}

/// Split an edge longer than one chunk into `floor(length / max)` equal
/// segments; shorter edges come back whole.
pub fn split_edge(start: Vec3, end: Vec3, length: f32, voxel_size: f32) -> Vec<EdgeSegment> {
    let max_length = MAX_CHUNK_SIZE as f32 * voxel_size;
    if length <= max_length {
        return vec![EdgeSegment { start, end, length }];
    }

    let count = ((length / max_length).floor() as usize).max(1);
    let step = (end - start) / count as f32;
    let mut prev = start;
    (1..=count)
        .map(|i| {
            let next = if i == count { end } else { start + step * i as f32 };
            let segment = EdgeSegment::new(prev, next);
            prev = next;
            segment
        })
        .collect()
}

/// Builds the strip chunks of boundary edges
pub struct EdgeStripBuilder<'a> {
    sampler: &'a SurfaceSampler<'a>,
    palette: &'a PaletteManager,
    profiles: &'a MaterialProfiles,
    grid: &'a SampleGrid,
}

impl<'a> EdgeStripBuilder<'a> {
    pub fn new(
        sampler: &'a SurfaceSampler<'a>,
        palette: &'a PaletteManager,
        profiles: &'a MaterialProfiles,
        grid: &'a SampleGrid,
    ) -> Self {
        Self {
            sampler,
            palette,
            profiles,
            grid,
        }
    }

    /// Strips for every boundary edge, in boundary order
    pub fn build_all(&self, boundary: &Boundary, reporter: &dyn Reporter) -> Vec<VoxelChunk> {
        let chunks: Vec<VoxelChunk> = boundary
            .edges
            .iter()
            .enumerate()
            .flat_map(|(i, edge)| self.build(i, edge, reporter))
            .collect();
        reporter.info(&format!("built {} edge strip chunks", chunks.len()));
        chunks
    }

    /// Strips for one edge, named `edge_{edge_index}_seg_{n}` with `n`
    /// counting every strip of the edge.
    pub fn build(
        &self,
        edge_index: usize,
        edge: &BoundaryEdge,
        reporter: &dyn Reporter,
    ) -> Vec<VoxelChunk> {
        let mesh = self.sampler.mesh();
        let Some(owner) = edge.owner else {
            return Vec::new();
        };
        let material = mesh.faces[owner.face].material.as_str();
        if !mesh.materials.contains_key(material) || !self.profiles.contains_key(material) {
            return Vec::new();
        }

        let size = self.grid.voxel_size;
        let origin = mesh.vertices[edge.edge.start];
        let target = mesh.vertices[edge.edge.end];
        let mut chunks = Vec::new();
        let mut strip = 0;

        for segment in split_edge(origin, target, edge.edge.length, size) {
            let (t_start, t_end) = segment.span_on(origin, edge.edge.length);
            let placement = strip_placement(segment.length, size);
            let total = placement.voxel_count;
            let direction = segment.direction_xy();
            let info = EdgeInfo {
                start: segment.start,
                end: segment.end,
                length: segment.length,
            };

            for offset in (0..total).step_by(MAX_CHUNK_SIZE) {
                let len = (total - offset).min(MAX_CHUNK_SIZE);
                let t_center = (offset as f32 + len as f32 / 2.0) / total as f32;
                let center = segment.start.lerp(segment.end, t_center).truncate()
                    + direction * placement.offset_along_edge
                    + owner.outward * (size * SEAM_OFFSET);

                let name = format!("edge_{edge_index}_seg_{strip}");
                strip += 1;
                let mut chunk = match VoxelChunk::try_new(
                    name.as_str(),
                    len,
                    1,
                    self.grid.to_grid(center),
                    ChunkKind::Edge(info),
                ) {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        reporter.error(&format!("cannot allocate chunk {name}: {err}"));
                        continue;
                    }
                };

                for j in 0..len {
                    let t_local = ((offset + j) as f32 + 0.5) / total as f32;
                    let t = t_start + t_local * (t_end - t_start);
                    let sample = self.sampler.edge_color(material, owner.uv_start, owner.uv_end, t);
                    chunk.set(j, 0, self.palette.final_index(sample.color, &sample.material));
                }
                chunks.push(chunk);
            }
        }
        chunks
    }
}
