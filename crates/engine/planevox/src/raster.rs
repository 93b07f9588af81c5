//! Plane rasterization and boundary trimming
//!
//! A cell is solid when its center is inside the outline, lands on a face,
//! survives trimming, and remaps to a non-zero palette index. Trimming
//! removes cells whose bounding circle pokes past a virtual edge one seam
//! offset outside the true boundary, which is where the edge strips go.

use crate::boundary::{Boundary, Outline};
use crate::chunk::{ChunkKind, CropRect, VoxelChunk, MAX_CHUNK_SIZE};
use crate::geometry::segments_cross;
use crate::grid::SampleGrid;
use crate::palette::PaletteManager;
use crate::report::Reporter;
use crate::sampler::SurfaceSampler;
use glam::Vec2;

/// Outward shift of the virtual trimming edge and of edge strips, in voxels
pub const SEAM_OFFSET: f32 = 0.25;
/// Slack in world units before a cell counts as crossing the virtual edge
pub const TRIM_TOLERANCE: f32 = 0.03;

const MIN_EDGE_LENGTH_SQ: f32 = 1e-10;

#[derive(Debug, Clone, Copy)]
struct TrimEdge {
    start: Vec2,
    delta: Vec2,
    len2: f32,
    /// `None` for edges without an owning face
    normal: Option<Vec2>,
}

impl TrimEdge {
    fn end(&self) -> Vec2 {
        self.start + self.delta
    }
}

/// Per-cell trimming against every boundary edge
#[derive(Debug, Clone)]
pub struct Trimmer {
    edges: Vec<TrimEdge>,
    seam: f32,
    radius: f32,
}

impl Trimmer {
    pub fn new(boundary: &Boundary, voxel_size: f32) -> Self {
        let edges = boundary
            .edges
            .iter()
            .map(|e| TrimEdge {
                start: e.start,
                delta: e.end - e.start,
                len2: (e.end - e.start).length_squared(),
                normal: e.owner.map(|o| o.outward),
            })
            .collect();
        Self {
            edges,
            seam: voxel_size * SEAM_OFFSET,
            radius: voxel_size * std::f32::consts::FRAC_1_SQRT_2,
        }
    }

    /// True when the voxel centered at `p` crosses the virtual boundary of
    /// some edge it can see.
    pub fn is_trimmed(&self, p: Vec2) -> bool {
        self.edges.iter().enumerate().any(|(i, edge)| {
            if edge.len2 < MIN_EDGE_LENGTH_SQ {
                return false;
            }
            let t = (p - edge.start).dot(edge.delta) / edge.len2;
            if !(0.0..=1.0).contains(&t) {
                return false;
            }
            let projection = edge.start + edge.delta * t;
            if self.is_occluded(i, p, projection) {
                return false;
            }
            let Some(normal) = edge.normal else {
                return false;
            };
            let signed = (p - projection).dot(normal);
            signed - self.seam - TRIM_TOLERANCE + self.radius > 0.0
        })
    }

    fn is_occluded(&self, skip: usize, from: Vec2, to: Vec2) -> bool {
        self.edges
            .iter()
            .enumerate()
            .any(|(j, other)| j != skip && segments_cross(from, to, other.start, other.end()))
    }
}

/// Pre-crop raster of one tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub tile_x: usize,
    pub tile_y: usize,
    /// First grid cell covered by the tile
    pub start_x: usize,
    pub start_y: usize,
    pub width: usize,
    pub height: usize,
    /// Row-major palette indices
    pub cells: Vec<u8>,
}

/// Turns the sampling grid into plane chunks
pub struct PlaneRasterizer<'a> {
    sampler: &'a SurfaceSampler<'a>,
    outline: &'a Outline,
    trimmer: Trimmer,
    palette: &'a PaletteManager,
    grid: &'a SampleGrid,
}

impl<'a> PlaneRasterizer<'a> {
    pub fn new(
        sampler: &'a SurfaceSampler<'a>,
        boundary: &'a Boundary,
        palette: &'a PaletteManager,
        grid: &'a SampleGrid,
    ) -> Self {
        Self {
            sampler,
            outline: &boundary.outline,
            trimmer: Trimmer::new(boundary, grid.voxel_size),
            palette,
            grid,
        }
    }

    /// Palette index of one grid cell; 0 for empty
    pub fn classify_cell(&self, gx: usize, gy: usize) -> u8 {
        let center = self.grid.cell_center(gx, gy);
        if !self.outline.contains(center) {
            return 0;
        }
        let Some(hit) = self.sampler.locate(center) else {
            return 0;
        };
        if self.trimmer.is_trimmed(center) {
            return 0;
        }
        let sample = self.sampler.color_at(hit);
        self.palette.final_index(sample.color, &sample.material)
    }

    /// Tile counts along X and Y
    pub fn tile_counts(&self) -> (usize, usize) {
        (
            self.grid.cells_x.div_ceil(MAX_CHUNK_SIZE),
            self.grid.cells_y.div_ceil(MAX_CHUNK_SIZE),
        )
    }

    pub fn rasterize_tile(&self, tile_x: usize, tile_y: usize) -> Tile {
        let start_x = tile_x * MAX_CHUNK_SIZE;
        let start_y = tile_y * MAX_CHUNK_SIZE;
        let width = MAX_CHUNK_SIZE.min(self.grid.cells_x - start_x);
        let height = MAX_CHUNK_SIZE.min(self.grid.cells_y - start_y);
        let mut cells = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                cells[x + y * width] = self.classify_cell(start_x + x, start_y + y);
            }
        }
        Tile {
            tile_x,
            tile_y,
            start_x,
            start_y,
            width,
            height,
            cells,
        }
    }

    /// Crop a tile to its solid cells; `None` when the tile is empty or the
    /// chunk buffer cannot be allocated.
    pub fn crop(&self, tile: &Tile, reporter: &dyn Reporter) -> Option<VoxelChunk> {
        let rect = CropRect::of(&tile.cells, tile.width)?;
        let (width, height) = (rect.width(), rect.height());
        let position = Vec2::new(
            (tile.start_x + rect.min_x + width / 2) as f32,
            (tile.start_y + rect.min_y + height / 2) as f32,
        );
        let name = format!("plane_{}_{}", tile.tile_x, tile.tile_y);
        let mut chunk = match VoxelChunk::try_new(name.as_str(), width, height, position, ChunkKind::Plane) {
            Ok(chunk) => chunk,
            Err(err) => {
                reporter.error(&format!("cannot allocate chunk {name}: {err}"));
                return None;
            }
        };
        for y in 0..height {
            for x in 0..width {
                chunk.set(x, y, tile.cells[(rect.min_x + x) + (rect.min_y + y) * tile.width]);
            }
        }
        Some(chunk)
    }

    /// Every non-empty tile in row-major tile order
    pub fn plane_chunks(&self, reporter: &dyn Reporter) -> Vec<VoxelChunk> {
        let (tiles_x, tiles_y) = self.tile_counts();
        let chunks: Vec<VoxelChunk> = (0..tiles_y)
            .flat_map(|ty| (0..tiles_x).map(move |tx| (tx, ty)))
            .filter_map(|(tx, ty)| self.crop(&self.rasterize_tile(tx, ty), reporter))
            .collect();
        reporter.info(&format!("built {} plane chunks", chunks.len()));
        chunks
    }
}
