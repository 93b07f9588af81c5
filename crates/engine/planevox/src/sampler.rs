//! Surface point location and color lookup

use crate::color::{ColorSample, Rgb};
use crate::geometry::triangle_weights;
use crate::mesh::Mesh;
use crate::texture::TextureSet;
use glam::Vec2;

/// Upper bound on buckets per axis
const MAX_BUCKETS_PER_AXIS: usize = 256;

/// Triangle bounding boxes are widened by this fraction of their extent so
/// the tolerant containment test never misses a candidate.
const BUCKET_PADDING: f32 = 0.01;

/// Point inside a face, with the barycentric weights of its three corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub face: usize,
    pub weights: (f32, f32, f32),
}

/// Uniform bucket grid over face bounding boxes.
///
/// Every bucket lists face indices in ascending order, so scanning a bucket
/// finds the same first containing face as scanning the whole mesh.
#[derive(Debug, Clone)]
pub struct FaceIndex {
    origin: Vec2,
    cell: Vec2,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<usize>>,
}

impl FaceIndex {
    pub fn build(mesh: &Mesh) -> Option<Self> {
        let (min, max) = mesh.bounds_xy()?;
        let extent = max - min;
        let pad = extent * BUCKET_PADDING + Vec2::splat(1e-5);
        let origin = min - pad;
        let span = extent + pad * 2.0;

        let per_axis = ((mesh.faces.len() as f32).sqrt().ceil() as usize).clamp(1, MAX_BUCKETS_PER_AXIS);
        let (cols, rows) = (per_axis, per_axis);
        let cell = Vec2::new(span.x / cols as f32, span.y / rows as f32);

        let mut index = Self {
            origin,
            cell,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        };

        for (face_index, face) in mesh.faces.iter().enumerate() {
            let [a, b, c] = mesh.triangle_xy(face);
            let lo = a.min(b).min(c);
            let hi = a.max(b).max(c);
            let margin = (hi - lo).max_element() * BUCKET_PADDING + 1e-5;
            let (c0, r0) = index.clamped_cell(lo - Vec2::splat(margin));
            let (c1, r1) = index.clamped_cell(hi + Vec2::splat(margin));
            for row in r0..=r1 {
                for col in c0..=c1 {
                    index.buckets[row * cols + col].push(face_index);
                }
            }
        }
        Some(index)
    }

    fn raw_cell(&self, p: Vec2) -> (i64, i64) {
        let g = (p - self.origin) / self.cell;
        (g.x.floor() as i64, g.y.floor() as i64)
    }

    fn clamped_cell(&self, p: Vec2) -> (usize, usize) {
        let (col, row) = self.raw_cell(p);
        (
            col.clamp(0, self.cols as i64 - 1) as usize,
            row.clamp(0, self.rows as i64 - 1) as usize,
        )
    }

    /// Faces that may contain `p`, in ascending order
    pub fn candidates(&self, p: Vec2) -> &[usize] {
        let (col, row) = self.raw_cell(p);
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return &[];
        }
        &self.buckets[row as usize * self.cols + col as usize]
    }
}

/// Resolves surface points to faces and faces to colors
pub struct SurfaceSampler<'a> {
    mesh: &'a Mesh,
    textures: &'a TextureSet,
    index: Option<FaceIndex>,
}

impl<'a> SurfaceSampler<'a> {
    pub fn new(mesh: &'a Mesh, textures: &'a TextureSet) -> Self {
        Self {
            mesh,
            textures,
            index: None,
        }
    }

    /// Accelerate [`locate`](Self::locate) with a bucket grid
    pub fn with_face_index(mut self) -> Self {
        self.index = FaceIndex::build(self.mesh);
        self
    }

    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// First face in face order containing `p`
    pub fn locate(&self, p: Vec2) -> Option<SurfaceHit> {
        let test = |face: usize| {
            let [a, b, c] = self.mesh.triangle_xy(&self.mesh.faces[face]);
            triangle_weights(p, a, b, c).map(|weights| SurfaceHit { face, weights })
        };
        match &self.index {
            Some(index) => index.candidates(p).iter().find_map(|&f| test(f)),
            None => (0..self.mesh.faces.len()).find_map(test),
        }
    }

    pub fn color_at(&self, hit: SurfaceHit) -> ColorSample {
        let face = &self.mesh.faces[hit.face];
        let color = self.material_color(&face.material, face.uvs, hit.weights);
        ColorSample::new(color, face.material.as_str())
    }

    /// Color at parameter `t` along an edge whose endpoints carry the given UVs
    pub fn edge_color(&self, material: &str, uv_start: Vec2, uv_end: Vec2, t: f32) -> ColorSample {
        let color = self.material_color(material, [uv_start, uv_end, Vec2::ZERO], (1.0 - t, t, 0.0));
        ColorSample::new(color, material)
    }

    /// Texture color when the material has a loaded texture and the texel is
    /// opaque, otherwise the diffuse color. Undefined materials are magenta.
    pub fn material_color(&self, material: &str, uvs: [Vec2; 3], weights: (f32, f32, f32)) -> Rgb {
        let Some(mtl) = self.mesh.materials.get(material) else {
            return Rgb::MAGENTA;
        };
        let textured = mtl
            .diffuse_map
            .as_deref()
            .and_then(|reference| self.textures.get(reference))
            .and_then(|texture| {
                let (wa, wb, wc) = weights;
                texture.sample(uvs[0] * wa + uvs[1] * wb + uvs[2] * wc)
            });
        textured.unwrap_or_else(|| mtl.diffuse_rgb())
    }
}
