//! Planar input geometry
//!
//! A [`Mesh`] holds world-space vertices, fan-triangulated faces, and the
//! polygon edges recorded before triangulation. Only X and Y take part in
//! rasterization; Z is carried through to placement.

use crate::color::Rgb;
use crate::error::{Error, Result};
use glam::{Vec2, Vec3};
use std::collections::BTreeMap;

/// Material record parsed from an MTL library
#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    pub name: String,
    /// Diffuse texture reference as written in the MTL (`map_Kd`)
    pub diffuse_map: Option<String>,
    pub kd: Vec3,
    pub ks: Vec3,
    pub ns: f32,
    /// Dissolve (opacity)
    pub d: f32,
    pub ke: Vec3,
    pub ni: f32,
}

impl MtlMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_map: None,
            kd: Vec3::ONE,
            ks: Vec3::ZERO,
            ns: 10.0,
            d: 1.0,
            ke: Vec3::ZERO,
            ni: 1.0,
        }
    }

    pub fn with_diffuse(mut self, kd: Vec3) -> Self {
        self.kd = kd;
        self
    }

    pub fn with_diffuse_map(mut self, reference: impl Into<String>) -> Self {
        self.diffuse_map = Some(reference.into());
        self
    }

    /// Diffuse color as an 8-bit sample
    pub fn diffuse_rgb(&self) -> Rgb {
        Rgb::from_unit(self.kd.to_array())
    }
}

/// Triangle with per-corner texture coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub uvs: [Vec2; 3],
    pub material: String,
}

impl Face {
    pub fn contains_vertex(&self, index: usize) -> bool {
        self.vertices.contains(&index)
    }

    /// UV at the corner holding `vertex`, if this face uses it
    pub fn uv_at(&self, vertex: usize) -> Option<Vec2> {
        self.vertices
            .iter()
            .position(|&v| v == vertex)
            .map(|corner| self.uvs[corner])
    }
}

/// Directed polygon edge between two vertex indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: usize,
    pub end: usize,
    /// 3D length
    pub length: f32,
    /// Set on boundary edges running parallel to an axis
    pub aligned: bool,
}

impl Edge {
    /// Undirected identity `(min, max)`
    pub fn key(&self) -> (usize, usize) {
        (self.start.min(self.end), self.start.max(self.end))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
    /// Edges of the source polygons in face order, before triangulation
    pub polygon_edges: Vec<Edge>,
    pub materials: BTreeMap<String, MtlMaterial>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            ..Default::default()
        }
    }

    pub fn with_material(mut self, material: MtlMaterial) -> Self {
        self.materials.insert(material.name.clone(), material);
        self
    }

    /// Add a polygon given by vertex indices and per-corner UVs.
    ///
    /// Records each polygon edge, then fan-triangulates around the first
    /// corner. `uvs` may be shorter than `corners`; missing UVs are zero.
    pub fn add_polygon(&mut self, corners: &[usize], uvs: &[Vec2], material: &str) -> Result<()> {
        let face = self.faces.len();
        for &index in corners {
            if index >= self.vertices.len() {
                return Err(Error::VertexIndexOutOfRange {
                    face,
                    index: index as i64,
                    count: self.vertices.len(),
                });
            }
        }
        if corners.len() < 3 {
            return Ok(());
        }

        let uv = |i: usize| uvs.get(i).copied().unwrap_or(Vec2::ZERO);
        for i in 0..corners.len() {
            let edge = self.edge_between(corners[i], corners[(i + 1) % corners.len()]);
            self.polygon_edges.push(edge);
        }
        for i in 1..corners.len() - 1 {
            self.faces.push(Face {
                vertices: [corners[0], corners[i], corners[i + 1]],
                uvs: [uv(0), uv(i), uv(i + 1)],
                material: material.to_string(),
            });
        }
        Ok(())
    }

    pub fn edge_between(&self, start: usize, end: usize) -> Edge {
        Edge {
            start,
            end,
            length: self.vertices[start].distance(self.vertices[end]),
            aligned: false,
        }
    }

    pub fn position_xy(&self, index: usize) -> Vec2 {
        self.vertices[index].truncate()
    }

    pub fn triangle_xy(&self, face: &Face) -> [Vec2; 3] {
        face.vertices.map(|v| self.position_xy(v))
    }

    /// XY bounding box of all vertices
    pub fn bounds_xy(&self) -> Option<(Vec2, Vec2)> {
        let first = self.vertices.first()?.truncate();
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.truncate()), max.max(v.truncate()))
        }))
    }

    /// Arithmetic mean of all vertex positions in XY
    pub fn centroid_xy(&self) -> Vec2 {
        if self.vertices.is_empty() {
            return Vec2::ZERO;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vec2::ZERO, |acc, v| acc + v.truncate());
        sum / self.vertices.len() as f32
    }

    /// First face (in face order) using both vertices
    pub fn find_face_with(&self, a: usize, b: usize) -> Option<usize> {
        self.faces
            .iter()
            .position(|f| f.contains_vertex(a) && f.contains_vertex(b))
    }

    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() || self.faces.is_empty() {
            return Err(Error::EmptyMesh);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        mesh.add_polygon(&[0, 1, 2, 3], &[], "mat").unwrap();
        mesh
    }

    #[test]
    fn test_fan_triangulation_keeps_polygon_edges() {
        let mesh = quad();
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[0].vertices, [0, 1, 2]);
        assert_eq!(mesh.faces[1].vertices, [0, 2, 3]);
        // the diagonal 0-2 is not a polygon edge
        assert_eq!(mesh.polygon_edges.len(), 4);
        assert!(mesh.polygon_edges.iter().all(|e| e.key() != (0, 2)));
        assert_eq!(mesh.polygon_edges[0].length, 2.0);
    }

    #[test]
    fn test_out_of_range_vertex_is_rejected() {
        let mut mesh = quad();
        let err = mesh.add_polygon(&[0, 1, 9], &[], "mat").unwrap_err();
        assert!(matches!(err, Error::VertexIndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn test_bounds_and_centroid() {
        let mesh = quad();
        assert_eq!(mesh.bounds_xy(), Some((Vec2::ZERO, Vec2::new(2.0, 1.0))));
        assert_eq!(mesh.centroid_xy(), Vec2::new(1.0, 0.5));
        assert!(Mesh::default().bounds_xy().is_none());
    }

    #[test]
    fn test_find_face_with() {
        let mesh = quad();
        assert_eq!(mesh.find_face_with(0, 2), Some(0));
        assert_eq!(mesh.find_face_with(2, 3), Some(1));
        assert_eq!(mesh.find_face_with(1, 3), None);
        assert_eq!(mesh.faces[1].uv_at(3), Some(Vec2::ZERO));
    }

    #[test]
    fn test_mtl_defaults() {
        let mtl = MtlMaterial::new("stone");
        assert_eq!(mtl.kd, Vec3::ONE);
        assert_eq!(mtl.ns, 10.0);
        assert_eq!(mtl.diffuse_rgb(), Rgb::new(255, 255, 255));
        assert!(Mesh::default().validate().is_err());
    }
}
