//! Boundary (silhouette) extraction
//!
//! A polygon edge is on the boundary when exactly one source polygon uses it.
//! Boundary edges drive inside testing, trimming, and edge strips.

use crate::geometry::{is_axis_aligned, is_ccw, outward_normal, point_in_rings};
use crate::mesh::{Edge, Mesh};
use crate::report::Reporter;
use glam::Vec2;
use std::collections::HashMap;

/// First face (in face order) using both endpoints of an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOwner {
    pub face: usize,
    pub uv_start: Vec2,
    pub uv_end: Vec2,
    /// Outward unit normal derived from the owning face's winding
    pub outward: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryEdge {
    pub edge: Edge,
    pub start: Vec2,
    pub end: Vec2,
    pub owner: Option<EdgeOwner>,
}

impl BoundaryEdge {
    pub fn material<'m>(&self, mesh: &'m Mesh) -> Option<&'m str> {
        self.owner.map(|o| mesh.faces[o.face].material.as_str())
    }
}

/// Polygon used for inside tests
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Closed loops ordered from boundary edges; several loops model holes
    Loops(Vec<Vec<Vec2>>),
    /// No loop could be closed; every mesh vertex in index order.
    /// Best effort only.
    AllVertices(Vec<Vec2>),
}

impl Outline {
    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Outline::Loops(rings) => point_in_rings(p, rings),
            Outline::AllVertices(ring) => point_in_rings(p, std::slice::from_ref(ring)),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outline::AllVertices(_))
    }
}

#[derive(Debug, Clone)]
pub struct Boundary {
    pub edges: Vec<BoundaryEdge>,
    pub outline: Outline,
}

impl Boundary {
    pub fn extract(mesh: &Mesh, reporter: &dyn Reporter) -> Self {
        let edges: Vec<BoundaryEdge> = boundary_edges(mesh)
            .into_iter()
            .map(|edge| {
                let start = mesh.position_xy(edge.start);
                let end = mesh.position_xy(edge.end);
                BoundaryEdge {
                    owner: find_owner(mesh, &edge, start, end),
                    edge,
                    start,
                    end,
                }
            })
            .collect();

        reporter.info(&format!(
            "found {} polygon edges, {} on the boundary",
            mesh.polygon_edges.len(),
            edges.len()
        ));

        let plain: Vec<Edge> = edges.iter().map(|b| b.edge).collect();
        let (rings, open) = order_loops(mesh, &plain);
        if open > 0 {
            reporter.warn(&format!("{open} boundary chain(s) do not close into a loop"));
        }
        let outline = if rings.is_empty() {
            reporter.warn("no closed boundary loop; falling back to all mesh vertices for inside tests");
            Outline::AllVertices(mesh.vertices.iter().map(|v| v.truncate()).collect())
        } else {
            Outline::Loops(rings)
        };

        Self { edges, outline }
    }
}

/// Polygon edges used by exactly one polygon, in their original order,
/// with the axis-alignment flag set.
pub fn boundary_edges(mesh: &Mesh) -> Vec<Edge> {
    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    for edge in &mesh.polygon_edges {
        *counts.entry(edge.key()).or_default() += 1;
    }
    mesh.polygon_edges
        .iter()
        .filter(|e| counts.get(&e.key()) == Some(&1))
        .map(|e| Edge {
            aligned: is_axis_aligned(mesh.position_xy(e.start), mesh.position_xy(e.end)),
            ..*e
        })
        .collect()
}

fn find_owner(mesh: &Mesh, edge: &Edge, start: Vec2, end: Vec2) -> Option<EdgeOwner> {
    let face_index = mesh.find_face_with(edge.start, edge.end)?;
    let face = &mesh.faces[face_index];
    let ccw = is_ccw(&mesh.triangle_xy(face));
    Some(EdgeOwner {
        face: face_index,
        uv_start: face.uv_at(edge.start)?,
        uv_end: face.uv_at(edge.end)?,
        outward: outward_normal(start, end, ccw),
    })
}

/// Chain edges into loops by shared endpoints.
///
/// Returns the closed loops as vertex rings plus the number of chains that
/// ran out of edges before returning to their start.
pub fn order_loops(mesh: &Mesh, edges: &[Edge]) -> (Vec<Vec<Vec2>>, usize) {
    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();
    let mut open = 0;

    for seed in 0..edges.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let first = edges[seed].start;
        let mut current = edges[seed].end;
        let mut ring = vec![mesh.position_xy(first)];

        let closed = loop {
            if current == first {
                break true;
            }
            let next = (0..edges.len())
                .find(|&j| !used[j] && (edges[j].start == current || edges[j].end == current));
            let Some(j) = next else {
                break false;
            };
            used[j] = true;
            ring.push(mesh.position_xy(current));
            current = if edges[j].start == current {
                edges[j].end
            } else {
                edges[j].start
            };
        };

        if closed {
            rings.push(ring);
        } else {
            open += 1;
        }
    }
    (rings, open)
}
