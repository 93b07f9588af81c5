//! First pass: gather the color samples the palette is built from

use crate::boundary::Boundary;
use crate::color::{ColorSample, Rgb};
use crate::grid::SampleGrid;
use crate::material::MaterialProfiles;
use crate::mesh::Mesh;
use crate::report::Reporter;
use crate::sampler::SurfaceSampler;
use crate::strip::strip_placement;

/// Magenta samples injected when the mesh defines no materials at all
const EMPTY_POOL_SAMPLES: usize = 32;

/// Every in-surface grid cell, in row-major order
pub fn collect_plane_samples(sampler: &SurfaceSampler<'_>, grid: &SampleGrid) -> Vec<ColorSample> {
    grid.cells()
        .filter_map(|(gx, gy)| sampler.locate(grid.cell_center(gx, gy)))
        .map(|hit| sampler.color_at(hit))
        .collect()
}

/// Samples along each tagged boundary edge, one per strip voxel
pub fn collect_edge_samples(
    sampler: &SurfaceSampler<'_>,
    boundary: &Boundary,
    profiles: &MaterialProfiles,
    voxel_size: f32,
) -> Vec<ColorSample> {
    let mesh = sampler.mesh();
    let mut samples = Vec::new();
    for edge in &boundary.edges {
        let Some(owner) = edge.owner else { continue };
        let material = mesh.faces[owner.face].material.as_str();
        if !mesh.materials.contains_key(material) {
            continue;
        }
        if profiles.get(material).map_or(true, |p| p.tag.is_empty()) {
            continue;
        }

        let count = strip_placement(edge.edge.length, voxel_size).voxel_count;
        samples.extend((0..count).map(|i| {
            let t = (i as f32 + 0.5) / count as f32;
            sampler.edge_color(material, owner.uv_start, owner.uv_end, t)
        }));
    }
    samples
}

/// Samples used when both passes came back empty
pub fn fallback_samples(mesh: &Mesh, reporter: &dyn Reporter) -> Vec<ColorSample> {
    if mesh.materials.is_empty() {
        reporter.warn("no materials found; using magenta with an empty physical tag");
        return vec![ColorSample::new(Rgb::MAGENTA, ""); EMPTY_POOL_SAMPLES];
    }
    reporter.warn("no surface samples; using each material's diffuse color");
    mesh.materials
        .values()
        .filter(|m| !m.name.is_empty())
        .map(|m| ColorSample::new(m.diffuse_rgb(), m.name.as_str()))
        .collect()
}

/// Run both passes and apply the empty-pool fallback
pub fn collect_samples(
    sampler: &SurfaceSampler<'_>,
    grid: &SampleGrid,
    boundary: &Boundary,
    profiles: &MaterialProfiles,
    reporter: &dyn Reporter,
) -> Vec<ColorSample> {
    let mut samples = collect_plane_samples(sampler, grid);
    let plane = samples.len();
    samples.extend(collect_edge_samples(sampler, boundary, profiles, grid.voxel_size));
    reporter.info(&format!(
        "collected {plane} plane samples and {} edge samples",
        samples.len() - plane
    ));

    if samples.is_empty() {
        reporter.warn("sample pool is empty");
        samples = fallback_samples(sampler.mesh(), reporter);
        if samples.is_empty() {
            samples = vec![ColorSample::new(Rgb::MAGENTA, ""); EMPTY_POOL_SAMPLES];
        }
    }
    samples
}
