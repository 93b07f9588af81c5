//! Combines plane chunks and edge strips into the final chunk list

use crate::boundary::Boundary;
use crate::chunk::VoxelChunk;
use crate::error::{Error, Result};
use crate::grid::SampleGrid;
use crate::material::MaterialProfiles;
use crate::palette::PaletteManager;
use crate::raster::PlaneRasterizer;
use crate::report::Reporter;
use crate::sampler::SurfaceSampler;
use crate::strip::EdgeStripBuilder;

pub struct ModelAssembler<'a> {
    planes: PlaneRasterizer<'a>,
    strips: EdgeStripBuilder<'a>,
    boundary: &'a Boundary,
}

impl<'a> ModelAssembler<'a> {
    pub fn new(
        sampler: &'a SurfaceSampler<'a>,
        boundary: &'a Boundary,
        palette: &'a PaletteManager,
        profiles: &'a MaterialProfiles,
        grid: &'a SampleGrid,
    ) -> Self {
        Self {
            planes: PlaneRasterizer::new(sampler, boundary, palette, grid),
            strips: EdgeStripBuilder::new(sampler, palette, profiles, grid),
            boundary,
        }
    }

    /// Plane chunks in tile order followed by edge strips in boundary order.
    ///
    /// Fails with [`Error::NoChunks`] when nothing at all was produced.
    pub fn assemble(&self, reporter: &dyn Reporter) -> Result<Vec<VoxelChunk>> {
        let mut chunks = self.planes.plane_chunks(reporter);
        chunks.extend(self.strips.build_all(self.boundary, reporter));
        if chunks.is_empty() {
            reporter.error("no voxel chunk was produced");
            return Err(Error::NoChunks);
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorSample, Rgb};
    use crate::mesh::{Mesh, MtlMaterial};
    use crate::report::NullReporter;
    use crate::texture::TextureSet;
    use glam::Vec3;

    fn square(material: Option<&str>) -> Mesh {
        let mut mesh = Mesh::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        if let Some(name) = material {
            mesh = mesh.with_material(MtlMaterial::new(name).with_diffuse(Vec3::new(0.0, 1.0, 0.0)));
        }
        mesh.add_polygon(&[0, 1, 2, 3], &[], material.unwrap_or("")).unwrap();
        mesh
    }

    #[test]
    fn test_planes_come_before_edges() {
        let mesh = square(Some("green"));
        let textures = TextureSet::new();
        let sampler = SurfaceSampler::new(&mesh, &textures);
        let boundary = Boundary::extract(&mesh, &NullReporter);
        let profiles: MaterialProfiles = [("green".to_string(), Default::default())].into();
        let samples = vec![ColorSample::new(Rgb::new(0, 255, 0), "green")];
        let palette = PaletteManager::build(&samples, &profiles, 10, &NullReporter).unwrap();
        let grid = SampleGrid::from_mesh(&mesh, 0.25).unwrap();

        let chunks = ModelAssembler::new(&sampler, &boundary, &palette, &profiles, &grid)
            .assemble(&NullReporter)
            .unwrap();
        assert_eq!(chunks.len(), 5);
        assert!(!chunks[0].is_edge());
        assert!(chunks[1..].iter().all(VoxelChunk::is_edge));
    }

    #[test]
    fn test_nothing_produced_is_an_error() {
        // undefined material: plane cells remap to 0 and edges are skipped
        let mesh = square(None);
        let textures = TextureSet::new();
        let sampler = SurfaceSampler::new(&mesh, &textures);
        let boundary = Boundary::extract(&mesh, &NullReporter);
        let profiles = MaterialProfiles::new();
        let palette = PaletteManager::default();
        let grid = SampleGrid::from_mesh(&mesh, 0.25).unwrap();

        let result = ModelAssembler::new(&sampler, &boundary, &palette, &profiles, &grid).assemble(&NullReporter);
        assert!(matches!(result, Err(Error::NoChunks)));
    }
}
