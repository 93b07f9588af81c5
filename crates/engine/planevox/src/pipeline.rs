//! End-to-end conversion of a planar mesh into voxel chunks
//!
//! Three passes over the same grid: sample colors, quantize them into the
//! palette, then rasterize planes and build edge strips against the final
//! palette.

use crate::assemble::ModelAssembler;
use crate::boundary::Boundary;
use crate::chunk::VoxelChunk;
use crate::collector::collect_samples;
use crate::config::VoxelizeConfig;
use crate::error::{Error, Result};
use crate::grid::SampleGrid;
use crate::material::{classify_materials, MaterialOverrides, MaterialProfiles};
use crate::mesh::Mesh;
use crate::palette::PaletteManager;
use crate::placement::{Placement, SceneFrame};
use crate::report::Reporter;
use crate::sampler::SurfaceSampler;
use crate::texture::{TextureSet, TextureSource};

/// Result of a conversion, ready for the scene writers
#[derive(Debug)]
pub struct VoxelScene {
    pub chunks: Vec<VoxelChunk>,
    pub palette: PaletteManager,
    pub profiles: MaterialProfiles,
    pub grid: SampleGrid,
    pub frame: SceneFrame,
}

impl VoxelScene {
    pub fn placements(&self) -> Vec<Placement> {
        self.frame.place_all(&self.chunks)
    }

    pub fn plane_count(&self) -> usize {
        self.chunks.iter().filter(|c| !c.is_edge()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_edge()).count()
    }
}

pub struct Voxelizer<'r> {
    config: VoxelizeConfig,
    reporter: &'r dyn Reporter,
}

impl<'r> Voxelizer<'r> {
    pub fn new(config: VoxelizeConfig, reporter: &'r dyn Reporter) -> Self {
        Self { config, reporter }
    }

    pub fn config(&self) -> &VoxelizeConfig {
        &self.config
    }

    /// Load the mesh's diffuse textures from `source`, then [`run`](Self::run)
    pub fn run_with_source(&self, mesh: &Mesh, source: &dyn TextureSource) -> Result<VoxelScene> {
        let textures = TextureSet::load_for(mesh, source, self.reporter);
        self.run(mesh, &textures)
    }

    pub fn run(&self, mesh: &Mesh, textures: &TextureSet) -> Result<VoxelScene> {
        let reporter = self.reporter;
        self.config.validate()?;
        mesh.validate()?;
        let size = self.config.voxel_size;

        let overrides = MaterialOverrides::parse(
            &self.config.material_maps,
            &self.config.material_properties,
            reporter,
        );
        let profiles = classify_materials(&mesh.materials, &overrides, reporter);

        let grid = SampleGrid::from_mesh(mesh, size).ok_or(Error::EmptyMesh)?;
        reporter.info(&format!(
            "sampling grid {}x{} at voxel size {size}",
            grid.cells_x, grid.cells_y
        ));

        let mut sampler = SurfaceSampler::new(mesh, textures);
        if self.config.use_face_index {
            sampler = sampler.with_face_index();
        }
        let boundary = Boundary::extract(mesh, reporter);

        reporter.info("pass 1: collecting color samples");
        let samples = collect_samples(&sampler, &grid, &boundary, &profiles, reporter);

        reporter.info("pass 2: quantizing colors");
        let palette = PaletteManager::build(&samples, &profiles, self.config.kmeans_iterations, reporter)?;
        drop(samples);

        reporter.info("pass 3: building voxel chunks");
        let chunks = ModelAssembler::new(&sampler, &boundary, &palette, &profiles, &grid).assemble(reporter)?;

        let frame = SceneFrame {
            grid_origin: grid.origin,
            centroid: mesh.centroid_xy(),
            voxel_size: size,
        };
        Ok(VoxelScene {
            chunks,
            palette,
            profiles,
            grid,
            frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::mesh::MtlMaterial;
    use crate::report::{Level, MemoryReporter, NullReporter};
    use glam::{Vec2, Vec3};

    fn unit_square() -> Mesh {
        let mut mesh = Mesh::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .with_material(MtlMaterial::new("mat0").with_diffuse(Vec3::new(1.0, 0.0, 0.0)));
        mesh.add_polygon(&[0, 1, 2, 3], &[], "mat0").unwrap();
        mesh
    }

    #[test]
    fn test_unit_square_scene() {
        let mesh = unit_square();
        let config = VoxelizeConfig::default().with_voxel_size(0.5);
        let scene = Voxelizer::new(config, &NullReporter)
            .run(&mesh, &TextureSet::new())
            .unwrap();

        let red = scene.palette.final_index(Rgb::new(255, 0, 0), "mat0");
        assert!((9..=253).contains(&red));
        assert_eq!(scene.plane_count(), 1);
        assert_eq!(scene.edge_count(), 4);

        let plane = &scene.chunks[0];
        assert_eq!((plane.width(), plane.height()), (2, 2));
        assert!(plane.voxels().iter().all(|&v| v == red));
        assert_eq!(scene.frame.centroid, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_face_index_does_not_change_output() {
        let mesh = unit_square();
        let run = |use_face_index| {
            let config = VoxelizeConfig {
                voxel_size: 0.1,
                use_face_index,
                ..Default::default()
            };
            Voxelizer::new(config, &NullReporter)
                .run(&mesh, &TextureSet::new())
                .unwrap()
                .chunks
        };
        assert_eq!(run(true), run(false));
    }

    #[test]
    fn test_invalid_voxel_size() {
        let config = VoxelizeConfig::default().with_voxel_size(0.0);
        let result = Voxelizer::new(config, &NullReporter).run(&unit_square(), &TextureSet::new());
        assert!(matches!(result, Err(Error::InvalidVoxelSize(_))));
    }

    #[test]
    fn test_empty_mesh_is_fatal() {
        let result = Voxelizer::new(VoxelizeConfig::default(), &NullReporter)
            .run(&Mesh::new(Vec::new()), &TextureSet::new());
        assert!(matches!(result, Err(Error::EmptyMesh)));
    }

    #[test]
    fn test_reports_progress() {
        let reporter = MemoryReporter::new();
        Voxelizer::new(VoxelizeConfig::default().with_voxel_size(0.25), &reporter)
            .run(&unit_square(), &TextureSet::new())
            .unwrap();
        assert!(reporter.has(Level::Info, "pass 3"));
        assert!(reporter.has(Level::Info, "built 4 edge strip chunks"));
        assert!(reporter.at(Level::Warn).is_empty());
    }
}
