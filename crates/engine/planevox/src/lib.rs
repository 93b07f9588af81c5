//! Planar textured-mesh voxelizer
//!
//! Converts a flat OBJ mesh (all geometry in the XY plane) into a set of
//! single-layer voxel chunks sharing one 256-entry palette:
//!
//! - plane chunks tile the polygon interior in blocks of at most 256x256
//! - edge strips run along every boundary edge, rotated into place
//!
//! Colors are sampled from diffuse textures, quantized per material into
//! the palette band `9..=253`, and written as a MagicaVoxel `.vox` scene
//! plus an XML scene graph that positions each chunk.
//!
//! ```no_run
//! use planevox::{io, TracingReporter, VoxelizeConfig, Voxelizer};
//! use std::path::Path;
//!
//! # fn main() -> planevox::Result<()> {
//! let reporter = TracingReporter;
//! let obj = Path::new("floor.obj");
//! let mesh = io::load_obj(obj, &reporter)?;
//! let textures = io::ImageTextureSource::new(io::find_texture_directory(obj, None));
//! let scene = Voxelizer::new(VoxelizeConfig::default(), &reporter).run_with_source(&mesh, &textures)?;
//! io::save_vox(Path::new("floor.vox"), &scene.chunks, &scene.palette)?;
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod boundary;
pub mod chunk;
pub mod collector;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod material;
pub mod mesh;
pub mod palette;
pub mod pipeline;
pub mod placement;
pub mod raster;
pub mod report;
pub mod sampler;
pub mod strip;
pub mod texture;

pub use boundary::Boundary;
pub use chunk::{ChunkKind, VoxelChunk, MAX_CHUNK_SIZE};
pub use color::{Rgb, Rgba};
pub use config::{VoxelizeConfig, DEFAULT_VOXEL_SIZE};
pub use error::{Error, Result};
pub use grid::SampleGrid;
pub use material::{MaterialOverrides, MaterialProfile, MaterialProfiles, RenderKind, RenderMaterial};
pub use mesh::{Mesh, MtlMaterial};
pub use palette::PaletteManager;
pub use pipeline::{VoxelScene, Voxelizer};
pub use placement::{Placement, SceneFrame};
pub use report::{Level, MemoryReporter, NullReporter, Reporter, TracingReporter};
pub use texture::{Texture, TextureSet, TextureSource};

// Re-export glam for convenience
pub use glam;

pub mod prelude {
    pub use crate::io::{
        find_texture_directory, load_obj, render_scene_xml, save_scene_xml, save_vox, vox_file_reference,
        ImageTextureSource,
    };
    pub use crate::{
        Error, Mesh, Placement, Reporter, Result, TracingReporter, VoxelChunk, VoxelScene, VoxelizeConfig,
        Voxelizer,
    };
}
