use anyhow::{Context, Result};
use planevox::io::DEFAULT_VOX_MOUNT;
use planevox::VoxelizeConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Cli;

/// Optional `--config` file
///
/// ```toml
/// texture_dir = "textures"
/// vox_mount = "MOD/vox"
///
/// [voxelize]
/// voxel_size = 0.05
/// material_maps = ["Glass:$TD_glass"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub voxelize: VoxelizeConfig,
    pub texture_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub vox_mount: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            voxelize: VoxelizeConfig::default(),
            texture_dir: None,
            output: None,
            vox_mount: DEFAULT_VOX_MOUNT.to_string(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// Everything one conversion run needs, after merging file and flags
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub vox_output: PathBuf,
    pub xml_output: PathBuf,
    pub texture_dir: Option<PathBuf>,
    pub vox_mount: String,
    pub voxelize: VoxelizeConfig,
}

impl Settings {
    /// Flags win over the config file; override lists are concatenated
    pub fn resolve(cli: &Cli, file: CliConfig) -> Self {
        let mut voxelize = file.voxelize;
        if let Some(size) = cli.voxel_size {
            voxelize.voxel_size = size;
        }
        voxelize.material_maps.extend(cli.material_maps.iter().cloned());
        voxelize
            .material_properties
            .extend(cli.material_properties.iter().cloned());

        let vox_output = cli
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| cli.input.with_extension("vox"));
        let xml_output = vox_output.with_extension("xml");

        Self {
            input: cli.input.clone(),
            vox_output,
            xml_output,
            texture_dir: cli.texture_dir.clone().or(file.texture_dir),
            vox_mount: file.vox_mount,
            voxelize,
        }
    }
}
