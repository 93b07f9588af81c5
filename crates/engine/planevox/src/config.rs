//! Conversion settings
//!
//! Loaded from TOML or built in code; every field has a default so partial
//! files are fine:
//!
//! ```toml
//! voxel_size = 0.05
//! material_maps = ["Glass:$TD_glass", "Steel:$TD_metal:metal"]
//! material_properties = ["Steel:rough:0.3"]
//! ```

use crate::error::{Error, Result};
use crate::palette::quantizer::DEFAULT_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default world size of one voxel
pub const DEFAULT_VOXEL_SIZE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelizeConfig {
    /// World size of one voxel edge
    pub voxel_size: f32,
    /// `material:tag[:kind]` overrides
    pub material_maps: Vec<String>,
    /// `material:property:value` overrides
    pub material_properties: Vec<String>,
    /// Upper bound on k-means rounds per material
    pub kmeans_iterations: usize,
    /// Bucket faces for point location instead of scanning every face
    pub use_face_index: bool,
}

impl Default for VoxelizeConfig {
    fn default() -> Self {
        Self {
            voxel_size: DEFAULT_VOXEL_SIZE,
            material_maps: Vec::new(),
            material_properties: Vec::new(),
            kmeans_iterations: DEFAULT_ITERATIONS,
            use_face_index: true,
        }
    }
}

impl VoxelizeConfig {
    pub fn with_voxel_size(mut self, voxel_size: f32) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(Error::InvalidVoxelSize(self.voxel_size));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VoxelizeConfig::default();
        assert_eq!(config.voxel_size, 0.1);
        assert_eq!(config.kmeans_iterations, 10);
        assert!(config.use_face_index);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = VoxelizeConfig::from_toml_str(
            r#"
            voxel_size = 0.05
            material_maps = ["Glass:$TD_glass"]
            "#,
        )
        .unwrap();
        assert_eq!(config.voxel_size, 0.05);
        assert_eq!(config.material_maps, vec!["Glass:$TD_glass".to_string()]);
        assert!(config.material_properties.is_empty());
        assert_eq!(config.kmeans_iterations, 10);
    }

    #[test]
    fn test_invalid_voxel_size_rejected() {
        assert!(matches!(
            VoxelizeConfig::from_toml_str("voxel_size = -1.0"),
            Err(Error::InvalidVoxelSize(_))
        ));
        assert!(VoxelizeConfig::default().with_voxel_size(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        assert!(matches!(
            VoxelizeConfig::from_toml_str("voxel_size = \"big\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = VoxelizeConfig {
            material_properties: vec!["Steel:rough:0.3".into()],
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(VoxelizeConfig::from_toml_str(&text).unwrap(), config);
    }
}
