//! In-memory textures and UV lookup

use crate::color::Rgb;
use crate::mesh::Mesh;
use crate::report::Reporter;
use glam::Vec2;
use std::collections::HashMap;

/// Pixels with alpha at or below this are treated as holes
const ALPHA_THRESHOLD: u8 = 128;

/// RGBA8 image, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Texture {
    /// `None` when `pixels` does not hold `width * height` RGBA texels
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (width > 0 && height > 0 && pixels.len() == width as usize * height as usize * 4).then_some(
            Self {
                width,
                height,
                pixels,
            },
        )
    }

    /// Single-color texture
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Color at `uv` with wrap addressing and V pointing up.
    ///
    /// Returns `None` for transparent texels.
    pub fn sample(&self, uv: Vec2) -> Option<Rgb> {
        let wrap = |c: f32| {
            let c = c % 1.0;
            if c < 0.0 {
                c + 1.0
            } else {
                c
            }
        };
        let (u, v) = (wrap(uv.x), wrap(uv.y));
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let tx = ((u * max_x as f32) as i64).clamp(0, max_x);
        let ty = (((1.0 - v) * max_y as f32) as i64).clamp(0, max_y);

        let offset = 4 * (ty as usize * self.width as usize + tx as usize);
        let texel = self.pixels.get(offset..offset + 4)?;
        (texel[3] > ALPHA_THRESHOLD).then(|| Rgb::new(texel[0], texel[1], texel[2]))
    }
}

/// Loads a texture by the reference string written in the MTL
pub trait TextureSource {
    fn load(&self, reference: &str, reporter: &dyn Reporter) -> Option<Texture>;
}

/// Textures keyed by MTL reference
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    textures: HashMap<String, Texture>,
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every distinct `map_Kd` used by the mesh's materials
    pub fn load_for(mesh: &Mesh, source: &dyn TextureSource, reporter: &dyn Reporter) -> Self {
        let mut set = Self::new();
        for reference in mesh.materials.values().filter_map(|m| m.diffuse_map.as_deref()) {
            if set.textures.contains_key(reference) {
                continue;
            }
            if let Some(texture) = source.load(reference, reporter) {
                set.insert(reference, texture);
            }
        }
        set
    }

    pub fn insert(&mut self, reference: impl Into<String>, texture: Texture) {
        self.textures.insert(reference.into(), texture);
    }

    pub fn get(&self, reference: &str) -> Option<&Texture> {
        self.textures.get(reference)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
