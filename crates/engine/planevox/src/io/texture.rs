//! Image-backed texture loading

use crate::report::Reporter;
use crate::texture::{Texture, TextureSource};
use std::path::{Path, PathBuf};

/// Where a model's textures live.
///
/// An explicit directory wins; otherwise `<obj dir>/<obj stem>/` when it
/// exists, else the OBJ's own directory.
pub fn find_texture_directory(obj_path: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let obj_dir = obj_path.parent().map(Path::to_path_buf).unwrap_or_default();
    if let Some(stem) = obj_path.file_stem() {
        let candidate = obj_dir.join(stem);
        if candidate.is_dir() {
            return candidate;
        }
    }
    obj_dir
}

/// Decode any format the `image` crate understands into RGBA8
pub fn decode_texture(bytes: &[u8]) -> Result<Texture, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Texture {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Resolves MTL references against one directory
#[derive(Debug, Clone)]
pub struct ImageTextureSource {
    directory: PathBuf,
}

impl ImageTextureSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `dir/reference`, falling back to `dir/<file name of reference>`
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let direct = self.directory.join(reference);
        if direct.is_file() {
            return Some(direct);
        }
        let by_name = self.directory.join(Path::new(reference).file_name()?);
        by_name.is_file().then_some(by_name)
    }
}

impl TextureSource for ImageTextureSource {
    fn load(&self, reference: &str, reporter: &dyn Reporter) -> Option<Texture> {
        let Some(path) = self.resolve(reference) else {
            reporter.warn(&format!(
                "texture {} not found in {}",
                reference,
                self.directory.display()
            ));
            return None;
        };
        let texture = std::fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| decode_texture(&bytes).map_err(|e| e.to_string()));
        match texture {
            Ok(texture) => {
                reporter.info(&format!(
                    "loaded texture {} ({}x{})",
                    path.display(),
                    texture.width,
                    texture.height
                ));
                Some(texture)
            }
            Err(err) => {
                reporter.warn(&format!("cannot load texture {}: {err}", path.display()));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};
    use image::{ImageFormat, Rgba, RgbaImage};

    fn write_png(path: &Path) {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_find_texture_directory() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("house.obj");
        assert_eq!(find_texture_directory(&obj, None), dir.path());

        std::fs::create_dir(dir.path().join("house")).unwrap();
        assert_eq!(find_texture_directory(&obj, None), dir.path().join("house"));

        let explicit = Path::new("/elsewhere");
        assert_eq!(find_texture_directory(&obj, Some(explicit)), explicit);
    }

    #[test]
    fn test_resolve_falls_back_to_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("wall.png"));
        let source = ImageTextureSource::new(dir.path());
        assert_eq!(source.resolve("wall.png"), Some(dir.path().join("wall.png")));
        assert_eq!(source.resolve("export/maps/wall.png"), Some(dir.path().join("wall.png")));
        assert_eq!(source.resolve("missing.png"), None);
    }

    #[test]
    fn test_load_decodes_rgba() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("wall.png"));
        let reporter = MemoryReporter::new();
        let texture = ImageTextureSource::new(dir.path()).load("wall.png", &reporter).unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(&texture.pixels[0..4], &[255, 0, 0, 255]);
        assert!(reporter.has(Level::Info, "loaded texture"));
    }

    #[test]
    fn test_missing_and_corrupt_textures_warn() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let reporter = MemoryReporter::new();
        let source = ImageTextureSource::new(dir.path());
        assert!(source.load("absent.png", &reporter).is_none());
        assert!(source.load("broken.png", &reporter).is_none());
        assert_eq!(reporter.at(Level::Warn).len(), 2);
    }
}
