//! Packed colors and the perceptual distance used by quantization

/// 24-bit color packed as `0x00RRGGBB`
///
/// Ordering follows the packed value, which is what the quantizer sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Error/fallback color for surfaces without a material
    pub const MAGENTA: Rgb = Rgb(0xFF00FF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Build from linear `[0, 1]` channels, clamping and truncating like
    /// `clamp(c * 255, 0, 255) as u8`.
    pub fn from_unit(rgb: [f32; 3]) -> Self {
        let channel = |c: f32| (c * 255.0).clamp(0.0, 255.0) as u8;
        Rgb::new(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }

    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba {
            r: self.r(),
            g: self.g(),
            b: self.b(),
            a,
        }
    }

    /// Luminance-weighted squared distance (0.3 R, 0.59 G, 0.11 B)
    pub fn weighted_distance(self, other: Rgb) -> f32 {
        let dr = self.r() as i32 - other.r() as i32;
        let dg = self.g() as i32 - other.g() as i32;
        let db = self.b() as i32 - other.b() as i32;
        let d = (dr * dr) as f64 * 0.3 + (dg * dg) as f64 * 0.59 + (db * db) as f64 * 0.11;
        d as f32
    }
}

/// Palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// A color observed on the surface, tagged with the material it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSample {
    pub color: Rgb,
    pub material: String,
}

impl ColorSample {
    pub fn new(color: Rgb, material: impl Into<String>) -> Self {
        Self {
            color,
            material: material.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_and_unpack() {
        let c = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(c.0, 0x123456);
        assert_eq!((c.r(), c.g(), c.b()), (0x12, 0x34, 0x56));
    }

    #[test]
    fn test_from_unit_clamps() {
        assert_eq!(Rgb::from_unit([1.0, 0.0, 0.5]), Rgb::new(255, 0, 127));
        assert_eq!(Rgb::from_unit([2.0, -1.0, 1.0]), Rgb::new(255, 0, 255));
    }

    #[test]
    fn test_weighted_distance_favors_green() {
        let black = Rgb::new(0, 0, 0);
        let red = black.weighted_distance(Rgb::new(10, 0, 0));
        let green = black.weighted_distance(Rgb::new(0, 10, 0));
        let blue = black.weighted_distance(Rgb::new(0, 0, 10));
        assert!(green > red && red > blue);
        assert!((red - 30.0).abs() < 1e-4);
        assert_eq!(black.weighted_distance(black), 0.0);
    }

    #[test]
    fn test_with_alpha() {
        let entry = Rgb::MAGENTA.with_alpha(255);
        assert_eq!(entry, Rgba { r: 255, g: 0, b: 255, a: 255 });
        assert_eq!(entry.rgb(), Rgb::MAGENTA);
    }
}
