//! Palette construction
//!
//! Pipeline: [`allocator`] splits the usable index band between materials,
//! [`quantizer`] reduces each material's colors to its share, and
//! [`manager`] lays the results out in the 256-entry palette.

pub mod allocator;
pub mod manager;
pub mod quantizer;

pub use allocator::allocate_slots;
pub use manager::{PaletteManager, RemapTable};
pub use quantizer::kmeans;

use crate::color::Rgba;

/// Lowest index available for material colors
pub const FIRST_INDEX: u8 = 9;
/// Highest index available for material colors
pub const LAST_INDEX: u8 = 253;
/// Number of indices in `FIRST_INDEX..=LAST_INDEX`
pub const ALLOCATABLE_SLOTS: usize = 245;
/// Tag groups in the `NOTE` chunk, eight palette indices each
pub const TAG_GROUPS: usize = 32;

/// Index 0 is empty space, 1-8 are vehicle lights, 254-255 are holes
pub const fn is_reserved(index: u8) -> bool {
    index <= 8 || index >= 254
}

/// 256-entry RGBA palette; unassigned entries are fully transparent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [Rgba; 256],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: [Rgba::TRANSPARENT; 256],
        }
    }
}

impl Palette {
    pub fn get(&self, index: u8) -> Rgba {
        self.entries[index as usize]
    }

    pub fn set(&mut self, index: u8, color: Rgba) {
        self.entries[index as usize] = color;
    }

    pub fn entries(&self) -> &[Rgba; 256] {
        &self.entries
    }
}
