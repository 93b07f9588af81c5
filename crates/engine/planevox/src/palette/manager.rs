//! Final palette layout and the color remap table

use super::allocator::allocate_slots;
use super::quantizer::{kmeans, nearest};
use super::{is_reserved, Palette, ALLOCATABLE_SLOTS, FIRST_INDEX, LAST_INDEX, TAG_GROUPS};
use crate::color::{ColorSample, Rgb};
use crate::error::Result;
use crate::material::{MaterialProfiles, RenderMaterial};
use crate::report::Reporter;
use std::collections::{BTreeMap, HashMap};

/// `(color, material) -> palette index`
#[derive(Debug, Clone, Default)]
pub struct RemapTable {
    exact: HashMap<String, HashMap<Rgb, u8>>,
    /// Lowest palette index seen for each color, across materials
    by_color: HashMap<Rgb, u8>,
}

impl RemapTable {
    pub fn insert(&mut self, color: Rgb, material: &str, index: u8) {
        self.exact
            .entry(material.to_string())
            .or_default()
            .insert(color, index);
        self.by_color
            .entry(color)
            .and_modify(|i| *i = (*i).min(index))
            .or_insert(index);
    }

    /// Exact match, else the lowest index holding the same color under any
    /// material, else 0 (empty space).
    pub fn lookup(&self, color: Rgb, material: &str) -> u8 {
        self.exact
            .get(material)
            .and_then(|colors| colors.get(&color))
            .or_else(|| self.by_color.get(&color))
            .copied()
            .unwrap_or(0)
    }
}

/// Quantized palette with per-index tags and render materials
#[derive(Debug, Clone, Default)]
pub struct PaletteManager {
    palette: Palette,
    tags: BTreeMap<u8, String>,
    materials: BTreeMap<u8, RenderMaterial>,
    remap: RemapTable,
}

impl PaletteManager {
    /// Quantize `samples` into the palette.
    ///
    /// Samples are grouped by exact material name; groups are processed in
    /// name order and take consecutive non-reserved indices from
    /// [`FIRST_INDEX`]. The slot allocator never hands out more slots than
    /// the usable band holds.
    pub fn build(
        samples: &[ColorSample],
        profiles: &MaterialProfiles,
        iterations: usize,
        reporter: &dyn Reporter,
    ) -> Result<Self> {
        let mut groups: BTreeMap<&str, Vec<Rgb>> = BTreeMap::new();
        for sample in samples {
            groups.entry(sample.material.as_str()).or_default().push(sample.color);
        }
        for colors in groups.values_mut() {
            colors.sort_unstable();
            colors.dedup();
        }

        let counts: BTreeMap<String, usize> = groups
            .iter()
            .map(|(name, colors)| (name.to_string(), colors.len()))
            .collect();
        reporter.info(&format!("palette slots available: {ALLOCATABLE_SLOTS}"));
        let slots = allocate_slots(&counts, ALLOCATABLE_SLOTS)?;
        reporter.info(&format!(
            "palette slots assigned: {}",
            slots.values().sum::<usize>()
        ));

        let mut manager = Self::default();
        let mut usable = (FIRST_INDEX..=LAST_INDEX).filter(|&i| !is_reserved(i));

        for (&material, unique) in &groups {
            let k = slots.get(material).copied().unwrap_or(0);
            if k == 0 || unique.is_empty() {
                continue;
            }
            let profile = profiles.get(material);
            reporter.info(&format!(
                "material '{material}' ({}): {} colors -> {k} slots",
                profile.map_or("unknown", |p| p.tag.as_str()),
                unique.len()
            ));

            let centers = kmeans(unique, k, iterations);
            let indices: Vec<u8> = centers
                .iter()
                .zip(&mut usable)
                .map(|(&center, index)| {
                    manager.palette.set(index, center.with_alpha(255));
                    if let Some(profile) = profile {
                        manager.tags.insert(index, profile.tag.clone());
                        manager.materials.insert(index, profile.render);
                    }
                    index
                })
                .collect();

            for &color in unique {
                if let Some(&index) = indices.get(assigned_center(color, &centers)) {
                    manager.remap.insert(color, material, index);
                }
            }
        }
        Ok(manager)
    }

    /// Palette index for a color sampled from `material`; 0 when unknown
    pub fn final_index(&self, color: Rgb, material: &str) -> u8 {
        self.remap.lookup(color, material)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn tags(&self) -> &BTreeMap<u8, String> {
        &self.tags
    }

    pub fn materials(&self) -> &BTreeMap<u8, RenderMaterial> {
        &self.materials
    }

    pub fn remap(&self) -> &RemapTable {
        &self.remap
    }

    /// One tag per group of eight indices, group 31 first.
    ///
    /// Group `g` covers indices `8g+1..=8g+8`; its tag is the first
    /// non-empty tag among the group's non-reserved indices. Empty when no
    /// index has a material profile.
    pub fn tag_groups(&self) -> Vec<String> {
        if self.tags.is_empty() {
            return Vec::new();
        }
        (0..TAG_GROUPS)
            .rev()
            .map(|group| {
                (1..=8)
                    .map(|i| group * 8 + i)
                    .filter(|&i| i <= 255 && !is_reserved(i as u8))
                    .find_map(|i| self.tags.get(&(i as u8)).filter(|t| !t.is_empty()))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Nearest center for `color`; among identical centers the last one wins
fn assigned_center(color: Rgb, centers: &[Rgb]) -> usize {
    let best = nearest(color, centers);
    centers
        .iter()
        .rposition(|&c| c == centers[best])
        .unwrap_or(best)
}
