//! Physical material classification
//!
//! Each MTL material gets a [`MaterialProfile`]: the physical tag the target
//! engine uses for destruction and sound, and the render material written
//! into the container's `MATL` chunk. User mappings and property overrides
//! take precedence over anything inferred from the MTL.

use crate::mesh::MtlMaterial;
use crate::report::Reporter;
use std::collections::BTreeMap;
use std::fmt;

/// Tag requesting automatic inference even when a mapping is present
pub const AUTO_TAG: &str = "$TD_auto";

/// Render model of a palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderKind {
    #[default]
    Diffuse,
    Metal,
    Glass,
    Emit,
}

impl RenderKind {
    /// Value of the `_type` key in a `MATL` dictionary
    pub fn as_vox_type(self) -> &'static str {
        match self {
            RenderKind::Diffuse => "_diffuse",
            RenderKind::Metal => "_metal",
            RenderKind::Glass => "_glass",
            RenderKind::Emit => "_emit",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "diffuse" => Some(RenderKind::Diffuse),
            "metal" => Some(RenderKind::Metal),
            "glass" => Some(RenderKind::Glass),
            "emit" => Some(RenderKind::Emit),
            _ => None,
        }
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_vox_type()[1..])
    }
}

/// Render parameters; `None` means the parameter is not written
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderMaterial {
    pub kind: RenderKind,
    pub rough: Option<f32>,
    pub spec: Option<f32>,
    pub ior: Option<f32>,
    pub alpha: Option<f32>,
    pub trans: Option<f32>,
    pub emit: Option<f32>,
    pub flux: Option<f32>,
    pub ldr: Option<f32>,
    pub metal: Option<f32>,
}

impl RenderMaterial {
    /// `(key, value)` pairs for the `MATL` dictionary, `_type` first
    pub fn vox_properties(&self) -> Vec<(&'static str, String)> {
        let mut props = vec![("_type", self.kind.as_vox_type().to_string())];
        let optional = [
            ("_metal", self.metal),
            ("_rough", self.rough),
            ("_spec", self.spec),
            ("_ior", self.ior),
            ("_flux", self.flux),
            ("_emit", self.emit),
            ("_ldr", self.ldr),
            ("_trans", self.trans),
            ("_alpha", self.alpha),
        ];
        props.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v.to_string()))),
        );
        props
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialProfile {
    /// Physical tag such as `$TD_wood`; empty for untagged surfaces
    pub tag: String,
    pub render: RenderMaterial,
}

impl MaterialProfile {
    /// Profile for faces without a material
    pub fn unnamed() -> Self {
        Self {
            tag: String::new(),
            render: RenderMaterial {
                rough: Some(0.8),
                ..Default::default()
            },
        }
    }
}

/// Profiles keyed by material name; the empty name holds [`MaterialProfile::unnamed`]
pub type MaterialProfiles = BTreeMap<String, MaterialProfile>;

/// Overridable render property
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Property {
    Rough,
    Spec,
    Ior,
    Trans,
    Emission,
    Power,
    Ldr,
    Metal,
}

impl Property {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "rough" => Some(Property::Rough),
            "spec" => Some(Property::Spec),
            "ior" => Some(Property::Ior),
            "trans" => Some(Property::Trans),
            "emission" => Some(Property::Emission),
            "power" => Some(Property::Power),
            "ldr" => Some(Property::Ldr),
            "metal" => Some(Property::Metal),
            _ => None,
        }
    }

    fn apply(self, render: &mut RenderMaterial, value: f32) {
        match self {
            Property::Rough => render.rough = Some(value),
            Property::Spec => render.spec = Some(value),
            Property::Ior => render.ior = Some(value),
            Property::Trans => {
                render.trans = Some(value);
                render.alpha = Some(1.0 - value);
            }
            Property::Emission => render.emit = Some(value),
            Property::Power => render.flux = Some(value),
            Property::Ldr => render.ldr = Some(value),
            Property::Metal => render.metal = Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TagMapping {
    tag: String,
    kind: Option<RenderKind>,
}

/// Parsed `material:tag[:kind]` and `material:property:value` overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialOverrides {
    mappings: BTreeMap<String, TagMapping>,
    properties: BTreeMap<String, BTreeMap<Property, f32>>,
}

impl MaterialOverrides {
    /// Parse both override lists. Malformed entries are reported and skipped.
    pub fn parse<S: AsRef<str>>(maps: &[S], properties: &[S], reporter: &dyn Reporter) -> Self {
        let mut overrides = Self::default();
        for entry in maps {
            overrides.add_mapping(entry.as_ref(), reporter);
        }
        for entry in properties {
            overrides.add_property(entry.as_ref(), reporter);
        }
        overrides
    }

    fn add_mapping(&mut self, entry: &str, reporter: &dyn Reporter) {
        let parts: Vec<&str> = entry.split(':').collect();
        if parts.len() < 2 {
            reporter.warn(&format!("ignoring material mapping '{entry}': expected material:tag[:kind]"));
            return;
        }
        let kind = match parts.get(2) {
            Some(k) => match RenderKind::parse(k) {
                Some(kind) => Some(kind),
                None => {
                    reporter.warn(&format!("unknown render kind '{k}' in '{entry}', using diffuse"));
                    Some(RenderKind::Diffuse)
                }
            },
            None => None,
        };
        self.mappings.insert(
            parts[0].to_string(),
            TagMapping {
                tag: parts[1].to_string(),
                kind,
            },
        );
    }

    fn add_property(&mut self, entry: &str, reporter: &dyn Reporter) {
        let parts: Vec<&str> = entry.split(':').collect();
        let [material, name, value] = parts.as_slice() else {
            reporter.warn(&format!(
                "ignoring material property '{entry}': expected material:property:value"
            ));
            return;
        };
        let Some(property) = Property::parse(name) else {
            reporter.warn(&format!("unknown material property '{name}' in '{entry}'"));
            return;
        };
        let Ok(value) = value.trim().parse::<f32>() else {
            reporter.warn(&format!("invalid property value: {value}"));
            return;
        };
        self.properties
            .entry(material.to_string())
            .or_default()
            .insert(property, value);
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty() && self.properties.is_empty()
    }
}

/// Build a profile for every material plus the unnamed default
pub fn classify_materials(
    materials: &BTreeMap<String, MtlMaterial>,
    overrides: &MaterialOverrides,
    reporter: &dyn Reporter,
) -> MaterialProfiles {
    let mut profiles: MaterialProfiles = materials
        .iter()
        .map(|(name, mtl)| (name.clone(), classify(name, mtl, overrides)))
        .collect();
    profiles.insert(String::new(), MaterialProfile::unnamed());

    for (name, profile) in &profiles {
        reporter.info(&format!(
            "material '{name}' -> tag '{}' ({})",
            profile.tag, profile.render.kind
        ));
    }
    profiles
}

fn classify(name: &str, mtl: &MtlMaterial, overrides: &MaterialOverrides) -> MaterialProfile {
    // Step 1: explicit property overrides win over everything
    let mut render = RenderMaterial::default();
    if let Some(props) = overrides.properties.get(name) {
        for (&property, &value) in props {
            property.apply(&mut render, value);
        }
    }

    // Step 2: tag and render kind
    let tag = match overrides.mappings.get(name).filter(|m| m.tag != AUTO_TAG) {
        Some(mapping) => {
            render.kind = mapping.kind.unwrap_or(match mapping.tag.as_str() {
                "$TD_glass" => RenderKind::Glass,
                "$TD_metal" => RenderKind::Metal,
                _ => RenderKind::Diffuse,
            });
            mapping.tag.clone()
        }
        None => {
            render.kind = infer_kind(mtl, &render);
            infer_tag(name, render.kind).to_string()
        }
    };

    // Step 3: MTL-derived defaults for anything not overridden
    render.rough.get_or_insert((1.0 - mtl.ns / 1000.0).max(0.001));
    if render.spec.is_none() {
        render.spec = Some(mtl.ks.element_sum() / 3.0).filter(|&s| s > 0.0);
    }
    render.ior.get_or_insert(mtl.ni);
    if render.alpha.is_none() && mtl.d < 1.0 {
        render.alpha = Some(mtl.d);
    }
    if render.trans.is_none() && render.kind == RenderKind::Glass {
        render.trans = Some(1.0 - render.alpha.unwrap_or(mtl.d));
    }
    if render.emit.is_none() {
        render.emit = Some(mtl.ke.element_sum() / 3.0).filter(|&e| e > 0.0);
    }
    if render.flux.is_none() {
        render.flux = render.emit.map(|e| e * 4.0);
    }

    MaterialProfile { tag, render }
}

fn infer_kind(mtl: &MtlMaterial, render: &RenderMaterial) -> RenderKind {
    if render.emit.is_some_and(|e| e > 0.0) {
        RenderKind::Emit
    } else if mtl.d < 0.9 || render.trans.is_some_and(|t| t > 0.0) {
        RenderKind::Glass
    } else if render.metal.is_some_and(|m| m > 0.5) {
        RenderKind::Metal
    } else {
        RenderKind::Diffuse
    }
}

fn infer_tag(name: &str, kind: RenderKind) -> &'static str {
    let lower = name.to_lowercase();
    if kind == RenderKind::Glass {
        "$TD_glass"
    } else if kind == RenderKind::Metal || lower.contains("metal") {
        "$TD_metal"
    } else if lower.contains("wood") {
        "$TD_wood"
    } else if lower.contains("brick") || lower.contains("concrete") {
        "$TD_masonry"
    } else if lower.contains("vegetation") {
        "$TD_foliage"
    } else if lower.contains("carpet") {
        "$TD_plastic"
    } else {
        "$TD_metal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};
    use glam::Vec3;

    fn materials(list: Vec<MtlMaterial>) -> BTreeMap<String, MtlMaterial> {
        list.into_iter().map(|m| (m.name.clone(), m)).collect()
    }

    fn run(mtl: Vec<MtlMaterial>, maps: &[&str], props: &[&str]) -> MaterialProfiles {
        let reporter = MemoryReporter::new();
        let overrides = MaterialOverrides::parse(maps, props, &reporter);
        classify_materials(&materials(mtl), &overrides, &reporter)
    }

    #[test]
    fn test_unnamed_profile_always_present() {
        let profiles = run(vec![], &[], &[]);
        assert_eq!(profiles.len(), 1);
        let unnamed = &profiles[""];
        assert_eq!(unnamed.tag, "");
        assert_eq!(unnamed.render.kind, RenderKind::Diffuse);
        assert_eq!(unnamed.render.rough, Some(0.8));
    }

    #[test]
    fn test_tag_inferred_from_name() {
        let profiles = run(
            vec![
                MtlMaterial::new("OakWood"),
                MtlMaterial::new("red_brick"),
                MtlMaterial::new("vegetation_02"),
                MtlMaterial::new("Carpet"),
                MtlMaterial::new("plain"),
            ],
            &[],
            &[],
        );
        assert_eq!(profiles["OakWood"].tag, "$TD_wood");
        assert_eq!(profiles["red_brick"].tag, "$TD_masonry");
        assert_eq!(profiles["vegetation_02"].tag, "$TD_foliage");
        assert_eq!(profiles["Carpet"].tag, "$TD_plastic");
        assert_eq!(profiles["plain"].tag, "$TD_metal");
        assert_eq!(profiles["plain"].render.kind, RenderKind::Diffuse);
    }

    #[test]
    fn test_translucent_material_becomes_glass() {
        let mut window = MtlMaterial::new("window");
        window.d = 0.5;
        let profiles = run(vec![window], &[], &[]);
        let glass = &profiles["window"];
        assert_eq!(glass.tag, "$TD_glass");
        assert_eq!(glass.render.kind, RenderKind::Glass);
        assert_eq!(glass.render.alpha, Some(0.5));
        assert_eq!(glass.render.trans, Some(0.5));
    }

    #[test]
    fn test_mtl_defaults() {
        let mut mtl = MtlMaterial::new("lamp");
        mtl.ns = 250.0;
        mtl.ks = Vec3::splat(0.3);
        mtl.ke = Vec3::new(1.0, 1.0, 0.4);
        mtl.ni = 1.5;
        let profiles = run(vec![mtl], &[], &[]);
        let render = profiles["lamp"].render;
        assert_eq!(render.rough, Some(0.75));
        assert!((render.spec.unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(render.ior, Some(1.5));
        assert_eq!(render.alpha, None);
        assert!((render.emit.unwrap() - 0.8).abs() < 1e-6);
        assert!((render.flux.unwrap() - 3.2).abs() < 1e-5);
        // emission came from the MTL, not an override, so the kind stays diffuse
        assert_eq!(render.kind, RenderKind::Diffuse);
    }

    #[test]
    fn test_explicit_mapping_with_kind() {
        let profiles = run(
            vec![MtlMaterial::new("panel"), MtlMaterial::new("pane")],
            &["panel:$TD_hardmetal:metal", "pane:$TD_glass"],
            &[],
        );
        assert_eq!(profiles["panel"].tag, "$TD_hardmetal");
        assert_eq!(profiles["panel"].render.kind, RenderKind::Metal);
        assert_eq!(profiles["pane"].render.kind, RenderKind::Glass);
        assert_eq!(profiles["pane"].render.trans, Some(0.0));
    }

    #[test]
    fn test_auto_tag_mapping_still_infers() {
        let profiles = run(vec![MtlMaterial::new("wood_floor")], &["wood_floor:$TD_auto:metal"], &[]);
        assert_eq!(profiles["wood_floor"].tag, "$TD_wood");
        assert_eq!(profiles["wood_floor"].render.kind, RenderKind::Diffuse);
    }

    #[test]
    fn test_property_overrides_win() {
        let profiles = run(
            vec![MtlMaterial::new("neon"), MtlMaterial::new("steel")],
            &[],
            &["neon:emission:2.0", "neon:rough:0.1", "steel:metal:0.9", "steel:trans:0.25"],
        );
        let neon = profiles["neon"].render;
        assert_eq!(neon.kind, RenderKind::Emit);
        assert_eq!(neon.rough, Some(0.1));
        assert_eq!(neon.flux, Some(8.0));

        // trans > 0 outranks metal in inference
        let steel = profiles["steel"].render;
        assert_eq!(steel.kind, RenderKind::Glass);
        assert_eq!(steel.trans, Some(0.25));
        assert_eq!(steel.alpha, Some(0.75));
    }

    #[test]
    fn test_malformed_overrides_are_reported() {
        let reporter = MemoryReporter::new();
        let overrides = MaterialOverrides::parse(
            &["justname", "a:$TD_wood:plasma"],
            &["a:rough", "a:rough:abc", "a:shine:1"],
            &reporter,
        );
        assert_eq!(reporter.at(Level::Warn).len(), 5);
        assert!(!overrides.is_empty());
        assert_eq!(overrides.mappings["a"].kind, Some(RenderKind::Diffuse));
        assert!(overrides.properties.is_empty());
    }

    #[test]
    fn test_vox_properties_skip_unset() {
        let render = RenderMaterial {
            kind: RenderKind::Glass,
            rough: Some(0.5),
            trans: Some(0.3),
            ..Default::default()
        };
        let props = render.vox_properties();
        assert_eq!(props[0], ("_type", "_glass".to_string()));
        assert_eq!(props.len(), 3);
        assert!(props.contains(&("_rough", "0.5".to_string())));
    }
}
