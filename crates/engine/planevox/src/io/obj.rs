//! Wavefront OBJ/MTL reader on top of `tobj`
//!
//! Faces are loaded untriangulated so the original polygon edges survive;
//! [`Mesh::add_polygon`] does the fan triangulation. Texture coordinates are
//! read through their own index stream and checked before use.

use crate::error::{Error, Result};
use crate::mesh::{Mesh, MtlMaterial};
use crate::report::Reporter;
use glam::{Vec2, Vec3};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Read an OBJ and its material library.
///
/// A missing or unreadable MTL is a warning; a mesh without vertices or
/// faces is an error.
pub fn load_obj(path: &Path, reporter: &dyn Reporter) -> Result<Mesh> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mesh = read_obj(&mut BufReader::new(file), path, reporter)?;
    reporter.info(&format!(
        "loaded {}: {} materials, {} vertices, {} triangles",
        path.display(),
        mesh.materials.len(),
        mesh.vertices.len(),
        mesh.faces.len()
    ));
    Ok(mesh)
}

/// Read OBJ from `reader`; `path` labels errors and anchors `mtllib`.
pub fn read_obj<B: BufRead>(reader: &mut B, path: &Path, reporter: &dyn Reporter) -> Result<Mesh> {
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let (models, materials) = tobj::load_obj_buf(reader, &load_options(), |reference: &Path| {
        let mtl_path = base.join(reference);
        reporter.info(&format!("loading materials from {}", mtl_path.display()));
        tobj::load_mtl(&mtl_path)
    })
    .map_err(|source| Error::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(err) => {
            reporter.warn(&format!("cannot load material library: {err}"));
            Vec::new()
        }
    };

    let mut builder = MeshBuilder::default();
    for model in &models {
        builder.append(model, &materials, reporter)?;
    }
    let mut mesh = builder.mesh;
    mesh.materials = materials
        .iter()
        .map(|m| (m.name.clone(), convert_material(m, reporter)))
        .collect();
    mesh.validate()?;
    Ok(mesh)
}

pub fn load_mtl(path: &Path, reporter: &dyn Reporter) -> Result<BTreeMap<String, MtlMaterial>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    read_mtl(&mut BufReader::new(file), path, reporter)
}

/// Parse MTL from `reader`; `path` only labels errors.
pub fn read_mtl<B: BufRead>(
    reader: &mut B,
    path: &Path,
    reporter: &dyn Reporter,
) -> Result<BTreeMap<String, MtlMaterial>> {
    let (materials, _) = tobj::load_mtl_buf(reader).map_err(|source| Error::Obj {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(materials
        .iter()
        .map(|m| (m.name.clone(), convert_material(m, reporter)))
        .collect())
}

fn convert_material(source: &tobj::Material, reporter: &dyn Reporter) -> MtlMaterial {
    let mut material = MtlMaterial::new(source.name.as_str());
    if let Some(kd) = source.diffuse {
        material.kd = Vec3::from(kd);
    }
    if let Some(ks) = source.specular {
        material.ks = Vec3::from(ks);
    }
    if let Some(ns) = source.shininess {
        material.ns = ns;
    }
    if let Some(d) = source.dissolve {
        material.d = d;
    }
    if let Some(ni) = source.optical_density {
        material.ni = ni;
    }
    material.diffuse_map = source
        .diffuse_texture
        .as_ref()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(ke) = source.unknown_param.get("Ke") {
        match parse_vec3(ke) {
            Some(ke) => material.ke = ke,
            None => reporter.warn(&format!(
                "material '{}': ignoring malformed Ke '{ke}'",
                source.name
            )),
        }
    }
    material
}

fn parse_vec3(text: &str) -> Option<Vec3> {
    let values: Vec<f32> = text
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match values[..] {
        [x, y, z] => Some(Vec3::new(x, y, z)),
        _ => None,
    }
}

/// Merges `tobj` models into one [`Mesh`].
///
/// `tobj` reindexes positions per model, so vertices are shared again by
/// exact position to keep edges between materials connected.
#[derive(Default)]
struct MeshBuilder {
    mesh: Mesh,
    shared: HashMap<[u32; 3], usize>,
}

impl MeshBuilder {
    fn vertex(&mut self, position: Vec3) -> usize {
        let key = position.to_array().map(f32::to_bits);
        let vertices = &mut self.mesh.vertices;
        *self.shared.entry(key).or_insert_with(|| {
            vertices.push(position);
            vertices.len() - 1
        })
    }

    fn append(
        &mut self,
        model: &tobj::Model,
        materials: &[tobj::Material],
        reporter: &dyn Reporter,
    ) -> Result<()> {
        let source = &model.mesh;
        let material = source
            .material_id
            .and_then(|id| materials.get(id))
            .map(|m| m.name.clone())
            .unwrap_or_default();
        let local: Vec<usize> = source
            .positions
            .chunks_exact(3)
            .map(|p| self.vertex(Vec3::new(p[0], p[1], p[2])))
            .collect();
        let uvs = corner_uvs(model, reporter);

        let arities: Vec<u32> = if source.face_arities.is_empty() {
            vec![3; source.indices.len() / 3]
        } else {
            source.face_arities.clone()
        };
        let mut start = 0;
        for arity in arities {
            let end = start + arity as usize;
            let Some(indices) = source.indices.get(start..end) else {
                break;
            };
            if arity < 3 {
                reporter.warn(&format!(
                    "model '{}': face with fewer than 3 corners skipped",
                    model.name
                ));
                start = end;
                continue;
            }
            let corners = indices
                .iter()
                .map(|&i| {
                    local.get(i as usize).copied().ok_or(Error::VertexIndexOutOfRange {
                        face: self.mesh.faces.len(),
                        index: i64::from(i),
                        count: local.len(),
                    })
                })
                .collect::<Result<Vec<usize>>>()?;
            self.mesh.add_polygon(&corners, &uvs[start..end], &material)?;
            start = end;
        }
        Ok(())
    }
}

/// One UV per face corner; unresolvable references fall back to texcoord 0
fn corner_uvs(model: &tobj::Model, reporter: &dyn Reporter) -> Vec<Vec2> {
    let source = &model.mesh;
    let texcoords: Vec<Vec2> = source
        .texcoords
        .chunks_exact(2)
        .map(|t| Vec2::new(t[0], t[1]))
        .collect();
    let first = texcoords.first().copied().unwrap_or(Vec2::ZERO);

    if source.texcoord_indices.len() != source.indices.len() {
        if !texcoords.is_empty() {
            reporter.warn(&format!(
                "model '{}': {} of {} corners carry texcoords, using texcoord 0",
                model.name,
                source.texcoord_indices.len(),
                source.indices.len()
            ));
        }
        return vec![first; source.indices.len()];
    }

    source
        .texcoord_indices
        .iter()
        .map(|&t| match texcoords.get(t as usize) {
            Some(&uv) => uv,
            None => {
                reporter.warn(&format!(
                    "model '{}': texcoord index {t} out of range, using 0",
                    model.name
                ));
                first
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter, NullReporter};

    const QUAD: &str = "\
# unit quad
mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl Wood
f 1/1 2/2 3/3 4/4
";

    const QUAD_MTL: &str = "\
newmtl Wood
Kd 0.5 0.25 0.125
map_Kd wood.png
";

    fn read(source: &str) -> Result<Mesh> {
        read_obj(&mut source.as_bytes(), Path::new("test.obj"), &NullReporter)
    }

    #[test]
    fn test_load_quad_with_materials() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD).unwrap();
        std::fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let mesh = load_obj(&dir.path().join("quad.obj"), &NullReporter).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.polygon_edges.len(), 4);
        assert_eq!(mesh.faces[1].vertices, [0, 2, 3]);
        assert_eq!(mesh.faces[1].uvs[2], Vec2::new(0.0, 1.0));
        assert_eq!(mesh.faces[0].material, "Wood");

        let wood = &mesh.materials["Wood"];
        assert_eq!(wood.kd, Vec3::new(0.5, 0.25, 0.125));
        assert_eq!(wood.diffuse_map.as_deref(), Some("wood.png"));
    }

    #[test]
    fn test_missing_material_library_warns() {
        let reporter = MemoryReporter::new();
        let path = Path::new("/nowhere/quad.obj");
        let mesh = read_obj(&mut QUAD.as_bytes(), path, &reporter).unwrap();
        assert!(mesh.materials.is_empty());
        assert_eq!(mesh.faces[0].material, "");
        assert!(reporter.has(Level::Warn, "cannot load material library"));
    }

    #[test]
    fn test_models_share_vertices_by_position() {
        let source = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
o first
f 1 2 3
o second
f 1 3 4
";
        let mesh = read(source).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[0].vertices[0], mesh.faces[1].vertices[0]);
        assert_eq!(mesh.faces[0].vertices[2], mesh.faces[1].vertices[1]);
    }

    #[test]
    fn test_negative_indices() {
        let mesh = read("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5\nf -3/1 -2/1 -1/1\n").unwrap();
        let face = &mesh.faces[0];
        assert_eq!(face.vertices, [0, 1, 2]);
        assert_eq!(face.uvs, [Vec2::new(0.5, 0.5); 3]);
    }

    #[test]
    fn test_vertex_out_of_range_is_fatal() {
        let result = read("v 0 0 0\nv 1 0 0\nf 1 2 7\n");
        assert!(matches!(result, Err(Error::Obj { .. })));
    }

    #[test]
    fn test_no_faces_is_empty_mesh() {
        assert!(matches!(read("v 0 0 0\nv 1 0 0\n"), Err(Error::EmptyMesh)));
    }

    #[test]
    fn test_texcoord_out_of_range_warns() {
        let model = tobj::Model {
            mesh: tobj::Mesh {
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                texcoords: vec![0.25, 0.75],
                indices: vec![0, 1, 2],
                texcoord_indices: vec![0, 8, 0],
                ..Default::default()
            },
            name: "tri".to_string(),
        };
        let reporter = MemoryReporter::new();
        let mut builder = MeshBuilder::default();
        builder.append(&model, &[], &reporter).unwrap();

        assert_eq!(builder.mesh.faces[0].uvs[1], Vec2::new(0.25, 0.75));
        assert!(reporter.has(Level::Warn, "texcoord index 8"));
    }

    #[test]
    fn test_missing_texcoord_stream_falls_back() {
        let model = tobj::Model {
            mesh: tobj::Mesh {
                positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                texcoords: vec![0.5, 0.5],
                indices: vec![0, 1, 2],
                ..Default::default()
            },
            name: "tri".to_string(),
        };
        let reporter = MemoryReporter::new();
        let uvs = corner_uvs(&model, &reporter);
        assert_eq!(uvs, [Vec2::new(0.5, 0.5); 3]);
        assert!(reporter.has(Level::Warn, "0 of 3 corners"));
    }

    #[test]
    fn test_read_mtl() {
        let source = "\
newmtl Glass
Kd 0.2 0.4 0.6
d 0.5
Ni 1.5
Ke 0.1 0.2 0.3
newmtl Brick
map_Kd textures/brick.png
Ns 250
";
        let materials =
            read_mtl(&mut source.as_bytes(), Path::new("m.mtl"), &NullReporter).unwrap();
        assert_eq!(materials.len(), 2);
        let glass = &materials["Glass"];
        assert_eq!(glass.kd, Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(glass.d, 0.5);
        assert_eq!(glass.ni, 1.5);
        assert_eq!(glass.ke, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(glass.diffuse_map, None);
        let brick = &materials["Brick"];
        assert_eq!(brick.diffuse_map.as_deref(), Some("textures/brick.png"));
        assert_eq!(brick.ns, 250.0);
        assert_eq!(brick.kd, Vec3::ONE);
    }

    #[test]
    fn test_malformed_emission_warns() {
        let reporter = MemoryReporter::new();
        let source = "newmtl Lamp\nKe 1 bright\n";
        let materials = read_mtl(&mut source.as_bytes(), Path::new("m.mtl"), &reporter).unwrap();
        assert_eq!(materials["Lamp"].ke, Vec3::ZERO);
        assert!(reporter.has(Level::Warn, "malformed Ke"));
    }

    #[test]
    fn test_missing_mtl_file_is_io_error() {
        let result = load_mtl(Path::new("/nowhere/missing.mtl"), &NullReporter);
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
