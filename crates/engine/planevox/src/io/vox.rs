//! MagicaVoxel `.vox` scene writer
//!
//! The scene is assembled as a [`DotVoxData`] and serialized by `dot_vox`:
//!
//! ```text
//! "VOX " 150
//! MAIN
//!   SIZE / XYZI        one pair per chunk, z = 1
//!   nTRN 0 -> nGRP 1   scene root
//!   nTRN 2i+2 -> nSHP 2i+3 -> model i
//!   RGBA               file entry i holds palette[i + 1]
//!   MATL               one per tagged palette index
//!   LAYR 0             "default_layer"
//!   NOTE               32 tag groups, group 31 first
//! ```
//!
//! `dot_vox` has no NOTE support, so that chunk is appended after MAIN's
//! children and the MAIN size is patched to cover it.

use crate::chunk::VoxelChunk;
use crate::error::{Error, Result};
use crate::palette::{is_reserved, PaletteManager};
use dot_vox::{
    Color, Dict, DotVoxData, Frame, Layer, Material, Model, SceneNode, ShapeModel, Size, Voxel,
};
use std::path::Path;

pub const VOX_VERSION: u32 = 150;

const ROOT_GROUP: u32 = 1;
const NO_LAYER: u32 = u32::MAX;
const DEFAULT_LAYER: &str = "default_layer";

/// Byte range of MAIN's children size: magic, version, id, content size
const MAIN_CHILDREN_SIZE: std::ops::Range<usize> = 16..20;

/// Encode chunks and palette into the bytes of a `.vox` file
pub fn encode_vox(chunks: &[VoxelChunk], palette: &PaletteManager) -> Result<Vec<u8>> {
    if chunks.is_empty() {
        return Err(Error::NoChunks);
    }
    let mut out = Vec::new();
    build_scene(chunks, palette)
        .write_vox(&mut out)
        .map_err(Error::Encode)?;
    append_notes(&mut out, &palette.tag_groups());
    Ok(out)
}

/// Encode and write to `path`
pub fn save_vox(path: &Path, chunks: &[VoxelChunk], palette: &PaletteManager) -> Result<()> {
    let bytes = encode_vox(chunks, palette)?;
    std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

fn build_scene(chunks: &[VoxelChunk], palette: &PaletteManager) -> DotVoxData {
    let entries = palette.palette().entries();
    DotVoxData {
        version: VOX_VERSION,
        index_map: dot_vox::DEFAULT_INDEX_MAP.to_vec(),
        models: chunks.iter().map(model).collect(),
        palette: (0..256)
            .map(|i| {
                let c = entries[(i + 1) & 255];
                Color {
                    r: c.r,
                    g: c.g,
                    b: c.b,
                    a: c.a,
                }
            })
            .collect(),
        materials: palette
            .materials()
            .iter()
            .filter(|(&index, _)| !is_reserved(index))
            .map(|(&index, material)| Material {
                id: u32::from(index),
                properties: material
                    .vox_properties()
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            })
            .collect(),
        scenes: scene_graph(chunks),
        layers: vec![Layer {
            attributes: dict([("_name", DEFAULT_LAYER.to_string())]),
        }],
    }
}

fn model(chunk: &VoxelChunk) -> Model {
    let width = chunk.width();
    let voxels = chunk
        .voxels()
        .iter()
        .enumerate()
        .filter(|(_, &index)| index != 0)
        // Chunk extents never exceed 256, so coordinates fit in a byte
        .map(|(i, &index)| Voxel {
            x: (i % width) as u8,
            y: (i / width) as u8,
            z: 0,
            i: index - 1,
        })
        .collect();
    Model {
        size: Size {
            x: width as u32,
            y: chunk.height() as u32,
            z: 1,
        },
        voxels,
    }
}

/// Node ids are positions in the returned list
fn scene_graph(chunks: &[VoxelChunk]) -> Vec<SceneNode> {
    let mut nodes = vec![
        SceneNode::Transform {
            attributes: Dict::new(),
            frames: vec![Frame::new(Dict::new())],
            child: ROOT_GROUP,
            layer_id: NO_LAYER,
        },
        SceneNode::Group {
            attributes: Dict::new(),
            children: (0..chunks.len()).map(instance_transform_id).collect(),
        },
    ];
    for (i, chunk) in chunks.iter().enumerate() {
        let translation = format!("{} {} 0", chunk.position.x as i32, chunk.position.y as i32);
        nodes.push(SceneNode::Transform {
            attributes: dict([("_name", chunk.name().to_string())]),
            frames: vec![Frame::new(dict([("_t", translation)]))],
            child: instance_transform_id(i) + 1,
            layer_id: 0,
        });
        nodes.push(SceneNode::Shape {
            attributes: Dict::new(),
            models: vec![ShapeModel {
                model_id: i as u32,
                attributes: Dict::new(),
            }],
        });
    }
    nodes
}

fn instance_transform_id(instance: usize) -> u32 {
    2 + 2 * instance as u32
}

fn dict<const N: usize>(pairs: [(&str, String); N]) -> Dict {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Append a NOTE chunk to a serialized scene and grow MAIN to include it
fn append_notes(out: &mut Vec<u8>, groups: &[String]) {
    if groups.is_empty() {
        return;
    }
    let mut content = Vec::new();
    put_u32(&mut content, groups.len() as u32);
    for tag in groups {
        put_u32(&mut content, tag.len() as u32);
        content.extend_from_slice(tag.as_bytes());
    }

    let start = out.len();
    out.extend_from_slice(b"NOTE");
    put_u32(out, content.len() as u32);
    put_u32(out, 0);
    out.extend_from_slice(&content);

    let added = (out.len() - start) as u32;
    let size = &mut out[MAIN_CHILDREN_SIZE];
    let children = u32::from_le_bytes([size[0], size[1], size[2], size[3]]) + added;
    size.copy_from_slice(&children.to_le_bytes());
}

fn put_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}
