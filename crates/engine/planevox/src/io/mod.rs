//! File formats around the engine: OBJ/MTL in, textures in, `.vox` and
//! scene XML out

pub mod obj;
pub mod scene_xml;
pub mod texture;
pub mod vox;

pub use obj::{load_mtl, load_obj, read_mtl, read_obj};
pub use scene_xml::{render_scene_xml, save_scene_xml, vox_file_reference, DEFAULT_VOX_MOUNT};
pub use texture::{decode_texture, find_texture_directory, ImageTextureSource};
pub use vox::{encode_vox, save_vox};
