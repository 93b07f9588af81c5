//! Scene-graph XML that places every chunk in the editor
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <group name="obj_model" pos="0.0 0.0 0.0" rot="0.0 0.0 0.0">
//!     <vox file="MOD/vox/model.vox" object="plane_0_0" pos="..." rot="0 0 0" scale="1.000000"/>
//! </group>
//! ```

use crate::error::{Error, Result};
use crate::placement::Placement;
use std::fmt::Write as _;
use std::path::Path;

pub const ROOT_GROUP_NAME: &str = "obj_model";
/// Default mount point of `.vox` files inside a mod
pub const DEFAULT_VOX_MOUNT: &str = "MOD/vox";

/// `{mount}/{file name of vox_path}`
pub fn vox_file_reference(mount: &str, vox_path: &Path) -> String {
    let name = vox_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", mount.trim_end_matches('/'), name)
}

pub fn render_scene_xml(placements: &[Placement], file: &str) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<group name=\"{ROOT_GROUP_NAME}\" pos=\"0.0 0.0 0.0\" rot=\"0.0 0.0 0.0\">"
    );
    for placement in placements {
        let p = placement.position;
        let rot = match placement.yaw {
            Some(yaw) => format!("0 {yaw:.6} 0"),
            None => "0 0 0".to_string(),
        };
        let _ = writeln!(
            xml,
            "    <vox file=\"{}\" object=\"{}\" pos=\"{:.6} {:.6} {:.6}\" rot=\"{}\" scale=\"{:.6}\"/>",
            escape(file),
            escape(&placement.object),
            p.x,
            p.y,
            p.z,
            rot,
            placement.scale
        );
    }
    xml.push_str("</group>\n");
    xml
}

pub fn save_scene_xml(path: &Path, placements: &[Placement], file: &str) -> Result<()> {
    std::fs::write(path, render_scene_xml(placements, file)).map_err(|e| Error::io(path, e))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
