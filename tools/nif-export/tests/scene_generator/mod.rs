//! Builders for `*.nif.json` scene dumps used by the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;

/// Geometry block with `vertex_count` positions on a line and a triangle fan
pub fn shape(name: &str, vertex_count: usize, triangle_count: usize) -> Value {
    let vertices: Vec<[f32; 3]> = (0..vertex_count)
        .map(|i| [i as f32, (i % 3) as f32, -(i as f32) * 0.5])
        .collect();
    let triangles: Vec<[u16; 3]> = (0..triangle_count)
        .map(|i| {
            let i = i as u16;
            [0, i + 1, i + 2]
        })
        .collect();

    json!({
        "type": "NiTriShape",
        "name": name,
        "data": {
            "vertices": vertices,
            "normals": vec![[0.0, 0.0, 1.0]; vertex_count],
            "triangles": triangles,
        }
    })
}

/// Same as [`shape`] with shader and alpha properties attached
pub fn shape_with_properties(
    name: &str,
    textures: &[&str],
    alpha: Option<(u16, u8)>,
) -> Value {
    let mut block = shape(name, 4, 2);
    block["shader_property"] = json!({
        "glossiness": 128.0,
        "textures": textures,
    });
    if let Some((flags, threshold)) = alpha {
        block["alpha_property"] = json!({ "flags": flags, "threshold": threshold });
    }
    block
}

pub fn node(name: &str, translation: [f32; 3], children: Vec<Value>) -> Value {
    json!({
        "type": "NiNode",
        "name": name,
        "transform": {
            "translation": translation,
            "rotation": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            "scale": 1.0,
        },
        "children": children,
    })
}

pub fn scene(roots: Vec<Value>) -> Value {
    json!({ "roots": roots })
}

pub fn write_scene(path: &Path, scene: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create scene dir");
    std::fs::write(path, serde_json::to_vec_pretty(scene).unwrap())
        .expect("Failed to write scene");
}
