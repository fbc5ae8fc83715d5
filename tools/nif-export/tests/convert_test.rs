//! Integration tests for the `convert` worker
//!
//! Tests the full pipeline: write scene dump -> run nif-export -> parse the
//! written document with the gltf crate

mod scene_generator;

use std::path::{Path, PathBuf};
use tempfile::tempdir;

use scene_generator::{node, scene, shape, shape_with_properties, write_scene};

struct Layout {
    _dir: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Layout {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        Self {
            _dir: dir,
            input,
            output,
        }
    }

    fn scene_path(&self, name: &str) -> PathBuf {
        self.input.join("meshes").join("arch").join(format!("{name}.nif.json"))
    }

    fn document_dir(&self, name: &str) -> PathBuf {
        self.output.join("meshes").join("arch").join(name)
    }
}

fn run_convert(layout: &Layout, source: &Path, extra: &[&str]) -> bool {
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_nif-export"))
        .arg("convert")
        .arg(source)
        .arg(&layout.input)
        .arg(&layout.input)
        .arg(&layout.output)
        .args(extra)
        .status()
        .expect("Failed to run nif-export");
    status.success()
}

fn load(layout: &Layout, name: &str) -> (gltf::Gltf, Vec<u8>) {
    let dir = layout.document_dir(name);
    let gltf = gltf::Gltf::open(dir.join(format!("{name}.gltf"))).expect("Invalid glTF output");
    let bin = std::fs::read(dir.join(format!("{name}.bin"))).expect("Missing .bin output");
    (gltf, bin)
}

/// 10 vertices / 3 triangles without UVs or colors
#[test]
fn test_padding_and_default_attributes() {
    let layout = Layout::new();
    let source = layout.scene_path("crate");
    write_scene(&source, &scene(vec![node("Root", [0.0; 3], vec![shape("Box", 10, 3)])]));

    assert!(run_convert(&layout, &source, &[]), "nif-export convert failed");
    let (gltf, bin) = load(&layout, "crate");

    let buffer = gltf.buffers().next().unwrap();
    assert_eq!(buffer.length(), bin.len());

    let mesh = gltf.meshes().next().unwrap();
    assert_eq!(mesh.name(), Some("Box"));
    let primitive = mesh.primitives().next().unwrap();

    let position = primitive.get(&gltf::Semantic::Positions).unwrap();
    assert_eq!(position.count(), 12);
    let indices = primitive.indices().unwrap();
    assert_eq!(indices.count() % 12, 0);
    assert!(indices.count() >= 9);

    assert!(primitive.get(&gltf::Semantic::TexCoords(0)).is_some());
    assert!(primitive.get(&gltf::Semantic::Colors(0)).is_some());

    let reader = primitive.reader(|_| Some(&bin[..]));
    let positions: Vec<[f32; 3]> = reader.read_positions().unwrap().collect();
    // padding repeats the last source vertex
    assert_eq!(positions[10], positions[9]);
    assert_eq!(positions[11], [9.0, 0.0, -4.5]);

    let bounds = primitive.bounding_box();
    assert_eq!(bounds.min, [0.0, 0.0, -4.5]);
    assert_eq!(bounds.max, [9.0, 2.0, 0.0]);

    let uvs: Vec<[f32; 2]> = reader.read_tex_coords(0).unwrap().into_f32().collect();
    assert!(uvs.iter().all(|uv| *uv == [0.0, 0.0]));
    let colors: Vec<[f32; 4]> = reader.read_colors(0).unwrap().into_rgba_f32().collect();
    assert!(colors.iter().all(|c| *c == [1.0, 1.0, 1.0, 1.0]));
}

#[test]
fn test_views_cover_blob_without_overlap() {
    let layout = Layout::new();
    let source = layout.scene_path("pair");
    write_scene(
        &source,
        &scene(vec![node(
            "Root",
            [0.0; 3],
            vec![shape("A", 5, 2), shape("B", 13, 4)],
        )]),
    );

    assert!(run_convert(&layout, &source, &[]));
    let (gltf, bin) = load(&layout, "pair");

    let mut ranges: Vec<(usize, usize)> = gltf
        .views()
        .map(|view| (view.offset(), view.offset() + view.length()))
        .collect();
    ranges.sort();
    let mut cursor = 0;
    for (start, end) in ranges {
        assert_eq!(start, cursor, "views must be contiguous");
        cursor = end;
    }
    assert_eq!(cursor, bin.len());
    assert_eq!(gltf.meshes().count(), 2);
}

#[test]
fn test_alpha_test_becomes_mask() {
    let layout = Layout::new();
    let source = layout.scene_path("leaves");
    write_scene(
        &source,
        &scene(vec![node(
            "Root",
            [0.0; 3],
            vec![shape_with_properties("Leaves", &[], Some((1 << 9, 64)))],
        )]),
    );

    assert!(run_convert(&layout, &source, &[]));
    let (gltf, _) = load(&layout, "leaves");

    let material = gltf.materials().next().unwrap();
    assert_eq!(material.alpha_mode(), gltf::material::AlphaMode::Mask);
    let cutoff = material.alpha_cutoff().unwrap();
    assert!((cutoff - 0.251).abs() < 1e-3);
    assert!(material.double_sided());
}

#[test]
fn test_missing_alpha_property_is_opaque() {
    let layout = Layout::new();
    let source = layout.scene_path("wall");
    write_scene(
        &source,
        &scene(vec![node(
            "Root",
            [0.0; 3],
            vec![shape_with_properties("Wall", &[], None)],
        )]),
    );

    assert!(run_convert(&layout, &source, &["--unreal"]));
    let (gltf, _) = load(&layout, "wall");

    let material = gltf.materials().next().unwrap();
    assert_eq!(material.alpha_mode(), gltf::material::AlphaMode::Opaque);
    assert_eq!(material.alpha_cutoff(), None);
    assert!(!material.double_sided());
    let pbr = material.pbr_metallic_roughness();
    assert!((pbr.metallic_factor() - 0.001).abs() < 1e-6);
    assert!((pbr.roughness_factor() - 128.0 / 255.0).abs() < 1e-6);
}

#[test]
fn test_texture_uris_are_document_relative() {
    let layout = Layout::new();
    let source = layout.scene_path("door");
    write_scene(
        &source,
        &scene(vec![shape_with_properties(
            "Door",
            &[r"Textures\Arch\Door.DDS", r"textures\arch\door_n.dds"],
            None,
        )]),
    );

    assert!(run_convert(&layout, &source, &[]));
    let (gltf, _) = load(&layout, "door");

    let uris: Vec<String> = gltf
        .images()
        .map(|image| match image.source() {
            gltf::image::Source::Uri { uri, .. } => uri.to_string(),
            gltf::image::Source::View { .. } => panic!("expected external image"),
        })
        .collect();
    assert_eq!(
        uris,
        vec![
            "../../../textures/arch/door.png",
            "../../../textures/arch/door_n.png"
        ]
    );

    let material = gltf.materials().next().unwrap();
    assert!(material.pbr_metallic_roughness().base_color_texture().is_some());
    assert!(material.normal_texture().is_some());
    assert!(material.emissive_texture().is_none());
    assert_eq!(gltf.samplers().count(), 1);
}

#[test]
fn test_node_transforms_compose() {
    let layout = Layout::new();
    let source = layout.scene_path("tower");
    let mut child = shape("Top", 3, 1);
    child["transform"] = serde_json::json!({ "translation": [0.0, 0.0, 5.0] });
    write_scene(
        &source,
        &scene(vec![node(
            "Root",
            [10.0, 0.0, 0.0],
            vec![node("Floor", [0.0, 2.0, 0.0], vec![child])],
        )]),
    );

    assert!(run_convert(&layout, &source, &[]));
    let (gltf, _) = load(&layout, "tower");

    let node = gltf.nodes().next().unwrap();
    let (translation, _, scale) = node.transform().decomposed();
    assert_eq!(translation, [10.0, 2.0, 5.0]);
    assert_eq!(scale, [1.0, 1.0, 1.0]);
    assert_eq!(gltf.scenes().count(), 1);
    assert_eq!(gltf.scenes().next().unwrap().name(), Some("tower"));
}

#[test]
fn test_glb_output() {
    let layout = Layout::new();
    let source = layout.scene_path("rock");
    write_scene(&source, &scene(vec![shape("Rock", 7, 2)]));

    assert!(run_convert(&layout, &source, &["--glb"]));
    let path = layout.document_dir("rock").join("rock.glb");
    let bytes = std::fs::read(&path).expect("Missing .glb output");

    assert_eq!(&bytes[0..4], b"glTF");
    let gltf = gltf::Gltf::from_slice(&bytes).expect("Invalid GLB");
    let blob = gltf.blob.as_ref().expect("GLB should carry a BIN chunk");
    assert_eq!(gltf.buffers().next().unwrap().length(), blob.len());
    assert!(!layout.document_dir("rock").join("rock.bin").exists());
}

#[test]
fn test_scene_without_meshes_is_still_readable() {
    let layout = Layout::new();
    let source = layout.scene_path("cam");
    write_scene(
        &source,
        &scene(vec![serde_json::json!({ "type": "NiCamera", "name": "Cam" })]),
    );

    assert!(run_convert(&layout, &source, &[]));
    let dir = layout.document_dir("cam");
    let gltf = gltf::Gltf::open(dir.join("cam.gltf")).expect("Invalid empty glTF");
    assert_eq!(gltf.meshes().count(), 0);
    assert_eq!(gltf.buffers().count(), 0);
    assert!(!dir.join("cam.bin").exists());

    assert!(run_convert(&layout, &source, &["--glb"]));
    let bytes = std::fs::read(dir.join("cam.glb")).expect("Missing .glb output");
    let gltf = gltf::Gltf::from_slice(&bytes).expect("Invalid empty GLB");
    assert!(gltf.blob.is_none());
    assert_eq!(gltf.scenes().count(), 0);
}

#[test]
fn test_out_of_range_index_skips_mesh() {
    let layout = Layout::new();
    let source = layout.scene_path("torn");
    let mut broken = shape("Torn", 3, 1);
    broken["data"]["triangles"] = serde_json::json!([[0, 1, 40]]);
    write_scene(
        &source,
        &scene(vec![node("Root", [0.0; 3], vec![broken, shape("Intact", 3, 1)])]),
    );

    assert!(run_convert(&layout, &source, &[]));
    let (gltf, bin) = load(&layout, "torn");
    let names: Vec<_> = gltf.meshes().filter_map(|m| m.name().map(str::to_string)).collect();
    assert_eq!(names, vec!["Intact"]);

    let primitive = gltf.meshes().next().unwrap().primitives().next().unwrap();
    let vertex_count = primitive.get(&gltf::Semantic::Positions).unwrap().count();
    let reader = primitive.reader(|_| Some(&bin[..]));
    let indices: Vec<u32> = reader.read_indices().unwrap().into_u32().collect();
    assert!(indices.iter().all(|&i| (i as usize) < vertex_count));
}

#[test]
fn test_unreadable_scene_fails() {
    let layout = Layout::new();
    let source = layout.scene_path("broken");
    std::fs::create_dir_all(source.parent().unwrap()).unwrap();
    std::fs::write(&source, b"{ not json").unwrap();

    assert!(!run_convert(&layout, &source, &[]));
    assert!(!layout.document_dir("broken").exists());
}
