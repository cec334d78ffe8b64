//! Integration tests for chainmesh-export
//!
//! Tests the full pipeline: generate OBJ -> run the CLI -> decode and verify output

mod generate_test_assets;

use std::path::Path;
use std::process::{Command, Output};

use chainmesh_export::mesh::parse_obj;
use chainmesh_format::{decode_face_stream, MeshBlob, MeshInfoHeader};
use tempfile::tempdir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chainmesh-export"))
        .args(args)
        .output()
        .expect("Failed to run chainmesh-export")
}

fn run_ok(args: &[&str]) -> Output {
    let output = run(args);
    assert!(
        output.status.success(),
        "chainmesh-export {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 temp path")
}

/// Triangles as position triples, rotated to a canonical start and sorted
fn canonical_triangles(triangles: impl Iterator<Item = [[f32; 3]; 3]>) -> Vec<[[i64; 3]; 3]> {
    let mut out: Vec<[[i64; 3]; 3]> = triangles
        .map(|t| t.map(|p| p.map(|c| (c * 1000.0).round() as i64)))
        .map(|t| {
            let k = (0..3).min_by_key(|&i| t[i]).unwrap();
            [t[k], t[(k + 1) % 3], t[(k + 2) % 3]]
        })
        .collect();
    out.sort();
    out
}

fn source_triangles(obj: &Path) -> Vec<[[i64; 3]; 3]> {
    let text = std::fs::read_to_string(obj).unwrap();
    let mesh = parse_obj(text.as_bytes()).unwrap();
    let vertices = &mesh.attributes.vertices;
    canonical_triangles(
        mesh.objects
            .iter()
            .flat_map(|o| &o.triangles)
            .map(|t| t.map(|c| vertices[c.vertex as usize])),
    )
}

fn decoded_triangles(blob: &MeshBlob) -> Vec<[[i64; 3]; 3]> {
    let chains = decode_face_stream(&blob.faces, blob.header.layout()).unwrap();
    canonical_triangles(
        chains
            .iter()
            .flat_map(|c| &c.triangles)
            .map(|t| t.map(|c| blob.vertices[c.vertex as usize])),
    )
}

/// Test OBJ (v/vt/vn) -> binary mesh, decoded back to the same triangles
#[test]
fn test_cube_obj_to_bin() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("cube.obj");
    let bin_path = dir.path().join("cube.bin");

    generate_test_assets::generate_cube_obj(&obj_path).expect("Failed to generate OBJ");
    run_ok(&["convert", path_str(&obj_path), "-f", "bin"]);
    assert!(bin_path.exists(), "default output should sit next to the input");

    let data = std::fs::read(&bin_path).expect("Failed to read mesh file");
    let blob = MeshBlob::from_bytes(&data).expect("Invalid mesh blob");
    let header = blob.header;
    assert_eq!(header.vertex_count, 8);
    assert_eq!(header.texcoord_count, 4);
    assert_eq!(header.normal_count, 6);
    assert_eq!(header.triangle_count, 12);
    assert_eq!(
        data.len(),
        MeshInfoHeader::SIZE + header.faces_offset as usize + header.face_word_count as usize * 2
    );

    // Every decoded index is inside its array
    let chains = decode_face_stream(&blob.faces, header.layout()).unwrap();
    for corner in chains.iter().flat_map(|c| &c.triangles).flatten() {
        assert!((corner.vertex as u32) < header.vertex_count);
        assert!((corner.texcoord.unwrap() as u32) < header.texcoord_count);
        assert!((corner.normal.unwrap() as u32) < header.normal_count);
    }

    assert_eq!(decoded_triangles(&blob), source_triangles(&obj_path));
}

/// A grid chains well and replays attribute indices in first-use order
#[test]
fn test_grid_chains_in_first_use_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("grid.obj");
    let bin_path = dir.path().join("out").join("grid.bin");

    generate_test_assets::generate_grid_obj(&obj_path, 8).expect("Failed to generate OBJ");
    run_ok(&[
        "convert",
        path_str(&obj_path),
        "-o",
        path_str(&bin_path),
        "-f",
        "bin",
        "--normalize",
    ]);

    let blob = MeshBlob::from_bytes(&std::fs::read(&bin_path).unwrap()).unwrap();
    assert_eq!(blob.header.triangle_count, 128);
    assert_eq!(blob.header.bounds, [-1.0, 1.0, -1.0, 1.0, 0.0, 0.0]);

    let chains = decode_face_stream(&blob.faces, blob.header.layout()).unwrap();
    assert!(chains.len() < 128, "expected some chaining, got {} chains", chains.len());

    // Seeds introduce three corners, chained triangles one
    let mut next = 0;
    for chain in &chains {
        let seed = chain.triangles[0];
        let new_corners = seed
            .iter()
            .chain(chain.triangles[1..].iter().map(|t| &t[2]));
        for corner in new_corners {
            assert!(corner.vertex <= next, "index {} before {}", corner.vertex, next);
            if corner.vertex == next {
                next += 1;
            }
        }
    }
    assert_eq!(next as u32, blob.header.vertex_count);

    for p in &blob.vertices {
        assert!(p.iter().all(|c| (-1.0..=1.0).contains(c)));
    }
}

/// Multi-object models render as linked text records and are refused as binary
#[test]
fn test_two_objects() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("pair.obj");
    let h_path = dir.path().join("pair.h");
    let bin_path = dir.path().join("pair.bin");

    generate_test_assets::generate_two_object_obj(&obj_path).expect("Failed to generate OBJ");

    run_ok(&["convert", path_str(&obj_path)]);
    let text = std::fs::read_to_string(&h_path).expect("Failed to read header");
    assert!(text.contains("const uint16_t pair_1_face[8] PROGMEM"));
    assert!(text.contains("const uint16_t pair_2_face[8] PROGMEM"));
    assert!(text.contains("&pair_2, // next mesh to draw after this one"));
    assert!(text.contains("(tagged [o first])"));
    assert!(text.contains("(tagged [o second])"));

    let output = run(&["convert", path_str(&obj_path), "-f", "bin"]);
    assert!(!output.status.success());
    assert!(!bin_path.exists(), "no partial output on failure");
}

/// C variant uses flat float arrays
#[test]
fn test_c_variant() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("cube.obj");
    let h_path = dir.path().join("box.h");

    generate_test_assets::generate_cube_obj(&obj_path).expect("Failed to generate OBJ");
    run_ok(&[
        "convert",
        path_str(&obj_path),
        "-f",
        "c",
        "-n",
        "box",
        "-o",
        path_str(&h_path),
    ]);

    let text = std::fs::read_to_string(&h_path).unwrap();
    assert!(text.contains("const __in_flash() float box_vert_array[24] = "));
    assert!(text.contains("const __in_flash() float box_tex_array[8] = "));
    assert!(text.contains("const __in_flash() float box_norm_array[18] = "));
    assert!(text.contains("const __in_flash() Mesh3D box = "));
    assert!(!text.contains("tgx"));
}

/// 40000 referenced vertices do not fit the 15-bit vertex index
#[test]
fn test_too_many_vertices() {
    let dir = tempdir().expect("Failed to create temp dir");
    let obj_path = dir.path().join("big.obj");
    let bin_path = dir.path().join("big.bin");

    generate_test_assets::generate_strip_obj(&obj_path, 40000).expect("Failed to generate OBJ");
    let output = run(&["convert", path_str(&obj_path), "-f", "bin"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too many vertices"), "stderr: {stderr}");
    assert!(!bin_path.exists());
}

/// Manifest build writes every model; check validates without writing
#[test]
fn test_manifest_build_and_check() {
    let dir = tempdir().expect("Failed to create temp dir");
    generate_test_assets::generate_cube_obj(&dir.path().join("cube.obj")).unwrap();
    generate_test_assets::generate_two_object_obj(&dir.path().join("pair.obj")).unwrap();

    let manifest_path = dir.path().join("chainmesh.toml");
    std::fs::write(
        &manifest_path,
        r#"
[output]
dir = "generated"

[[models]]
id = "cube"
path = "cube.obj"
format = "bin"
normalize = true

[[models.objects]]
color = [1.0, 0.0, 0.0]
lighting = [0.2, 0.5, 0.3, 8]

[[models]]
id = "pair"
path = "pair.obj"
format = "c"
"#,
    )
    .unwrap();

    run_ok(&["check", path_str(&manifest_path)]);
    assert!(!dir.path().join("generated").exists());

    run_ok(&["build", path_str(&manifest_path)]);
    let cube = dir.path().join("generated").join("cube.bin");
    let pair = dir.path().join("generated").join("pair.h");
    assert!(pair.exists());

    let blob = MeshBlob::from_bytes(&std::fs::read(&cube).unwrap()).unwrap();
    assert_eq!(blob.header.color, [1.0, 0.0, 0.0]);
    assert_eq!(blob.header.lighting, [0.2, 0.5, 0.3, 8.0]);

    let info = run_ok(&["info", path_str(&cube)]);
    let stdout = String::from_utf8_lossy(&info.stdout);
    assert!(stdout.contains("triangles  : 12"), "stdout: {stdout}");
}

/// Invalid manifests are rejected by check
#[test]
fn test_manifest_check_rejects_bad_id() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest_path = dir.path().join("chainmesh.toml");
    std::fs::write(
        &manifest_path,
        r#"
[[models]]
id = "not-an-identifier"
path = "x.obj"
"#,
    )
    .unwrap();

    let output = run(&["check", path_str(&manifest_path)]);
    assert!(!output.status.success());
}
