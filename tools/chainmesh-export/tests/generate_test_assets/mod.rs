//! OBJ generators for integration tests

use std::fmt::Write as _;
use std::path::Path;

/// Unit cube with per-face normals and texcoords (`v/vt/vn` corners)
pub fn generate_cube_obj(path: &Path) -> std::io::Result<()> {
    let mut obj = String::from("# cube\no cube\n");
    for x in [-1.0f32, 1.0] {
        for y in [-1.0f32, 1.0] {
            for z in [-1.0f32, 1.0] {
                let _ = writeln!(obj, "v {x} {y} {z}");
            }
        }
    }
    for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        let _ = writeln!(obj, "vt {u} {v}");
    }
    for n in ["-1 0 0", "1 0 0", "0 -1 0", "0 1 0", "0 0 -1", "0 0 1"] {
        let _ = writeln!(obj, "vn {n}");
    }
    // Counter-clockwise seen from outside; vertex index = 1 + 4x + 2y + z
    let faces = [
        ([1, 2, 4, 3], 1),
        ([5, 7, 8, 6], 2),
        ([1, 5, 6, 2], 3),
        ([3, 4, 8, 7], 4),
        ([1, 3, 7, 5], 5),
        ([2, 6, 8, 4], 6),
    ];
    for (corners, normal) in faces {
        obj.push('f');
        for (k, v) in corners.iter().enumerate() {
            let _ = write!(obj, " {}/{}/{}", v, k + 1, normal);
        }
        obj.push('\n');
    }
    std::fs::write(path, obj)
}

/// Flat `n x n` grid of quads in the XY plane, positions only
pub fn generate_grid_obj(path: &Path, n: usize) -> std::io::Result<()> {
    let mut obj = String::from("g grid\n");
    for j in 0..=n {
        for i in 0..=n {
            let _ = writeln!(obj, "v {} {} 0", i, j);
        }
    }
    let index = |i: usize, j: usize| j * (n + 1) + i + 1;
    for j in 0..n {
        for i in 0..n {
            let _ = writeln!(
                obj,
                "f {} {} {} {}",
                index(i, j),
                index(i + 1, j),
                index(i + 1, j + 1),
                index(i, j + 1)
            );
        }
    }
    std::fs::write(path, obj)
}

/// Two separate triangles in two named objects
pub fn generate_two_object_obj(path: &Path) -> std::io::Result<()> {
    let obj = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
v 2 0 0
v 3 0 0
v 2 1 0
f -3 -2 -1
";
    std::fs::write(path, obj)
}

/// Strip of `vertices - 2` triangles touching every one of `vertices` vertices
pub fn generate_strip_obj(path: &Path, vertices: usize) -> std::io::Result<()> {
    let mut obj = String::new();
    for i in 0..vertices {
        let _ = writeln!(obj, "v {} {} 0", i / 2, i % 2);
    }
    for i in 1..vertices - 1 {
        let _ = writeln!(obj, "f {} {} {}", i, i + 1, i + 2);
    }
    std::fs::write(path, obj)
}
