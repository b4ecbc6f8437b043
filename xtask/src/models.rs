//! Generators for the sample models the desktop app loads by default.
//!
//! Output uses the right-handed, counter-clockwise convention the loader
//! converts from.

use std::f32::consts::PI;
use std::fmt::Write as _;

/// UV sphere of radius 1 made of quads.
pub fn sphere(rings: u32, segments: u32) -> String {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let mut out = String::from("# generated sphere\n");
    for r in 0..=rings {
        let theta = PI * r as f32 / rings as f32;
        for s in 0..=segments {
            let phi = 2.0 * PI * s as f32 / segments as f32;
            let (x, y, z) = (theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            let _ = writeln!(out, "v {x:.5} {y:.5} {z:.5}");
            let _ = writeln!(out, "vn {x:.5} {y:.5} {z:.5}");
            let _ = writeln!(
                out,
                "vt {:.5} {:.5}",
                s as f32 / segments as f32,
                1.0 - r as f32 / rings as f32
            );
        }
    }
    let stride = segments + 1;
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s + 1;
            let b = a + stride;
            let _ = writeln!(
                out,
                "f {a}/{a}/{a} {}/{}/{} {}/{}/{} {b}/{b}/{b}",
                a + 1,
                a + 1,
                a + 1,
                b + 1,
                b + 1,
                b + 1
            );
        }
    }
    out
}

/// Axis-aligned box centred on the origin, one quad per face.
pub fn cuboid(half: [f32; 3]) -> String {
    // (normal axis, sign); tangents chosen so u x v points along the normal.
    const FACES: [(usize, f32, usize, usize); 6] = [
        (0, 1.0, 1, 2),
        (0, -1.0, 2, 1),
        (1, 1.0, 2, 0),
        (1, -1.0, 0, 2),
        (2, 1.0, 0, 1),
        (2, -1.0, 1, 0),
    ];
    const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut out = String::from("# generated box\n");
    for (u, v) in CORNERS {
        let _ = writeln!(out, "vt {} {}", (u + 1.0) / 2.0, (v + 1.0) / 2.0);
    }
    for (face, &(axis, sign, tu, tv)) in FACES.iter().enumerate() {
        let mut normal = [0.0f32; 3];
        normal[axis] = sign;
        let _ = writeln!(out, "vn {} {} {}", normal[0], normal[1], normal[2]);
        for (u, v) in CORNERS {
            let mut p = [0.0f32; 3];
            p[axis] = sign * half[axis];
            p[tu] = u * half[tu];
            p[tv] = v * half[tv];
            let _ = writeln!(out, "v {} {} {}", p[0], p[1], p[2]);
        }
        let base = face * 4;
        let n = face + 1;
        let _ = writeln!(
            out,
            "f {}/1/{n} {}/2/{n} {}/3/{n} {}/4/{n}",
            base + 1,
            base + 2,
            base + 3,
            base + 4
        );
    }
    out
}
