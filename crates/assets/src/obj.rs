use crate::dedup::VertexDedup;
use gallery_common::{SimpleMesh, Vertex};
use glam::{Vec2, Vec3};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Errors from model loading.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed `{directive}` directive: {reason}")]
    Malformed {
        line: usize,
        directive: String,
        reason: String,
    },
    #[error("line {line}: {kind} index {index} out of range ({len} defined)")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: u32,
        len: usize,
    },
}

/// Counters gathered while parsing one model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub positions: usize,
    pub normals: usize,
    pub uvs: usize,
    pub triangles: usize,
    pub quads: usize,
    pub skipped_lines: usize,
    pub reused_vertices: usize,
    pub vertices: usize,
    pub indices: usize,
}

/// Load a model file from disk.
pub fn load_obj(path: impl AsRef<Path>) -> Result<SimpleMesh, ModelError> {
    load_obj_with_stats(path).map(|(mesh, _)| mesh)
}

/// Load a model file from disk and report parse counters alongside the mesh.
pub fn load_obj_with_stats(path: impl AsRef<Path>) -> Result<(SimpleMesh, LoadStats), ModelError> {
    let path = path.as_ref();
    let _span = tracing::info_span!("load_obj", path = %path.display()).entered();

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ModelError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ModelError::Io(e),
    })?;

    let (mesh, stats) = parse_obj(BufReader::new(file))?;
    tracing::info!(
        vertices = stats.vertices,
        indices = stats.indices,
        reused = stats.reused_vertices,
        "model loaded"
    );
    Ok((mesh, stats))
}

/// Parse model text held in memory.
pub fn parse_obj_str(source: &str) -> Result<SimpleMesh, ModelError> {
    parse_obj(source.as_bytes()).map(|(mesh, _)| mesh)
}

/// Parse model text line by line from any buffered reader.
pub fn parse_obj(reader: impl BufRead) -> Result<(SimpleMesh, LoadStats), ModelError> {
    let mut parser = ObjParser::default();
    for (i, line) in reader.lines().enumerate() {
        parser.line(i + 1, &line?)?;
    }
    Ok(parser.finish())
}

#[derive(Default)]
struct ObjParser {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    dedup: VertexDedup,
    stats: LoadStats,
}

/// One `position/uv/normal` face reference, already zero-based.
#[derive(Debug, Clone, Copy)]
struct FaceRef {
    position: u32,
    uv: u32,
    normal: u32,
}

impl ObjParser {
    fn line(&mut self, line: usize, text: &str) -> Result<(), ModelError> {
        let mut tokens = text.split_whitespace();
        let Some(directive) = tokens.next() else {
            return Ok(());
        };
        let args: Vec<&str> = tokens.collect();

        match directive {
            "v" => {
                let [x, y, z] = floats::<3>(line, directive, &args)?;
                self.positions.push(Vec3::new(x, y, -z));
            }
            "vn" => {
                let [x, y, z] = floats::<3>(line, directive, &args)?;
                self.normals.push(Vec3::new(x, y, -z));
            }
            "vt" => {
                let [u, v] = floats::<2>(line, directive, &args)?;
                self.uvs.push(Vec2::new(u, 1.0 - v));
            }
            "f" => self.face(line, &args)?,
            other => {
                tracing::trace!(line, directive = other, "skipping directive");
                self.stats.skipped_lines += 1;
            }
        }
        Ok(())
    }

    fn face(&mut self, line: usize, args: &[&str]) -> Result<(), ModelError> {
        let refs = args
            .iter()
            .map(|token| face_ref(line, token))
            .collect::<Result<Vec<_>, _>>()?;

        // Corners are emitted last-to-first to flip the winding; a quad fans
        // out from its last corner.
        let order: &[usize] = match refs.len() {
            3 => {
                self.stats.triangles += 1;
                &[0, 2, 1]
            }
            4 => {
                self.stats.quads += 1;
                &[3, 2, 1, 3, 1, 0]
            }
            n => {
                return Err(malformed(
                    line,
                    "f",
                    format!("expected 3 or 4 vertex references, found {n}"),
                ));
            }
        };

        let corners = refs
            .iter()
            .map(|r| self.resolve(line, *r))
            .collect::<Result<Vec<_>, _>>()?;
        for &corner in order {
            self.dedup.push(corners[corner]);
        }
        Ok(())
    }

    fn resolve(&self, line: usize, r: FaceRef) -> Result<Vertex, ModelError> {
        let position = lookup(line, "position", &self.positions, r.position)?;
        let normal = lookup(line, "normal", &self.normals, r.normal)?;
        let uv = lookup(line, "uv", &self.uvs, r.uv)?;
        Ok(Vertex::new(position, normal, uv))
    }

    fn finish(self) -> (SimpleMesh, LoadStats) {
        let mut stats = self.stats;
        stats.positions = self.positions.len();
        stats.normals = self.normals.len();
        stats.uvs = self.uvs.len();
        stats.reused_vertices = self.dedup.reused();
        let mesh = self.dedup.finish();
        stats.vertices = mesh.vertices.len();
        stats.indices = mesh.indices.len();
        (mesh, stats)
    }
}

fn malformed(line: usize, directive: &str, reason: impl Into<String>) -> ModelError {
    ModelError::Malformed {
        line,
        directive: directive.to_string(),
        reason: reason.into(),
    }
}

fn floats<const N: usize>(line: usize, directive: &str, args: &[&str]) -> Result<[f32; N], ModelError> {
    if args.len() != N {
        return Err(malformed(
            line,
            directive,
            format!("expected {N} numbers, found {}", args.len()),
        ));
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(args) {
        let value: f32 = token
            .parse()
            .map_err(|_| malformed(line, directive, format!("`{token}` is not a number")))?;
        if !value.is_finite() {
            return Err(malformed(line, directive, format!("`{token}` is not finite")));
        }
        *slot = value;
    }
    Ok(out)
}

fn face_ref(line: usize, token: &str) -> Result<FaceRef, ModelError> {
    let parts: Vec<&str> = token.split('/').collect();
    let [p, t, n] = parts.as_slice() else {
        return Err(malformed(
            line,
            "f",
            format!("`{token}` is not a position/uv/normal reference"),
        ));
    };
    let index = |field: &str| -> Result<u32, ModelError> {
        match field.parse::<u32>() {
            Ok(i) if i >= 1 => Ok(i - 1),
            _ => Err(malformed(
                line,
                "f",
                format!("`{token}` needs three positive 1-based indices"),
            )),
        }
    };
    Ok(FaceRef {
        position: index(*p)?,
        uv: index(*t)?,
        normal: index(*n)?,
    })
}

fn lookup<T: Copy>(line: usize, kind: &'static str, items: &[T], index: u32) -> Result<T, ModelError> {
    items
        .get(index as usize)
        .copied()
        .ok_or(ModelError::IndexOutOfRange {
            line,
            kind,
            index: index + 1,
            len: items.len(),
        })
}
