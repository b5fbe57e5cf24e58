//! Minimal OBJ parser: `v`/`vn`/`f` lines only.
//!
//! `vn` is parsed (so malformed files still fail loudly on a bad float) but
//! discarded — the renderer derives flat per-triangle normals from winding,
//! it does not shade with vertex normals.

use glam::Vec3;

/// A face referencing positions by 1-based OBJ index, already split on `/`.
/// `>3` vertices are fan-triangulated by the caller.
#[derive(Debug, Clone)]
pub struct RawMesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<Vec<i64>>,
}

/// A single triangle's three (0-based) position indices.
#[derive(Debug, Clone, Copy)]
pub struct MeshTriangle {
    pub indices: [usize; 3],
}

#[derive(Debug, Clone)]
pub enum FaceWarning {
    /// Face had fewer than 3 vertices and was skipped.
    TooFewVertices { line: usize },
    /// A vertex index referenced a position outside the parsed range.
    IndexOutOfRange { line: usize, index: i64 },
}

/// A malformed OBJ line: the 1-based source line and why it was rejected.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

/// Parse the OBJ subset described in the manifest format: `v x y z`,
/// `vn x y z` (parsed, unused), and `f a/b/c ...` with `b`/`c` optional.
pub fn parse_obj(src: &str) -> Result<RawMesh, ParseError> {
    let mut positions = Vec::new();
    let mut faces = Vec::new();

    for (line_no, raw_line) in src.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else { continue };
        let line_num = line_no + 1;

        match tag {
            "v" => {
                let coords: Vec<f32> = tokens
                    .map(|t| t.parse::<f32>())
                    .collect::<Result<_, _>>()
                    .map_err(|e| ParseError { line: line_num, reason: format!("bad vertex float: {e}") })?;
                if coords.len() < 3 {
                    return Err(ParseError { line: line_num, reason: "`v` needs 3 components".to_string() });
                }
                positions.push(Vec3::new(coords[0], coords[1], coords[2]));
            }
            "vn" => {
                // Parsed for format validity; normals are not retained.
                for t in tokens {
                    t.parse::<f32>()
                        .map_err(|e| ParseError { line: line_num, reason: format!("bad normal float: {e}") })?;
                }
            }
            "f" => {
                let mut idxs = Vec::new();
                for tok in tokens {
                    // "v", "v/vt", "v/vt/vn", "v//vn"
                    let v_str = tok.split('/').next().unwrap_or(tok);
                    let v: i64 = v_str
                        .parse()
                        .map_err(|e| ParseError { line: line_num, reason: format!("bad face index: {e}") })?;
                    idxs.push(v);
                }
                faces.push(idxs);
            }
            _ => {}
        }
    }

    Ok(RawMesh { positions, faces })
}

impl RawMesh {
    /// Resolve an OBJ 1-based (or negative, relative-to-end) index into a
    /// 0-based position index.
    fn resolve_index(&self, raw: i64) -> Option<usize> {
        let n = self.positions.len() as i64;
        let resolved = if raw > 0 { raw - 1 } else { n + raw };
        if resolved >= 0 && resolved < n {
            Some(resolved as usize)
        } else {
            None
        }
    }

    /// Triangulate all faces by fan triangulation from the first vertex.
    /// Faces with fewer than 3 vertices, or referencing an out-of-range
    /// index, are skipped and reported as a warning rather than failing
    /// the whole mesh.
    pub fn triangulate(&self) -> (Vec<MeshTriangle>, Vec<FaceWarning>) {
        let mut tris = Vec::new();
        let mut warnings = Vec::new();

        for (face_no, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                warnings.push(FaceWarning::TooFewVertices { line: face_no });
                continue;
            }

            let mut resolved = Vec::with_capacity(face.len());
            let mut bad = false;
            for &raw in face {
                match self.resolve_index(raw) {
                    Some(i) => resolved.push(i),
                    None => {
                        warnings.push(FaceWarning::IndexOutOfRange {
                            line: face_no,
                            index: raw,
                        });
                        bad = true;
                        break;
                    }
                }
            }
            if bad {
                continue;
            }

            // Fan triangulation from the first vertex.
            for i in 1..resolved.len() - 1 {
                tris.push(MeshTriangle {
                    indices: [resolved[0], resolved[i], resolved[i + 1]],
                });
            }
        }

        (tris, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_triangle() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(obj).unwrap();
        assert_eq!(mesh.positions.len(), 3);
        let (tris, warnings) = mesh.triangulate();
        assert_eq!(tris.len(), 1);
        assert!(warnings.is_empty());
        assert_eq!(tris[0].indices, [0, 1, 2]);
    }

    #[test]
    fn fan_triangulates_quad() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(obj).unwrap();
        let (tris, _) = mesh.triangulate();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0].indices, [0, 1, 2]);
        assert_eq!(tris[1].indices, [0, 2, 3]);
    }

    #[test]
    fn vt_slot_may_be_empty() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n";
        let mesh = parse_obj(obj).unwrap();
        let (tris, warnings) = mesh.triangulate();
        assert_eq!(tris.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn out_of_range_index_skips_face_not_whole_mesh() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 99\nf 1 2 3\n";
        let mesh = parse_obj(obj).unwrap();
        let (tris, warnings) = mesh.triangulate();
        assert_eq!(tris.len(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn negative_indices_are_relative_to_end() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse_obj(obj).unwrap();
        let (tris, warnings) = mesh.triangulate();
        assert!(warnings.is_empty());
        assert_eq!(tris[0].indices, [0, 1, 2]);
    }
}
