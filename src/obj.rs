//! Minimal line-oriented OBJ importer.
//!
//! Parses the `v`/`vn`/`f` subset. Face references are
//! `position[/texcoord][/normal]`; the texcoord component is accepted
//! and ignored. Triangles are emitted as-is, quads are fan-triangulated
//! as (v0,v1,v2),(v0,v2,v3), any other face size is skipped -- there is
//! no general N-gon triangulation. Output is always a flat, non-indexed
//! triangle list; memory is traded for parser simplicity.
//!
//! Missing normal references become zero placeholders. When a file
//! mixes real normals with missing ones the placeholders are replaced
//! by a fixed up vector after the pass. That is a lossy fallback and
//! not physically correct shading; the parser never fails over normals.

use crate::error::ObjError;
use crate::geometry::MeshData;

/// Fallback normal used when a file provides normals inconsistently.
const FALLBACK_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Parses OBJ text into a [`MeshData`].
///
/// Comment lines, blank lines, and unrecognized keywords are skipped
/// silently. Fails only on malformed numeric tokens or face references
/// outside the vertex tables; nothing partial is returned on error.
pub fn parse_obj(text: &str) -> Result<MeshData, ObjError> {
    // OBJ face indices are 1-based, so slot 0 is a dummy entry.
    let mut positions: Vec<[f32; 3]> = vec![[0.0; 3]];
    let mut normals: Vec<[f32; 3]> = vec![[0.0; 3]];

    let mut out_vertices: Vec<f32> = Vec::new();
    let mut out_normals: Vec<f32> = Vec::new();
    // Indices into out_normals of placeholder entries, for the
    // after-pass fallback fill.
    let mut placeholder_at: Vec<usize> = Vec::new();

    for (line_index, raw) in text.lines().enumerate() {
        let line_no = line_index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();
        match keyword {
            "v" => positions.push(parse_vec3(&mut tokens, line_no)?),
            "vn" => normals.push(parse_vec3(&mut tokens, line_no)?),
            "f" => {
                let refs: Vec<&str> = tokens.collect();
                let corners: &[usize] = match refs.len() {
                    3 => &[0, 1, 2],
                    4 => &[0, 1, 2, 0, 2, 3],
                    // No general N-gon support; skip the face.
                    _ => &[],
                };
                for &corner in corners {
                    emit_vertex(
                        refs[corner],
                        line_no,
                        &positions,
                        &normals,
                        &mut out_vertices,
                        &mut out_normals,
                        &mut placeholder_at,
                    )?;
                }
            }
            _ => {}
        }
    }

    // Mixed real and missing normals imply malformed input; fill the
    // gaps with the fallback rather than failing.
    if placeholder_at.len() * 3 != out_normals.len() {
        for &at in &placeholder_at {
            out_normals[at..at + 3].copy_from_slice(&FALLBACK_NORMAL);
        }
    }

    Ok(MeshData {
        vertices: out_vertices,
        normals: out_normals,
        indices: None,
        uvs: None,
    })
}

fn parse_vec3<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; 3], ObjError> {
    let mut out = [0.0; 3];
    for slot in &mut out {
        let token = tokens.next().unwrap_or_default();
        *slot = token.parse().map_err(|_| ObjError::BadNumber {
            line,
            token: token.to_string(),
        })?;
    }
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn emit_vertex(
    face_ref: &str,
    line: usize,
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    out_vertices: &mut Vec<f32>,
    out_normals: &mut Vec<f32>,
    placeholder_at: &mut Vec<usize>,
) -> Result<(), ObjError> {
    let mut parts = face_ref.split('/');
    let pos_token = parts.next().unwrap_or_default();
    let pos_index: usize = pos_token.parse().map_err(|_| ObjError::BadNumber {
        line,
        token: pos_token.to_string(),
    })?;
    let position = positions.get(pos_index).ok_or(ObjError::BadIndex { line })?;
    out_vertices.extend_from_slice(position);

    let _texcoord = parts.next(); // accepted, ignored
    let normal_token = parts.next().unwrap_or_default();
    if normal_token.is_empty() {
        placeholder_at.push(out_normals.len());
        out_normals.extend_from_slice(&[0.0; 3]);
    } else {
        let normal_index: usize = normal_token.parse().map_err(|_| ObjError::BadNumber {
            line,
            token: normal_token.to_string(),
        })?;
        let normal = normals.get(normal_index).ok_or(ObjError::BadIndex { line })?;
        out_normals.extend_from_slice(normal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_without_normals_gets_placeholders() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.normals.len(), 9);
        assert!(mesh.indices.is_none());
        // All-placeholder input keeps the zero normals.
        assert!(mesh.normals.iter().all(|&n| n == 0.0));
    }

    #[test]
    fn quad_fan_triangulates_in_fixed_order() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        let expected: Vec<f32> = vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, // (v0, v1, v2)
            0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, // (v0, v2, v3)
        ];
        assert_eq!(mesh.vertices, expected);
    }

    #[test]
    fn normals_resolve_through_slash_refs() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2/5/1 3//1\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn mixed_missing_normals_fall_back_to_up() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2 3//1\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&mesh.normals[3..6], &FALLBACK_NORMAL);
        assert_eq!(&mesh.normals[6..9], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn ngons_comments_and_unknown_keywords_are_skipped() {
        let src = "# header\n\no thing\ns off\nv 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nv 0 0 1\n\
                   f 1 2 3 4 5\nf 1 2 3\n";
        let mesh = parse_obj(src).unwrap();
        // The 5-gon is dropped entirely; only the triangle survives.
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn malformed_coordinate_is_an_error() {
        let err = parse_obj("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ObjError::BadNumber { line: 1, .. }));
    }

    #[test]
    fn missing_coordinate_is_an_error() {
        assert!(matches!(
            parse_obj("v 1 2\n"),
            Err(ObjError::BadNumber { line: 1, .. })
        ));
    }

    #[test]
    fn face_index_out_of_range_is_an_error() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, ObjError::BadIndex { line: 2 }));
    }
}
