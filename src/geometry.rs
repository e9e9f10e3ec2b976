//! CPU-side mesh data and procedural generators.
//!
//! A [`MeshData`] is an immutable snapshot: built once per selection
//! (primitive choice or OBJ import), then handed to the engine and
//! replaced wholesale, never patched in place.

/// Flat vertex data for one model.
///
/// `vertices` holds 3 floats per vertex. When `normals` is non-empty it
/// has the same length as `vertices`; when `uvs` is present it holds 2
/// floats per vertex. Without `indices` the mesh is drawn as a flat
/// triangle list and the vertex count must be a multiple of 3.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Option<Vec<u16>>,
    pub uvs: Option<Vec<f32>>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of vertices a draw call emits: the index count when
    /// indexed, the vertex count otherwise.
    pub fn draw_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertex_count(),
        }
    }
}

/// Unit cube centered on the origin.
///
/// 24 unique vertices, 4 per face, so every face carries its own flat
/// normal, plus 36 indices (6 faces x 2 triangles). Deterministic and
/// pure; every call returns the same buffers.
pub fn make_cube() -> MeshData {
    // (normal, four CCW corners seen from outside)
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];
    const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::with_capacity(24 * 3);
    let mut normals = Vec::with_capacity(24 * 3);
    let mut uvs = Vec::with_capacity(24 * 2);
    let mut indices = Vec::with_capacity(36);

    for (normal, corners) in FACES {
        let base = (vertices.len() / 3) as u16;
        for (corner, uv) in corners.iter().zip(CORNER_UVS) {
            vertices.extend_from_slice(corner);
            normals.extend_from_slice(&normal);
            uvs.extend_from_slice(&uv);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData {
        vertices,
        normals,
        indices: Some(indices),
        uvs: Some(uvs),
    }
}

/// Latitude band count for [`make_sphere`].
const SPHERE_STACKS: u32 = 24;
/// Longitude segment count for [`make_sphere`].
const SPHERE_SECTORS: u32 = 32;

/// Unit sphere centered on the origin.
///
/// Built from a latitude/longitude grid of [`SPHERE_STACKS`] x
/// [`SPHERE_SECTORS`] quads with a duplicated seam column so UVs wrap
/// cleanly. Normals equal positions on the unit sphere. Deterministic
/// and pure.
pub fn make_sphere() -> MeshData {
    let stacks = SPHERE_STACKS;
    let sectors = SPHERE_SECTORS;
    let vertex_count = ((stacks + 1) * (sectors + 1)) as usize;

    let mut vertices = Vec::with_capacity(vertex_count * 3);
    let mut normals = Vec::with_capacity(vertex_count * 3);
    let mut uvs = Vec::with_capacity(vertex_count * 2);

    for i in 0..=stacks {
        // theta sweeps pole to pole
        let theta = std::f32::consts::PI * i as f32 / stacks as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for j in 0..=sectors {
            let phi = std::f32::consts::TAU * j as f32 / sectors as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;
            vertices.extend_from_slice(&[x, y, z]);
            normals.extend_from_slice(&[x, y, z]);
            uvs.extend_from_slice(&[
                j as f32 / sectors as f32,
                1.0 - i as f32 / stacks as f32,
            ]);
        }
    }

    let mut indices = Vec::with_capacity((stacks * sectors * 6) as usize);
    for i in 0..stacks {
        for j in 0..sectors {
            let a = (i * (sectors + 1) + j) as u16;
            let b = a + (sectors + 1) as u16;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    MeshData {
        vertices,
        normals,
        indices: Some(indices),
        uvs: Some(uvs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit_normals(mesh: &MeshData) {
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        for n in mesh.normals.chunks_exact(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5, "non-unit normal {n:?}");
        }
    }

    fn assert_indices_in_range(mesh: &MeshData) {
        let indices = mesh.indices.as_ref().unwrap();
        assert_eq!(indices.len() % 3, 0);
        let max = mesh.vertex_count() as u16;
        assert!(indices.iter().all(|&i| i < max));
    }

    #[test]
    fn cube_has_24_vertices_and_36_drawn() {
        let cube = make_cube();
        assert_eq!(cube.vertex_count(), 24);
        // 6 faces x 2 triangles x 3 vertices per draw
        assert_eq!(cube.draw_count(), 36);
        assert_eq!(cube.uvs.as_ref().unwrap().len(), 24 * 2);
        assert_unit_normals(&cube);
        assert_indices_in_range(&cube);
    }

    #[test]
    fn cube_is_stable_across_calls() {
        let a = make_cube();
        let b = make_cube();
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn cube_spans_the_unit_box() {
        let cube = make_cube();
        assert!(cube.vertices.iter().all(|v| v.abs() == 0.5));
    }

    #[test]
    fn sphere_grid_invariants() {
        let sphere = make_sphere();
        let expected = ((SPHERE_STACKS + 1) * (SPHERE_SECTORS + 1)) as usize;
        assert_eq!(sphere.vertex_count(), expected);
        assert_eq!(
            sphere.indices.as_ref().unwrap().len(),
            (SPHERE_STACKS * SPHERE_SECTORS * 6) as usize
        );
        assert_eq!(sphere.uvs.as_ref().unwrap().len(), expected * 2);
        assert_unit_normals(&sphere);
        assert_indices_in_range(&sphere);
    }

    #[test]
    fn sphere_normals_match_positions() {
        let sphere = make_sphere();
        for (v, n) in sphere
            .vertices
            .chunks_exact(3)
            .zip(sphere.normals.chunks_exact(3))
        {
            assert_eq!(v, n);
        }
    }
}
