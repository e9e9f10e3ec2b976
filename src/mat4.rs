//! 4x4 matrix math over plain column-major buffers.
//!
//! Matrices are `[f32; 16]` in column-major order, ready to hand to
//! `uniform_matrix_4_f32_slice` without conversion. Every function
//! writes into caller-supplied storage; there is no hidden scratch
//! state. `out` must not alias an operand unless a function documents
//! otherwise. Angles are radians, arithmetic is single precision.

use glam::Vec3;

pub type Mat4 = [f32; 16];

/// Returns the identity matrix.
pub fn identity() -> Mat4 {
    let mut out = [0.0; 16];
    out[0] = 1.0;
    out[5] = 1.0;
    out[10] = 1.0;
    out[15] = 1.0;
    out
}

/// `out = a * b`. `out` must not alias `a` or `b`.
pub fn multiply(out: &mut Mat4, a: &Mat4, b: &Mat4) {
    for col in 0..4 {
        let (b0, b1, b2, b3) = (b[col * 4], b[col * 4 + 1], b[col * 4 + 2], b[col * 4 + 3]);
        for row in 0..4 {
            out[col * 4 + row] =
                b0 * a[row] + b1 * a[4 + row] + b2 * a[8 + row] + b3 * a[12 + row];
        }
    }
}

/// Symmetric perspective projection. An infinite `far` selects the
/// infinite-far-plane variant, which has no far-plane division. A zero
/// `aspect` produces a degenerate matrix; the caller must guard.
pub fn perspective(out: &mut Mat4, fovy: f32, aspect: f32, near: f32, far: f32) {
    let f = 1.0 / (fovy / 2.0).tan();
    *out = [0.0; 16];
    out[0] = f / aspect;
    out[5] = f;
    out[11] = -1.0;
    if far.is_finite() {
        let nf = 1.0 / (near - far);
        out[10] = (far + near) * nf;
        out[14] = 2.0 * far * near * nf;
    } else {
        out[10] = -1.0;
        out[14] = -2.0 * near;
    }
}

/// View matrix looking from `eye` towards `target`.
///
/// When the view direction is parallel to `up` the side/up basis
/// vectors collapse to zero rather than dividing by zero, so the
/// output is degenerate but never NaN.
pub fn look_at(out: &mut Mat4, eye: Vec3, target: Vec3, up: Vec3) {
    let z = (eye - target).normalize_or_zero();
    let mut x = up.cross(z);
    if x.length_squared() > 0.0 {
        x = x.normalize();
    }
    let mut y = z.cross(x);
    if y.length_squared() > 0.0 {
        y = y.normalize();
    }

    out[0] = x.x;
    out[1] = y.x;
    out[2] = z.x;
    out[3] = 0.0;
    out[4] = x.y;
    out[5] = y.y;
    out[6] = z.y;
    out[7] = 0.0;
    out[8] = x.z;
    out[9] = y.z;
    out[10] = z.z;
    out[11] = 0.0;
    out[12] = -x.dot(eye);
    out[13] = -y.dot(eye);
    out[14] = -z.dot(eye);
    out[15] = 1.0;
}

/// Inverts `m` into `out`. Returns `false` (leaving `out` untouched)
/// when the determinant is zero.
pub fn invert(out: &mut Mat4, m: &Mat4) -> bool {
    let (a00, a01, a02, a03) = (m[0], m[1], m[2], m[3]);
    let (a10, a11, a12, a13) = (m[4], m[5], m[6], m[7]);
    let (a20, a21, a22, a23) = (m[8], m[9], m[10], m[11]);
    let (a30, a31, a32, a33) = (m[12], m[13], m[14], m[15]);

    let b00 = a00 * a11 - a01 * a10;
    let b01 = a00 * a12 - a02 * a10;
    let b02 = a00 * a13 - a03 * a10;
    let b03 = a01 * a12 - a02 * a11;
    let b04 = a01 * a13 - a03 * a11;
    let b05 = a02 * a13 - a03 * a12;
    let b06 = a20 * a31 - a21 * a30;
    let b07 = a20 * a32 - a22 * a30;
    let b08 = a20 * a33 - a23 * a30;
    let b09 = a21 * a32 - a22 * a31;
    let b10 = a21 * a33 - a23 * a31;
    let b11 = a22 * a33 - a23 * a32;

    let det = b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06;
    if det == 0.0 {
        return false;
    }
    let det = 1.0 / det;

    out[0] = (a11 * b11 - a12 * b10 + a13 * b09) * det;
    out[1] = (a02 * b10 - a01 * b11 - a03 * b09) * det;
    out[2] = (a31 * b05 - a32 * b04 + a33 * b03) * det;
    out[3] = (a22 * b04 - a21 * b05 - a23 * b03) * det;
    out[4] = (a12 * b08 - a10 * b11 - a13 * b07) * det;
    out[5] = (a00 * b11 - a02 * b08 + a03 * b07) * det;
    out[6] = (a32 * b02 - a30 * b05 - a33 * b01) * det;
    out[7] = (a20 * b05 - a22 * b02 + a23 * b01) * det;
    out[8] = (a10 * b10 - a11 * b08 + a13 * b06) * det;
    out[9] = (a01 * b08 - a00 * b10 - a03 * b06) * det;
    out[10] = (a30 * b04 - a31 * b02 + a33 * b00) * det;
    out[11] = (a21 * b02 - a20 * b04 - a23 * b00) * det;
    out[12] = (a11 * b07 - a10 * b09 - a12 * b06) * det;
    out[13] = (a00 * b09 - a01 * b07 + a02 * b06) * det;
    out[14] = (a31 * b01 - a30 * b03 - a32 * b00) * det;
    out[15] = (a20 * b03 - a21 * b01 + a22 * b00) * det;
    true
}

/// Transposes `m` into `out`. `out` must not alias `m`.
pub fn transpose(out: &mut Mat4, m: &Mat4) {
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = m[row * 4 + col];
        }
    }
}

/// Computes `transpose(invert(m))`, the normal matrix for `m`.
/// Returns `false` when `m` is not invertible.
pub fn normal_matrix(out: &mut Mat4, m: &Mat4) -> bool {
    let mut inv = [0.0; 16];
    if !invert(&mut inv, m) {
        return false;
    }
    transpose(out, &inv);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_mat_eq(a: &Mat4, b: &Mat4) {
        for i in 0..16 {
            assert!(
                (a[i] - b[i]).abs() < EPS,
                "element {i}: {} != {}\n{a:?}\n{b:?}",
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn identity_is_multiplicative_neutral() {
        let m: Mat4 = [
            2.0, 0.5, -1.0, 0.0, 3.0, 1.0, 0.0, 0.0, 0.0, -2.0, 4.0, 0.0, 1.0, 2.0, 3.0, 1.0,
        ];
        let id = identity();
        let mut out = [0.0; 16];
        multiply(&mut out, &m, &id);
        assert_mat_eq(&out, &m);
        multiply(&mut out, &id, &m);
        assert_mat_eq(&out, &m);
    }

    #[test]
    fn invert_round_trips() {
        let mut view = [0.0; 16];
        look_at(
            &mut view,
            Vec3::new(1.0, 2.0, 5.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::Y,
        );
        let mut inv = [0.0; 16];
        let mut back = [0.0; 16];
        assert!(invert(&mut inv, &view));
        assert!(invert(&mut back, &inv));
        assert_mat_eq(&back, &view);
    }

    #[test]
    fn invert_rejects_singular() {
        let singular = [0.0; 16];
        let mut out = identity();
        assert!(!invert(&mut out, &singular));
        // out is left untouched on failure
        assert_mat_eq(&out, &identity());
        assert!(!normal_matrix(&mut out, &singular));
    }

    #[test]
    fn look_at_down_negative_z() {
        let mut view = [0.0; 16];
        look_at(&mut view, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        // Third basis row is +Z: camera looks down -Z.
        assert!((view[2] - 0.0).abs() < EPS);
        assert!((view[6] - 0.0).abs() < EPS);
        assert!((view[10] - 1.0).abs() < EPS);
        // Eye translates back by its distance along that axis.
        assert!((view[14] + 5.0).abs() < EPS);
    }

    #[test]
    fn look_at_parallel_up_has_no_nan() {
        let mut view = [0.0; 16];
        look_at(&mut view, Vec3::new(0.0, 3.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert!(view.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn perspective_finite_and_infinite_far() {
        let mut p = [0.0; 16];
        perspective(&mut p, std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p[11] + 1.0).abs() < EPS);

        perspective(&mut p, std::f32::consts::FRAC_PI_4, 1.0, 0.1, f32::INFINITY);
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p[10] + 1.0).abs() < EPS);
        assert!((p[14] + 0.2).abs() < EPS);
    }

    #[test]
    fn transpose_is_involution() {
        let m: Mat4 = core::array::from_fn(|i| i as f32);
        let mut t = [0.0; 16];
        let mut tt = [0.0; 16];
        transpose(&mut t, &m);
        transpose(&mut tt, &t);
        assert_mat_eq(&tt, &m);
        assert_eq!(t[1], m[4]);
        assert_eq!(t[4], m[1]);
    }

    #[test]
    fn normal_matrix_of_identity_is_identity() {
        let mut out = [0.0; 16];
        assert!(normal_matrix(&mut out, &identity()));
        assert_mat_eq(&out, &identity());
    }
}
