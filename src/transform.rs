//! Affine transform helpers for positions and directions.

use glam::{Affine3A, Mat3, Vec3};

/// Inverse-transpose of the linear part of `tfm`, used to carry normals.
///
/// A singular transform yields a non-finite matrix; callers normalize the
/// result so such normals degrade to zero rather than propagating.
pub fn transposed_inverse(tfm: &Affine3A) -> Mat3 {
    Mat3::from(tfm.matrix3).inverse().transpose()
}

/// Whether `tfm` mirrors geometry (negative determinant of the linear part).
pub fn negative_scale(tfm: &Affine3A) -> bool {
    tfm.matrix3.determinant() < 0.0
}

/// Transform a point (translation applied).
pub fn transform_point(tfm: &Affine3A, p: Vec3) -> Vec3 {
    tfm.transform_point3(p)
}

/// Transform a direction with a normal matrix (no translation).
pub fn transform_direction(ntfm: &Mat3, d: Vec3) -> Vec3 {
    *ntfm * d
}

/// Normalize, returning the zero vector for zero-length or non-finite input.
pub fn safe_normalize(v: Vec3) -> Vec3 {
    v.normalize_or_zero()
}
