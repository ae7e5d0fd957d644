use glam::Vec3;

use crate::types::BoundBox;

/// View of one triangle: three indices into a shared vertex array.
///
/// All methods take the vertex array by slice; every index must be in range
/// for it (checked in debug builds only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub v: [u32; 3],
}

impl Triangle {
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self { v: [v0, v1, v2] }
    }

    fn fetch(&self, verts: &[Vec3], offset: usize) -> [Vec3; 3] {
        debug_assert!(
            self.v.iter().all(|&i| offset + (i as usize) < verts.len()),
            "triangle {:?} out of range for {} vertices at offset {offset}",
            self.v,
            verts.len()
        );
        self.v.map(|i| verts[offset + i as usize])
    }

    /// Expand `bounds` by the three vertex positions.
    pub fn bounds_grow(&self, verts: &[Vec3], bounds: &mut BoundBox) {
        for p in self.fetch(verts, 0) {
            bounds.grow(p);
        }
    }

    /// Unit face normal from the winding `(v0, v1, v2)`.
    ///
    /// Degenerate triangles return `+X` so accumulation never produces NaN.
    pub fn compute_normal(&self, verts: &[Vec3]) -> Vec3 {
        let [v0, v1, v2] = self.fetch(verts, 0);
        let norm = (v1 - v0).cross(v2 - v0);
        let len = norm.length();
        if len == 0.0 {
            return Vec3::X;
        }
        norm / len
    }

    /// Whether all three vertex positions are finite.
    pub fn valid(&self, verts: &[Vec3]) -> bool {
        self.fetch(verts, 0).iter().all(|p| p.is_finite())
    }

    /// Vertex positions at motion `step`.
    ///
    /// The center step `(num_steps - 1) / 2` lives in `verts`; the other
    /// steps are packed consecutively in `vert_steps`, skipping the center.
    pub fn verts_for_step(
        &self,
        verts: &[Vec3],
        vert_steps: &[Vec3],
        num_verts: usize,
        num_steps: usize,
        step: usize,
    ) -> [Vec3; 3] {
        let center_step = (num_steps - 1) / 2;
        if step == center_step {
            return self.fetch(verts, 0);
        }
        let stored = if step > center_step { step - 1 } else { step };
        self.fetch(vert_steps, stored * num_verts)
    }

    /// Vertex positions linearly interpolated at `time` in `[0, 1]`.
    ///
    /// Requires `num_steps >= 2`. `time = 0` and `time = 1` return the first
    /// and last samples exactly.
    pub fn motion_verts(
        &self,
        verts: &[Vec3],
        vert_steps: &[Vec3],
        num_verts: usize,
        num_steps: usize,
        time: f32,
    ) -> [Vec3; 3] {
        debug_assert!(num_steps >= 2, "motion_verts needs at least two steps");
        let max_step = num_steps - 1;
        let step = ((time * max_step as f32) as usize).min(max_step - 1);
        let t = time * max_step as f32 - step as f32;

        let curr = self.verts_for_step(verts, vert_steps, num_verts, num_steps, step);
        let next = self.verts_for_step(verts, vert_steps, num_verts, num_steps, step + 1);
        [0, 1, 2].map(|i| (1.0 - t) * curr[i] + t * next[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tri() -> (Triangle, Vec<Vec3>) {
        (
            Triangle::new(0, 1, 2),
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        )
    }

    /// Five steps of a triangle translated by `step` along Z; center (2)
    /// stays in `verts`, steps 0,1,3,4 go to the step buffer.
    fn five_step_motion() -> (Triangle, Vec<Vec3>, Vec<Vec3>) {
        let (tri, verts) = unit_tri();
        let mut steps = Vec::new();
        for step in [0.0, 1.0, 3.0, 4.0] {
            steps.extend(verts.iter().map(|p| *p + Vec3::Z * step));
        }
        let center: Vec<Vec3> = verts.iter().map(|p| *p + Vec3::Z * 2.0).collect();
        (tri, center, steps)
    }

    #[test]
    fn normal_follows_winding() {
        let (tri, verts) = unit_tri();
        assert_eq!(tri.compute_normal(&verts), Vec3::Z);
        assert_eq!(Triangle::new(0, 2, 1).compute_normal(&verts), -Vec3::Z);
    }

    #[test]
    fn normal_is_unit_length() {
        let verts = vec![
            Vec3::new(0.3, -1.0, 2.0),
            Vec3::new(4.0, 0.5, -1.0),
            Vec3::new(-2.0, 3.0, 0.25),
        ];
        let n = Triangle::new(0, 1, 2).compute_normal(&verts);
        approx::assert_relative_eq!(n.length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_normal_falls_back_to_x() {
        let verts = vec![Vec3::ONE, Vec3::ONE, Vec3::ONE];
        assert_eq!(Triangle::new(0, 1, 2).compute_normal(&verts), Vec3::X);

        let collinear = vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert_eq!(Triangle::new(0, 1, 2).compute_normal(&collinear), Vec3::X);
    }

    #[test]
    fn validity_detects_non_finite() {
        let (tri, mut verts) = unit_tri();
        assert!(tri.valid(&verts));
        verts[1].y = f32::NAN;
        assert!(!tri.valid(&verts));
        verts[1].y = f32::INFINITY;
        assert!(!tri.valid(&verts));
    }

    #[test]
    fn bounds_grow_covers_vertices() {
        let (tri, verts) = unit_tri();
        let mut bb = BoundBox::EMPTY;
        tri.bounds_grow(&verts, &mut bb);
        assert_eq!(bb.min, Vec3::ZERO);
        assert_eq!(bb.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn verts_for_step_skips_center() {
        let (tri, verts, steps) = five_step_motion();
        for step in 0..5 {
            let p = tri.verts_for_step(&verts, &steps, 3, 5, step);
            assert_eq!(p[0].z, step as f32, "step {step}");
            assert_eq!(p[1], Vec3::X + Vec3::Z * step as f32);
        }
    }

    #[test]
    fn motion_verts_endpoints_are_exact() {
        let (tri, verts, steps) = five_step_motion();
        let first = tri.verts_for_step(&verts, &steps, 3, 5, 0);
        let last = tri.verts_for_step(&verts, &steps, 3, 5, 4);
        assert_eq!(tri.motion_verts(&verts, &steps, 3, 5, 0.0), first);
        assert_eq!(tri.motion_verts(&verts, &steps, 3, 5, 1.0), last);
    }

    #[test]
    fn motion_verts_interpolates_across_center() {
        let (tri, verts, steps) = five_step_motion();
        // Each quarter of the time range spans one step of unit Z travel.
        for (time, z) in [(0.125, 0.5), (0.375, 1.5), (0.5, 2.0), (0.625, 2.5), (0.875, 3.5)] {
            let p = tri.motion_verts(&verts, &steps, 3, 5, time);
            approx::assert_relative_eq!(p[0].z, z, epsilon = 1e-5);
            approx::assert_relative_eq!(p[2].y, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn motion_verts_two_steps() {
        // Two steps: center is step 0 (the vertex array), step 1 is stored.
        let (tri, verts) = unit_tri();
        let steps: Vec<Vec3> = verts.iter().map(|p| *p + Vec3::splat(2.0)).collect();
        assert_eq!(tri.motion_verts(&verts, &steps, 3, 2, 0.0)[0], Vec3::ZERO);
        assert_eq!(tri.motion_verts(&verts, &steps, 3, 2, 1.0)[0], Vec3::splat(2.0));
        let mid = tri.motion_verts(&verts, &steps, 3, 2, 0.5)[0];
        assert!(mid.abs_diff_eq(Vec3::ONE, 1e-6));
    }

    #[test]
    fn motion_verts_is_monotonic_within_a_step() {
        let (tri, verts, steps) = five_step_motion();
        let mut prev = f32::NEG_INFINITY;
        for i in 0..25 {
            let time = 0.5 + i as f32 * 0.01;
            let z = tri.motion_verts(&verts, &steps, 3, 5, time)[0].z;
            assert!(z >= prev, "time {time}: {z} < {prev}");
            assert!((2.0..=3.0).contains(&z));
            prev = z;
        }
    }
}
