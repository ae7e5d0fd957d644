use glam::{Affine3A, Vec3};
use tracing::warn;

use crate::attribute::AttributeStandard;
use crate::geometry::MeshField;
use crate::transform::{
    negative_scale, safe_normalize, transform_direction, transform_point, transposed_inverse,
};
use crate::types::BoundBox;

use super::Mesh;

impl Mesh {
    /// Compute `geometry.bounds` over all vertices and motion steps.
    ///
    /// Non-finite positions are skipped on a second pass; an empty or fully
    /// non-finite mesh gets a point box at the origin.
    pub fn compute_bounds(&mut self) {
        let motion = if self.geometry.use_motion_blur() {
            self.attributes
                .find(AttributeStandard::MotionVertexPosition)
                .and_then(|a| a.float3().ok())
        } else {
            None
        };

        let mut bnds = BoundBox::EMPTY;
        if !self.verts.is_empty() {
            let samples = || self.verts.iter().chain(motion.unwrap_or_default());
            for &p in samples() {
                bnds.grow(p);
            }

            if !bnds.valid() {
                bnds = BoundBox::EMPTY;
                for &p in samples() {
                    bnds.grow_safe(p);
                }
                warn!(
                    verts = self.verts.len(),
                    "Mesh has non-finite vertex positions; excluded from bounds"
                );
            }
        }

        if !bnds.valid() {
            if !self.verts.is_empty() {
                warn!("No finite vertex positions; bounds collapsed to origin");
            }
            bnds = BoundBox::from_point(Vec3::ZERO);
        }

        self.geometry.bounds = bnds;
    }

    /// Bake `tfm` into the vertex positions.
    ///
    /// Missing vertex normals are generated from the untransformed positions
    /// first; they stay in object space and go through the cached
    /// inverse-transpose at pack time. With `apply_to_motion`, motion
    /// positions and normals are transformed too.
    pub fn apply_transform(&mut self, tfm: &Affine3A, apply_to_motion: bool) {
        self.add_vertex_normals();

        let ntfm = transposed_inverse(tfm);
        self.geometry.transform_normal = ntfm;

        for p in self.verts.iter_mut() {
            *p = transform_point(tfm, *p);
        }
        self.geometry.tag(MeshField::Verts);

        if apply_to_motion {
            if let Some(Ok(steps)) = self
                .attributes
                .find_mut(AttributeStandard::MotionVertexPosition)
                .map(|a| a.float3_mut())
            {
                for p in steps.iter_mut() {
                    *p = transform_point(tfm, *p);
                }
            }

            if let Some(Ok(normals)) = self
                .attributes
                .find_mut(AttributeStandard::MotionVertexNormal)
                .map(|a| a.float3_mut())
            {
                for n in normals.iter_mut() {
                    *n = safe_normalize(transform_direction(&ntfm, *n));
                }
            }
        }

        self.geometry.transform_applied = true;
        self.geometry.transform_negative_scaled = negative_scale(tfm);
    }
}
