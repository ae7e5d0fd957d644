use glam::Vec3;
use tracing::debug;

use crate::attribute::AttributeStandard;
use crate::transform::safe_normalize;

use super::{Mesh, SubdivisionType, Triangle};

/// Accumulate face normals of `triangles` over `positions` into `out`.
fn triangle_vertex_normals(out: &mut [Vec3], positions: &[Vec3], triangles: &[u32], flip: bool) {
    out.fill(Vec3::ZERO);
    for t in triangles.chunks_exact(3) {
        let tri = Triangle::new(t[0], t[1], t[2]);
        let face_normal = tri.compute_normal(positions);
        for v in tri.v {
            out[v as usize] += face_normal;
        }
    }
    finalize_normals(out, flip);
}

/// Normalize summed normals, then negate for mirrored geometry.
fn finalize_normals(normals: &mut [Vec3], flip: bool) {
    for n in normals.iter_mut() {
        let unit = safe_normalize(*n);
        *n = if flip { -unit } else { unit };
    }
}

impl Mesh {
    /// Generate per-vertex normals where absent.
    ///
    /// Creates, each only if missing and the relevant primitive count is
    /// non-zero: static normals over the triangles, one normal set per
    /// stored motion step, and subdivision-domain normals over the faces.
    /// Face normals are summed unweighted per vertex.
    pub fn add_vertex_normals(&mut self) {
        let flip = self.geometry.transform_negative_scaled;
        let num_triangles = self.num_triangles();
        let dims = self.dims();

        if num_triangles > 0 && !self.attributes.contains(AttributeStandard::VertexNormal) {
            let attr = self.attributes.add(AttributeStandard::VertexNormal, &dims);
            if let Ok(vn) = attr.float3_mut() {
                triangle_vertex_normals(vn, &self.verts, &self.triangles, flip);
            }
            debug!(
                verts = dims.verts,
                triangles = num_triangles,
                flip,
                "Computed vertex normals"
            );
        }

        let has_motion_normals = self
            .attributes
            .contains(AttributeStandard::MotionVertexNormal);
        if self.has_motion_blur() && !has_motion_normals && num_triangles > 0 {
            let motion_normals = self
                .attributes
                .find(AttributeStandard::MotionVertexPosition)
                .and_then(|attr| attr.float3().ok())
                .map(|positions| {
                    // Sized for the current step count; steps without stored
                    // positions keep zero normals.
                    let len = dims.verts * dims.motion_steps.saturating_sub(1) as usize;
                    let mut normals = vec![Vec3::ZERO; len];
                    let positions = &positions[..positions.len().min(len)];
                    if dims.verts > 0 {
                        for (mp, mn) in positions
                            .chunks_exact(dims.verts)
                            .zip(normals.chunks_exact_mut(dims.verts))
                        {
                            triangle_vertex_normals(mn, mp, &self.triangles, flip);
                        }
                    }
                    normals
                });

            if let Some(normals) = motion_normals {
                let attr = self.attributes.add(AttributeStandard::MotionVertexNormal, &dims);
                if let Ok(mn) = attr.float3_mut() {
                    let n = mn.len().min(normals.len());
                    mn[..n].copy_from_slice(&normals[..n]);
                }
                debug!(
                    steps = self.geometry.motion_steps(),
                    "Computed motion vertex normals"
                );
            }
        }

        let num_faces = self.num_subd_faces();
        if num_faces > 0 && !self.subd_attributes.contains(AttributeStandard::VertexNormal) {
            let mut normals = vec![Vec3::ZERO; dims.verts];
            for face in self.subd_faces() {
                let face_normal = face.normal(self);
                for corner in face.corners() {
                    normals[self.subd_face_corners[corner] as usize] += face_normal;
                }
            }
            finalize_normals(&mut normals, flip);

            let attr = self.subd_attributes.add(AttributeStandard::VertexNormal, &dims);
            if let Ok(vn) = attr.float3_mut() {
                vn.copy_from_slice(&normals);
            }
            debug!(faces = num_faces, flip, "Computed subdivision vertex normals");
        }
    }

    /// Store the current positions as the pre-displacement reference.
    ///
    /// Goes to the subdivision domain when subdivision is enabled. No-op if
    /// the attribute already exists.
    pub fn add_undisplaced(&mut self) {
        let dims = self.dims();
        let attrs = if self.subdivision_type() == SubdivisionType::None {
            &mut self.attributes
        } else {
            &mut self.subd_attributes
        };

        if attrs.contains(AttributeStandard::PositionUndisplaced) {
            return;
        }

        let attr = attrs.add(AttributeStandard::PositionUndisplaced, &dims);
        if let Ok(data) = attr.float3_mut() {
            let n = data.len().min(self.verts.len());
            data[..n].copy_from_slice(&self.verts[..n]);
        }
        debug!(verts = dims.verts, "Added undisplaced positions");
    }

    /// Copy the center positions (and normals) into stored motion slot `slot`.
    ///
    /// `slot` indexes the step buffer, which omits the center step.
    pub fn copy_center_to_motion_step(&mut self, slot: usize) {
        let num_verts = self.verts.len();
        let range = slot * num_verts..(slot + 1) * num_verts;

        let Some(Ok(mp)) = self
            .attributes
            .find_mut(AttributeStandard::MotionVertexPosition)
            .map(|a| a.float3_mut())
        else {
            return;
        };
        if let Some(dst) = mp.get_mut(range.clone()) {
            dst.copy_from_slice(&self.verts);
        }

        let normals = self
            .attributes
            .find(AttributeStandard::VertexNormal)
            .and_then(|a| a.float3().ok())
            .map(<[Vec3]>::to_vec);
        if let (Some(normals), Some(Ok(mn))) = (
            normals,
            self.attributes
                .find_mut(AttributeStandard::MotionVertexNormal)
                .map(|a| a.float3_mut()),
        ) {
            if let Some(dst) = mn.get_mut(range) {
                dst.copy_from_slice(&normals);
            }
        }
    }
}
