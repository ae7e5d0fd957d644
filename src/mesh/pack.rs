use serde::Serialize;

use crate::attribute::AttributeStandard;
use crate::error::{Result, check_len};
use crate::shader::ShaderResolver;
use crate::transform::{safe_normalize, transform_direction};
use crate::types::{PackedFloat3, PackedUint3};

use super::{Mesh, SubdivisionType};

/// Kernel primitive a mesh's triangles are intersected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Triangle,
    MotionTriangle,
}

impl Mesh {
    /// Motion blur is enabled and motion positions exist on the active domain.
    pub fn has_motion_blur(&self) -> bool {
        self.geometry.use_motion_blur()
            && (self
                .attributes
                .contains(AttributeStandard::MotionVertexPosition)
                || (self.subdivision_type() != SubdivisionType::None
                    && self
                        .subd_attributes
                        .contains(AttributeStandard::MotionVertexPosition)))
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        if self.has_motion_blur() {
            PrimitiveType::MotionTriangle
        } else {
            PrimitiveType::Triangle
        }
    }

    /// Resolve per-triangle shader ids into `out` (one per triangle).
    ///
    /// Shader indices past the used-shader list resolve to the default
    /// surface. Runs of identical `(shader, smooth)` reuse the last id.
    pub fn pack_shaders(&self, resolver: &dyn ShaderResolver, out: &mut [u32]) -> Result<()> {
        check_len("tri_shader", self.num_triangles(), out.len())?;

        let mut last: Option<((u32, bool), u32)> = None;
        for ((dst, &shader), &smooth) in out.iter_mut().zip(&self.shader).zip(&self.smooth) {
            let key = (shader, smooth);
            let id = match last {
                Some((prev, id)) if prev == key => id,
                _ => {
                    let handle = self.geometry.used_shaders.get(shader as usize).copied();
                    let id = resolver.shader_id(handle, smooth);
                    last = Some((key, id));
                    id
                }
            };
            *dst = id;
        }
        Ok(())
    }

    /// Copy vertex normals into `out` (one per vertex).
    ///
    /// A baked transform is applied here through the cached normal matrix.
    /// Without a normal attribute `out` is left untouched.
    pub fn pack_normals(&self, out: &mut [PackedFloat3]) -> Result<()> {
        check_len("vnormal", self.num_verts(), out.len())?;

        let Some(normals) = self
            .attributes
            .find(AttributeStandard::VertexNormal)
            .map(|a| a.float3())
            .transpose()?
        else {
            return Ok(());
        };

        let ntfm = self.geometry.transform_normal;
        let do_transform = self.geometry.transform_applied;
        for (dst, &n) in out.iter_mut().zip(normals) {
            let n = if do_transform {
                safe_normalize(transform_direction(&ntfm, n))
            } else {
                n
            };
            *dst = n.into();
        }
        Ok(())
    }

    /// Copy positions and triangle indices, offsetting indices by `vert_offset`.
    pub fn pack_verts(
        &self,
        verts_out: &mut [PackedFloat3],
        vindex_out: &mut [PackedUint3],
    ) -> Result<()> {
        check_len("tri_verts", self.num_verts(), verts_out.len())?;
        check_len("tri_vindex", self.num_triangles(), vindex_out.len())?;

        for (dst, &p) in verts_out.iter_mut().zip(&self.verts) {
            *dst = p.into();
        }

        let offset = self.vert_offset as u32;
        for (dst, t) in vindex_out.iter_mut().zip(self.triangles()) {
            let [v0, v1, v2] = t.v;
            *dst = PackedUint3::new(v0 + offset, v1 + offset, v2 + offset);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::shader::{SHADER_SMOOTH_NORMAL, ShaderRef, ShaderTable};
    use glam::{Affine3A, Vec3};
    use std::cell::Cell;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new();
        for p in [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y] {
            mesh.add_vertex_slow(p);
        }
        mesh.add_triangle(0, 1, 2, 0, true);
        mesh.add_triangle(0, 2, 3, 1, false);
        mesh
    }

    /// Resolver that counts lookups.
    struct Counting<'a> {
        table: &'a ShaderTable,
        calls: Cell<usize>,
    }

    impl ShaderResolver for Counting<'_> {
        fn shader_id(&self, shader: Option<ShaderRef>, smooth: bool) -> u32 {
            self.calls.set(self.calls.get() + 1);
            self.table.shader_id(shader, smooth)
        }
    }

    #[test]
    fn motion_blur_needs_flag_and_attribute() {
        let mut mesh = quad();
        assert!(!mesh.has_motion_blur());
        assert_eq!(mesh.primitive_type(), PrimitiveType::Triangle);

        let dims = mesh.dims();
        mesh.attributes
            .add(AttributeStandard::MotionVertexPosition, &dims);
        assert!(!mesh.has_motion_blur());

        mesh.geometry.set_use_motion_blur(true);
        assert!(mesh.has_motion_blur());
        assert_eq!(mesh.primitive_type(), PrimitiveType::MotionTriangle);
    }

    #[test]
    fn subd_motion_counts_only_when_subdivided() {
        let mut mesh = quad();
        mesh.geometry.set_use_motion_blur(true);
        let dims = mesh.dims();
        mesh.subd_attributes
            .add(AttributeStandard::MotionVertexPosition, &dims);
        assert!(!mesh.has_motion_blur());

        mesh.set_subdivision_type(SubdivisionType::Linear);
        assert!(mesh.has_motion_blur());
    }

    #[test]
    fn shaders_resolve_through_used_list() {
        let mut table = ShaderTable::new();
        let red = table.add("red");
        let mut mesh = quad();
        mesh.geometry.set_used_shaders(vec![red]);

        let mut ids = [0u32; 2];
        mesh.pack_shaders(&table, &mut ids).unwrap();
        // Shader 1 is past the used list: default surface, not smooth.
        assert_eq!(ids, [red.0 | SHADER_SMOOTH_NORMAL, 0]);
    }

    #[test]
    fn repeated_shader_runs_resolve_once() {
        let table = ShaderTable::new();
        let mut mesh = Mesh::new();
        for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            mesh.add_vertex_slow(p);
        }
        for smooth in [true, true, true, false, false, true] {
            mesh.add_triangle(0, 1, 2, 0, smooth);
        }

        let resolver = Counting {
            table: &table,
            calls: Cell::new(0),
        };
        let mut cached = [0u32; 6];
        mesh.pack_shaders(&resolver, &mut cached).unwrap();
        assert_eq!(resolver.calls.get(), 3);

        let uncached: Vec<u32> = mesh
            .smooth_flags()
            .iter()
            .map(|&s| table.shader_id(None, s))
            .collect();
        assert_eq!(cached.to_vec(), uncached);
    }

    #[test]
    fn wrong_output_length_is_an_error() {
        let mesh = quad();
        let mut ids = [0u32; 3];
        assert_eq!(
            mesh.pack_shaders(&ShaderTable::new(), &mut ids),
            Err(MeshError::BufferSize {
                buffer: "tri_shader",
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn verts_pack_with_offset_indices() {
        let mut mesh = quad();
        mesh.vert_offset = 10;

        let mut verts = vec![PackedFloat3::default(); 4];
        let mut vindex = vec![PackedUint3::default(); 2];
        mesh.pack_verts(&mut verts, &mut vindex).unwrap();

        assert_eq!(verts[2], PackedFloat3::new(1.0, 1.0, 0.0));
        assert_eq!(vindex, vec![PackedUint3::new(10, 11, 12), PackedUint3::new(10, 12, 13)]);
    }

    #[test]
    fn normals_absent_leaves_output_untouched() {
        let mesh = quad();
        let mut out = vec![PackedFloat3::new(9.0, 9.0, 9.0); 4];
        mesh.pack_normals(&mut out).unwrap();
        assert!(out.iter().all(|n| *n == PackedFloat3::new(9.0, 9.0, 9.0)));
    }

    #[test]
    fn normals_pack_through_baked_transform() {
        let mut mesh = quad();
        mesh.add_vertex_normals();
        let mut out = vec![PackedFloat3::default(); 4];
        mesh.pack_normals(&mut out).unwrap();
        assert!(out.iter().all(|n| *n == PackedFloat3::new(0.0, 0.0, 1.0)));

        // Rotate a quarter turn about X: +Z maps to -Y.
        let tfm = Affine3A::from_rotation_x(std::f32::consts::FRAC_PI_2);
        mesh.apply_transform(&tfm, false);
        mesh.pack_normals(&mut out).unwrap();
        for n in &out {
            assert!(Vec3::from(*n).abs_diff_eq(-Vec3::Y, 1e-6), "{n:?}");
        }
    }
}
