//! The render mesh: triangle arrays, subdivision face arrays, creases and
//! the two attribute domains, plus the derived-data and packing passes.
//!
//! Construction is phased: reserve, append vertices and primitives, run the
//! derived passes (`compute_bounds`, `add_vertex_normals`, `add_undisplaced`),
//! then pack. Vertex and corner indices are not range-checked on append;
//! [`Mesh::validate`] reports violations explicitly.

mod bounds;
mod normals;
mod pack;
pub mod subd;
pub mod triangle;

use std::collections::BTreeSet;

use glam::Vec3;

use crate::attribute::{AttributePrimitive, AttributeSet, AttributeStandard, MeshDims};
use crate::error::{MeshError, Result};
use crate::geometry::{Geometry, MeshField};

pub use pack::PrimitiveType;
pub use subd::{BoundaryInterpolation, FvarInterpolation, SubdFace, SubdParams, SubdivisionType};
pub use triangle::Triangle;

/// Polygon mesh with optional subdivision input and motion steps.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Geometry,

    pub(crate) verts: Vec<Vec3>,
    pub(crate) triangles: Vec<u32>,
    pub(crate) shader: Vec<u32>,
    pub(crate) smooth: Vec<bool>,

    pub(crate) subd_start_corner: Vec<u32>,
    pub(crate) subd_num_corners: Vec<u32>,
    pub(crate) subd_shader: Vec<u32>,
    pub(crate) subd_smooth: Vec<bool>,
    pub(crate) subd_ptex_offset: Vec<u32>,
    pub(crate) subd_face_corners: Vec<u32>,

    pub(crate) subd_creases_edge: Vec<u32>,
    pub(crate) subd_creases_weight: Vec<f32>,
    pub(crate) subd_vert_creases: Vec<u32>,
    pub(crate) subd_vert_creases_weight: Vec<f32>,

    pub(crate) subd_params: SubdParams,

    /// Triangle-domain attributes.
    pub attributes: AttributeSet,
    /// Subdivision-domain attributes.
    pub subd_attributes: AttributeSet,

    /// First vertex of this mesh in the scene-wide packed vertex buffer.
    pub vert_offset: usize,
    /// First triangle of this mesh in the scene-wide packed primitive buffers.
    pub prim_offset: usize,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            geometry: Geometry::new(),
            verts: Vec::new(),
            triangles: Vec::new(),
            shader: Vec::new(),
            smooth: Vec::new(),
            subd_start_corner: Vec::new(),
            subd_num_corners: Vec::new(),
            subd_shader: Vec::new(),
            subd_smooth: Vec::new(),
            subd_ptex_offset: Vec::new(),
            subd_face_corners: Vec::new(),
            subd_creases_edge: Vec::new(),
            subd_creases_weight: Vec::new(),
            subd_vert_creases: Vec::new(),
            subd_vert_creases_weight: Vec::new(),
            subd_params: SubdParams::default(),
            attributes: AttributeSet::new(AttributePrimitive::Geometry),
            subd_attributes: AttributeSet::new(AttributePrimitive::Subd),
            vert_offset: 0,
            prim_offset: 0,
        }
    }

    /// Element counts the attribute sets are sized against.
    pub fn dims(&self) -> MeshDims {
        self.dims_with(
            self.num_verts(),
            self.num_triangles(),
            self.num_subd_faces(),
            self.subd_face_corners.len(),
        )
    }

    pub(crate) fn dims_with(
        &self,
        verts: usize,
        triangles: usize,
        subd_faces: usize,
        subd_corners: usize,
    ) -> MeshDims {
        MeshDims {
            verts,
            triangles,
            subd_faces,
            subd_corners,
            motion_steps: self.geometry.motion_steps(),
        }
    }

    /// Set vertex and triangle counts; new slots are zeroed.
    pub fn resize_mesh(&mut self, num_verts: usize, num_tris: usize) {
        self.verts.resize(num_verts, Vec3::ZERO);
        self.triangles.resize(num_tris * 3, 0);
        self.shader.resize(num_tris, 0);
        self.smooth.resize(num_tris, false);

        let dims = self.dims();
        self.attributes.resize(&dims, false);

        self.geometry.tag(MeshField::Verts);
        self.tag_triangles_modified();
    }

    /// Reserve capacity for later `add_vertex` / `add_triangle` calls.
    pub fn reserve_mesh(&mut self, num_verts: usize, num_tris: usize) {
        self.verts.reserve(num_verts);
        self.triangles.reserve(num_tris * 3);
        self.shader.reserve(num_tris);
        self.smooth.reserve(num_tris);

        let dims = self.dims_with(
            num_verts,
            num_tris,
            self.num_subd_faces(),
            self.subd_face_corners.len(),
        );
        self.attributes.resize(&dims, true);
    }

    /// Drop all geometry and attributes.
    ///
    /// `preserve_shaders` keeps the used-shader list; `preserve_voxel_data`
    /// keeps volume grids in the triangle-domain attributes.
    pub fn clear(&mut self, preserve_shaders: bool, preserve_voxel_data: bool) {
        self.geometry.clear(preserve_shaders);

        self.verts.clear();
        self.triangles.clear();
        self.shader.clear();
        self.smooth.clear();

        self.subd_start_corner.clear();
        self.subd_num_corners.clear();
        self.subd_shader.clear();
        self.subd_smooth.clear();
        self.subd_ptex_offset.clear();
        self.subd_face_corners.clear();

        self.subd_creases_edge.clear();
        self.subd_creases_weight.clear();
        self.subd_vert_creases.clear();
        self.subd_vert_creases_weight.clear();

        self.subd_attributes.clear(false);
        self.attributes.clear(preserve_voxel_data);

        self.subd_params.subdivision_type = SubdivisionType::None;
    }

    /// Append a vertex into capacity made by [`reserve_mesh`](Self::reserve_mesh).
    pub fn add_vertex(&mut self, p: Vec3) {
        debug_assert!(
            self.verts.len() < self.verts.capacity(),
            "add_vertex past reserved capacity; use add_vertex_slow"
        );
        self.verts.push(p);
        self.geometry.tag(MeshField::Verts);
    }

    /// Append a vertex, growing the array as needed.
    pub fn add_vertex_slow(&mut self, p: Vec3) {
        self.verts.push(p);
        self.geometry.tag(MeshField::Verts);
    }

    /// Append one triangle with its shader index and smooth flag.
    ///
    /// Capacity for all four arrays is secured before any push, so they
    /// always grow in lock-step.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32, shader: u32, smooth: bool) {
        self.triangles.reserve(3);
        self.shader.reserve(1);
        self.smooth.reserve(1);

        self.triangles.extend_from_slice(&[v0, v1, v2]);
        self.shader.push(shader);
        self.smooth.push(smooth);

        self.tag_triangles_modified();
    }

    fn tag_triangles_modified(&mut self) {
        self.geometry.tag(MeshField::Triangles);
        self.geometry.tag(MeshField::Shader);
        self.geometry.tag(MeshField::Smooth);
    }

    pub fn num_verts(&self) -> usize {
        self.verts.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn triangle(&self, index: usize) -> Triangle {
        let i = index * 3;
        Triangle::new(self.triangles[i], self.triangles[i + 1], self.triangles[i + 2])
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangles
            .chunks_exact(3)
            .map(|t| Triangle::new(t[0], t[1], t[2]))
    }

    pub fn verts(&self) -> &[Vec3] {
        &self.verts
    }

    /// Mutable vertex positions; tags the vertices as modified.
    pub fn verts_mut(&mut self) -> &mut [Vec3] {
        self.geometry.tag(MeshField::Verts);
        &mut self.verts
    }

    /// Flattened triangle vertex indices, three per triangle.
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangles
    }

    pub fn shaders(&self) -> &[u32] {
        &self.shader
    }

    pub fn smooth_flags(&self) -> &[bool] {
        &self.smooth
    }

    /// Flattened subdivision face corners (vertex indices).
    pub fn subd_face_corners(&self) -> &[u32] {
        &self.subd_face_corners
    }

    pub fn subd_ptex_offsets(&self) -> &[u32] {
        &self.subd_ptex_offset
    }

    /// Attribute set of the active domain: subdivision if enabled.
    pub fn active_attributes(&self) -> &AttributeSet {
        if self.subdivision_type() == SubdivisionType::None {
            &self.attributes
        } else {
            &self.subd_attributes
        }
    }

    /// UDIM tiles used by the default UV map, or by the named map.
    pub fn uv_tiles(&self, map: Option<&str>) -> BTreeSet<i32> {
        let mut tiles = BTreeSet::new();
        for set in [&self.attributes, &self.subd_attributes] {
            let attr = match map {
                None => set.find(AttributeStandard::Uv),
                Some(name) => set.find_named(name),
            };
            if let Some(attr) = attr {
                attr.uv_tiles(&mut tiles);
            }
        }
        tiles
    }

    /// Check index ranges and array bookkeeping.
    ///
    /// Appends never validate; this reports the first violation found.
    pub fn validate(&self) -> Result<()> {
        let num_verts = self.num_verts();

        if self.triangles.len() % 3 != 0
            || self.triangles.len() != 3 * self.shader.len()
            || self.shader.len() != self.smooth.len()
        {
            return Err(MeshError::Inconsistent(format!(
                "{} triangle indices for {} shaders and {} smooth flags",
                self.triangles.len(),
                self.shader.len(),
                self.smooth.len()
            )));
        }
        check_indices("triangle vertex", &self.triangles, num_verts)?;

        let num_faces = self.num_subd_faces();
        if [
            self.subd_start_corner.len(),
            self.subd_num_corners.len(),
            self.subd_smooth.len(),
            self.subd_ptex_offset.len(),
        ]
        .iter()
        .any(|&len| len != num_faces)
        {
            return Err(MeshError::Inconsistent(
                "subdivision face arrays differ in length".into(),
            ));
        }

        let mut next_corner = 0usize;
        let mut next_ptex = 0u32;
        for (i, face) in self.subd_faces().enumerate() {
            if face.start_corner as usize != next_corner {
                return Err(MeshError::Inconsistent(format!(
                    "subdivision face {i} starts at corner {}, expected {next_corner}",
                    face.start_corner
                )));
            }
            if face.ptex_offset != next_ptex {
                return Err(MeshError::Inconsistent(format!(
                    "subdivision face {i} has ptex offset {}, expected {next_ptex}",
                    face.ptex_offset
                )));
            }
            next_corner += face.num_corners as usize;
            next_ptex += face.num_ptex_faces();
        }
        if next_corner > self.subd_face_corners.len() {
            return Err(MeshError::IndexOutOfRange {
                what: "subdivision corner",
                index: next_corner - 1,
                count: self.subd_face_corners.len(),
            });
        }
        check_indices("subdivision corner vertex", &self.subd_face_corners, num_verts)?;

        if self.subd_creases_edge.len() != 2 * self.subd_creases_weight.len()
            || self.subd_vert_creases.len() != self.subd_vert_creases_weight.len()
        {
            return Err(MeshError::Inconsistent(
                "crease indices and weights differ in length".into(),
            ));
        }
        check_indices("edge crease vertex", &self.subd_creases_edge, num_verts)?;
        check_indices("vertex crease vertex", &self.subd_vert_creases, num_verts)?;

        Ok(())
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

fn check_indices(what: &'static str, indices: &[u32], count: usize) -> Result<()> {
    match indices.iter().find(|&&i| i as usize >= count) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            what,
            index: index as usize,
            count,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeElement, AttributeKind};
    use crate::shader::ShaderRef;
    use glam::Vec2;

    fn single_triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.reserve_mesh(3, 1);
        mesh.add_vertex(Vec3::ZERO);
        mesh.add_vertex(Vec3::X);
        mesh.add_vertex(Vec3::Y);
        mesh.add_triangle(0, 1, 2, 0, true);
        mesh
    }

    #[test]
    fn empty_mesh() {
        let mesh = Mesh::new();
        assert_eq!(mesh.num_verts(), 0);
        assert_eq!(mesh.num_triangles(), 0);
        assert_eq!(mesh.num_subd_faces(), 0);
        assert!(mesh.attributes.is_empty());
        assert_eq!(mesh.subdivision_type(), SubdivisionType::None);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn reserve_keeps_logical_size() {
        let mut mesh = Mesh::new();
        mesh.reserve_mesh(100, 50);
        assert_eq!(mesh.num_verts(), 0);
        assert_eq!(mesh.num_triangles(), 0);
        assert!(mesh.verts.capacity() >= 100);
        assert!(mesh.triangles.capacity() >= 150);
    }

    #[test]
    fn resize_zero_fills_and_sizes_attributes() {
        let mut mesh = Mesh::new();
        let dims = mesh.dims();
        mesh.attributes.add(AttributeStandard::VertexNormal, &dims);

        mesh.resize_mesh(4, 2);
        assert_eq!(mesh.verts(), &[Vec3::ZERO; 4]);
        assert_eq!(mesh.triangle_indices(), &[0; 6]);
        assert_eq!(mesh.shaders(), &[0, 0]);
        assert_eq!(mesh.smooth_flags(), &[false, false]);
        let n = mesh.attributes.find(AttributeStandard::VertexNormal).unwrap();
        assert_eq!(n.float3().unwrap().len(), 4);
    }

    #[test]
    fn add_triangle_keeps_arrays_in_lock_step() {
        let mut mesh = single_triangle();
        for i in 0..5 {
            mesh.add_triangle(0, 2, 1, i, i % 2 == 0);
            assert_eq!(mesh.triangle_indices().len(), 3 * mesh.shaders().len());
            assert_eq!(mesh.triangle_indices().len(), 3 * mesh.smooth_flags().len());
        }
        assert_eq!(mesh.num_triangles(), 6);
        assert_eq!(mesh.triangle(3), Triangle::new(0, 2, 1));
        assert_eq!(mesh.triangles().count(), 6);
    }

    #[test]
    fn add_vertex_tags_verts() {
        let mut mesh = Mesh::new();
        mesh.geometry.clear_modified();
        mesh.add_vertex_slow(Vec3::ONE);
        assert!(mesh.geometry.is_modified(MeshField::Verts));
        assert!(!mesh.geometry.is_modified(MeshField::Triangles));
    }

    #[test]
    fn clear_resets_everything_but_shaders() {
        let mut mesh = single_triangle();
        mesh.geometry.set_used_shaders(vec![ShaderRef(3)]);
        mesh.add_subd_face(&[0, 1, 2], 0, false);
        mesh.add_edge_crease(0, 1, 1.0);
        mesh.set_subdivision_type(SubdivisionType::CatmullClark);
        let dims = mesh.dims();
        mesh.attributes.add(AttributeStandard::VertexNormal, &dims);
        mesh.attributes
            .add_named("density", AttributeElement::Voxel, AttributeKind::Float, &dims);
        mesh.subd_attributes.add(AttributeStandard::VertexNormal, &dims);

        mesh.clear(true, true);
        assert_eq!(mesh.num_verts(), 0);
        assert_eq!(mesh.num_triangles(), 0);
        assert_eq!(mesh.num_subd_faces(), 0);
        assert_eq!(mesh.num_edge_creases(), 0);
        assert_eq!(mesh.subdivision_type(), SubdivisionType::None);
        assert_eq!(mesh.geometry.used_shaders, vec![ShaderRef(3)]);
        assert!(mesh.subd_attributes.is_empty());
        assert_eq!(mesh.attributes.len(), 1);

        mesh.clear(false, false);
        assert!(mesh.geometry.used_shaders.is_empty());
        assert!(mesh.attributes.is_empty());
    }

    #[test]
    fn validate_reports_out_of_range_triangle() {
        let mut mesh = single_triangle();
        mesh.add_triangle(0, 1, 7, 0, false);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                what: "triangle vertex",
                index: 7,
                count: 3
            })
        );
    }

    #[test]
    fn validate_reports_bad_corner_and_crease() {
        let mut mesh = single_triangle();
        mesh.add_subd_face(&[0, 1, 2], 0, false);
        assert!(mesh.validate().is_ok());

        mesh.add_vertex_crease(9, 1.0);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                what: "vertex crease vertex",
                ..
            })
        ));

        let mut mesh = single_triangle();
        mesh.add_subd_face(&[0, 1, 5], 0, false);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                what: "subdivision corner vertex",
                index: 5,
                ..
            })
        ));
    }

    #[test]
    fn validate_reports_broken_ptex_offsets() {
        let mut mesh = single_triangle();
        mesh.add_subd_face(&[0, 1, 2], 0, false);
        mesh.add_subd_face(&[0, 2, 1], 0, false);
        mesh.subd_ptex_offset[1] = 1;
        assert!(matches!(mesh.validate(), Err(MeshError::Inconsistent(_))));
    }

    #[test]
    fn uv_tiles_from_both_domains() {
        let mut mesh = single_triangle();
        mesh.add_subd_face(&[0, 1, 2], 0, false);
        let dims = mesh.dims();

        let uv = mesh.attributes.add(AttributeStandard::Uv, &dims);
        uv.float2_mut().unwrap()[0] = Vec2::new(1.5, 0.5);
        let subd_uv = mesh.subd_attributes.add(AttributeStandard::Uv, &dims);
        subd_uv.float2_mut().unwrap()[1] = Vec2::new(0.5, 1.5);

        let tiles: Vec<i32> = mesh.uv_tiles(None).into_iter().collect();
        assert_eq!(tiles, vec![1001, 1002, 1011]);
        assert!(mesh.uv_tiles(Some("detail")).is_empty());
    }
}
