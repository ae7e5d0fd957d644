use glam::{Affine3A, Vec3};
use serde::Serialize;

use crate::geometry::MeshField;
use crate::transform::safe_normalize;

use super::Mesh;

/// Subdivision scheme applied to the face/corner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SubdivisionType {
    #[default]
    #[value(name = "none")]
    None,
    #[value(name = "linear")]
    Linear,
    #[value(name = "catmull-clark")]
    CatmullClark,
}

impl std::fmt::Display for SubdivisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubdivisionType::None => write!(f, "none"),
            SubdivisionType::Linear => write!(f, "linear"),
            SubdivisionType::CatmullClark => write!(f, "catmull-clark"),
        }
    }
}

/// How mesh boundaries are interpolated by the limit surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryInterpolation {
    None,
    EdgeOnly,
    #[default]
    EdgeAndCorner,
}

impl std::fmt::Display for BoundaryInterpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryInterpolation::None => write!(f, "none"),
            BoundaryInterpolation::EdgeOnly => write!(f, "edge_only"),
            BoundaryInterpolation::EdgeAndCorner => write!(f, "edge_and_corner"),
        }
    }
}

/// Where face-varying data (UVs) is linearly rather than smoothly interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FvarInterpolation {
    None,
    CornersOnly,
    CornersPlus1,
    CornersPlus2,
    #[default]
    Boundaries,
    All,
}

impl std::fmt::Display for FvarInterpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FvarInterpolation::None => write!(f, "none"),
            FvarInterpolation::CornersOnly => write!(f, "corners_only"),
            FvarInterpolation::CornersPlus1 => write!(f, "corners_plus1"),
            FvarInterpolation::CornersPlus2 => write!(f, "corners_plus2"),
            FvarInterpolation::Boundaries => write!(f, "boundaries"),
            FvarInterpolation::All => write!(f, "all"),
        }
    }
}

/// Tessellation parameters for subdivision meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubdParams {
    pub subdivision_type: SubdivisionType,
    pub boundary_interpolation: BoundaryInterpolation,
    pub fvar_interpolation: FvarInterpolation,
    pub dicing_rate: f32,
    pub max_level: i32,
    /// Object-to-world snapshot for screen-space dicing decisions.
    pub objecttoworld: Affine3A,
}

impl Default for SubdParams {
    fn default() -> Self {
        Self {
            subdivision_type: SubdivisionType::None,
            boundary_interpolation: BoundaryInterpolation::EdgeAndCorner,
            fvar_interpolation: FvarInterpolation::Boundaries,
            dicing_rate: 1.0,
            max_level: 1,
            objecttoworld: Affine3A::IDENTITY,
        }
    }
}

/// View of one subdivision face: a run of corners in the shared corner array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdFace {
    pub start_corner: u32,
    pub num_corners: u32,
    pub shader: u32,
    pub smooth: bool,
    pub ptex_offset: u32,
}

impl SubdFace {
    /// Face normal from the first three corners, whatever the polygon arity.
    ///
    /// Exact only for planar faces. Unlike [`Triangle::compute_normal`] there
    /// is no fallback axis: collinear or coincident leading corners give a
    /// zero vector, so the face adds nothing to accumulated vertex normals.
    ///
    /// [`Triangle::compute_normal`]: crate::mesh::Triangle::compute_normal
    pub fn normal(&self, mesh: &Mesh) -> Vec3 {
        let start = self.start_corner as usize;
        let corner = |i: usize| mesh.verts[mesh.subd_face_corners[start + i] as usize];
        let (v0, v1, v2) = (corner(0), corner(1), corner(2));
        safe_normalize((v1 - v0).cross(v2 - v0))
    }

    /// Number of ptex patches: one for a quad, one per corner otherwise.
    pub fn num_ptex_faces(&self) -> u32 {
        if self.num_corners == 4 { 1 } else { self.num_corners }
    }

    /// Corner index range into the mesh's face-corner array.
    pub fn corners(&self) -> std::ops::Range<usize> {
        let start = self.start_corner as usize;
        start..start + self.num_corners as usize
    }
}

impl Mesh {
    /// Reserve space for `num_faces` faces with `num_corners` corners in total.
    pub fn reserve_subd_faces(&mut self, num_faces: usize, num_corners: usize) {
        self.subd_start_corner.reserve(num_faces);
        self.subd_num_corners.reserve(num_faces);
        self.subd_shader.reserve(num_faces);
        self.subd_smooth.reserve(num_faces);
        self.subd_ptex_offset.reserve(num_faces);
        self.subd_face_corners.reserve(num_corners);

        let dims = self.dims_with(self.num_verts(), self.num_triangles(), num_faces, num_corners);
        self.subd_attributes.resize(&dims, true);
    }

    /// Set the face and corner counts; new slots are zeroed.
    pub fn resize_subd_faces(&mut self, num_faces: usize, num_corners: usize) {
        self.subd_start_corner.resize(num_faces, 0);
        self.subd_num_corners.resize(num_faces, 0);
        self.subd_shader.resize(num_faces, 0);
        self.subd_smooth.resize(num_faces, false);
        self.subd_ptex_offset.resize(num_faces, 0);
        self.subd_face_corners.resize(num_corners, 0);

        let dims = self.dims();
        self.subd_attributes.resize(&dims, false);
        self.tag_subd_faces_modified();
    }

    /// Reserve space for `num_creases` edge creases.
    pub fn reserve_subd_creases(&mut self, num_creases: usize) {
        self.subd_creases_edge.reserve(num_creases * 2);
        self.subd_creases_weight.reserve(num_creases);
    }

    /// Append a polygon and derive its ptex offset from the previous face.
    pub fn add_subd_face(&mut self, corners: &[u32], shader: u32, smooth: bool) {
        let start_corner = self.subd_face_corners.len() as u32;
        let ptex_offset = self.next_ptex_offset();

        self.subd_face_corners.extend_from_slice(corners);
        self.subd_start_corner.push(start_corner);
        self.subd_num_corners.push(corners.len() as u32);
        self.subd_shader.push(shader);
        self.subd_smooth.push(smooth);
        self.subd_ptex_offset.push(ptex_offset);

        self.tag_subd_faces_modified();
    }

    /// Ptex offset the next appended face will receive.
    ///
    /// Read from the last appended face, so it is O(1) and valid while the
    /// final face count is still unknown.
    pub fn next_ptex_offset(&self) -> u32 {
        match self.num_subd_faces() {
            0 => 0,
            n => {
                let last = self.subd_face(n - 1);
                last.ptex_offset + last.num_ptex_faces()
            }
        }
    }

    /// Total ptex patches of all faces appended so far.
    pub fn total_ptex_faces(&self) -> u32 {
        self.next_ptex_offset()
    }

    pub fn num_subd_faces(&self) -> usize {
        self.subd_shader.len()
    }

    /// Accessor for face `index`.
    pub fn subd_face(&self, index: usize) -> SubdFace {
        SubdFace {
            start_corner: self.subd_start_corner[index],
            num_corners: self.subd_num_corners[index],
            shader: self.subd_shader[index],
            smooth: self.subd_smooth[index],
            ptex_offset: self.subd_ptex_offset[index],
        }
    }

    pub fn subd_faces(&self) -> impl Iterator<Item = SubdFace> + '_ {
        (0..self.num_subd_faces()).map(|i| self.subd_face(i))
    }

    /// Append an edge crease between `v0` and `v1`.
    pub fn add_edge_crease(&mut self, v0: u32, v1: u32, weight: f32) {
        self.subd_creases_edge.extend_from_slice(&[v0, v1]);
        self.subd_creases_weight.push(weight);

        self.geometry.tag(MeshField::SubdCreasesEdge);
        self.geometry.tag(MeshField::SubdCreasesWeight);
    }

    /// Append a vertex (corner) crease.
    pub fn add_vertex_crease(&mut self, v: u32, weight: f32) {
        self.subd_vert_creases.push(v);
        self.subd_vert_creases_weight.push(weight);

        self.geometry.tag(MeshField::SubdVertCreases);
        self.geometry.tag(MeshField::SubdVertCreasesWeight);
    }

    pub fn num_edge_creases(&self) -> usize {
        self.subd_creases_weight.len()
    }

    /// Edge crease `index` as `(v0, v1, weight)`.
    pub fn edge_crease(&self, index: usize) -> (u32, u32, f32) {
        (
            self.subd_creases_edge[index * 2],
            self.subd_creases_edge[index * 2 + 1],
            self.subd_creases_weight[index],
        )
    }

    pub fn num_vertex_creases(&self) -> usize {
        self.subd_vert_creases.len()
    }

    /// Vertex crease `index` as `(v, weight)`.
    pub fn vertex_crease(&self, index: usize) -> (u32, f32) {
        (self.subd_vert_creases[index], self.subd_vert_creases_weight[index])
    }

    pub fn subd_params(&self) -> &SubdParams {
        &self.subd_params
    }

    pub fn subdivision_type(&self) -> SubdivisionType {
        self.subd_params.subdivision_type
    }

    pub fn set_subdivision_type(&mut self, value: SubdivisionType) {
        if self.subd_params.subdivision_type != value {
            self.subd_params.subdivision_type = value;
            self.geometry.tag(MeshField::SubdivisionType);
        }
    }

    pub fn set_subd_boundary_interpolation(&mut self, value: BoundaryInterpolation) {
        if self.subd_params.boundary_interpolation != value {
            self.subd_params.boundary_interpolation = value;
            self.geometry.tag(MeshField::SubdBoundaryInterpolation);
        }
    }

    pub fn set_subd_fvar_interpolation(&mut self, value: FvarInterpolation) {
        if self.subd_params.fvar_interpolation != value {
            self.subd_params.fvar_interpolation = value;
            self.geometry.tag(MeshField::SubdFvarInterpolation);
        }
    }

    pub fn set_subd_dicing_rate(&mut self, value: f32) {
        if self.subd_params.dicing_rate != value {
            self.subd_params.dicing_rate = value;
            self.geometry.tag(MeshField::SubdDicingRate);
        }
    }

    pub fn set_subd_max_level(&mut self, value: i32) {
        if self.subd_params.max_level != value {
            self.subd_params.max_level = value;
            self.geometry.tag(MeshField::SubdMaxLevel);
        }
    }

    pub fn set_subd_objecttoworld(&mut self, value: Affine3A) {
        if self.subd_params.objecttoworld != value {
            self.subd_params.objecttoworld = value;
            self.geometry.tag(MeshField::SubdObjectToWorld);
        }
    }

    /// Whether the subdivision surface must be (re)diced.
    pub fn need_tesselation(&self) -> bool {
        self.subd_params.subdivision_type != SubdivisionType::None
            && (self.geometry.is_modified(MeshField::Verts)
                || self.geometry.is_modified(MeshField::SubdDicingRate)
                || self.geometry.is_modified(MeshField::SubdObjectToWorld)
                || self.geometry.is_modified(MeshField::SubdMaxLevel))
    }

    fn tag_subd_faces_modified(&mut self) {
        for field in [
            MeshField::SubdFaceCorners,
            MeshField::SubdStartCorner,
            MeshField::SubdNumCorners,
            MeshField::SubdShader,
            MeshField::SubdSmooth,
            MeshField::SubdPtexOffset,
        ] {
            self.geometry.tag(field);
        }
    }
}
