//! Scene-level device update: derived passes and shared packed buffers.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SceneParams;
use crate::error::Result;
use crate::mesh::{Mesh, PrimitiveType};
use crate::shader::ShaderTable;
use crate::types::{BoundBox, PackedFloat3, PackedUint3, packed::as_bytes};

/// Device buffers shared by every mesh in a scene.
#[derive(Debug, Clone, Default)]
pub struct PackedGeometry {
    pub verts: Vec<PackedFloat3>,
    pub vindex: Vec<PackedUint3>,
    pub vnormal: Vec<PackedFloat3>,
    pub tri_shader: Vec<u32>,
}

impl PackedGeometry {
    fn with_sizes(num_verts: usize, num_triangles: usize) -> Self {
        Self {
            verts: vec![PackedFloat3::default(); num_verts],
            vindex: vec![PackedUint3::default(); num_triangles],
            vnormal: vec![PackedFloat3::default(); num_verts],
            tri_shader: vec![0; num_triangles],
        }
    }

    /// Total upload size of all buffers.
    pub fn byte_size(&self) -> usize {
        as_bytes(&self.verts).len()
            + as_bytes(&self.vindex).len()
            + as_bytes(&self.vnormal).len()
            + as_bytes(&self.tri_shader).len()
    }
}

/// Per-mesh line of a [`PackSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct MeshSummary {
    pub vert_offset: usize,
    pub prim_offset: usize,
    pub verts: usize,
    pub triangles: usize,
    pub subd_faces: usize,
    pub ptex_faces: u32,
    pub subdivision: String,
    pub primitive: PrimitiveType,
    pub needs_tessellation: bool,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub uv_tiles: Vec<i32>,
}

/// Result of a device update, printable as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct PackSummary {
    pub meshes: Vec<MeshSummary>,
    pub total_verts: usize,
    pub total_triangles: usize,
    pub bytes: usize,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub elapsed_ms: f64,
}

/// Meshes plus the shaders they reference.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub params: SceneParams,
    pub shaders: ShaderTable,
    meshes: Vec<Mesh>,
    last_update: Duration,
    /// Per mesh: subdivision input changed since the previous update.
    tessellation_pending: Vec<bool>,
}

impl Scene {
    pub fn new(params: SceneParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Add a mesh and return its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    /// Union of all mesh bounds from the last update.
    pub fn bounds(&self) -> BoundBox {
        self.meshes
            .iter()
            .fold(BoundBox::EMPTY, |acc, m| acc.merge(&m.geometry.bounds))
    }

    /// Assign buffer offsets, run the derived passes and pack every mesh.
    ///
    /// Meshes are independent, so bounds and normals run in parallel;
    /// packing writes disjoint ranges of the shared buffers.
    pub fn device_update(&mut self) -> Result<PackedGeometry> {
        let start = Instant::now();

        let mut vert_offset = 0;
        let mut prim_offset = 0;
        for mesh in &mut self.meshes {
            mesh.vert_offset = vert_offset;
            mesh.prim_offset = prim_offset;
            vert_offset += mesh.num_verts();
            prim_offset += mesh.num_triangles();
        }
        info!(
            meshes = self.meshes.len(),
            verts = vert_offset,
            triangles = prim_offset,
            "Assigned mesh offsets"
        );

        let motion_blur = self.params.motion_blur;
        self.meshes.par_iter_mut().for_each(|mesh| {
            mesh.geometry.set_use_motion_blur(motion_blur);
            mesh.compute_bounds();
            mesh.add_vertex_normals();
        });

        self.tessellation_pending = self.meshes.iter().map(Mesh::need_tesselation).collect();

        let mut packed = PackedGeometry::with_sizes(vert_offset, prim_offset);
        for (i, mesh) in self.meshes.iter_mut().enumerate() {
            let verts = mesh.vert_offset..mesh.vert_offset + mesh.num_verts();
            let prims = mesh.prim_offset..mesh.prim_offset + mesh.num_triangles();

            mesh.pack_verts(&mut packed.verts[verts.clone()], &mut packed.vindex[prims.clone()])?;
            mesh.pack_normals(&mut packed.vnormal[verts])?;
            mesh.pack_shaders(&self.shaders, &mut packed.tri_shader[prims])?;
            mesh.geometry.clear_modified();

            debug!(
                mesh = i,
                primitive = ?mesh.primitive_type(),
                "Packed mesh"
            );
        }

        self.last_update = start.elapsed();
        info!(
            bytes = packed.byte_size(),
            elapsed = ?self.last_update,
            "Device update complete"
        );
        Ok(packed)
    }

    /// Describe the last device update.
    pub fn summary(&self, packed: &PackedGeometry) -> PackSummary {
        let meshes = self
            .meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| {
                let bounds = mesh.geometry.bounds;
                MeshSummary {
                    vert_offset: mesh.vert_offset,
                    prim_offset: mesh.prim_offset,
                    verts: mesh.num_verts(),
                    triangles: mesh.num_triangles(),
                    subd_faces: mesh.num_subd_faces(),
                    ptex_faces: mesh.total_ptex_faces(),
                    subdivision: mesh.subdivision_type().to_string(),
                    primitive: mesh.primitive_type(),
                    needs_tessellation: self.tessellation_pending.get(i).copied().unwrap_or(false),
                    bounds_min: bounds.min.to_array(),
                    bounds_max: bounds.max.to_array(),
                    uv_tiles: mesh.uv_tiles(None).into_iter().collect(),
                }
            })
            .collect();

        let bounds = self.bounds();
        PackSummary {
            meshes,
            total_verts: packed.verts.len(),
            total_triangles: packed.vindex.len(),
            bytes: packed.byte_size(),
            bounds_min: bounds.min.to_array(),
            bounds_max: bounds.max.to_array(),
            elapsed_ms: self.last_update.as_secs_f64() * 1000.0,
        }
    }
}
