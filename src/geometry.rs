//! Per-object state shared by every geometry kind: shader list, bounds,
//! motion settings, applied-transform bookkeeping and change tracking.

use glam::Mat3;

use crate::error::{MeshError, Result};
use crate::shader::ShaderRef;
use crate::types::BoundBox;

/// Mesh fields whose modification is tracked for downstream invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MeshField {
    Verts = 0,
    Triangles,
    Shader,
    Smooth,
    SubdFaceCorners,
    SubdStartCorner,
    SubdNumCorners,
    SubdShader,
    SubdSmooth,
    SubdPtexOffset,
    SubdCreasesEdge,
    SubdCreasesWeight,
    SubdVertCreases,
    SubdVertCreasesWeight,
    SubdivisionType,
    SubdBoundaryInterpolation,
    SubdFvarInterpolation,
    SubdDicingRate,
    SubdMaxLevel,
    SubdObjectToWorld,
    UsedShaders,
    MotionSteps,
    UseMotionBlur,
}

impl MeshField {
    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of modified [`MeshField`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifiedFlags(u32);

impl ModifiedFlags {
    pub const ALL: ModifiedFlags = ModifiedFlags(u32::MAX);

    pub fn tag(&mut self, field: MeshField) {
        self.0 |= field.bit();
    }

    pub fn is_modified(&self, field: MeshField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn any(&self) -> bool {
        self.0 != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Base geometry state a mesh is built on.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Shaders referenced by per-primitive shader indices.
    pub used_shaders: Vec<ShaderRef>,
    /// Result of the last bounds computation.
    pub bounds: BoundBox,
    motion_steps: u32,
    use_motion_blur: bool,
    /// Set once an object transform has been baked into the vertices.
    pub transform_applied: bool,
    /// The baked transform mirrors geometry; generated normals are flipped.
    pub transform_negative_scaled: bool,
    /// Inverse-transpose of the baked transform, applied to normals at pack time.
    pub transform_normal: Mat3,
    modified: ModifiedFlags,
}

impl Geometry {
    pub fn new() -> Self {
        Self {
            used_shaders: Vec::new(),
            bounds: BoundBox::EMPTY,
            motion_steps: 3,
            use_motion_blur: false,
            transform_applied: false,
            transform_negative_scaled: false,
            transform_normal: Mat3::IDENTITY,
            modified: ModifiedFlags::ALL,
        }
    }

    /// Total number of temporal samples, including the center step.
    pub fn motion_steps(&self) -> u32 {
        self.motion_steps
    }

    pub fn set_motion_steps(&mut self, steps: u32) -> Result<()> {
        if steps == 0 {
            return Err(MeshError::InvalidMotionSteps(steps));
        }
        if steps != self.motion_steps {
            self.motion_steps = steps;
            self.tag(MeshField::MotionSteps);
        }
        Ok(())
    }

    /// Index of the step stored in the regular vertex array.
    pub fn motion_center_step(&self) -> u32 {
        (self.motion_steps - 1) / 2
    }

    pub fn use_motion_blur(&self) -> bool {
        self.use_motion_blur
    }

    pub fn set_use_motion_blur(&mut self, enabled: bool) {
        if enabled != self.use_motion_blur {
            self.use_motion_blur = enabled;
            self.tag(MeshField::UseMotionBlur);
        }
    }

    pub fn set_used_shaders(&mut self, shaders: Vec<ShaderRef>) {
        self.used_shaders = shaders;
        self.tag(MeshField::UsedShaders);
    }

    pub fn tag(&mut self, field: MeshField) {
        self.modified.tag(field);
    }

    pub fn is_modified(&self, field: MeshField) -> bool {
        self.modified.is_modified(field)
    }

    pub fn modified(&self) -> ModifiedFlags {
        self.modified
    }

    /// Mark all fields as consumed by the device update.
    pub fn clear_modified(&mut self) {
        self.modified.clear();
    }

    /// Reset transform bookkeeping and (optionally) the shader list.
    pub fn clear(&mut self, preserve_shaders: bool) {
        if !preserve_shaders {
            self.used_shaders.clear();
        }
        self.transform_applied = false;
        self.transform_negative_scaled = false;
        self.transform_normal = Mat3::IDENTITY;
        self.modified = ModifiedFlags::ALL;
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}
