//! Named per-element data attached to a mesh.
//!
//! Each mesh owns two [`AttributeSet`]s: one for the triangle domain and one
//! for the subdivision-face domain. Well-known channels are keyed by
//! [`AttributeStandard`]; user channels (extra UV sets, colours) by name.

use std::collections::{BTreeMap, BTreeSet};

use glam::{Vec2, Vec3};

use crate::error::{MeshError, Result};

/// Which primitive domain an attribute set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePrimitive {
    Geometry,
    Subd,
}

/// Well-known attribute channels read or written by the mesh core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeStandard {
    VertexNormal,
    MotionVertexPosition,
    MotionVertexNormal,
    PositionUndisplaced,
    Uv,
}

impl AttributeStandard {
    pub fn name(self) -> &'static str {
        match self {
            AttributeStandard::VertexNormal => "N",
            AttributeStandard::MotionVertexPosition => "motion_P",
            AttributeStandard::MotionVertexNormal => "motion_N",
            AttributeStandard::PositionUndisplaced => "undisplaced",
            AttributeStandard::Uv => "uv",
        }
    }

    pub fn element(self) -> AttributeElement {
        match self {
            AttributeStandard::VertexNormal | AttributeStandard::PositionUndisplaced => {
                AttributeElement::Vertex
            }
            AttributeStandard::MotionVertexPosition | AttributeStandard::MotionVertexNormal => {
                AttributeElement::VertexMotion
            }
            AttributeStandard::Uv => AttributeElement::Corner,
        }
    }

    pub fn kind(self) -> AttributeKind {
        match self {
            AttributeStandard::Uv => AttributeKind::Float2,
            _ => AttributeKind::Float3,
        }
    }
}

impl std::fmt::Display for AttributeStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What one element of an attribute buffer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeElement {
    Vertex,
    /// One full vertex array per non-center motion step.
    VertexMotion,
    Face,
    Corner,
    /// Volume grid data; sized externally and never resized by the mesh.
    Voxel,
}

/// Scalar layout of an attribute buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Float,
    Float2,
    Float3,
}

impl AttributeKind {
    fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Float => "float",
            AttributeKind::Float2 => "float2",
            AttributeKind::Float3 => "float3",
        }
    }
}

/// Typed attribute storage.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Float(Vec<f32>),
    Float2(Vec<Vec2>),
    Float3(Vec<Vec3>),
}

impl AttributeData {
    fn with_len(kind: AttributeKind, len: usize) -> Self {
        match kind {
            AttributeKind::Float => AttributeData::Float(vec![0.0; len]),
            AttributeKind::Float2 => AttributeData::Float2(vec![Vec2::ZERO; len]),
            AttributeKind::Float3 => AttributeData::Float3(vec![Vec3::ZERO; len]),
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeData::Float(_) => AttributeKind::Float,
            AttributeData::Float2(_) => AttributeKind::Float2,
            AttributeData::Float3(_) => AttributeKind::Float3,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AttributeData::Float(v) => v.len(),
            AttributeData::Float2(v) => v.len(),
            AttributeData::Float3(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resize(&mut self, len: usize, reserve_only: bool) {
        macro_rules! apply {
            ($v:expr, $zero:expr) => {
                if reserve_only {
                    $v.reserve(len.saturating_sub($v.len()))
                } else {
                    $v.resize(len, $zero)
                }
            };
        }
        match self {
            AttributeData::Float(v) => apply!(v, 0.0),
            AttributeData::Float2(v) => apply!(v, Vec2::ZERO),
            AttributeData::Float3(v) => apply!(v, Vec3::ZERO),
        }
    }
}

/// Element counts of the mesh an attribute set is sized against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshDims {
    pub verts: usize,
    pub triangles: usize,
    pub subd_faces: usize,
    pub subd_corners: usize,
    pub motion_steps: u32,
}

impl AttributeElement {
    /// Number of elements for this layout, or `None` if not mesh-sized.
    pub fn size(self, dims: &MeshDims, prim: AttributePrimitive) -> Option<usize> {
        let size = match (self, prim) {
            (AttributeElement::Vertex, _) => dims.verts,
            (AttributeElement::VertexMotion, _) => {
                dims.verts * (dims.motion_steps.saturating_sub(1) as usize)
            }
            (AttributeElement::Face, AttributePrimitive::Geometry) => dims.triangles,
            (AttributeElement::Face, AttributePrimitive::Subd) => dims.subd_faces,
            (AttributeElement::Corner, AttributePrimitive::Geometry) => dims.triangles * 3,
            (AttributeElement::Corner, AttributePrimitive::Subd) => dims.subd_corners,
            (AttributeElement::Voxel, _) => return None,
        };
        Some(size)
    }
}

/// One attribute channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub standard: Option<AttributeStandard>,
    pub element: AttributeElement,
    pub data: AttributeData,
}

impl Attribute {
    pub fn float3(&self) -> Result<&[Vec3]> {
        match &self.data {
            AttributeData::Float3(v) => Ok(v),
            _ => Err(type_error(&self.name, AttributeKind::Float3)),
        }
    }

    pub fn float3_mut(&mut self) -> Result<&mut [Vec3]> {
        match &mut self.data {
            AttributeData::Float3(v) => Ok(v),
            _ => Err(type_error(&self.name, AttributeKind::Float3)),
        }
    }

    pub fn float2(&self) -> Result<&[Vec2]> {
        match &self.data {
            AttributeData::Float2(v) => Ok(v),
            _ => Err(type_error(&self.name, AttributeKind::Float2)),
        }
    }

    pub fn float2_mut(&mut self) -> Result<&mut [Vec2]> {
        match &mut self.data {
            AttributeData::Float2(v) => Ok(v),
            _ => Err(type_error(&self.name, AttributeKind::Float2)),
        }
    }

    pub fn float(&self) -> Result<&[f32]> {
        match &self.data {
            AttributeData::Float(v) => Ok(v),
            _ => Err(type_error(&self.name, AttributeKind::Float)),
        }
    }

    pub fn float_mut(&mut self) -> Result<&mut [f32]> {
        match &mut self.data {
            AttributeData::Float(v) => Ok(v),
            _ => Err(type_error(&self.name, AttributeKind::Float)),
        }
    }

    /// Collect the UDIM tiles touched by a float2 channel.
    ///
    /// Coordinates lying exactly on a tile's right or upper edge count towards
    /// the lower tile, so a 0..1 layout touches only tile 1001.
    pub fn uv_tiles(&self, tiles: &mut BTreeSet<i32>) {
        let AttributeData::Float2(uvs) = &self.data else {
            return;
        };
        for uv in uvs {
            if !uv.is_finite() {
                continue;
            }
            let mut x = uv.x.floor() as i32;
            let mut y = uv.y.floor() as i32;
            if x < 0 || y < 0 || x >= 10 {
                continue;
            }
            if x > 0 && uv.x == x as f32 {
                x -= 1;
            }
            if y > 0 && uv.y == y as f32 {
                y -= 1;
            }
            tiles.insert(1001 + 10 * y + x);
        }
    }

    fn resize(&mut self, dims: &MeshDims, prim: AttributePrimitive, reserve_only: bool) {
        if let Some(size) = self.element.size(dims, prim) {
            self.data.resize(size, reserve_only);
        }
    }
}

fn type_error(name: &str, expected: AttributeKind) -> MeshError {
    MeshError::AttributeType {
        name: name.to_string(),
        expected: expected.as_str(),
    }
}

/// Attribute store for one primitive domain.
#[derive(Debug, Clone)]
pub struct AttributeSet {
    prim: AttributePrimitive,
    standard: BTreeMap<AttributeStandard, Attribute>,
    named: BTreeMap<String, Attribute>,
}

impl AttributeSet {
    pub fn new(prim: AttributePrimitive) -> Self {
        Self {
            prim,
            standard: BTreeMap::new(),
            named: BTreeMap::new(),
        }
    }

    pub fn prim(&self) -> AttributePrimitive {
        self.prim
    }

    pub fn find(&self, std: AttributeStandard) -> Option<&Attribute> {
        self.standard.get(&std)
    }

    pub fn find_mut(&mut self, std: AttributeStandard) -> Option<&mut Attribute> {
        self.standard.get_mut(&std)
    }

    pub fn find_named(&self, name: &str) -> Option<&Attribute> {
        self.named.get(name)
    }

    pub fn find_named_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.named.get_mut(name)
    }

    /// Whether the standard channel exists.
    pub fn contains(&self, std: AttributeStandard) -> bool {
        self.standard.contains_key(&std)
    }

    /// Add a standard channel sized for `dims`, or return the existing one.
    pub fn add(&mut self, std: AttributeStandard, dims: &MeshDims) -> &mut Attribute {
        let prim = self.prim;
        self.standard.entry(std).or_insert_with(|| {
            let element = std.element();
            let len = element.size(dims, prim).unwrap_or(0);
            Attribute {
                name: std.name().to_string(),
                standard: Some(std),
                element,
                data: AttributeData::with_len(std.kind(), len),
            }
        })
    }

    /// Add a user channel sized for `dims`, or return the existing one.
    ///
    /// An existing channel keeps its original element and kind.
    pub fn add_named(
        &mut self,
        name: &str,
        element: AttributeElement,
        kind: AttributeKind,
        dims: &MeshDims,
    ) -> &mut Attribute {
        let prim = self.prim;
        self.named.entry(name.to_string()).or_insert_with(|| {
            let len = element.size(dims, prim).unwrap_or(0);
            Attribute {
                name: name.to_string(),
                standard: None,
                element,
                data: AttributeData::with_len(kind, len),
            }
        })
    }

    pub fn remove(&mut self, std: AttributeStandard) -> Option<Attribute> {
        self.standard.remove(&std)
    }

    pub fn remove_named(&mut self, name: &str) -> Option<Attribute> {
        self.named.remove(name)
    }

    /// Resize (or only reserve) every mesh-sized channel to match `dims`.
    pub fn resize(&mut self, dims: &MeshDims, reserve_only: bool) {
        let prim = self.prim;
        for attr in self.standard.values_mut().chain(self.named.values_mut()) {
            attr.resize(dims, prim, reserve_only);
        }
    }

    /// Drop all channels, optionally keeping volume grids.
    pub fn clear(&mut self, preserve_voxel_data: bool) {
        if preserve_voxel_data {
            self.standard
                .retain(|_, a| a.element == AttributeElement::Voxel);
            self.named.retain(|_, a| a.element == AttributeElement::Voxel);
        } else {
            self.standard.clear();
            self.named.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.standard.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.standard.values().chain(self.named.values())
    }
}
