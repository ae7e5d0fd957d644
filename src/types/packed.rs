use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Three tightly packed `f32`s (12 bytes, no SIMD padding).
///
/// Layout of the device vertex and normal buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PackedFloat3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PackedFloat3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for PackedFloat3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<PackedFloat3> for Vec3 {
    fn from(p: PackedFloat3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// Three tightly packed `u32`s: one triangle's vertex indices.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PackedUint3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl PackedUint3 {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// View a packed buffer as raw bytes for device upload.
pub fn as_bytes<T: Pod>(buffer: &[T]) -> &[u8] {
    bytemuck::cast_slice(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_sizes_have_no_padding() {
        assert_eq!(std::mem::size_of::<PackedFloat3>(), 12);
        assert_eq!(std::mem::size_of::<PackedUint3>(), 12);
    }

    #[test]
    fn vec3_conversion() {
        let p = PackedFloat3::from(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p, PackedFloat3::new(1.0, 2.0, 3.0));
        assert_eq!(Vec3::from(p), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn byte_view_is_struct_of_arrays() {
        let buf = [PackedUint3::new(1, 2, 3), PackedUint3::new(4, 5, 6)];
        let bytes = as_bytes(&buf);
        assert_eq!(bytes.len(), 24);
        let words: &[u32] = bytemuck::cast_slice(bytes);
        assert_eq!(words, &[1, 2, 3, 4, 5, 6]);
    }
}
