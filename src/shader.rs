//! Shader handles and the renderer-global shader id resolver.

/// Flag OR-ed into a shader id when the primitive uses smooth normals.
pub const SHADER_SMOOTH_NORMAL: u32 = 1 << 31;
/// Bits of a shader id that index the shader table.
pub const SHADER_MASK: u32 = !SHADER_SMOOTH_NORMAL;

/// Handle to a shader registered in a [`ShaderTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderRef(pub u32);

/// Maps a shader handle and smooth flag to a renderer-global shader id.
///
/// `None` asks for the scene's default surface shader.
pub trait ShaderResolver {
    fn shader_id(&self, shader: Option<ShaderRef>, smooth: bool) -> u32;
}

/// Named shaders with a default surface at slot 0.
#[derive(Debug, Clone)]
pub struct ShaderTable {
    names: Vec<String>,
}

impl ShaderTable {
    /// Handle of the default surface shader.
    pub const DEFAULT_SURFACE: ShaderRef = ShaderRef(0);

    pub fn new() -> Self {
        Self {
            names: vec!["default_surface".to_string()],
        }
    }

    /// Register a shader and return its handle.
    pub fn add(&mut self, name: impl Into<String>) -> ShaderRef {
        self.names.push(name.into());
        ShaderRef((self.names.len() - 1) as u32)
    }

    pub fn name(&self, shader: ShaderRef) -> Option<&str> {
        self.names.get(shader.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ShaderTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderResolver for ShaderTable {
    fn shader_id(&self, shader: Option<ShaderRef>, smooth: bool) -> u32 {
        let shader = shader
            .filter(|s| (s.0 as usize) < self.names.len())
            .unwrap_or(Self::DEFAULT_SURFACE);
        let id = shader.0 & SHADER_MASK;
        if smooth { id | SHADER_SMOOTH_NORMAL } else { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_surface_is_slot_zero() {
        let table = ShaderTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.name(ShaderTable::DEFAULT_SURFACE), Some("default_surface"));
        assert_eq!(table.shader_id(None, false), 0);
    }

    #[test]
    fn smooth_flag_is_encoded() {
        let mut table = ShaderTable::new();
        let metal = table.add("metal");
        assert_eq!(metal, ShaderRef(1));
        assert_eq!(table.shader_id(Some(metal), false), 1);
        assert_eq!(table.shader_id(Some(metal), true), 1 | SHADER_SMOOTH_NORMAL);
        assert_eq!(table.shader_id(Some(metal), true) & SHADER_MASK, 1);
    }

    #[test]
    fn unknown_shader_falls_back_to_default() {
        let table = ShaderTable::new();
        assert_eq!(table.shader_id(Some(ShaderRef(42)), true), SHADER_SMOOTH_NORMAL);
    }
}
