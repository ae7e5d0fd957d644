pub mod attribute;
pub mod config;
pub mod error;
pub mod generators;
pub mod geometry;
pub mod mesh;
pub mod scene;
pub mod shader;
pub mod transform;
pub mod types;

pub use config::{DemoConfig, SceneParams};
pub use error::{MeshError, Result};
pub use mesh::{Mesh, PrimitiveType, SubdFace, SubdivisionType, Triangle};
pub use scene::{PackSummary, PackedGeometry, Scene};
pub use shader::{ShaderRef, ShaderResolver, ShaderTable};
