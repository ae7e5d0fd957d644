use clap::Parser;

use crate::error::{MeshError, Result};
use crate::mesh::SubdivisionType;

/// Scene-wide settings.
///
/// `motion_blur` is applied to every mesh at device update;
/// `default_subdivision` is the scheme scene builders give new subdivision
/// meshes. Motion step counts are per mesh and set when a mesh is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    pub motion_blur: bool,
    pub default_subdivision: SubdivisionType,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            motion_blur: true,
            default_subdivision: SubdivisionType::None,
        }
    }
}

/// Procedural scene contents for the `mesh-pack` binary.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub scene: SceneParams,
    /// Quads per side of the triangulated grid; 0 skips the grid.
    pub grid: usize,
    pub subd_cubes: usize,
    /// Temporal samples given to each generated mesh, center step included.
    pub motion_steps: u32,
    /// Translation along X baked into every mesh.
    pub translate_x: f32,
    /// Uniform scale baked into every mesh; negative mirrors.
    pub scale: f32,
    pub json: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scene: SceneParams {
                default_subdivision: SubdivisionType::CatmullClark,
                ..SceneParams::default()
            },
            grid: 16,
            subd_cubes: 1,
            motion_steps: 3,
            translate_x: 0.0,
            scale: 1.0,
            json: false,
            verbose: false,
            threads: None,
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.motion_steps == 0 {
            return Err(MeshError::Config("motion steps must be at least 1".into()));
        }
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(MeshError::Config(format!(
                "scale must be finite and non-zero, got {}",
                self.scale
            )));
        }
        if !self.translate_x.is_finite() {
            return Err(MeshError::Config("translation must be finite".into()));
        }
        Ok(())
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "mesh-pack",
    about = "Build procedural render meshes and pack them into device buffers",
    version
)]
pub struct CliArgs {
    /// Quads per side of the triangle grid (0 to skip)
    #[arg(long, default_value_t = 16)]
    pub grid: usize,

    /// Number of subdivision cubes
    #[arg(long, default_value_t = 1)]
    pub subd_cubes: usize,

    /// Subdivision scheme for the cubes
    #[arg(long, value_enum, default_value = "catmull-clark")]
    pub subdivision: SubdivisionType,

    /// Temporal samples per mesh, including the center step
    #[arg(long, default_value_t = 3)]
    pub motion_steps: u32,

    /// Disable motion blur
    #[arg(long)]
    pub no_motion_blur: bool,

    /// Translation along X applied to all meshes
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub translate_x: f32,

    /// Uniform scale applied to all meshes (negative mirrors)
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub scale: f32,

    /// Print the packing summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for DemoConfig {
    fn from(args: CliArgs) -> Self {
        DemoConfig {
            scene: SceneParams {
                motion_blur: !args.no_motion_blur,
                default_subdivision: args.subdivision,
            },
            grid: args.grid,
            subd_cubes: args.subd_cubes,
            motion_steps: args.motion_steps,
            translate_x: args.translate_x,
            scale: args.scale,
            json: args.json,
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
