//! Procedural meshes used by the binary, benchmarks and tests.

use glam::{Affine3A, Quat, Vec2, Vec3};
use tracing::debug;

use crate::attribute::AttributeStandard;
use crate::config::DemoConfig;
use crate::error::Result;
use crate::mesh::{Mesh, SubdivisionType};
use crate::scene::Scene;

/// Flat `n x n` quad grid over `[0,1]^2` at z = 0, two triangles per quad.
///
/// Triangles wind counter-clockwise seen from +Z and carry per-corner UVs
/// equal to their XY position.
pub fn grid(n: usize, shader: u32) -> Mesh {
    let n = n.max(1);
    let verts_per_side = n + 1;
    let mut mesh = Mesh::new();
    mesh.reserve_mesh(verts_per_side * verts_per_side, n * n * 2);

    for y in 0..verts_per_side {
        for x in 0..verts_per_side {
            let fx = x as f32 / n as f32;
            let fy = y as f32 / n as f32;
            mesh.add_vertex(Vec3::new(fx, fy, 0.0));
        }
    }

    for y in 0..n {
        for x in 0..n {
            let tl = (y * verts_per_side + x) as u32;
            let tr = tl + 1;
            let bl = tl + verts_per_side as u32;
            let br = bl + 1;
            mesh.add_triangle(tl, tr, bl, shader, true);
            mesh.add_triangle(tr, br, bl, shader, true);
        }
    }

    let dims = mesh.dims();
    let corners: Vec<Vec2> = mesh
        .triangle_indices()
        .iter()
        .map(|&v| mesh.verts()[v as usize].truncate())
        .collect();
    if let Ok(uv) = mesh.attributes.add(AttributeStandard::Uv, &dims).float2_mut() {
        uv.copy_from_slice(&corners);
    }

    mesh
}

/// Axis-aligned cube of six outward-facing quads for subdivision.
///
/// The four bottom edges get a crease of `crease` when it is positive.
pub fn subd_cube(center: Vec3, size: f32, subdivision: SubdivisionType, crease: f32) -> Mesh {
    const FACES: [[u32; 4]; 6] = [
        [0, 2, 3, 1],
        [4, 5, 7, 6],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 4, 6, 2],
        [1, 3, 7, 5],
    ];

    let mut mesh = Mesh::new();
    mesh.reserve_mesh(8, 0);
    mesh.reserve_subd_faces(FACES.len(), FACES.len() * 4);

    // Vertex i sits at unit corner (bit 0, bit 1, bit 2).
    for i in 0..8u32 {
        let corner = Vec3::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32);
        mesh.add_vertex(center + (corner - Vec3::splat(0.5)) * size);
    }
    for face in &FACES {
        mesh.add_subd_face(face, 0, true);
    }

    if crease > 0.0 {
        mesh.reserve_subd_creases(4);
        for (v0, v1) in [(0, 1), (1, 3), (3, 2), (2, 0)] {
            mesh.add_edge_crease(v0, v1, crease);
        }
    }

    mesh.set_subdivision_type(subdivision);
    mesh
}

/// Fill the motion position attribute with a constant-velocity sweep.
///
/// `velocity` is the displacement across the whole shutter; the center step
/// stays at the current positions. No-op for a single motion step.
pub fn linear_motion(mesh: &mut Mesh, velocity: Vec3) {
    let num_steps = mesh.geometry.motion_steps() as usize;
    if num_steps < 2 {
        return;
    }
    let center = mesh.geometry.motion_center_step() as usize;
    let num_verts = mesh.num_verts();
    let dims = mesh.dims();

    let verts = mesh.verts().to_vec();
    let Ok(mp) = mesh
        .attributes
        .add(AttributeStandard::MotionVertexPosition, &dims)
        .float3_mut()
    else {
        return;
    };

    for step in (0..num_steps).filter(|&s| s != center) {
        let slot = if step > center { step - 1 } else { step };
        let time = step as f32 / (num_steps - 1) as f32;
        let center_time = center as f32 / (num_steps - 1) as f32;
        let offset = velocity * (time - center_time);
        for (dst, p) in mp[slot * num_verts..(slot + 1) * num_verts]
            .iter_mut()
            .zip(&verts)
        {
            *dst = *p + offset;
        }
    }
}

/// Build the scene the `mesh-pack` binary packs.
pub fn demo_scene(config: &DemoConfig) -> Result<Scene> {
    config.validate()?;

    let mut scene = Scene::new(config.scene);
    let grid_shader = scene.shaders.add("grid");
    let cube_shader = scene.shaders.add("cube");

    let tfm = Affine3A::from_scale_rotation_translation(
        Vec3::splat(config.scale),
        Quat::IDENTITY,
        Vec3::new(config.translate_x, 0.0, 0.0),
    );

    if config.grid > 0 {
        let mut mesh = grid(config.grid, 0);
        mesh.geometry.set_used_shaders(vec![grid_shader]);
        mesh.geometry.set_motion_steps(config.motion_steps)?;
        linear_motion(&mut mesh, Vec3::new(0.0, 0.0, 0.25));
        mesh.apply_transform(&tfm, true);
        scene.add_mesh(mesh);
    }

    for i in 0..config.subd_cubes {
        let center = Vec3::new(1.5 + 1.5 * i as f32, 0.5, 0.5);
        let mut mesh = subd_cube(center, 1.0, config.scene.default_subdivision, 1.0);
        mesh.geometry.set_used_shaders(vec![cube_shader]);
        mesh.geometry.set_motion_steps(config.motion_steps)?;
        mesh.apply_transform(&tfm, true);
        mesh.add_undisplaced();
        scene.add_mesh(mesh);
    }

    debug!(
        meshes = scene.meshes().len(),
        shaders = scene.shaders.len(),
        "Built demo scene"
    );
    Ok(scene)
}
