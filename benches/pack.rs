use criterion::{Criterion, criterion_group, criterion_main};
use scene_mesh::config::DemoConfig;
use scene_mesh::generators::{demo_scene, grid};
use scene_mesh::types::{PackedFloat3, PackedUint3};
use scene_mesh::ShaderTable;

fn bench_pack_mesh(c: &mut Criterion) {
    // 224x224 grid = 50176 quads = 100352 triangles
    let mut mesh = grid(224, 0);
    mesh.add_vertex_normals();
    let shaders = ShaderTable::new();

    let mut verts = vec![PackedFloat3::default(); mesh.num_verts()];
    let mut vindex = vec![PackedUint3::default(); mesh.num_triangles()];
    let mut vnormal = vec![PackedFloat3::default(); mesh.num_verts()];
    let mut tri_shader = vec![0u32; mesh.num_triangles()];

    c.bench_function("pack_verts_100k", |b| {
        b.iter(|| mesh.pack_verts(&mut verts, &mut vindex));
    });

    c.bench_function("pack_normals_100k", |b| {
        b.iter(|| mesh.pack_normals(&mut vnormal));
    });

    c.bench_function("pack_shaders_100k", |b| {
        b.iter(|| mesh.pack_shaders(&shaders, &mut tri_shader));
    });
}

fn bench_device_update(c: &mut Criterion) {
    let config = DemoConfig {
        grid: 128,
        subd_cubes: 64,
        ..DemoConfig::default()
    };
    let scene = demo_scene(&config).unwrap();

    c.bench_function("device_update_demo_scene", |b| {
        b.iter(|| {
            let mut s = scene.clone();
            s.device_update().unwrap()
        });
    });
}

criterion_group!(benches, bench_pack_mesh, bench_device_update);
criterion_main!(benches);
