use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use scene_mesh::config::{CliArgs, DemoConfig};
use scene_mesh::generators::demo_scene;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("scene_mesh=debug")
    } else {
        EnvFilter::new("scene_mesh=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config: DemoConfig = args.into();

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    let mut scene = demo_scene(&config).context("Invalid scene configuration")?;
    let packed = match scene.device_update() {
        Ok(packed) => packed,
        Err(e) => {
            error!(%e, "Device update failed");
            return Err(anyhow::anyhow!(e)).context("mesh-pack device update failed");
        }
    };
    let summary = scene.summary(&packed);

    if config.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{json}");
        return Ok(());
    }

    println!("=== Packed Scene ===");
    for (i, mesh) in summary.meshes.iter().enumerate() {
        println!(
            "  Mesh {i}: {} verts, {} triangles, {} subd faces ({} ptex), {:?}, subdivision {}",
            mesh.verts,
            mesh.triangles,
            mesh.subd_faces,
            mesh.ptex_faces,
            mesh.primitive,
            mesh.subdivision
        );
    }
    println!(
        "  Bounds: ({:.3}, {:.3}, {:.3}) → ({:.3}, {:.3}, {:.3})",
        summary.bounds_min[0],
        summary.bounds_min[1],
        summary.bounds_min[2],
        summary.bounds_max[0],
        summary.bounds_max[1],
        summary.bounds_max[2]
    );
    println!(
        "Done: {} verts, {} triangles, {} bytes in {:.2}ms",
        summary.total_verts, summary.total_triangles, summary.bytes, summary.elapsed_ms
    );
    Ok(())
}
