/// Example: Print the vertex buffer layout an OFF file produces
///
/// Usage: cargo run --example inspect_off -- path/to/file.off

use anyhow::{Context, Result};
use fly3d_core::{load_off, Mesh};
use std::env;

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mesh = match args.get(1) {
        Some(path) => load_off(path).with_context(|| format!("failed to read {path}"))?,
        None => {
            eprintln!("Usage: {} <off-file>", args[0]);
            eprintln!("\nNo OFF file provided, using default cube...");
            Mesh::cube(2.0)
        }
    };

    let buffer = mesh.vertex_buffer()?;
    println!(
        "{} vertices, {} faces, {} cells",
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.cell_count()
    );
    println!(
        "stride: {} floats ({} bytes), {} bytes total",
        buffer.stride(),
        buffer.stride_bytes(),
        buffer.as_bytes().len()
    );
    for (location, attribute) in buffer.attributes().iter().enumerate() {
        println!(
            "  location {location}: {:<9} {} x f32 at byte offset {}",
            attribute.kind.name(),
            attribute.components,
            attribute.offset_bytes()
        );
    }

    let isolated = mesh
        .vertex_normals()?
        .iter()
        .filter(|n| n.norm() == 0.0)
        .count();
    if isolated > 0 {
        println!("{isolated} vertices belong to no face and have a zero normal");
    }

    Ok(())
}
