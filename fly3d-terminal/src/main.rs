/// Fly3D Terminal Viewer
///
/// Loads an OFF mesh (or a built-in cube) and lets you fly around it.
/// Controls:
///   - Left mouse drag: Look around
///   - WASD / Arrow Keys: Move
///   - Space: Move up
///   - Mouse wheel: Zoom
///   - Q/ESC: Quit

use anyhow::Result;
use clap::Parser;
use fly3d_terminal::{Cli, TerminalApp};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    println!("Fly3D Terminal Viewer - Loading...");
    // A malformed mesh aborts here, before the terminal switches modes
    let mesh = cli.load_mesh()?;
    println!(
        "Loaded {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );

    let mut app = TerminalApp::new(mesh, &cli)?;
    println!("Starting viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));
    app.run()?;

    println!("Thank you for using Fly3D!");
    Ok(())
}
