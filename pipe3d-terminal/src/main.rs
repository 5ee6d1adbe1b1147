/// pipe3d Terminal Demo - Rotating Cube
///
/// Renders a cube through the pipe3d pipeline as ASCII art.
/// Usage: pipe3d-terminal [scene.json]
/// Controls:
///   - W/S, Up/Down: Move forward/back
///   - A/D, R/F: Strafe, rise/fall
///   - Left/Right: Turn
///   - I/K: Pitch (orbit camera)
///   - C/P/X: Toggle camera type, projection, wireframe
///   - Q/ESC: Quit
use std::path::PathBuf;

use log::info;
use pipe3d_core::Mesh;
use pipe3d_terminal::{SceneConfig, TerminalApp};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; redirect it to keep the canvas clean
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    let scene = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading scene from {}", path.display());
            SceneConfig::load(&path)?
        }
        None => SceneConfig::default(),
    };

    let cube = Mesh::cube(scene.cube_size);
    info!("Starting terminal renderer with {} triangles", cube.triangles.len());

    let mut app = TerminalApp::new(cube, scene)?;
    app.run()?;

    println!("Thank you for using the pipe3d terminal renderer!");
    Ok(())
}
