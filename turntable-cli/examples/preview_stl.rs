/// Example: Normalize, frame and preview an STL file in the terminal
///
/// Usage: cargo run --example preview_stl -- path/to/file.stl

use std::env;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use turntable_cli::AsciiCanvas;
use turntable_cli::preview::rasterize_frame;
use turntable_core::stl::read_stl_file;
use turntable_core::{
    animate_rotation, frame, normalize, Mesh, Motion, RotationAxis, Scene, SceneObject,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let object = match args.get(1) {
        Some(path) => {
            let mesh = read_stl_file(Path::new(path))
                .with_context(|| format!("Failed to load {path}"))?;
            println!("Loaded {} faces from {}", mesh.face_count(), path);
            SceneObject::new("model", mesh)
        }
        None => {
            eprintln!("Usage: {} <stl-file>", args[0]);
            eprintln!("\nNo STL file provided, using default cube...");
            SceneObject::new("cube", Mesh::cube(1.0))
        }
    };

    let mut object = object;
    let normalization = normalize(&mut object, 2.0)?;
    let track = animate_rotation(&object, RotationAxis::Z, 120, 360.0)?;

    let mut scene = Scene::new();
    scene.framing = Some(frame(normalization.canonical_size));
    scene.motion = Some(Motion::Turntable(track));
    scene.object = Some(object);

    let resolution = [512, 512];
    let mut canvas = AsciiCanvas::for_resolution(64, resolution);
    let mut stdout = io::stdout();
    for frame_number in [1, 30, 60, 90] {
        rasterize_frame(&mut canvas, &scene, frame_number, resolution)?;
        println!("frame {frame_number}");
        canvas.draw(&mut stdout)?;
    }
    stdout.flush()?;
    Ok(())
}
