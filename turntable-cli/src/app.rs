//! Subcommand execution
use anyhow::{Context, Result};
use tracing::info;
use turntable_core::grid::{random_seed, series};
use turntable_core::stl::read_stl_file;
use turntable_core::{
    frame, normalize, BatchDriver, BatchReport, ParameterGrid, Renderer, SceneObject,
};

use crate::cli::{Cli, Commands, GenerateArgs, InspectArgs, RenderArgs};
use crate::preview::PreviewRenderer;

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Generate(args) => generate(args),
        Commands::Inspect(args) => inspect(args),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let mut config = args.options.resolve()?;
    config.recursive |= args.recursive;

    let renderer = args.options.build_renderer()?;
    let mut driver = BatchDriver::new(config, renderer).context("Invalid batch settings")?;

    let report = driver
        .run_directory(&args.input, &args.output)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    print_report(&report);
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let master_seed = args.seed.unwrap_or_else(random_seed);
    info!(master_seed, "Drawing shape seeds");

    let shapes = if args.grid {
        ParameterGrid::standard(master_seed, args.grid_seeds).combinations()
    } else {
        series(
            master_seed,
            args.count,
            args.extrusions,
            args.extrude_range,
            args.rotation_range,
        )
    };

    let mut config = args.options.resolve()?;
    config.render_generated = args.render;

    // Export-only runs never invoke the renderer, so don't require one
    let renderer: Box<dyn Renderer> = if args.render {
        args.options.build_renderer()?
    } else {
        Box::new(PreviewRenderer::default())
    };
    let mut driver = BatchDriver::new(config, renderer).context("Invalid batch settings")?;

    let report = driver
        .run_generated(&shapes, &args.output)
        .with_context(|| format!("Failed to generate into {}", args.output.display()))?;

    println!("Master seed: {master_seed}");
    print_report(&report);
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let mesh = read_stl_file(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let bounds = mesh.bounding_box().context("Cannot measure mesh")?;

    println!("=== {} ===", args.file.display());
    println!("  Vertices:  {}", mesh.vertex_count());
    println!("  Faces:     {}", mesh.face_count());
    println!("  Triangles: {}", mesh.triangle_count());
    println!(
        "  Bounds:    [{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}]",
        bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
    );
    let center = bounds.center();
    println!("  Center:    [{:.4}, {:.4}, {:.4}]", center.x, center.y, center.z);
    println!("  Max dim:   {:.4}", bounds.max_dim());

    let name = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut object = SceneObject::new(name, mesh);
    let normalization = normalize(&mut object, args.target_size).context("Cannot normalize mesh")?;
    println!("  Scale:     {:.6}", normalization.scale_factor);
    if normalization.degenerate {
        println!("  (degenerate bounds, scale skipped)");
    }

    let framing = frame(normalization.canonical_size);
    let camera = &framing.camera;
    println!();
    println!("Canonical framing (size {}):", normalization.canonical_size);
    println!(
        "  Camera:    distance {:.3} at [{:.3}, {:.3}, {:.3}], {}mm, fov {:.1} deg",
        camera.distance,
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.lens,
        camera.fov().to_degrees()
    );
    for light in &framing.lights.lights {
        println!(
            "  {:<10} [{:.2}, {:.2}, {:.2}] energy {}",
            light.name, light.position.x, light.position.y, light.position.z, light.energy
        );
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    if !report.manifests.is_empty() || !report.exported.is_empty() {
        println!(
            "Wrote {} manifest(s), exported {} mesh(es)",
            report.manifests.len(),
            report.exported.len()
        );
    }
    println!(
        "Rendered {} item(s), skipped {}",
        report.rendered.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        println!(
            "  {} [{}]: {}",
            failure.item.display(),
            failure.stage,
            failure.error
        );
    }
}
