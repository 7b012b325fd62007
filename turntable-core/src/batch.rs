//! Batch driver.
//!
//! Runs every item through `Load|Generate → Measure → Normalize → Frame →
//! Animate → Render` strictly in sequence. A failing item is logged with the
//! stage it failed in, recorded in the [`BatchReport`] and skipped; the batch
//! itself only fails on configuration or discovery errors.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::animation::{animate_rotation, FIRST_FRAME};
use crate::config::{BatchConfig, MotionMode};
use crate::error::{Error, Result};
use crate::framing::FramingRecipe;
use crate::manifest::manifest_path_for;
use crate::normalize::normalize;
use crate::render::{RenderJob, Renderer};
use crate::scene::{Motion, Scene, SceneObject};
use crate::shapegen::{ShapeGenerator, ShapeParams};
use crate::stl::{read_stl_file, write_stl_file, StlFormat};

/// Pipeline step an item was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Generate,
    Manifest,
    Export,
    Measure,
    Normalize,
    Frame,
    Animate,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Generate => "generate",
            Stage::Manifest => "manifest",
            Stage::Export => "export",
            Stage::Measure => "measure",
            Stage::Normalize => "normalize",
            Stage::Frame => "frame",
            Stage::Animate => "animate",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

type StageResult<T> = std::result::Result<T, (Stage, Error)>;

trait AtStage<T> {
    fn at(self, stage: Stage) -> StageResult<T>;
}

impl<T, E: Into<Error>> AtStage<T> for std::result::Result<T, E> {
    fn at(self, stage: Stage) -> StageResult<T> {
        self.map_err(|e| (stage, e.into()))
    }
}

/// A skipped item
#[derive(Debug)]
pub struct ItemFailure {
    /// Input file, or the artifact stem of a generated shape
    pub item: PathBuf,
    pub stage: Stage,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<PathBuf>,
    pub exported: Vec<PathBuf>,
    pub manifests: Vec<PathBuf>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A discovered input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputItem {
    pub path: PathBuf,
    /// Path relative to the input root
    pub relative: PathBuf,
}

/// Files under `root` whose extension matches `extension` case-insensitively,
/// sorted by path. Only the top level is searched unless `recursive`.
pub fn discover_inputs(root: &Path, extension: &str, recursive: bool) -> Result<Vec<InputItem>> {
    if !root.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input directory not found: {}", root.display()),
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut items = Vec::new();

    for entry in WalkDir::new(root).max_depth(max_depth).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        items.push(InputItem {
            path: path.to_path_buf(),
            relative,
        });
    }

    items.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(items)
}

/// `output_root / <relative parent> / <stem>.<extension>`
pub fn mirrored_output_path(item: &InputItem, output_root: &Path, extension: &str) -> PathBuf {
    let stem = item
        .relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match item.relative.parent() {
        Some(parent) => output_root.join(parent),
        None => output_root.to_path_buf(),
    };
    dir.join(format!("{stem}.{extension}"))
}

/// Owns the per-item [`Scene`] and the renderer for the whole run
pub struct BatchDriver<R: Renderer> {
    config: BatchConfig,
    recipe: FramingRecipe,
    generator: ShapeGenerator,
    renderer: R,
    scene: Scene,
}

impl<R: Renderer> BatchDriver<R> {
    /// Fails if `config` is invalid, before any item is touched
    pub fn new(config: BatchConfig, renderer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            recipe: FramingRecipe::default(),
            generator: ShapeGenerator::default(),
            renderer,
            scene: Scene::new(),
        })
    }

    pub fn with_recipe(mut self, recipe: FramingRecipe) -> Self {
        self.recipe = recipe;
        self
    }

    /// Generators with a non-default `base_size` or `taper` write manifests
    /// that only the same generator settings reproduce
    pub fn with_generator(mut self, generator: ShapeGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Render every matching file under `input_root`, mirroring its
    /// directory layout under `output_root`.
    pub fn run_directory(&mut self, input_root: &Path, output_root: &Path) -> Result<BatchReport> {
        let items = discover_inputs(
            input_root,
            &self.config.input_extension,
            self.config.recursive,
        )?;
        info!(
            input = %input_root.display(),
            count = items.len(),
            renderer = self.renderer.name(),
            "Starting batch"
        );

        let mut report = BatchReport::default();
        for (index, item) in items.iter().enumerate() {
            let output =
                mirrored_output_path(item, output_root, &self.config.output_extension);
            info!(
                item = index + 1,
                total = items.len(),
                input = %item.path.display(),
                "Processing"
            );

            match self.process_file(item, &output) {
                Ok(()) => {
                    info!(output = %output.display(), "Rendered");
                    report.rendered.push(output);
                }
                Err((stage, error)) => {
                    warn!(
                        input = %item.path.display(),
                        %stage,
                        %error,
                        "Skipping item"
                    );
                    report.failures.push(ItemFailure {
                        item: item.path.clone(),
                        stage,
                        error,
                    });
                }
            }
        }

        self.scene.clear();
        info!(
            rendered = report.rendered.len(),
            failed = report.failures.len(),
            "Batch finished"
        );
        Ok(report)
    }

    /// Generate each shape into `output_root`, writing its manifest and STL
    /// export, then render it unless `render_generated` is off.
    pub fn run_generated(&mut self, shapes: &[ShapeParams], output_root: &Path) -> Result<BatchReport> {
        fs::create_dir_all(output_root)?;
        info!(
            output = %output_root.display(),
            count = shapes.len(),
            render = self.config.render_generated,
            "Starting generation"
        );

        let mut report = BatchReport::default();
        for (index, params) in shapes.iter().enumerate() {
            let stem = params.artifact_stem();
            info!(item = index + 1, total = shapes.len(), shape = %stem, "Generating");

            if let Err((stage, error)) = self.process_generated(params, output_root, &mut report) {
                warn!(shape = %stem, %stage, %error, "Skipping item");
                report.failures.push(ItemFailure {
                    item: PathBuf::from(stem),
                    stage,
                    error,
                });
            }
        }

        self.scene.clear();
        info!(
            manifests = report.manifests.len(),
            exported = report.exported.len(),
            rendered = report.rendered.len(),
            failed = report.failures.len(),
            "Generation finished"
        );
        Ok(report)
    }

    fn process_file(&mut self, item: &InputItem, output: &Path) -> StageResult<()> {
        let mesh = read_stl_file(&item.path).at(Stage::Load)?;
        let name = item
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.build_scene(SceneObject::new(name, mesh))?;
        self.render_to(output)
    }

    fn process_generated(
        &mut self,
        params: &ShapeParams,
        output_root: &Path,
        report: &mut BatchReport,
    ) -> StageResult<()> {
        self.scene.clear();
        let shape = self.generator.generate(params).at(Stage::Generate)?;
        let stem = params.artifact_stem();

        // Stems contain dots, so paths are built by name rather than with_extension
        let mesh_path = output_root.join(format!("{stem}.stl"));
        let manifest_path = manifest_path_for(&mesh_path);

        shape.manifest.write_new(&manifest_path).at(Stage::Manifest)?;
        report.manifests.push(manifest_path);

        write_stl_file(&mesh_path, &shape.object.world_mesh(), StlFormat::Binary)
            .at(Stage::Export)?;
        report.exported.push(mesh_path);

        if !self.config.render_generated {
            return Ok(());
        }

        let output = output_root.join(format!("{stem}.{}", self.config.output_extension));
        self.build_scene(shape.object)?;
        self.render_to(&output)?;
        info!(output = %output.display(), "Rendered");
        report.rendered.push(output);
        Ok(())
    }

    /// Tear down the previous item and build the scene for `object`
    fn build_scene(&mut self, mut object: SceneObject) -> StageResult<()> {
        self.scene.clear();

        let bounds = object.world_bounds().at(Stage::Measure)?;
        debug!(
            stage = %Stage::Measure,
            object = %object.name,
            size = ?bounds.size(),
            center = ?bounds.center(),
            "Measured"
        );

        let normalization = normalize(&mut object, self.config.target_size).at(Stage::Normalize)?;
        debug!(
            stage = %Stage::Normalize,
            scale_factor = normalization.scale_factor,
            degenerate = normalization.degenerate,
            "Normalized"
        );

        let size = normalization.canonical_size;
        let framing = self.recipe.frame(size);
        debug!(
            stage = %Stage::Frame,
            distance = framing.camera.distance,
            lights = framing.lights.len(),
            "Framed"
        );

        let motion = match self.config.mode {
            MotionMode::Turntable => Motion::Turntable(
                animate_rotation(
                    &object,
                    self.config.axis,
                    self.config.frames,
                    self.config.degrees,
                )
                .at(Stage::Animate)?,
            ),
            MotionMode::Orbit => Motion::Orbit(
                self.config
                    .orbit
                    .build(&framing.camera, framing.camera.look_at, size, self.config.frames)
                    .at(Stage::Animate)?,
            ),
        };
        debug!(stage = %Stage::Animate, mode = %self.config.mode, "Animated");

        self.scene.object = Some(object);
        self.scene.framing = Some(framing);
        self.scene.motion = Some(motion);
        Ok(())
    }

    fn render_to(&mut self, output: &Path) -> StageResult<()> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).at(Stage::Render)?;
        }

        let job = RenderJob {
            scene: &self.scene,
            frame_start: FIRST_FRAME,
            frame_end: self.config.frame_end(),
            resolution: self.config.resolution,
            fps: self.config.fps,
            output,
        };
        self.renderer.render(&job).at(Stage::Render)?;

        if !output.exists() {
            return Err((Stage::Render, Error::MissingRenderOutput(output.to_path_buf())));
        }
        Ok(())
    }
}
