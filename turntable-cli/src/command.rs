//! Renderer that hands each scene to an external program.
//!
//! For every job the mesh is exported next to the output as
//! `<output>.scene.stl` and the resolved scene as `<output>.scene.json`. The
//! program is then run with its argument template expanded:
//!
//! - `{scene}` - path of the JSON scene description
//! - `{output}` - path the program must write
//! - `{mesh}` - path of the exported STL

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};
use turntable_core::stl::{write_stl_file, StlFormat};
use turntable_core::{Error, RenderJob, Renderer, Result};

/// Arguments used when none are configured
pub const DEFAULT_ARGS: &[&str] = &["--scene", "{scene}", "--output", "{output}"];

pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<String>,
    keep_scene_files: bool,
}

impl CommandRenderer {
    /// Resolve `program` on `PATH` (or as a path) and use `args` as the
    /// argument template, falling back to [`DEFAULT_ARGS`] when empty.
    pub fn new(program: &str, args: Vec<String>) -> Result<Self> {
        let program = which::which(program).map_err(|e| {
            Error::RenderFailure(format!("renderer program '{program}' not found: {e}"))
        })?;
        let args = if args.is_empty() {
            DEFAULT_ARGS.iter().map(|s| s.to_string()).collect()
        } else {
            args
        };
        Ok(Self {
            program,
            args,
            keep_scene_files: false,
        })
    }

    /// Leave the exported mesh and scene description after a successful render
    pub fn keep_scene_files(mut self, keep: bool) -> Self {
        self.keep_scene_files = keep;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Expanded argument list for one job
    pub fn expand_args(&self, scene: &Path, output: &Path, mesh: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| {
                let expanded = arg
                    .replace("{scene}", &scene.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
                    .replace("{mesh}", &mesh.to_string_lossy());
                OsString::from(expanded)
            })
            .collect()
    }
}

/// `<output>.<suffix>`, keeping the full output file name
fn sibling(output: &Path, suffix: &str) -> PathBuf {
    let mut name = output.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    output.with_file_name(name)
}

impl Renderer for CommandRenderer {
    fn name(&self) -> &str {
        "command"
    }

    fn render(&mut self, job: &RenderJob<'_>) -> Result<()> {
        let object = job
            .scene
            .object
            .as_ref()
            .ok_or_else(|| Error::RenderFailure("scene has no object".to_string()))?;

        let mesh_path = sibling(job.output, ".scene.stl");
        let scene_path = sibling(job.output, ".scene.json");

        write_stl_file(&mesh_path, &object.mesh, StlFormat::Binary)?;
        let description = job
            .describe(&mesh_path)
            .ok_or_else(|| Error::RenderFailure("scene is not framed".to_string()))?;
        fs::write(&scene_path, serde_json::to_string_pretty(&description)?)?;

        let args = self.expand_args(&scene_path, job.output, &mesh_path);
        info!(
            program = %self.program.display(),
            frames = job.frame_count(),
            output = %job.output.display(),
            "Running renderer"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Error::RenderFailure(format!("failed to spawn renderer: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RenderFailure(format!(
                "renderer exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if !self.keep_scene_files {
            for path in [&mesh_path, &scene_path] {
                if let Err(e) = fs::remove_file(path) {
                    debug!(path = %path.display(), error = %e, "Could not remove scene file");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use turntable_core::{
        animate_rotation, frame, Mesh, Motion, RotationAxis, Scene, SceneDescription, SceneObject,
    };

    fn cube_scene() -> Scene {
        let object = SceneObject::new("cube", Mesh::cube(2.0));
        let track = animate_rotation(&object, RotationAxis::Z, 10, 360.0).unwrap();
        let mut scene = Scene::new();
        scene.object = Some(object);
        scene.framing = Some(frame(2.0));
        scene.motion = Some(Motion::Turntable(track));
        scene
    }

    fn job<'a>(scene: &'a Scene, output: &'a Path) -> RenderJob<'a> {
        RenderJob {
            scene,
            frame_start: 1,
            frame_end: 10,
            resolution: [64, 64],
            fps: 30,
            output,
        }
    }

    #[test]
    fn test_missing_program() {
        assert!(matches!(
            CommandRenderer::new("turntable-no-such-renderer", Vec::new()),
            Err(Error::RenderFailure(_))
        ));
    }

    #[test]
    fn test_sibling_keeps_full_name() {
        assert_eq!(
            sibling(Path::new("out/shape_ext0.2.mp4"), ".scene.json"),
            PathBuf::from("out/shape_ext0.2.mp4.scene.json")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_expand_args() {
        let renderer = CommandRenderer::new("sh", Vec::new()).unwrap();
        let args =
            renderer.expand_args(Path::new("s.json"), Path::new("o.mp4"), Path::new("m.stl"));
        assert_eq!(args, vec!["--scene", "s.json", "--output", "o.mp4"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_program_writes_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("cube.mp4");
        let scene = cube_scene();

        // Copy the scene description to the output to prove both paths arrive
        let args = ["-c", "cp \"$0\" \"$1\"", "{scene}", "{output}"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut renderer = CommandRenderer::new("sh", args).unwrap();
        renderer.render(&job(&scene, &output)).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let description: SceneDescription = serde_json::from_str(&written).unwrap();
        assert_eq!(description.frames.len(), 10);
        assert_eq!(description.object_name, "cube");
        assert!(!dir.path().join("cube.mp4.scene.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_render_failure() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("cube.mp4");
        let scene = cube_scene();

        let args = vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()];
        let mut renderer = CommandRenderer::new("sh", args).unwrap().keep_scene_files(true);
        let err = renderer.render(&job(&scene, &output)).unwrap_err();

        match err {
            Error::RenderFailure(message) => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join("cube.mp4.scene.stl").exists());
    }
}
