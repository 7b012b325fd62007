/// Renderer seam between the pipeline and whatever produces frames
use std::path::Path;

use crate::error::Result;
use crate::scene::{Scene, SceneDescription};

/// One blocking render of a fully built scene
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    pub scene: &'a Scene,
    pub frame_start: u32,
    pub frame_end: u32,
    pub resolution: [u32; 2],
    pub fps: u32,
    pub output: &'a Path,
}

impl<'a> RenderJob<'a> {
    pub fn frame_count(&self) -> u32 {
        self.frame_end.saturating_sub(self.frame_start) + 1
    }

    /// Resolved description of this job, with the mesh expected at `mesh_path`
    pub fn describe(&self, mesh_path: &Path) -> Option<SceneDescription> {
        self.scene.describe(
            mesh_path,
            self.output,
            self.frame_start,
            self.frame_end,
            self.resolution,
            self.fps,
        )
    }
}

/// Produces the artifact for one scene at `job.output`.
///
/// Called once per item. Returning `Ok` without writing the output is
/// reported by the driver as a missing render.
pub trait Renderer {
    fn name(&self) -> &str;

    fn render(&mut self, job: &RenderJob<'_>) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn render(&mut self, job: &RenderJob<'_>) -> Result<()> {
        (**self).render(job)
    }
}
