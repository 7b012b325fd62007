/// ASCII preview renderer for quick looks at a batch without a render engine
use std::fs;
use std::io::{self, Write};

use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3};
use tracing::debug;
use turntable_core::framing::{CameraRig, LightRig};
use turntable_core::scene::{FramePose, Scene};
use turntable_core::{Camera, Error, Mesh, RenderJob, Renderer, Result, Transform, Triangle};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light that reaches faces turned away from every lamp
const AMBIENT: f32 = 0.1;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// Depth-buffered character grid
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiCanvas {
    /// Canvas of `width` x `height` cells, at least one of each
    pub fn new(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    /// Canvas `columns` wide with the proportions of a `resolution` image
    pub fn for_resolution(columns: usize, resolution: [u32; 2]) -> Self {
        let [width, height] = resolution;
        let rows = (columns as f32 * height as f32 / (width.max(1) as f32 * CELL_ASPECT)).round();
        Self::new(columns, rows as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn render_mesh(
        &mut self,
        mesh: &Mesh,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        lights: &LightRig,
    ) {
        for triangle in mesh.triangles() {
            self.render_triangle(&triangle, model_matrix, camera, lights);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        lights: &LightRig,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                vertex,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *slot = projected,
                None => return, // Triangle is clipped
            }
        }

        // Shade with the world-space normal against every light
        let normal = model_matrix
            .transform_vector(&triangle.calculate_normal())
            .try_normalize(f32::EPSILON);
        let Some(normal) = normal else {
            return;
        };
        let total = lights.total_energy();
        let lit: f32 = lights
            .lights
            .iter()
            .map(|light| light.energy * normal.dot(&-light.direction()).max(0.0))
            .sum();
        let brightness = if total > 0.0 {
            AMBIENT + (1.0 - AMBIENT) * lit / total
        } else {
            AMBIENT
        };

        // Map brightness to character, never blank so silhouettes stay visible
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                        }
                    }
                }
            }
        }
    }

    /// Number of cells covered by geometry
    pub fn coverage(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.char_buffer.chunks(self.width) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_at(x, y);

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Rasterizing camera matching the rig lens for an image of `resolution`
fn camera_for(
    rig: &CameraRig,
    pose: &FramePose,
    target: Point3<f32>,
    resolution: [u32; 2],
) -> Camera {
    let [width, height] = resolution;
    let aspect = width as f32 / height.max(1) as f32;
    let mut camera = Camera::looking_at(pose.camera.position, target, width, height);
    // Rig lenses are specified horizontally, the projection wants vertical
    camera.fov = 2.0 * ((rig.fov() / 2.0).tan() / aspect).atan();
    camera.aspect = aspect;
    camera.near = rig.clip_start;
    camera.far = rig.clip_end;
    camera
}

/// Draw `scene` at `frame` onto `canvas`
pub fn rasterize_frame(
    canvas: &mut AsciiCanvas,
    scene: &Scene,
    frame: u32,
    resolution: [u32; 2],
) -> Result<()> {
    let missing = || Error::RenderFailure("scene is not built".to_string());
    let object = scene.object.as_ref().ok_or_else(missing)?;
    let framing = scene.framing.as_ref().ok_or_else(missing)?;
    let pose = scene.pose_at(frame).ok_or_else(missing)?;
    let target = scene.camera_target().ok_or_else(missing)?;

    let camera = camera_for(&framing.camera, &pose, target, resolution);
    let model = Transform::rotation_matrix(&pose.object_rotation);

    canvas.clear();
    canvas.render_mesh(&object.mesh, &model, &camera, &framing.lights);
    Ok(())
}

/// Writes evenly spaced ASCII frames of each scene to the job output
pub struct PreviewRenderer {
    pub columns: usize,
    pub samples: u32,
    /// Also print the first sampled frame to stdout
    pub echo: bool,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self {
            columns: 64,
            samples: 4,
            echo: false,
        }
    }
}

impl PreviewRenderer {
    /// Frames to draw, always including the first and last
    pub fn sample_frames(&self, frame_start: u32, frame_end: u32) -> Vec<u32> {
        let span = frame_end.saturating_sub(frame_start);
        let samples = self.samples.clamp(1, span + 1);
        if samples == 1 {
            return vec![frame_start];
        }
        (0..samples)
            .map(|i| frame_start + (i as u64 * span as u64 / (samples - 1) as u64) as u32)
            .collect()
    }
}

impl Renderer for PreviewRenderer {
    fn name(&self) -> &str {
        "preview"
    }

    fn render(&mut self, job: &RenderJob<'_>) -> Result<()> {
        let mut canvas = AsciiCanvas::for_resolution(self.columns, job.resolution);
        let mut out = String::new();

        for (i, frame) in self
            .sample_frames(job.frame_start, job.frame_end)
            .into_iter()
            .enumerate()
        {
            rasterize_frame(&mut canvas, job.scene, frame, job.resolution)?;
            out.push_str(&format!("frame {frame}\n"));
            out.push_str(&canvas.to_text());

            if i == 0 && self.echo {
                let mut stdout = io::stdout();
                canvas.draw(&mut stdout)?;
                stdout.flush()?;
            }
        }

        fs::write(job.output, out)?;
        debug!(output = %job.output.display(), "Wrote preview");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use turntable_core::{animate_rotation, frame, Motion, RotationAxis, SceneObject};

    fn cube_scene() -> Scene {
        let object = SceneObject::new("cube", Mesh::cube(2.0));
        let track = animate_rotation(&object, RotationAxis::Z, 120, 360.0).unwrap();
        let mut scene = Scene::new();
        scene.object = Some(object);
        scene.framing = Some(frame(2.0));
        scene.motion = Some(Motion::Turntable(track));
        scene
    }

    #[test]
    fn test_canvas_proportions() {
        let canvas = AsciiCanvas::for_resolution(64, [512, 512]);
        assert_eq!(canvas.width(), 64);
        assert_eq!(canvas.height(), 32);
    }

    #[test]
    fn test_empty_canvas_is_clamped() {
        let canvas = AsciiCanvas::new(0, 0);
        assert_eq!((canvas.width(), canvas.height()), (1, 1));
        assert_eq!(canvas.to_text(), " \n");

        let canvas = AsciiCanvas::for_resolution(0, [512, 512]);
        assert_eq!(canvas.width(), 1);
    }

    #[test]
    fn test_object_lands_in_the_middle() {
        let scene = cube_scene();
        let mut canvas = AsciiCanvas::for_resolution(64, [512, 512]);
        rasterize_frame(&mut canvas, &scene, 1, [512, 512]).unwrap();

        assert!(canvas.coverage() > 0);
        assert_ne!(canvas.char_at(32, 16), ' ');
        assert_eq!(canvas.char_at(0, 0), ' ');
    }

    #[test]
    fn test_unbuilt_scene_fails() {
        let mut canvas = AsciiCanvas::new(10, 10);
        assert!(rasterize_frame(&mut canvas, &Scene::new(), 1, [512, 512]).is_err());
    }

    #[test]
    fn test_sample_frames() {
        let preview = PreviewRenderer::default();
        assert_eq!(preview.sample_frames(1, 120), vec![1, 40, 80, 120]);
        assert_eq!(preview.sample_frames(1, 2), vec![1, 2]);
    }

    #[test]
    fn test_preview_writes_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("cube.txt");
        let scene = cube_scene();
        let job = RenderJob {
            scene: &scene,
            frame_start: 1,
            frame_end: 120,
            resolution: [512, 512],
            fps: 30,
            output: &output,
        };

        PreviewRenderer::default().render(&job).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("frame 1\n"));
        assert!(text.contains("frame 120\n"));
        let drawn = text
            .lines()
            .filter(|line| !line.starts_with("frame"))
            .any(|line| !line.trim().is_empty());
        assert!(drawn);
    }
}
