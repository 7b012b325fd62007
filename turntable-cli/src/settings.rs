//! Batch settings: optional TOML file, then command-line overrides.
//!
//! ```toml
//! frames = 120
//! fps = 30
//! resolution = [512, 512]
//! axis = "Z"
//! mode = "orbit"
//!
//! [orbit]
//! radius_factor = 4.0
//! height_factor = 2.5
//! tilt_degrees = 15.0
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use turntable_core::{BatchConfig, Renderer};

use crate::cli::{RenderOptions, RendererKind};
use crate::command::CommandRenderer;
use crate::preview::PreviewRenderer;

/// Extension given to preview output when none is requested
pub const PREVIEW_EXTENSION: &str = "txt";

/// Load settings from a TOML file
pub fn load(path: &Path) -> Result<BatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// Parse settings from TOML; missing keys take their defaults
pub fn parse(content: &str) -> Result<BatchConfig> {
    toml::from_str(content).context("Failed to parse config TOML")
}

impl RenderOptions {
    /// Settings file (or defaults) with every given flag applied on top
    pub fn resolve(&self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None => BatchConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut BatchConfig) {
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution.as_array();
        }
        if let Some(axis) = self.axis {
            config.axis = axis;
        }
        if let Some(degrees) = self.degrees {
            config.degrees = degrees;
        }
        if let Some(size) = self.target_size {
            config.target_size = size;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        match (&self.output_extension, self.renderer) {
            (Some(ext), _) => config.output_extension = ext.trim_start_matches('.').to_string(),
            (None, RendererKind::Preview) => config.output_extension = PREVIEW_EXTENSION.to_string(),
            (None, RendererKind::Command) => {}
        }
    }

    pub fn build_renderer(&self) -> Result<Box<dyn Renderer>> {
        match self.renderer {
            RendererKind::Preview => Ok(Box::new(PreviewRenderer {
                columns: self.preview_columns,
                echo: self.echo,
                ..Default::default()
            })),
            RendererKind::Command => {
                let program = self
                    .program
                    .as_deref()
                    .context("--program is required with --renderer command")?;
                let renderer = CommandRenderer::new(program, self.args.clone())?
                    .keep_scene_files(self.keep_scene_files);
                Ok(Box::new(renderer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Resolution;
    use turntable_core::{MotionMode, RotationAxis};

    #[test]
    fn test_parse_partial_toml() {
        let config = parse(
            r#"
            frames = 48
            resolution = [640, 480]
            axis = "X"
            mode = "orbit"

            [orbit]
            tilt_degrees = 15.0
            "#,
        )
        .unwrap();

        assert_eq!(config.frames, 48);
        assert_eq!(config.resolution, [640, 480]);
        assert_eq!(config.axis, RotationAxis::X);
        assert_eq!(config.mode, MotionMode::Orbit);
        assert_eq!(config.orbit.tilt_degrees, 15.0);
        assert_eq!(config.orbit.radius_factor, 4.0);
        assert_eq!(config.fps, 30);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(parse("frames = \"many\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(&path, "frames = 48\nfps = 24\n").unwrap();

        let options = RenderOptions {
            config: Some(path),
            frames: Some(60),
            resolution: Some(Resolution {
                width: 320,
                height: 240,
            }),
            ..Default::default()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.frames, 60);
        assert_eq!(config.fps, 24);
        assert_eq!(config.resolution, [320, 240]);
        assert_eq!(config.output_extension, PREVIEW_EXTENSION);
    }

    #[test]
    fn test_command_renderer_keeps_extension() {
        let options = RenderOptions {
            renderer: RendererKind::Command,
            ..Default::default()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.output_extension, "mp4");

        let options = RenderOptions {
            output_extension: Some(".png".to_string()),
            ..Default::default()
        };
        assert_eq!(options.resolve().unwrap().output_extension, "png");
    }

    #[test]
    fn test_command_renderer_needs_program() {
        let options = RenderOptions {
            renderer: RendererKind::Command,
            ..Default::default()
        };
        assert!(options.build_renderer().is_err());
    }
}
