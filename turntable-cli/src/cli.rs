//! Command-line surface. Flags are parsed here only; the core receives plain
//! values through [`BatchConfig`](turntable_core::BatchConfig).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use turntable_core::{MotionMode, RotationAxis};

/// Turntable - normalized turntable and orbit renders of mesh collections
#[derive(Parser, Debug)]
#[command(name = "turntable")]
#[command(about = "Normalized turntable and orbit renders of mesh collections")]
#[command(version)]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render every STL file under a directory, mirroring its layout
    Render(RenderArgs),

    /// Generate seeded shapes with manifests, and optionally render them
    Generate(GenerateArgs),

    /// Print counts, bounds and canonical framing of one STL file
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Directory containing input meshes
    pub input: PathBuf,

    /// Directory that receives the renders
    pub output: PathBuf,

    /// Also process subdirectories
    #[arg(long)]
    pub recursive: bool,

    #[command(flatten)]
    pub options: RenderOptions,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory that receives meshes, manifests and renders
    pub output: PathBuf,

    /// Number of shapes to generate with the given parameters
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Sweep the standard parameter grid instead
    #[arg(long, conflicts_with = "count")]
    pub grid: bool,

    /// Seeds per grid combination
    #[arg(long, default_value_t = 3)]
    pub grid_seeds: usize,

    /// Master seed; drawn at random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 3)]
    pub extrusions: u32,

    /// Extrusion length range above the 0.1 minimum
    #[arg(long, default_value_t = 0.2)]
    pub extrude_range: f32,

    /// Twist range in degrees
    #[arg(long, default_value_t = 360.0)]
    pub rotation_range: f32,

    /// Render each shape after exporting it
    #[arg(long)]
    pub render: bool,

    #[command(flatten)]
    pub options: RenderOptions,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// STL file to measure
    pub file: PathBuf,

    /// Canonical size used for the framing report
    #[arg(long, default_value_t = 2.0)]
    pub target_size: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    /// ASCII frames written as text
    #[default]
    Preview,
    /// External program fed a JSON scene description
    Command,
}

/// Flags shared by every command that renders
#[derive(Args, Debug, Clone, Default)]
pub struct RenderOptions {
    /// TOML file with batch settings; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub frames: Option<u32>,

    #[arg(long)]
    pub fps: Option<u32>,

    /// Output size as WIDTHxHEIGHT
    #[arg(long)]
    pub resolution: Option<Resolution>,

    /// Turntable axis: X, Y or Z
    #[arg(long)]
    pub axis: Option<RotationAxis>,

    /// Turntable rotation over the whole shot
    #[arg(long)]
    pub degrees: Option<f32>,

    #[arg(long)]
    pub target_size: Option<f32>,

    /// turntable or orbit
    #[arg(long)]
    pub mode: Option<MotionMode>,

    /// Extension of render outputs, without the dot
    #[arg(long)]
    pub output_extension: Option<String>,

    #[arg(long, value_enum, default_value_t = RendererKind::Preview)]
    pub renderer: RendererKind,

    /// Program run by the command renderer
    #[arg(long)]
    pub program: Option<String>,

    /// Argument template for the program ({scene}, {output}, {mesh}); repeatable
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Keep the exported scene files after the program succeeds
    #[arg(long)]
    pub keep_scene_files: bool,

    /// Width of preview frames in characters
    #[arg(long, default_value_t = 64)]
    pub preview_columns: usize,

    /// Print the first preview frame of each item to the terminal
    #[arg(long)]
    pub echo: bool,
}

/// `WIDTHxHEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn as_array(&self) -> [u32; 2] {
        [self.width, self.height]
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{w}'"))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{h}'"))?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parsing() {
        assert_eq!(
            "640x480".parse::<Resolution>().unwrap(),
            Resolution {
                width: 640,
                height: 480
            }
        );
        assert_eq!("512X512".parse::<Resolution>().unwrap().as_array(), [512, 512]);
        assert!("512".parse::<Resolution>().is_err());
        assert!("ax10".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_render_command_parses() {
        let cli = Cli::try_parse_from([
            "turntable",
            "render",
            "in",
            "out",
            "--recursive",
            "--frames",
            "48",
            "--axis",
            "x",
            "--mode",
            "orbit",
            "--resolution",
            "256x128",
            "--renderer",
            "command",
            "--program",
            "blender",
            "--arg",
            "--scene",
            "--arg",
            "{scene}",
        ])
        .unwrap();

        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert!(args.recursive);
        assert_eq!(args.options.frames, Some(48));
        assert_eq!(args.options.axis, Some(RotationAxis::X));
        assert_eq!(args.options.mode, Some(MotionMode::Orbit));
        assert_eq!(args.options.resolution.map(|r| r.as_array()), Some([256, 128]));
        assert_eq!(args.options.renderer, RendererKind::Command);
        assert_eq!(args.options.args, vec!["--scene", "{scene}"]);
    }

    #[test]
    fn test_unknown_axis_is_rejected() {
        assert!(Cli::try_parse_from(["turntable", "render", "in", "out", "--axis", "w"]).is_err());
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["turntable", "generate", "shapes"]).unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.count, 1);
        assert!(!args.grid);
        assert!(!args.render);
        assert_eq!(args.extrusions, 3);
        assert_eq!(args.options.renderer, RendererKind::Preview);
    }
}
