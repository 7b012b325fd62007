/// Turntable command-line front end: argument parsing, settings files and
/// the preview and external-program renderers
pub mod app;
pub mod cli;
pub mod command;
pub mod preview;
pub mod settings;

pub use cli::{Cli, Commands};
pub use command::CommandRenderer;
pub use preview::{AsciiCanvas, PreviewRenderer};
