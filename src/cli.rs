//! Command-line definitions, shared with the build script through the
//! `dealchart-cli` crate.

pub use dealchart_cli::{render_options_markdown, Args, DataFormat, LogLevel};
