//! Shared CLI definitions for dealchart.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::Path;

/// File format for dataset files (used to bypass extension-based detection).
/// When `--format` is not specified, format is auto-detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DataFormat {
    /// JSON array of {"name": ..., "value": ...} objects
    Json,
    /// TOML file with a [[points]] array of name/value tables
    Toml,
}

impl DataFormat {
    /// Detect format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "json", "toml").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Verbosity of the log file
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Command-line arguments for dealchart
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "dealchart",
    version,
    about = "Sales-pipeline chart widget for the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Dataset file to chart (.json array of name/value objects, or .toml with [[points]]).
    /// When omitted, the built-in pipeline dataset is used.
    #[arg(long = "data", value_name = "PATH")]
    pub data: Option<std::path::PathBuf>,

    /// Force dataset format (json, toml). By default format is auto-detected from the file extension.
    #[arg(long = "format", value_enum)]
    pub format: Option<DataFormat>,

    /// Chart type to start with: pie, donut, bar, horizontalBar, stackedBar, line, area,
    /// scatter, radar, funnel, treemap, composed
    #[arg(long = "chart", value_name = "KIND")]
    pub chart: Option<String>,

    /// Color scheme to start with (default, vibrant, professional, pastel, monochrome, or a palette from config)
    #[arg(long = "scheme", value_name = "NAME")]
    pub scheme: Option<String>,

    /// Chart title
    #[arg(long = "title", value_name = "TEXT")]
    pub title: Option<String>,

    /// Outer radius for pie/donut charts (50-200)
    #[arg(long = "size", value_name = "N")]
    pub size: Option<f64>,

    /// Inner radius for donut charts (0 to size-20; default 40)
    #[arg(long = "inner-radius", value_name = "N")]
    pub inner_radius: Option<f64>,

    /// Bar corner radius (0-20)
    #[arg(long = "border-radius", value_name = "N")]
    pub border_radius: Option<f64>,

    /// Only chart points whose name contains this text (case-insensitive)
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// Only chart the named points (exact match). Use once per name.
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Write the chart to a PNG file and exit (no terminal UI)
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<std::path::PathBuf>,

    /// Print the selected chart specification as JSON and exit
    #[arg(long = "print-spec", action)]
    pub print_spec: bool,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Enable logging at this level (overrides config [logging])
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log file path (default: <cache dir>/dealchart/dealchart.log)
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<std::path::PathBuf>,

    /// Generate default configuration file at ~/.config/dealchart/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
