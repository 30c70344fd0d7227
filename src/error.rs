use thiserror::Error;

/// Rejected widget configuration values.
///
/// The settings sidebar clamps its own controls, so these only surface when the
/// store is driven directly (command line, config file, library callers).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("size must be between {min} and {max}, got {value}")]
    SizeOutOfRange { value: f64, min: f64, max: f64 },

    #[error("border_radius must be between {min} and {max}, got {value}")]
    BorderRadiusOutOfRange { value: f64, min: f64, max: f64 },

    #[error("inner_radius must be between 0 and {max} (size - 20), got {value}")]
    InnerRadiusOutOfRange { value: f64, max: f64 },

    #[error("unknown color scheme '{0}'")]
    UnknownColorScheme(String),

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("unknown chart type '{0}'")]
    UnknownChartKind(String),
}
