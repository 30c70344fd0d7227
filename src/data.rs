//! Dataset types and loading.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::DataFormat;

/// One named value supplied by the host. Immutable once handed to the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub name: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A data point with its display color assigned from the active palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorizedDataPoint {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Deal stages shown when no dataset file is given.
pub fn pipeline_data() -> Vec<DataPoint> {
    vec![
        DataPoint::new("Won", 80.0),
        DataPoint::new("Test", 20.0),
        DataPoint::new("Pending", 15.0),
        DataPoint::new("Lost", 10.0),
    ]
}

#[derive(Deserialize)]
struct TomlDataset {
    #[serde(default)]
    points: Vec<DataPoint>,
}

/// Load a dataset file. `format` overrides extension-based detection.
pub fn load_data(path: &Path, format: Option<DataFormat>) -> Result<Vec<DataPoint>> {
    let format = format
        .or_else(|| DataFormat::from_path(path))
        .ok_or_else(|| {
            eyre!(
                "Cannot tell the format of {}. Use a .json or .toml file, or pass --format",
                path.display()
            )
        })?;

    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre!("Failed to read data file at {}: {}", path.display(), e))?;

    let points = parse_data(&content, format)
        .map_err(|e| eyre!("Failed to parse data file at {}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), points = points.len(), "loaded dataset");
    Ok(points)
}

/// Parse dataset text in the given format.
pub fn parse_data(content: &str, format: DataFormat) -> Result<Vec<DataPoint>> {
    let points: Vec<DataPoint> = match format {
        DataFormat::Json => serde_json::from_str(content)?,
        DataFormat::Toml => toml::from_str::<TomlDataset>(content)?.points,
    };
    if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
        return Err(eyre!("value for '{}' is not a finite number", p.name));
    }
    Ok(points)
}
