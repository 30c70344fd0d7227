//! Widget configuration store: the active chart settings, the search/filter
//! state, and the filtered, colorized view of the dataset derived from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::data::{ColorizedDataPoint, DataPoint};
use crate::error::ConfigError;
use crate::palette::{self, PaletteTable, DEFAULT_SCHEME};

pub const SIZE_MIN: f64 = 50.0;
pub const SIZE_MAX: f64 = 200.0;
pub const BORDER_RADIUS_MIN: f64 = 0.0;
pub const BORDER_RADIUS_MAX: f64 = 20.0;
/// Inner radius must stay at least this far inside the outer radius.
pub const INNER_RADIUS_GAP: f64 = 20.0;
/// Inner radius used for donut charts when none is set.
pub const DEFAULT_INNER_RADIUS: f64 = 40.0;

pub const DEFAULT_TITLE: &str = "Deal status distribution";
pub const DEFAULT_SIZE: f64 = 100.0;
pub const DEFAULT_BORDER_RADIUS: f64 = 8.0;

/// Chart type. Exactly one is active at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChartKind {
    #[default]
    Pie,
    Donut,
    Bar,
    HorizontalBar,
    StackedBar,
    Line,
    Area,
    Scatter,
    Radar,
    Funnel,
    Treemap,
    Composed,
}

impl ChartKind {
    pub const ALL: [Self; 12] = [
        Self::Pie,
        Self::Donut,
        Self::Bar,
        Self::HorizontalBar,
        Self::StackedBar,
        Self::Line,
        Self::Area,
        Self::Scatter,
        Self::Radar,
        Self::Funnel,
        Self::Treemap,
        Self::Composed,
    ];

    /// Identifier used on the command line, in config files and in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pie => "pie",
            Self::Donut => "donut",
            Self::Bar => "bar",
            Self::HorizontalBar => "horizontalBar",
            Self::StackedBar => "stackedBar",
            Self::Line => "line",
            Self::Area => "area",
            Self::Scatter => "scatter",
            Self::Radar => "radar",
            Self::Funnel => "funnel",
            Self::Treemap => "treemap",
            Self::Composed => "composed",
        }
    }

    /// Label shown in the chart type selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pie => "Pie Chart",
            Self::Donut => "Donut Chart",
            Self::Bar => "Bar Chart",
            Self::HorizontalBar => "Horizontal Bar",
            Self::StackedBar => "Stacked Bar",
            Self::Line => "Line Chart",
            Self::Area => "Area Chart",
            Self::Scatter => "Scatter Plot",
            Self::Radar => "Radar Chart",
            Self::Funnel => "Funnel Chart",
            Self::Treemap => "Treemap",
            Self::Composed => "Combined Chart",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `-` and `_` are ignored, so `horizontal-bar` and
/// `stacked_bar` parse too.
impl FromStr for ChartKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(|c| c.to_lowercase())
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ConfigError::UnknownChartKind(s.to_string()))
    }
}

impl TryFrom<String> for ChartKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChartKind> for String {
    fn from(kind: ChartKind) -> Self {
        kind.as_str().to_string()
    }
}

/// The widget's display configuration. Replaced as a whole on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub chart_kind: ChartKind,
    pub title: String,
    pub show_legend: bool,
    pub show_labels: bool,
    pub show_values: bool,
    pub show_grid: bool,
    pub show_tooltip: bool,
    pub animated: bool,
    pub color_scheme: String,
    pub palette_colors: Vec<String>,
    pub size: f64,
    pub border_radius: f64,
    pub inner_radius: Option<f64>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let palettes = PaletteTable::builtin();
        Self {
            chart_kind: ChartKind::Pie,
            title: DEFAULT_TITLE.to_string(),
            show_legend: true,
            show_labels: true,
            show_values: true,
            show_grid: true,
            show_tooltip: true,
            animated: true,
            color_scheme: DEFAULT_SCHEME.to_string(),
            palette_colors: palettes
                .get(DEFAULT_SCHEME)
                .map(|c| c.to_vec())
                .unwrap_or_default(),
            size: DEFAULT_SIZE,
            border_radius: DEFAULT_BORDER_RADIUS,
            inner_radius: None,
        }
    }
}

impl WidgetConfig {
    /// Inner radius the donut chart is drawn with.
    pub fn effective_inner_radius(&self) -> f64 {
        self.inner_radius.unwrap_or(DEFAULT_INNER_RADIUS)
    }

    /// Largest inner radius allowed for the current size.
    pub fn max_inner_radius(&self) -> f64 {
        (self.size - INNER_RADIUS_GAP).max(0.0)
    }

    /// Check numeric ranges, the color scheme name and the palette.
    pub fn validate(&self, palettes: &PaletteTable) -> Result<(), ConfigError> {
        if !(SIZE_MIN..=SIZE_MAX).contains(&self.size) {
            return Err(ConfigError::SizeOutOfRange {
                value: self.size,
                min: SIZE_MIN,
                max: SIZE_MAX,
            });
        }
        if !(BORDER_RADIUS_MIN..=BORDER_RADIUS_MAX).contains(&self.border_radius) {
            return Err(ConfigError::BorderRadiusOutOfRange {
                value: self.border_radius,
                min: BORDER_RADIUS_MIN,
                max: BORDER_RADIUS_MAX,
            });
        }
        if let Some(r) = self.inner_radius {
            let max = self.max_inner_radius();
            if !(0.0..=max).contains(&r) {
                return Err(ConfigError::InnerRadiusOutOfRange { value: r, max });
            }
        }
        if !palettes.contains(&self.color_scheme) {
            return Err(ConfigError::UnknownColorScheme(self.color_scheme.clone()));
        }
        if self.palette_colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}

/// A partial configuration: only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub chart_kind: Option<ChartKind>,
    pub title: Option<String>,
    pub show_legend: Option<bool>,
    pub show_labels: Option<bool>,
    pub show_values: Option<bool>,
    pub show_grid: Option<bool>,
    pub show_tooltip: Option<bool>,
    pub animated: Option<bool>,
    pub color_scheme: Option<String>,
    pub palette_colors: Option<Vec<String>>,
    pub size: Option<f64>,
    pub border_radius: Option<f64>,
    /// `Some(None)` clears the inner radius back to the default.
    pub inner_radius: Option<Option<f64>>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chart_kind(mut self, kind: ChartKind) -> Self {
        self.chart_kind = Some(kind);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_show_legend(mut self, on: bool) -> Self {
        self.show_legend = Some(on);
        self
    }

    pub fn with_show_labels(mut self, on: bool) -> Self {
        self.show_labels = Some(on);
        self
    }

    pub fn with_show_values(mut self, on: bool) -> Self {
        self.show_values = Some(on);
        self
    }

    pub fn with_show_grid(mut self, on: bool) -> Self {
        self.show_grid = Some(on);
        self
    }

    pub fn with_show_tooltip(mut self, on: bool) -> Self {
        self.show_tooltip = Some(on);
        self
    }

    pub fn with_animated(mut self, on: bool) -> Self {
        self.animated = Some(on);
        self
    }

    pub fn with_color_scheme(mut self, name: impl Into<String>) -> Self {
        self.color_scheme = Some(name.into());
        self
    }

    pub fn with_palette_colors(mut self, colors: Vec<String>) -> Self {
        self.palette_colors = Some(colors);
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_border_radius(mut self, radius: f64) -> Self {
        self.border_radius = Some(radius);
        self
    }

    pub fn with_inner_radius(mut self, radius: f64) -> Self {
        self.inner_radius = Some(Some(radius));
        self
    }

    pub fn clear_inner_radius(mut self) -> Self {
        self.inner_radius = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `base` with this update applied. A color scheme in the update always
    /// resets the palette to that scheme's preset, even if the same update
    /// carries custom colors.
    pub fn apply_to(
        self,
        base: &WidgetConfig,
        palettes: &PaletteTable,
    ) -> Result<WidgetConfig, ConfigError> {
        let mut next = base.clone();
        if let Some(kind) = self.chart_kind {
            next.chart_kind = kind;
        }
        if let Some(title) = self.title {
            next.title = title;
        }
        if let Some(on) = self.show_legend {
            next.show_legend = on;
        }
        if let Some(on) = self.show_labels {
            next.show_labels = on;
        }
        if let Some(on) = self.show_values {
            next.show_values = on;
        }
        if let Some(on) = self.show_grid {
            next.show_grid = on;
        }
        if let Some(on) = self.show_tooltip {
            next.show_tooltip = on;
        }
        if let Some(on) = self.animated {
            next.animated = on;
        }
        if let Some(colors) = self.palette_colors {
            next.palette_colors = colors;
        }
        if let Some(scheme) = self.color_scheme {
            let preset = palettes
                .get(&scheme)
                .ok_or_else(|| ConfigError::UnknownColorScheme(scheme.clone()))?;
            next.palette_colors = preset.to_vec();
            next.color_scheme = scheme;
        }
        if let Some(size) = self.size {
            next.size = size;
        }
        if let Some(radius) = self.border_radius {
            next.border_radius = radius;
        }
        if let Some(radius) = self.inner_radius {
            next.inner_radius = radius;
        }
        Ok(next)
    }
}

type Observer = Box<dyn FnMut(&WidgetConfig)>;

/// Owns the widget configuration plus search and name filters.
pub struct ConfigStore {
    config: WidgetConfig,
    palettes: PaletteTable,
    search: String,
    filters: BTreeSet<String>,
    observer: Option<Observer>,
}

impl ConfigStore {
    pub fn new(palettes: PaletteTable) -> Self {
        Self {
            config: WidgetConfig::default(),
            palettes,
            search: String::new(),
            filters: BTreeSet::new(),
            observer: None,
        }
    }

    /// Start from `config` instead of the defaults.
    pub fn with_config(config: WidgetConfig, palettes: PaletteTable) -> Result<Self, ConfigError> {
        config.validate(&palettes)?;
        let mut store = Self::new(palettes);
        store.config = config;
        Ok(store)
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn palettes(&self) -> &PaletteTable {
        &self.palettes
    }

    /// Register the change listener. Replaces any earlier one.
    pub fn on_change(&mut self, observer: impl FnMut(&WidgetConfig) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Apply `update` and notify the listener with the new configuration.
    /// On error nothing changes and the listener is not called.
    pub fn update(&mut self, update: ConfigUpdate) -> Result<(), ConfigError> {
        let next = match update
            .apply_to(&self.config, &self.palettes)
            .and_then(|next| next.validate(&self.palettes).map(|_| next))
        {
            Ok(next) => next,
            Err(e) => {
                tracing::debug!(error = %e, "config update rejected");
                return Err(e);
            }
        };
        self.config = next;
        tracing::debug!(
            chart = %self.config.chart_kind,
            scheme = %self.config.color_scheme,
            "config updated"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.config);
        }
        Ok(())
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn filters(&self) -> &BTreeSet<String> {
        &self.filters
    }

    /// Add `name` to the filter set, or remove it if already present.
    pub fn toggle_filter(&mut self, name: &str) {
        if !self.filters.remove(name) {
            self.filters.insert(name.to_string());
        }
    }

    pub fn set_filters<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = names.into_iter().map(Into::into).collect();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Points passing the search and filter set, colored from the current palette
    /// by their position after filtering.
    pub fn filtered_colorized(&self, all: &[DataPoint]) -> Vec<ColorizedDataPoint> {
        let visible = filter_points(all, &self.search, &self.filters);
        colorize(visible, &self.config.palette_colors)
    }
}

/// Points whose name contains `search` (case-insensitive) and, when `filters` is
/// non-empty, is one of `filters` exactly. Input order is kept.
pub fn filter_points<'a>(
    all: &'a [DataPoint],
    search: &str,
    filters: &BTreeSet<String>,
) -> Vec<&'a DataPoint> {
    let needle = search.to_lowercase();
    all.iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .filter(|p| filters.is_empty() || filters.contains(&p.name))
        .collect()
}

/// Assign `palette[i % len]` to the i-th point.
pub fn colorize<'a>(
    points: impl IntoIterator<Item = &'a DataPoint>,
    palette: &[String],
) -> Vec<ColorizedDataPoint> {
    points
        .into_iter()
        .enumerate()
        .map(|(i, p)| ColorizedDataPoint {
            name: p.name.clone(),
            value: p.value,
            color: palette::color_at(palette, i).unwrap_or_default().to_string(),
        })
        .collect()
}
