use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::palette::{PaletteTable, DEFAULT_SCHEME};
use crate::widget::{
    ChartKind, WidgetConfig, DEFAULT_BORDER_RADIUS, DEFAULT_SIZE, DEFAULT_TITLE,
};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Default configuration template, fully commented
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read and parse `config.toml`. A missing file yields the defaults.
    pub fn load_user_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub widget: WidgetSection,
    /// User palettes, added to the built-in color schemes
    pub palettes: BTreeMap<String, Vec<String>>,
    pub export: ExportConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
    pub debug: DebugConfig,
}

/// Startup values for the widget configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WidgetSection {
    pub chart_kind: ChartKind,
    pub title: String,
    pub color_scheme: String,
    pub size: f64,
    pub border_radius: f64,
    pub inner_radius: Option<f64>,
    pub show_legend: bool,
    pub show_labels: bool,
    pub show_values: bool,
    pub show_grid: bool,
    pub show_tooltip: bool,
    pub animated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub error: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub border: String,
    pub border_active: String,
    pub chart_axis: String,
    pub chart_grid: String,
    pub highlight: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: String,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            widget: WidgetSection::default(),
            palettes: BTreeMap::new(),
            export: ExportConfig::default(),
            theme: ThemeConfig::default(),
            logging: LoggingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for WidgetSection {
    fn default() -> Self {
        Self {
            chart_kind: ChartKind::Pie,
            title: DEFAULT_TITLE.to_string(),
            color_scheme: DEFAULT_SCHEME.to_string(),
            size: DEFAULT_SIZE,
            border_radius: DEFAULT_BORDER_RADIUS,
            inner_radius: None,
            show_legend: true,
            show_labels: true,
            show_values: true,
            show_grid: true,
            show_tooltip: true,
            animated: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            border: "cyan".to_string(),
            border_active: "yellow".to_string(),
            chart_axis: "dark_gray".to_string(),
            chart_grid: "indexed(238)".to_string(),
            highlight: "yellow".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    /// Load defaults merged with the user file managed by `manager`
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(manager.load_user_config()?);
        config.validate().map_err(|e| {
            eyre!(
                "Invalid config file at {}: {}",
                manager.config_path("config.toml").display(),
                e
            )
        })?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.widget.merge(other.widget);
        self.palettes.extend(other.palettes);
        self.export.merge(other.export);
        self.theme.merge(other.theme);
        self.logging.merge(other.logging);
        self.debug.merge(other.debug);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        for (name, colors) in &self.palettes {
            if colors.is_empty() {
                return Err(eyre!("Palette '{}' must contain at least one color", name));
            }
        }

        self.widget_config()
            .map_err(|e| eyre!("Invalid [widget] setting: {}", e))?;

        if self.export.width == 0 || self.export.height == 0 {
            return Err(eyre!(
                "export width and height must be greater than 0, got {}x{}",
                self.export.width,
                self.export.height
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(eyre!(
                "Invalid logging level: {}. Must be one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    /// Built-in schemes plus the `[palettes]` table
    pub fn palette_table(&self) -> PaletteTable {
        PaletteTable::with_user_palettes(&self.palettes)
    }

    /// The `[widget]` section as a validated widget configuration
    pub fn widget_config(&self) -> std::result::Result<WidgetConfig, crate::error::ConfigError> {
        let palettes = self.palette_table();
        let w = &self.widget;
        let palette_colors = palettes
            .get(&w.color_scheme)
            .map(|c| c.to_vec())
            .ok_or_else(|| crate::error::ConfigError::UnknownColorScheme(w.color_scheme.clone()))?;
        let config = WidgetConfig {
            chart_kind: w.chart_kind,
            title: w.title.clone(),
            show_legend: w.show_legend,
            show_labels: w.show_labels,
            show_values: w.show_values,
            show_grid: w.show_grid,
            show_tooltip: w.show_tooltip,
            animated: w.animated,
            color_scheme: w.color_scheme.clone(),
            palette_colors,
            size: w.size,
            border_radius: w.border_radius,
            inner_radius: w.inner_radius,
        };
        config.validate(&palettes)?;
        Ok(config)
    }
}

/// Assign `other.$field` when it differs from the section default
macro_rules! merge_fields {
    ($self:ident, $other:ident, $default:ident, $($field:ident),+ $(,)?) => {
        $(
            if $other.$field != $default.$field {
                $self.$field = $other.$field;
            }
        )+
    };
}

impl WidgetSection {
    pub fn merge(&mut self, other: Self) {
        let default = WidgetSection::default();
        merge_fields!(
            self,
            other,
            default,
            chart_kind,
            title,
            color_scheme,
            size,
            border_radius,
            show_legend,
            show_labels,
            show_values,
            show_grid,
            show_tooltip,
            animated,
        );
        if other.inner_radius.is_some() {
            self.inner_radius = other.inner_radius;
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        merge_fields!(self, other, default, width, height);
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    /// Color names paired with their configured values
    fn entries(&self) -> [(&'static str, &str); 12] {
        [
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("error", self.error.as_str()),
            ("dimmed", self.dimmed.as_str()),
            ("controls_bg", self.controls_bg.as_str()),
            ("text_primary", self.text_primary.as_str()),
            ("text_secondary", self.text_secondary.as_str()),
            ("border", self.border.as_str()),
            ("border_active", self.border_active.as_str()),
            ("chart_axis", self.chart_axis.as_str()),
            ("chart_grid", self.chart_grid.as_str()),
            ("highlight", self.highlight.as_str()),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        merge_fields!(
            self,
            other,
            default,
            primary,
            secondary,
            error,
            dimmed,
            controls_bg,
            text_primary,
            text_secondary,
            border,
            border_active,
            chart_axis,
            chart_grid,
            highlight,
        );
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        merge_fields!(self, other, default, enabled, level);
        if other.file.is_some() {
            self.file = other.file;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Color names accepted in theme and palette tokens. Spaces become
/// underscores and "grey" is read as "gray" before lookup.
pub const NAMED_COLORS: [(&str, Color); 20] = [
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("bright_black", Color::Indexed(8)),
    ("bright_red", Color::Indexed(9)),
    ("bright_green", Color::Indexed(10)),
    ("bright_yellow", Color::Indexed(11)),
    ("bright_blue", Color::Indexed(12)),
    ("bright_magenta", Color::Indexed(13)),
    ("bright_cyan", Color::Indexed(14)),
    ("bright_white", Color::Indexed(15)),
    ("gray", Color::Indexed(8)),
    ("dark_gray", Color::Indexed(8)),
    ("light_gray", Color::Indexed(7)),
    ("reset", Color::Reset),
];

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parser that keeps hex colors as RGB regardless of the terminal (PNG export)
    pub fn true_color() -> Self {
        Self {
            supports_true_color: true,
            supports_256: true,
            no_color: false,
        }
    }

    /// Parse a color token: `#rrggbb`, `indexed(n)` or a name from [`NAMED_COLORS`].
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let token = s.trim();
        if token.starts_with('#') {
            let (r, g, b) = parse_hex(token)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        let lower = token.to_lowercase();
        if let Some(inner) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return inner.parse::<u8>().map(Color::Indexed).map_err(|_| {
                eyre!("Invalid indexed color: '{}'. Expected indexed(0-255)", token)
            });
        }

        let name = lower.replace(' ', "_").replace("grey", "gray");
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, color)| *color)
            .ok_or_else(|| {
                eyre!(
                    "Unknown color name: '{}'. Use an ANSI name (red, bright_blue), \
                     indexed(n) or #rrggbb",
                    token
                )
            })
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// `#rrggbb` to its components.
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.is_ascii())
        .ok_or_else(|| eyre!("Invalid hex color: '{}'. Expected #rrggbb", s))?;
    let component = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| eyre!("Invalid hex digits in color: '{}'", s))
    };
    Ok((component(0)?, component(2)?, component(4)?))
}

/// Convert RGB to nearest 256-color palette index (xterm palette)
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    // Near-gray values map to the grayscale ramp (232-255)
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let r_bright = r > 128;
    let g_bright = g > 128;
    let b_bright = b > 128;

    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r_bright, g_bright, b_bright) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Self {
            colors: HashMap::new(),
        })
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_merge_takes_non_default_values() {
        let mut base = WidgetSection::default();
        let other = WidgetSection {
            chart_kind: ChartKind::Radar,
            show_grid: false,
            inner_radius: Some(30.0),
            ..WidgetSection::default()
        };
        base.merge(other);
        assert_eq!(base.chart_kind, ChartKind::Radar);
        assert!(!base.show_grid);
        assert!(base.show_legend);
        assert_eq!(base.inner_radius, Some(30.0));
    }

    #[test]
    fn widget_config_uses_scheme_preset() {
        let mut config = AppConfig::default();
        config.widget.color_scheme = "professional".to_string();
        let widget = config.widget_config().unwrap();
        assert_eq!(widget.palette_colors[0], "#2C3E50");
    }

    #[test]
    fn user_palette_is_selectable() {
        let mut config = AppConfig::default();
        config
            .palettes
            .insert("ocean".to_string(), vec!["#003366".to_string()]);
        config.widget.color_scheme = "ocean".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.widget_config().unwrap().palette_colors, vec!["#003366"]);
    }

    #[test]
    fn true_color_parser_keeps_rgb() {
        let parser = ColorParser::true_color();
        assert_eq!(parser.parse("#4ECDC4").unwrap(), Color::Rgb(0x4E, 0xCD, 0xC4));
    }
}
