mod common;

use common::setup_test_config_dir;
use dealchart::config::{AppConfig, ColorParser};
use dealchart::ChartKind;
use std::fs;

fn write_user_config(config_manager: &dealchart::ConfigManager, content: &str) {
    config_manager
        .ensure_config_dir()
        .expect("Failed to create config dir");
    fs::write(config_manager.config_path("config.toml"), content)
        .expect("Failed to write config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.widget.chart_kind, ChartKind::Pie);
    assert_eq!(config.widget.title, "Deal status distribution");
    assert_eq!(config.widget.color_scheme, "default");
    assert_eq!(config.widget.size, 100.0);
    assert_eq!(config.widget.border_radius, 8.0);
    assert_eq!(config.widget.inner_radius, None);

    assert!(config.palettes.is_empty());
    assert_eq!((config.export.width, config.export.height), (800, 600));
    assert_eq!(config.theme.colors.primary, "cyan");
    assert_eq!(config.theme.colors.controls_bg, "indexed(236)");

    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert!(!config.debug.enabled);
}

#[test]
fn test_generated_default_config_matches_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();
    for section in [
        "[widget]",
        "[palettes]",
        "[export]",
        "[theme.colors]",
        "[logging]",
        "[debug]",
    ] {
        assert!(template.contains(section), "missing {}", section);
    }

    let parsed: AppConfig = toml::from_str(&template).expect("template parses");
    assert_eq!(parsed, AppConfig::default());
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");
    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("version = \"0.1\""));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "version = \"0.1\"\n[widget]\nchart_kind = \"radar\"\n");

    let path = config_manager
        .write_default_config(true)
        .expect("Write with force should succeed");
    let config = AppConfig::load_from(&config_manager).expect("load");
    assert!(path.exists());
    assert_eq!(config.widget.chart_kind, ChartKind::Pie);
}

#[test]
fn test_load_config_with_no_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Should load default config");
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_user_widget_section_overrides_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r##"
[widget]
chart_kind = "radar"
color_scheme = "ocean"
inner_radius = 30.0
show_grid = false

[palettes]
ocean = ["#003366", "#336699"]
"##,
    );

    let config = AppConfig::load_from(&config_manager).expect("load");
    assert_eq!(config.widget.chart_kind, ChartKind::Radar);
    assert!(!config.widget.show_grid);
    // untouched fields keep their defaults
    assert!(config.widget.show_legend);
    assert_eq!(config.widget.size, 100.0);

    let widget = config.widget_config().expect("valid widget config");
    assert_eq!(widget.color_scheme, "ocean");
    assert_eq!(widget.palette_colors, vec!["#003366", "#336699"]);
    assert_eq!(widget.inner_radius, Some(30.0));
    assert!(config.palette_table().names().iter().any(|n| n == "ocean"));
}

#[test]
fn test_chart_kind_accepts_alternate_spellings() {
    let config: AppConfig =
        toml::from_str("[widget]\nchart_kind = \"horizontal-bar\"\n").expect("parse");
    assert_eq!(config.widget.chart_kind, ChartKind::HorizontalBar);

    let result: Result<AppConfig, _> = toml::from_str("[widget]\nchart_kind = \"gauge\"\n");
    assert!(result.is_err());
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut other = AppConfig::default();
    other.widget.title = "Q3 pipeline".to_string();
    other.export.width = 1024;
    other.theme.colors.primary = "#ff0000".to_string();
    other.logging.file = Some("/tmp/dc.log".into());
    other
        .palettes
        .insert("mine".to_string(), vec!["red".to_string()]);

    base.merge(other);

    assert_eq!(base.widget.title, "Q3 pipeline");
    assert_eq!(base.export.width, 1024);
    assert_eq!(base.export.height, 600);
    assert_eq!(base.theme.colors.primary, "#ff0000");
    assert_eq!(base.theme.colors.secondary, "yellow");
    assert_eq!(base.logging.file, Some("/tmp/dc.log".into()));
    assert!(base.palettes.contains_key("mine"));
}

#[test]
fn test_merge_does_not_override_with_defaults() {
    let mut base = AppConfig::default();
    base.widget.chart_kind = ChartKind::Funnel;
    base.export.height = 300;

    base.merge(AppConfig::default());

    assert_eq!(base.widget.chart_kind, ChartKind::Funnel);
    assert_eq!(base.export.height, 300);
}

#[test]
fn test_validate_config_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "2.0".to_string(),
        ..AppConfig::default()
    };
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("Unsupported config version"));
}

#[test]
fn test_validate_config_out_of_range_widget_values() {
    let mut config = AppConfig::default();
    config.widget.size = 500.0;
    assert!(config.validate().unwrap_err().to_string().contains("[widget]"));

    let mut config = AppConfig::default();
    config.widget.inner_radius = Some(90.0);
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.widget.color_scheme = "neon".to_string();
    assert!(config.validate().unwrap_err().to_string().contains("neon"));
}

#[test]
fn test_validate_config_rejects_empty_palette_and_zero_export() {
    let mut config = AppConfig::default();
    config.palettes.insert("empty".to_string(), Vec::new());
    assert!(config.validate().unwrap_err().to_string().contains("empty"));

    let mut config = AppConfig::default();
    config.export.width = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_config_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "loud".to_string();
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Invalid logging level"));
}

#[test]
fn test_validate_config_with_invalid_color_names_field() {
    std::env::remove_var("NO_COLOR");
    let mut config = AppConfig::default();
    config.theme.colors.chart_grid = "not_a_color".to_string();

    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("chart_grid"), "error should name the field: {}", err);
}

#[test]
fn test_invalid_user_file_names_the_path() {
    std::env::remove_var("NO_COLOR");
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[theme.colors]\nprimary = \"nope\"\n");

    let err = AppConfig::load_from(&config_manager)
        .unwrap_err()
        .to_string();
    assert!(err.contains("config.toml"));
}

#[test]
fn test_validate_config_with_mixed_colors() {
    let mut config = AppConfig::default();
    config.theme.colors.primary = "#00ff00".to_string();
    config.theme.colors.border = "indexed(33)".to_string();
    config.theme.colors.highlight = "bright_yellow".to_string();
    assert!(config.validate().is_ok());

    let parser = ColorParser::new();
    assert!(parser.parse(&config.theme.colors.border).is_ok());
}
