mod common;

use common::{setup_test_config_dir, won_lost, write_file};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dealchart::config::ColorParser;
use dealchart::widgets::chart::ChartView;
use dealchart::{
    select_chart, App, AppConfig, AppEvent, ChartKind, ConfigStore, ConfigUpdate, PaletteTable,
    Theme, WidgetConfig,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use std::sync::mpsc::channel;
use tempfile::TempDir;

fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut text = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            text.push_str(buf[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn draw(app: &mut App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    (&mut *app).render(area, &mut buf);
    buffer_text(&buf)
}

#[test]
fn test_every_chart_kind_renders() {
    let theme = Theme::default();
    let parser = ColorParser::true_color();
    let store = ConfigStore::new(PaletteTable::builtin());
    let data = store.filtered_colorized(&dealchart::data::pipeline_data());

    for kind in ChartKind::ALL {
        let config = WidgetConfig {
            chart_kind: kind,
            ..WidgetConfig::default()
        };
        let spec = select_chart(&config, &data);
        for (w, h) in [(80, 24), (20, 6), (3, 2)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            ChartView::new(&spec, &config, &theme, &parser).render(area, &mut buf);
        }
    }
}

#[test]
fn test_empty_data_shows_message() {
    let theme = Theme::default();
    let parser = ColorParser::true_color();
    for kind in ChartKind::ALL {
        let config = WidgetConfig {
            chart_kind: kind,
            ..WidgetConfig::default()
        };
        let spec = select_chart(&config, &[]);
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        ChartView::new(&spec, &config, &theme, &parser).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("No data matches"), "{kind}");
    }
}

#[test]
fn test_app_cycles_through_all_kinds() {
    let (tx, _rx) = channel();
    let mut app = App::new(tx, ConfigStore::new(PaletteTable::builtin()), won_lost());
    for expected in ChartKind::ALL.iter().skip(1) {
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.config().chart_kind, *expected);
        let text = draw(&mut app, 100, 30);
        assert!(text.contains(expected.label()));
    }
    press(&mut app, KeyCode::Char('c'));
    assert_eq!(app.config().chart_kind, ChartKind::Pie);
}

#[test]
fn test_app_uses_configured_theme() {
    std::env::remove_var("NO_COLOR");
    let (_temp_dir, manager) = setup_test_config_dir();
    manager.ensure_config_dir().unwrap();
    std::fs::write(
        manager.config_path("config.toml"),
        "[theme.colors]\nprimary = \"red\"\n[widget]\ntitle = \"Q3 deals\"\n",
    )
    .unwrap();
    let config = AppConfig::load_from(&manager).unwrap();

    let theme = Theme::from_config(&config.theme).unwrap();
    let store =
        ConfigStore::with_config(config.widget_config().unwrap(), config.palette_table()).unwrap();
    let (tx, _rx) = channel();
    let mut app = App::new_with_theme(tx, store, won_lost(), theme)
        .with_parser(ColorParser::true_color());

    let area = Rect::new(0, 0, 100, 30);
    let mut buf = Buffer::empty(area);
    (&mut app).render(area, &mut buf);
    assert!(buffer_text(&buf).contains("Q3 deals"));
    assert_eq!(buf[(0, 0)].fg, ratatui::style::Color::Red);
}

#[test]
fn test_search_filters_rendered_points() {
    let (tx, _rx) = channel();
    let mut app = App::new(
        tx,
        ConfigStore::new(PaletteTable::builtin()),
        dealchart::data::pipeline_data(),
    );
    press(&mut app, KeyCode::Char('/'));
    for c in "pend".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    assert!(!app.searching);
    assert_eq!(app.store().search(), "pend");

    let text = draw(&mut app, 120, 30);
    assert!(text.contains("Points: 1/4"));
    assert!(text.contains("Pending: 100.0%"));

    press(&mut app, KeyCode::Char('x'));
    assert_eq!(app.store().search(), "");
    assert_eq!(app.visible().len(), 4);
}

#[test]
fn test_export_event_writes_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chart.png");
    let (tx, _rx) = channel();
    let mut store = ConfigStore::new(PaletteTable::builtin());
    store
        .update(
            ConfigUpdate::new()
                .with_chart_kind(ChartKind::Treemap)
                .with_show_labels(false)
                .with_show_values(false)
                .with_show_legend(false)
                .with_title(""),
        )
        .unwrap();
    let mut app = App::new(tx, store, won_lost());

    assert!(press(&mut app, KeyCode::Char('e')).is_some());
    app.event(&AppEvent::Export(path.clone()));
    assert!(path.exists());
    assert!(app.status().unwrap_or_default().starts_with("Exported"));
}

#[test]
fn test_reload_picks_up_file_changes() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "deals.json", r#"[{"name": "Won", "value": 5}]"#);
    let points = dealchart::data::load_data(&path, None).unwrap();
    let (tx, _rx) = channel();
    let mut app = App::new(tx, ConfigStore::new(PaletteTable::builtin()), points)
        .with_source(path.clone(), None);
    assert_eq!(app.names(), vec!["Won"]);

    std::fs::write(
        &path,
        r#"[{"name": "Won", "value": 5}, {"name": "Lost", "value": 3}]"#,
    )
    .unwrap();
    assert!(matches!(
        press(&mut app, KeyCode::Char('r')),
        Some(AppEvent::Reload)
    ));
    app.event(&AppEvent::Reload);
    assert_eq!(app.names(), vec!["Won", "Lost"]);
    assert_eq!(app.status(), Some("Reloaded 2 points"));

    std::fs::write(&path, "not json").unwrap();
    app.event(&AppEvent::Reload);
    assert!(app.status().unwrap_or_default().starts_with("Reload failed"));
    assert_eq!(app.names().len(), 2);
}
