mod common;

use common::won_lost;
use dealchart::chart_spec::{format_percent, percent_of_total, Orientation, ScatterPoint};
use dealchart::{
    select_chart, ChartKind, ChartSpec, ConfigStore, ConfigUpdate, PaletteTable, WidgetConfig,
};

fn store_with(update: ConfigUpdate) -> ConfigStore {
    let mut store = ConfigStore::new(PaletteTable::builtin());
    store.update(update).expect("valid update");
    store
}

#[test]
fn test_every_kind_selects_matching_chart() {
    let data = ConfigStore::new(PaletteTable::builtin()).filtered_colorized(&won_lost());
    for kind in ChartKind::ALL {
        let config = WidgetConfig {
            chart_kind: kind,
            ..WidgetConfig::default()
        };
        let spec = select_chart(&config, &data);
        assert_eq!(spec.kind(), kind);
        assert_eq!(spec.len(), 2, "{kind}");
    }
}

#[test]
fn test_vibrant_scatter_points() {
    let store = store_with(
        ConfigUpdate::new()
            .with_chart_kind(ChartKind::Scatter)
            .with_color_scheme("vibrant"),
    );
    let data = store.filtered_colorized(&won_lost());
    assert_eq!(data[0].color, "#FF6B6B");
    assert_eq!(data[1].color, "#4ECDC4");

    match select_chart(store.config(), &data) {
        ChartSpec::Scatter { points } => assert_eq!(
            points,
            vec![
                ScatterPoint {
                    x: 1.0,
                    y: 80.0,
                    name: "Won".to_string()
                },
                ScatterPoint {
                    x: 2.0,
                    y: 10.0,
                    name: "Lost".to_string()
                },
            ]
        ),
        other => panic!("expected scatter, got {:?}", other.kind()),
    }
}

#[test]
fn test_donut_radii() {
    let store = store_with(ConfigUpdate::new().with_chart_kind(ChartKind::Donut));
    let data = store.filtered_colorized(&won_lost());
    match select_chart(store.config(), &data) {
        ChartSpec::Donut {
            outer_radius,
            inner_radius,
            ..
        } => {
            assert_eq!(outer_radius, 100.0);
            assert_eq!(inner_radius, 40.0);
        }
        other => panic!("expected donut, got {:?}", other.kind()),
    }

    let store = store_with(
        ConfigUpdate::new()
            .with_chart_kind(ChartKind::Donut)
            .with_inner_radius(0.0),
    );
    match select_chart(store.config(), &data) {
        ChartSpec::Donut { inner_radius, .. } => assert_eq!(inner_radius, 0.0),
        other => panic!("expected donut, got {:?}", other.kind()),
    }
}

#[test]
fn test_bar_layers_carry_orientation_and_corners() {
    let data = ConfigStore::new(PaletteTable::builtin()).filtered_colorized(&won_lost());
    let store = store_with(
        ConfigUpdate::new()
            .with_chart_kind(ChartKind::HorizontalBar)
            .with_border_radius(4.0),
    );
    match select_chart(store.config(), &data) {
        ChartSpec::HorizontalBar(layer) => {
            assert_eq!(layer.orientation, Orientation::Horizontal);
            assert!(!layer.stacked);
            assert_eq!(layer.corner_radius, [0.0, 4.0, 4.0, 0.0]);
            assert_eq!(layer.data.len(), 2);
        }
        other => panic!("expected horizontal bar, got {:?}", other.kind()),
    }

    let store = store_with(ConfigUpdate::new().with_chart_kind(ChartKind::Composed));
    match select_chart(store.config(), &data) {
        ChartSpec::Composed { bar, line } => {
            assert_eq!(bar.orientation, Orientation::Vertical);
            assert_eq!(bar.data, line);
        }
        other => panic!("expected composed, got {:?}", other.kind()),
    }
}

#[test]
fn test_treemap_cells_keep_point_colors() {
    let store = store_with(ConfigUpdate::new().with_chart_kind(ChartKind::Treemap));
    let data = store.filtered_colorized(&won_lost());
    match select_chart(store.config(), &data) {
        ChartSpec::Treemap { cells } => {
            assert_eq!(cells[0].name, "Won");
            assert_eq!(cells[0].size, 80.0);
            assert_eq!(cells[0].fill, data[0].color);
        }
        other => panic!("expected treemap, got {:?}", other.kind()),
    }
}

#[test]
fn test_empty_data_yields_empty_chart() {
    let config = WidgetConfig::default();
    let spec = select_chart(&config, &[]);
    assert!(spec.is_empty());
    assert!(percent_of_total(&[]).is_empty());
}

#[test]
fn test_percentages() {
    let data = ConfigStore::new(PaletteTable::builtin())
        .filtered_colorized(&dealchart::data::pipeline_data());
    let shares: Vec<String> = percent_of_total(&data)
        .into_iter()
        .map(format_percent)
        .collect();
    assert_eq!(shares, vec!["64.0%", "16.0%", "12.0%", "8.0%"]);

    let zeros = ConfigStore::new(PaletteTable::builtin())
        .filtered_colorized(&[dealchart::DataPoint::new("Won", 0.0)]);
    assert_eq!(percent_of_total(&zeros), vec![0.0]);
}

#[test]
fn test_spec_serializes_tagged_by_kind() {
    let store = store_with(ConfigUpdate::new().with_chart_kind(ChartKind::Radar));
    let data = store.filtered_colorized(&won_lost());
    let json = serde_json::to_value(select_chart(store.config(), &data)).unwrap();
    assert_eq!(json["kind"], "radar");
    assert_eq!(json["points"][0]["subject"], "Won");
    assert_eq!(json["points"][0]["fullMark"], 100.0);
}
