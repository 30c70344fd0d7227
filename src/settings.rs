//! Settings sidebar state: which control has focus, and how key presses on it
//! become configuration updates or filter toggles.

use crossterm::event::{KeyCode, KeyEvent};

use crate::palette::PaletteTable;
use crate::widget::{
    ChartKind, ConfigUpdate, WidgetConfig, BORDER_RADIUS_MAX, BORDER_RADIUS_MIN,
    DEFAULT_INNER_RADIUS, INNER_RADIUS_GAP, SIZE_MIN,
};
use crate::widgets::text_input::{TextInput, TextInputEvent};

/// Slider bounds offered by the sidebar. The store accepts a wider size range.
pub const SIZE_SLIDER_MAX: f64 = 150.0;
pub const SIZE_STEP: f64 = 5.0;
pub const INNER_RADIUS_SLIDER_MIN: f64 = 20.0;
pub const INNER_RADIUS_SLIDER_MAX: f64 = 80.0;
pub const INNER_RADIUS_STEP: f64 = 5.0;
pub const BORDER_RADIUS_STEP: f64 = 1.0;

/// A focusable row in the sidebar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    #[default]
    ChartType,
    Title,
    ColorScheme,
    ShowLegend,
    ShowLabels,
    ShowValues,
    Animated,
    ShowGrid,
    ShowTooltip,
    /// Only offered for pie charts
    Size,
    /// Only offered for donut charts
    InnerRadius,
    BorderRadius,
    /// Filter checkbox for the n-th data point name
    Filter(usize),
}

impl SettingsField {
    pub fn label(self) -> &'static str {
        match self {
            Self::ChartType => "Chart Type",
            Self::Title => "Chart Title",
            Self::ColorScheme => "Color Scheme",
            Self::ShowLegend => "Show Legend",
            Self::ShowLabels => "Show Labels",
            Self::ShowValues => "Show Values",
            Self::Animated => "Animation",
            Self::ShowGrid => "Show Grid",
            Self::ShowTooltip => "Show Tooltip",
            Self::Size => "Size",
            Self::InnerRadius => "Inner Radius",
            Self::BorderRadius => "Border Radius",
            Self::Filter(_) => "Filter",
        }
    }

    pub fn is_toggle(self) -> bool {
        matches!(
            self,
            Self::ShowLegend
                | Self::ShowLabels
                | Self::ShowValues
                | Self::Animated
                | Self::ShowGrid
                | Self::ShowTooltip
        )
    }
}

/// Fields shown for `kind` with `filter_count` filterable names, in display order.
pub fn visible_fields(kind: ChartKind, filter_count: usize) -> Vec<SettingsField> {
    let mut fields = vec![
        SettingsField::ChartType,
        SettingsField::Title,
        SettingsField::ColorScheme,
        SettingsField::ShowLegend,
        SettingsField::ShowLabels,
        SettingsField::ShowValues,
        SettingsField::Animated,
        SettingsField::ShowGrid,
        SettingsField::ShowTooltip,
    ];
    match kind {
        ChartKind::Pie => fields.push(SettingsField::Size),
        ChartKind::Donut => fields.push(SettingsField::InnerRadius),
        _ => {}
    }
    fields.push(SettingsField::BorderRadius);
    fields.extend((0..filter_count).map(SettingsField::Filter));
    fields
}

/// What a key press in the sidebar asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    None,
    Update(ConfigUpdate),
    ToggleFilter(usize),
    /// Esc outside of title editing
    Close,
}

/// Move `value` by `steps` increments of `step`, clamped to `[min, max]`.
/// Step a slider value and clamp it to `[min, max]`. A value already outside the
/// slider range (set from the command line or config file) is never pulled
/// further than where it stands.
fn step_value(value: f64, steps: i32, step: f64, min: f64, max: f64) -> f64 {
    (value + steps as f64 * step).clamp(min.min(value), max.max(value))
}

/// Sidebar focus and the title editor.
#[derive(Default)]
pub struct SettingsPanel {
    pub focus: SettingsField,
    pub title_input: TextInput,
    pub editing_title: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep focus on a visible row after the chart kind or dataset changed.
    pub fn clamp_focus(&mut self, kind: ChartKind, filter_count: usize) {
        let fields = visible_fields(kind, filter_count);
        if !fields.contains(&self.focus) {
            self.focus = match self.focus {
                SettingsField::Filter(_) if filter_count > 0 => {
                    SettingsField::Filter(filter_count - 1)
                }
                _ => SettingsField::BorderRadius,
            };
        }
    }

    pub fn next_focus(&mut self, kind: ChartKind, filter_count: usize) {
        self.move_focus(kind, filter_count, 1);
    }

    pub fn prev_focus(&mut self, kind: ChartKind, filter_count: usize) {
        self.move_focus(kind, filter_count, -1);
    }

    fn move_focus(&mut self, kind: ChartKind, filter_count: usize, delta: isize) {
        let fields = visible_fields(kind, filter_count);
        let len = fields.len() as isize;
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        self.focus = fields[((pos + delta).rem_euclid(len)) as usize];
    }

    /// Update for moving the focused control `steps` positions (arrow keys).
    pub fn adjust(
        &self,
        config: &WidgetConfig,
        palettes: &PaletteTable,
        steps: i32,
    ) -> ConfigUpdate {
        let update = ConfigUpdate::new();
        match self.focus {
            SettingsField::ChartType => {
                let kind = if steps >= 0 {
                    config.chart_kind.next()
                } else {
                    config.chart_kind.prev()
                };
                update.with_chart_kind(kind)
            }
            SettingsField::ColorScheme => {
                let name = if steps >= 0 {
                    palettes.next_name(&config.color_scheme)
                } else {
                    palettes.prev_name(&config.color_scheme)
                };
                update.with_color_scheme(name)
            }
            SettingsField::Size => {
                // an inner radius kept from donut mode still bounds the size
                let min = config
                    .inner_radius
                    .map_or(SIZE_MIN, |r| SIZE_MIN.max(r + INNER_RADIUS_GAP));
                update.with_size(step_value(
                    config.size,
                    steps,
                    SIZE_STEP,
                    min,
                    SIZE_SLIDER_MAX,
                ))
            }
            SettingsField::InnerRadius => {
                let max = INNER_RADIUS_SLIDER_MAX.min(config.max_inner_radius());
                let current = config.inner_radius.unwrap_or(DEFAULT_INNER_RADIUS);
                update.with_inner_radius(step_value(
                    current,
                    steps,
                    INNER_RADIUS_STEP,
                    INNER_RADIUS_SLIDER_MIN.min(max),
                    max,
                ))
            }
            SettingsField::BorderRadius => update.with_border_radius(step_value(
                config.border_radius,
                steps,
                BORDER_RADIUS_STEP,
                BORDER_RADIUS_MIN,
                BORDER_RADIUS_MAX,
            )),
            field if field.is_toggle() => self.toggle(config),
            _ => update,
        }
    }

    /// Update flipping the focused switch. Empty for non-switch rows.
    fn toggle(&self, config: &WidgetConfig) -> ConfigUpdate {
        let update = ConfigUpdate::new();
        match self.focus {
            SettingsField::ShowLegend => update.with_show_legend(!config.show_legend),
            SettingsField::ShowLabels => update.with_show_labels(!config.show_labels),
            SettingsField::ShowValues => update.with_show_values(!config.show_values),
            SettingsField::Animated => update.with_animated(!config.animated),
            SettingsField::ShowGrid => update.with_show_grid(!config.show_grid),
            SettingsField::ShowTooltip => update.with_show_tooltip(!config.show_tooltip),
            _ => update,
        }
    }

    fn update_action(update: ConfigUpdate) -> SettingsAction {
        if update.is_empty() {
            SettingsAction::None
        } else {
            SettingsAction::Update(update)
        }
    }

    pub fn handle_key(
        &mut self,
        event: &KeyEvent,
        config: &WidgetConfig,
        palettes: &PaletteTable,
        filter_count: usize,
    ) -> SettingsAction {
        if self.editing_title {
            return match self.title_input.handle_key(event) {
                TextInputEvent::Changed => SettingsAction::Update(
                    ConfigUpdate::new().with_title(self.title_input.value()),
                ),
                TextInputEvent::Submit | TextInputEvent::Cancel => {
                    self.editing_title = false;
                    self.title_input.set_focused(false);
                    SettingsAction::None
                }
                TextInputEvent::None => SettingsAction::None,
            };
        }

        let kind = config.chart_kind;
        match event.code {
            KeyCode::Esc => SettingsAction::Close,
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                self.next_focus(kind, filter_count);
                SettingsAction::None
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                self.prev_focus(kind, filter_count);
                SettingsAction::None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                Self::update_action(self.adjust(config, palettes, 1))
            }
            KeyCode::Left | KeyCode::Char('h') => {
                Self::update_action(self.adjust(config, palettes, -1))
            }
            KeyCode::Enter | KeyCode::Char(' ') => match self.focus {
                SettingsField::Title => {
                    self.editing_title = true;
                    self.title_input.set_value(config.title.clone());
                    self.title_input.set_focused(true);
                    SettingsAction::None
                }
                SettingsField::Filter(i) => SettingsAction::ToggleFilter(i),
                field if field.is_toggle() => Self::update_action(self.toggle(config)),
                _ => Self::update_action(self.adjust(config, palettes, 1)),
            },
            _ => SettingsAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn size_row_only_for_pie_and_inner_radius_only_for_donut() {
        let pie = visible_fields(ChartKind::Pie, 0);
        assert!(pie.contains(&SettingsField::Size));
        assert!(!pie.contains(&SettingsField::InnerRadius));

        let donut = visible_fields(ChartKind::Donut, 0);
        assert!(donut.contains(&SettingsField::InnerRadius));
        assert!(!donut.contains(&SettingsField::Size));

        let bar = visible_fields(ChartKind::Bar, 2);
        assert_eq!(bar.last(), Some(&SettingsField::Filter(1)));
    }

    #[test]
    fn focus_wraps() {
        let mut panel = SettingsPanel::new();
        panel.prev_focus(ChartKind::Bar, 0);
        assert_eq!(panel.focus, SettingsField::BorderRadius);
        panel.next_focus(ChartKind::Bar, 0);
        assert_eq!(panel.focus, SettingsField::ChartType);
    }

    #[test]
    fn clamp_focus_after_kind_change() {
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::Size;
        panel.clamp_focus(ChartKind::Line, 4);
        assert_eq!(panel.focus, SettingsField::BorderRadius);

        panel.focus = SettingsField::Filter(5);
        panel.clamp_focus(ChartKind::Line, 2);
        assert_eq!(panel.focus, SettingsField::Filter(1));
    }

    #[test]
    fn size_slider_clamps_to_range() {
        let palettes = PaletteTable::builtin();
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::Size;
        let config = WidgetConfig {
            size: 150.0,
            ..WidgetConfig::default()
        };
        assert_eq!(panel.adjust(&config, &palettes, 1).size, Some(150.0));
        assert_eq!(panel.adjust(&config, &palettes, -2).size, Some(140.0));

        let config = WidgetConfig {
            size: 50.0,
            ..WidgetConfig::default()
        };
        assert_eq!(panel.adjust(&config, &palettes, -1).size, Some(50.0));
    }

    #[test]
    fn size_slider_keeps_room_for_kept_inner_radius() {
        let palettes = PaletteTable::builtin();
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::Size;
        // inner radius 80 set on the donut, then switched to pie
        let config = WidgetConfig {
            chart_kind: ChartKind::Pie,
            inner_radius: Some(80.0),
            ..WidgetConfig::default()
        };
        let update = panel.adjust(&config, &palettes, -1);
        assert_eq!(update.size, Some(100.0));
        let next = update.apply_to(&config, &palettes).unwrap();
        assert!(next.validate(&palettes).is_ok());

        let config = WidgetConfig {
            inner_radius: Some(40.0),
            ..config
        };
        assert_eq!(panel.adjust(&config, &palettes, -20).size, Some(60.0));
    }

    #[test]
    fn slider_does_not_shrink_values_beyond_its_range() {
        let palettes = PaletteTable::builtin();
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::Size;
        let config = WidgetConfig {
            size: 180.0,
            ..WidgetConfig::default()
        };
        assert_eq!(panel.adjust(&config, &palettes, 1).size, Some(180.0));
        assert_eq!(panel.adjust(&config, &palettes, -1).size, Some(175.0));

        panel.focus = SettingsField::InnerRadius;
        let config = WidgetConfig {
            chart_kind: ChartKind::Donut,
            inner_radius: Some(0.0),
            ..WidgetConfig::default()
        };
        assert_eq!(
            panel.adjust(&config, &palettes, -1).inner_radius,
            Some(Some(0.0))
        );
        assert_eq!(
            panel.adjust(&config, &palettes, 1).inner_radius,
            Some(Some(5.0))
        );
    }

    #[test]
    fn inner_radius_slider_starts_from_default() {
        let palettes = PaletteTable::builtin();
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::InnerRadius;
        let config = WidgetConfig {
            chart_kind: ChartKind::Donut,
            ..WidgetConfig::default()
        };
        assert_eq!(
            panel.adjust(&config, &palettes, 1).inner_radius,
            Some(Some(45.0))
        );
        // size 100 caps the slider at 80
        let config = WidgetConfig {
            inner_radius: Some(80.0),
            ..config
        };
        assert_eq!(
            panel.adjust(&config, &palettes, 1).inner_radius,
            Some(Some(80.0))
        );
    }

    #[test]
    fn scheme_cycles_through_palette_table() {
        let palettes = PaletteTable::builtin();
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::ColorScheme;
        let update = panel.adjust(&WidgetConfig::default(), &palettes, 1);
        assert_eq!(update.color_scheme.as_deref(), Some("vibrant"));
        let update = panel.adjust(&WidgetConfig::default(), &palettes, -1);
        assert_eq!(update.color_scheme.as_deref(), Some("monochrome"));
    }

    #[test]
    fn space_flips_switch() {
        let palettes = PaletteTable::builtin();
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::ShowGrid;
        let action = panel.handle_key(
            &key(KeyCode::Char(' ')),
            &WidgetConfig::default(),
            &palettes,
            0,
        );
        assert_eq!(
            action,
            SettingsAction::Update(ConfigUpdate::new().with_show_grid(false))
        );
    }

    #[test]
    fn title_editing_emits_live_updates() {
        let palettes = PaletteTable::builtin();
        let config = WidgetConfig {
            title: "Deals".to_string(),
            ..WidgetConfig::default()
        };
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::Title;
        assert_eq!(
            panel.handle_key(&key(KeyCode::Enter), &config, &palettes, 0),
            SettingsAction::None
        );
        assert!(panel.editing_title);
        assert_eq!(
            panel.handle_key(&key(KeyCode::Char('!')), &config, &palettes, 0),
            SettingsAction::Update(ConfigUpdate::new().with_title("Deals!"))
        );
        panel.handle_key(&key(KeyCode::Enter), &config, &palettes, 0);
        assert!(!panel.editing_title);
    }

    #[test]
    fn filter_rows_toggle_by_index() {
        let palettes = PaletteTable::builtin();
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::Filter(2);
        assert_eq!(
            panel.handle_key(&key(KeyCode::Enter), &WidgetConfig::default(), &palettes, 4),
            SettingsAction::ToggleFilter(2)
        );
        assert_eq!(
            panel.handle_key(&key(KeyCode::Esc), &WidgetConfig::default(), &palettes, 4),
            SettingsAction::Close
        );
    }
}
