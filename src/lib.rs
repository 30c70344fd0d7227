use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod chart_export;
pub mod chart_spec;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod palette;
pub mod settings;
pub mod widget;
pub mod widgets;

pub use chart_spec::{select_chart, ChartSpec};
pub use cli::{Args, DataFormat};
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, ExportConfig,
    Theme,
};
pub use data::{ColorizedDataPoint, DataPoint};
pub use error::ConfigError;
pub use palette::PaletteTable;
pub use widget::{ChartKind, ConfigStore, ConfigUpdate, WidgetConfig};

use chart_spec::{format_percent, percent_of_total};
use settings::{SettingsAction, SettingsPanel};
use widgets::chart::{format_value, render_pie_legend, token_color, ChartView};
use widgets::controls::{Controls, CHART_CONTROLS, SETTINGS_CONTROLS};
use widgets::debug::DebugState;
use widgets::sidebar::{Sidebar, SIDEBAR_WIDTH};
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for the config and log directories
pub const APP_NAME: &str = "dealchart";

/// File written by the `e` key
pub const DEFAULT_EXPORT_FILE: &str = "dealchart.png";

const SEARCH_WIDTH: u16 = 32;

impl TryFrom<&Args> for ConfigUpdate {
    type Error = ConfigError;

    fn try_from(args: &Args) -> std::result::Result<Self, Self::Error> {
        let mut update = ConfigUpdate::new();
        if let Some(chart) = &args.chart {
            update = update.with_chart_kind(chart.parse()?);
        }
        if let Some(scheme) = &args.scheme {
            update = update.with_color_scheme(scheme.clone());
        }
        if let Some(title) = &args.title {
            update = update.with_title(title.clone());
        }
        if let Some(size) = args.size {
            update = update.with_size(size);
        }
        if let Some(inner_radius) = args.inner_radius {
            update = update.with_inner_radius(inner_radius);
        }
        if let Some(border_radius) = args.border_radius {
            update = update.with_border_radius(border_radius);
        }
        Ok(update)
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16), // resized (width, height)
    /// Re-read the dataset file
    Reload,
    /// Write the current chart as PNG
    Export(PathBuf),
    Exit,
    Crash(String),
}

pub struct App {
    events: Sender<AppEvent>,
    store: ConfigStore,
    data: Vec<DataPoint>,
    data_path: Option<PathBuf>,
    data_format: Option<DataFormat>,
    theme: Theme,
    parser: ColorParser,
    settings: SettingsPanel,
    pub show_settings: bool,
    search_input: TextInput,
    pub searching: bool,
    highlight: usize,
    status: Option<String>,
    export: ExportConfig,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>, store: ConfigStore, data: Vec<DataPoint>) -> App {
        Self::new_with_theme(events, store, data, Theme::default())
    }

    pub fn new_with_theme(
        events: Sender<AppEvent>,
        store: ConfigStore,
        data: Vec<DataPoint>,
        theme: Theme,
    ) -> App {
        let search_input = TextInput::new()
            .with_theme(&theme)
            .with_value(store.search());
        Self {
            events,
            store,
            data,
            data_path: None,
            data_format: None,
            theme,
            parser: ColorParser::new(),
            settings: SettingsPanel::new(),
            show_settings: false,
            search_input,
            searching: false,
            highlight: 0,
            status: None,
            export: ExportConfig::default(),
            debug: DebugState::default(),
        }
    }

    /// Dataset file that `r` reloads from.
    pub fn with_source(mut self, path: PathBuf, format: Option<DataFormat>) -> Self {
        self.data_path = Some(path);
        self.data_format = format;
        self
    }

    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    pub fn with_parser(mut self, parser: ColorParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn config(&self) -> &WidgetConfig {
        self.store.config()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Names of every loaded point, in dataset order.
    pub fn names(&self) -> Vec<String> {
        self.data.iter().map(|p| p.name.clone()).collect()
    }

    /// Points passing search and filters, colored from the current palette.
    pub fn visible(&self) -> Vec<ColorizedDataPoint> {
        self.store.filtered_colorized(&self.data)
    }

    pub fn current_spec(&self) -> ChartSpec {
        select_chart(self.store.config(), &self.visible())
    }

    /// Index of the highlighted point within the visible points.
    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Resize(_, _) => None,
            AppEvent::Reload => {
                self.reload();
                None
            }
            AppEvent::Export(path) => {
                self.export_png(path);
                None
            }
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn apply(&mut self, update: ConfigUpdate) {
        match self.store.update(update) {
            Ok(()) => {
                self.debug.num_updates += 1;
                self.status = None;
                let kind = self.store.config().chart_kind;
                self.settings.clamp_focus(kind, self.data.len());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn reload(&mut self) {
        let Some(path) = self.data_path.clone() else {
            self.status = Some("Using the built-in dataset; nothing to reload".to_string());
            return;
        };
        match data::load_data(&path, self.data_format) {
            Ok(points) => {
                self.status = Some(format!("Reloaded {} points", points.len()));
                self.data = points;
                let kind = self.store.config().chart_kind;
                self.settings.clamp_focus(kind, self.data.len());
                self.clamp_highlight();
            }
            Err(e) => {
                tracing::warn!("Reload of {} failed: {}", path.display(), e);
                self.status = Some(format!("Reload failed: {}", e));
            }
        }
    }

    fn export_png(&mut self, path: &std::path::Path) {
        let spec = self.current_spec();
        let result = chart_export::write_chart_png(
            path,
            &spec,
            self.store.config(),
            self.export.width,
            self.export.height,
        );
        self.status = Some(match result {
            Ok(()) => format!("Exported {}", path.display()),
            Err(e) => {
                tracing::warn!("Export to {} failed: {}", path.display(), e);
                format!("Export failed: {}", e)
            }
        });
    }

    fn clamp_highlight(&mut self) {
        let len = self.visible().len();
        self.highlight = self.highlight.min(len.saturating_sub(1));
    }

    fn move_highlight(&mut self, delta: isize) {
        let len = self.visible().len() as isize;
        if len == 0 {
            self.highlight = 0;
            return;
        }
        self.highlight = (self.highlight as isize + delta).rem_euclid(len) as usize;
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.last_key = Some(format!("{:?}", event.code));

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.searching {
            match self.search_input.handle_key(event) {
                TextInputEvent::Changed => {
                    self.store.set_search(self.search_input.value());
                    self.clamp_highlight();
                }
                TextInputEvent::Submit => {
                    self.searching = false;
                    self.search_input.set_focused(false);
                }
                TextInputEvent::Cancel => {
                    self.searching = false;
                    self.search_input.clear();
                    self.search_input.set_focused(false);
                    self.store.set_search("");
                    self.clamp_highlight();
                }
                TextInputEvent::None => {}
            }
            return None;
        }

        if self.show_settings {
            if event.code == KeyCode::Char('q') && !self.settings.editing_title {
                return Some(AppEvent::Exit);
            }
            let names = self.names();
            let action = self.settings.handle_key(
                event,
                self.store.config(),
                self.store.palettes(),
                names.len(),
            );
            match action {
                SettingsAction::None => {}
                SettingsAction::Update(update) => self.apply(update),
                SettingsAction::ToggleFilter(i) => {
                    if let Some(name) = names.get(i) {
                        self.store.toggle_filter(name);
                        self.clamp_highlight();
                    }
                }
                SettingsAction::Close => self.show_settings = false,
            }
            return None;
        }

        let config = self.store.config();
        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
            KeyCode::Char('/') => {
                self.searching = true;
                self.search_input.set_value(self.store.search().to_string());
                self.search_input.set_focused(true);
                None
            }
            KeyCode::Char('s') => {
                self.show_settings = true;
                let kind = config.chart_kind;
                self.settings.clamp_focus(kind, self.data.len());
                None
            }
            KeyCode::Char('c') => {
                let kind = config.chart_kind.next();
                self.apply(ConfigUpdate::new().with_chart_kind(kind));
                None
            }
            KeyCode::Char('C') => {
                let kind = config.chart_kind.prev();
                self.apply(ConfigUpdate::new().with_chart_kind(kind));
                None
            }
            KeyCode::Char('p') => {
                let name = self.store.palettes().next_name(&config.color_scheme).to_string();
                self.apply(ConfigUpdate::new().with_color_scheme(name));
                None
            }
            KeyCode::Char('P') => {
                let name = self.store.palettes().prev_name(&config.color_scheme).to_string();
                self.apply(ConfigUpdate::new().with_color_scheme(name));
                None
            }
            KeyCode::Char(']') | KeyCode::Right => {
                self.move_highlight(1);
                None
            }
            KeyCode::Char('[') | KeyCode::Left => {
                self.move_highlight(-1);
                None
            }
            KeyCode::Char('e') => Some(AppEvent::Export(PathBuf::from(DEFAULT_EXPORT_FILE))),
            KeyCode::Char('r') => Some(AppEvent::Reload),
            KeyCode::Char('x') => {
                self.store.set_search("");
                self.store.clear_filters();
                self.search_input.clear();
                self.clamp_highlight();
                None
            }
            _ => None,
        }
    }

    /// Sends `event` to the run loop.
    pub fn send(&self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let show_search = self.searching || !self.store.search().is_empty();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(if show_search { SEARCH_WIDTH } else { 0 }),
            ])
            .split(area);

        Paragraph::new(self.store.config().title.clone())
            .style(
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .render(chunks[0], buf);

        if show_search {
            let parts = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(8), Constraint::Fill(1)])
                .split(chunks[1]);
            Paragraph::new("Search: ")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .render(parts[0], buf);
            (&self.search_input).render(parts[1], buf);
        }
    }

    /// Details of the highlighted point, e.g. `● Won: 80 (64.0%)`.
    fn tooltip_line(&self, visible: &[ColorizedDataPoint]) -> Option<Line<'static>> {
        let index = self.highlight.min(visible.len().checked_sub(1)?);
        let point = visible.get(index)?;
        let percent = percent_of_total(visible).get(index).copied().unwrap_or(0.0);
        Some(Line::from(vec![
            Span::styled(
                "● ",
                Style::default().fg(token_color(&self.parser, &point.color)),
            ),
            Span::styled(
                format!(
                    "{}: {} ({})",
                    point.name,
                    format_value(point.value),
                    format_percent(percent)
                ),
                Style::default().fg(self.theme.get("highlight")),
            ),
        ]))
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let visible = self.visible();
        let spec = select_chart(self.store.config(), &visible);
        let config = self.store.config().clone();
        let pie_legend = config.show_legend
            && !visible.is_empty()
            && matches!(spec, ChartSpec::Pie { .. });
        let tooltip = if config.show_tooltip {
            self.tooltip_line(&visible)
        } else {
            None
        };

        let mut constraints = vec![Constraint::Length(1), Constraint::Fill(1)];
        if pie_legend {
            constraints.push(Constraint::Length(1));
        }
        if tooltip.is_some() {
            constraints.push(Constraint::Length(1));
        }
        if self.status.is_some() {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Length(1)); // Controls
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let mut next = 2;

        self.render_header(layout[0], buf);

        let mut chart_area = layout[1];
        if self.show_settings {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(SIDEBAR_WIDTH)])
                .split(layout[1]);
            chart_area = chunks[0];
            let names = self.names();
            Sidebar {
                panel: &mut self.settings,
                config: &config,
                palettes: self.store.palettes(),
                names: &names,
                filters: self.store.filters(),
                theme: &self.theme,
                parser: &self.parser,
            }
            .render(chunks[1], buf);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("border")))
            .title(format!(" {} ", config.chart_kind.label()));
        let inner = block.inner(chart_area);
        block.render(chart_area, buf);
        ChartView::new(&spec, &config, &self.theme, &self.parser).render(inner, buf);

        if pie_legend {
            render_pie_legend(layout[next], buf, &visible, &self.theme, &self.parser);
            next += 1;
        }
        if let Some(line) = tooltip {
            Paragraph::new(line).render(layout[next], buf);
            next += 1;
        }
        if let Some(status) = &self.status {
            Paragraph::new(status.clone())
                .style(Style::default().fg(self.theme.get("secondary")))
                .render(layout[next], buf);
            next += 1;
        }

        let hints: &[(&str, &str)] = if self.show_settings {
            &SETTINGS_CONTROLS
        } else {
            &CHART_CONTROLS
        };
        (&Controls::new(hints)
            .with_theme(&self.theme)
            .with_point_count(visible.len(), self.data.len())
            .with_dimmed(self.searching))
            .render(layout[next], buf);
        next += 1;

        if self.debug.enabled {
            self.debug.render(layout[next], buf);
        }
    }
}
