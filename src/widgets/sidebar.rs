//! Settings sidebar: chart type, title, color scheme, display switches,
//! size sliders and the name filter list.

use std::collections::BTreeSet;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::config::{ColorParser, Theme};
use crate::palette::{self, PaletteTable};
use crate::settings::{visible_fields, SettingsField, SettingsPanel};
use crate::widget::WidgetConfig;
use crate::widgets::chart::{format_value, token_color};

pub const SIDEBAR_WIDTH: u16 = 36;
const LABEL_WIDTH: u16 = 16;
const SLIDER_WIDTH: usize = 10;

/// Everything the sidebar reads. The panel is mutable for the title editor's focus.
pub struct Sidebar<'a> {
    pub panel: &'a mut SettingsPanel,
    pub config: &'a WidgetConfig,
    pub palettes: &'a PaletteTable,
    pub names: &'a [String],
    pub filters: &'a BTreeSet<String>,
    pub theme: &'a Theme,
    pub parser: &'a ColorParser,
}

fn slider(value: f64, min: f64, max: f64) -> String {
    let ratio = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * SLIDER_WIDTH as f64).round() as usize;
    format!(
        "{}{}",
        "━".repeat(filled),
        "─".repeat(SLIDER_WIDTH - filled)
    )
}

impl Sidebar<'_> {
    fn value_line(&self, field: SettingsField, style: Style) -> Line<'static> {
        let config = self.config;
        let switch = |on: bool| if on { "☑" } else { "☐" };
        match field {
            SettingsField::ChartType => {
                Line::styled(format!("◀ {} ▶", config.chart_kind.label()), style)
            }
            SettingsField::Title => Line::styled(config.title.clone(), style),
            SettingsField::ColorScheme => {
                let mut spans = vec![Span::styled("◀ ", style)];
                if let Some(colors) = self.palettes.get(&config.color_scheme) {
                    for token in colors.iter().take(3) {
                        spans.push(Span::styled(
                            "●",
                            Style::default().fg(token_color(self.parser, token)),
                        ));
                    }
                }
                spans.push(Span::styled(
                    format!(" {} ▶", palette::display_name(&config.color_scheme)),
                    style,
                ));
                Line::from(spans)
            }
            SettingsField::ShowLegend => Line::styled(switch(config.show_legend), style),
            SettingsField::ShowLabels => Line::styled(switch(config.show_labels), style),
            SettingsField::ShowValues => Line::styled(switch(config.show_values), style),
            SettingsField::Animated => Line::styled(switch(config.animated), style),
            SettingsField::ShowGrid => Line::styled(switch(config.show_grid), style),
            SettingsField::ShowTooltip => Line::styled(switch(config.show_tooltip), style),
            SettingsField::Size => Line::styled(
                format!(
                    "{} {}px",
                    slider(config.size, crate::widget::SIZE_MIN, crate::settings::SIZE_SLIDER_MAX),
                    format_value(config.size)
                ),
                style,
            ),
            SettingsField::InnerRadius => {
                let value = config.effective_inner_radius();
                Line::styled(
                    format!(
                        "{} {}px",
                        slider(
                            value,
                            crate::settings::INNER_RADIUS_SLIDER_MIN,
                            crate::settings::INNER_RADIUS_SLIDER_MAX
                        ),
                        format_value(value)
                    ),
                    style,
                )
            }
            SettingsField::BorderRadius => Line::styled(
                format!(
                    "{} {}px",
                    slider(
                        config.border_radius,
                        crate::widget::BORDER_RADIUS_MIN,
                        crate::widget::BORDER_RADIUS_MAX
                    ),
                    format_value(config.border_radius)
                ),
                style,
            ),
            SettingsField::Filter(i) => {
                let name = self.names.get(i).cloned().unwrap_or_default();
                let marker = if self.filters.contains(&name) { "☑" } else { "☐" };
                Line::styled(format!("{} {}", marker, name), style)
            }
        }
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let border_color = self.theme.get("border");
        let active_color = self.theme.get("border_active");
        let text_primary = self.theme.get("text_primary");
        let text_secondary = self.theme.get("text_secondary");

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Widget settings ");
        let inner = block.inner(area);
        block.render(area, buf);

        let fields = visible_fields(self.config.chart_kind, self.names.len());
        // Blank row before the switches, the sliders and the filter list
        let mut rows: Vec<Option<SettingsField>> = Vec::with_capacity(fields.len() + 4);
        for field in &fields {
            let starts_group = matches!(
                field,
                SettingsField::ShowLegend
                    | SettingsField::Size
                    | SettingsField::InnerRadius
                    | SettingsField::Filter(0)
            ) || (*field == SettingsField::BorderRadius
                && !fields.contains(&SettingsField::Size)
                && !fields.contains(&SettingsField::InnerRadius));
            if starts_group {
                rows.push(None);
            }
            if *field == SettingsField::Filter(0) {
                rows.push(None);
            }
            rows.push(Some(*field));
        }

        // Keep the focused row visible
        let height = inner.height as usize;
        let focus_row = rows
            .iter()
            .position(|r| *r == Some(self.panel.focus))
            .unwrap_or(0);
        let skip = (focus_row + 1).saturating_sub(height);

        let mut filter_header_drawn = false;
        for (offset, row) in rows.iter().skip(skip).take(height).enumerate() {
            let line_area = Rect {
                y: inner.y + offset as u16,
                height: 1,
                ..inner
            };
            let Some(field) = row else {
                // The second blank before the filters carries the heading
                if !filter_header_drawn
                    && rows
                        .get(skip + offset + 1)
                        .is_some_and(|r| *r == Some(SettingsField::Filter(0)))
                {
                    filter_header_drawn = true;
                    Paragraph::new("Filter by name:")
                        .style(Style::default().fg(text_primary))
                        .render(line_area, buf);
                }
                continue;
            };
            let focused = self.panel.focus == *field;
            let label_style = if focused {
                Style::default().fg(active_color)
            } else {
                Style::default().fg(border_color)
            };
            let value_style = if focused {
                Style::default().fg(active_color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(text_secondary)
            };

            if let SettingsField::Filter(_) = field {
                Paragraph::new(self.value_line(*field, value_style)).render(line_area, buf);
                continue;
            }

            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Fill(1)])
                .split(line_area);
            Paragraph::new(format!("{}:", field.label()))
                .style(label_style)
                .render(cols[0], buf);

            if *field == SettingsField::Title && self.panel.editing_title {
                self.panel.title_input.set_focused(true);
                (&self.panel.title_input).render(cols[1], buf);
            } else {
                Paragraph::new(self.value_line(*field, value_style)).render(cols[1], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_fills_proportionally() {
        assert_eq!(slider(0.0, 0.0, 20.0), "─".repeat(SLIDER_WIDTH));
        assert_eq!(slider(20.0, 0.0, 20.0), "━".repeat(SLIDER_WIDTH));
        assert_eq!(slider(10.0, 0.0, 20.0).chars().filter(|c| *c == '━').count(), 5);
    }

    #[test]
    fn renders_focused_row_and_filters() {
        let mut panel = SettingsPanel::new();
        panel.focus = SettingsField::Filter(1);
        let config = WidgetConfig::default();
        let palettes = PaletteTable::builtin();
        let names = vec!["Won".to_string(), "Lost".to_string()];
        let mut filters = BTreeSet::new();
        filters.insert("Lost".to_string());
        let theme = Theme::default();
        let parser = ColorParser::true_color();

        let area = Rect::new(0, 0, SIDEBAR_WIDTH, 30);
        let mut buf = Buffer::empty(area);
        Sidebar {
            panel: &mut panel,
            config: &config,
            palettes: &palettes,
            names: &names,
            filters: &filters,
            theme: &theme,
            parser: &parser,
        }
        .render(area, &mut buf);

        let text: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("Widget settings"));
        assert!(text.contains("Pie Chart"));
        assert!(text.contains("☑ Lost"));
        assert!(text.contains("☐ Won"));
    }
}
