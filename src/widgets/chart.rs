//! Terminal rendering of a [`ChartSpec`].

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, LegendPosition, Paragraph,
        Widget,
    },
};

use crate::chart_spec::{
    format_percent, percent_of_total, BarLayer, ChartSpec, Orientation, RadarPoint, ScatterPoint,
    TreemapCell,
};
use crate::config::{ColorParser, Theme};
use crate::data::ColorizedDataPoint;
use crate::palette;
use crate::widget::{WidgetConfig, SIZE_MAX};

/// Resolve a palette color token, falling back to the terminal default.
pub fn token_color(parser: &ColorParser, token: &str) -> Color {
    parser.parse(token).unwrap_or(Color::Reset)
}

/// Whole numbers without decimals, everything else with one.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

const BAR_SCALE: f64 = 10_000.0;

/// Draws one chart into the area it is given.
pub struct ChartView<'a> {
    spec: &'a ChartSpec,
    config: &'a WidgetConfig,
    theme: &'a Theme,
    parser: &'a ColorParser,
}

impl<'a> ChartView<'a> {
    pub fn new(
        spec: &'a ChartSpec,
        config: &'a WidgetConfig,
        theme: &'a Theme,
        parser: &'a ColorParser,
    ) -> Self {
        Self {
            spec,
            config,
            theme,
            parser,
        }
    }

    /// Color of the n-th palette entry, for single-series charts.
    fn series_color(&self, index: usize) -> Color {
        palette::color_at(&self.config.palette_colors, index)
            .map(|t| token_color(self.parser, t))
            .unwrap_or(Color::Reset)
    }

    fn point_color(&self, point: &ColorizedDataPoint) -> Color {
        token_color(self.parser, &point.color)
    }

    fn axis_style(&self) -> Style {
        Style::default().fg(self.theme.get("chart_axis"))
    }

    fn label_style(&self) -> Style {
        Style::default().fg(self.theme.get("text_primary"))
    }

    fn render_pie(
        &self,
        area: Rect,
        buf: &mut Buffer,
        data: &[ColorizedDataPoint],
        outer: f64,
        inner: f64,
    ) {
        let total: f64 = data.iter().map(|p| p.value.max(0.0)).sum();
        if total <= 0.0 {
            render_message(area, buf, "All values are zero", self.theme);
            return;
        }

        // Terminal cells are about twice as tall as wide
        let aspect = area.width as f64 / (2.0 * area.height.max(1) as f64);
        let radius = (outer / SIZE_MAX).clamp(0.05, 1.0);
        let hole = if outer > 0.0 {
            radius * (inner / outer).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Slice boundaries as cumulative angles, counter-clockwise from 3 o'clock
        let mut bounds = Vec::with_capacity(data.len());
        let mut acc = 0.0;
        for p in data {
            acc += p.value.max(0.0) / total * TAU;
            bounds.push(acc);
        }

        let dx = 2.0 * aspect / (area.width.max(1) as f64 * 2.0);
        let dy = 2.0 / (area.height.max(1) as f64 * 4.0);
        let mut slices: Vec<Vec<(f64, f64)>> = vec![Vec::new(); data.len()];
        let mut y = -radius;
        while y <= radius {
            let mut x = -radius;
            while x <= radius {
                let r = (x * x + y * y).sqrt();
                if r <= radius && r >= hole {
                    let theta = y.atan2(x).rem_euclid(TAU);
                    let idx = bounds
                        .iter()
                        .position(|b| theta <= *b)
                        .unwrap_or(data.len() - 1);
                    slices[idx].push((x, y));
                }
                x += dx;
            }
            y += dy;
        }

        let colors: Vec<Color> = data.iter().map(|p| self.point_color(p)).collect();
        let labels: Vec<(f64, f64, String)> = if self.config.show_labels {
            let percents = percent_of_total(data);
            let label_r = if hole > 0.0 {
                (radius + hole) / 2.0
            } else {
                radius * 0.6
            };
            let mut start = 0.0;
            data.iter()
                .zip(bounds.iter())
                .zip(percents)
                .filter(|((p, _), _)| p.value > 0.0)
                .map(|((p, end), pct)| {
                    let mid = (start + end) / 2.0;
                    start = *end;
                    let text = if self.config.show_values {
                        format!("{} {}", p.name, format_percent(pct))
                    } else {
                        p.name.clone()
                    };
                    let half = text.chars().count() as f64 * dx;
                    (label_r * mid.cos() - half, label_r * mid.sin(), text)
                })
                .collect()
        } else {
            Vec::new()
        };
        let label_style = self.label_style().add_modifier(Modifier::BOLD);

        Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds([-aspect, aspect])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                for (coords, color) in slices.iter().zip(colors.iter()) {
                    ctx.draw(&Points {
                        coords,
                        color: *color,
                    });
                }
                ctx.layer();
                for (x, y, text) in &labels {
                    ctx.print(*x, *y, Line::styled(text.clone(), label_style));
                }
            })
            .render(area, buf);
    }

    fn render_bars(&self, area: Rect, buf: &mut Buffer, layer: &BarLayer) {
        let max_value = layer.data.iter().map(|p| p.value.max(0.0)).fold(0.0, f64::max);
        let bars: Vec<Bar> = layer
            .data
            .iter()
            .map(|p| {
                let color = self.point_color(p);
                let mut bar = Bar::default()
                    .value(bar_height(p.value, max_value))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color));
                bar = if self.config.show_values {
                    bar.text_value(format_value(p.value))
                } else {
                    bar.text_value(String::new())
                };
                if self.config.show_labels {
                    bar = bar.label(Line::from(p.name.clone()));
                }
                bar
            })
            .collect();

        let n = bars.len().max(1) as u16;
        let (direction, span) = match layer.orientation {
            Orientation::Vertical => (Direction::Vertical, area.width),
            Orientation::Horizontal => (Direction::Horizontal, area.height),
        };
        let gap = 1;
        let width = (span.saturating_sub(gap * n) / n).clamp(1, 12);

        BarChart::default()
            .direction(direction)
            .bar_width(width)
            .bar_gap(gap)
            .label_style(self.label_style())
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }

    /// Shared x/y axes for charts that plot points at positions 1..=n.
    fn category_axes(&self, names: &[String], max_value: f64) -> (Axis<'static>, Axis<'static>) {
        let n = names.len();
        let x_labels: Vec<Span<'static>> = std::iter::once(String::new())
            .chain(names.iter().map(|name| {
                if self.config.show_labels {
                    name.clone()
                } else {
                    String::new()
                }
            }))
            .chain(std::iter::once(String::new()))
            .map(|s| Span::styled(s, self.label_style()))
            .collect();
        let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };
        let y_labels: Vec<Span<'static>> = [0.0, y_max / 2.0, y_max]
            .iter()
            .map(|v| Span::styled(format_value(v.round()), self.label_style()))
            .collect();
        (
            Axis::default()
                .bounds([0.0, n as f64 + 1.0])
                .style(self.axis_style())
                .labels(x_labels),
            Axis::default()
                .bounds([0.0, y_max])
                .style(self.axis_style())
                .labels(y_labels),
        )
    }

    /// Dotted horizontal grid lines at quarter steps.
    fn grid_lines(&self, n: usize, y_max: f64) -> Vec<Vec<(f64, f64)>> {
        if !self.config.show_grid {
            return Vec::new();
        }
        let x_max = n as f64 + 1.0;
        (1..=4)
            .map(|q| {
                let y = y_max * q as f64 / 4.0;
                let steps = (x_max * 4.0) as usize;
                (0..=steps).map(|i| (i as f64 / 4.0, y)).collect()
            })
            .collect()
    }

    fn legend(&self) -> Option<LegendPosition> {
        self.config.show_legend.then_some(LegendPosition::TopRight)
    }

    fn render_xy(&self, area: Rect, buf: &mut Buffer, data: &[ColorizedDataPoint], fill: bool) {
        let names: Vec<String> = data.iter().map(|p| p.name.clone()).collect();
        let max_value = data.iter().map(|p| p.value).fold(0.0, f64::max);
        let (x_axis, y_axis) = self.category_axes(&names, max_value);
        let y_max = y_axis_max(max_value);

        let points: Vec<(f64, f64)> = data
            .iter()
            .enumerate()
            .map(|(i, p)| ((i + 1) as f64, p.value))
            .collect();
        let filled = if fill { interpolate(&points, 8) } else { Vec::new() };
        let grid = self.grid_lines(data.len(), y_max);
        let color = self.series_color(0);

        let mut datasets: Vec<Dataset> = grid
            .iter()
            .map(|line| {
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(self.theme.get("chart_grid")))
                    .data(line)
            })
            .collect();
        if fill {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Bar)
                    .style(Style::default().fg(color).add_modifier(Modifier::DIM))
                    .data(&filled),
            );
        }
        datasets.push(
            Dataset::default()
                .name("value")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(&points),
        );

        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(self.legend())
            .render(area, buf);
    }

    fn render_scatter(&self, area: Rect, buf: &mut Buffer, points: &[ScatterPoint]) {
        let names: Vec<String> = points.iter().map(|p| format_value(p.x)).collect();
        let max_value = points.iter().map(|p| p.y).fold(0.0, f64::max);
        let (x_axis, y_axis) = self.category_axes(&names, max_value);
        let grid = self.grid_lines(points.len(), y_axis_max(max_value));
        let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();

        let mut datasets: Vec<Dataset> = grid
            .iter()
            .map(|line| {
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(self.theme.get("chart_grid")))
                    .data(line)
            })
            .collect();
        datasets.push(
            Dataset::default()
                .name("value")
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(self.series_color(2)))
                .data(&coords),
        );

        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(self.legend())
            .render(area, buf);
    }

    fn render_composed(
        &self,
        area: Rect,
        buf: &mut Buffer,
        bar: &BarLayer,
        line: &[ColorizedDataPoint],
    ) {
        let names: Vec<String> = bar.data.iter().map(|p| p.name.clone()).collect();
        let max_value = bar.data.iter().map(|p| p.value).fold(0.0, f64::max);
        let (x_axis, y_axis) = self.category_axes(&names, max_value);
        let grid = self.grid_lines(bar.data.len(), y_axis_max(max_value));

        // Each bar is a dense run of vertical strokes around its x position
        let columns: Vec<Vec<(f64, f64)>> = bar
            .data
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = (i + 1) as f64;
                (0..=12)
                    .map(|s| (x - 0.3 + s as f64 * 0.05, p.value))
                    .collect()
            })
            .collect();
        let line_points: Vec<(f64, f64)> = line
            .iter()
            .enumerate()
            .map(|(i, p)| ((i + 1) as f64, p.value))
            .collect();

        let mut datasets: Vec<Dataset> = grid
            .iter()
            .map(|l| {
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(self.theme.get("chart_grid")))
                    .data(l)
            })
            .collect();
        let bar_color = self.series_color(0);
        for (i, column) in columns.iter().enumerate() {
            let mut ds = Dataset::default()
                .marker(symbols::Marker::HalfBlock)
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(bar_color))
                .data(column);
            if i == 0 {
                ds = ds.name("bar");
            }
            datasets.push(ds);
        }
        datasets.push(
            Dataset::default()
                .name("line")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.series_color(1)))
                .data(&line_points),
        );

        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(self.legend())
            .render(area, buf);
    }

    fn render_radar(&self, area: Rect, buf: &mut Buffer, points: &[RadarPoint]) {
        let aspect = area.width as f64 / (2.0 * area.height.max(1) as f64);
        let n = points.len();
        let full = points
            .iter()
            .map(|p| p.a)
            .fold(points.first().map(|p| p.full_mark).unwrap_or(100.0), f64::max);
        let angle = |i: usize| FRAC_PI_2 - TAU * i as f64 / n as f64;
        let scale = 0.8;

        let vertices: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let r = scale * (p.a.max(0.0) / full);
                (r * angle(i).cos(), r * angle(i).sin())
            })
            .collect();
        let rings: Vec<Vec<(f64, f64)>> = if n >= 3 {
            (1..=4)
                .map(|q| {
                    let r = scale * q as f64 / 4.0;
                    (0..n).map(|i| (r * angle(i).cos(), r * angle(i).sin())).collect()
                })
                .collect()
        } else {
            Vec::new()
        };
        let labels: Vec<(f64, f64, String)> = if self.config.show_labels {
            points
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let r = scale * 1.12;
                    let text = if self.config.show_values {
                        format!("{} {}", p.subject, format_value(p.a))
                    } else {
                        p.subject.clone()
                    };
                    let x = r * angle(i).cos();
                    // right-align labels on the left half
                    let shift = if x < -0.01 {
                        text.chars().count() as f64 * aspect / area.width.max(1) as f64 * 2.0
                    } else {
                        0.0
                    };
                    (x - shift, r * angle(i).sin(), text)
                })
                .collect()
        } else {
            Vec::new()
        };

        let grid_color = self.theme.get("chart_grid");
        let axis_color = self.theme.get("chart_axis");
        let series = self.series_color(3);
        let show_grid = self.config.show_grid;
        let label_style = self.label_style();

        Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds([-aspect, aspect])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                if show_grid {
                    for ring in &rings {
                        draw_closed(ctx, ring, grid_color);
                    }
                    for i in 0..n {
                        ctx.draw(&CanvasLine::new(
                            0.0,
                            0.0,
                            scale * angle(i).cos(),
                            scale * angle(i).sin(),
                            axis_color,
                        ));
                    }
                }
                ctx.layer();
                draw_closed(ctx, &vertices, series);
                ctx.draw(&Points {
                    coords: &vertices,
                    color: series,
                });
                ctx.layer();
                for (x, y, text) in &labels {
                    ctx.print(*x, *y, Line::styled(text.clone(), label_style));
                }
            })
            .render(area, buf);
    }

    fn render_funnel(&self, area: Rect, buf: &mut Buffer, data: &[ColorizedDataPoint]) {
        let max = data.iter().map(|p| p.value).fold(0.0, f64::max);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(data.iter().map(|_| Constraint::Ratio(1, data.len() as u32)))
            .split(area);
        let percents = percent_of_total(data);

        for ((p, row), pct) in data.iter().zip(rows.iter()).zip(percents) {
            if row.height == 0 {
                continue;
            }
            let ratio = if max > 0.0 {
                (p.value.max(0.0) / max).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let width = ((row.width as f64 * ratio).round() as u16).max(1).min(row.width);
            let band = Rect {
                x: row.x + (row.width - width) / 2,
                y: row.y,
                width,
                height: row.height.saturating_sub(u16::from(row.height > 1)),
            };
            buf.set_style(band, Style::default().bg(self.point_color(p)));

            if self.config.show_labels {
                let text = if self.config.show_values {
                    format!("{} {} ({})", p.name, format_value(p.value), format_percent(pct))
                } else {
                    p.name.clone()
                };
                let label_row = Rect {
                    y: band.y + band.height.saturating_sub(1) / 2,
                    height: 1,
                    ..*row
                };
                Paragraph::new(text)
                    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
                    .alignment(Alignment::Center)
                    .render(label_row, buf);
            }
        }
    }

    fn render_treemap(&self, area: Rect, buf: &mut Buffer, cells: &[TreemapCell]) {
        let weights: Vec<f64> = cells.iter().map(|c| c.size.max(0.0)).collect();
        let mut placed = Vec::with_capacity(cells.len());
        treemap_layout(area, &weights, 0, &mut placed);

        for (idx, rect) in placed {
            let cell = &cells[idx];
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            buf.set_style(rect, Style::default().bg(token_color(self.parser, &cell.fill)));
            // one-column gap between tiles
            if rect.right() < area.right() {
                let edge = Rect {
                    x: rect.right().saturating_sub(1),
                    width: 1,
                    ..rect
                };
                buf.set_style(edge, Style::default().bg(Color::Reset));
            }
            if self.config.show_labels {
                let text = if self.config.show_values {
                    format!("{} {}", cell.name, format_value(cell.size))
                } else {
                    cell.name.clone()
                };
                let label = Rect {
                    x: rect.x + 1,
                    y: rect.y,
                    width: rect.width.saturating_sub(2),
                    height: 1,
                };
                Paragraph::new(text)
                    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
                    .render(label, buf);
            }
        }
    }
}

impl Widget for ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        if self.spec.is_empty() {
            render_message(area, buf, "No data matches the current filter", self.theme);
            return;
        }
        match self.spec {
            ChartSpec::Pie { data, outer_radius } => {
                self.render_pie(area, buf, data, *outer_radius, 0.0)
            }
            ChartSpec::Donut {
                data,
                outer_radius,
                inner_radius,
            } => self.render_pie(area, buf, data, *outer_radius, *inner_radius),
            ChartSpec::Bar(layer)
            | ChartSpec::HorizontalBar(layer)
            | ChartSpec::StackedBar(layer) => self.render_bars(area, buf, layer),
            ChartSpec::Line { data } => self.render_xy(area, buf, data, false),
            ChartSpec::Area { data } => self.render_xy(area, buf, data, true),
            ChartSpec::Scatter { points } => self.render_scatter(area, buf, points),
            ChartSpec::Radar { points } => self.render_radar(area, buf, points),
            ChartSpec::Funnel { data } => self.render_funnel(area, buf, data),
            ChartSpec::Treemap { cells } => self.render_treemap(area, buf, cells),
            ChartSpec::Composed { bar, line } => self.render_composed(area, buf, bar, line),
        }
    }
}

/// Bar length on a fixed integer scale. BarChart multiplies raw values by the
/// bar's cell length, so large values must not reach it unscaled.
fn bar_height(value: f64, max_value: f64) -> u64 {
    if max_value <= 0.0 {
        return 0;
    }
    (value.max(0.0) / max_value * BAR_SCALE).round() as u64
}

/// One line of colored swatches with each point's share, e.g. `● Won: 64.0%`.
pub fn render_pie_legend(
    area: Rect,
    buf: &mut Buffer,
    data: &[ColorizedDataPoint],
    theme: &Theme,
    parser: &ColorParser,
) {
    let percents = percent_of_total(data);
    let mut spans = Vec::with_capacity(data.len() * 3);
    for (p, pct) in data.iter().zip(percents) {
        if !spans.is_empty() {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled("● ", Style::default().fg(token_color(parser, &p.color))));
        spans.push(Span::styled(
            format!("{}: {}", p.name, format_percent(pct)),
            Style::default().fg(theme.get("text_primary")),
        ));
    }
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_message(area: Rect, buf: &mut Buffer, message: &str, theme: &Theme) {
    let y = area.y + area.height / 2;
    Paragraph::new(message)
        .style(Style::default().fg(theme.get("text_secondary")))
        .centered()
        .render(Rect { y, height: 1, ..area }, buf);
}

fn y_axis_max(max_value: f64) -> f64 {
    if max_value > 0.0 {
        max_value * 1.1
    } else {
        1.0
    }
}

/// Linear samples between consecutive points, `per_unit` per x step.
fn interpolate(points: &[(f64, f64)], per_unit: usize) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        for s in 0..per_unit {
            let t = s as f64 / per_unit as f64;
            out.push((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
        }
    }
    if let Some(last) = points.last() {
        out.push(*last);
    }
    out
}

fn draw_closed(ctx: &mut ratatui::widgets::canvas::Context, vertices: &[(f64, f64)], color: Color) {
    if vertices.len() < 2 {
        return;
    }
    for (i, &(x1, y1)) in vertices.iter().enumerate() {
        let (x2, y2) = vertices[(i + 1) % vertices.len()];
        ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
    }
}

/// Split `area` among `weights[..]` by recursive halving along the longer side.
/// `offset` is the index of `weights[0]` in the full list.
pub fn treemap_layout(area: Rect, weights: &[f64], offset: usize, out: &mut Vec<(usize, Rect)>) {
    match weights.len() {
        0 => {}
        1 => out.push((offset, area)),
        _ => {
            let total: f64 = weights.iter().sum();
            // split where the running sum first reaches half of the total
            let mut acc = 0.0;
            let mut split = weights.len() / 2;
            if total > 0.0 {
                for (i, w) in weights.iter().enumerate() {
                    acc += w;
                    if acc >= total / 2.0 {
                        split = (i + 1).clamp(1, weights.len() - 1);
                        break;
                    }
                }
            }
            let (left, right) = weights.split_at(split);
            let left_sum: f64 = left.iter().sum();
            let ratio = if total > 0.0 {
                left_sum / total
            } else {
                split as f64 / weights.len() as f64
            };
            // cells are twice as tall as wide, so compare in visual units
            let (first, second) = if area.width as f64 >= area.height as f64 * 2.0 {
                let w = (area.width as f64 * ratio).round() as u16;
                let w = w.min(area.width);
                (
                    Rect { width: w, ..area },
                    Rect {
                        x: area.x + w,
                        width: area.width - w,
                        ..area
                    },
                )
            } else {
                let h = (area.height as f64 * ratio).round() as u16;
                let h = h.min(area.height);
                (
                    Rect { height: h, ..area },
                    Rect {
                        y: area.y + h,
                        height: area.height - h,
                        ..area
                    },
                )
            };
            treemap_layout(first, left, offset, out);
            treemap_layout(second, right, offset + split, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::ChartKind;

    #[test]
    fn bar_heights_are_scaled_to_the_largest_value() {
        assert_eq!(bar_height(1e18, 1e18), 10_000);
        assert_eq!(bar_height(1.0, 1e18), 0);
        assert_eq!(bar_height(40.0, 80.0), 5_000);
        assert_eq!(bar_height(-5.0, 80.0), 0);
        assert_eq!(bar_height(0.0, 0.0), 0);
    }

    #[test]
    fn huge_bar_values_render() {
        let data = vec![
            ColorizedDataPoint {
                name: "Won".to_string(),
                value: 1e18,
                color: "cyan".to_string(),
            },
            ColorizedDataPoint {
                name: "Lost".to_string(),
                value: 1.0,
                color: "magenta".to_string(),
            },
        ];
        let theme = Theme::default();
        let parser = ColorParser::true_color();
        for kind in [
            ChartKind::Bar,
            ChartKind::HorizontalBar,
            ChartKind::StackedBar,
            ChartKind::Composed,
        ] {
            let config = WidgetConfig {
                chart_kind: kind,
                ..WidgetConfig::default()
            };
            let spec = crate::chart_spec::select_chart(&config, &data);
            let area = Rect::new(0, 0, 80, 24);
            let mut buf = Buffer::empty(area);
            ChartView::new(&spec, &config, &theme, &parser).render(area, &mut buf);
        }
    }

    #[test]
    fn format_value_drops_zero_fraction() {
        assert_eq!(format_value(80.0), "80");
        assert_eq!(format_value(12.25), "12.2");
    }

    #[test]
    fn treemap_covers_area_in_input_order() {
        let area = Rect::new(0, 0, 40, 10);
        let mut placed = Vec::new();
        treemap_layout(area, &[80.0, 20.0, 15.0, 10.0], 0, &mut placed);
        let mut indices: Vec<usize> = placed.iter().map(|(i, _)| *i).collect();
        indices.sort();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        let covered: u32 = placed
            .iter()
            .map(|(_, r)| r.width as u32 * r.height as u32)
            .sum();
        assert_eq!(covered, 400);
        // the largest value gets the largest tile
        let biggest = placed
            .iter()
            .max_by_key(|(_, r)| r.width as u32 * r.height as u32)
            .map(|(i, _)| *i);
        assert_eq!(biggest, Some(0));
    }

    #[test]
    fn interpolate_ends_on_last_point() {
        let pts = interpolate(&[(1.0, 0.0), (2.0, 10.0)], 4);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[2], (1.5, 5.0));
        assert_eq!(pts.last(), Some(&(2.0, 10.0)));
    }
}
