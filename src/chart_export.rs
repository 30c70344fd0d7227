//! PNG export of a [`ChartSpec`] through the plotters bitmap backend.

use std::f64::consts::TAU;
use std::path::Path;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color as _, FontDesc, FontFamily, FontStyle};
use ratatui::style::Color;

use crate::chart_spec::{format_percent, percent_of_total, BarLayer, ChartSpec, Orientation};
use crate::config::ColorParser;
use crate::data::ColorizedDataPoint;
use crate::palette;
use crate::widget::{WidgetConfig, SIZE_MAX};
use crate::widgets::chart::{format_value, treemap_layout};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const TITLE_HEIGHT: u32 = 40;
const FALLBACK: RGBColor = RGBColor(128, 128, 128);
const GRID: RGBColor = RGBColor(220, 220, 220);

/// xterm default values for the 16 basic colors.
const ANSI: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

fn indexed_rgb(i: u8) -> RGBColor {
    match i {
        0..=15 => {
            let (r, g, b) = ANSI[i as usize];
            RGBColor(r, g, b)
        }
        16..=231 => {
            let n = i - 16;
            let level = |c: u8| if c == 0 { 0 } else { 55 + c * 40 };
            RGBColor(level(n / 36), level((n / 6) % 6), level(n % 6))
        }
        _ => {
            let v = 8 + (i - 232) * 10;
            RGBColor(v, v, v)
        }
    }
}

/// Map a terminal color onto RGB for the bitmap.
pub fn to_rgb(color: Color) -> RGBColor {
    match color {
        Color::Rgb(r, g, b) => RGBColor(r, g, b),
        Color::Indexed(i) => indexed_rgb(i),
        Color::Black => indexed_rgb(0),
        Color::Red => indexed_rgb(1),
        Color::Green => indexed_rgb(2),
        Color::Yellow => indexed_rgb(3),
        Color::Blue => indexed_rgb(4),
        Color::Magenta => indexed_rgb(5),
        Color::Cyan => indexed_rgb(6),
        Color::Gray => indexed_rgb(7),
        Color::DarkGray => indexed_rgb(8),
        Color::LightRed => indexed_rgb(9),
        Color::LightGreen => indexed_rgb(10),
        Color::LightYellow => indexed_rgb(11),
        Color::LightBlue => indexed_rgb(12),
        Color::LightMagenta => indexed_rgb(13),
        Color::LightCyan => indexed_rgb(14),
        Color::White => indexed_rgb(15),
        Color::Reset => FALLBACK,
    }
}

fn token_rgb(parser: &ColorParser, token: &str) -> RGBColor {
    parser.parse(token).map(to_rgb).unwrap_or(FALLBACK)
}

fn text_style(size: f64, color: RGBColor) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
        .color(&color)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

/// Labels are decoration; a missing system font only drops the text.
fn draw_label(area: &Area, text: &str, at: (i32, i32), size: f64, color: RGBColor) {
    if text.is_empty() {
        return;
    }
    if let Err(e) = area.draw(&Text::new(text.to_string(), at, text_style(size, color))) {
        tracing::warn!("Skipping chart label {:?}: {}", text, e);
    }
}

struct Exporter<'a> {
    config: &'a WidgetConfig,
    parser: ColorParser,
}

/// Write `spec` to `path` as a `width`x`height` PNG, styled by `config`.
pub fn write_chart_png(
    path: &Path,
    spec: &ChartSpec,
    config: &WidgetConfig,
    width: u32,
    height: u32,
) -> Result<()> {
    if spec.is_empty() {
        return Err(eyre!("No data to export"));
    }
    if width == 0 || height == 0 {
        return Err(eyre!("Export size must be positive, got {}x{}", width, height));
    }

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let body = if config.title.trim().is_empty() {
        root.clone()
    } else {
        draw_label(
            &root,
            config.title.trim(),
            (width as i32 / 2, TITLE_HEIGHT as i32 / 2),
            24.0,
            BLACK,
        );
        root.split_vertically(TITLE_HEIGHT).1
    };

    let exporter = Exporter {
        config,
        parser: ColorParser::true_color(),
    };
    match spec {
        ChartSpec::Pie { data, outer_radius } => exporter.pie(&body, data, *outer_radius, 0.0)?,
        ChartSpec::Donut {
            data,
            outer_radius,
            inner_radius,
        } => exporter.pie(&body, data, *outer_radius, *inner_radius)?,
        ChartSpec::Bar(layer) | ChartSpec::HorizontalBar(layer) | ChartSpec::StackedBar(layer) => {
            exporter.bars(&body, layer, None)?
        }
        ChartSpec::Composed { bar, line } => exporter.bars(&body, bar, Some(line))?,
        ChartSpec::Line { data } => exporter.xy(&body, data, false)?,
        ChartSpec::Area { data } => exporter.xy(&body, data, true)?,
        ChartSpec::Scatter { points } => {
            let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
            exporter.scatter(&body, &coords)?
        }
        ChartSpec::Radar { points } => {
            let axes: Vec<(&str, f64, f64)> = points
                .iter()
                .map(|p| (p.subject.as_str(), p.a, p.full_mark))
                .collect();
            exporter.radar(&body, &axes)?
        }
        ChartSpec::Funnel { data } => exporter.funnel(&body, data)?,
        ChartSpec::Treemap { cells } => {
            let cells: Vec<(&str, f64, RGBColor)> = cells
                .iter()
                .map(|c| (c.name.as_str(), c.size, token_rgb(&exporter.parser, &c.fill)))
                .collect();
            exporter.treemap(&body, &cells)?
        }
    }

    root.present()?;
    tracing::info!(
        "Exported {} chart with {} points to {}",
        spec.kind(),
        spec.len(),
        path.display()
    );
    Ok(())
}

impl Exporter<'_> {
    fn series_color(&self, index: usize) -> RGBColor {
        palette::color_at(&self.config.palette_colors, index)
            .map(|t| token_rgb(&self.parser, t))
            .unwrap_or(FALLBACK)
    }

    fn pie(&self, area: &Area, data: &[ColorizedDataPoint], outer: f64, inner: f64) -> Result<()> {
        let total: f64 = data.iter().map(|p| p.value.max(0.0)).sum();
        if total <= 0.0 {
            draw_label(area, "All values are zero", center(area), 16.0, BLACK);
            return Ok(());
        }

        let (w, h) = area.dim_in_pixel();
        let (cx, cy) = center(area);
        let available = (w.min(h) as f64 / 2.0 - 40.0).max(10.0);
        let radius = available * (outer / SIZE_MAX).clamp(0.05, 1.0);
        let hole = if outer > 0.0 {
            radius * (inner / outer).clamp(0.0, 1.0)
        } else {
            0.0
        };
        // Clockwise from 12 o'clock
        let at = |r: f64, theta: f64| {
            (
                cx + (r * theta.sin()).round() as i32,
                cy - (r * theta.cos()).round() as i32,
            )
        };

        let percents = percent_of_total(data);
        let mut start = 0.0;
        for (p, pct) in data.iter().zip(percents) {
            let sweep = p.value.max(0.0) / total * TAU;
            if sweep <= 0.0 {
                continue;
            }
            let end = start + sweep;
            let steps = ((sweep / TAU) * 180.0).ceil().max(2.0) as usize;
            let mut outline: Vec<(i32, i32)> = (0..=steps)
                .map(|s| at(radius, start + sweep * s as f64 / steps as f64))
                .collect();
            if hole > 0.0 {
                outline.extend(
                    (0..=steps)
                        .rev()
                        .map(|s| at(hole, start + sweep * s as f64 / steps as f64)),
                );
            } else {
                outline.push((cx, cy));
            }
            area.draw(&Polygon::new(outline, token_rgb(&self.parser, &p.color).filled()))?;

            if self.config.show_labels {
                let text = if self.config.show_values {
                    format!("{} {}", p.name, format_percent(pct))
                } else {
                    p.name.clone()
                };
                draw_label(area, &text, at(radius + 20.0, (start + end) / 2.0), 14.0, BLACK);
            }
            start = end;
        }

        if self.config.show_legend {
            let x = w as i32 - 150;
            for (i, p) in data.iter().enumerate() {
                let y = 20 + i as i32 * 20;
                area.draw(&Rectangle::new(
                    [(x, y - 5), (x + 10, y + 5)],
                    token_rgb(&self.parser, &p.color).filled(),
                ))?;
                draw_label(area, &p.name, (x + 60, y), 14.0, BLACK);
            }
        }
        Ok(())
    }

    fn bars(
        &self,
        area: &Area,
        layer: &BarLayer,
        line: Option<&Vec<ColorizedDataPoint>>,
    ) -> Result<()> {
        let data = &layer.data;
        let names: Vec<String> = data.iter().map(|p| p.name.clone()).collect();
        let (v_min, v_max) = value_range(data.iter().map(|p| p.value));
        let n = data.len() as f64 + 1.0;
        let show_labels = self.config.show_labels;
        let category = |x: &f64| category_label(&names, *x, show_labels);

        let horizontal = layer.orientation == Orientation::Horizontal;
        let mut builder = ChartBuilder::on(area);
        builder.margin(20).x_label_area_size(40).y_label_area_size(80);

        if horizontal {
            let mut chart = builder.build_cartesian_2d(v_min..v_max, 0.0..n)?;
            {
                let mut mesh = chart.configure_mesh();
                mesh.y_labels(data.len() + 2).y_label_formatter(&category);
                if !self.config.show_grid {
                    mesh.disable_mesh();
                }
                mesh.light_line_style(GRID).draw()?;
            }
            for (i, p) in data.iter().enumerate() {
                let y = i as f64 + 1.0;
                let color = token_rgb(&self.parser, &p.color);
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(0.0, y - 0.35), (p.value, y + 0.35)],
                        color.filled(),
                    )))?
                    .label(p.name.as_str())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
            }
            if self.config.show_values {
                let labels = data.iter().enumerate().map(|(i, p)| {
                    Text::new(
                        format_value(p.value),
                        (p.value, i as f64 + 1.0),
                        text_style(12.0, BLACK),
                    )
                });
                if let Err(e) = chart.draw_series(labels) {
                    tracing::warn!("Skipping bar values: {}", e);
                }
            }
            if self.config.show_legend {
                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()?;
            }
            return Ok(());
        }

        let (v_min, v_max) = match line {
            Some(line) => {
                let (lo, hi) = value_range(line.iter().map(|p| p.value));
                (v_min.min(lo), v_max.max(hi))
            }
            None => (v_min, v_max),
        };
        let mut chart = builder.build_cartesian_2d(0.0..n, v_min..v_max)?;
        {
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(data.len() + 2).x_label_formatter(&category);
            if !self.config.show_grid {
                mesh.disable_mesh();
            }
            mesh.light_line_style(GRID).draw()?;
        }

        let composed = line.is_some();
        for (i, p) in data.iter().enumerate() {
            let x = i as f64 + 1.0;
            // A composed chart is two series, each in one palette color
            let color = if composed {
                self.series_color(0)
            } else {
                token_rgb(&self.parser, &p.color)
            };
            let drawn = chart.draw_series(std::iter::once(Rectangle::new(
                [(x - 0.35, 0.0), (x + 0.35, p.value)],
                color.filled(),
            )))?;
            if !composed {
                drawn
                    .label(p.name.as_str())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
            }
        }
        if composed {
            let color = self.series_color(0);
            chart
                .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
                .label("value")
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }
        if let Some(line) = line {
            let color = self.series_color(1);
            chart
                .draw_series(LineSeries::new(
                    line.iter().enumerate().map(|(i, p)| (i as f64 + 1.0, p.value)),
                    color.stroke_width(2),
                ))?
                .label("trend")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        if self.config.show_values {
            let labels = data.iter().enumerate().map(|(i, p)| {
                Text::new(
                    format_value(p.value),
                    (i as f64 + 1.0, p.value),
                    text_style(12.0, BLACK),
                )
            });
            if let Err(e) = chart.draw_series(labels) {
                tracing::warn!("Skipping bar values: {}", e);
            }
        }
        if self.config.show_legend {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        Ok(())
    }

    fn xy(&self, area: &Area, data: &[ColorizedDataPoint], fill: bool) -> Result<()> {
        let names: Vec<String> = data.iter().map(|p| p.name.clone()).collect();
        let (v_min, v_max) = value_range(data.iter().map(|p| p.value));
        let show_labels = self.config.show_labels;
        let category = |x: &f64| category_label(&names, *x, show_labels);
        let color = self.series_color(0);
        let points: Vec<(f64, f64)> = data
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64 + 1.0, p.value))
            .collect();

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..data.len() as f64 + 1.0, v_min..v_max)?;
        {
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(data.len() + 2).x_label_formatter(&category);
            if !self.config.show_grid {
                mesh.disable_mesh();
            }
            mesh.light_line_style(GRID).draw()?;
        }

        if fill {
            chart
                .draw_series(
                    AreaSeries::new(points.iter().copied(), v_min.max(0.0), color.mix(0.3).filled())
                        .border_style(color.stroke_width(2)),
                )?
                .label("value")
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        } else {
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label("value")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart.draw_series(PointSeries::of_element(
                points.iter().copied(),
                4,
                color,
                &|c, s, _| EmptyElement::at(c) + Circle::new((0, 0), s, color.filled()),
            ))?;
        }

        if self.config.show_legend {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        Ok(())
    }

    fn scatter(&self, area: &Area, coords: &[(f64, f64)]) -> Result<()> {
        let (v_min, v_max) = value_range(coords.iter().map(|(_, y)| *y));
        let x_max = coords.iter().map(|(x, _)| *x).fold(0.0, f64::max) + 1.0;
        let color = self.series_color(2);

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..x_max, v_min..v_max)?;
        {
            let mut mesh = chart.configure_mesh();
            if !self.config.show_grid {
                mesh.disable_mesh();
            }
            mesh.light_line_style(GRID).draw()?;
        }

        chart
            .draw_series(coords.iter().map(|&c| Circle::new(c, 5, color.filled())))?
            .label("value")
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));

        if self.config.show_legend {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        Ok(())
    }

    /// `axes` holds `(subject, value, full_mark)` per spoke.
    fn radar(&self, area: &Area, axes: &[(&str, f64, f64)]) -> Result<()> {
        let (w, h) = area.dim_in_pixel();
        let (cx, cy) = center(area);
        let radius = (w.min(h) as f64 / 2.0 - 40.0).max(10.0);
        let scale = axes
            .iter()
            .map(|(_, a, full)| a.max(*full))
            .fold(0.0, f64::max)
            .max(f64::EPSILON);
        let n = axes.len();
        let at = |r: f64, i: usize| {
            let theta = TAU * i as f64 / n as f64;
            (
                cx + (r * theta.sin()).round() as i32,
                cy - (r * theta.cos()).round() as i32,
            )
        };

        if self.config.show_grid {
            for ring in 1..=4 {
                let r = radius * ring as f64 / 4.0;
                let mut outline: Vec<(i32, i32)> = (0..n).map(|i| at(r, i)).collect();
                outline.push(at(r, 0));
                area.draw(&PathElement::new(outline, GRID))?;
            }
            for i in 0..n {
                area.draw(&PathElement::new(vec![(cx, cy), at(radius, i)], GRID))?;
            }
        }

        let color = self.series_color(3);
        let shape: Vec<(i32, i32)> = axes
            .iter()
            .enumerate()
            .map(|(i, (_, a, _))| at(radius * (a.max(0.0) / scale), i))
            .collect();
        area.draw(&Polygon::new(shape.clone(), color.mix(0.6).filled()))?;
        let mut border = shape;
        if let Some(first) = border.first().copied() {
            border.push(first);
        }
        area.draw(&PathElement::new(border, color.stroke_width(2)))?;

        if self.config.show_labels {
            for (i, (subject, a, _)) in axes.iter().enumerate() {
                let text = if self.config.show_values {
                    format!("{} ({})", subject, format_value(*a))
                } else {
                    subject.to_string()
                };
                draw_label(area, &text, at(radius + 20.0, i), 14.0, BLACK);
            }
        }
        Ok(())
    }

    /// Centered bands, widest for the largest value, in input order.
    fn funnel(&self, area: &Area, data: &[ColorizedDataPoint]) -> Result<()> {
        let (w, h) = area.dim_in_pixel();
        let max = data.iter().map(|p| p.value).fold(0.0, f64::max);
        let band = ((h as f64 - 40.0) / data.len() as f64).max(4.0);
        let full = w as f64 * 0.8;
        let cx = w as f64 / 2.0;

        for (i, p) in data.iter().enumerate() {
            let half = if max > 0.0 {
                (full * (p.value.max(0.0) / max) / 2.0).max(2.0)
            } else {
                2.0
            };
            let top = 20.0 + band * i as f64;
            let bottom = top + band - 4.0;
            area.draw(&Rectangle::new(
                [
                    ((cx - half) as i32, top as i32),
                    ((cx + half) as i32, bottom as i32),
                ],
                token_rgb(&self.parser, &p.color).filled(),
            ))?;
            if self.config.show_labels {
                let text = if self.config.show_values {
                    format!("{} {}", p.name, format_value(p.value))
                } else {
                    p.name.clone()
                };
                draw_label(area, &text, (cx as i32, ((top + bottom) / 2.0) as i32), 14.0, BLACK);
            }
        }
        Ok(())
    }

    fn treemap(&self, area: &Area, cells: &[(&str, f64, RGBColor)]) -> Result<()> {
        let (w, h) = area.dim_in_pixel();
        // The layout works in terminal cells; scale pixels down to the same proportions
        let cols = (w / 4).min(u16::MAX as u32) as u16;
        let rows = (h / 8).min(u16::MAX as u32) as u16;
        let bounds = ratatui::layout::Rect::new(0, 0, cols, rows);
        let weights: Vec<f64> = cells.iter().map(|(_, size, _)| size.max(0.0)).collect();
        let mut rects = Vec::with_capacity(cells.len());
        treemap_layout(bounds, &weights, 0, &mut rects);

        for (i, rect) in rects {
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            let (name, size, color) = cells[i];
            let x0 = rect.x as i32 * 4;
            let y0 = rect.y as i32 * 8;
            let x1 = rect.right() as i32 * 4;
            let y1 = rect.bottom() as i32 * 8;
            area.draw(&Rectangle::new([(x0, y0), (x1, y1)], color.filled()))?;
            area.draw(&Rectangle::new([(x0, y0), (x1, y1)], WHITE.stroke_width(2)))?;
            if self.config.show_labels {
                let text = if self.config.show_values {
                    format!("{} {}", name, format_value(size))
                } else {
                    name.to_string()
                };
                draw_label(area, &text, ((x0 + x1) / 2, (y0 + y1) / 2), 14.0, WHITE);
            }
        }
        Ok(())
    }
}

fn center(area: &Area) -> (i32, i32) {
    let (w, h) = area.dim_in_pixel();
    (w as i32 / 2, h as i32 / 2)
}

/// Value axis range including zero, with headroom above the largest value.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let hi = if hi > 0.0 { hi * 1.1 } else { 1.0 };
    let lo = if lo < 0.0 { lo * 1.1 } else { 0.0 };
    (lo, hi)
}

/// Name of the category plotted at integer position `x` (1-based).
fn category_label(names: &[String], x: f64, show: bool) -> String {
    if !show || (x - x.round()).abs() > 1e-6 || x < 1.0 {
        return String::new();
    }
    names.get(x.round() as usize - 1).cloned().unwrap_or_default()
}
