use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

use crate::config::Theme;

/// Key hints shown while the chart has focus.
pub const CHART_CONTROLS: [(&str, &str); 9] = [
    ("/", "Search"),
    ("s", "Settings"),
    ("c", "Chart"),
    ("p", "Palette"),
    ("[ ]", "Point"),
    ("e", "Export"),
    ("r", "Reload"),
    ("x", "Clear"),
    ("q", "Quit"),
];

/// Key hints shown while the settings sidebar has focus.
pub const SETTINGS_CONTROLS: [(&str, &str); 5] = [
    ("Tab", "Next"),
    ("←→", "Change"),
    ("Space", "Toggle"),
    ("Esc", "Close"),
    ("q", "Quit"),
];

/// Key hint bar with an optional right-aligned point count.
pub struct Controls<'a> {
    pub controls: &'a [(&'a str, &'a str)],
    pub point_count: Option<(usize, usize)>,
    pub dimmed: bool,
    bar_color: Color,
    key_color: Color,
    text_color: Color,
}

impl<'a> Controls<'a> {
    pub fn new(controls: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            controls,
            point_count: None,
            dimmed: false,
            bar_color: Color::DarkGray,
            key_color: Color::Reset,
            text_color: Color::White,
        }
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.bar_color = theme.get("controls_bg");
        self.key_color = theme.get("primary");
        self.text_color = theme.get("text_primary");
        self
    }

    /// Visible and total points, rendered as "Points: 3/4".
    pub fn with_point_count(mut self, shown: usize, total: usize) -> Self {
        self.point_count = Some((shown, total));
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }
}

impl Widget for &Controls<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self.controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        if self.point_count.is_some() {
            constraints.push(Constraint::Length(16));
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let key_style = if self.dimmed {
            base_style.bold()
        } else {
            base_style.fg(self.key_color).bold()
        };

        for (i, (key, action)) in self.controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(key_style)
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bar_color))
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = self.controls.len() * 2;
        if let Some((shown, total)) = self.point_count {
            Paragraph::new(format!("Points: {}/{}", shown, total))
                .style(base_style.bg(self.bar_color).fg(if self.dimmed {
                    Color::DarkGray
                } else {
                    self.text_color
                }))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(self.bar_color))
            .render(layout[fill_start_idx], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_hints_and_count() {
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        (&Controls::new(&CHART_CONTROLS).with_point_count(3, 4)).render(area, &mut buf);
        let line: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(line.contains("Search"));
        assert!(line.contains("Quit"));
        assert!(line.contains("Points: 3/4"));
    }
}
