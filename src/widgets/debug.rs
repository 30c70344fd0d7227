use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget},
};

/// Counters shown in the bottom line with `--debug`.
#[derive(Debug, Default)]
pub struct DebugState {
    pub enabled: bool,
    pub num_events: usize,
    pub num_frames: usize,
    pub num_updates: usize,
    pub last_key: Option<String>,
}

impl DebugState {
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let text = format!(
            "events: {}  frames: {}  config updates: {}  last key: {}",
            self.num_events,
            self.num_frames,
            self.num_updates,
            self.last_key.as_deref().unwrap_or("-")
        );
        Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .render(area, buf);
    }
}
