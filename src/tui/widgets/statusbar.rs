use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

/// Key hints, or a one-off status message when there is one.
pub fn render(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], status: Option<&str>) {
    let line = match status {
        Some(msg) => Line::from(Span::styled(msg.to_string(), theme::amber())),
        None => {
            let mut spans = Vec::new();
            for (key, label) in hints {
                spans.push(Span::styled(*key, theme::accent()));
                spans.push(Span::styled(*label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
