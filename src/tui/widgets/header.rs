use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, nickname: Option<&str>, today: NaiveDate, stale: bool) {
    let date_str = today.format("%A, %b %d, %Y").to_string();

    let mut title = vec![
        Span::styled("  weighin  ", theme::accent().add_modifier(Modifier::BOLD)),
    ];
    if let Some(name) = nickname {
        title.push(Span::styled("·  ", theme::dim()));
        title.push(Span::styled(format!("hi, {}", name), theme::bold()));
    }

    let mut date_line = vec![Span::styled(date_str, theme::dim())];
    if stale {
        date_line.push(Span::styled("  ·  ", theme::dim()));
        date_line.push(Span::styled("offline data", theme::amber()));
    }

    let text = vec![Line::from(title), Line::from(""), Line::from(date_line)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
