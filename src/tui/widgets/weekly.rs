use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{DayLabels, WeekHistory, DAYS_PER_WEEK};
use crate::trend::week_grid::{chart_ceiling, day_trends};
use crate::tui::theme;
use crate::utils::format::format_short;

/// Bar heights are value / ceiling on this scale.
const BAR_SCALE: f64 = 1000.0;
const BAR_GAP: u16 = 1;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    history: &WeekHistory,
    index: usize,
    labels: DayLabels,
    focused: bool,
) {
    let title = match history.get(index) {
        Some(week) => format!(" {}  ·  {}/{} ", week.label(labels), index + 1, history.len()),
        None => " Week ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(focused))
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(week) = history.get(index) else {
        frame.render_widget(Paragraph::new(Span::styled("  No weeks to show", theme::dim())), inner);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // bars
            Constraint::Length(1), // trend marks
            Constraint::Length(1), // footer
        ])
        .split(inner);

    let bar_width = (inner.width.saturating_sub(BAR_GAP * (DAYS_PER_WEEK as u16 - 1))
        / DAYS_PER_WEEK as u16)
        .max(1);
    let ceiling = chart_ceiling(history, index);
    let trends = day_trends(history, index);

    let bars: Vec<Bar> = week
        .days
        .iter()
        .zip(trends.iter())
        .map(|(cell, trend)| {
            let height = if cell.has_record() {
                ((cell.value / ceiling) * BAR_SCALE).round() as u64
            } else {
                0
            };
            let text = if cell.has_record() {
                format_short(cell.value)
            } else {
                String::new()
            };
            Bar::default()
                .value(height)
                .text_value(text)
                .label(Line::from(cell.label(labels)))
                .style(theme::trend(*trend))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(BAR_GAP)
        .max(BAR_SCALE as u64)
        .value_style(Style::default().fg(theme::BG).bg(theme::TEAL).add_modifier(Modifier::BOLD))
        .label_style(theme::dim());
    frame.render_widget(chart, chunks[0]);

    let slot = (bar_width + BAR_GAP) as usize;
    let marks: Vec<Span> = trends
        .iter()
        .map(|t| Span::styled(format!("{:^w$}", t.symbol(), w = bar_width as usize), theme::trend(*t)))
        .flat_map(|s| [s, Span::raw(" ".repeat(slot - bar_width as usize))])
        .collect();
    frame.render_widget(Paragraph::new(Line::from(marks)), chunks[1]);

    let footer = match week.average() {
        Some(avg) => format!(
            "avg {}  ·  {}/7 days  ·  ←/→ week",
            format_short((avg * 10.0).round() / 10.0),
            week.recorded_days()
        ),
        None => "no records  ·  ←/→ week".to_string(),
    };
    frame.render_widget(Paragraph::new(Span::styled(footer, theme::dim())), chunks[2]);
}
