use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::models::DayLabels;
use crate::trend::progress::ideal_weight_range;
use crate::trend::{DataOrigin, TrendSnapshot};
use crate::tui::theme;
use crate::utils::format::{format_short, format_weight};

pub fn render(frame: &mut Frame, area: Rect, snapshot: &TrendSnapshot, labels: DayLabels) {
    let block = Block::default()
        .title(Span::styled(" Progress ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // current weight
            Constraint::Length(1), // gauge
            Constraint::Min(0),    // details
        ])
        .split(inner);

    let progress = &snapshot.progress;
    let when = if snapshot.today_weight.is_some() {
        "today"
    } else if snapshot.record_count > 0 {
        "latest"
    } else {
        "no records yet"
    };

    let current = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled(
                format!("{} kg", format_weight(snapshot.current_weight)),
                theme::bold().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", when), theme::dim()),
        ]),
    ];
    frame.render_widget(Paragraph::new(current), chunks[0]);

    let gauge_area = Rect {
        x: chunks[1].x + 2,
        width: chunks[1].width.saturating_sub(4),
        ..chunks[1]
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme::TEAL).bg(theme::EMPTY))
        .ratio(progress.fraction_complete)
        .label(Span::styled(format!("{}%", progress.percent), theme::bold()));
    frame.render_widget(gauge, gauge_area);

    let (low, high) = ideal_weight_range(snapshot.profile.height_cm);
    let category_style = Style::default().fg(theme::bmi_color(progress.bmi_category));
    let mut details = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Start  ", theme::dim()),
            Span::styled(format_short(snapshot.start_weight), theme::bold()),
            Span::styled("   Goal  ", theme::dim()),
            Span::styled(format_short(snapshot.profile.goal_weight), theme::bold()),
            Span::styled("   To go  ", theme::dim()),
            Span::styled(format_weight(progress.remaining_delta), theme::accent()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  BMI  ", theme::dim()),
            Span::styled(format!("{:.1}  ", progress.bmi), theme::bold()),
            Span::styled(progress.bmi_category.label(labels), category_style),
        ]),
        Line::from(Span::styled(
            format!("  Ideal  {} – {} kg", format_short(low), format_short(high)),
            theme::dim(),
        )),
    ];
    if snapshot.profile_origin != DataOrigin::Store {
        details.push(Line::from(""));
        details.push(Line::from(Span::styled(
            "  Set height and target with [t] or `weighin setup`",
            theme::amber(),
        )));
    }
    frame.render_widget(Paragraph::new(details), chunks[2]);
}
