use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::DayLabels;
use crate::trend::picker::{scale_ticks, ScaleTick};
use crate::trend::progress::ideal_weight_range;
use crate::trend::TargetPicker;
use crate::tui::theme;
use crate::utils::format::format_short;

fn nearest_tick(ticks: &[ScaleTick], value: f64) -> usize {
    ticks
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (a.weight - value)
                .abs()
                .total_cmp(&(b.weight - value).abs())
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Numbers under the major ticks, each centred on its tick column.
fn label_row(ticks: &[ScaleTick], spacing: usize) -> String {
    let width = ticks.len() * spacing;
    let mut row = vec![' '; width + 4];
    for (i, tick) in ticks.iter().enumerate().filter(|(_, t)| t.major) {
        let text: Vec<char> = format_short(tick.weight).chars().collect();
        let start = (i * spacing).saturating_sub(text.len() / 2);
        for (offset, ch) in text.into_iter().enumerate() {
            if let Some(slot) = row.get_mut(start + offset) {
                *slot = ch;
            }
        }
    }
    row.into_iter().collect::<String>().trim_end().to_string()
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    picker: &TargetPicker,
    height_cm: f64,
    labels: DayLabels,
) {
    let block = Block::default()
        .title(Span::styled(" Target Weight ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let value = picker.value();
    let category = picker.category(height_cm);
    let category_style = Style::default().fg(theme::bmi_color(category));

    let ticks = scale_ticks(value, height_cm);
    let spacing = if inner.width as usize >= ticks.len() * 2 + 4 { 2 } else { 1 };
    let ruler_width = ticks.len() * spacing;
    let pad = " ".repeat((inner.width as usize).saturating_sub(ruler_width) / 2);
    let pointer = nearest_tick(&ticks, value) * spacing;

    let mut tick_spans = vec![Span::raw(pad.clone())];
    for tick in &ticks {
        let glyph = if tick.major { "┃" } else { "╷" };
        tick_spans.push(Span::styled(glyph, Style::default().fg(theme::bmi_color(tick.category))));
        if spacing > 1 {
            tick_spans.push(Span::raw(" ".repeat(spacing - 1)));
        }
    }

    let (low, high) = ideal_weight_range(height_cm);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} kg", format_short(value)),
            theme::bold().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(vec![
            Span::styled(format!("BMI {:.1}  ", picker.bmi(height_cm)), theme::dim()),
            Span::styled(category.label(labels), category_style),
        ])
        .alignment(Alignment::Center),
        Line::from(""),
        Line::from(vec![
            Span::raw(pad.clone()),
            Span::raw(" ".repeat(pointer)),
            Span::styled("▼", theme::accent()),
        ]),
        Line::from(tick_spans),
        Line::from(vec![
            Span::raw(pad),
            Span::styled(label_row(&ticks, spacing), theme::dim()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Ideal for {} cm:  {} – {} kg",
                format_short(height_cm),
                format_short(low),
                format_short(high)
            ),
            theme::green(),
        ))
        .alignment(Alignment::Center),
    ];

    lines.push(Line::from(""));
    match picker.limit_tip() {
        Some(tip) => lines.push(Line::from(Span::styled(tip, theme::red())).alignment(Alignment::Center)),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            "←/→ 0.5 kg  ·  PgUp/PgDn 5 kg  ·  drag ruler  ·  Enter save  ·  Esc back",
            theme::dim(),
        ))
        .alignment(Alignment::Center),
    );

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_lands_on_selected_weight() {
        let ticks = scale_ticks(72.5, 170.0);
        assert_eq!(ticks[nearest_tick(&ticks, 72.5)].weight, 72.5);
        let edge = scale_ticks(11.0, 170.0);
        assert_eq!(edge[nearest_tick(&edge, 11.0)].weight, 11.0);
    }

    #[test]
    fn labels_sit_under_major_ticks() {
        let ticks = scale_ticks(75.0, 170.0);
        let row = label_row(&ticks, 2);
        assert!(row.starts_with("65"));
        assert!(row.contains("70"));
        assert!(row.trim_end().ends_with("85"));
    }
}
