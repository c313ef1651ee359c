use ratatui::style::{Color, Modifier, Style};

use crate::models::{BmiCategory, DayTrend};

pub const BG: Color = Color::Rgb(14, 18, 20);
pub const SURFACE: Color = Color::Rgb(22, 28, 31);
pub const BORDER: Color = Color::Rgb(44, 58, 62);
pub const BORDER_FOCUS: Color = Color::Rgb(72, 176, 160);
pub const TEXT: Color = Color::Rgb(214, 226, 224);
pub const TEXT_DIM: Color = Color::Rgb(110, 128, 130);
pub const TEAL: Color = Color::Rgb(72, 176, 160);
pub const GREEN: Color = Color::Rgb(104, 170, 104);
pub const AMBER: Color = Color::Rgb(214, 150, 70);
pub const RED: Color = Color::Rgb(196, 88, 74);
pub const BLUE: Color = Color::Rgb(96, 140, 200);
pub const EMPTY: Color = Color::Rgb(30, 38, 40);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(TEAL)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    Style::default().fg(if focused { BORDER_FOCUS } else { BORDER })
}

pub fn bmi_color(category: BmiCategory) -> Color {
    match category {
        BmiCategory::Under => BLUE,
        BmiCategory::Normal => GREEN,
        BmiCategory::Over => AMBER,
        BmiCategory::Obese => RED,
    }
}

pub fn trend(trend: DayTrend) -> Style {
    match trend {
        DayTrend::Down => green(),
        DayTrend::Up => red(),
        DayTrend::Flat => bold(),
        DayTrend::FirstRecord => accent(),
        DayTrend::NoRecord => dim(),
    }
}
