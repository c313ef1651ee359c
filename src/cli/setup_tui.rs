use anyhow::Result;
use chrono::{Datelike, Local};
use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{MetaRepo, SETUP_DONE_KEY};
use crate::db::{LocalStore, SessionToken, WeightStore};
use crate::models::{Gender, UserProfile};
use crate::trend::progress::{classify_bmi, compute_bmi, ideal_weight_range};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::utils::format::format_short;

// ─── Wizard steps ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Welcome,
    Nickname,
    Gender,
    BirthYear,
    Height,
    Target,
    Confirm,
}

// ─── Wizard state ─────────────────────────────────────────────────────────────

struct ProfileWizard {
    step: Step,
    input: String,
    error: Option<String>,

    // Collected values
    nickname: Option<String>,
    gender_idx: usize, // 0 = male, 1 = female
    birth_year: Option<i32>,
    height_cm: f64,
    target: f64,

    // Limits and Tab defaults
    floor: f64,
    ceiling: f64,
    default_height: f64,
    default_target: f64,
    this_year: i32,

    should_quit: bool,
    confirmed: bool,
}

impl ProfileWizard {
    fn new(existing: &UserProfile, target: Option<f64>, config: &AppConfig) -> Self {
        Self {
            step: Step::Welcome,
            input: String::new(),
            error: None,

            nickname: existing.nickname.clone(),
            gender_idx: if existing.gender == Some(Gender::Female) { 1 } else { 0 },
            birth_year: existing.birth_year,
            height_cm: existing.height_cm.unwrap_or(config.profile.default_height_cm),
            target: target.unwrap_or(config.profile.default_goal_weight),

            floor: config.picker.floor,
            ceiling: config.picker.ceiling,
            default_height: config.profile.default_height_cm,
            default_target: config.profile.default_goal_weight,
            this_year: Local::now().date_naive().year(),

            should_quit: false,
            confirmed: false,
        }
    }

    fn step_number(&self) -> usize {
        match self.step {
            Step::Welcome => 0,
            Step::Nickname => 1,
            Step::Gender => 2,
            Step::BirthYear => 3,
            Step::Height => 4,
            Step::Target => 5,
            Step::Confirm => 6,
        }
    }

    const TOTAL_STEPS: usize = 6;

    fn prefill(&mut self) {
        self.input = match self.step {
            Step::Nickname => self.nickname.clone().unwrap_or_default(),
            Step::BirthYear => self.birth_year.map(|y| y.to_string()).unwrap_or_default(),
            Step::Height => format_short(self.height_cm),
            Step::Target => format_short(self.target),
            _ => String::new(),
        };
    }

    fn advance(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => Step::Nickname,
            Step::Nickname => Step::Gender,
            Step::Gender => Step::BirthYear,
            Step::BirthYear => Step::Height,
            Step::Height => Step::Target,
            Step::Target => Step::Confirm,
            Step::Confirm => {
                self.confirmed = true;
                Step::Confirm
            }
        };
        self.prefill();
    }

    fn go_back(&mut self) {
        self.error = None;
        self.step = match self.step {
            Step::Welcome => {
                self.should_quit = true;
                Step::Welcome
            }
            Step::Nickname => Step::Welcome,
            Step::Gender => Step::Nickname,
            Step::BirthYear => Step::Gender,
            Step::Height => Step::BirthYear,
            Step::Target => Step::Height,
            Step::Confirm => Step::Target,
        };
        self.prefill();
    }

    fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match &self.step {
            Step::Welcome => {
                if key.code == KeyCode::Esc {
                    self.should_quit = true;
                } else {
                    self.advance();
                }
            }

            Step::Nickname => self.handle_text_input(key, |s| {
                if s.chars().count() > 20 {
                    Err("Keep it to 20 characters or fewer".to_string())
                } else {
                    Ok(())
                }
            }),

            Step::Gender => match key.code {
                KeyCode::Left | KeyCode::Char('1') | KeyCode::Char('h') => {
                    self.gender_idx = 0;
                }
                KeyCode::Right | KeyCode::Char('2') | KeyCode::Char('l') => {
                    self.gender_idx = 1;
                }
                KeyCode::Enter => self.advance(),
                KeyCode::Esc => self.go_back(),
                _ => {}
            },

            Step::BirthYear => {
                let this_year = self.this_year;
                self.handle_text_input(key, move |s| {
                    if s.is_empty() {
                        return Ok(());
                    }
                    s.parse::<i32>()
                        .map_err(|_| "Enter a year like 1990, or leave empty".to_string())
                        .and_then(|y| {
                            if y < 1900 || y > this_year {
                                Err(format!("Year must be between 1900 and {}", this_year))
                            } else {
                                Ok(())
                            }
                        })
                })
            }

            Step::Height => self.handle_text_input(key, |s| {
                s.parse::<f64>()
                    .map_err(|_| "Enter your height in cm (e.g. 172)".to_string())
                    .and_then(|h| {
                        if !(50.0..=260.0).contains(&h) {
                            Err("Height must be between 50 and 260 cm".to_string())
                        } else {
                            Ok(())
                        }
                    })
            }),

            Step::Target => {
                let (floor, ceiling) = (self.floor, self.ceiling);
                self.handle_text_input(key, move |s| {
                    s.parse::<f64>()
                        .map_err(|_| "Enter a target in kg (e.g. 68.5)".to_string())
                        .and_then(|t| {
                            if t < floor || t > ceiling {
                                Err(format!("Target must be between {} and {} kg", floor, ceiling))
                            } else {
                                Ok(())
                            }
                        })
                })
            }

            Step::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    self.confirmed = true;
                }
                KeyCode::Esc | KeyCode::Char('n') => self.go_back(),
                _ => {}
            },
        }
    }

    fn handle_text_input<F>(&mut self, key: crossterm::event::KeyEvent, validate: F)
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        match key.code {
            KeyCode::Esc => self.go_back(),
            KeyCode::Enter => {
                let val = self.input.trim().to_string();
                match validate(&val) {
                    Ok(()) => {
                        self.commit_text_input(&val);
                        self.advance();
                    }
                    Err(e) => {
                        self.error = Some(e);
                    }
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
            }
            KeyCode::Tab => {
                self.input = match self.step {
                    Step::Height => format_short(self.default_height),
                    Step::Target => format_short(self.default_target),
                    _ => self.input.clone(),
                };
                self.error = None;
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
            }
            _ => {}
        }
    }

    fn commit_text_input(&mut self, val: &str) {
        match self.step {
            Step::Nickname => {
                self.nickname = if val.is_empty() { None } else { Some(val.to_string()) };
            }
            Step::BirthYear => {
                self.birth_year = val.parse().ok();
            }
            Step::Height => {
                self.height_cm = val.parse().unwrap_or(self.height_cm);
            }
            Step::Target => {
                self.target = val.parse().unwrap_or(self.target);
            }
            _ => {}
        }
    }

    fn gender(&self) -> Gender {
        if self.gender_idx == 0 { Gender::Male } else { Gender::Female }
    }

    fn build_profile(&self) -> UserProfile {
        UserProfile {
            nickname: self.nickname.clone(),
            gender: Some(self.gender()),
            birth_year: self.birth_year,
            height_cm: Some(self.height_cm),
        }
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn draw(frame: &mut Frame, wizard: &ProfileWizard) {
    let area = frame.area();

    frame.render_widget(Block::default().style(theme::base()), area);

    // Center the wizard box
    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(24),
            Constraint::Min(0),
        ])
        .split(area);

    let hchunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(64),
            Constraint::Min(0),
        ])
        .split(vchunks[1]);

    let box_area = hchunks[1];
    frame.render_widget(Clear, box_area);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::surface())
        .title(Span::styled(
            "  weighin  ·  Profile  ",
            theme::accent().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    frame.render_widget(outer_block, box_area);

    let inner = Rect {
        x: box_area.x + 2,
        y: box_area.y + 1,
        width: box_area.width.saturating_sub(4),
        height: box_area.height.saturating_sub(2),
    };

    match wizard.step {
        Step::Welcome => draw_welcome(frame, inner),
        Step::Gender => draw_choice(
            frame,
            inner,
            "Gender",
            "Shown on your profile only",
            &["Male", "Female"],
            wizard.gender_idx,
        ),
        Step::Confirm => draw_confirm(frame, inner, wizard),
        _ => draw_text_step(frame, inner, wizard),
    }

    draw_progress(frame, inner, wizard.step_number(), ProfileWizard::TOTAL_STEPS);
}

fn draw_progress(frame: &mut Frame, area: Rect, current: usize, total: usize) {
    let mut spans = vec![Span::styled("  ", theme::dim())];
    for i in 1..=total {
        if i < current {
            spans.push(Span::styled("● ", theme::green()));
        } else if i == current {
            spans.push(Span::styled("◉ ", theme::accent()));
        } else {
            spans.push(Span::styled("○ ", theme::dim()));
        }
    }
    let progress_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), progress_area);
}

fn content_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: area.height.saturating_sub(2),
    }
}

fn draw_welcome(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to weighin",
            theme::bold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "One number a day, and a clear view of where it is heading.",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("This wizard will ask for:", theme::dim())),
        Line::from(vec![
            Span::styled("  ●  ", theme::accent()),
            Span::styled("A nickname, gender and birth year", theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("  ●  ", theme::accent()),
            Span::styled("Your height, for BMI", theme::dim()),
        ]),
        Line::from(vec![
            Span::styled("  ●  ", theme::accent()),
            Span::styled("The weight you are aiming for", theme::dim()),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press  Enter  to begin  ·  Esc  to cancel",
            theme::dim(),
        )),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_text_step(frame: &mut Frame, area: Rect, wizard: &ProfileWizard) {
    let (title, subtitle, hint) = match wizard.step {
        Step::Nickname => (
            "Nickname",
            "What should we call you? (optional)",
            "Leave empty to skip",
        ),
        Step::BirthYear => (
            "Birth Year",
            "Optional, kept on your profile",
            "e.g.  1990  ·  leave empty to skip",
        ),
        Step::Height => (
            "Height",
            "In centimetres, used for BMI and the ideal range",
            "e.g.  172  ·  [Tab] to reset",
        ),
        Step::Target => (
            "Target Weight",
            "In kilograms",
            "e.g.  68.5  ·  [Tab] to reset",
        ),
        _ => ("", "", ""),
    };

    let cursor = if wizard.input.len() < 40 { "█" } else { "" };

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(title, theme::accent().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];

    let input_display = format!("  {}{}  ", wizard.input, cursor);
    let input_width = area.width.saturating_sub(8) as usize;
    let padded = format!("{:<width$}", input_display, width = input_width);

    let input_style = if wizard.error.is_some() {
        theme::red()
    } else {
        theme::amber()
    };

    lines.push(Line::from(Span::styled(padded, input_style.add_modifier(Modifier::BOLD))));
    lines.push(Line::from(""));

    if let Some(err) = &wizard.error {
        lines.push(Line::from(Span::styled(format!("  ✗  {}", err), theme::red())));
    } else if wizard.step == Step::Target {
        let (low, high) = ideal_weight_range(wizard.height_cm);
        lines.push(Line::from(Span::styled(
            format!("Ideal for {} cm:  {} – {} kg", format_short(wizard.height_cm), format_short(low), format_short(high)),
            theme::green(),
        )));
        lines.push(Line::from(Span::styled(hint, theme::dim())));
    } else {
        lines.push(Line::from(Span::styled(hint, theme::dim())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_choice(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    subtitle: &str,
    options: &[&str],
    selected: usize,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, theme::accent().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];

    for (i, opt) in options.iter().enumerate() {
        if i == selected {
            lines.push(Line::from(vec![
                Span::styled("  ◉  ", theme::accent()),
                Span::styled(*opt, theme::accent().add_modifier(Modifier::BOLD)),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled("  ○  ", theme::dim()),
                Span::styled(*opt, theme::dim()),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "←→  or  1 2  choose   ·   Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_confirm(frame: &mut Frame, area: Rect, wizard: &ProfileWizard) {
    let bmi = compute_bmi(wizard.target, wizard.height_cm);
    let category = classify_bmi(bmi);
    let dash = "—".to_string();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Confirm Profile", theme::accent().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Nickname    ", theme::dim()),
            Span::styled(wizard.nickname.clone().unwrap_or_else(|| dash.clone()), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Gender      ", theme::dim()),
            Span::styled(wizard.gender().display_name(), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Birth year  ", theme::dim()),
            Span::styled(
                wizard.birth_year.map(|y| y.to_string()).unwrap_or_else(|| dash.clone()),
                theme::bold(),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Height      ", theme::dim()),
            Span::styled(format!("{} cm", format_short(wizard.height_cm)), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Target      ", theme::dim()),
            Span::styled(format!("{} kg", format_short(wizard.target)), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  BMI there   ", theme::dim()),
            Span::styled(
                format!("{:.1}  {}", bmi, category),
                Style::default().fg(theme::bmi_color(category)),
            ),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Enter  save   ·   Esc  go back",
            theme::dim(),
        )),
    ];

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

// ─── Public entry point ──────────────────────────────────────────────────────

pub fn run_setup_tui(conn: &Connection, config: &AppConfig, token: &SessionToken) -> Result<()> {
    let store = LocalStore::new(conn);
    let existing = store.fetch_user_profile(token)?;
    let target = store.fetch_profile(token).ok().map(|p| p.goal_weight);
    let mut wizard = ProfileWizard::new(&existing, target, config);

    let mut terminal = ratatui::init();
    let result = wizard_loop(&mut terminal, &mut wizard);
    ratatui::restore();
    result?;

    if wizard.confirmed {
        store.save_user_profile(&wizard.build_profile(), token)?;
        store.save_target_weight(wizard.target, token)?;
        MetaRepo::set(conn, SETUP_DONE_KEY, "1")?;
        println!("Profile saved.");
    }
    Ok(())
}

fn wizard_loop(terminal: &mut DefaultTerminal, wizard: &mut ProfileWizard) -> Result<()> {
    let events = EventHandler::new(100);
    loop {
        terminal.draw(|frame| draw(frame, wizard))?;

        match events.next()? {
            Event::Key(key) => {
                wizard.handle_key(key);
                if wizard.should_quit || wizard.confirmed {
                    return Ok(());
                }
            }
            Event::Mouse(_) | Event::Resize | Event::Tick => {}
        }
    }
}
