use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use log::{debug, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::store::validate_record;
use crate::db::{LocalStore, SessionToken, WeightStore};
use crate::models::WeightRecord;
use crate::trend::{DataOrigin, Navigation, TargetPicker, TrendSnapshot, WeekCursor};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{header, progress, statusbar, target, weekly};
use crate::utils::format::format_short;

/// Approximate pixel width of one terminal cell, used to turn mouse column
/// deltas into the pixel distances the cursor and picker expect.
const CELL_PIXELS: f64 = 8.0;
const COARSE_NUDGE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Target,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    RecordInput,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub token: SessionToken,
    pub today: NaiveDate,
    pub nickname: Option<String>,
    pub snapshot: TrendSnapshot,
    pub cursor: WeekCursor,
    pub picker: TargetPicker,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
    pub status: Option<String>,
    pub should_quit: bool,
    /// Column of the last mouse press and drag position, while a button is held.
    drag_origin: Option<(u16, u16)>,
}

impl App {
    pub fn new(conn: &Connection, config: AppConfig, token: SessionToken) -> Result<Self> {
        let today = Local::now().date_naive();
        let snapshot = TrendSnapshot::load_local(conn, &token, today, &config)?;
        let cursor = WeekCursor::new(snapshot.history.len(), config.chart.swipe_threshold);
        let picker = TargetPicker::new(
            config.picker.floor,
            config.picker.ceiling,
            config.picker.step_size,
            config.picker.step_pixels,
        );

        let mut app = App {
            view: View::Dashboard,
            config,
            token,
            today,
            nickname: None,
            snapshot,
            cursor,
            picker,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            status: None,
            should_quit: false,
            drag_origin: None,
        };
        app.refresh_nickname(conn);
        Ok(app)
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        self.snapshot = TrendSnapshot::load_local(conn, &self.token, self.today, &self.config)?;
        self.cursor.resize(self.snapshot.history.len());
        self.refresh_nickname(conn);
        Ok(())
    }

    fn refresh_nickname(&mut self, conn: &Connection) {
        self.nickname = LocalStore::new(conn)
            .fetch_user_profile(&self.token)
            .ok()
            .and_then(|p| p.nickname);
    }

    /// Rebuild when the calendar day rolls over.
    pub fn tick(&mut self, conn: &Connection) {
        let today = Local::now().date_naive();
        if today != self.today {
            debug!("date changed to {}, rebuilding history", today);
            self.today = today;
            self.cursor.reset();
            self.reload(conn);
        }
    }

    fn reload(&mut self, conn: &Connection) {
        if let Err(e) = self.load(conn) {
            warn!("reload failed: {:#}", e);
            self.status = Some(format!("Reload failed: {}", e));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.status = None;
        match self.input_mode {
            InputMode::RecordInput => self.handle_record_input(key, conn),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key),
                View::Target => self.handle_target_key(key, conn),
                View::Help => self.handle_help_key(key),
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.step(|cursor| cursor.older());
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.step(|cursor| cursor.newer());
            }
            KeyCode::Home | KeyCode::Char('0') => {
                self.cursor.reset();
            }
            KeyCode::Char('r') => {
                self.input_mode = InputMode::RecordInput;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Char('t') => {
                self.open_target();
            }
            _ => {}
        }
    }

    fn step(&mut self, mv: impl FnOnce(&mut WeekCursor) -> Navigation) {
        if mv(&mut self.cursor) == Navigation::AtBoundary {
            self.status = Some(if self.cursor.index() == 0 {
                "Already at the current week".to_string()
            } else {
                "No older weeks".to_string()
            });
        }
    }

    fn open_target(&mut self) {
        if self.snapshot.profile_origin != DataOrigin::Default {
            self.picker.set(self.snapshot.profile.goal_weight);
        }
        self.view = View::Target;
    }

    fn handle_target_key(&mut self, key: KeyEvent, conn: &Connection) {
        let nudge = self.config.picker.nudge_pixels;
        match key.code {
            KeyCode::Esc => {
                self.view = View::Dashboard;
            }
            KeyCode::Left | KeyCode::Char('h') => self.drag_picker(-nudge),
            KeyCode::Right | KeyCode::Char('l') => self.drag_picker(nudge),
            KeyCode::PageDown => self.drag_picker(-nudge * COARSE_NUDGE),
            KeyCode::PageUp => self.drag_picker(nudge * COARSE_NUDGE),
            KeyCode::Enter => {
                let value = self.picker.value();
                match LocalStore::new(conn).save_target_weight(value, &self.token) {
                    Ok(()) => {
                        self.reload(conn);
                        self.view = View::Dashboard;
                        self.status = Some(format!("Target saved: {} kg", format_short(value)));
                    }
                    Err(e) => {
                        warn!("saving target failed: {:#}", e);
                        self.status = Some(format!("Could not save target: {}", e));
                    }
                }
            }
            _ => {}
        }
    }

    fn drag_picker(&mut self, pixels: f64) {
        if let Some(signal) = self.picker.drag(pixels).signal {
            self.status = Some(signal.message().to_string());
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            self.view = View::Dashboard;
        }
    }

    fn handle_record_input(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                let trimmed = self.input_buffer.trim().to_string();
                if trimmed.is_empty() {
                    self.input_error = Some("Enter a weight first (e.g. 68.4)".to_string());
                    return;
                }
                let weight = match trimmed.parse::<f64>() {
                    Ok(w) => w,
                    Err(_) => {
                        self.input_error = Some(format!("'{}' is not a valid number", trimmed));
                        return;
                    }
                };
                let record = WeightRecord::kg(self.today, weight);
                if let Err(e) = validate_record(&record, self.today) {
                    self.input_error = Some(e.to_string());
                    return;
                }
                match LocalStore::new(conn).save_weight_record(&record, &self.token) {
                    Ok(()) => {
                        self.reload(conn);
                        self.cursor.reset();
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.input_error = None;
                        self.status = Some(format!("Recorded {} kg for today", format_short(weight)));
                    }
                    Err(e) => {
                        self.input_error = Some(e.to_string());
                    }
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    /// Dashboard: press, move and release is a swipe across weeks.
    /// Target view: dragging pulls the ruler, so moving left shows heavier weights.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.input_mode != InputMode::Normal {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_origin = Some((mouse.column, mouse.column));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((origin, last)) = self.drag_origin {
                    if self.view == View::Target {
                        let dx = f64::from(mouse.column) - f64::from(last);
                        self.drag_picker(-dx * CELL_PIXELS);
                    }
                    self.drag_origin = Some((origin, mouse.column));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((origin, _)) = self.drag_origin.take() {
                    if self.view == View::Dashboard {
                        let dx = (f64::from(mouse.column) - f64::from(origin)) * CELL_PIXELS;
                        if self.cursor.swipe(dx) == Navigation::AtBoundary {
                            self.status = Some("No more weeks that way".to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Target => self.draw_target(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode == InputMode::RecordInput {
            self.draw_record_input(frame);
        }
    }

    fn layout(area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area)
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);
        let outer = Self::layout(area);

        header::render(
            frame,
            outer[0],
            self.nickname.as_deref(),
            self.today,
            self.snapshot.is_stale(),
        );
        statusbar::render(
            frame,
            outer[2],
            &[
                ("[←/→]", " week  "),
                ("[r]", " record  "),
                ("[t]", " target  "),
                ("[?]", " help  "),
                ("[Esc]", " quit"),
            ],
            self.status.as_deref(),
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(outer[1]);

        let labels = self.config.history.day_labels;
        weekly::render(
            frame,
            columns[0],
            &self.snapshot.history,
            self.cursor.index(),
            labels,
            true,
        );
        progress::render(frame, columns[1], &self.snapshot, labels);
    }

    fn draw_target(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);
        let outer = Self::layout(area);

        header::render(
            frame,
            outer[0],
            self.nickname.as_deref(),
            self.today,
            self.snapshot.is_stale(),
        );
        statusbar::render(
            frame,
            outer[2],
            &[("[←/→]", " adjust  "), ("[Enter]", " save  "), ("[Esc]", " back")],
            self.status.as_deref(),
        );
        target::render(
            frame,
            outer[1],
            &self.picker,
            self.snapshot.profile.height_cm,
            self.config.history.day_labels,
        );
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(12).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let entries = [
            ("  [← →] / [h l]  ", "Older / newer week"),
            ("  drag           ", "Swipe right for older weeks"),
            ("  [Home] / [0]   ", "Back to this week"),
            ("  [r]            ", "Record today's weight"),
            ("  [t]            ", "Pick a target weight"),
            ("  [?]            ", "Toggle help"),
            ("  [Esc] / [q]    ", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        help_text.extend(entries.iter().map(|(key, what)| {
            Line::from(vec![
                Span::styled(*key, theme::accent()),
                Span::styled(*what, theme::dim()),
            ])
        }));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_record_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 7 } else { 5 };

        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(3),
            width: area.width / 2,
            height: height.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Today's weight (kg): ", theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::accent().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::accent()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Type a number, then [Enter]  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::accent()
        };

        let block = Block::default()
            .title(Span::styled(" Record Weight ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: &Connection, config: AppConfig, token: SessionToken) -> Result<()> {
    let mut app = App::new(conn, config, token)?;

    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let events = EventHandler::new(500);

    let result = event_loop(&mut app, &mut terminal, &events, conn);

    if let Err(e) = crossterm::execute!(std::io::stdout(), DisableMouseCapture) {
        warn!("could not disable mouse capture: {}", e);
    }
    ratatui::restore();
    result
}

fn event_loop(
    app: &mut App,
    terminal: &mut ratatui::DefaultTerminal,
    events: &EventHandler,
    conn: &Connection,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => app.handle_key(key, conn),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Resize => {}
            Event::Tick => app.tick(conn),
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
