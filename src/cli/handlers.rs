use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local};
use log::{debug, info};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::cli::args::ProfileCommands;
use crate::config::AppConfig;
use crate::db::repository::{MetaRepo, UserRepo, WeightRepo, SESSION_KEY, SETUP_DONE_KEY};
use crate::db::store::validate_record;
use crate::db::{LocalStore, SessionToken, WeightStore};
use crate::models::{DayTrend, Gender, WeightRecord, WeightUnit};
use crate::trend::picker::{BoundarySignal, SCALE_MAX, SCALE_MIN};
use crate::trend::progress::{classify_bmi, compute_bmi, ideal_weight_range};
use crate::trend::week_grid::{chart_ceiling, day_trends};
use crate::trend::{DataOrigin, TrendSnapshot};
use crate::utils::format::{format_date, format_short, format_weight, pad_display, parse_date, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const TEAL: &str = "\x1b[38;2;72;176;160m";

const CHART_WIDTH: usize = 30;

// ─── Session ─────────────────────────────────────────────────────────────────

pub fn require_session(conn: &Connection) -> Result<SessionToken> {
    MetaRepo::session(conn)?
        .ok_or_else(|| anyhow!("Not logged in. Run `weighin login <username>` first."))
}

pub fn handle_register(conn: &Connection, username: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt("  Choose a password: ")?,
    };
    if password.is_empty() {
        bail!("Password cannot be empty");
    }
    UserRepo::register(conn, username, &password)?;
    println_colored!(GREEN, "  ✓ Account '{}' created", username.trim());

    let token = UserRepo::login(conn, username, &password)?;
    MetaRepo::set(conn, SESSION_KEY, token.as_str())?;
    MetaRepo::delete(conn, SETUP_DONE_KEY)?;
    println_colored!(DIM, "  Logged in. Run `weighin setup` to fill in your profile.");
    Ok(())
}

pub fn handle_login(conn: &Connection, username: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt("  Password: ")?,
    };
    let token = UserRepo::login(conn, username, &password)?;
    MetaRepo::set(conn, SESSION_KEY, token.as_str())?;
    println_colored!(GREEN, "  ✓ Logged in as {}", username.trim());
    Ok(())
}

pub fn handle_logout(conn: &Connection) -> Result<()> {
    match MetaRepo::session(conn)? {
        Some(token) => {
            UserRepo::logout(conn, &token)?;
            MetaRepo::delete(conn, SESSION_KEY)?;
            println_colored!(GREEN, "  ✓ Logged out");
        }
        None => println_colored!(DIM, "  No active session"),
    }
    Ok(())
}

// ─── Setup wizard ────────────────────────────────────────────────────────────

pub fn handle_setup(
    conn: &Connection,
    config: &AppConfig,
    token: &SessionToken,
    reset: bool,
) -> Result<()> {
    if !reset {
        if let Some(done) = MetaRepo::get(conn, SETUP_DONE_KEY)? {
            if done == "1" {
                println!("Your profile is already set up. Use --reset to go through it again.");
                return Ok(());
            }
        }
    }
    crate::cli::setup_tui::run_setup_tui(conn, config, token)
}

// ─── Record ──────────────────────────────────────────────────────────────────

pub fn handle_record(
    conn: &Connection,
    token: &SessionToken,
    weight: f64,
    date: Option<&str>,
    unit: &str,
) -> Result<()> {
    let today = Local::now().date_naive();
    let date = match date {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let unit = WeightUnit::from_str(unit)?;
    let record = WeightRecord::new(date, weight, unit);
    validate_record(&record, today)?;

    let previous = match UserRepo::find_by_token(conn, token)? {
        Some(user_id) => WeightRepo::get_by_date(conn, user_id, date)?,
        None => None,
    };
    LocalStore::new(conn).save_weight_record(&record, token)?;
    println_colored!(
        GREEN,
        "  ✓ {} {} recorded for {}",
        format_weight(record.weight),
        record.unit,
        format_date(record.date)
    );
    if unit == WeightUnit::Lb {
        println_colored!(DIM, "    ({} kg)", format_weight(record.weight_kg()));
    }
    if let Some(old) = previous {
        println_colored!(DIM, "    replaces {} {}", format_weight(old.weight), old.unit);
    }
    Ok(())
}

// ─── Target ──────────────────────────────────────────────────────────────────

pub fn handle_target(
    conn: &Connection,
    config: &AppConfig,
    token: &SessionToken,
    weight: Option<f64>,
) -> Result<()> {
    let store = LocalStore::new(conn);
    let height = store
        .fetch_user_profile(token)?
        .height_cm
        .unwrap_or(config.profile.default_height_cm);

    let Some(target) = weight else {
        let snapshot = TrendSnapshot::load_local(conn, token, Local::now().date_naive(), config)?;
        println!();
        if snapshot.profile_origin == DataOrigin::Store {
            println_colored!(BOLD, "  Target weight: {} kg", format_short(snapshot.profile.goal_weight));
        } else {
            println_colored!(AMBER, "  No target set yet (using {} kg)", format_short(snapshot.profile.goal_weight));
        }
        print_bmi_line(snapshot.profile.goal_weight, height, "at target");
        print_ideal_range(height);
        println!();
        return Ok(());
    };

    if !(target > SCALE_MIN && target < SCALE_MAX) {
        bail!("Target must be between {} and {} kg", SCALE_MIN, SCALE_MAX);
    }
    if target < config.picker.floor {
        bail!("{} ({} kg minimum)", BoundarySignal::TooThin.message(), config.picker.floor);
    }
    if target > config.picker.ceiling {
        bail!("{} ({} kg maximum)", BoundarySignal::TooHeavy.message(), config.picker.ceiling);
    }

    store.save_target_weight(target, token)?;
    println_colored!(GREEN, "  ✓ Target weight set to {} kg", format_short(target));
    print_bmi_line(target, height, "at target");
    Ok(())
}

// ─── Profile ─────────────────────────────────────────────────────────────────

pub fn handle_profile(conn: &Connection, token: &SessionToken, action: &ProfileCommands) -> Result<()> {
    let store = LocalStore::new(conn);
    let mut profile = store.fetch_user_profile(token)?;

    match action {
        ProfileCommands::Show => {
            let dash = || "—".to_string();
            println!();
            println_colored!(TEAL, "  Profile");
            println!();
            println!("  Nickname:    {}", profile.nickname.clone().unwrap_or_else(dash));
            println!(
                "  Gender:      {}",
                profile.gender.map(|g| g.display_name().to_string()).unwrap_or_else(dash)
            );
            println!(
                "  Birth year:  {}",
                profile.birth_year.map(|y| y.to_string()).unwrap_or_else(dash)
            );
            println!(
                "  Height:      {}",
                profile.height_cm.map(|h| format!("{} cm", format_short(h))).unwrap_or_else(dash)
            );
            println!();
        }
        ProfileCommands::Set {
            nickname,
            gender,
            birth_year,
            height,
        } => {
            if let Some(n) = nickname {
                let n = n.trim();
                profile.nickname = if n.is_empty() { None } else { Some(n.to_string()) };
            }
            if let Some(g) = gender {
                profile.gender = Some(Gender::from_str(g)?);
            }
            if let Some(y) = birth_year {
                let this_year = Local::now().date_naive().year();
                if *y < 1900 || *y > this_year {
                    bail!("Birth year must be between 1900 and {}", this_year);
                }
                profile.birth_year = Some(*y);
            }
            if let Some(h) = height {
                if !(*h > 0.0 && *h < 300.0) {
                    bail!("Height must be between 0 and 300 cm");
                }
                profile.height_cm = Some(*h);
            }
            store.save_user_profile(&profile, token)?;
            println_colored!(GREEN, "  ✓ Profile updated");
        }
    }
    Ok(())
}

// ─── Week ────────────────────────────────────────────────────────────────────

pub fn handle_week(
    conn: &Connection,
    config: &AppConfig,
    token: &SessionToken,
    back: usize,
) -> Result<()> {
    let today = Local::now().date_naive();
    let snapshot = TrendSnapshot::load_local(conn, token, today, config)?;
    let history = &snapshot.history;
    let index = back.min(history.len().saturating_sub(1));
    if back != index {
        debug!("requested week {} clamped to {}", back, index);
    }
    let week = history
        .get(index)
        .context("Week history is empty")?;

    let labels = config.history.day_labels;
    let ceiling = chart_ceiling(history, index);
    let trends = day_trends(history, index);

    println!();
    let when = if week.contains(today) { "  this week" } else { "" };
    println_colored!(
        TEAL,
        "  {}   ({} of {}){}",
        week.label(labels),
        index + 1,
        history.len(),
        when
    );
    println!();
    for (cell, trend) in week.days.iter().zip(trends.iter()) {
        let day = week.date_of(cell.weekday);
        let marker = if day == today { "›" } else { " " };
        let label = format!(
            "{}{} {}",
            marker,
            pad_display(cell.label(labels), 4),
            day.format("%m-%d")
        );
        if cell.has_record() {
            let bar = progress_bar(cell.value / ceiling, CHART_WIDTH);
            let color = match trend {
                DayTrend::Down => GREEN,
                DayTrend::Up => RED,
                _ => BOLD,
            };
            println_colored!(color, " {} {}  {}  {}", label, bar, format_weight(cell.value), trend.symbol());
        } else {
            println_colored!(DIM, " {} {}", label, trend.symbol());
        }
    }
    println!();
    match week.average() {
        Some(avg) => println!("  Average: {} kg over {} days", format_weight(avg), week.recorded_days()),
        None => println_colored!(DIM, "  No records this week"),
    }
    print_stale_notice(&snapshot);
    println!();
    Ok(())
}

// ─── Progress ────────────────────────────────────────────────────────────────

pub fn handle_progress(conn: &Connection, config: &AppConfig, token: &SessionToken) -> Result<()> {
    let snapshot = TrendSnapshot::load_local(conn, token, Local::now().date_naive(), config)?;
    let progress = &snapshot.progress;
    let labels = config.history.day_labels;

    println!();
    println_colored!(TEAL, "  Progress");
    println!();
    println_colored!(BOLD, "  Current:    {} kg", format_weight(snapshot.current_weight));
    println!("  Start:      {} kg", format_weight(snapshot.start_weight));
    println!("  Target:     {} kg", format_weight(snapshot.profile.goal_weight));
    println!();
    println!("  {}  {}%", progress_bar(progress.fraction_complete, CHART_WIDTH), progress.percent);
    println!("  Remaining:  {} kg", format_weight(progress.remaining_delta));
    println!();
    println!(
        "  BMI:        {:.1} ({})",
        progress.bmi,
        progress.bmi_category.label(labels)
    );
    print_ideal_range(snapshot.profile.height_cm);
    if snapshot.today_weight.is_none() {
        println!();
        println_colored!(DIM, "  Nothing recorded today yet. `weighin record <kg>` adds today's weight.");
    }
    print_stale_notice(&snapshot);
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection, config: &AppConfig, token: &SessionToken) -> Result<()> {
    let today = Local::now().date_naive();
    let snapshot = TrendSnapshot::load_local(conn, token, today, config)?;
    let user_id = UserRepo::find_by_token(conn, token)?;
    let username = user_id
        .map(|id| UserRepo::username(conn, id))
        .transpose()?
        .unwrap_or_else(|| "unknown".to_string());
    let stored = user_id
        .map(|id| WeightRepo::count(conn, id))
        .transpose()?
        .unwrap_or(0);
    let labels = config.history.day_labels;

    println!("# weighin — Weekly Summary");
    println!("# {} ({})", format_date(today), username);
    println!();
    println!("## Last 4 weeks");
    for week in snapshot.history.weeks.iter().take(4) {
        let average = week
            .average()
            .map(|a| format!("{} kg", format_weight(a)))
            .unwrap_or_else(|| "—".to_string());
        println!(
            "  {}  {}/7 days  avg {}",
            week.label(labels),
            week.recorded_days(),
            average
        );
    }
    if let Some(week) = snapshot.history.anchor_week() {
        println!();
        println!("## This week");
        for cell in &week.days {
            let value = if cell.has_record() {
                format_weight(cell.value)
            } else {
                "—".to_string()
            };
            println!("  {} {}", pad_display(cell.label(labels), 5), value);
        }
    }
    println!();
    println!("## Summary");
    if let Some(oldest) = snapshot.history.oldest_week() {
        println!("  Covers:    {} to {}", format_date(oldest.start), format_date(today));
    }
    println!("  Records:   {}", stored);
    println!("  Start:     {} kg", format_weight(snapshot.start_weight));
    println!("  Current:   {} kg", format_weight(snapshot.current_weight));
    println!("  Target:    {} kg", format_weight(snapshot.profile.goal_weight));
    println!("  Progress:  {}%", snapshot.progress.percent);
    println!("  BMI:       {:.1} ({})", snapshot.progress.bmi, snapshot.progress.bmi_category);
    info!("exported summary of {} records", snapshot.record_count);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn print_bmi_line(weight: f64, height_cm: f64, what: &str) {
    let bmi = compute_bmi(weight, height_cm);
    println!("  BMI {}:  {:.1} ({})", what, bmi, classify_bmi(bmi));
}

fn print_ideal_range(height_cm: f64) {
    let (low, high) = ideal_weight_range(height_cm);
    println!(
        "  Ideal range for {} cm:  {} – {} kg",
        format_short(height_cm),
        format_short(low),
        format_short(high)
    );
}

fn print_stale_notice(snapshot: &TrendSnapshot) {
    if snapshot.records_origin != DataOrigin::Store {
        println_colored!(AMBER, "  ! Records could not be loaded, showing an empty history");
    }
    match snapshot.profile_origin {
        DataOrigin::Store => {}
        DataOrigin::Cache => println_colored!(AMBER, "  ! Using the last saved profile"),
        DataOrigin::Default => println_colored!(
            AMBER,
            "  ! Height or target missing, using defaults. Try `weighin setup`."
        ),
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}
