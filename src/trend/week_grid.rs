use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use log::debug;
use std::collections::HashMap;

use crate::models::{DAYS_PER_WEEK, DayCell, DayTrend, WeekGrid, WeekHistory, WeightRecord};

pub const DEFAULT_HORIZON_YEARS: u32 = 3;

/// Monday on or before `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// `this_monday` minus whole calendar years. Feb 29 lands on Feb 28.
fn horizon_start(this_monday: NaiveDate, horizon_years: u32) -> NaiveDate {
    this_monday
        .checked_sub_months(Months::new(horizon_years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

fn index_by_date(records: &[WeightRecord]) -> HashMap<NaiveDate, f64> {
    let mut by_date = HashMap::with_capacity(records.len());
    for record in records {
        let kg = record.weight_kg();
        if kg.is_finite() && kg > 0.0 {
            // later entries for the same day overwrite earlier ones
            by_date.insert(record.date, kg);
        }
    }
    by_date
}

fn week_starting(start: NaiveDate, by_date: &HashMap<NaiveDate, f64>) -> WeekGrid {
    let days = std::array::from_fn(|i| {
        let date = start + Duration::days(i as i64);
        DayCell {
            weekday: date.weekday(),
            value: by_date.get(&date).copied().unwrap_or(0.0),
        }
    });
    WeekGrid { start, days }
}

/// Lay `records` out as Monday..Sunday weeks, newest first, from the week
/// containing `anchor` back to `horizon_years` before that week's Monday.
///
/// The full horizon is produced even when `records` is empty. Records outside
/// the covered weeks are ignored.
pub fn build_week_history(
    records: &[WeightRecord],
    anchor: NaiveDate,
    horizon_years: u32,
) -> WeekHistory {
    let by_date = index_by_date(records);
    let this_monday = monday_of(anchor);
    let horizon_start = horizon_start(this_monday, horizon_years);

    let mut weeks = Vec::new();
    let mut week_start = this_monday;
    while week_start >= horizon_start {
        weeks.push(week_starting(week_start, &by_date));
        match week_start.checked_sub_signed(Duration::days(DAYS_PER_WEEK as i64)) {
            Some(prev) => week_start = prev,
            None => break,
        }
    }

    debug!(
        "built {} weeks from {} records (anchor {}, horizon {})",
        weeks.len(),
        by_date.len(),
        anchor,
        horizon_start
    );

    WeekHistory {
        this_monday,
        horizon_start,
        weeks,
    }
}

/// First recorded weight scanning from the oldest week forward.
pub fn earliest_non_zero(history: &WeekHistory) -> Option<f64> {
    history
        .weeks
        .iter()
        .rev()
        .flat_map(|week| week.days.iter())
        .map(|day| day.value)
        .find(|v| *v > 0.0)
}

/// Most recent recorded weight: newest week first, Sunday back to Monday.
pub fn latest_non_zero(history: &WeekHistory) -> Option<f64> {
    history
        .weeks
        .iter()
        .flat_map(|week| week.days.iter().rev())
        .map(|day| day.value)
        .find(|v| *v > 0.0)
}

pub fn value_for_weekday(week: &WeekGrid, weekday: Weekday) -> f64 {
    week.days[weekday.num_days_from_monday() as usize].value
}

/// Upper bound for the chart's bars: the largest value in the selected week
/// and its two neighbours, never below 1.
pub fn chart_ceiling(history: &WeekHistory, index: usize) -> f64 {
    let neighbours = [index.checked_sub(1), Some(index), index.checked_add(1)];
    neighbours
        .into_iter()
        .flatten()
        .filter_map(|i| history.get(i))
        .flat_map(|week| week.values())
        .fold(1.0, f64::max)
}

/// Movement of each day against the day before it. Monday compares with the
/// previous (older) week's Sunday.
pub fn day_trends(history: &WeekHistory, index: usize) -> [DayTrend; DAYS_PER_WEEK] {
    let Some(week) = history.get(index) else {
        return [DayTrend::NoRecord; DAYS_PER_WEEK];
    };
    let values = week.values();
    let before_monday = history
        .get(index + 1)
        .map(|older| older.days[DAYS_PER_WEEK - 1].value)
        .unwrap_or(0.0);

    std::array::from_fn(|i| {
        let value = values[i];
        let prev = if i > 0 { values[i - 1] } else { before_monday };
        if value <= 0.0 {
            DayTrend::NoRecord
        } else if prev <= 0.0 {
            DayTrend::FirstRecord
        } else if value < prev {
            DayTrend::Down
        } else if value > prev {
            DayTrend::Up
        } else {
            DayTrend::Flat
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expected_len(history: &WeekHistory) -> usize {
        ((history.this_monday - history.horizon_start).num_days() / 7) as usize + 1
    }

    #[test]
    fn two_records_across_consecutive_mondays() {
        let records = vec![
            WeightRecord::kg(date(2024, 1, 1), 80.0),
            WeightRecord::kg(date(2024, 1, 8), 78.0),
        ];
        let history = build_week_history(&records, date(2024, 1, 8), 3);

        assert_eq!(history.this_monday, date(2024, 1, 8));
        assert_eq!(value_for_weekday(&history.weeks[0], Weekday::Mon), 78.0);
        assert_eq!(history.weeks[1].start, date(2024, 1, 1));
        assert_eq!(value_for_weekday(&history.weeks[1], Weekday::Mon), 80.0);
        assert_eq!(earliest_non_zero(&history), Some(80.0));
        assert_eq!(latest_non_zero(&history), Some(78.0));
    }

    #[test]
    fn sunday_anchor_aligns_to_previous_monday() {
        let history = build_week_history(&[], date(2024, 1, 14), 1);
        assert_eq!(history.this_monday, date(2024, 1, 8));

        let history = build_week_history(&[], date(2024, 1, 10), 1);
        assert_eq!(history.this_monday, date(2024, 1, 8));
    }

    #[test]
    fn empty_records_still_produce_full_horizon() {
        let history = build_week_history(&[], date(2024, 1, 8), 3);
        assert_eq!(history.len(), expected_len(&history));
        assert_eq!(history.len(), 157);
        assert!(history.weeks.iter().all(|w| w.recorded_days() == 0));
        assert_eq!(earliest_non_zero(&history), None);
        assert_eq!(latest_non_zero(&history), None);
    }

    #[test]
    fn zero_horizon_yields_only_anchor_week() {
        let records = vec![WeightRecord::kg(date(2024, 1, 3), 81.0)];
        let history = build_week_history(&records, date(2024, 1, 5), 0);
        assert_eq!(history.len(), 1);
        assert_eq!(value_for_weekday(&history.weeks[0], Weekday::Wed), 81.0);
    }

    #[test]
    fn length_tracks_horizon_for_many_anchors() {
        let mut anchor = date(2023, 2, 20);
        for _ in 0..30 {
            for years in [1, 2, 3, 5] {
                let history = build_week_history(&[], anchor, years);
                assert_eq!(history.len(), expected_len(&history));
                let approx = years as i64 * 52 + 1;
                assert!((history.len() as i64 - approx).abs() <= 1);
                let oldest = history.oldest_week().unwrap();
                assert!(oldest.start >= history.horizon_start);
                assert!(oldest.start - Duration::days(7) < history.horizon_start);
            }
            anchor += Duration::days(13);
        }
    }

    #[test]
    fn every_week_is_a_monday_to_sunday_run() {
        let history = build_week_history(&[], date(2024, 2, 29), 2);
        for (i, week) in history.weeks.iter().enumerate() {
            assert_eq!(week.start.weekday(), Weekday::Mon);
            assert_eq!(week.start, history.this_monday - Duration::days(7 * i as i64));
            for (offset, cell) in week.days.iter().enumerate() {
                assert_eq!(cell.weekday, (week.start + Duration::days(offset as i64)).weekday());
            }
        }
    }

    #[test]
    fn in_range_records_land_in_exactly_one_cell() {
        let anchor = date(2024, 6, 12);
        let records: Vec<WeightRecord> = (0..400)
            .step_by(3)
            .map(|back| {
                WeightRecord::kg(anchor - Duration::days(back), 60.0 + (back % 17) as f64)
            })
            .collect();
        let history = build_week_history(&records, anchor, 1);

        let oldest = history.oldest_week().unwrap().start;
        for record in &records {
            let hits: Vec<f64> = history
                .weeks
                .iter()
                .filter(|w| w.contains(record.date))
                .map(|w| value_for_weekday(w, record.date.weekday()))
                .collect();
            if record.date >= oldest {
                assert_eq!(hits, vec![record.weight], "record on {}", record.date);
            } else {
                assert!(hits.is_empty(), "record on {}", record.date);
            }
        }
    }

    #[test]
    fn records_outside_the_grid_are_ignored() {
        let anchor = date(2024, 1, 10);
        let records = vec![
            WeightRecord::kg(date(2024, 1, 15), 90.0),
            WeightRecord::kg(date(2020, 1, 1), 95.0),
        ];
        let history = build_week_history(&records, anchor, 1);
        assert_eq!(latest_non_zero(&history), None);
        assert_eq!(earliest_non_zero(&history), None);
    }

    #[test]
    fn duplicate_dates_keep_last_entry() {
        let day = date(2024, 1, 9);
        let records = vec![WeightRecord::kg(day, 80.0), WeightRecord::kg(day, 79.4)];
        let history = build_week_history(&records, day, 0);
        assert_eq!(value_for_weekday(&history.weeks[0], Weekday::Tue), 79.4);
    }

    #[test]
    fn invalid_weights_count_as_missing() {
        let records = vec![
            WeightRecord::kg(date(2024, 1, 8), f64::NAN),
            WeightRecord::kg(date(2024, 1, 9), -3.0),
            WeightRecord::kg(date(2024, 1, 10), 0.0),
        ];
        let history = build_week_history(&records, date(2024, 1, 10), 0);
        assert_eq!(history.weeks[0].values(), [0.0; 7]);
    }

    #[test]
    fn unsorted_input_is_fine_and_output_is_stable() {
        let records = vec![
            WeightRecord::kg(date(2024, 1, 10), 77.0),
            WeightRecord::kg(date(2023, 12, 30), 81.0),
            WeightRecord::kg(date(2024, 1, 2), 79.0),
        ];
        let first = build_week_history(&records, date(2024, 1, 11), 1);
        let second = build_week_history(&records, date(2024, 1, 11), 1);
        assert_eq!(first, second);
        assert_eq!(earliest_non_zero(&first), Some(81.0));
        assert_eq!(latest_non_zero(&first), Some(77.0));
    }

    #[test]
    fn latest_prefers_later_day_in_newest_week() {
        let records = vec![
            WeightRecord::kg(date(2024, 1, 8), 80.0),
            WeightRecord::kg(date(2024, 1, 11), 79.2),
        ];
        let history = build_week_history(&records, date(2024, 1, 12), 0);
        assert_eq!(latest_non_zero(&history), Some(79.2));
        assert_eq!(earliest_non_zero(&history), Some(80.0));
    }

    #[test]
    fn chart_ceiling_looks_at_neighbours() {
        let records = vec![
            WeightRecord::kg(date(2024, 1, 8), 78.0),
            WeightRecord::kg(date(2024, 1, 1), 82.0),
            WeightRecord::kg(date(2023, 12, 25), 85.0),
        ];
        let history = build_week_history(&records, date(2024, 1, 8), 1);
        assert_eq!(chart_ceiling(&history, 0), 82.0);
        assert_eq!(chart_ceiling(&history, 1), 85.0);
        assert_eq!(chart_ceiling(&history, 10), 1.0);
    }

    #[test]
    fn trends_compare_with_previous_day() {
        let records = vec![
            WeightRecord::kg(date(2024, 1, 7), 80.0),
            WeightRecord::kg(date(2024, 1, 8), 79.5),
            WeightRecord::kg(date(2024, 1, 9), 79.9),
            WeightRecord::kg(date(2024, 1, 10), 79.9),
            WeightRecord::kg(date(2024, 1, 12), 79.0),
        ];
        let history = build_week_history(&records, date(2024, 1, 12), 1);
        let trends = day_trends(&history, 0);
        assert_eq!(
            trends,
            [
                DayTrend::Down,
                DayTrend::Up,
                DayTrend::Flat,
                DayTrend::NoRecord,
                DayTrend::FirstRecord,
                DayTrend::NoRecord,
                DayTrend::NoRecord,
            ]
        );
        assert_eq!(day_trends(&history, 999), [DayTrend::NoRecord; 7]);
    }
}
