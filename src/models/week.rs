use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: usize = 7;

/// Language used for weekday and category labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayLabels {
    #[default]
    En,
    Zh,
}

impl DayLabels {
    pub fn weekday(&self, day: Weekday) -> &'static str {
        match self {
            DayLabels::En => match day {
                Weekday::Mon => "Mon",
                Weekday::Tue => "Tue",
                Weekday::Wed => "Wed",
                Weekday::Thu => "Thu",
                Weekday::Fri => "Fri",
                Weekday::Sat => "Sat",
                Weekday::Sun => "Sun",
            },
            DayLabels::Zh => match day {
                Weekday::Mon => "周一",
                Weekday::Tue => "周二",
                Weekday::Wed => "周三",
                Weekday::Thu => "周四",
                Weekday::Fri => "周五",
                Weekday::Sat => "周六",
                Weekday::Sun => "周日",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayCell {
    pub weekday: Weekday,
    /// 0.0 means nothing was recorded that day
    pub value: f64,
}

impl DayCell {
    pub fn empty(weekday: Weekday) -> Self {
        Self {
            weekday,
            value: 0.0,
        }
    }

    pub fn has_record(&self) -> bool {
        self.value > 0.0
    }

    pub fn label(&self, labels: DayLabels) -> &'static str {
        labels.weekday(self.weekday)
    }
}

/// A Monday..Sunday week of day values.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekGrid {
    pub start: NaiveDate,
    pub days: [DayCell; DAYS_PER_WEEK],
}

impl WeekGrid {
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(DAYS_PER_WEEK as i64 - 1)
    }

    pub fn date_of(&self, weekday: Weekday) -> NaiveDate {
        self.start + Duration::days(weekday.num_days_from_monday() as i64)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    pub fn values(&self) -> [f64; DAYS_PER_WEEK] {
        self.days.map(|d| d.value)
    }

    pub fn recorded_days(&self) -> usize {
        self.days.iter().filter(|d| d.has_record()).count()
    }

    pub fn average(&self) -> Option<f64> {
        let recorded: Vec<f64> = self
            .days
            .iter()
            .filter(|d| d.has_record())
            .map(|d| d.value)
            .collect();
        if recorded.is_empty() {
            None
        } else {
            Some(recorded.iter().sum::<f64>() / recorded.len() as f64)
        }
    }

    /// Date range shown above the weekly chart.
    pub fn label(&self, labels: DayLabels) -> String {
        let end = self.end();
        match labels {
            DayLabels::En => format!("{} – {}", self.start.format("%b %d"), end.format("%b %d")),
            DayLabels::Zh => format!(
                "{:02}月{:02}日-{:02}月{:02}日",
                self.start.month(),
                self.start.day(),
                end.month(),
                end.day()
            ),
        }
    }
}

/// Weeks from the anchor week (index 0) back to the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekHistory {
    pub this_monday: NaiveDate,
    pub horizon_start: NaiveDate,
    pub weeks: Vec<WeekGrid>,
}

impl WeekHistory {
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn get(&self, index: usize) -> Option<&WeekGrid> {
        self.weeks.get(index)
    }

    pub fn anchor_week(&self) -> Option<&WeekGrid> {
        self.weeks.first()
    }

    pub fn oldest_week(&self) -> Option<&WeekGrid> {
        self.weeks.last()
    }
}

/// Day-over-day movement, as shown by the chart's mood row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTrend {
    NoRecord,
    FirstRecord,
    Down,
    Up,
    Flat,
}

impl DayTrend {
    pub fn symbol(&self) -> &'static str {
        match self {
            DayTrend::NoRecord => "·",
            DayTrend::FirstRecord => "•",
            DayTrend::Down => "↓",
            DayTrend::Up => "↑",
            DayTrend::Flat => "→",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_of(start: NaiveDate, values: [f64; 7]) -> WeekGrid {
        WeekGrid {
            start,
            days: std::array::from_fn(|i| DayCell {
                weekday: (start + Duration::days(i as i64)).weekday(),
                value: values[i],
            }),
        }
    }

    #[test]
    fn week_bounds_and_dates() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let week = week_of(monday, [0.0; 7]);
        assert_eq!(week.end(), NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(week.date_of(Weekday::Wed), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(week.contains(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()));
        assert!(!week.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[test]
    fn average_ignores_empty_days() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let week = week_of(monday, [80.0, 0.0, 78.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(week.recorded_days(), 2);
        assert_eq!(week.average(), Some(79.0));
        assert_eq!(week_of(monday, [0.0; 7]).average(), None);
    }

    #[test]
    fn labels_follow_locale() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let week = week_of(monday, [0.0; 7]);
        assert_eq!(week.label(DayLabels::Zh), "01月08日-01月14日");
        assert_eq!(week.label(DayLabels::En), "Jan 08 – Jan 14");
        assert_eq!(DayLabels::Zh.weekday(Weekday::Sun), "周日");
    }
}
