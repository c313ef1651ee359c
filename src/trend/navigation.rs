use chrono::{Duration, NaiveDate};

pub const DEFAULT_SWIPE_THRESHOLD: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekStep {
    Older,
    Newer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(WeekStep),
    AtBoundary,
    Ignored,
}

/// Selected week in a [`crate::models::WeekHistory`]. Index 0 is the anchor week.
#[derive(Debug, Clone)]
pub struct WeekCursor {
    index: usize,
    len: usize,
    swipe_threshold: f64,
}

impl WeekCursor {
    pub fn new(len: usize, swipe_threshold: f64) -> Self {
        Self {
            index: 0,
            len,
            swipe_threshold,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Follow a rebuilt history, keeping the selection where possible.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }

    /// A horizontal swipe. Right (positive) goes back in time.
    pub fn swipe(&mut self, dx: f64) -> Navigation {
        if dx > self.swipe_threshold {
            self.older()
        } else if dx < -self.swipe_threshold {
            self.newer()
        } else {
            Navigation::Ignored
        }
    }

    pub fn older(&mut self) -> Navigation {
        if self.index + 1 >= self.len {
            return Navigation::AtBoundary;
        }
        self.index += 1;
        Navigation::Moved(WeekStep::Older)
    }

    pub fn newer(&mut self) -> Navigation {
        if self.index == 0 {
            return Navigation::AtBoundary;
        }
        self.index -= 1;
        Navigation::Moved(WeekStep::Newer)
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn week_start(&self, this_monday: NaiveDate) -> NaiveDate {
        this_monday
            .checked_sub_signed(Duration::days(7 * self.index as i64))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_swipes_are_ignored() {
        let mut cursor = WeekCursor::new(5, DEFAULT_SWIPE_THRESHOLD);
        assert_eq!(cursor.swipe(24.0), Navigation::Ignored);
        assert_eq!(cursor.swipe(-10.0), Navigation::Ignored);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn swipe_right_goes_older() {
        let mut cursor = WeekCursor::new(3, DEFAULT_SWIPE_THRESHOLD);
        assert_eq!(cursor.swipe(30.0), Navigation::Moved(WeekStep::Older));
        assert_eq!(cursor.swipe(30.0), Navigation::Moved(WeekStep::Older));
        assert_eq!(cursor.swipe(30.0), Navigation::AtBoundary);
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.swipe(-30.0), Navigation::Moved(WeekStep::Newer));
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn newest_week_is_a_boundary() {
        let mut cursor = WeekCursor::new(3, DEFAULT_SWIPE_THRESHOLD);
        assert_eq!(cursor.newer(), Navigation::AtBoundary);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn empty_history_never_moves() {
        let mut cursor = WeekCursor::new(0, DEFAULT_SWIPE_THRESHOLD);
        assert_eq!(cursor.older(), Navigation::AtBoundary);
        assert_eq!(cursor.newer(), Navigation::AtBoundary);
    }

    #[test]
    fn resize_clamps_selection() {
        let mut cursor = WeekCursor::new(10, DEFAULT_SWIPE_THRESHOLD);
        for _ in 0..8 {
            cursor.older();
        }
        cursor.resize(4);
        assert_eq!(cursor.index(), 3);
        cursor.reset();
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn week_start_steps_back_by_weeks() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let mut cursor = WeekCursor::new(4, DEFAULT_SWIPE_THRESHOLD);
        assert_eq!(cursor.week_start(monday), monday);
        cursor.older();
        cursor.older();
        assert_eq!(
            cursor.week_start(monday),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );
    }
}
