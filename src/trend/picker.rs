use crate::models::BmiCategory;
use crate::trend::progress::{classify_bmi, compute_bmi};

/// Saved targets must lie strictly between these.
pub const SCALE_MIN: f64 = 10.0;
pub const SCALE_MAX: f64 = 300.0;
pub const SCALE_STEP: f64 = 0.5;
/// Ruler shows this many kg either side of the selected value.
pub const SCALE_HALF_RANGE: f64 = 10.0;
pub const MAJOR_TICK_EVERY: f64 = 5.0;

pub const DEFAULT_TARGET: f64 = 75.0;
pub const DEFAULT_FLOOR: f64 = 30.0;
pub const DEFAULT_CEILING: f64 = 200.0;
pub const DEFAULT_STEP_PIXELS: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySignal {
    TooThin,
    TooHeavy,
}

impl BoundarySignal {
    pub fn message(&self) -> &'static str {
        match self {
            BoundarySignal::TooThin => "That's too light, pick again",
            BoundarySignal::TooHeavy => "That's too heavy, pick again",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    pub value: f64,
    /// Set only on the drag that first hits a boundary.
    pub signal: Option<BoundarySignal>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTick {
    pub weight: f64,
    pub category: BmiCategory,
    pub major: bool,
}

/// Drag-driven target weight selector with hard floor and ceiling.
#[derive(Debug, Clone)]
pub struct TargetPicker {
    value: f64,
    floor: f64,
    ceiling: f64,
    step_size: f64,
    step_pixels: f64,
    pinned: Option<BoundarySignal>,
}

impl Default for TargetPicker {
    fn default() -> Self {
        Self::new(DEFAULT_FLOOR, DEFAULT_CEILING, SCALE_STEP, DEFAULT_STEP_PIXELS)
    }
}

impl TargetPicker {
    pub fn new(floor: f64, ceiling: f64, step_size: f64, step_pixels: f64) -> Self {
        let value = if DEFAULT_TARGET < floor {
            floor
        } else if DEFAULT_TARGET > ceiling {
            ceiling
        } else {
            DEFAULT_TARGET
        };
        Self {
            value,
            floor,
            ceiling,
            step_size,
            step_pixels,
            pinned: None,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn pinned(&self) -> Option<BoundarySignal> {
        self.pinned
    }

    /// Tip to show while the selector rests on a boundary.
    pub fn limit_tip(&self) -> Option<&'static str> {
        self.pinned.map(|b| b.message())
    }

    /// Seed from a stored target. Values outside (10, 300) are rejected and
    /// leave the picker unchanged.
    pub fn set(&mut self, saved: f64) -> bool {
        if saved.is_finite() && saved > SCALE_MIN && saved < SCALE_MAX {
            self.value = saved;
            self.pinned = None;
            true
        } else {
            false
        }
    }

    /// Apply a horizontal drag. Positive pixels move toward heavier values.
    pub fn drag(&mut self, pixels: f64) -> DragOutcome {
        let steps = if self.step_pixels > 0.0 && pixels.is_finite() {
            (pixels / self.step_pixels).round()
        } else {
            0.0
        };
        let candidate = self.value + steps * self.step_size;

        let (value, contact) = if candidate < self.floor {
            (self.floor, Some(BoundarySignal::TooThin))
        } else if candidate > self.ceiling {
            (self.ceiling, Some(BoundarySignal::TooHeavy))
        } else {
            (candidate, None)
        };

        let signal = match contact {
            Some(boundary) if self.pinned != Some(boundary) => Some(boundary),
            _ => None,
        };
        if let Some(boundary) = signal {
            log::debug!("target picker hit {:?} at {}", boundary, value);
        }

        self.pinned = contact;
        self.value = value;
        DragOutcome { value, signal }
    }

    pub fn bmi(&self, height_cm: f64) -> f64 {
        compute_bmi(self.value, height_cm)
    }

    pub fn category(&self, height_cm: f64) -> BmiCategory {
        classify_bmi(self.bmi(height_cm))
    }
}

/// Ticks for a ruler centred on `center`, shifted inward near the scale ends
/// so the window always spans the full width.
pub fn scale_ticks(center: f64, height_cm: f64) -> Vec<ScaleTick> {
    let snapped = (center / SCALE_STEP).round() * SCALE_STEP;
    let (start, end) = if snapped - SCALE_HALF_RANGE <= SCALE_MIN {
        (SCALE_MIN, SCALE_MIN + 2.0 * SCALE_HALF_RANGE)
    } else if snapped + SCALE_HALF_RANGE >= SCALE_MAX {
        (SCALE_MAX - 2.0 * SCALE_HALF_RANGE, SCALE_MAX)
    } else {
        (snapped - SCALE_HALF_RANGE, snapped + SCALE_HALF_RANGE)
    };

    let count = ((end - start) / SCALE_STEP).round() as usize;
    (0..=count)
        .map(|i| {
            let weight = start + i as f64 * SCALE_STEP;
            ScaleTick {
                weight,
                category: classify_bmi(compute_bmi(weight, height_cm)),
                major: (weight % MAJOR_TICK_EVERY).abs() < 1e-9,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_default_target() {
        assert_eq!(TargetPicker::default().value(), 75.0);
    }

    #[test]
    fn drag_moves_in_whole_steps() {
        let mut picker = TargetPicker::default();
        let out = picker.drag(32.0);
        assert_eq!(out.value, 76.0);
        assert_eq!(out.signal, None);
        // 7px rounds to zero steps
        assert_eq!(picker.drag(7.0).value, 76.0);
        assert_eq!(picker.drag(-25.0).value, 75.0);
    }

    #[test]
    fn drag_below_floor_clamps_and_signals_once() {
        let mut picker = TargetPicker::default();
        let out = picker.drag(-2000.0);
        assert_eq!(out.value, 30.0);
        assert_eq!(out.signal, Some(BoundarySignal::TooThin));
        assert_eq!(picker.limit_tip(), Some(BoundarySignal::TooThin.message()));

        let again = picker.drag(-16.0);
        assert_eq!(again.value, 30.0);
        assert_eq!(again.signal, None);

        let away = picker.drag(16.0);
        assert_eq!(away.value, 30.5);
        assert_eq!(picker.pinned(), None);

        let back = picker.drag(-32.0);
        assert_eq!(back.signal, Some(BoundarySignal::TooThin));
    }

    #[test]
    fn drag_above_ceiling_clamps() {
        let mut picker = TargetPicker::default();
        let out = picker.drag(100_000.0);
        assert_eq!(out.value, 200.0);
        assert_eq!(out.signal, Some(BoundarySignal::TooHeavy));
    }

    #[test]
    fn value_never_leaves_bounds() {
        let mut picker = TargetPicker::default();
        for px in [-500.0, 800.0, -3000.0, 16.0, 4000.0, -48.0, f64::NAN] {
            let out = picker.drag(px);
            assert!(out.value >= 30.0 && out.value <= 200.0);
        }
    }

    #[test]
    fn set_rejects_out_of_range_targets() {
        let mut picker = TargetPicker::default();
        assert!(!picker.set(10.0));
        assert!(!picker.set(300.0));
        assert!(!picker.set(f64::NAN));
        assert_eq!(picker.value(), 75.0);
        assert!(picker.set(62.5));
        assert_eq!(picker.value(), 62.5);
    }

    #[test]
    fn ruler_is_centred_and_shifted_at_edges() {
        let ticks = scale_ticks(75.0, 170.0);
        assert_eq!(ticks.len(), 41);
        assert_eq!(ticks.first().unwrap().weight, 65.0);
        assert_eq!(ticks.last().unwrap().weight, 85.0);
        assert!(ticks[0].major);
        assert!(!ticks[1].major);

        let low = scale_ticks(12.0, 170.0);
        assert_eq!(low.first().unwrap().weight, 10.0);
        assert_eq!(low.last().unwrap().weight, 30.0);

        let high = scale_ticks(299.0, 170.0);
        assert_eq!(high.last().unwrap().weight, 300.0);
    }

    #[test]
    fn ruler_ticks_carry_bmi_category() {
        let ticks = scale_ticks(75.0, 170.0);
        let at = |w: f64| ticks.iter().find(|t| t.weight == w).unwrap().category;
        assert_eq!(at(70.0), BmiCategory::Normal);
        assert_eq!(at(80.0), BmiCategory::Over);
    }
}
