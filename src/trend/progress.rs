use crate::models::{BmiCategory, ProgressResult, WeightProgress};

/// Floor for the start/goal gap so a zero gap never divides by zero.
pub const PROGRESS_EPSILON: f64 = 0.0001;

pub const BMI_NORMAL_MIN: f64 = 18.5;
pub const BMI_NORMAL_MAX: f64 = 24.9;
pub const BMI_OVER_MAX: f64 = 28.0;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Distance `current` has moved from `start`, as a share of the start/goal
/// gap, capped at 1. Direction is not checked: moving away from the goal
/// also accrues. `remaining_delta` is always non-negative.
pub fn compute_weight_progress(start: f64, current: f64, goal: f64) -> WeightProgress {
    let total = (start - goal).abs().max(PROGRESS_EPSILON);
    let covered = (start - current).abs();
    let ratio = covered / total;
    // f64::min drops NaN, so the guard runs before the cap
    let fraction_complete = if ratio.is_nan() { 0.0 } else { ratio.min(1.0) };

    WeightProgress {
        fraction_complete,
        remaining_delta: (current - goal).abs(),
        percent: (fraction_complete * 100.0).round() as u8,
    }
}

/// kg / m². `height_cm` must be positive; callers validate it. A height of
/// zero or less returns 0, which is not a real BMI.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm <= 0.0 {
        return 0.0;
    }
    let meters = height_cm / 100.0;
    weight_kg / (meters * meters)
}

pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < BMI_NORMAL_MIN {
        BmiCategory::Under
    } else if bmi <= BMI_NORMAL_MAX {
        BmiCategory::Normal
    } else if bmi <= BMI_OVER_MAX {
        BmiCategory::Over
    } else {
        BmiCategory::Obese
    }
}

/// Weights (kg) spanning the normal BMI band for `height_cm`, rounded to 0.1.
pub fn ideal_weight_range(height_cm: f64) -> (f64, f64) {
    let meters = height_cm / 100.0;
    let squared = meters * meters;
    (
        round_tenth(BMI_NORMAL_MIN * squared),
        round_tenth(BMI_NORMAL_MAX * squared),
    )
}

impl ProgressResult {
    /// Progress plus the BMI of the current weight.
    pub fn derive(start: f64, current: f64, goal: f64, height_cm: f64) -> Self {
        let progress = compute_weight_progress(start, current, goal);
        let bmi = compute_bmi(current, height_cm);
        Self {
            fraction_complete: progress.fraction_complete,
            remaining_delta: progress.remaining_delta,
            percent: progress.percent,
            bmi,
            bmi_category: classify_bmi(bmi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn no_movement_is_zero_progress() {
        let p = compute_weight_progress(80.0, 80.0, 70.0);
        assert_eq!(p.fraction_complete, 0.0);
        assert_eq!(p.percent, 0);
        assert!(close(p.remaining_delta, 10.0));
    }

    #[test]
    fn reaching_goal_is_complete() {
        let p = compute_weight_progress(80.0, 70.0, 70.0);
        assert_eq!(p.fraction_complete, 1.0);
        assert_eq!(p.percent, 100);
        assert!(close(p.remaining_delta, 0.0));
    }

    #[test]
    fn halfway_on_a_loss_goal() {
        let p = compute_weight_progress(80.0, 75.0, 70.0);
        assert!(close(p.fraction_complete, 0.5));
        assert_eq!(p.percent, 50);
    }

    #[test]
    fn gain_goals_work_the_same_way() {
        let p = compute_weight_progress(50.0, 53.0, 56.0);
        assert!(close(p.fraction_complete, 0.5));
        assert!(close(p.remaining_delta, 3.0));
    }

    #[test]
    fn overshoot_caps_at_complete() {
        assert_eq!(compute_weight_progress(80.0, 65.0, 70.0).fraction_complete, 1.0);
    }

    #[test]
    fn moving_away_from_goal_still_accrues() {
        let p = compute_weight_progress(80.0, 84.0, 70.0);
        assert!(close(p.fraction_complete, 0.4));
        assert_eq!(p.percent, 40);
        assert!(close(p.remaining_delta, 14.0));
    }

    #[test]
    fn start_equal_to_goal_completes_on_any_movement() {
        let p = compute_weight_progress(70.0, 69.0, 70.0);
        assert_eq!(p.fraction_complete, 1.0);
        assert_eq!(p.percent, 100);

        let nudged = compute_weight_progress(70.0, 69.0, 70.00001);
        assert_eq!(nudged.fraction_complete, 1.0);
    }

    #[test]
    fn start_equal_to_goal_without_movement_is_zero() {
        let p = compute_weight_progress(70.0, 70.0, 70.0);
        assert_eq!(p.fraction_complete, 0.0);
        assert_eq!(p.percent, 0);
        assert!(close(p.remaining_delta, 0.0));
    }

    #[test]
    fn nan_input_gives_zero() {
        let p = compute_weight_progress(80.0, f64::NAN, 70.0);
        assert_eq!(p.fraction_complete, 0.0);
        assert_eq!(p.percent, 0);
    }

    #[test]
    fn fraction_stays_in_unit_interval() {
        for start in [40.0, 65.5, 80.0, 120.0] {
            for current in [30.0, 60.0, 70.0, 90.0, 150.0] {
                for goal in [50.0, 70.0, 80.0, 100.0] {
                    let p = compute_weight_progress(start, current, goal);
                    assert!((0.0..=1.0).contains(&p.fraction_complete));
                    assert!(p.percent <= 100);
                }
            }
        }
    }

    #[test]
    fn bmi_from_weight_and_height() {
        assert!((compute_bmi(70.0, 175.0) - 22.857).abs() < 0.001);
        assert_eq!(compute_bmi(70.0, 0.0), 0.0);
    }

    #[test]
    fn bmi_category_boundaries() {
        assert_eq!(classify_bmi(18.49), BmiCategory::Under);
        assert_eq!(classify_bmi(18.5), BmiCategory::Normal);
        assert_eq!(classify_bmi(24.9), BmiCategory::Normal);
        assert_eq!(classify_bmi(24.91), BmiCategory::Over);
        assert_eq!(classify_bmi(28.0), BmiCategory::Over);
        assert_eq!(classify_bmi(28.01), BmiCategory::Obese);
    }

    #[test]
    fn ideal_range_is_rounded() {
        let (low, high) = ideal_weight_range(170.0);
        assert!(close(low, 53.5));
        assert!(close(high, 72.0));
    }

    #[test]
    fn derived_result_carries_bmi() {
        let result = ProgressResult::derive(80.0, 75.0, 70.0, 175.0);
        assert_eq!(result.percent, 50);
        assert_eq!(result.bmi_category, BmiCategory::Normal);
        assert!(close(result.remaining_delta, 5.0));
    }
}
