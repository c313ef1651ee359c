use serde::{Deserialize, Serialize};

use crate::models::DayLabels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Under,
    Normal,
    Over,
    Obese,
}

impl BmiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Under => "under",
            BmiCategory::Normal => "normal",
            BmiCategory::Over => "over",
            BmiCategory::Obese => "obese",
        }
    }

    pub fn label(&self, labels: DayLabels) -> &'static str {
        match labels {
            DayLabels::En => match self {
                BmiCategory::Under => "Underweight",
                BmiCategory::Normal => "Ideal",
                BmiCategory::Over => "Overweight",
                BmiCategory::Obese => "Obese",
            },
            DayLabels::Zh => match self {
                BmiCategory::Under => "偏瘦",
                BmiCategory::Normal => "理想",
                BmiCategory::Over => "偏胖",
                BmiCategory::Obese => "肥胖",
            },
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProgress {
    /// In [0, 1]
    pub fraction_complete: f64,
    pub remaining_delta: f64,
    /// 0..=100
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressResult {
    pub fraction_complete: f64,
    pub remaining_delta: f64,
    pub percent: u8,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
}
