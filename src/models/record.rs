use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const KG_PER_LB: f64 = 0.45359237;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lbs",
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for WeightUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lb),
            _ => Err(anyhow::anyhow!("Unknown weight unit: {}", s)),
        }
    }
}

/// One body-weight measurement. At most one exists per user and calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    /// Local calendar date, no time component
    pub date: NaiveDate,
    pub weight: f64,
    pub unit: WeightUnit,
}

impl WeightRecord {
    pub fn new(date: NaiveDate, weight: f64, unit: WeightUnit) -> Self {
        Self { date, weight, unit }
    }

    pub fn kg(date: NaiveDate, weight: f64) -> Self {
        Self::new(date, weight, WeightUnit::Kg)
    }

    /// Weight normalised to kilograms.
    pub fn weight_kg(&self) -> f64 {
        match self.unit {
            WeightUnit::Kg => self.weight,
            WeightUnit::Lb => self.weight * KG_PER_LB,
        }
    }

    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pounds_are_normalised_to_kilograms() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let rec = WeightRecord::new(date, 200.0, WeightUnit::Lb);
        assert!((rec.weight_kg() - 90.718474).abs() < 1e-9);
        assert_eq!(WeightRecord::kg(date, 72.5).weight_kg(), 72.5);
    }

    #[test]
    fn unit_parsing_accepts_common_spellings() {
        assert_eq!("KG".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("lbs".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert!("stone".parse::<WeightUnit>().is_err());
    }

    #[test]
    fn date_key_uses_calendar_components() {
        let rec = WeightRecord::kg(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(), 78.0);
        assert_eq!(rec.date_key(), "2024-01-08");
    }
}
