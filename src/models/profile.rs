use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" | "男" => Ok(Gender::Male),
            "f" | "female" | "女" => Ok(Gender::Female),
            _ => Err(anyhow::anyhow!("Unknown gender: {}", s)),
        }
    }
}

/// Editable account profile. Every field is optional until the user fills it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    pub birth_year: Option<i32>,
    pub height_cm: Option<f64>,
}

/// The two profile values progress and BMI are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub height_cm: f64,
    pub goal_weight: f64,
}

impl ProfileSnapshot {
    pub fn new(height_cm: f64, goal_weight: f64) -> Self {
        Self {
            height_cm,
            goal_weight,
        }
    }
}
