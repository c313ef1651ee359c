use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::DayLabels;
use crate::trend::navigation::DEFAULT_SWIPE_THRESHOLD;
use crate::trend::picker::{DEFAULT_CEILING, DEFAULT_FLOOR, DEFAULT_STEP_PIXELS, SCALE_STEP};
use crate::trend::week_grid::DEFAULT_HORIZON_YEARS;

fn default_height_cm() -> f64 {
    170.0
}
fn default_start_weight() -> f64 {
    75.0
}
fn default_goal_weight() -> f64 {
    68.0
}
fn default_horizon_years() -> u32 {
    DEFAULT_HORIZON_YEARS
}
fn default_floor() -> f64 {
    DEFAULT_FLOOR
}
fn default_ceiling() -> f64 {
    DEFAULT_CEILING
}
fn default_step_size() -> f64 {
    SCALE_STEP
}
fn default_step_pixels() -> f64 {
    DEFAULT_STEP_PIXELS
}
fn default_swipe_threshold() -> f64 {
    DEFAULT_SWIPE_THRESHOLD
}

/// Stand-ins used when the store has no profile and nothing is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_height_cm")]
    pub default_height_cm: f64,
    #[serde(default = "default_start_weight")]
    pub default_start_weight: f64,
    #[serde(default = "default_goal_weight")]
    pub default_goal_weight: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_height_cm: default_height_cm(),
            default_start_weight: default_start_weight(),
            default_goal_weight: default_goal_weight(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// How many calendar years back the week grid reaches.
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
    #[serde(default)]
    pub day_labels: DayLabels,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            horizon_years: default_horizon_years(),
            day_labels: DayLabels::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    #[serde(default = "default_floor")]
    pub floor: f64,
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    /// Pixels of drag per step.
    #[serde(default = "default_step_pixels")]
    pub step_pixels: f64,
    /// Pixels one arrow key press counts as in the TUI.
    #[serde(default = "default_step_pixels")]
    pub nudge_pixels: f64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            ceiling: default_ceiling(),
            step_size: default_step_size(),
            step_pixels: default_step_pixels(),
            nudge_pixels: default_step_pixels(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: default_swipe_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub picker: PickerConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "weighin")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("weighin.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.picker;
        if !(p.floor > 0.0 && p.floor < p.ceiling) {
            bail!(
                "[picker] floor ({}) must be positive and below ceiling ({})",
                p.floor,
                p.ceiling
            );
        }
        if p.step_size <= 0.0 || p.step_pixels <= 0.0 || p.nudge_pixels <= 0.0 {
            bail!("[picker] step_size, step_pixels and nudge_pixels must be positive");
        }
        if self.profile.default_height_cm <= 0.0 {
            bail!("[profile] default_height_cm must be positive");
        }
        if self.chart.swipe_threshold < 0.0 {
            bail!("[chart] swipe_threshold cannot be negative");
        }
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
