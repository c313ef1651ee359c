use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use log::warn;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::MetaRepo;
use crate::db::{LocalStore, SessionToken, WeightStore};
use crate::models::{ProfileSnapshot, ProgressResult, WeekHistory, WeightRecord};
use crate::trend::week_grid::{
    build_week_history, earliest_non_zero, latest_non_zero, value_for_weekday,
};

/// Where an input to the snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Store,
    Cache,
    Default,
}

/// Everything the dashboard and the `week`/`progress` commands show, built in
/// one pass from the store with fallbacks applied.
#[derive(Debug, Clone)]
pub struct TrendSnapshot {
    pub anchor: NaiveDate,
    pub history: WeekHistory,
    pub profile: ProfileSnapshot,
    pub records_origin: DataOrigin,
    pub profile_origin: DataOrigin,
    pub record_count: usize,
    pub start_weight: f64,
    pub current_weight: f64,
    /// Weight recorded on the anchor date, if any.
    pub today_weight: Option<f64>,
    pub progress: ProgressResult,
}

impl TrendSnapshot {
    /// Never fails. A record fetch error yields an empty history and a
    /// profile fetch error falls back to `cached`, then to config defaults.
    pub fn load(
        store: &impl WeightStore,
        token: &SessionToken,
        anchor: NaiveDate,
        cached: Option<ProfileSnapshot>,
        config: &AppConfig,
    ) -> Self {
        let (records, records_origin) = match store.fetch_weight_records(token) {
            Ok(records) => (records, DataOrigin::Store),
            Err(e) => {
                warn!("could not load weight records, showing empty history: {:#}", e);
                (Vec::new(), DataOrigin::Default)
            }
        };

        let (profile, profile_origin) = match store.fetch_profile(token) {
            Ok(profile) => (profile, DataOrigin::Store),
            Err(e) => match cached {
                Some(profile) => {
                    warn!("could not load profile, using cached copy: {:#}", e);
                    (profile, DataOrigin::Cache)
                }
                None => {
                    warn!("could not load profile, using defaults: {:#}", e);
                    let defaults = ProfileSnapshot::new(
                        config.profile.default_height_cm,
                        config.profile.default_goal_weight,
                    );
                    (defaults, DataOrigin::Default)
                }
            },
        };

        Self::from_parts(
            &records,
            records_origin,
            profile,
            profile_origin,
            anchor,
            config,
        )
    }

    fn from_parts(
        records: &[WeightRecord],
        records_origin: DataOrigin,
        profile: ProfileSnapshot,
        profile_origin: DataOrigin,
        anchor: NaiveDate,
        config: &AppConfig,
    ) -> Self {
        let history = build_week_history(records, anchor, config.history.horizon_years);

        let start_weight =
            earliest_non_zero(&history).unwrap_or(config.profile.default_start_weight);
        let today_weight = history
            .anchor_week()
            .map(|week| value_for_weekday(week, anchor.weekday()))
            .filter(|v| *v > 0.0);
        let current_weight = today_weight
            .or_else(|| latest_non_zero(&history))
            .unwrap_or(start_weight);

        let progress = ProgressResult::derive(
            start_weight,
            current_weight,
            profile.goal_weight,
            profile.height_cm,
        );

        Self {
            anchor,
            history,
            profile,
            records_origin,
            profile_origin,
            record_count: records.len(),
            start_weight,
            current_weight,
            today_weight,
            progress,
        }
    }

    /// Load against the local database, reading and refreshing the profile cache.
    pub fn load_local(
        conn: &Connection,
        token: &SessionToken,
        anchor: NaiveDate,
        config: &AppConfig,
    ) -> Result<Self> {
        let cached = MetaRepo::cached_profile(conn)?;
        let snapshot = Self::load(&LocalStore::new(conn), token, anchor, cached, config);
        if snapshot.profile_origin == DataOrigin::Store {
            MetaRepo::cache_profile(conn, &snapshot.profile)?;
        }
        Ok(snapshot)
    }

    pub fn is_stale(&self) -> bool {
        self.records_origin != DataOrigin::Store || self.profile_origin != DataOrigin::Store
    }
}
