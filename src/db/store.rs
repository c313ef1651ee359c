use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{UserRepo, WeightRepo};
use crate::models::{ProfileSnapshot, UserProfile, WeightRecord};

/// Opaque session identifier handed out at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session is invalid or has ended, please log in again")]
    InvalidToken,
    #[error("Username or password is incorrect")]
    BadCredentials,
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("Weight must be a positive number, got {0}")]
    InvalidWeight(f64),
    #[error("Cannot record a weight for {0}, it is in the future")]
    FutureDate(NaiveDate),
    #[error("Profile is missing a height or target weight")]
    MissingProfile,
}

/// Reject records the store must never hold.
pub fn validate_record(record: &WeightRecord, today: NaiveDate) -> Result<(), StoreError> {
    if !record.weight.is_finite() || record.weight <= 0.0 {
        return Err(StoreError::InvalidWeight(record.weight));
    }
    if record.date > today {
        return Err(StoreError::FutureDate(record.date));
    }
    Ok(())
}

/// Everything the trend views need from persistence. Every call names the
/// session explicitly.
pub trait WeightStore {
    fn fetch_weight_records(&self, token: &SessionToken) -> Result<Vec<WeightRecord>>;
    fn fetch_profile(&self, token: &SessionToken) -> Result<ProfileSnapshot>;
    fn save_weight_record(&self, record: &WeightRecord, token: &SessionToken) -> Result<()>;
    fn save_target_weight(&self, target: f64, token: &SessionToken) -> Result<()>;
    fn fetch_user_profile(&self, token: &SessionToken) -> Result<UserProfile>;
    fn save_user_profile(&self, profile: &UserProfile, token: &SessionToken) -> Result<()>;
}

/// [`WeightStore`] over the local SQLite database.
pub struct LocalStore<'a> {
    conn: &'a Connection,
}

impl<'a> LocalStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn user_id(&self, token: &SessionToken) -> Result<i64> {
        UserRepo::find_by_token(self.conn, token)?.ok_or_else(|| StoreError::InvalidToken.into())
    }
}

impl WeightStore for LocalStore<'_> {
    fn fetch_weight_records(&self, token: &SessionToken) -> Result<Vec<WeightRecord>> {
        let user_id = self.user_id(token)?;
        WeightRepo::get_all(self.conn, user_id)
    }

    fn fetch_profile(&self, token: &SessionToken) -> Result<ProfileSnapshot> {
        let user_id = self.user_id(token)?;
        let height = UserRepo::get_profile(self.conn, user_id)?.height_cm;
        let target = UserRepo::get_target_weight(self.conn, user_id)?;
        match (height, target) {
            (Some(height_cm), Some(goal_weight)) => Ok(ProfileSnapshot::new(height_cm, goal_weight)),
            _ => Err(StoreError::MissingProfile.into()),
        }
    }

    fn save_weight_record(&self, record: &WeightRecord, token: &SessionToken) -> Result<()> {
        if !record.weight.is_finite() || record.weight <= 0.0 {
            return Err(StoreError::InvalidWeight(record.weight).into());
        }
        let user_id = self.user_id(token)?;
        WeightRepo::upsert(self.conn, user_id, record)?;
        info!(
            "saved {} {} for {}",
            record.weight,
            record.unit,
            record.date_key()
        );
        Ok(())
    }

    fn save_target_weight(&self, target: f64, token: &SessionToken) -> Result<()> {
        if !target.is_finite() || target <= 0.0 {
            return Err(StoreError::InvalidWeight(target).into());
        }
        let user_id = self.user_id(token)?;
        UserRepo::set_target_weight(self.conn, user_id, target)?;
        info!("target weight set to {}", target);
        Ok(())
    }

    fn fetch_user_profile(&self, token: &SessionToken) -> Result<UserProfile> {
        let user_id = self.user_id(token)?;
        UserRepo::get_profile(self.conn, user_id)
    }

    fn save_user_profile(&self, profile: &UserProfile, token: &SessionToken) -> Result<()> {
        let user_id = self.user_id(token)?;
        UserRepo::update_profile(self.conn, user_id, profile)?;
        info!("profile updated for user {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::WeightUnit;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn logged_in() -> (Connection, SessionToken) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        UserRepo::register(&conn, "ana", "pw").unwrap();
        let token = UserRepo::login(&conn, "ana", "pw").unwrap();
        (conn, token)
    }

    #[test]
    fn unknown_token_is_rejected_everywhere() {
        let (conn, _) = logged_in();
        let store = LocalStore::new(&conn);
        let bogus = SessionToken::new("nope");
        let err = store.fetch_weight_records(&bogus).unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::InvalidToken)));
        assert!(store.save_target_weight(60.0, &bogus).is_err());
        assert!(store.fetch_user_profile(&bogus).is_err());
    }

    #[test]
    fn saved_records_come_back() {
        let (conn, token) = logged_in();
        let store = LocalStore::new(&conn);
        store
            .save_weight_record(&WeightRecord::kg(date(2024, 1, 8), 78.0), &token)
            .unwrap();
        store
            .save_weight_record(&WeightRecord::new(date(2024, 1, 9), 170.0, WeightUnit::Lb), &token)
            .unwrap();
        let records = store.fetch_weight_records(&token).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].unit, WeightUnit::Lb);
    }

    #[test]
    fn nonpositive_weights_never_reach_the_table() {
        let (conn, token) = logged_in();
        let store = LocalStore::new(&conn);
        for bad in [0.0, -1.0, f64::NAN] {
            let err = store
                .save_weight_record(&WeightRecord::kg(date(2024, 1, 8), bad), &token)
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<StoreError>(),
                Some(StoreError::InvalidWeight(_))
            ));
        }
        assert!(store.fetch_weight_records(&token).unwrap().is_empty());
    }

    #[test]
    fn profile_snapshot_needs_height_and_target() {
        let (conn, token) = logged_in();
        let store = LocalStore::new(&conn);
        let err = store.fetch_profile(&token).unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::MissingProfile)));

        let profile = UserProfile {
            height_cm: Some(180.0),
            ..UserProfile::default()
        };
        store.save_user_profile(&profile, &token).unwrap();
        assert!(store.fetch_profile(&token).is_err());

        store.save_target_weight(72.0, &token).unwrap();
        assert_eq!(
            store.fetch_profile(&token).unwrap(),
            ProfileSnapshot::new(180.0, 72.0)
        );
    }

    #[test]
    fn validate_rejects_future_dates() {
        let today = date(2024, 1, 10);
        assert!(validate_record(&WeightRecord::kg(today, 70.0), today).is_ok());
        assert!(matches!(
            validate_record(&WeightRecord::kg(date(2024, 1, 11), 70.0), today),
            Err(StoreError::FutureDate(_))
        ));
        assert!(matches!(
            validate_record(&WeightRecord::kg(today, -2.0), today),
            Err(StoreError::InvalidWeight(_))
        ));
    }
}
