use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use uuid::Uuid;

use crate::db::store::{SessionToken, StoreError};
use crate::models::{Gender, ProfileSnapshot, UserProfile, WeightRecord, WeightUnit};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| anyhow!("Bad date '{}': {}", s, e))
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

// ─── User repo ───────────────────────────────────────────────────────────────

pub struct UserRepo;

impl UserRepo {
    pub fn register(conn: &Connection, username: &str, password: &str) -> Result<i64> {
        let username = username.trim();
        if username.is_empty() {
            return Err(anyhow!("Username cannot be empty"));
        }
        let taken = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::UsernameTaken(username.to_string()).into());
        }

        let salt = Uuid::new_v4().simple().to_string();
        conn.execute(
            "INSERT INTO users (username, password_hash, salt) VALUES (?1, ?2, ?3)",
            params![username, hash_password(&salt, password), salt],
        )?;
        let id = conn.last_insert_rowid();
        info!("registered user '{}' (id {})", username, id);
        Ok(id)
    }

    /// Check credentials and issue a fresh session token, replacing any old one.
    pub fn login(conn: &Connection, username: &str, password: &str) -> Result<SessionToken> {
        let row = conn
            .query_row(
                "SELECT id, password_hash, salt FROM users WHERE username = ?1",
                params![username.trim()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, stored_hash, salt)) = row else {
            return Err(StoreError::BadCredentials.into());
        };
        if hash_password(&salt, password) != stored_hash {
            return Err(StoreError::BadCredentials.into());
        }

        let token = SessionToken::generate();
        conn.execute(
            "UPDATE users SET token = ?1 WHERE id = ?2",
            params![token.as_str(), id],
        )?;
        info!("user {} logged in", id);
        Ok(token)
    }

    /// Returns false when the token matched no one.
    pub fn logout(conn: &Connection, token: &SessionToken) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE users SET token = NULL WHERE token = ?1",
            params![token.as_str()],
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_token(conn: &Connection, token: &SessionToken) -> Result<Option<i64>> {
        conn.query_row(
            "SELECT id FROM users WHERE token = ?1",
            params![token.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn username(conn: &Connection, user_id: i64) -> Result<String> {
        conn.query_row(
            "SELECT username FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }

    pub fn get_profile(conn: &Connection, user_id: i64) -> Result<UserProfile> {
        let (nickname, gender, birth_year, height_cm) = conn.query_row(
            "SELECT nickname, gender, birth_year, height_cm FROM users WHERE id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<i32>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            },
        )?;

        Ok(UserProfile {
            nickname,
            gender: gender.as_deref().map(Gender::from_str).transpose()?,
            birth_year,
            height_cm,
        })
    }

    pub fn update_profile(conn: &Connection, user_id: i64, profile: &UserProfile) -> Result<()> {
        conn.execute(
            "UPDATE users SET nickname = ?1, gender = ?2, birth_year = ?3, height_cm = ?4
             WHERE id = ?5",
            params![
                profile.nickname,
                profile.gender.map(|g| g.as_str()),
                profile.birth_year,
                profile.height_cm,
                user_id,
            ],
        )?;
        Ok(())
    }

    pub fn get_target_weight(conn: &Connection, user_id: i64) -> Result<Option<f64>> {
        conn.query_row(
            "SELECT target_weight FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }

    pub fn set_target_weight(conn: &Connection, user_id: i64, target: f64) -> Result<()> {
        conn.execute(
            "UPDATE users SET target_weight = ?1 WHERE id = ?2",
            params![target, user_id],
        )?;
        Ok(())
    }
}

// ─── Weight repo ─────────────────────────────────────────────────────────────

pub struct WeightRepo;

impl WeightRepo {
    /// One row per user and day; a second write for the same day replaces the first.
    pub fn upsert(conn: &Connection, user_id: i64, record: &WeightRecord) -> Result<()> {
        conn.execute(
            "INSERT INTO weight_records (user_id, record_date, weight, unit)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, record_date)
             DO UPDATE SET weight = ?3, unit = ?4, updated_at = datetime('now')",
            params![user_id, record.date_key(), record.weight, record.unit.as_str()],
        )?;
        debug!("upserted {} {} for user {}", record.date_key(), record.weight, user_id);
        Ok(())
    }

    /// Newest first.
    pub fn get_all(conn: &Connection, user_id: i64) -> Result<Vec<WeightRecord>> {
        let mut stmt = conn.prepare(
            "SELECT record_date, weight, unit FROM weight_records
             WHERE user_id = ?1 ORDER BY record_date DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (date, weight, unit) = r?;
            result.push(WeightRecord::new(
                parse_date(&date)?,
                weight,
                WeightUnit::from_str(&unit)?,
            ));
        }
        Ok(result)
    }

    pub fn get_by_date(
        conn: &Connection,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Option<WeightRecord>> {
        let row = conn
            .query_row(
                "SELECT weight, unit FROM weight_records WHERE user_id = ?1 AND record_date = ?2",
                params![user_id, date.format(DATE_FORMAT).to_string()],
                |row| Ok((row.get::<_, f64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((weight, unit)) => Ok(Some(WeightRecord::new(
                date,
                weight,
                WeightUnit::from_str(&unit)?,
            ))),
        }
    }

    pub fn count(conn: &Connection, user_id: i64) -> Result<usize> {
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM weight_records WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub const SESSION_KEY: &str = "session_token";
pub const PROFILE_CACHE_KEY: &str = "profile_snapshot";
pub const SETUP_DONE_KEY: &str = "setup_done";

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn session(conn: &Connection) -> Result<Option<SessionToken>> {
        Ok(Self::get(conn, SESSION_KEY)?.map(SessionToken::new))
    }

    /// Last profile snapshot read from the store. Unreadable JSON counts as no cache.
    pub fn cached_profile(conn: &Connection) -> Result<Option<ProfileSnapshot>> {
        let Some(raw) = Self::get(conn, PROFILE_CACHE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                log::warn!("ignoring unreadable profile cache: {}", e);
                Ok(None)
            }
        }
    }

    pub fn cache_profile(conn: &Connection, snapshot: &ProfileSnapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)?;
        Self::set(conn, PROFILE_CACHE_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn register_then_login_issues_token() {
        let conn = conn();
        let id = UserRepo::register(&conn, "ana", "s3cret").unwrap();
        let token = UserRepo::login(&conn, "ana", "s3cret").unwrap();
        assert_eq!(UserRepo::find_by_token(&conn, &token).unwrap(), Some(id));
        assert_eq!(UserRepo::username(&conn, id).unwrap(), "ana");
    }

    #[test]
    fn passwords_are_not_stored_in_clear() {
        let conn = conn();
        UserRepo::register(&conn, "ana", "s3cret").unwrap();
        let stored: String = conn
            .query_row("SELECT password_hash FROM users", [], |row| row.get(0))
            .unwrap();
        assert_ne!(stored, "s3cret");
        assert_eq!(stored.len(), 64);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let conn = conn();
        UserRepo::register(&conn, "ana", "a").unwrap();
        let err = UserRepo::register(&conn, "ana", "b").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::UsernameTaken(name)) if name == "ana"
        ));
    }

    #[test]
    fn wrong_password_and_unknown_user_fail_alike() {
        let conn = conn();
        UserRepo::register(&conn, "ana", "right").unwrap();
        for (user, pw) in [("ana", "wrong"), ("bob", "right")] {
            let err = UserRepo::login(&conn, user, pw).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<StoreError>(),
                Some(StoreError::BadCredentials)
            ));
        }
    }

    #[test]
    fn relogin_invalidates_old_token_and_logout_clears() {
        let conn = conn();
        UserRepo::register(&conn, "ana", "pw").unwrap();
        let first = UserRepo::login(&conn, "ana", "pw").unwrap();
        let second = UserRepo::login(&conn, "ana", "pw").unwrap();
        assert_ne!(first, second);
        assert_eq!(UserRepo::find_by_token(&conn, &first).unwrap(), None);

        assert!(UserRepo::logout(&conn, &second).unwrap());
        assert!(!UserRepo::logout(&conn, &second).unwrap());
        assert_eq!(UserRepo::find_by_token(&conn, &second).unwrap(), None);
    }

    #[test]
    fn profile_round_trips_through_user_row() {
        let conn = conn();
        let id = UserRepo::register(&conn, "ana", "pw").unwrap();
        assert_eq!(UserRepo::get_profile(&conn, id).unwrap(), UserProfile::default());

        let profile = UserProfile {
            nickname: Some("Ana".into()),
            gender: Some(Gender::Female),
            birth_year: Some(1994),
            height_cm: Some(168.0),
        };
        UserRepo::update_profile(&conn, id, &profile).unwrap();
        assert_eq!(UserRepo::get_profile(&conn, id).unwrap(), profile);

        assert_eq!(UserRepo::get_target_weight(&conn, id).unwrap(), None);
        UserRepo::set_target_weight(&conn, id, 62.5).unwrap();
        assert_eq!(UserRepo::get_target_weight(&conn, id).unwrap(), Some(62.5));
    }

    #[test]
    fn upsert_replaces_same_day() {
        let conn = conn();
        let id = UserRepo::register(&conn, "ana", "pw").unwrap();
        let day = date(2024, 1, 8);
        WeightRepo::upsert(&conn, id, &WeightRecord::kg(day, 80.0)).unwrap();
        WeightRepo::upsert(&conn, id, &WeightRecord::new(day, 170.0, WeightUnit::Lb)).unwrap();

        assert_eq!(WeightRepo::count(&conn, id).unwrap(), 1);
        let stored = WeightRepo::get_by_date(&conn, id, day).unwrap().unwrap();
        assert_eq!(stored.weight, 170.0);
        assert_eq!(stored.unit, WeightUnit::Lb);
        assert_eq!(WeightRepo::get_by_date(&conn, id, date(2024, 1, 9)).unwrap(), None);
    }

    #[test]
    fn records_are_per_user_and_newest_first() {
        let conn = conn();
        let ana = UserRepo::register(&conn, "ana", "pw").unwrap();
        let bob = UserRepo::register(&conn, "bob", "pw").unwrap();
        WeightRepo::upsert(&conn, ana, &WeightRecord::kg(date(2024, 1, 1), 80.0)).unwrap();
        WeightRepo::upsert(&conn, ana, &WeightRecord::kg(date(2024, 1, 8), 78.0)).unwrap();
        WeightRepo::upsert(&conn, bob, &WeightRecord::kg(date(2024, 1, 3), 90.0)).unwrap();

        let records = WeightRepo::get_all(&conn, ana).unwrap();
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 8), date(2024, 1, 1)]);
    }

    #[test]
    fn meta_session_and_profile_cache() {
        let conn = conn();
        assert_eq!(MetaRepo::session(&conn).unwrap(), None);
        MetaRepo::set(&conn, SESSION_KEY, "abc").unwrap();
        assert_eq!(MetaRepo::session(&conn).unwrap(), Some(SessionToken::new("abc")));
        MetaRepo::delete(&conn, SESSION_KEY).unwrap();
        assert_eq!(MetaRepo::session(&conn).unwrap(), None);

        let snapshot = ProfileSnapshot::new(172.0, 66.0);
        MetaRepo::cache_profile(&conn, &snapshot).unwrap();
        assert_eq!(MetaRepo::cached_profile(&conn).unwrap(), Some(snapshot));

        MetaRepo::set(&conn, PROFILE_CACHE_KEY, "{not json").unwrap();
        assert_eq!(MetaRepo::cached_profile(&conn).unwrap(), None);
    }
}
