use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS users (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            username       TEXT NOT NULL UNIQUE,
            password_hash  TEXT NOT NULL,
            salt           TEXT NOT NULL,
            token          TEXT UNIQUE,
            nickname       TEXT,
            gender         TEXT CHECK(gender IS NULL OR gender IN ('male','female')),
            birth_year     INTEGER,
            height_cm      REAL CHECK(height_cm IS NULL OR height_cm > 0),
            target_weight  REAL CHECK(target_weight IS NULL OR target_weight > 0),
            created_at     TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS weight_records (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      INTEGER NOT NULL REFERENCES users(id),
            record_date  TEXT NOT NULL,
            weight       REAL NOT NULL CHECK(weight > 0),
            unit         TEXT NOT NULL DEFAULT 'kg' CHECK(unit IN ('kg','lb')),
            updated_at   TEXT DEFAULT (datetime('now')),
            UNIQUE(user_id, record_date)
        );

        CREATE INDEX IF NOT EXISTS idx_weight_records_user_date
            ON weight_records(user_id, record_date);

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('users','weight_records','app_meta')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
