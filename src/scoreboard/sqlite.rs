use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use super::{operator_label, timestamp, ScoreboardEntry, ScoreboardQuery, ScoreboardRecorder};
use crate::error::ScoreboardResult;
use crate::prompt::{Difficulty, Operator};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS scoreboard (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        username TEXT NOT NULL,
        difficulty TEXT NOT NULL,
        operator TEXT NOT NULL,
        score INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_scoreboard_category ON scoreboard(difficulty, operator);
"#;

type RawRow = (String, String, String, String, i64);

/// SQLite-backed scoreboard
#[derive(Debug)]
pub struct SqliteScoreboard {
    conn: Mutex<Connection>,
}

impl SqliteScoreboard {
    /// Open (or create) the database file and make sure the table exists
    pub fn open<P: AsRef<Path>>(path: P) -> ScoreboardResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> ScoreboardResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> ScoreboardResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn select(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            match entry_from_row(row?) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::warn!(error = %err, "skipping unreadable scoreboard row"),
            }
        }
        Ok(entries)
    }
}

fn entry_from_row(
    (ts, username, difficulty, operator, score): RawRow,
) -> ScoreboardResult<ScoreboardEntry> {
    Ok(ScoreboardEntry {
        timestamp: timestamp::parse(&ts)?,
        username,
        difficulty: difficulty.parse()?,
        operator: operator_label::parse(&operator)?,
        score,
    })
}

impl ScoreboardRecorder for SqliteScoreboard {
    fn record(&self, entry: &ScoreboardEntry) -> ScoreboardResult<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            r#"
            INSERT INTO scoreboard (timestamp, username, difficulty, operator, score)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                entry.timestamp.to_rfc3339(),
                entry.username,
                entry.difficulty.to_string(),
                entry.operator_label(),
                entry.score,
            ],
        )?;
        Ok(())
    }
}

impl ScoreboardQuery for SqliteScoreboard {
    fn all(&self) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        self.select(
            "SELECT timestamp, username, difficulty, operator, score FROM scoreboard ORDER BY id",
            &[],
        )
    }

    fn query(
        &self,
        difficulty: Difficulty,
        operator: Option<Operator>,
    ) -> ScoreboardResult<Vec<ScoreboardEntry>> {
        self.select(
            r#"
            SELECT timestamp, username, difficulty, operator, score
            FROM scoreboard
            WHERE difficulty = ?1 AND operator = ?2
            ORDER BY id
            "#,
            &[
                &difficulty.to_string() as &dyn rusqlite::ToSql,
                &Operator::label(operator),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use chrono::Local;
    use tempfile::tempdir;

    fn entry(name: &str, difficulty: Difficulty, operator: Operator, score: i64) -> ScoreboardEntry {
        ScoreboardEntry::new(
            &SessionConfig::new(name, difficulty, operator),
            score,
            Local::now(),
        )
    }

    #[test]
    fn test_record_and_query() {
        let db = SqliteScoreboard::open_in_memory().unwrap();
        db.record(&entry("a", Difficulty::Normal, Operator::Addition, 10))
            .unwrap();
        db.record(&entry("b", Difficulty::Normal, Operator::Subtraction, 20))
            .unwrap();
        db.record(&entry("c", Difficulty::Hard, Operator::Subtraction, -4))
            .unwrap();

        assert_eq!(db.all().unwrap().len(), 3);

        let subs = db
            .query(Difficulty::Normal, Some(Operator::Subtraction))
            .unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].username, "b");

        let hard = db.query(Difficulty::Hard, None).unwrap();
        assert_eq!(hard.len(), 1);
        assert_eq!(hard[0].score, -4);
        assert_eq!(hard[0].operator, None);
    }

    #[test]
    fn test_rows_keep_insertion_order() {
        let db = SqliteScoreboard::open_in_memory().unwrap();
        for score in [5, 1, 9] {
            db.record(&entry("z", Difficulty::Normal, Operator::Division, score))
                .unwrap();
        }
        let scores: Vec<i64> = db.all().unwrap().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![5, 1, 9]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("scoreboard.db");

        {
            let db = SqliteScoreboard::open(&path).unwrap();
            db.record(&entry("p", Difficulty::Normal, Operator::Multiplication, 33))
                .unwrap();
        }

        let db = SqliteScoreboard::open(&path).unwrap();
        let rows = db.all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 33);
    }

    #[test]
    fn test_unreadable_rows_are_skipped() {
        let db = SqliteScoreboard::open_in_memory().unwrap();
        db.record(&entry("ok", Difficulty::Hard, Operator::Addition, 8))
            .unwrap();
        {
            let conn = db.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO scoreboard (timestamp, username, difficulty, operator, score) \
                 VALUES ('not a time', 'bad', 'Hard', 'Invalid', 99), \
                        ('2024-03-01 10:00:00.5', 'old', 'Hard', 'Invalid', 3), \
                        ('2024-03-01T10:00:00+00:00', 'odd', 'Expert', 'Invalid', 7)",
                [],
            )
            .unwrap();
        }

        let rows = db.all().unwrap();
        let names: Vec<&str> = rows.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["ok", "old"]);
        assert_eq!(db.query(Difficulty::Hard, None).unwrap().len(), 2);
    }
}
