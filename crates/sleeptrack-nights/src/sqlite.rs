//! SQLite night store
//!
//! Each call hops onto tokio's blocking pool before taking the connection
//! lock, so an async caller never stalls its own thread on disk I/O.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};

use sleeptrack_storage::Database;

use crate::error::NightError;
use crate::night::Night;
use crate::store::NightStore;
use crate::Result;

const NIGHT_COLUMNS: &str = "id, start_time_milli, end_time_milli, quality, note";

pub struct SqliteNightStore {
    db: Database,
}

impl SqliteNightStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let outcome = tokio::task::spawn_blocking(move || db.with_connection(|conn| Ok(f(conn)?)))
            .await
            .map_err(|e| NightError::Worker(e.to_string()))?;

        Ok(outcome?)
    }
}

impl Clone for SqliteNightStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

#[async_trait]
impl NightStore for SqliteNightStore {
    async fn insert(&self, night: &Night) -> Result<i64> {
        let night = night.clone();
        let id = self
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO nights (start_time_milli, end_time_milli, quality, note)
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![
                        night.start_time.timestamp_millis(),
                        night.end_time.timestamp_millis(),
                        night.quality,
                        night.note,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        tracing::debug!(night_id = id, "Inserted night");

        Ok(id)
    }

    async fn update(&self, night: &Night) -> Result<()> {
        let night = night.clone();
        let id = night.id;
        let changed = self
            .run(move |conn| {
                conn.execute(
                    "UPDATE nights
                     SET start_time_milli = ?2, end_time_milli = ?3, quality = ?4, note = ?5
                     WHERE id = ?1",
                    rusqlite::params![
                        night.id,
                        night.start_time.timestamp_millis(),
                        night.end_time.timestamp_millis(),
                        night.quality,
                        night.note,
                    ],
                )
            })
            .await?;

        if changed == 0 {
            return Err(NightError::NotFound(id));
        }

        tracing::debug!(night_id = id, "Updated night");

        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<Night>> {
        self.run(move |conn| {
            conn.query_row(
                &format!("SELECT {NIGHT_COLUMNS} FROM nights WHERE id = ?1"),
                [id],
                night_from_row,
            )
            .optional()
        })
        .await
    }

    async fn latest(&self) -> Result<Option<Night>> {
        self.run(|conn| {
            conn.query_row(
                &format!("SELECT {NIGHT_COLUMNS} FROM nights ORDER BY id DESC LIMIT 1"),
                [],
                night_from_row,
            )
            .optional()
        })
        .await
    }

    async fn all(&self) -> Result<Vec<Night>> {
        self.run(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {NIGHT_COLUMNS} FROM nights ORDER BY id DESC"))?;

            let nights = stmt
                .query_map([], night_from_row)?
                .collect::<rusqlite::Result<Vec<Night>>>()?;

            Ok(nights)
        })
        .await
    }

    async fn clear(&self) -> Result<usize> {
        let removed = self
            .run(|conn| conn.execute("DELETE FROM nights", []))
            .await?;

        tracing::info!(removed, "Cleared all nights");

        Ok(removed)
    }
}

fn night_from_row(row: &Row<'_>) -> rusqlite::Result<Night> {
    Ok(Night {
        id: row.get(0)?,
        start_time: millis_to_datetime(row.get(1)?, 1)?,
        end_time: millis_to_datetime(row.get(2)?, 2)?,
        quality: row.get(3)?,
        note: row.get(4)?,
    })
}

fn millis_to_datetime(millis: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::SleepQuality;
    use chrono::Duration;

    fn store() -> SqliteNightStore {
        SqliteNightStore::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_insert_and_latest() {
        let store = store();
        assert!(store.latest().await.unwrap().is_none());

        let first = store.insert(&Night::begin()).await.unwrap();
        let second = store.insert(&Night::begin()).await.unwrap();
        assert!(second > first);

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert!(latest.is_in_progress());
    }

    #[tokio::test]
    async fn test_update_persists_end_quality_and_note() {
        let store = store();
        let mut night = Night::begin();
        night.id = store.insert(&night).await.unwrap();

        night.finish_at(night.start_time + Duration::hours(7));
        night.set_quality(SleepQuality::Ok);
        night.set_note(Some("late coffee".to_string()));
        store.update(&night).await.unwrap();

        let loaded = store.get(night.id).await.unwrap().unwrap();
        assert_eq!(loaded, night);
        assert!(loaded.is_complete());
    }

    #[tokio::test]
    async fn test_update_missing_night() {
        let store = store();
        let mut night = Night::begin();
        night.id = 42;

        let err = store.update(&night).await.unwrap_err();
        assert!(matches!(err, NightError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_all_is_newest_first_and_clear_empties() {
        let store = store();
        let a = store.insert(&Night::begin()).await.unwrap();
        let b = store.insert(&Night::begin()).await.unwrap();

        let ids: Vec<i64> = store.all().await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![b, a]);

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.all().await.unwrap().is_empty());
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_quality_fails_read() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO nights (start_time_milli, end_time_milli, quality) VALUES (1, 2, 9)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let store = SqliteNightStore::new(db);
        assert!(matches!(
            store.all().await.unwrap_err(),
            NightError::Storage(_)
        ));
    }
}
