//! Application state container
//!
//! Owns the database and the running tracker. Rating and notes belong to the
//! quality screen the tracker navigates to after a stop; they write through
//! the store directly and then ask the tracker to re-read.

use std::sync::Arc;

use sleeptrack_nights::{Night, NightError, NightStore, SleepQuality, SqliteNightStore};
use sleeptrack_storage::Database;
use sleeptrack_tracker::{EventReceiver, NightTracker, TrackerHandle};

use crate::config::Config;
use crate::Result;

pub struct SleepTracker {
    /// Configuration
    config: Config,
    /// Night store shared with the tracker
    store: Arc<SqliteNightStore>,
    /// Running tracker
    tracker: TrackerHandle,
}

impl SleepTracker {
    /// Open the database at `config.database_path` and start the tracker.
    ///
    /// Returns the tracker's event receiver alongside; the caller owns it.
    pub async fn open(config: Config) -> Result<(Self, EventReceiver)> {
        config.validate()?;

        let db = Database::open(&config.database_path)?;
        Ok(Self::start(config, db).await)
    }

    /// In-memory database, for previews and tests
    pub async fn open_in_memory(config: Config) -> Result<(Self, EventReceiver)> {
        config.validate()?;

        let db = Database::open_in_memory()?;
        Ok(Self::start(config, db).await)
    }

    async fn start(config: Config, db: Database) -> (Self, EventReceiver) {
        let store = Arc::new(SqliteNightStore::new(db));
        let (tracker, events) =
            NightTracker::spawn(store.clone(), config.command_queue_depth).await;

        tracing::info!(
            database = %config.database_path.display(),
            state = %tracker.state(),
            "Sleep tracker ready"
        );

        (
            Self {
                config,
                store,
                tracker,
            },
            events,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracker(&self) -> &TrackerHandle {
        &self.tracker
    }

    pub async fn night(&self, night_id: i64) -> Result<Night> {
        Ok(self
            .store
            .get(night_id)
            .await?
            .ok_or(NightError::NotFound(night_id))?)
    }

    /// Rate a stopped night on the 0..=5 scale
    pub async fn rate_night(&self, night_id: i64, score: i64) -> Result<Night> {
        let quality = SleepQuality::try_from(score)?;

        let night = self
            .modify_completed(night_id, |night| night.set_quality(quality))
            .await?;

        tracing::info!(night_id, quality = %quality, "Rated night");

        Ok(night)
    }

    /// Attach a note to a stopped night; `None` or blank removes it
    pub async fn annotate_night(&self, night_id: i64, note: Option<String>) -> Result<Night> {
        let night = self
            .modify_completed(night_id, |night| night.set_note(note))
            .await?;

        tracing::info!(night_id, has_note = night.note.is_some(), "Annotated night");

        Ok(night)
    }

    async fn modify_completed(
        &self,
        night_id: i64,
        change: impl FnOnce(&mut Night),
    ) -> Result<Night> {
        let mut night = self.night(night_id).await?;
        if night.is_in_progress() {
            return Err(NightError::InProgress(night_id).into());
        }

        change(&mut night);
        self.store.update(&night).await?;

        // The write is done; a failed re-read is reported on the tracker's event channel
        if let Err(err) = self.tracker.refresh().await {
            tracing::warn!(night_id, error = %err, "Tracker refresh after night update failed");
        }

        Ok(night)
    }

    /// Stop the tracker; in-flight commands are cancelled
    pub fn shutdown(&self) {
        self.tracker.shutdown();
        tracing::info!("Sleep tracker shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use sleeptrack_tracker::{TrackerError, TrackerEvent, TrackerState};
    use std::path::PathBuf;

    fn config() -> Config {
        Config::new(PathBuf::from("/unused"))
    }

    #[tokio::test]
    async fn test_track_stop_and_rate() {
        let (app, mut events) = SleepTracker::open_in_memory(config()).await.unwrap();
        let tracker = app.tracker();
        assert_eq!(tracker.state(), TrackerState::Idle);

        tracker.start().await.unwrap();
        let stopped = tracker.stop().await.unwrap().unwrap();

        let night = match events.recv().await.unwrap() {
            TrackerEvent::NavigateToQuality { night } => night,
            other => panic!("unexpected event: {other:?}"),
        };
        assert_eq!(night, stopped);
        tracker.acknowledge_navigation().await.unwrap();

        let rated = app.rate_night(night.id, 5).await.unwrap();
        assert_eq!(rated.quality, Some(SleepQuality::Excellent));

        let view = tracker.view();
        assert_eq!(view.nights[0].quality, Some(SleepQuality::Excellent));
        assert!(view.summary.contains("Quality: Excellent"));
    }

    #[tokio::test]
    async fn test_rate_rejects_bad_input() {
        let (app, _events) = SleepTracker::open_in_memory(config()).await.unwrap();

        assert!(matches!(
            app.rate_night(1, 7).await,
            Err(CoreError::Night(NightError::InvalidQuality(7)))
        ));
        assert!(matches!(
            app.rate_night(99, 3).await,
            Err(CoreError::Night(NightError::NotFound(99)))
        ));

        let tonight = app.tracker().start().await.unwrap();
        assert!(matches!(
            app.rate_night(tonight.id, 3).await,
            Err(CoreError::Night(NightError::InProgress(_)))
        ));
    }

    #[tokio::test]
    async fn test_annotate_night() {
        let (app, _events) = SleepTracker::open_in_memory(config()).await.unwrap();
        app.tracker().start().await.unwrap();
        let night = app.tracker().stop().await.unwrap().unwrap();

        let noted = app
            .annotate_night(night.id, Some("neighbours' party".to_string()))
            .await
            .unwrap();
        assert_eq!(noted.note.as_deref(), Some("neighbours' party"));

        let cleared = app.annotate_night(night.id, None).await.unwrap();
        assert!(cleared.note.is_none());
    }

    #[tokio::test]
    async fn test_rating_persists_when_tracker_refresh_fails() {
        let (app, _events) = SleepTracker::open_in_memory(config()).await.unwrap();
        app.tracker().start().await.unwrap();
        let night = app.tracker().stop().await.unwrap().unwrap();

        app.shutdown();
        tokio::task::yield_now().await;

        let rated = app.rate_night(night.id, 2).await.unwrap();
        assert_eq!(rated.quality, Some(SleepQuality::SoSo));
        assert_eq!(
            app.night(night.id).await.unwrap().quality,
            Some(SleepQuality::SoSo)
        );
    }

    #[tokio::test]
    async fn test_reopen_resumes_tracking() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());

        let tonight = {
            let (app, _events) = SleepTracker::open(config.clone()).await.unwrap();
            let tonight = app.tracker().start().await.unwrap();
            app.shutdown();
            tonight
        };

        let (app, _events) = SleepTracker::open(config).await.unwrap();
        assert_eq!(app.tracker().state(), TrackerState::Tracking);
        assert_eq!(app.tracker().current(), Some(tonight));
    }

    #[tokio::test]
    async fn test_shutdown_stops_commands() {
        let (app, _events) = SleepTracker::open_in_memory(config()).await.unwrap();
        app.shutdown();

        // Cancellation is observed by the actor on its next poll
        tokio::task::yield_now().await;
        assert!(matches!(
            app.tracker().start().await,
            Err(TrackerError::Stopped)
        ));
    }
}
