//! Night Tracker
//!
//! The tracker is an actor: one task owns the tonight slot and the night
//! list, and handles queued commands one at a time. Store calls are awaited
//! inside the task and state is only assigned once they succeed, so a
//! failed or cancelled command never leaves a half-applied state behind.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use sleeptrack_nights::{Night, NightStore};

use crate::error::TrackerError;
use crate::state::TrackerState;
use crate::view::{CommandKind, TrackerEvent, TrackerView};
use crate::Result;

/// Receiving end of the tracker's discrete events
pub type EventReceiver = mpsc::UnboundedReceiver<TrackerEvent>;

enum Command {
    Start(oneshot::Sender<Result<Night>>),
    Stop(oneshot::Sender<Result<Option<Night>>>),
    Clear(oneshot::Sender<Result<usize>>),
    Refresh(oneshot::Sender<Result<()>>),
    AcknowledgeNavigation(oneshot::Sender<Option<Night>>),
}

pub struct NightTracker {
    /// Record store
    store: Arc<dyn NightStore>,
    /// Night currently being tracked
    current: Option<Night>,
    /// Last observed night list, newest first
    nights: Vec<Night>,
    /// Stopped night the observer has not acknowledged yet
    pending_navigation: Option<Night>,
    view_tx: watch::Sender<TrackerView>,
    events_tx: mpsc::UnboundedSender<TrackerEvent>,
}

impl NightTracker {
    /// Spawn the tracker task and wait for its initial load.
    ///
    /// Must be called from within a tokio runtime. Store failures during the
    /// initial load are reported on the event channel and leave the tracker
    /// `Idle`.
    pub async fn spawn(
        store: Arc<dyn NightStore>,
        queue_depth: usize,
    ) -> (TrackerHandle, EventReceiver) {
        let (commands_tx, commands_rx) = mpsc::channel(queue_depth.max(1));
        let (view_tx, view_rx) = watch::channel(TrackerView::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let cancel = CancellationToken::new();

        let tracker = NightTracker {
            store,
            current: None,
            nights: Vec::new(),
            pending_navigation: None,
            view_tx,
            events_tx,
        };

        tokio::spawn(tracker.run(commands_rx, cancel.clone(), ready_tx));

        // The task only drops `ready_tx` without sending if it was torn down
        let _ = ready_rx.await;

        let handle = TrackerHandle {
            commands: commands_tx,
            view: view_rx,
            cancel,
        };

        (handle, events_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        cancel: CancellationToken,
        ready: oneshot::Sender<()>,
    ) {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Tracker torn down before initial load");
                return;
            }
            _ = self.initialize() => {}
        }
        let _ = ready.send(());

        loop {
            let command = tokio::select! {
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    // Store may already hold the write; the in-memory update is skipped
                    tracing::info!("Tracker torn down with a command in flight");
                    break;
                }
                _ = self.handle(command) => {}
            }
        }

        tracing::info!(state = %self.state(), "Tracker stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let result = self.start().await;
                self.report(CommandKind::Start, &result);
                send_reply(reply, result);
            }
            Command::Stop(reply) => {
                let result = self.stop().await;
                self.report(CommandKind::Stop, &result);
                send_reply(reply, result);
            }
            Command::Clear(reply) => {
                let result = self.clear().await;
                self.report(CommandKind::Clear, &result);
                send_reply(reply, result);
            }
            Command::Refresh(reply) => {
                let result = self.reload().await;
                self.publish();
                self.report(CommandKind::Refresh, &result);
                send_reply(reply, result);
            }
            Command::AcknowledgeNavigation(reply) => {
                let acknowledged = self.pending_navigation.take();
                if acknowledged.is_some() {
                    self.publish();
                }
                send_reply(reply, acknowledged);
            }
        }
    }

    fn state(&self) -> TrackerState {
        TrackerState::of(self.current.as_ref())
    }

    async fn initialize(&mut self) {
        let result = self.reload().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Initial load failed, starting idle");
        }
        self.report(CommandKind::Initialize, &result);
        self.publish();

        tracing::info!(
            state = %self.state(),
            nights = self.nights.len(),
            "Initialized tracker"
        );
    }

    /// Re-read tonight and the night list.
    ///
    /// Each read is applied on its own success, so a failing list query
    /// does not throw away a freshly read tonight. Returns the first error.
    async fn reload(&mut self) -> Result<()> {
        let tonight = self.load_tonight().await;
        let nights = self.load_nights().await;

        let tonight = tonight.map(|tonight| self.current = tonight);
        let nights = nights.map(|nights| self.nights = nights);

        tonight.and(nights)
    }

    /// Latest night, accepted only while it is in progress
    async fn load_tonight(&self) -> Result<Option<Night>> {
        let latest = self
            .store
            .latest()
            .await
            .map_err(TrackerError::StoreRead)?;

        Ok(latest.filter(Night::is_in_progress))
    }

    async fn load_nights(&self) -> Result<Vec<Night>> {
        let nights = self.store.all().await.map_err(TrackerError::StoreRead)?;
        tracing::debug!(count = nights.len(), "Loaded nights");
        Ok(nights)
    }

    async fn start(&mut self) -> Result<Night> {
        let from = self.state();
        if !from.can_transition_to(TrackerState::Tracking) {
            let id = self.current.as_ref().map(|n| n.id).unwrap_or_default();
            return Err(TrackerError::AlreadyTracking(id));
        }

        let night = Night::begin();
        let id = self
            .store
            .insert(&night)
            .await
            .map_err(TrackerError::StoreWrite)?;

        let mut inserted = night;
        inserted.id = id;

        let reread = self.load_tonight().await;
        self.current = match &reread {
            Ok(tonight) => tonight.clone(),
            // The insert was observed; keep tracking it so the guard holds
            Err(_) => Some(inserted),
        };

        match self.load_nights().await {
            Ok(nights) => self.nights = nights,
            Err(err) => {
                tracing::debug!(error = %err, "Night list reload after start failed");
                if let Some(current) = &self.current {
                    if !self.nights.iter().any(|n| n.id == current.id) {
                        self.nights.insert(0, current.clone());
                    }
                }
            }
        }
        self.publish();

        tracing::info!(night_id = id, from = %from, to = %self.state(), "Started tracking");

        reread?.ok_or(TrackerError::TonightMissing)
    }

    async fn stop(&mut self) -> Result<Option<Night>> {
        let Some(mut night) = self.current.clone() else {
            tracing::debug!("Stop requested while idle, ignoring");
            return Ok(None);
        };

        night.finish();
        self.store
            .update(&night)
            .await
            .map_err(TrackerError::StoreWrite)?;

        self.current = None;
        self.pending_navigation = Some(night.clone());

        match self.load_nights().await {
            Ok(nights) => self.nights = nights,
            Err(err) => {
                tracing::debug!(error = %err, "Night list reload after stop failed");
                if let Some(slot) = self.nights.iter_mut().find(|n| n.id == night.id) {
                    *slot = night.clone();
                }
            }
        }
        self.publish();

        tracing::info!(
            night_id = night.id,
            duration_secs = night.duration().num_seconds(),
            "Stopped tracking"
        );

        self.emit(TrackerEvent::NavigateToQuality {
            night: night.clone(),
        });

        Ok(Some(night))
    }

    async fn clear(&mut self) -> Result<usize> {
        let from = self.state();
        let removed = self
            .store
            .clear()
            .await
            .map_err(TrackerError::StoreWrite)?;

        self.current = None;
        self.nights.clear();
        self.pending_navigation = None;
        self.publish();

        tracing::info!(removed, from = %from, "Cleared night history");

        Ok(removed)
    }

    fn publish(&self) {
        self.view_tx.send_replace(TrackerView::derive(
            self.current.as_ref(),
            &self.nights,
            self.pending_navigation.as_ref(),
        ));
    }

    fn report<T>(&self, command: CommandKind, result: &Result<T>) {
        if let Err(err) = result {
            tracing::warn!(command = %command, error = %err, "Tracker command failed");
            self.emit(TrackerEvent::CommandFailed {
                command,
                error: err.to_string(),
            });
        }
    }

    fn emit(&self, event: TrackerEvent) {
        if self.events_tx.send(event).is_err() {
            tracing::debug!("No event receiver, dropping tracker event");
        }
    }
}

fn send_reply<T>(reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        tracing::debug!("Caller went away before tracker reply");
    }
}

/// Cloneable handle used to drive a running [`NightTracker`]
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<TrackerView>,
    cancel: CancellationToken,
}

impl TrackerHandle {
    /// Start tracking a new night. Rejected while a night is in progress.
    pub async fn start(&self) -> Result<Night> {
        self.request(Command::Start).await?
    }

    /// Stop the night in progress. `Ok(None)` when idle.
    pub async fn stop(&self) -> Result<Option<Night>> {
        self.request(Command::Stop).await?
    }

    /// Delete every night, including one in progress
    pub async fn clear(&self) -> Result<usize> {
        self.request(Command::Clear).await?
    }

    /// Re-read tonight and the night list after an outside change to the store
    pub async fn refresh(&self) -> Result<()> {
        self.request(Command::Refresh).await?
    }

    /// Drop the pending navigation from the view; `None` if there was none
    pub async fn acknowledge_navigation(&self) -> Result<Option<Night>> {
        self.request(Command::AcknowledgeNavigation).await
    }

    /// Snapshot of the latest published view
    pub fn view(&self) -> TrackerView {
        self.view.borrow().clone()
    }

    pub fn state(&self) -> TrackerState {
        self.view.borrow().state
    }

    pub fn current(&self) -> Option<Night> {
        self.view.borrow().current.clone()
    }

    pub fn can_start(&self) -> bool {
        self.view.borrow().can_start
    }

    pub fn can_stop(&self) -> bool {
        self.view.borrow().can_stop
    }

    pub fn can_clear(&self) -> bool {
        self.view.borrow().can_clear
    }

    /// Receiver that is notified on every republished view
    pub fn subscribe(&self) -> watch::Receiver<TrackerView> {
        self.view.clone()
    }

    /// Tear the tracker down, cancelling any command in flight
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.commands.is_closed()
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| TrackerError::Stopped)?;
        rx.await.map_err(|_| TrackerError::Stopped)
    }
}
