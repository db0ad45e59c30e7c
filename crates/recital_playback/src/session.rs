//! Async driver: runs a [`PlaybackMachine`] on a tokio task.
//!
//! The session is the machine's single message loop. It multiplexes UI
//! requests, speech events and a periodic tick, and publishes a fresh
//! [`PlaybackSnapshot`] after each message. Presenters hold a cloneable
//! [`NarrationHandle`] instead of reaching for global state.

use crate::{PlaybackCommand, PlaybackMachine, PlaybackMessage, PlaybackNotification, PlaybackSnapshot};
use recital_core::{DurationManifest, SceneTable, Script};
use recital_error::{ConfigError, RecitalResult, SessionError, SessionErrorKind};
use recital_interface::{SpeechBackend, SpeechEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const REQUEST_CAPACITY: usize = 64;
const NOTIFICATION_CAPACITY: usize = 256;

enum SessionRequest {
    Load {
        script: Box<Script>,
        table: Option<Arc<SceneTable>>,
        manifest: Option<DurationManifest>,
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    Command(PlaybackCommand),
    Shutdown,
}

impl std::fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load { script, .. } => write!(f, "Load({})", script.id()),
            Self::Command(command) => write!(f, "Command({})", command),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Cloneable handle to a running narration session.
#[derive(Debug, Clone)]
pub struct NarrationHandle {
    requests: mpsc::Sender<SessionRequest>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    notifications: broadcast::Sender<PlaybackNotification>,
}

impl NarrationHandle {
    /// Loads a script, using the session catalog's scene table unless one is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns a config error for a malformed script, or a session error if
    /// the session has stopped.
    pub async fn load(
        &self,
        script: Script,
        table: Option<SceneTable>,
        manifest: Option<DurationManifest>,
    ) -> RecitalResult<()> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(SessionRequest::Load {
                script: Box::new(script),
                table: table.map(Arc::new),
                manifest,
                reply,
            })
            .await
            .map_err(|_| SessionError::new(SessionErrorKind::Closed))?;
        response
            .await
            .map_err(|_| SessionError::new(SessionErrorKind::NoReply("load".to_string())))??;
        Ok(())
    }

    /// Queues a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has stopped.
    pub async fn send(&self, command: PlaybackCommand) -> Result<(), SessionError> {
        self.requests
            .send(SessionRequest::Command(command))
            .await
            .map_err(|_| SessionError::new(SessionErrorKind::Closed))
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified of every new snapshot.
    pub fn watch(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribes to notifications sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackNotification> {
        self.notifications.subscribe()
    }

    /// Asks the session to stop after the requests already queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has already stopped.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.requests
            .send(SessionRequest::Shutdown)
            .await
            .map_err(|_| SessionError::new(SessionErrorKind::Closed))
    }
}

/// Message loop owning a [`PlaybackMachine`].
#[derive(Debug)]
pub struct NarrationSession<B> {
    machine: PlaybackMachine<B>,
    requests: mpsc::Receiver<SessionRequest>,
    events: mpsc::UnboundedReceiver<SpeechEvent>,
    snapshots: watch::Sender<PlaybackSnapshot>,
    notifications: broadcast::Sender<PlaybackNotification>,
}

impl<B: SpeechBackend + 'static> NarrationSession<B> {
    /// Starts the session on the current tokio runtime.
    ///
    /// `events` is the receiving end of the channel the machine's speech
    /// backend reports to. The join handle yields the machine once the
    /// session stops.
    pub fn spawn(
        machine: PlaybackMachine<B>,
        events: mpsc::UnboundedReceiver<SpeechEvent>,
    ) -> (NarrationHandle, JoinHandle<PlaybackMachine<B>>) {
        let (request_tx, requests) = mpsc::channel(REQUEST_CAPACITY);
        let (snapshots, snapshot_rx) = watch::channel(machine.snapshot());
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let handle = NarrationHandle {
            requests: request_tx,
            snapshots: snapshot_rx,
            notifications: notifications.clone(),
        };
        let session = Self {
            machine,
            requests,
            events,
            snapshots,
            notifications,
        };
        (handle, tokio::spawn(session.run()))
    }

    #[tracing::instrument(skip_all, name = "narration_session")]
    async fn run(mut self) -> PlaybackMachine<B> {
        let mut ticker = tokio::time::interval(self.machine.config().tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(backend = self.machine.backend().name(), "Narration session started");

        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(SessionRequest::Load { script, table, manifest, reply }) => {
                        let table = table.unwrap_or_else(|| self.machine.table_for(script.id()));
                        let result = self.machine.load_script_with(*script, table, manifest);
                        self.publish();
                        if reply.send(result).is_err() {
                            debug!("Load requester went away");
                        }
                        continue;
                    }
                    Some(SessionRequest::Command(command)) => {
                        self.machine.handle(PlaybackMessage::Command(command));
                    }
                    Some(SessionRequest::Shutdown) | None => break,
                },
                Some(event) = self.events.recv() => {
                    self.machine.handle(PlaybackMessage::Speech(event));
                }
                _ = ticker.tick() => {
                    self.machine.handle(PlaybackMessage::Tick);
                }
            }
            self.publish();
        }

        self.machine.exit_narration();
        self.publish();
        info!("Narration session stopped");
        self.machine
    }

    fn publish(&mut self) {
        self.snapshots.send_replace(self.machine.snapshot());
        for notification in self.machine.drain_notifications() {
            // No subscribers is fine.
            let _ = self.notifications.send(notification);
        }
    }
}
