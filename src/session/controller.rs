use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::info;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::CaptureConfig;
use crate::sequence::resolve_next_index;
use crate::source::FrameSource;

use super::loop_worker::{capture_loop, display_loop};
use super::state::{CaptureSnapshot, SessionState, SessionStatus};

const DISPLAY_REFRESH: Duration = Duration::from_secs(1);

struct SessionHandles {
    capture: JoinHandle<()>,
    display: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Owns the capture configuration and session state, and runs one session at
/// a time: an interval-driven capture loop plus a 1 Hz display ticker,
/// stopped together through a shared cancellation token.
pub struct CaptureController {
    config: Mutex<CaptureConfig>,
    state: Arc<Mutex<SessionState>>,
    snapshots: Arc<watch::Sender<CaptureSnapshot>>,
    snapshot_rx: watch::Receiver<CaptureSnapshot>,
    session: Mutex<Option<SessionHandles>>,
}

impl CaptureController {
    pub fn new(config: CaptureConfig) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(CaptureSnapshot::default());
        Self {
            config: Mutex::new(config),
            state: Arc::new(Mutex::new(SessionState::default())),
            snapshots: Arc::new(snapshot_tx),
            snapshot_rx,
            session: Mutex::new(None),
        }
    }

    /// Feed of read-only snapshots for a display front end.
    pub fn subscribe(&self) -> watch::Receiver<CaptureSnapshot> {
        self.snapshot_rx.clone()
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn get_config(&self) -> CaptureConfig {
        self.config.lock().await.clone()
    }

    /// Replaces the configuration. Refused while a session is running; the
    /// running session keeps the config it started with.
    pub async fn reconfigure(&self, config: CaptureConfig) -> Result<()> {
        config.validate()?;
        let session = self.session.lock().await;
        if session.is_some() {
            bail!("configuration is locked while a capture session is running");
        }
        *self.config.lock().await = config;
        Ok(())
    }

    /// Starts a session over `source`, resuming the sequence index from the
    /// image folder. The in-memory index from any previous session is never
    /// trusted; the files on disk are the only anchor.
    pub async fn start<S: FrameSource>(&self, source: S) -> Result<()> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            bail!("capture session already running");
        }

        let config = self.config.lock().await.clone();
        config.validate()?;

        let next_index = {
            let folder = config.image_folder.clone();
            let prefix = config.image_name_prefix.clone();
            let extension = config.image_extension.clone();
            tokio::task::spawn_blocking(move || {
                resolve_next_index(&folder, &prefix, &extension)
            })
            .await
            .context("sequence resolver task failed to join")??
        };

        let session_id = Uuid::new_v4().to_string();
        info!(
            "Starting capture session {session_id}: interval {}s, resuming at index {next_index}",
            config.interval_secs
        );

        {
            let mut state = self.state.lock().await;
            *state = SessionState::begin(next_index);
            let snap = CaptureSnapshot::from_state(&state, Utc::now());
            self.snapshots.send_replace(snap);
        }

        let cancel_token = CancellationToken::new();
        let capture = tokio::spawn(capture_loop(
            session_id,
            config,
            source,
            self.state.clone(),
            self.snapshots.clone(),
            cancel_token.clone(),
        ));
        let display = tokio::spawn(display_loop(
            self.state.clone(),
            self.snapshots.clone(),
            cancel_token.clone(),
            DISPLAY_REFRESH,
        ));

        *session = Some(SessionHandles {
            capture,
            display,
            cancel_token,
        });
        Ok(())
    }

    /// Stops the running session. An in-flight capture cycle finishes its
    /// write before the loop observes the cancellation and exits.
    pub async fn stop(&self) -> Result<()> {
        let handles = {
            let mut session = self.session.lock().await;
            match session.take() {
                Some(handles) => handles,
                None => bail!("no capture session is running"),
            }
        };

        handles.cancel_token.cancel();
        handles
            .capture
            .await
            .context("capture loop task failed to join")?;
        handles
            .display
            .await
            .context("display ticker task failed to join")?;

        let mut state = self.state.lock().await;
        state.status = SessionStatus::Stopped;
        state.next_trigger = None;
        state.status_text = "Timelapse stopped".into();
        info!(
            "Capture session stopped after {} saved frame(s)",
            state.frames_written
        );
        let mut snap = CaptureSnapshot::from_state(&state, Utc::now());
        drop(state);
        // Keep showing the last captured frame after the session ends.
        self.snapshots.send_modify(|current| {
            snap.preview = current.preview.take();
            *current = snap;
        });
        Ok(())
    }
}
