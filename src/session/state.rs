use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Stopped,
    Running,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Stopped
    }
}

/// Live state of one capture session, owned by the capture loop. Exists from
/// `start()` to `stop()`; the next session rebuilds it from disk rather than
/// trusting anything left here.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    /// Earliest wall-clock time the next capture attempt may run. `None`
    /// right after start, which makes the first attempt due immediately.
    pub next_trigger: Option<DateTime<Utc>>,
    /// Index the next admitted frame will be written under.
    pub next_index: u64,
    pub frames_written: u64,
    pub status_text: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Stopped,
            next_trigger: None,
            next_index: 0,
            frames_written: 0,
            status_text: String::new(),
        }
    }
}

impl SessionState {
    /// Fresh state for a session resuming at `next_index`.
    pub fn begin(next_index: u64) -> Self {
        Self {
            status: SessionStatus::Running,
            next_trigger: None,
            next_index,
            frames_written: 0,
            status_text: "Timelapse running...".into(),
        }
    }

    /// Whether a capture attempt should run at `now`. An unset trigger means
    /// the attempt is already due.
    pub fn capture_due(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Running
            && self.next_trigger.map_or(true, |trigger| now >= trigger)
    }

    /// Schedules the next attempt relative to the one that just ran; called
    /// after every attempt whether or not the frame was admitted.
    pub fn schedule_next(&mut self, attempt_time: DateTime<Utc>, step: chrono::Duration) {
        self.next_trigger = Some(attempt_time + step);
    }

    /// Time left until the next attempt as `H:MM:SS`, or an empty string when
    /// nothing is scheduled or the attempt is already due.
    pub fn countdown_text(&self, now: DateTime<Utc>) -> String {
        let Some(trigger) = self.next_trigger else {
            return String::new();
        };
        let left = trigger - now;
        if left <= chrono::Duration::zero() {
            return String::new();
        }
        let secs = left.num_seconds();
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Read-only view handed to the display boundary. Consumers get clones over
/// a watch channel and never touch the live state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub status: SessionStatus,
    pub status_text: String,
    pub countdown_text: String,
    pub next_index: u64,
    pub frames_written: u64,
    #[serde(skip)]
    pub preview: Option<Arc<RgbImage>>,
}

impl CaptureSnapshot {
    pub(crate) fn from_state(state: &SessionState, now: DateTime<Utc>) -> Self {
        Self {
            status: state.status,
            status_text: state.status_text.clone(),
            countdown_text: state.countdown_text(now),
            next_index: state.next_index,
            frames_written: state.frames_written,
            preview: None,
        }
    }
}
