use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use image::{imageops, RgbImage};
use log::{error, info, warn};
use tokio::sync::{watch, Mutex};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::frame::CapturedFrame;
use crate::source::FrameSource;
use crate::writer::FrameWriter;
use crate::{gate, overlay};

use super::state::{CaptureSnapshot, SessionState};

const PREVIEW_MAX_WIDTH: u32 = 600;
const PREVIEW_MAX_HEIGHT: u32 = 800;

/// Everything the blocking part of a cycle needs to own while it runs off
/// the async thread; handed back when the cycle completes.
struct CycleResources<S> {
    source: S,
    writer: FrameWriter,
}

struct CycleReport {
    lightness: f32,
    saved_path: Option<PathBuf>,
    preview: RgbImage,
}

/// Interval-driven capture task. Sole mutator of the session state; owns the
/// frame source for the lifetime of the session and drops it on exit.
///
/// The ticker polls at most once a second (faster only when the interval
/// itself is shorter) and decides per tick whether an attempt is due. Cycles
/// run inline, so a tick arriving while a cycle is still busy is dropped by
/// `MissedTickBehavior::Delay` rather than queued.
pub(crate) async fn capture_loop<S: FrameSource>(
    session_id: String,
    config: CaptureConfig,
    source: S,
    state: Arc<Mutex<SessionState>>,
    snapshots: Arc<watch::Sender<CaptureSnapshot>>,
    cancel_token: CancellationToken,
) {
    let tick_period = config.interval().min(Duration::from_secs(1));
    let mut ticker = time::interval(tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let step = config.interval_step();
    let threshold = config.brightness_threshold;
    let overlay_timestamp = config.overlay_timestamp;
    let mut resources = CycleResources {
        writer: FrameWriter::new(&config),
        source,
    };

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Capture loop for session {session_id} shutting down");
                break;
            }
            _ = ticker.tick() => {
                let now = Utc::now();
                let (due, index) = {
                    let guard = state.lock().await;
                    (guard.capture_due(now), guard.next_index)
                };
                if !due {
                    continue;
                }

                let taken = resources;
                let joined = tokio::task::spawn_blocking(move || {
                    let mut taken = taken;
                    let report = run_cycle(
                        &mut taken.source,
                        &mut taken.writer,
                        overlay_timestamp,
                        threshold,
                        index,
                    );
                    (taken, report)
                })
                .await;

                let (returned, report) = match joined {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!("Capture worker for session {session_id} panicked: {err}");
                        let mut guard = state.lock().await;
                        guard.status_text = "Capture worker failed; session halted".into();
                        let snap = CaptureSnapshot::from_state(&guard, Utc::now());
                        drop(guard);
                        publish_snapshot(&snapshots, snap, None);
                        break;
                    }
                };
                resources = returned;

                match report {
                    Ok(report) => {
                        let mut guard = state.lock().await;
                        match &report.saved_path {
                            Some(path) => {
                                guard.next_index += 1;
                                guard.frames_written += 1;
                                guard.status_text =
                                    format!("Saved {}", path.display());
                                info!(
                                    "Session {session_id}: saved {} (lightness {:.2})",
                                    path.display(),
                                    report.lightness
                                );
                            }
                            None => {
                                guard.status_text = format!(
                                    "Skipped capture: frame too dark (lightness {:.2})",
                                    report.lightness
                                );
                                info!(
                                    "Session {session_id}: skipped frame below threshold \
                                     (lightness {:.2})",
                                    report.lightness
                                );
                            }
                        }
                        guard.schedule_next(now, step);
                        let snap = CaptureSnapshot::from_state(&guard, Utc::now());
                        drop(guard);
                        publish_snapshot(&snapshots, snap, Some(Arc::new(report.preview)));
                    }
                    Err(CaptureError::DeviceUnavailable(reason)) => {
                        // The frame never reached gating; retry on the next
                        // tick instead of waiting out a full interval.
                        warn!("Session {session_id}: frame source unavailable: {reason}");
                        let mut guard = state.lock().await;
                        guard.status_text = "Camera unavailable, retrying...".into();
                        let snap = CaptureSnapshot::from_state(&guard, Utc::now());
                        drop(guard);
                        publish_snapshot(&snapshots, snap, None);
                    }
                    Err(err) => {
                        // Write failures keep the index so the same slot is
                        // retried on the next attempt.
                        error!("Session {session_id}: capture cycle failed: {err}");
                        let mut guard = state.lock().await;
                        guard.status_text = format!("Failed to save image: {err}");
                        guard.schedule_next(now, step);
                        let snap = CaptureSnapshot::from_state(&guard, Utc::now());
                        drop(guard);
                        publish_snapshot(&snapshots, snap, None);
                    }
                }
            }
        }
    }
}

/// Independent display refresh: publishes countdown/status updates at a
/// higher cadence than captures, unaffected by a blocked device read.
pub(crate) async fn display_loop(
    state: Arc<Mutex<SessionState>>,
    snapshots: Arc<watch::Sender<CaptureSnapshot>>,
    cancel_token: CancellationToken,
    refresh: Duration,
) {
    let mut ticker = time::interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                let snap = {
                    let guard = state.lock().await;
                    CaptureSnapshot::from_state(&guard, Utc::now())
                };
                publish_snapshot(&snapshots, snap, None);
            }
        }
    }
}

/// The blocking half of one capture attempt: acquire, overlay, gate, and
/// (if admitted) persist. Runs on a blocking thread.
fn run_cycle<S: FrameSource>(
    source: &mut S,
    writer: &mut FrameWriter,
    overlay_timestamp: bool,
    threshold: f32,
    index: u64,
) -> Result<CycleReport, CaptureError> {
    let mut frame = CapturedFrame::new(source.capture_frame()?);
    if overlay_timestamp {
        overlay::stamp_timestamp(&mut frame.image, frame.timestamp.with_timezone(&Local));
    }

    let decision = gate::evaluate(&frame.image, threshold);
    let saved_path = if decision.admitted {
        Some(writer.write(index, &frame.image)?)
    } else {
        None
    };

    Ok(CycleReport {
        lightness: decision.lightness,
        saved_path,
        preview: preview_of(&frame.image),
    })
}

/// Downscales a frame for the display boundary, preserving aspect ratio.
fn preview_of(image: &RgbImage) -> RgbImage {
    if image.width() <= PREVIEW_MAX_WIDTH && image.height() <= PREVIEW_MAX_HEIGHT {
        return image.clone();
    }
    let scale = f32::min(
        PREVIEW_MAX_WIDTH as f32 / image.width() as f32,
        PREVIEW_MAX_HEIGHT as f32 / image.height() as f32,
    );
    let width = ((image.width() as f32 * scale) as u32).max(1);
    let height = ((image.height() as f32 * scale) as u32).max(1);
    imageops::thumbnail(image, width, height)
}

/// Replaces the published snapshot, keeping the previous preview when the
/// new update does not carry one.
fn publish_snapshot(
    snapshots: &watch::Sender<CaptureSnapshot>,
    mut snap: CaptureSnapshot,
    preview: Option<Arc<RgbImage>>,
) {
    snapshots.send_modify(|current| {
        snap.preview = preview.or_else(|| current.preview.clone());
        *current = snap;
    });
}
