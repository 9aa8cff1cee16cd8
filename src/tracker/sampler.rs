use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::{
    host::{DocumentChange, EditorHost, HostEvent},
    utils::clock::Clock,
};

use super::{delta::edit_deltas, events::UsageEvent, idle::IdleDetector};

/// Polls the host editor at a fixed period and turns its raw signals into
/// [UsageEvent]s. Each tick credits at most one second of active time; ticks
/// missed while idle or suspended are never caught up.
pub struct ActivitySampler {
    next: mpsc::Sender<UsageEvent>,
    host: Box<dyn EditorHost>,
    shutdown: CancellationToken,
    idle_detector: IdleDetector,
    sample_interval: Duration,
    clock: Box<dyn Clock>,
    last_activity: DateTime<Local>,
}

impl ActivitySampler {
    pub fn new(
        next: mpsc::Sender<UsageEvent>,
        host: Box<dyn EditorHost>,
        shutdown: CancellationToken,
        idle_detector: IdleDetector,
        sample_interval: Duration,
        clock: Box<dyn Clock>,
    ) -> Self {
        // Process start counts as activity, so tracking begins immediately.
        let last_activity = clock.now();
        Self {
            next,
            host,
            shutdown,
            idle_detector,
            sample_interval,
            clock,
            last_activity,
        }
    }

    fn sample(&mut self) -> Result<Vec<UsageEvent>> {
        let mut events = Vec::new();
        let now = self.clock.now();

        for event in self.host.drain_events()? {
            self.last_activity = now;
            if let HostEvent::DocumentChanged(change) = event {
                if let Some(event) = edit_event(change) {
                    events.push(event);
                }
            }
        }

        if !self.idle_detector.is_idle(now - self.last_activity) {
            if let Some(document) = self.host.focused_document()? {
                events.push(UsageEvent::TimeCredit {
                    project: document.project_root,
                    language: document.language_id,
                    relative_path: document.relative_path,
                    seconds: 1,
                });
            }
        }

        Ok(events)
    }

    /// Executes the sampler event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut sample_point = self.clock.instant();
        loop {
            sample_point += self.sample_interval;

            match self.sample() {
                Ok(events) => {
                    for event in events {
                        debug!("Sending event {:?}", event);
                        self.next
                            .send(event)
                            .await
                            .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                    }
                }
                Err(e) => {
                    error!("Encountered an error during sampling {:?}", e)
                }
            }

            tokio::select! {
                // Cancelation means we stop execution of the event loop. Which
                // means we also drop the sender channel and consequently stop
                // the processor.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.clock.sleep_until(sample_point) => ()
            }
        }
    }
}

/// Maps a content-change notification to an edit event. Changes outside any
/// project root or in non-file documents are dropped silently.
fn edit_event(change: DocumentChange) -> Option<UsageEvent> {
    if !change.file_backed {
        return None;
    }
    let project = change.project_root?;
    let deltas = edit_deltas(&change.changes);
    if deltas.is_empty() {
        return None;
    }
    Some(UsageEvent::Edit {
        project,
        keystrokes: deltas.keystrokes,
        lines_added: deltas.lines_added,
        lines_deleted: deltas.lines_deleted,
    })
}
