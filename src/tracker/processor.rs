use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use crate::{
    store::{aggregator::Aggregator, persist},
    utils::clock::Clock,
};

use super::events::UsageEvent;

enum Step {
    Event(Option<UsageEvent>),
    FlushTick,
}

/// Consumes usage events and applies them to the aggregator. This task is the
/// only writer of store and session state, so increments are never partially
/// visible and flushes cannot overlap.
pub struct UsageProcessor {
    receiver: Receiver<UsageEvent>,
    aggregator: Aggregator,
    store_path: PathBuf,
    flush_interval: Duration,
    clock: Box<dyn Clock>,
    emit_snapshots: bool,
    last_project: Option<PathBuf>,
}

impl UsageProcessor {
    pub fn new(
        receiver: Receiver<UsageEvent>,
        aggregator: Aggregator,
        store_path: PathBuf,
        flush_interval: Duration,
        clock: Box<dyn Clock>,
        emit_snapshots: bool,
    ) -> Self {
        Self {
            receiver,
            aggregator,
            store_path,
            flush_interval,
            clock,
            emit_snapshots,
            last_project: None,
        }
    }

    fn apply(&mut self, event: UsageEvent) {
        match event {
            UsageEvent::TimeCredit {
                project,
                language,
                relative_path,
                seconds,
            } => {
                self.aggregator
                    .record_time(&project, &language, &relative_path, seconds);
                self.last_project = Some(project);
            }
            UsageEvent::Edit {
                project,
                keystrokes,
                lines_added,
                lines_deleted,
            } => {
                if keystrokes > 0 {
                    self.aggregator.record_keystrokes(&project, keystrokes);
                }
                self.aggregator
                    .record_lines(&project, lines_added, lines_deleted);
                self.last_project = Some(project);
            }
        }
    }

    async fn flush(&self) {
        if let Err(e) = persist::flush(&self.store_path, self.aggregator.store()).await {
            error!("Couldn't flush usage data to {:?}: {e:?}", self.store_path);
        }
    }

    /// Pushes the state snapshot to the presentation side over stdout.
    fn push_snapshot(&self) {
        let snapshot = self.aggregator.snapshot(self.last_project.as_deref());
        match serde_json::to_string(&snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("Couldn't serialize snapshot {e:?}"),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut flush_point = self.clock.instant() + self.flush_interval;
        loop {
            // The arms only produce a step; handling happens after the
            // pending futures are dropped.
            let step = tokio::select! {
                event = self.receiver.recv() => Step::Event(event),
                _ = self.clock.sleep_until(flush_point) => Step::FlushTick,
            };

            match step {
                Step::Event(Some(event)) => {
                    debug!("Applying event {:?}", event);
                    self.apply(event);
                    if self.emit_snapshots {
                        self.push_snapshot();
                    }
                }
                // Sender dropped, the sampler has shut down.
                Step::Event(None) => break,
                Step::FlushTick => {
                    flush_point += self.flush_interval;
                    self.flush().await;
                }
            }
        }

        info!("Final flush before shutdown");
        self.flush().await;
        self.receiver.close();
        Ok(())
    }

    #[cfg(test)]
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}
