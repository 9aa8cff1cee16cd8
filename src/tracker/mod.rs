use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use events::UsageEvent;
use idle::IdleDetector;
use processor::UsageProcessor;
use sampler::ActivitySampler;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    host::{stdio::StdioHost, EditorHost},
    store::{aggregator::Aggregator, persist, persist::STORE_FILE_NAME},
    utils::clock::{Clock, DefaultClock},
};

pub mod delta;
pub mod events;
pub mod idle;
pub mod processor;
pub mod sampler;
pub mod shutdown;

const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
const FLUSH_INTERVAL: Duration = Duration::from_secs(30);
const IDLE_THRESHOLD_SECONDS: i64 = 300;

/// Represents the starting point for the tracker. Runs until ctrl-c or until
/// the host editor closes the event pipe; a final flush happens on the way
/// out.
pub async fn start_tracker(dir: PathBuf, emit_snapshots: bool) -> Result<()> {
    let (sender, receiver) = mpsc::channel::<UsageEvent>(64);

    let shutdown_token = CancellationToken::new();
    let host = StdioHost::spawn(shutdown_token.clone());

    let sampler = create_sampler(
        sender,
        Box::new(host),
        &shutdown_token,
        SAMPLE_INTERVAL,
        DefaultClock,
    );

    let processor = create_processor(
        dir.join(STORE_FILE_NAME),
        receiver,
        FLUSH_INTERVAL,
        DefaultClock,
        emit_snapshots,
    )
    .await;

    let (_, sampler_result, processor_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        sampler.run(),
        processor.run(),
    );

    if let Err(sampler_result) = sampler_result {
        error!("Sampler module got an error {:?}", sampler_result);
    }

    if let Err(processor_result) = processor_result {
        error!("Processor module got an error {:?}", processor_result);
    }

    Ok(())
}

fn create_sampler(
    sender: mpsc::Sender<UsageEvent>,
    host: Box<dyn EditorHost>,
    shutdown_token: &CancellationToken,
    sample_interval: Duration,
    clock: impl Clock,
) -> ActivitySampler {
    ActivitySampler::new(
        sender,
        host,
        shutdown_token.clone(),
        IdleDetector::from_secs(IDLE_THRESHOLD_SECONDS),
        sample_interval,
        Box::new(clock),
    )
}

async fn create_processor(
    store_path: PathBuf,
    receiver: mpsc::Receiver<UsageEvent>,
    flush_interval: Duration,
    clock: impl Clock + Clone,
    emit_snapshots: bool,
) -> UsageProcessor {
    let store = persist::load_or_default(&store_path).await;
    let aggregator = Aggregator::new(store, Box::new(clock.clone()));
    UsageProcessor::new(
        receiver,
        aggregator,
        store_path,
        flush_interval,
        Box::new(clock),
        emit_snapshots,
    )
}
