use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::{
    config::LoadConfig,
    error::{AppError, AppResult, HttpError},
    http::{
        PayloadGenerator, PayloadQueue, RateGate, RequestTemplate, WorkerContext, build_client,
        spawn_payload_generator, spawn_worker,
    },
    metrics::{SinkReport, spawn_result_sink},
    shutdown::shutdown_channel,
};

/// Everything the pipeline knows once every task has finished.
#[derive(Debug)]
pub struct RunOutcome {
    /// Requests that got an HTTP response, whatever its status.
    pub succeeded: u64,
    /// Results handed to the sink.
    pub dispatched: u64,
    /// Payloads the generator enqueued.
    pub produced: u64,
    /// Time from gate start until the last worker returned.
    pub admission_elapsed: Duration,
    pub sink: SinkReport,
    /// First request construction failure; the run was cancelled because of it.
    pub fatal: Option<HttpError>,
}

/// Runs one load test to completion.
///
/// Per-request transport failures end up in the result log. A request that
/// cannot be constructed cancels the run and is returned in
/// [`RunOutcome::fatal`] rather than as an error, so the caller still sees
/// how many requests succeeded.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or a pipeline task
/// panics.
pub async fn run_load(config: &LoadConfig) -> AppResult<RunOutcome> {
    let client = build_client(config).map_err(AppError::http)?;
    let template = Arc::new(RequestTemplate::from_config(config));
    let capacity = config.queue_capacity();
    let worker_count = config.workers.get();

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let (payload_tx, payload_rx) = mpsc::channel(capacity);
    let (result_tx, result_rx) = mpsc::channel(capacity);
    let succeeded = Arc::new(AtomicU64::new(0));

    let run_start = Instant::now();
    let gate = RateGate::start(config.target_rps.get()).map_err(AppError::validation)?;

    let sink_handle = spawn_result_sink(config.log_path.clone(), result_rx);
    let payloads = PayloadQueue::new(payload_rx);
    let generator_handle = spawn_payload_generator(
        PayloadGenerator::new(config.payload_template.clone(), config.amount.get()),
        payload_tx,
        shutdown_rx,
    );

    debug!(
        "Dispatching {} requests to {} with {} workers at {} req/s",
        config.amount.get(),
        config.url,
        worker_count,
        config.target_rps.get()
    );
    let mut workers = Vec::with_capacity(worker_count);
    for id in 0..worker_count {
        workers.push(spawn_worker(WorkerContext {
            id,
            client: client.clone(),
            template: Arc::clone(&template),
            admission: gate.admission(),
            payloads: payloads.clone(),
            results_tx: result_tx.clone(),
            succeeded: Arc::clone(&succeeded),
            shutdown_tx: shutdown_tx.clone(),
        }));
    }
    drop(result_tx);

    let mut dispatched: u64 = 0;
    let mut fatal: Option<HttpError> = None;
    for handle in workers {
        match handle.await? {
            Ok(count) => dispatched = dispatched.saturating_add(count),
            Err(err) if fatal.is_none() => {
                error!("new request error: {}", err);
                fatal = Some(err);
            }
            Err(err) => debug!("Suppressed repeated request error: {}", err),
        }
    }
    let admission_elapsed = run_start.elapsed();

    shutdown_tx.trigger();
    payloads.close().await;
    let produced = generator_handle.await?;
    gate.stop();

    let sink = sink_handle.await?;
    let succeeded = succeeded.load(Ordering::Relaxed);
    info!("Success requests: {}", succeeded);

    Ok(RunOutcome {
        succeeded,
        dispatched,
        produced,
        admission_elapsed,
        sink,
        fatal,
    })
}
