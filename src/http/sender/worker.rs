use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{
    error::HttpError,
    metrics::RequestResult,
    shutdown::ShutdownSender,
};

use super::super::rate::Admission;
use super::super::workload::{Payload, PayloadQueue};
use super::request::RequestTemplate;

pub(crate) struct WorkerContext {
    pub(crate) id: usize,
    pub(crate) client: Client,
    pub(crate) template: Arc<RequestTemplate>,
    pub(crate) admission: Admission,
    pub(crate) payloads: PayloadQueue,
    pub(crate) results_tx: mpsc::Sender<RequestResult>,
    pub(crate) succeeded: Arc<AtomicU64>,
    pub(crate) shutdown_tx: ShutdownSender,
}

/// Spawns one pool member. It resolves to the number of results it
/// emitted, or to the request construction error that stopped the run.
pub(crate) fn spawn_worker(ctx: WorkerContext) -> JoinHandle<Result<u64, HttpError>> {
    tokio::spawn(run_worker(ctx))
}

async fn run_worker(ctx: WorkerContext) -> Result<u64, HttpError> {
    let mut shutdown_rx = ctx.shutdown_tx.subscribe();
    let mut dispatched: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            () = shutdown_rx.wait() => None,
            payload = ctx.payloads.next() => payload,
        };
        let Some(payload) = next else {
            break;
        };

        let admitted = tokio::select! {
            biased;
            () = shutdown_rx.wait() => false,
            admitted = ctx.admission.acquire() => admitted,
        };
        if !admitted {
            break;
        }

        let result = match dispatch(&ctx, payload).await {
            Ok(result) => result,
            Err(err) => {
                ctx.shutdown_tx.trigger();
                return Err(err);
            }
        };
        if result.succeeded {
            ctx.succeeded.fetch_add(1, Ordering::Relaxed);
        }
        dispatched = dispatched.saturating_add(1);

        if ctx.results_tx.send(result).await.is_err() {
            warn!("Result sink closed; worker {} stopping", ctx.id);
            break;
        }
    }

    debug!("Worker {} finished after {} requests", ctx.id, dispatched);
    Ok(dispatched)
}

async fn dispatch(ctx: &WorkerContext, payload: Payload) -> Result<RequestResult, HttpError> {
    let Payload { seq, body } = payload;
    let request = ctx.template.build(&ctx.client, body)?;

    debug!("starting request {}", seq);
    let started_at = Utc::now();
    let clock = Instant::now();
    let response = ctx.client.execute(request).await;
    let elapsed = clock.elapsed();

    match response {
        Ok(response) => {
            let status_code = response.status().as_u16();
            if let Err(err) = response.bytes().await {
                debug!("Failed to drain response body of request {}: {}", seq, err);
            }
            Ok(RequestResult::completed(seq, started_at, elapsed, status_code))
        }
        Err(err) if err.is_builder() => Err(HttpError::BuildRequestFailed { source: err }),
        Err(err) => {
            let message = describe_error(&err);
            debug!("http client error on request {}: {}", seq, message);
            Ok(RequestResult::failed(seq, started_at, elapsed, message))
        }
    }
}

fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
