
use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use loadgen::app::{RunOutcome, run_load, summarize};
use loadgen::args::{PositiveU64, PositiveUsize};
use loadgen::config::LoadConfig;
use loadgen::error::HttpError;
use loadgen::metrics::parse_log_line;
use tempfile::tempdir;

use support_single::{Reply, refused_url, spawn_http_server};

const RUN_DEADLINE: Duration = Duration::from_secs(30);

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn load_config(url: &str, amount: u64, target_rps: u64, log_path: &Path) -> Result<LoadConfig, String> {
    let amount = PositiveU64::try_from(amount).map_err(|err| err.to_string())?;
    let target_rps = PositiveU64::try_from(target_rps).map_err(|err| err.to_string())?;
    let mut config = LoadConfig::new(url, amount, target_rps);
    config.log_path = log_path.to_path_buf();
    config.workers = PositiveUsize::try_from(4).map_err(|err| err.to_string())?;
    config.request_timeout = Some(Duration::from_secs(10));
    Ok(config)
}

async fn run_with_deadline(config: &LoadConfig) -> Result<RunOutcome, String> {
    tokio::time::timeout(RUN_DEADLINE, run_load(config))
        .await
        .map_err(|_elapsed| "Run did not finish in time".to_owned())?
        .map_err(|err| err.to_string())
}

#[test]
fn every_payload_is_sent_and_logged_once() -> Result<(), String> {
    let (url, server) = spawn_http_server(Reply::Status(200))?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let log_path = dir.path().join("results.log");
    let config = load_config(&url, 40, 400, &log_path)?;

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        if let Some(err) = outcome.fatal {
            return Err(format!("Unexpected fatal error: {}", err));
        }
        if outcome.succeeded != 40 || outcome.dispatched != 40 || outcome.produced != 40 {
            return Err(format!("Unexpected counts: {:?}", outcome));
        }
        if outcome.sink.error.is_some() || outcome.sink.written != 40 {
            return Err(format!("Unexpected sink report: {:?}", outcome.sink));
        }

        let contents = tokio::fs::read_to_string(&log_path)
            .await
            .map_err(|err| format!("read log failed: {}", err))?;
        let mut seqs = BTreeSet::new();
        for (idx, line) in contents.lines().enumerate() {
            let line_no = u64::try_from(idx).map_err(|err| err.to_string())?;
            let record = parse_log_line(line, line_no.saturating_add(1))
                .map_err(|err| err.to_string())?;
            if !record.succeeded || record.status_code != 200 {
                return Err(format!("Unexpected record: {:?}", record));
            }
            if record.ended_at < record.started_at {
                return Err(format!("End before start: {:?}", record));
            }
            seqs.insert(record.seq);
        }
        if seqs != (1..=40).collect::<BTreeSet<u64>>() {
            return Err(format!("Unexpected sequence numbers: {:?}", seqs));
        }

        let summary = summarize(&outcome.sink).await.map_err(|err| err.to_string())?;
        if summary.total() != 40 || summary.success.count() != 40 {
            return Err(format!("Unexpected summary: {:?}", summary));
        }
        Ok(())
    })?;

    if server.hits() != 40 {
        return Err(format!("Server saw {} requests", server.hits()));
    }
    let bodies: BTreeSet<String> = server.bodies()?.into_iter().collect();
    if !bodies.contains("Sending req #1 of 40") || !bodies.contains("Sending req #40 of 40") {
        return Err(format!("Unexpected bodies: {:?}", bodies));
    }
    if bodies.len() != 40 {
        return Err(format!("Expected 40 distinct bodies, got {}", bodies.len()));
    }
    Ok(())
}

#[test]
fn server_errors_are_completed_exchanges() -> Result<(), String> {
    let (url, _server) = spawn_http_server(Reply::Status(500))?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = load_config(&url, 20, 200, &dir.path().join("results.log"))?;

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        if outcome.fatal.is_some() || outcome.succeeded != 20 {
            return Err(format!("Unexpected outcome: {:?}", outcome));
        }
        let summary = summarize(&outcome.sink).await.map_err(|err| err.to_string())?;
        if summary.server_error.count() != 20 || summary.success.count() != 0 {
            return Err(format!("Unexpected summary: {:?}", summary));
        }
        if summary.network_error.count() != 0 || summary.client_error.count() != 0 {
            return Err(format!("Unexpected summary: {:?}", summary));
        }
        Ok(())
    })
}

#[test]
fn mixed_responses_are_classified() -> Result<(), String> {
    let (url, server) = spawn_http_server(Reply::Mixed)?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = load_config(&url, 200, 2_000, &dir.path().join("results.log"))?;

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        if outcome.fatal.is_some() {
            return Err(format!("Unexpected fatal error: {:?}", outcome.fatal));
        }
        let summary = summarize(&outcome.sink).await.map_err(|err| err.to_string())?;
        if summary.total() != 200 {
            return Err(format!("Expected 200 results, got {:?}", summary));
        }
        if summary.network_error.count() != 2 || summary.server_error.count() != 2 {
            return Err(format!("Unexpected classification: {:?}", summary));
        }
        if summary.success.count() != 196 || outcome.succeeded != 198 {
            return Err(format!("Unexpected successes: {:?}", summary));
        }
        Ok(())
    })?;

    if server.hits() != 200 {
        return Err(format!("Server saw {} requests", server.hits()));
    }
    Ok(())
}

#[test]
fn malformed_url_cancels_the_run() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = load_config("not_an_URL", 1_000, 10_000, &dir.path().join("results.log"))?;

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        match outcome.fatal.as_ref() {
            Some(HttpError::InvalidUrl { url, .. }) if url == "not_an_URL" => {}
            other => return Err(format!("Expected invalid URL, got {:?}", other)),
        }
        if outcome.succeeded != 0 || outcome.sink.drained != 0 {
            return Err(format!("Nothing should have been sent: {:?}", outcome));
        }
        if outcome.produced >= 1_000 {
            return Err(format!("Generator was not cancelled: {}", outcome.produced));
        }
        Ok(())
    })
}

#[test]
fn whitespace_method_cancels_the_run() -> Result<(), String> {
    let (url, server) = spawn_http_server(Reply::Status(200))?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let mut config = load_config(&url, 50, 1_000, &dir.path().join("results.log"))?;
    config.method = "\t\n\r".to_owned();

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        match outcome.fatal.as_ref() {
            Some(HttpError::InvalidMethod { .. }) => {}
            other => return Err(format!("Expected invalid method, got {:?}", other)),
        }
        if outcome.succeeded != 0 {
            return Err(format!("Unexpected successes: {}", outcome.succeeded));
        }
        Ok(())
    })?;

    if server.hits() != 0 {
        return Err(format!("Server saw {} requests", server.hits()));
    }
    Ok(())
}

#[test]
fn admission_follows_target_rate() -> Result<(), String> {
    let (url, _server) = spawn_http_server(Reply::Status(200))?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = load_config(&url, 10, 10, &dir.path().join("results.log"))?;

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        if outcome.succeeded != 10 {
            return Err(format!("Unexpected successes: {}", outcome.succeeded));
        }
        let elapsed = outcome.admission_elapsed;
        if elapsed < Duration::from_millis(900) || elapsed > Duration::from_secs(5) {
            return Err(format!("Admission took {:?}", elapsed));
        }
        Ok(())
    })
}

#[test]
fn refused_connections_are_network_errors() -> Result<(), String> {
    let url = refused_url()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = load_config(&url, 5, 100, &dir.path().join("results.log"))?;

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        if outcome.fatal.is_some() || outcome.succeeded != 0 {
            return Err(format!("Unexpected outcome: {:?}", outcome));
        }
        let summary = summarize(&outcome.sink).await.map_err(|err| err.to_string())?;
        if summary.network_error.count() != 5 || summary.total() != 5 {
            return Err(format!("Unexpected summary: {:?}", summary));
        }
        Ok(())
    })
}

#[test]
fn unwritable_log_falls_back_to_live_summary() -> Result<(), String> {
    let (url, _server) = spawn_http_server(Reply::Status(404))?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let log_path = dir.path().join("missing").join("results.log");
    let config = load_config(&url, 12, 500, &log_path)?;

    run_async_test(async {
        let outcome = run_with_deadline(&config).await?;
        if outcome.fatal.is_some() {
            return Err(format!("Unexpected fatal error: {:?}", outcome.fatal));
        }
        if outcome.sink.error.is_none() || outcome.sink.drained != 12 {
            return Err(format!("Unexpected sink report: {:?}", outcome.sink));
        }
        let summary = summarize(&outcome.sink).await.map_err(|err| err.to_string())?;
        if summary.client_error.count() != 12 {
            return Err(format!("Unexpected summary: {:?}", summary));
        }
        Ok(())
    })
}
