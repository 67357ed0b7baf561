use std::path::PathBuf;

use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{debug, error};

use crate::error::SinkError;

use super::super::{LatencySummary, RequestResult};
use super::encode_log_line;

const LOG_BUFFER_SIZE: usize = 64 * 1024;

/// What the sink did with the results it drained.
#[derive(Debug)]
pub struct SinkReport {
    pub path: PathBuf,
    /// Results received from the workers.
    pub drained: u64,
    /// Results that made it into the log file.
    pub written: u64,
    /// First persistence failure; later results were drained and discarded.
    pub error: Option<SinkError>,
    /// Aggregate over everything drained, independent of the file.
    pub live: LatencySummary,
}

struct LogFile {
    path: PathBuf,
    writer: BufWriter<File>,
    buffer: String,
}

impl LogFile {
    async fn create(path: PathBuf) -> Result<Self, SinkError> {
        let file = File::create(&path)
            .await
            .map_err(|source| SinkError::CreateLog {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            writer: BufWriter::with_capacity(LOG_BUFFER_SIZE, file),
            buffer: String::with_capacity(LOG_BUFFER_SIZE),
        })
    }

    async fn append(&mut self, result: &RequestResult) -> Result<(), SinkError> {
        encode_log_line(&mut self.buffer, result)?;
        if self.buffer.len() >= LOG_BUFFER_SIZE {
            self.write_buffer().await?;
        }
        Ok(())
    }

    async fn write_buffer(&mut self) -> Result<(), SinkError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.writer
            .write_all(self.buffer.as_bytes())
            .await
            .map_err(|source| SinkError::WriteLog {
                path: self.path.clone(),
                source,
            })?;
        self.buffer.clear();
        Ok(())
    }

    async fn finish(mut self) -> Result<(), SinkError> {
        self.write_buffer().await?;
        self.writer
            .flush()
            .await
            .map_err(|source| SinkError::FlushLog {
                path: self.path.clone(),
                source,
            })
    }
}

/// Spawns the single consumer of the result channel.
///
/// The task runs until every sender is dropped. A log that cannot be
/// created or written is reported once; the channel keeps being drained
/// so workers never block on a full queue.
#[must_use]
pub fn spawn_result_sink(
    log_path: PathBuf,
    mut result_rx: mpsc::Receiver<RequestResult>,
) -> JoinHandle<SinkReport> {
    tokio::spawn(async move {
        let mut error = None;
        let mut live = LatencySummary::default();
        let mut drained: u64 = 0;
        let mut written: u64 = 0;

        let mut log = match LogFile::create(log_path.clone()).await {
            Ok(log) => Some(log),
            Err(err) => {
                error!("Cannot open log file to write: {}", err);
                error = Some(err);
                None
            }
        };

        while let Some(result) = result_rx.recv().await {
            drained = drained.saturating_add(1);
            live.record(result.duration(), result.status_code);

            let Some(active) = log.as_mut() else {
                continue;
            };
            let appended = active.append(&result).await;
            match appended {
                Ok(()) => written = written.saturating_add(1),
                Err(err) => {
                    error!("Cannot write request result: {}", err);
                    error = Some(err);
                    log = None;
                }
            }
        }

        if let Some(active) = log.take() {
            if let Err(err) = active.finish().await {
                error!("Cannot write request result: {}", err);
                written = 0;
                error = Some(err);
            }
        }
        debug!(
            "Result sink closed: {} drained, {} written to {}",
            drained,
            written,
            log_path.display()
        );

        SinkReport {
            path: log_path,
            drained,
            written,
            error,
            live,
        }
    })
}
