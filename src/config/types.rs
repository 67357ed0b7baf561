use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{
    DEFAULT_METHOD, DEFAULT_PAYLOAD, PositiveU64, PositiveUsize, default_headers,
    default_log_path, default_workers, parse_duration_arg,
};
use crate::error::ValidationError;

/// On-disk configuration; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<String>,
    pub amount: Option<u64>,
    pub target_rps: Option<u64>,
    pub headers: Option<BTreeMap<String, String>>,
    pub payload: Option<String>,
    pub logfile: Option<PathBuf>,
    pub workers: Option<usize>,
    pub timeout: Option<DurationValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub url: String,
    pub method: String,
    pub amount: PositiveU64,
    pub target_rps: PositiveU64,
    pub headers: BTreeMap<String, String>,
    pub payload_template: String,
    pub log_path: PathBuf,
    pub workers: PositiveUsize,
    pub request_timeout: Option<Duration>,
}

impl LoadConfig {
    /// Settings for `url` with every optional value at its default.
    #[must_use]
    pub fn new(url: impl Into<String>, amount: PositiveU64, target_rps: PositiveU64) -> Self {
        Self {
            url: url.into(),
            method: DEFAULT_METHOD.to_owned(),
            amount,
            target_rps,
            headers: default_headers(),
            payload_template: DEFAULT_PAYLOAD.to_owned(),
            log_path: default_log_path(),
            workers: default_workers(),
            request_timeout: None,
        }
    }

    /// Capacity of the payload and result queues.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.workers.get().saturating_mul(3)
    }
}
