use std::collections::BTreeMap;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{LoadArgs, PositiveU64, PositiveUsize, default_log_path, default_workers};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, LoadConfig};

/// Merges CLI arguments with an optional config file.
///
/// A value given on the command line (or through its environment variable)
/// wins, then the config file, then the CLI default.
///
/// # Errors
///
/// Returns an error when the URL is missing or empty, or when a config value
/// is zero or malformed.
pub fn resolve_config(
    args: &LoadArgs,
    matches: &ArgMatches,
    config: Option<&ConfigFile>,
) -> AppResult<LoadConfig> {
    let empty = ConfigFile::default();
    let config = config.unwrap_or(&empty);

    let url = resolve_url(args, matches, config)?;

    let mut resolved = LoadConfig::new(url, args.amount, args.target_rps);

    resolved.method = match non_blank(config.method.as_deref()) {
        Some(method) if !is_cli(matches, "method") => method.to_owned(),
        _ => args.method.clone(),
    };

    if !is_cli(matches, "amount")
        && let Some(amount) = config.amount
    {
        resolved.amount = ensure_positive_u64(amount, "amount")?;
    }

    if !is_cli(matches, "target_rps")
        && let Some(target_rps) = config.target_rps
    {
        resolved.target_rps = ensure_positive_u64(target_rps, "target_rps")?;
    }

    resolved.headers = match config.headers.as_ref() {
        Some(headers) if !is_cli(matches, "headers") => headers.clone(),
        _ => args.headers.iter().cloned().collect::<BTreeMap<_, _>>(),
    };

    resolved.payload_template = match config.payload.as_ref() {
        Some(payload) if !is_cli(matches, "payload") => payload.clone(),
        _ => args.payload.clone(),
    };

    resolved.log_path = args
        .logfile
        .clone()
        .or_else(|| config.logfile.clone())
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(default_log_path);

    resolved.workers = match (args.workers, config.workers) {
        (Some(workers), _) => workers,
        (None, Some(workers)) => ensure_positive_usize(workers, "workers")?,
        (None, None) => default_workers(),
    };

    resolved.request_timeout = match (args.timeout, config.timeout.as_ref()) {
        (Some(timeout), _) => Some(timeout),
        (None, Some(timeout)) => Some(timeout.to_duration().map_err(|err| {
            AppError::config(ConfigError::InvalidDuration {
                field: "timeout".to_owned(),
                source: err,
            })
        })?),
        (None, None) => None,
    };

    Ok(resolved)
}

fn resolve_url(args: &LoadArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<String> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.as_ref()
    {
        if url.trim().is_empty() {
            return Err(AppError::config(ConfigError::EmptyUrl));
        }
        return Ok(url.clone());
    }

    match args.url.as_ref() {
        Some(url) if !url.trim().is_empty() => Ok(url.clone()),
        _ => Err(AppError::validation(ValidationError::MissingUrl)),
    }
}

/// Blank strings in the config file count as unset.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}
