use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{DEFAULT_HEADER, DEFAULT_METHOD, DEFAULT_PAYLOAD};
use super::parsers::{parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Rate-limited HTTP load generator: fires a fixed number of templated requests at a steady pace, logs every result and prints a latency summary."
)]
pub struct LoadArgs {
    /// Path to config file (TOML or JSON; defaults to ./loadgen.toml or ./loadgen.json)
    #[arg(long = "config", short = 'f')]
    pub config: Option<String>,

    /// Target URL
    #[arg(long, short, env = "LOADGEN_URL")]
    pub url: Option<String>,

    /// HTTP method
    #[arg(long, short, default_value = DEFAULT_METHOD)]
    pub method: String,

    /// Total number of requests to send
    #[arg(long, short, default_value = "1000", value_parser = parse_positive_u64)]
    pub amount: PositiveU64,

    /// Requests admitted per second
    #[arg(long = "target-rps", short = 't', default_value = "100", value_parser = parse_positive_u64)]
    pub target_rps: PositiveU64,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header, default_value = DEFAULT_HEADER)]
    pub headers: Vec<(String, String)>,

    /// Body template; $CURRENT and $TOTAL are substituted per request
    #[arg(long, short, default_value = DEFAULT_PAYLOAD)]
    pub payload: String,

    /// Result log path (defaults to <temp dir>/loadgen.log)
    #[arg(long = "logfile", short = 'l')]
    pub logfile: Option<PathBuf>,

    /// Concurrent workers (defaults to the number of CPUs)
    #[arg(long, short, value_parser = parse_positive_usize)]
    pub workers: Option<PositiveUsize>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
