use std::collections::BTreeMap;
use std::path::PathBuf;

use super::types::PositiveUsize;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loadgen/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_METHOD: &str = "POST";
pub const DEFAULT_HEADER: &str = "Content-Type: text/plain";
pub const DEFAULT_PAYLOAD: &str = "Sending req #$CURRENT of $TOTAL";

const LOG_FILE_NAME: &str = "loadgen.log";
const FALLBACK_WORKERS: PositiveUsize = PositiveUsize::new_or_one(4);

/// `<temp dir>/loadgen.log`
#[must_use]
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// One worker per available core.
#[must_use]
pub fn default_workers() -> PositiveUsize {
    std::thread::available_parallelism()
        .map(PositiveUsize::from)
        .unwrap_or(FALLBACK_WORKERS)
}

/// Header map matching [`DEFAULT_HEADER`].
#[must_use]
pub fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_owned(), "text/plain".to_owned())])
}
