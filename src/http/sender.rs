mod request;
mod worker;

use reqwest::Client;

use crate::{args::DEFAULT_USER_AGENT, config::LoadConfig, error::HttpError};

pub use request::RequestTemplate;
pub(crate) use worker::{WorkerContext, spawn_worker};

/// Builds the HTTP client shared by every worker.
///
/// # Errors
///
/// Returns an error when the client cannot be initialised.
pub fn build_client(config: &LoadConfig) -> Result<Client, HttpError> {
    let mut client_builder = Client::builder().user_agent(DEFAULT_USER_AGENT);
    if let Some(timeout) = config.request_timeout {
        client_builder = client_builder.timeout(timeout);
    }
    client_builder
        .build()
        .map_err(|source| HttpError::BuildClientFailed { source })
}
