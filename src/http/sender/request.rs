use std::collections::BTreeMap;

use reqwest::{
    Client, Method, Request, Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};

use crate::config::LoadConfig;
use crate::error::HttpError;

/// Method, URL and headers shared by every request of a run.
///
/// Values are validated when a request is built, not when the template is
/// created, so a broken value surfaces from the first dispatch attempt.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    method: String,
    url: String,
    headers: BTreeMap<String, String>,
}

impl RequestTemplate {
    #[must_use]
    pub fn from_config(config: &LoadConfig) -> Self {
        Self {
            method: config.method.clone(),
            url: config.url.clone(),
            headers: config.headers.clone(),
        }
    }

    /// Builds one request carrying `body`.
    ///
    /// # Errors
    ///
    /// Returns an error when the method, URL or any header is malformed.
    pub fn build(&self, client: &Client, body: String) -> Result<Request, HttpError> {
        let method =
            Method::from_bytes(self.method.as_bytes()).map_err(|source| HttpError::InvalidMethod {
                method: self.method.clone(),
                source,
            })?;
        let url = Url::parse(&self.url).map_err(|source| HttpError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        let headers = build_headers(&self.headers)?;

        client
            .request(method, url)
            .headers(headers)
            .body(body)
            .build()
            .map_err(|source| HttpError::BuildRequestFailed { source })
    }
}

pub(crate) fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|source| HttpError::InvalidHeaderName {
                name: key.clone(),
                source,
            })?;
        let value = HeaderValue::from_str(value).map_err(|source| HttpError::InvalidHeaderValue {
            name: key.clone(),
            source,
        })?;
        map.insert(name, value);
    }
    Ok(map)
}
