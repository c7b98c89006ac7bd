//! # zonekit-adapter-http
//!
//! HTTP adapter — implements the callback transport port (URL callback
//! actions) and the zone directory port (remote definition fetch) on top of
//! `reqwest`.
//!
//! The engine fires and forgets; this adapter owns the timeout policy. A
//! hung remote is bounded by the client timeout, and failures surface
//! through the engine's error hook.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `zonekit-app` and `zonekit-domain`.

mod error;

pub use error::HttpError;

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use zonekit_app::ports::{CallbackRequest, CallbackTransport, ZoneDirectory};
use zonekit_domain::action::CallbackMethod;
use zonekit_domain::definition::ZoneDefinition;
use zonekit_domain::error::ZoneKitError;

/// HTTP adapter configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

fn build_client(config: &HttpConfig) -> Result<reqwest::Client, HttpError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
        .build()?)
}

/// Flatten JSON params into query pairs; non-string values are rendered
/// as their JSON text.
fn query_pairs(params: &serde_json::Map<String, serde_json::Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Callback transport sending GET requests with query parameters and POST
/// requests with a JSON body.
pub struct HttpCallbackTransport {
    client: reqwest::Client,
}

impl HttpCallbackTransport {
    /// Create a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when the underlying client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

impl CallbackTransport for HttpCallbackTransport {
    fn send(
        &self,
        request: CallbackRequest,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        let client = self.client.clone();
        async move {
            let builder = match request.method {
                CallbackMethod::Get => client
                    .get(&request.url)
                    .query(&query_pairs(&request.params)),
                CallbackMethod::Post => client.post(&request.url).json(&request.params),
            };

            let result = async {
                let response = builder.send().await?;
                response.error_for_status()?;
                Ok::<_, HttpError>(())
            }
            .await;

            match result {
                Ok(()) => {
                    tracing::debug!(method = %request.method, url = %request.url, "callback delivered");
                    Ok(())
                }
                Err(err) => {
                    tracing::warn!(method = %request.method, url = %request.url, %err, "callback failed");
                    Err(err.into_dispatch())
                }
            }
        }
    }
}

/// Zone directory fetching the definition set from a configured URL.
pub struct HttpZoneDirectory {
    client: reqwest::Client,
    url: String,
}

impl HttpZoneDirectory {
    /// Create a directory fetching from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when the underlying client cannot be built.
    pub fn new(config: &HttpConfig, url: impl Into<String>) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(config)?,
            url: url.into(),
        })
    }
}

impl ZoneDirectory for HttpZoneDirectory {
    fn fetch_zones(
        &self,
    ) -> impl Future<Output = Result<Vec<ZoneDefinition>, ZoneKitError>> + Send {
        let client = self.client.clone();
        let url = self.url.clone();
        async move {
            let result = async {
                let response = client.get(&url).send().await?;
                let definitions = response
                    .error_for_status()?
                    .json::<Vec<ZoneDefinition>>()
                    .await?;
                Ok::<_, HttpError>(definitions)
            }
            .await;

            match result {
                Ok(definitions) => {
                    tracing::debug!(%url, zones = definitions.len(), "zone definitions fetched");
                    Ok(definitions)
                }
                Err(err) => {
                    tracing::warn!(%url, %err, "zone definition fetch failed");
                    Err(err.into_directory())
                }
            }
        }
    }
}
