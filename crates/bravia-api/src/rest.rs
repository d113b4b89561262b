// REST (JSON-RPC style) request encoding
//
// Every REST call is a POST to `/sony/<service>` carrying
// `{"method", "params", "id": 1, "version"}`. The device answers with a
// top-level `result` array on success or an `error` array on failure.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use strum::{AsRefStr, Display};
use tracing::debug;

use crate::client::{BraviaClient, Payload, Reply};
use crate::error::Error;

/// API version used when a request does not ask for another one.
pub const DEFAULT_VERSION: &str = "1.0";

/// Service groups exposed under `/sony/<service>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "camelCase")]
pub enum Service {
    AccessControl,
    AppControl,
    Audio,
    AvContent,
    Guide,
    System,
    Video,
}

/// Method parameters: absent, a single value, or an ordered list.
///
/// The device always expects an array; [`Params::into_vec`] performs the
/// normalization at the encoder boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    #[default]
    None,
    Single(Value),
    List(Vec<Value>),
}

impl Params {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Self::None => Vec::new(),
            Self::Single(value) => vec![value],
            Self::List(values) => values,
        }
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

/// One REST call: service, method, params, plus optional version and
/// timeout overrides.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub service: Service,
    pub method: String,
    pub params: Params,
    pub version: String,
    pub timeout: Option<Duration>,
}

impl RestRequest {
    pub fn new(service: Service, method: impl Into<String>) -> Self {
        Self {
            service,
            method: method.into(),
            params: Params::None,
            version: DEFAULT_VERSION.to_owned(),
            timeout: None,
        }
    }

    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params = params.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The JSON envelope sent as the request body.
    pub fn envelope(&self) -> Value {
        json!({
            "method": self.method,
            "params": self.params.clone().into_vec(),
            "id": 1,
            "version": self.version,
        })
    }
}

/// First element of the response's `result` array, deserialized.
///
/// `Ok(None)` when `result` or the element is missing (or `null`);
/// convenience methods fall back to their documented defaults. An element
/// that is present but has the wrong shape is a [`Error::Deserialization`].
pub fn first_result<T: DeserializeOwned>(response: &Value) -> Result<Option<T>, Error> {
    nth_result(response, 0)
}

/// `n`-th element of the response's `result` array, deserialized.
pub fn nth_result<T: DeserializeOwned>(response: &Value, n: usize) -> Result<Option<T>, Error> {
    let Some(item) = response.get("result").and_then(|result| result.get(n)) else {
        return Ok(None);
    };
    if item.is_null() {
        return Ok(None);
    }
    serde_json::from_value(item.clone())
        .map(Some)
        .map_err(|e| Error::Deserialization {
            message: format!("result[{n}]: {e}"),
            body: item.to_string(),
        })
}

impl BraviaClient {
    /// Send a REST request and return the parsed JSON response.
    pub async fn send_rest_req(&mut self, request: &RestRequest) -> Result<Value, Error> {
        let url = self.service_url(request.service)?;
        let timeout = request.timeout.unwrap_or(self.transport().timeout);
        debug!(service = %request.service, method = %request.method, "REST request");

        match self
            .send_request(url, Payload::Json(request.envelope()), HeaderMap::new(), timeout)
            .await?
        {
            Reply::Json(value) => Ok(value),
            Reply::Raw(_) => Ok(Value::Object(serde_json::Map::new())),
        }
    }

    /// Send a REST request; `true` iff the response carries a `result` key.
    ///
    /// For setters whose response has no other useful signal. A response
    /// without `result` is `false`, not an error.
    pub async fn send_rest_quick(&mut self, request: &RestRequest) -> Result<bool, Error> {
        let response = self.send_rest_req(request).await?;
        Ok(response.get("result").is_some())
    }
}
