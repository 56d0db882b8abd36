//! Thin JSON-over-HTTP layer.
//!
//! Reads must come back 2xx with a JSON content type. Mutations only need a
//! 2xx. A JSON body carrying `success: false` fails either way.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::{header, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Cookie-carrying HTTP client for the storefront API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with its own cookie jar.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .cookie_provider(Arc::new(reqwest::cookie::Jar::default()))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a full URL for the given endpoint path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let value = self.read(Method::GET, path, None::<&()>).await?;
        decode(value)
    }

    /// Send a mutation whose response body is JSON.
    pub async fn post_json<B, T>(&self, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.read(Method::POST, path, body).await?;
        decode(value)
    }

    /// Send a mutation and ignore any response body.
    pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self.request(method, path, body).await?;
        let response = check_status(response).await?;

        if is_json(&response) {
            let text = response.text().await.map_err(ClientError::network)?;
            if let Ok(value) = serde_json::from_str::<Value>(&text) {
                check_success(&value)?;
            }
        }
        Ok(())
    }

    async fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        debug!("{} {}", method, path);

        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(ClientError::network)
    }

    async fn read<B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<Value>
    where
        B: Serialize + ?Sized,
    {
        let response = self.request(method, path, body).await?;
        let response = check_status(response).await?;

        if !is_json(&response) {
            return Err(ClientError::NotJson {
                content_type: content_type(&response).unwrap_or("none").to_string(),
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Deserialization(e.to_string()))?;
        check_success(&value)?;
        Ok(value)
    }
}

fn content_type(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

fn is_json(response: &Response) -> bool {
    content_type(response).is_some_and(|ct| ct.contains("application/json"))
}

/// Turn a non-2xx response into `ClientError::Status`, preferring the
/// server's `error`/`message` field over the raw body.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| (!body.is_empty()).then(|| body.clone()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

fn check_success(value: &Value) -> ClientResult<()> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Request failed")
            .to_string();
        return Err(ClientError::Rejected(message));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Deserialization(e.to_string()))
}
