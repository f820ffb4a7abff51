//! Thin JSON client bound to one base URL.
//!
//! Every call is a single attempt: no retries, no timeout, no cancellation.
//! Non-2xx replies become [`AppError::Status`], transport failures become
//! [`AppError::Transport`].

use crate::error::AppError;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new<U: Into<String>>(base_url: U) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client<U: Into<String>>(client: Client, base_url: U) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = check_status("GET", path, response).await?;
        decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let response = check_status("POST", path, response).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        let response = self.client.delete(self.url(path)).send().await?;
        check_status("DELETE", path, response).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

async fn check_status(method: &str, path: &str, response: Response) -> Result<Response, AppError> {
    let status = response.status();
    tracing::debug!(method, path, status = status.as_u16(), "http response");

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let message = if body.trim().is_empty() {
        format!("{method} {path}: {} {reason}", status.as_u16())
    } else {
        format!("{method} {path}: {} {reason}: {}", status.as_u16(), body.trim())
    };
    Err(AppError::status(status.as_u16(), message))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| AppError::invalid_data(err.to_string()))
}
