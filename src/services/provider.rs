// src/services/provider.rs
use std::future::Future;

use reqwest::{Client, Response};

use crate::{config::ProviderSettings, error::ProviderError};

/// Shared outbound client. Every provider call is bounded by `settings.timeout`.
pub fn http_client(settings: &ProviderSettings) -> Result<Client, ProviderError> {
    Ok(Client::builder().timeout(settings.timeout).build()?)
}

/// Turn a non-2xx response into `ProviderError::Status`.
pub async fn check_status(resp: Response) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Run `call`, retrying retryable failures up to `settings.max_retries` times.
pub async fn with_retry<T, F, Fut>(
    settings: &ProviderSettings,
    provider: &'static str,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < settings.max_retries => {
                attempt += 1;
                tracing::debug!(provider, attempt, error = %e, "retrying provider call");
                tokio::time::sleep(settings.retry_backoff * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}
