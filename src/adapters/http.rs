use crate::utils::error::{FeedError, Result};
use reqwest::Client;
use std::time::Duration;

/// reqwest wrapper that retries network failures and 5xx responses.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retry_attempts: u32, retry_delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("exposure-feed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            retry_attempts: retry_attempts.max(1),
            retry_delay,
        })
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 1;
        loop {
            match self.try_get(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.retry_attempts => {
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Body decoded as UTF-8 with a leading BOM removed. Invalid UTF-8 is an
    /// error.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let body = self.get_bytes(url).await?;
        let text = String::from_utf8(body).map_err(|e| FeedError::ProcessingError {
            message: format!("Response from {} is not valid UTF-8: {}", url, e),
        })?;
        match text.strip_prefix('\u{feff}') {
            Some(stripped) => Ok(stripped.to_string()),
            None => Ok(text),
        }
    }

    async fn try_get(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(FeedError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher(attempts: u32) -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5), attempts, Duration::from_millis(1)).unwrap()
    }

    #[tokio::test]
    async fn test_get_text_strips_bom() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/data.csv");
            then.status(200).body("\u{feff}Event Id,Status");
        });

        let text = fetcher(1).get_text(&server.url("/data.csv")).await.unwrap();

        mock.assert();
        assert_eq!(text, "Event Id,Status");
    }

    #[tokio::test]
    async fn test_get_text_rejects_invalid_utf8() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/latin1.csv");
            then.status(200).body(b"caf\xe9");
        });

        let err = fetcher(1).get_text(&server.url("/latin1.csv")).await.unwrap_err();

        assert!(matches!(err, FeedError::ProcessingError { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        });

        let err = fetcher(3).get_bytes(&server.url("/flaky")).await.unwrap_err();

        mock.assert_hits(3);
        assert!(matches!(err, FeedError::HttpStatusError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let err = fetcher(3).get_bytes(&server.url("/missing")).await.unwrap_err();

        mock.assert_hits(1);
        assert!(matches!(err, FeedError::HttpStatusError { status: 404, .. }));
    }
}
