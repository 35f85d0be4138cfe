//! Review-status API adapter (reqwest).
//!
//! Implements the `hwbot-core` HomeworkSource port over the homework status endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};

use hwbot_core::{errors::PollError, homework::PollResponse, ports::HomeworkSource};

#[derive(Clone, Debug)]
pub struct PraktikumClient {
    url: String,
    token: String,
    http: reqwest::Client,
}

impl PraktikumClient {
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PollError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PollError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self {
            url: url.into(),
            token: token.into(),
            http,
        })
    }
}

#[async_trait]
impl HomeworkSource for PraktikumClient {
    async fn poll(&self, from_date: i64) -> Result<PollResponse, PollError> {
        tracing::debug!("polling {} from_date={from_date}", self.url);

        let resp = self
            .http
            .get(&self.url)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PollError::Transport(format!("failed to read body: {e}")))?;

        decode_response(status, &body)
    }
}

/// Map a raw HTTP reply to a poll result. Anything but 200 is an error.
pub fn decode_response(status: StatusCode, body: &str) -> Result<PollResponse, PollError> {
    if status != StatusCode::OK {
        tracing::error!(
            "review API answered {status}: {}",
            body.chars().take(200).collect::<String>()
        );
        return Err(PollError::HttpStatus(status.as_u16()));
    }

    serde_json::from_str::<PollResponse>(body).map_err(|e| PollError::Decode(e.to_string()))
}
