use crate::sink::{LogLine, LogSink};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

/// Options of the `http` transport.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpOptions {
    /// Collector endpoint, e.g. "http://127.0.0.1:8080/logs".
    pub url: String,
}

/// Sink that POSTs each line as an `application/json` body.
#[derive(Clone)]
pub struct HttpSink {
    client: Client,
    url: String,
}

impl HttpSink {
    pub fn new(options: HttpOptions) -> Self {
        HttpSink {
            client: Client::new(),
            url: options.url,
        }
    }
}

#[async_trait]
impl LogSink for HttpSink {
    async fn send(&self, line: &LogLine) -> Result<(), Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(line.json.clone())
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("log collector rejected line with status {}: {}", status, text).into())
        }
    }
}
