//! HTTP answer producer: forwards the question to an external research backend.
//!
//! Contract: `POST {base_url}/research` with `{ "question": ... }`; a 2xx response
//! carries `{ summary, findings?, sources?, category? }`.

use notebook_core::{AnswerProducer, BoxError, ProducerOutput};
use serde::Serialize;
use std::time::Duration;

const PRODUCER_NAME: &str = "http";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const ERROR_BODY_EXCERPT: usize = 200;

#[derive(Serialize)]
struct ResearchRequest<'a> {
    question: &'a str,
}

/// Calls a remote research backend over HTTP/JSON.
pub struct HttpProducer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProducer {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/research", self.base_url)
    }
}

#[async_trait::async_trait]
impl AnswerProducer for HttpProducer {
    fn name(&self) -> &str {
        PRODUCER_NAME
    }

    async fn produce(&self, question: &str) -> Result<ProducerOutput, BoxError> {
        let url = self.endpoint();
        tracing::debug!(target: "notebook::producer", url = %url, "Forwarding question");

        let response = self
            .client
            .post(&url)
            .json(&ResearchRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
            tracing::warn!(
                target: "notebook::producer",
                url = %url,
                status = status.as_u16(),
                "Research backend returned an error"
            );
            return Err(format!("research backend returned HTTP {}: {}", status, excerpt).into());
        }

        let bytes = response.bytes().await?;
        let output: ProducerOutput = serde_json::from_slice(&bytes)
            .map_err(|e| format!("unusable answer shape from research backend: {}", e))?;
        tracing::info!(
            target: "notebook::producer",
            producer = PRODUCER_NAME,
            bytes = bytes.len(),
            findings = output.findings.len(),
            "Research backend answered"
        );
        Ok(output)
    }
}
