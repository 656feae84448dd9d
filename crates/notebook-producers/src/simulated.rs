//! Simulated research pipeline: stands in for the future search/model stack and
//! answers immediately with placeholder findings.

use crate::categorize::categorize_question;
use notebook_core::{AnswerProducer, BoxError, ProducerOutput};
use std::time::{Duration, Instant};

const PRODUCER_NAME: &str = "simulated";

/// Placeholder producer: init, search, analyze, synthesize, all instant.
#[derive(Debug, Clone, Default)]
pub struct SimulatedProducer {
    /// Artificial latency before answering (zero by default).
    latency: Duration,
}

impl SimulatedProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixed delay before each answer, useful to exercise timeouts end to end.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    fn synthesize(question: &str) -> ProducerOutput {
        let output = ProducerOutput::new(format!(
            "Based on research about \"{}\", here are the key findings...",
            question
        ))
        .with_findings([
            format!(
                "Finding 1: This is a simulated research result related to \"{}\".",
                question
            ),
            "Finding 2: Additional information and insights about the topic.".to_string(),
            "Finding 3: Further analysis and conclusions.".to_string(),
        ])
        .with_sources([
            "Source 1: Research Database",
            "Source 2: Academic Papers",
            "Source 3: Expert Analysis",
        ]);
        match categorize_question(question) {
            Some(category) => output.with_category(category),
            None => output,
        }
    }
}

#[async_trait::async_trait]
impl AnswerProducer for SimulatedProducer {
    fn name(&self) -> &str {
        PRODUCER_NAME
    }

    async fn produce(&self, question: &str) -> Result<ProducerOutput, BoxError> {
        let started = Instant::now();
        tracing::debug!(target: "notebook::producer", step = "1/4", "Initializing research agent");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        tracing::debug!(target: "notebook::producer", step = "2/4", "Searching databases and sources");
        tracing::debug!(target: "notebook::producer", step = "3/4", "Analyzing information");
        tracing::debug!(target: "notebook::producer", step = "4/4", "Synthesizing findings");

        let output = Self::synthesize(question);
        tracing::info!(
            target: "notebook::producer",
            producer = PRODUCER_NAME,
            findings = output.findings.len(),
            sources = output.sources.len(),
            category = output.category.as_deref().unwrap_or("-"),
            elapsed_us = started.elapsed().as_micros() as u64,
            "Simulated research finished"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn produces_placeholder_findings_and_sources() {
        let out = SimulatedProducer::new()
            .produce("What is quantum entanglement?")
            .await
            .unwrap();
        assert!(out.summary.contains("What is quantum entanglement?"));
        assert_eq!(out.findings.len(), 3);
        assert_eq!(out.sources.len(), 3);
        assert_eq!(out.category.as_deref(), Some("science"));
    }

    #[tokio::test]
    async fn unknown_topic_leaves_category_unset() {
        let out = SimulatedProducer::new().produce("What should I cook?").await.unwrap();
        assert!(out.category.is_none());
    }

    #[tokio::test]
    async fn latency_is_applied() {
        let producer = SimulatedProducer::with_latency(Duration::from_millis(30));
        let started = Instant::now();
        producer.produce("q").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
