//! Research answer records and the producer output shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored research result. Immutable once created by the research service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchAnswer {
    /// Unique identifier for this entry.
    pub id: Uuid,
    /// The question exactly as submitted.
    pub question: String,
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    /// Notebook this entry belongs to.
    pub category: String,
    /// Creation instant (RFC 3339 on the wire).
    pub timestamp: DateTime<Utc>,
}

impl ResearchAnswer {
    /// Builds a record from producer output, stamping id and creation time.
    pub fn from_output(question: impl Into<String>, output: ProducerOutput, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            summary: output.summary,
            findings: output.findings,
            sources: output.sources,
            category: category.into(),
            timestamp: Utc::now(),
        }
    }

    /// Serializes to JSON bytes for the history log.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserializes from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// What an answer producer hands back for a question.
///
/// `summary` is mandatory; a payload without it is an unusable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerOutput {
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProducerOutput {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            findings: Vec::new(),
            sources: Vec::new(),
            category: None,
        }
    }

    pub fn with_findings<I, S>(mut self, findings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.findings = findings.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_output_defaults_missing_lists() {
        let out: ProducerOutput = serde_json::from_str(r#"{"summary":"s"}"#).unwrap();
        assert!(out.findings.is_empty());
        assert!(out.sources.is_empty());
        assert!(out.category.is_none());
    }

    #[test]
    fn producer_output_without_summary_is_rejected() {
        let res = serde_json::from_str::<ProducerOutput>(r#"{"findings":["f"]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn answer_timestamp_serializes_as_iso8601() {
        let answer = ResearchAnswer::from_output("q", ProducerOutput::new("s"), "general");
        let json = serde_json::to_value(&answer).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(json["category"], "general");
        assert_eq!(json["question"], "q");
    }
}
