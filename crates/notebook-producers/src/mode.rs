//! Producer selection from configuration.

use crate::{HttpProducer, SimulatedProducer};
use notebook_core::{AnswerProducer, BoxError, CoreConfig};
use std::str::FromStr;
use std::sync::Arc;

/// Which answer producer backs the research service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProducerMode {
    /// Built-in placeholder pipeline.
    #[default]
    Simulated,
    /// External research backend at `producer_base_url`.
    Http,
}

impl ProducerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Http => "http",
        }
    }
}

impl FromStr for ProducerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "mock" | "" => Ok(Self::Simulated),
            "http" | "live" => Ok(Self::Http),
            other => Err(format!("unknown producer mode '{}' (expected simulated or http)", other)),
        }
    }
}

/// Builds the producer named by `config.producer_mode`.
pub fn build_producer(config: &CoreConfig) -> Result<Arc<dyn AnswerProducer>, BoxError> {
    let mode: ProducerMode = config.producer_mode.parse()?;
    let producer: Arc<dyn AnswerProducer> = match mode {
        ProducerMode::Simulated => Arc::new(SimulatedProducer::new()),
        ProducerMode::Http => Arc::new(HttpProducer::new(config.producer_base_url.clone())?),
    };
    tracing::info!(
        target: "notebook::producer",
        mode = mode.as_str(),
        base_url = %config.producer_base_url,
        "Answer producer selected"
    );
    Ok(producer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes_and_aliases() {
        assert_eq!("simulated".parse::<ProducerMode>().unwrap(), ProducerMode::Simulated);
        assert_eq!("Mock".parse::<ProducerMode>().unwrap(), ProducerMode::Simulated);
        assert_eq!(" http ".parse::<ProducerMode>().unwrap(), ProducerMode::Http);
        assert_eq!("live".parse::<ProducerMode>().unwrap(), ProducerMode::Http);
        assert!("gpt".parse::<ProducerMode>().is_err());
    }

    #[test]
    fn builds_from_config() {
        let simulated = build_producer(&CoreConfig::default()).unwrap();
        assert_eq!(simulated.name(), "simulated");

        let http = build_producer(&CoreConfig {
            producer_mode: "http".to_string(),
            ..CoreConfig::default()
        })
        .unwrap();
        assert_eq!(http.name(), "http");

        let bad = build_producer(&CoreConfig {
            producer_mode: "carrier-pigeon".to_string(),
            ..CoreConfig::default()
        });
        assert!(bad.is_err());
    }
}
