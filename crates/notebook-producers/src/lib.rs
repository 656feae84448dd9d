//! Answer producers for the research service, plus the keyword categorizer they share.

pub use notebook_core::{AnswerProducer, ProducerOutput};

mod categorize;
mod http;
mod mode;
mod simulated;

pub use categorize::categorize_question;
pub use http::HttpProducer;
pub use mode::{build_producer, ProducerMode};
pub use simulated::SimulatedProducer;
