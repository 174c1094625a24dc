//! # ftp-query
//!
//! Answers natural-language questions about a violation set.
//!
//! - **Classifier**: [`QuestionClassifier`] maps a question to an [`Intent`]
//! - **Deterministic answers**: counts, breakdowns and row listings, no model call
//! - **Narrative**: [`NarrativeComposer`] builds the fact pack for the model
//! - **Router**: [`QueryRouter::ask`] ties the pieces together

#![deny(unsafe_code)]

pub mod answer;
pub mod answerer;
pub mod classifier;
pub mod errors;
pub mod narrative;
pub mod router;

pub use answer::{Answer, AnswerBody};
pub use answerer::{DeterministicAnswerer, policy_counts, policy_table, violations_table};
pub use classifier::{
    Classification, Intent, IntentRule, QuestionClassifier, default_intent_rules,
};
pub use errors::{QueryError, Result};
pub use narrative::{NarrativeComposer, load_policy_guidance, truncation_note};
pub use router::{QueryRouter, RouterOptions};
