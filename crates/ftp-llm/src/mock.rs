//! Scripted narrative model for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use ftp_core::FactPack;
use parking_lot::Mutex;

use crate::errors::{ModelError, ModelResult};
use crate::model::NarrativeModel;

/// One recorded [`MockModel::generate`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct MockCall {
    /// Facts passed in.
    pub facts: FactPack,
    /// Question passed in.
    pub question: String,
}

/// Model that returns pre-programmed responses in order and records calls.
///
/// Once the script runs out, the fallback text (if any) is returned for every
/// further call; without one, the call fails.
#[derive(Default)]
pub struct MockModel {
    script: Mutex<VecDeque<ModelResult<String>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockModel {
    /// Model that answers with the given results, in order.
    pub fn new(script: Vec<ModelResult<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Model that always answers `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    /// Model whose first call fails with `error`.
    pub fn failing(error: ModelError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl NarrativeModel for MockModel {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, facts: &FactPack, question: &str) -> ModelResult<String> {
        let index = {
            let mut calls = self.calls.lock();
            calls.push(MockCall {
                facts: facts.clone(),
                question: question.to_string(),
            });
            calls.len() - 1
        };

        if let Some(next) = self.script.lock().pop_front() {
            return next;
        }
        self.fallback.clone().ok_or_else(|| ModelError::Config {
            message: format!("MockModel: no response configured for call {index}"),
        })
    }
}
