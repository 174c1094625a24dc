//! The narrative model seam.

use std::sync::Arc;

use async_trait::async_trait;
use ftp_core::FactPack;

use crate::errors::ModelResult;

/// A generative model that answers a question from a fact pack.
///
/// Implementors must be `Send + Sync`; a router holds one behind an `Arc`
/// and may be shared across tasks.
#[async_trait]
pub trait NarrativeModel: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Produce answer text for `question` grounded in `facts`.
    ///
    /// One round trip; failures are returned, never retried.
    async fn generate(&self, facts: &FactPack, question: &str) -> ModelResult<String>;
}

#[async_trait]
impl<T: NarrativeModel + ?Sized> NarrativeModel for Arc<T> {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn generate(&self, facts: &FactPack, question: &str) -> ModelResult<String> {
        (**self).generate(facts, question).await
    }
}
