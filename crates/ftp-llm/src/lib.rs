//! # ftp-llm
//!
//! Generative model access for narrative answers.
//!
//! - [`NarrativeModel`]: the async adapter seam; one round trip per question
//! - [`prompt`]: renders a [`FactPack`](ftp_core::FactPack) and question into messages
//! - [`ChatCompletionsModel`]: HTTP adapter for chat-completions endpoints
//! - [`DeferredChatModel`]: the same adapter, built on the first narrative question
//! - [`MockModel`]: scripted responses and call recording for tests

#![deny(unsafe_code)]

pub mod chat;
pub mod deferred;
pub mod errors;
pub mod mock;
pub mod model;
pub mod prompt;

pub use chat::ChatCompletionsModel;
pub use deferred::DeferredChatModel;
pub use errors::{ModelError, ModelResult};
pub use mock::{MockCall, MockModel};
pub use model::NarrativeModel;
pub use prompt::{DEFAULT_SYSTEM_PROMPT, render_prompt};
