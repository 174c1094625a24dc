//! Query routing: classify, scope, then answer deterministically or via the
//! narrative model.

use std::path::Path;
use std::sync::Arc;

use ftp_core::Violation;
use ftp_llm::NarrativeModel;
use ftp_rules::{Scope, ScopeOutcome, apply_scope, load_scope};
use ftp_settings::AnalyzerSettings;
use tracing::{debug, info, warn};

use crate::answer::{Answer, AnswerBody};
use crate::answerer::{DeterministicAnswerer, NO_VIOLATIONS};
use crate::classifier::{Intent, QuestionClassifier};
use crate::errors::Result;
use crate::narrative::{NarrativeComposer, load_policy_guidance};

/// Router construction options.
#[derive(Clone, Debug, Default)]
pub struct RouterOptions {
    /// Word that requests the scope filter.
    pub keyword: String,
    /// Cap on violation rows sent to the model. `None` sends all.
    pub max_violations: Option<usize>,
    /// Free-text policy guidance for the model.
    pub policy_guidance: Option<String>,
}

/// Answers questions about a violation set.
pub struct QueryRouter {
    classifier: QuestionClassifier,
    answerer: DeterministicAnswerer,
    composer: NarrativeComposer,
    scope: Scope,
    model: Arc<dyn NarrativeModel>,
}

impl QueryRouter {
    /// Router over `scope` using `model` for narrative questions.
    pub fn new(
        scope: Scope,
        options: RouterOptions,
        model: Arc<dyn NarrativeModel>,
    ) -> Result<Self> {
        let classifier = QuestionClassifier::new(&options.keyword)?;
        let composer = NarrativeComposer::new(scope.label())
            .with_scope_source(scope.source().map(str::to_string))
            .with_max_violations(options.max_violations)
            .with_policy_guidance(options.policy_guidance);
        Ok(Self {
            classifier,
            answerer: DeterministicAnswerer::new(scope.label()),
            composer,
            scope,
            model,
        })
    }

    /// Router configured from settings. The scope and policy guidance files
    /// are read here and fail soft.
    pub fn from_settings(
        settings: &AnalyzerSettings,
        model: Arc<dyn NarrativeModel>,
    ) -> Result<Self> {
        let scope = load_scope(Path::new(&settings.scope.path), &settings.scope.label);
        let policy_guidance = settings
            .narrative
            .policy_guidance_path
            .as_deref()
            .and_then(|p| load_policy_guidance(Path::new(p)));
        Self::new(
            scope,
            RouterOptions {
                keyword: settings.scope.keyword.clone(),
                max_violations: settings.narrative.max_violations,
                policy_guidance,
            },
            model,
        )
    }

    /// The scope in use.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Answer `question` about `violations`.
    ///
    /// Only narrative questions suspend; every other intent is answered
    /// from the violation set without calling the model.
    pub async fn ask(&self, violations: &[Violation], question: &str) -> Result<Answer> {
        let classification = self.classifier.classify(question);

        if violations.is_empty() {
            debug!(intent = %classification.intent, "no violations to answer from");
            return Ok(Answer {
                intent: classification.intent,
                body: AnswerBody::text(NO_VIOLATIONS),
                used_model: false,
                scope_applied: false,
                scope_note: None,
            });
        }

        let outcome = if classification.scope_requested {
            apply_scope(violations, &self.scope)
        } else {
            ScopeOutcome {
                scoped: violations.to_vec(),
                applied: false,
                note: None,
            }
        };
        let classification = classification.resolve(outcome.applied);

        debug!(
            intent = %classification.intent,
            scope_requested = classification.scope_requested,
            scope_applied = outcome.applied,
            table_requested = classification.table_requested,
            "question routed"
        );

        if let Some(body) = self.answerer.answer(
            classification.intent,
            classification.table_requested,
            violations,
            &outcome,
        ) {
            return Ok(Answer {
                intent: classification.intent,
                body,
                used_model: false,
                scope_applied: outcome.applied,
                scope_note: outcome.note,
            });
        }

        let facts = self.composer.compose(violations, &outcome);
        info!(
            model = self.model.model(),
            total = facts.total_count_all,
            "asking narrative model"
        );
        let text = self
            .model
            .generate(&facts, question)
            .await
            .inspect_err(|err| {
                warn!(
                    model = self.model.model(),
                    category = err.category(),
                    transient = err.is_transient(),
                    error = %err,
                    "narrative model failed"
                );
            })?;

        Ok(Answer {
            intent: Intent::Narrative,
            body: AnswerBody::text(text),
            used_model: true,
            scope_applied: outcome.applied,
            scope_note: outcome.note,
        })
    }
}
