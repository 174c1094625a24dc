//! Prompt rendering.
//!
//! The system message sets the role. The user message carries every fact and
//! the answering constraints, so a custom system prompt cannot drop them.

use ftp_core::FactPack;

/// Built-in system message.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a financial data analyst. \
Answer questions about Fund Transfer Pricing policy violations using only the facts you are given.";

/// User message template. `{name}` placeholders are [`FactPack::fields`]
/// keys plus `question`.
const USER_TEMPLATE: &str = "\
Global total violations: {total_count_all}

Global per-policy counts:
{policy_counts_all}

{scoped_section}

Truncation status:
{truncation_note}

Policy guidance:
{policy_guidance}

Rules:
- Treat each row in the violations list as a violation/anomaly.
- If total_count_all > 0, you must NOT say there are no anomalies.
- If a scoped section is provided and scoped_total > 0, focus on those. If scoped_total == 0, state that explicitly.
- Do not infer or invent policies, counts, or anomalies beyond the provided data.

Violations Data (respect any truncation noted):
{violations}

Question:
{question}

Answer based ONLY on the supplied data and rules above. Be concise and specific.";

/// Render the user message for `question`.
pub fn render_prompt(facts: &FactPack, question: &str) -> String {
    let mut fields = facts.fields();
    let _ = fields.insert("question", question.to_string());

    let mut out = String::with_capacity(USER_TEMPLATE.len() + facts.violations.len());
    let mut rest = USER_TEMPLATE;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if fields.contains_key(&after[..close]) => {
                out.push_str(&fields[&after[..close]]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
