//! End-to-end: dataset, rules and scope through to answers.

use std::sync::Arc;

use assert_matches::assert_matches;
use ftp_core::{Dataset, Row, Table, Value, Violation, parse_json_records};
use ftp_llm::{DeferredChatModel, MockModel, ModelError, NarrativeModel};
use ftp_query::{AnswerBody, Intent, QueryError, QueryRouter, RouterOptions};
use ftp_rules::{Rule, Scope, detect_violations, parse_rules, parse_scope};
use ftp_settings::ModelSettings;

const DEALS: &str = r#"[
    {"deal_id": "D1", "desk": "ALM",      "rate": -0.012, "spread_bps": 120, "curve_date": "2024-03-29"},
    {"deal_id": "D2", "desk": "Treasury", "rate": 0.034,  "spread_bps": 640, "curve_date": "2024-03-29"},
    {"deal_id": "D3", "desk": "ALM",      "rate": -0.004, "spread_bps": 80,  "curve_date": "2023-11-30"},
    {"deal_id": "D4", "desk": "Markets",  "rate": 0.021,  "spread_bps": 510, "curve_date": null},
    {"deal_id": "D5", "desk": "Treasury", "rate": 0.018,  "spread_bps": 45,  "curve_date": "2024-03-29"}
]"#;

const RULES: &str = r#"[
    {"column": "rate", "condition": "x < 0", "description": "Negative FTP rate"},
    {"column": "spread_bps", "condition": "x > 500", "description": "Excessive FTP spread"},
    {"column": "curve_date", "condition": "pd.isnull(x) or x < '2024-01-01'", "description": "Stale curve"},
    {"column": "notional", "condition": "x > 1e9", "description": "Large notional"}
]"#;

const POLICIES: &str = r#"[
    {"description": "Negative FTP rate", "owner": "ALM"},
    {"description": "Excessive FTP spread", "owner": "ALM"}
]"#;

fn deals() -> Dataset {
    parse_json_records(DEALS).unwrap()
}

fn router_with(scope: Scope, model: Arc<dyn NarrativeModel>) -> QueryRouter {
    QueryRouter::new(
        scope,
        RouterOptions {
            keyword: "ftp".into(),
            ..RouterOptions::default()
        },
        model,
    )
    .unwrap()
}

#[test]
fn negative_rate_example_yields_two() {
    let dataset = Dataset::from_rows(
        [-1.0, 2.0, -3.0]
            .into_iter()
            .map(|r| Row::from_pairs([("rate", Value::Float(r))]))
            .collect(),
    );
    let rules = [Rule::new(Some("rate"), "x < 0", "Negative rate")];
    let violations = detect_violations(&dataset, &rules);
    assert_eq!(violations.len(), 2);
}

#[test]
fn empty_rules_yield_empty_set() {
    assert!(detect_violations(&deals(), &[]).is_empty());
}

#[test]
fn pipeline_detects_expected_violations() {
    let violations = detect_violations(&deals(), &parse_rules(RULES).unwrap());
    let described: Vec<(&str, &str)> = violations
        .iter()
        .map(|v| {
            (
                v.description.as_str(),
                v.row_context["deal_id"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        described,
        [
            ("Negative FTP rate", "D1"),
            ("Negative FTP rate", "D3"),
            ("Excessive FTP spread", "D2"),
            ("Excessive FTP spread", "D4"),
            ("Stale curve", "D3"),
            ("Stale curve", "D4"),
        ]
    );
}

#[tokio::test]
async fn total_count_of_seven_without_model_call() {
    let violations: Vec<_> = (0..7)
        .map(|i| Violation::matched(format!("Policy {}", i % 3), serde_json::Map::new()))
        .collect();
    let model = Arc::new(MockModel::replying("unused"));
    let router = router_with(Scope::unavailable("FTP"), model.clone());

    let answer = router.ask(&violations, "How many violations?").await.unwrap();
    assert_eq!(answer.body, AnswerBody::text("Total policy violations: 7"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn total_count_ignores_an_applied_scope() {
    let violations = detect_violations(&deals(), &parse_rules(RULES).unwrap());
    let scope = parse_scope(POLICIES, "FTP").unwrap();
    let router = router_with(scope, Arc::new(MockModel::default()));

    let global = router.ask(&violations, "How many violations?").await.unwrap();
    let scoped = router
        .ask(&violations, "How many FTP violations?")
        .await
        .unwrap();
    assert_eq!(scoped.intent, Intent::TotalCount);
    assert!(scoped.scope_applied);
    assert!(!global.scope_applied);
    assert_eq!(scoped.body, global.body);
    assert_eq!(scoped.body, AnswerBody::text("Total policy violations: 6"));
}

#[tokio::test]
async fn unconfigured_model_only_fails_narrative_questions() {
    let violations = detect_violations(&deals(), &parse_rules(RULES).unwrap());
    let settings = ModelSettings {
        endpoint: String::new(),
        ..ModelSettings::default()
    };
    let model = Arc::new(DeferredChatModel::new(settings, None));
    let router = router_with(Scope::unavailable("FTP"), model.clone());

    let answer = router.ask(&violations, "How many violations?").await.unwrap();
    assert_eq!(answer.body, AnswerBody::text("Total policy violations: 6"));
    let answer = router
        .ask(&violations, "Which entries violate policy rules?")
        .await
        .unwrap();
    assert_eq!(answer.intent, Intent::ListRows);
    assert!(!model.is_built());

    let err = router
        .ask(&violations, "Explain what is driving the negative rates")
        .await
        .unwrap_err();
    assert_matches!(err, QueryError::Model(ModelError::Config { .. }));
}

#[tokio::test]
async fn which_entries_lists_every_violation() {
    let violations = detect_violations(&deals(), &parse_rules(RULES).unwrap());
    let router = router_with(Scope::unavailable("FTP"), Arc::new(MockModel::default()));

    let answer = router
        .ask(&violations, "Which entries violate policy rules?")
        .await
        .unwrap();
    assert_eq!(answer.intent, Intent::ListRows);
    let table = answer.table().unwrap();
    assert_eq!(table.len(), violations.len());
    assert_eq!(table.columns[0], "description");
    assert!(answer.to_string().starts_with("Violating entries: 6\n"));
}

#[tokio::test]
async fn scoped_listing_narrows_rows() {
    let violations = detect_violations(&deals(), &parse_rules(RULES).unwrap());
    let scope = parse_scope(POLICIES, "FTP").unwrap();
    let router = router_with(scope, Arc::new(MockModel::default()));

    let answer = router
        .ask(&violations, "Which FTP records are affected?")
        .await
        .unwrap();
    assert!(answer.scope_applied);
    assert_eq!(answer.table().map(Table::len), Some(4));
    assert!(answer.to_string().starts_with("Violating entries (FTP scope): 4\n"));
}

#[tokio::test]
async fn scoped_zero_match_mentions_global_total() {
    let violations = detect_violations(&deals(), &parse_rules(RULES).unwrap());
    let scope = Scope::new("FTP", ["Unrelated policy"]);
    let router = router_with(scope, Arc::new(MockModel::default()));

    let answer = router.ask(&violations, "Any FTP anomalies?").await.unwrap();
    assert_eq!(answer.intent, Intent::AnomalySummary);
    assert!(answer.scope_applied);
    assert_eq!(
        answer.body,
        AnswerBody::text("No FTP anomalies. Global violations present: 6.")
    );
}

#[tokio::test]
async fn narrative_gets_truncated_fact_pack() {
    let violations = detect_violations(&deals(), &parse_rules(RULES).unwrap());
    let model = Arc::new(MockModel::replying("Two desks drive the negative rates."));
    let router = QueryRouter::new(
        Scope::unavailable("FTP"),
        RouterOptions {
            keyword: "ftp".into(),
            max_violations: Some(2),
            policy_guidance: Some("Rates must be non-negative.".into()),
        },
        model.clone(),
    )
    .unwrap();

    let answer = router
        .ask(&violations, "Explain what is driving the negative rates")
        .await
        .unwrap();
    assert!(answer.used_model);
    assert_eq!(
        answer.body,
        AnswerBody::text("Two desks drive the negative rates.")
    );

    let calls = model.calls();
    let facts = &calls[0].facts;
    assert_eq!(facts.total_count_all, 6);
    assert_eq!(facts.scoped_section, "No scoped filter applied.");
    assert_eq!(
        facts.truncation_note,
        "YES — showing first 2 of 6 rows (max_violations=2)."
    );
    assert_eq!(facts.violations.lines().count(), 3);
    assert_eq!(
        facts.policy_guidance.as_deref(),
        Some("Rates must be non-negative.")
    );
}

#[tokio::test]
async fn raising_rule_surfaces_as_error_violations() {
    let rules = vec![Rule::new(Some("rate"), "x / 0 > 1", "Broken rule")];
    let violations = detect_violations(&deals(), &rules);
    assert_eq!(violations.len(), 5);

    let router = router_with(Scope::unavailable("FTP"), Arc::new(MockModel::default()));
    let answer = router
        .ask(&violations, "How many violations per policy?")
        .await
        .unwrap();
    assert!(
        answer
            .to_string()
            .contains("Error evaluating rule: division by zero      5")
    );
}
