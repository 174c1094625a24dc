//! # ftp-analyzer
//!
//! Command-line entry point: loads settings, rules and a dataset, then either
//! prints the detected violations or answers a question about them.

#![deny(unsafe_code)]

mod cli;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ftp_core::{Violation, load_dataset};
use ftp_llm::DeferredChatModel;
use ftp_query::QueryRouter;
use ftp_rules::{DetectorOptions, ViolationDetector, load_rules};
use ftp_settings::AnalyzerSettings;
use tracing::info;

use crate::cli::{Cli, Command};

fn load_settings(cli: &Cli) -> Result<AnalyzerSettings> {
    let mut settings = match &cli.settings {
        Some(path) => ftp_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ftp_settings::load_settings().context("Failed to load settings")?,
    };
    cli.apply_to(&mut settings);
    Ok(settings)
}

fn detect(settings: &AnalyzerSettings, data: &Path) -> Result<Vec<Violation>> {
    let dataset = load_dataset(data)
        .with_context(|| format!("Failed to load dataset: {}", data.display()))?;
    let rules = load_rules(Path::new(&settings.rules.path));
    let detector = ViolationDetector::new(
        &rules,
        DetectorOptions {
            row_context_fields: settings.rules.row_context_fields.clone(),
        },
    );
    let violations = detector.detect(&dataset);
    info!(
        rows = dataset.len(),
        rules = rules.len(),
        violations = violations.len(),
        "detection finished"
    );
    Ok(violations)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    ftp_core::logging::init_subscriber(&settings.logging.level, settings.logging.json);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Detect { data } => {
            for violation in detect(&settings, data)? {
                let line =
                    serde_json::to_string(&violation).context("Failed to serialize violation")?;
                writeln!(out, "{line}")?;
            }
        }
        Command::Ask {
            data,
            question,
            json,
            ..
        } => {
            let violations = detect(&settings, data)?;
            let model = DeferredChatModel::from_settings(&settings.model);
            let router = QueryRouter::from_settings(&settings, Arc::new(model))
                .context("Failed to build query router")?;
            let answer = router
                .ask(&violations, question)
                .await
                .context("Failed to answer question")?;
            if *json {
                let text =
                    serde_json::to_string_pretty(&answer).context("Failed to serialize answer")?;
                writeln!(out, "{text}")?;
            } else {
                writeln!(out, "{answer}")?;
            }
        }
    }
    Ok(())
}
