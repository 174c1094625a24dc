//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ftp_settings::AnalyzerSettings;

/// Detect FTP policy violations in a dataset and answer questions about them.
#[derive(Parser, Debug)]
#[command(name = "ftp-analyzer", version, about)]
pub struct Cli {
    /// Settings file (defaults to `~/.ftp-analyzer/settings.json`).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Rule configuration file (overrides settings).
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Scope policy file (overrides settings).
    #[arg(long, global = true)]
    pub scope: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every violation as one JSON object per line.
    Detect {
        /// Dataset file (`.json` records or `.csv`).
        data: PathBuf,
    },

    /// Answer a question about the dataset's violations.
    Ask {
        /// Dataset file (`.json` records or `.csv`).
        data: PathBuf,

        /// The question.
        question: String,

        /// Cap on violation rows sent to the model.
        #[arg(long)]
        max_violations: Option<usize>,

        /// Print the structured answer as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_to(&self, settings: &mut AnalyzerSettings) {
        if let Some(path) = &self.rules {
            settings.rules.path = path.display().to_string();
        }
        if let Some(path) = &self.scope {
            settings.scope.path = path.display().to_string();
        }
        if let Command::Ask {
            max_violations: Some(n),
            ..
        } = &self.command
        {
            settings.narrative.max_violations = Some(*n);
        }
    }
}
