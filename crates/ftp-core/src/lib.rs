//! # ftp-core
//!
//! Foundation types shared by every FTP analyzer crate:
//!
//! - **Values**: [`Value`], the scalar stored in a dataset cell
//! - **Datasets**: [`Dataset`] and [`Row`], plus JSON / CSV loaders
//! - **Violations**: [`Violation`], one rule-row match with a JSON-safe row snapshot
//! - **Tables**: [`Table`], the structured answer shape, with plain-text rendering
//! - **Facts**: [`FactPack`], the data handed to the generative model
//! - **Logging**: `tracing` subscriber setup and test capture helpers

#![deny(unsafe_code)]

pub mod dataset;
pub mod errors;
pub mod facts;
pub mod logging;
pub mod table;
pub mod value;
pub mod violation;

pub use dataset::{Dataset, Row, load_dataset, parse_csv, parse_json_records};
pub use errors::DatasetError;
pub use facts::FactPack;
pub use table::Table;
pub use value::Value;
pub use violation::{EVALUATION_ERROR_PREFIX, Violation};
