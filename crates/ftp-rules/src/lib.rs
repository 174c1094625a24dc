//! # ftp-rules
//!
//! Policy rules and violation detection:
//!
//! - **Rule store**: [`load_rules`] reads the ordered [`Rule`] list, failing soft
//! - **Expressions**: [`expr`], the sandboxed condition language
//! - **Detection**: [`ViolationDetector`] evaluates every rule against every row
//! - **Scope**: [`apply_scope`] narrows violations to a named policy subset

#![deny(unsafe_code)]

pub mod detector;
pub mod errors;
pub mod expr;
pub mod scope;
pub mod store;
pub mod types;

pub use detector::{DetectorOptions, ViolationDetector, detect_violations, snapshot_row};
pub use errors::{ConfigError, ExprError, ExprResult};
pub use expr::{Bindings, Expression};
pub use scope::{Scope, ScopeOutcome, apply_scope, load_scope, parse_scope};
pub use store::{load_rules, parse_rules, read_rules};
pub use types::{DEFAULT_DESCRIPTION, Rule};
