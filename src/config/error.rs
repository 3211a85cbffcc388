//! Configuration error types.

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A rule's nested `use` value has a shape the traversal cannot visit.
    /// Fatal to the configuration pass: silently skipping could drop
    /// CSS-module handling for that rule.
    #[error("rule `{rule}` has a `use` value that is neither a loader entry nor a list")]
    UnexpectedUseShape { rule: String },
}
