use thiserror::Error;

/// Hard configuration errors surfaced to the caller.
///
/// The engine otherwise degrades silently: missing or non-numeric fields
/// contribute 0 to totals, blank grouping keys form their own group, and
/// unknown sort fields coerce to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A grouping field that resolves to nothing across the entire dataset is
    /// almost always a configuration typo; failing early beats silently
    /// producing a single blank bucket.
    #[error("grouping field does not match any record field: {0}")]
    UnknownGroupField(String),
}
