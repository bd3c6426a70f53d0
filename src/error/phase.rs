use thiserror::Error;

/// Reasons a declared phase cannot be turned into executable segments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhaseError {
    #[error("Phase '{phase}': duration not specified.")]
    DurationNotSpecified { phase: String },
    #[error("Phase '{phase}': duration and single_request are mutually exclusive.")]
    MutuallyExclusive { phase: String },
    #[error("Phase '{phase}': target_vus required.")]
    TargetVusRequired { phase: String },
    #[error("Phase '{phase}': target_vus required with increment.")]
    TargetVusRequiredWithIncrement { phase: String },
    #[error("Phase '{phase}': increment and increment_vus are both required together.")]
    IncrementPairing { phase: String },
    #[error("Phase '{phase}': invalid {field} '{value}': {reason}")]
    InvalidDuration {
        phase: String,
        field: &'static str,
        value: String,
        reason: String,
    },
}
