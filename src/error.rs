//! Diagnostic error types for fuzzy variables.
//!
//! Every failure is reported through [`FuzzyError`]. Each variant carries a miette
//! error code and help text, and [`FuzzyError::kind`] classifies it into the coarse
//! [`ErrorKind`] taxonomy callers usually match on.

use miette::Diagnostic;
use thiserror::Error;

pub type FuzzyResult<T> = Result<T, FuzzyError>;

/// Coarse classification of a [`FuzzyError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// A membership curve's length disagrees with the universe's length.
    ShapeMismatch,
    /// A membership sample or degree falls outside [0, 1] beyond tolerance.
    Range,
    /// A pre-built term cannot be adopted under the requested key.
    Validation,
    /// The operation is not allowed in the variable's current state.
    State,
    /// The requested term label is not registered.
    Lookup,
    /// Bad construction parameters.
    Config,
    /// Defuzzification has nothing to weigh.
    DegenerateResult,
}

#[derive(Debug, Error, Diagnostic)]
pub enum FuzzyError {
    #[error("membership function {label} must be equivalent in length to the universe variable: expected {expected}, got {actual}")]
    #[diagnostic(
        code(fuzzy::term::shape_mismatch),
        help("Sample the membership function over the variable's own universe.")
    )]
    ShapeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("membership function {label} contains values out of range; allowed range is [0, 1]")]
    #[diagnostic(
        code(fuzzy::term::out_of_range),
        help("Every sample must lie within [0, 1] (a tolerance of 1e-6 is allowed at either end).")
    )]
    OutOfRange { label: String },

    #[error("membership degree {value} is out of range; allowed range is [0, 1]")]
    #[diagnostic(code(fuzzy::term::degree_out_of_range))]
    DegreeOutOfRange { value: f64 },

    #[error("term's label '{label}' must match new key '{key}'")]
    #[diagnostic(code(fuzzy::term::label_mismatch))]
    LabelMismatch { label: String, key: String },

    #[error("term '{label}' must not already have a parent")]
    #[diagnostic(
        code(fuzzy::term::already_bound),
        help("A term belongs to exactly one variable. Build a fresh term from its curve instead.")
    )]
    AlreadyBound { label: String },

    #[error("term '{label}' must be bound to a parent first")]
    #[diagnostic(code(fuzzy::term::unbound))]
    Unbound { label: String },

    #[error("cannot add terms to {variable} after accessing its crisp value")]
    #[diagnostic(
        code(fuzzy::variable::locked),
        help("Register every term before fuzzifying or defuzzifying the variable.")
    )]
    Locked { variable: String },

    #[error("variable {variable} has no terms; set term membership function(s) first")]
    #[diagnostic(code(fuzzy::variable::no_terms))]
    NoTerms { variable: String },

    #[error("no terms of {variable} have memberships")]
    #[diagnostic(
        code(fuzzy::variable::no_memberships),
        help(
            "Make sure at least one rule is connected to this variable and the rules \
             have been evaluated before reading its crisp value."
        )
    )]
    NoMemberships { variable: String },

    #[error("membership function '{key}' does not exist for variable {variable}.\nAvailable options: {options}")]
    #[diagnostic(code(fuzzy::variable::unknown_term))]
    UnknownTerm {
        key: String,
        variable: String,
        options: String,
    },

    #[error("unknown defuzzification method '{name}'")]
    #[diagnostic(
        code(fuzzy::config::unknown_defuzzify_method),
        help("Use one of: centroid, bisector, mom, som, lom.")
    )]
    UnknownDefuzzifyMethod { name: String },

    #[error("unsupported term count: {reason}")]
    #[diagnostic(
        code(fuzzy::config::unsupported_term_count),
        help("Only 3, 5 or 7 default terms are supported, or an odd list of at least 3 names.")
    )]
    UnsupportedTermCount { reason: String },

    #[error("invalid universe: {reason}")]
    #[diagnostic(code(fuzzy::config::invalid_universe))]
    InvalidUniverse { reason: String },

    #[error("invalid shape for term {label}: {reason}")]
    #[diagnostic(code(fuzzy::config::invalid_shape))]
    InvalidShape { label: String, reason: String },

    #[error("invalid variable configuration: {source}")]
    #[diagnostic(code(fuzzy::config::parse))]
    Config {
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot defuzzify with {method}: {reason}")]
    #[diagnostic(
        code(fuzzy::defuzz::degenerate),
        help("The aggregated membership curve is identically zero, so there is no area to weigh.")
    )]
    DegenerateResult { method: &'static str, reason: String },
}

impl FuzzyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::OutOfRange { .. } | Self::DegreeOutOfRange { .. } => ErrorKind::Range,
            Self::LabelMismatch { .. } | Self::AlreadyBound { .. } | Self::Unbound { .. } => ErrorKind::Validation,
            Self::Locked { .. } | Self::NoTerms { .. } | Self::NoMemberships { .. } => ErrorKind::State,
            Self::UnknownTerm { .. } => ErrorKind::Lookup,
            Self::UnknownDefuzzifyMethod { .. }
            | Self::UnsupportedTermCount { .. }
            | Self::InvalidUniverse { .. }
            | Self::InvalidShape { .. }
            | Self::Config { .. } => ErrorKind::Config,
            Self::DegenerateResult { .. } => ErrorKind::DegenerateResult,
        }
    }
}

impl From<toml::de::Error> for FuzzyError {
    fn from(source: toml::de::Error) -> Self {
        Self::Config { source }
    }
}

#[test]
fn test_kinds() {
    let err = FuzzyError::Locked {
        variable: "quality".into(),
    };
    assert_eq!(err.kind(), ErrorKind::State);

    let err = FuzzyError::DegreeOutOfRange { value: 1.5 };
    assert_eq!(err.kind(), ErrorKind::Range);

    let err = FuzzyError::UnknownDefuzzifyMethod { name: "foo".into() };
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(err.to_string(), "unknown defuzzification method 'foo'");
}
