use std::fmt;
use std::ops::Not;

use crate::error::{FuzzyError, FuzzyResult};
use crate::variable::VariableKey;

/// Slack allowed on either side of [0, 1] before a membership value is rejected.
pub const MEMBERSHIP_TOLERANCE: f64 = 1e-6;

/// A value between zero and one
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ZeroOne(f64);

impl ZeroOne {
    pub const ZERO: ZeroOne = ZeroOne(0.);
    pub const ONE: ZeroOne = ZeroOne(1.);

    /// Values within [`MEMBERSHIP_TOLERANCE`] of the interval are clamped into it.
    pub fn new(value: f64) -> FuzzyResult<Self> {
        if in_range(value) {
            Ok(ZeroOne(value.clamp(0., 1.)))
        } else {
            Err(FuzzyError::DegreeOutOfRange { value })
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Logical complement, `1 - self`.
impl Not for ZeroOne {
    type Output = ZeroOne;

    fn not(self) -> ZeroOne {
        ZeroOne(1. - self.0)
    }
}

impl From<ZeroOne> for f64 {
    fn from(value: ZeroOne) -> f64 {
        value.0
    }
}

pub(crate) fn in_range(value: f64) -> bool {
    (-MEMBERSHIP_TOLERANCE..=1. + MEMBERSHIP_TOLERANCE).contains(&value)
}

/// A labelled membership function (fuzzy set) over a variable's universe.
///
/// The label and curve are fixed at construction. The degree is per-evaluation state: the
/// truth value of this term for whatever item is currently being evaluated, or `None` when
/// nothing is known yet.
#[derive(Clone, Debug)]
pub struct Term {
    label: String,
    membership: Vec<f64>,
    parent: Option<VariableKey>,
    degree: Option<ZeroOne>,
}

impl Term {
    /// Creates a detached term. It is validated against a universe when registered on a variable.
    pub fn new(label: impl Into<String>, membership: impl Into<Vec<f64>>) -> Self {
        Term {
            label: label.into(),
            membership: membership.into(),
            parent: None,
            degree: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn membership(&self) -> &[f64] {
        &self.membership
    }

    /// Key of the variable this term is registered on, if any.
    pub fn parent(&self) -> Option<VariableKey> {
        self.parent
    }

    pub fn is_bound(&self) -> bool {
        self.parent.is_some()
    }

    pub fn degree(&self) -> Option<f64> {
        self.degree.map(ZeroOne::get)
    }

    pub fn set_degree(&mut self, degree: f64) -> FuzzyResult<()> {
        self.degree = Some(ZeroOne::new(degree)?);
        Ok(())
    }

    pub fn clear_degree(&mut self) {
        self.degree = None;
    }

    pub(crate) fn set_zero_one_degree(&mut self, degree: ZeroOne) {
        self.degree = Some(degree);
    }

    pub(crate) fn bind(&mut self, parent: VariableKey) {
        debug_assert!(self.parent.is_none(), "terms are bound exactly once");
        self.parent = Some(parent);
    }

    /// Min-implication: the curve cut off at the current degree, if one is set.
    pub fn cut(&self) -> Option<Vec<f64>> {
        let degree = self.degree?.get();

        Some(self.membership.iter().map(|&m| f64::min(degree, m)).collect())
    }

    /// The complementary term `NOT-<label>`, carrying `1 - degree` when a degree is set.
    pub(crate) fn negated(&self) -> Term {
        Term {
            label: negated_label(&self.label),
            membership: self.membership.iter().map(|&m| 1. - m).collect(),
            parent: None,
            degree: self.degree.map(Not::not),
        }
    }
}

pub(crate) fn negated_label(label: &str) -> String {
    format!("NOT-{label}")
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[test]
fn test_zero_one() {
    assert_eq!(ZeroOne::new(0.25).unwrap().get(), 0.25);
    assert_eq!(ZeroOne::new(1. + 5e-7).unwrap(), ZeroOne::ONE);
    assert_eq!(ZeroOne::new(-5e-7).unwrap(), ZeroOne::ZERO);
    assert!(ZeroOne::new(1.5).is_err());
    assert!(ZeroOne::new(f64::NAN).is_err());
    assert_eq!((!ZeroOne::new(0.25).unwrap()).get(), 0.75);
}

#[test]
fn test_cut() {
    let mut term = Term::new("warm", vec![0., 0.5, 1., 0.5, 0.]);

    assert_eq!(term.cut(), None);

    term.set_degree(0.6).unwrap();

    assert_eq!(term.cut(), Some(vec![0., 0.5, 0.6, 0.5, 0.]));
    assert_eq!(term.degree(), Some(0.6));

    term.clear_degree();

    assert_eq!(term.degree(), None);
}

#[test]
fn test_negated() {
    let mut term = Term::new("warm", vec![0., 0.25, 1.]);

    term.set_degree(0.25).unwrap();

    let not_warm = term.negated();

    assert_eq!(not_warm.label(), "NOT-warm");
    assert_eq!(not_warm.membership(), &[1., 0.75, 0.]);
    assert_eq!(not_warm.degree(), Some(0.75));
    assert!(!not_warm.is_bound());
}
