use std::fmt;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::defuzz::DefuzzifyMethod;
use crate::error::{FuzzyError, FuzzyResult};
use crate::math::interp;
use crate::term::{in_range, negated_label, Term, ZeroOne};
use crate::universe::Universe;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Arena owning every variable. Terms refer back to their variable by [`VariableKey`].
#[derive(Default)]
pub struct Variables(SlotMap<VariableKey, FuzzyVariable>);

impl Variables {
    pub fn new() -> Self {
        Self(SlotMap::with_key())
    }

    pub fn add(
        &mut self,
        label: impl Into<String>,
        universe: Universe,
        defuzzify_method: DefuzzifyMethod,
    ) -> VariableKey {
        let label = label.into();

        debug!(variable = %label, samples = universe.len(), %defuzzify_method, "adding variable");

        self.0
            .insert_with_key(|key| FuzzyVariable::new(key, label, universe, defuzzify_method))
    }

    pub fn get(&self, key: VariableKey) -> Option<&FuzzyVariable> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: VariableKey) -> Option<&mut FuzzyVariable> {
        self.0.get_mut(key)
    }

    /// Drops the variable together with all of its terms.
    pub fn remove(&mut self, key: VariableKey) -> Option<FuzzyVariable> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &FuzzyVariable)> {
        self.0.iter()
    }

    /// The term's label qualified by its parent, e.g. `velocity[fast]`.
    pub fn full_label(&self, term: &Term) -> FuzzyResult<String> {
        let parent = term
            .parent()
            .and_then(|key| self.0.get(key))
            .ok_or_else(|| FuzzyError::Unbound {
                label: term.label().to_owned(),
            })?;

        Ok(format!("{}[{}]", parent.label, term.label()))
    }
}

impl Index<VariableKey> for Variables {
    type Output = FuzzyVariable;

    fn index(&self, key: VariableKey) -> &FuzzyVariable {
        &self.0[key]
    }
}

impl IndexMut<VariableKey> for Variables {
    fn index_mut(&mut self, key: VariableKey) -> &mut FuzzyVariable {
        &mut self.0[key]
    }
}

/// What can be registered under a label: a bare curve or an already built term.
#[derive(Clone, Debug)]
pub enum NewTerm {
    Curve(Vec<f64>),
    Term(Term),
}

impl From<Vec<f64>> for NewTerm {
    fn from(curve: Vec<f64>) -> Self {
        NewTerm::Curve(curve)
    }
}

impl From<&[f64]> for NewTerm {
    fn from(curve: &[f64]) -> Self {
        NewTerm::Curve(curve.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for NewTerm {
    fn from(curve: [f64; N]) -> Self {
        NewTerm::Curve(curve.to_vec())
    }
}

impl From<Term> for NewTerm {
    fn from(term: Term) -> Self {
        NewTerm::Term(term)
    }
}

/// The combined membership profile of every term that currently has a degree.
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregation {
    /// Elementwise maximum of all cut curves
    pub membership: Vec<f64>,
    /// Each contributing term's curve cut at its degree, in term order
    pub cuts: IndexMap<String, Vec<f64>>,
}

/// A linguistic variable: a universe plus an ordered set of named terms over it.
///
/// The variable starts out accepting terms. The first time it is fuzzified with
/// [`set_crisp_value`](Self::set_crisp_value) or defuzzified with
/// [`crisp_value`](Self::crisp_value) it locks, and from then on its term set is frozen.
/// Term degrees stay writable.
#[derive(Debug)]
pub struct FuzzyVariable {
    key: VariableKey,
    label: String,
    universe: Universe,
    defuzzify_method: DefuzzifyMethod,
    terms: IndexMap<String, Term>,
    locked: bool,
}

impl FuzzyVariable {
    fn new(key: VariableKey, label: String, universe: Universe, defuzzify_method: DefuzzifyMethod) -> Self {
        Self {
            key,
            label,
            universe,
            defuzzify_method,
            terms: IndexMap::new(),
            locked: false,
        }
    }

    pub fn key(&self) -> VariableKey {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Number of samples in the universe.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.universe.len()
    }

    pub fn defuzzify_method(&self) -> DefuzzifyMethod {
        self.defuzzify_method
    }

    pub fn set_defuzzify_method(&mut self, defuzzify_method: DefuzzifyMethod) {
        self.defuzzify_method = defuzzify_method;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.values()
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.terms.contains_key(label)
    }

    pub fn term(&self, label: &str) -> FuzzyResult<&Term> {
        self.terms.get(label).ok_or_else(|| self.unknown_term(label))
    }

    /// Mutable access to a term, for writing its degree.
    pub fn term_mut(&mut self, label: &str) -> FuzzyResult<&mut Term> {
        match self.terms.get_index_of(label) {
            Some(index) => Ok(&mut self.terms[index]),
            None => Err(self.unknown_term(label)),
        }
    }

    /// Registers a term under `label`, replacing any term already there (in its old position).
    ///
    /// A bare curve is wrapped in a new term. A pre-built term must carry the same label and
    /// must not belong to any variable yet. Nothing changes unless every check passes.
    pub fn insert(&mut self, label: impl Into<String>, item: impl Into<NewTerm>) -> FuzzyResult<&mut Term> {
        let label = label.into();
        let mut term = match item.into() {
            NewTerm::Term(term) => {
                if term.label() != label {
                    return Err(FuzzyError::LabelMismatch {
                        label: term.label().to_owned(),
                        key: label,
                    });
                }
                if term.is_bound() {
                    return Err(FuzzyError::AlreadyBound { label });
                }
                term
            },
            NewTerm::Curve(curve) => Term::new(label.clone(), curve),
        };

        // TODO: Allow adding terms after locking once degrees can be recomputed for them
        if self.locked {
            return Err(FuzzyError::Locked {
                variable: self.label.clone(),
            });
        }

        let membership = term.membership();

        if membership.len() != self.universe.len() {
            return Err(FuzzyError::ShapeMismatch {
                label,
                expected: self.universe.len(),
                actual: membership.len(),
            });
        }
        if !membership.iter().copied().all(in_range) {
            return Err(FuzzyError::OutOfRange { label });
        }

        term.bind(self.key);

        let (index, replaced) = self.terms.insert_full(label, term);

        debug!(variable = %self.label, term = %self.terms[index], replaced = replaced.is_some(), "registered term");

        Ok(&mut self.terms[index])
    }

    /// The complement `NOT-<label>` of a registered term, derived and registered on first use.
    ///
    /// Later calls return the registered term as is; it is not recomputed if the positive
    /// term is overwritten afterwards.
    pub fn negation(&mut self, label: &str) -> FuzzyResult<&Term> {
        let not_label = negated_label(label);

        if let Some(index) = self.terms.get_index_of(&not_label) {
            return Ok(&self.terms[index]);
        }

        let negated = self.term(label)?.negated();

        debug!(variable = %self.label, term = %not_label, "deriving negated term");

        let term = self.insert(not_label, negated)?;

        Ok(&*term)
    }

    /// Fuzzifies `value`: every term's degree becomes its curve interpolated at `value`.
    ///
    /// Values outside the universe take the boundary sample. Locks the variable.
    pub fn set_crisp_value(&mut self, value: f64) -> FuzzyResult<()> {
        if self.terms.is_empty() {
            return Err(FuzzyError::NoTerms {
                variable: self.label.clone(),
            });
        }

        let degrees = self
            .terms
            .values()
            .map(|term| ZeroOne::new(interp(value, self.universe.as_slice(), term.membership())))
            .collect::<FuzzyResult<Vec<_>>>()?;

        for (term, degree) in self.terms.values_mut().zip(degrees) {
            trace!(term = %term, degree = degree.get(), "fuzzified");
            term.set_zero_one_degree(degree);
        }

        self.lock();

        Ok(())
    }

    /// Defuzzifies the current term degrees into one crisp value. Locks the variable.
    pub fn crisp_value(&mut self) -> FuzzyResult<f64> {
        let aggregation = self.aggregate()?;
        let crisp = self
            .defuzzify_method
            .call(self.universe.as_slice(), &aggregation.membership)?;

        debug!(
            variable = %self.label,
            method = %self.defuzzify_method,
            terms = aggregation.cuts.len(),
            crisp,
            "defuzzified"
        );

        self.lock();

        Ok(crisp)
    }

    /// Cuts every term with a degree at that degree (min) and unions the cuts (max).
    ///
    /// Terms without a degree take no part. Does not lock the variable.
    pub fn aggregate(&self) -> FuzzyResult<Aggregation> {
        if self.terms.is_empty() {
            return Err(FuzzyError::NoTerms {
                variable: self.label.clone(),
            });
        }

        let mut membership = vec![0.; self.universe.len()];
        let mut cuts = IndexMap::new();

        for (label, term) in &self.terms {
            let Some(cut) = term.cut() else {
                continue;
            };

            for (agg, &m) in membership.iter_mut().zip(&cut) {
                *agg = f64::max(*agg, m);
            }

            cuts.insert(label.clone(), cut);
        }

        if cuts.is_empty() {
            return Err(FuzzyError::NoMemberships {
                variable: self.label.clone(),
            });
        }

        Ok(Aggregation { membership, cuts })
    }

    /// Current degree of every term, in term order.
    pub fn memberships(&self) -> IndexMap<&str, Option<f64>> {
        self.terms
            .iter()
            .map(|(label, term)| (label.as_str(), term.degree()))
            .collect()
    }

    /// Forgets every term's degree, ready for the next evaluation.
    pub fn clear_degrees(&mut self) {
        for term in self.terms.values_mut() {
            term.clear_degree();
        }
    }

    /// Swaps the whole term set for `curves`, or changes nothing if any of them is rejected.
    pub(crate) fn replace_terms(&mut self, curves: Vec<(String, Vec<f64>)>) -> FuzzyResult<()> {
        if self.locked {
            return Err(FuzzyError::Locked {
                variable: self.label.clone(),
            });
        }

        let previous = std::mem::take(&mut self.terms);

        for (label, curve) in curves {
            if let Err(err) = self.insert(label, curve) {
                self.terms = previous;
                return Err(err);
            }
        }

        Ok(())
    }

    fn lock(&mut self) {
        if !self.locked {
            debug!(variable = %self.label, "locking term set");
            self.locked = true;
        }
    }

    fn unknown_term(&self, key: &str) -> FuzzyError {
        FuzzyError::UnknownTerm {
            key: key.to_owned(),
            variable: self.label.clone(),
            options: format_options(self.labels()),
        }
    }
}

impl fmt::Display for FuzzyVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// `'a'; 'b', or 'c'.`
fn format_options<'a>(labels: impl ExactSizeIterator<Item = &'a str>) -> String {
    let n = labels.len();
    let mut options = String::new();

    for (i, label) in labels.enumerate() {
        let separator = if n >= 2 && i == n - 2 {
            ", or "
        } else if i == n - 1 {
            "."
        } else {
            "; "
        };

        options.push('\'');
        options.push_str(label);
        options.push('\'');
        options.push_str(separator);
    }

    options
}

#[cfg(test)]
fn test_variable(vars: &mut Variables) -> VariableKey {
    let universe = Universe::from_range(0. ..=10., 1.).unwrap();
    let key = vars.add("quality", universe, DefuzzifyMethod::Centroid);
    let low: Vec<f64> = (0..=10).map(|u| 1. - f64::from(u) / 10.).collect();
    let high: Vec<f64> = (0..=10).map(|u| f64::from(u) / 10.).collect();

    vars[key].insert("low", low).unwrap();
    vars[key].insert("high", high).unwrap();

    key
}

#[test]
fn test_format_options() {
    assert_eq!(format_options(["w", "x", "y", "z"].into_iter()), "'w'; 'x'; 'y', or 'z'.");
    assert_eq!(format_options(["a", "b", "c"].into_iter()), "'a'; 'b', or 'c'.");
    assert_eq!(format_options(["a", "b"].into_iter()), "'a', or 'b'.");
    assert_eq!(format_options(["a"].into_iter()), "'a'.");
    assert_eq!(format_options(std::iter::empty()), "");
}

#[test]
fn test_insert_validation() {
    use crate::error::ErrorKind;

    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    let err = var.insert("short", vec![0.; 3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

    let mut curve = vec![0.; 11];
    curve[4] = 1.5;
    let err = var.insert("hot", curve).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    let err = var.insert("mid", Term::new("middle", vec![0.5; 11])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Slightly outside [0, 1] is tolerated
    let mut curve = vec![0.; 11];
    curve[0] = 1. + 1e-7;
    curve[1] = -1e-7;
    var.insert("edge", curve).unwrap();

    assert_eq!(var.labels().collect::<Vec<_>>(), vec!["low", "high", "edge"]);
    assert!(!var.contains("short"));
}

#[test]
fn test_insert_already_bound() {
    use crate::error::ErrorKind;

    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let other = vars.add("other", Universe::from_range(0. ..=10., 1.).unwrap(), DefuzzifyMethod::Centroid);
    let bound = vars[key].term("low").unwrap().clone();

    let err = vars[other].insert("low", bound).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(vars[other].labels().next().is_none());
}

#[test]
fn test_overwrite_keeps_position() {
    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    var.term_mut("low").unwrap().set_degree(0.4).unwrap();
    var.insert("low", vec![0.5; 11]).unwrap();

    assert_eq!(var.labels().collect::<Vec<_>>(), vec!["low", "high"]);
    assert_eq!(var.term("low").unwrap().membership(), &[0.5; 11]);
    assert_eq!(var.term("low").unwrap().degree(), None);
}

#[test]
fn test_full_label() {
    let mut vars = Variables::new();
    let key = test_variable(&mut vars);

    assert_eq!(vars.full_label(vars[key].term("high").unwrap()).unwrap(), "quality[high]");
    assert!(vars.full_label(&Term::new("loose", vec![0.; 11])).is_err());
    assert_eq!(vars[key].term("high").unwrap().parent(), Some(key));
}

#[test]
fn test_lock() {
    use crate::error::ErrorKind;

    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    assert!(!var.is_locked());

    var.set_crisp_value(3.).unwrap();

    assert!(var.is_locked());

    let err = var.insert("mid", vec![0.5; 11]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::State);
    assert!(!var.contains("mid"));

    // Degrees stay writable
    var.term_mut("low").unwrap().set_degree(1.).unwrap();
}

#[test]
fn test_unknown_term() {
    use crate::error::ErrorKind;

    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let err = vars[key].term("medium").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(err.to_string().ends_with("Available options: 'low', or 'high'."));
}

#[test]
fn test_negation() {
    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    var.term_mut("high").unwrap().set_degree(0.75).unwrap();

    let not_high = var.negation("high").unwrap().clone();

    assert_eq!(not_high.label(), "NOT-high");
    assert_eq!(not_high.degree(), Some(0.25));
    for (n, h) in not_high.membership().iter().zip(var.term("high").unwrap().membership()) {
        assert_eq!(*n, 1. - h);
    }

    // Cached: a changed degree on the positive term is not pushed through
    var.term_mut("high").unwrap().set_degree(0.5).unwrap();

    assert_eq!(var.negation("high").unwrap().degree(), Some(0.25));
    assert_eq!(var.labels().collect::<Vec<_>>(), vec!["low", "high", "NOT-high"]);
    assert!(var.negation("medium").is_err());
}

#[test]
fn test_set_crisp_value() {
    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    var.set_crisp_value(2.5).unwrap();

    assert!((var.term("low").unwrap().degree().unwrap() - 0.75).abs() < 1e-12);
    assert!((var.term("high").unwrap().degree().unwrap() - 0.25).abs() < 1e-12);

    var.set_crisp_value(-4.).unwrap();

    assert_eq!(var.term("low").unwrap().degree(), Some(1.));
    assert_eq!(var.term("high").unwrap().degree(), Some(0.));

    var.set_crisp_value(7.).unwrap();

    assert_eq!(var.memberships()["high"], Some(0.7));

    var.clear_degrees();

    assert!(var.memberships().values().all(Option::is_none));
}

#[test]
fn test_aggregate_skips_unset() {
    use crate::error::ErrorKind;

    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    assert_eq!(var.aggregate().unwrap_err().kind(), ErrorKind::State);

    var.term_mut("high").unwrap().set_degree(0.5).unwrap();

    let aggregation = var.aggregate().unwrap();

    assert_eq!(aggregation.cuts.keys().collect::<Vec<_>>(), vec!["high"]);
    assert_eq!(aggregation.membership[0], 0.);
    assert_eq!(aggregation.membership[10], 0.5);
    assert!(!var.is_locked());
}

#[test]
fn test_crisp_value() {
    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    var.term_mut("low").unwrap().set_degree(0.3).unwrap();
    var.term_mut("high").unwrap().set_degree(0.7).unwrap();

    let aggregation = var.aggregate().unwrap();

    assert_eq!(aggregation.membership[2], 0.3);
    assert_eq!(aggregation.membership[4], 0.4);
    assert_eq!(aggregation.membership[8], 0.7);

    let crisp = var.crisp_value().unwrap();

    assert!((crisp - 33.3 / 5.5).abs() < 1e-9);
    assert!(crisp > 5. && crisp < 10.);
    assert!(var.is_locked());

    var.set_defuzzify_method(DefuzzifyMethod::SmallestOfMaximum);

    assert_eq!(var.crisp_value().unwrap(), 7.);
}

#[test]
fn test_replace_terms_is_atomic() {
    let mut vars = Variables::new();
    let key = test_variable(&mut vars);
    let var = &mut vars[key];

    let err = var.replace_terms(vec![("a".into(), vec![0.; 11]), ("b".into(), vec![2.; 11])]);

    assert!(err.is_err());
    assert_eq!(var.labels().collect::<Vec<_>>(), vec!["low", "high"]);
}
