//! Declarative variable descriptions, usually loaded from TOML.
//!
//! ```toml
//! label = "tip"
//! defuzzify_method = "centroid"
//! universe = { start = 0.0, stop = 25.0, step = 1.0 }
//!
//! [[terms]]
//! label = "low"
//! triangle = [0.0, 0.0, 13.0]
//!
//! [[terms]]
//! label = "high"
//! points = [[13.0, 0.0], [25.0, 1.0]]
//! ```

use serde::Deserialize;
use tracing::debug;

use crate::automf::AutoMf;
use crate::defuzz::DefuzzifyMethod;
use crate::error::{FuzzyError, FuzzyResult};
use crate::math::{interp_all, trimf};
use crate::universe::Universe;
use crate::variable::{VariableKey, Variables};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct VariableConfig {
    pub label: String,
    pub universe: UniverseConfig,
    #[serde(default)]
    pub defuzzify_method: DefuzzifyMethod,
    /// Generated before `terms` are added, so `terms` may extend or override it
    #[serde(default)]
    pub automf: Option<AutoMf>,
    #[serde(default)]
    pub terms: Vec<TermConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UniverseConfig {
    Points { points: Vec<f64> },
    Range { start: f64, stop: f64, step: f64 },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TermConfig {
    pub label: String,
    #[serde(flatten)]
    pub shape: ShapeConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ShapeConfig {
    /// `(x, membership)` breakpoints, linearly interpolated onto the universe
    Points { points: Vec<(f64, f64)> },
    /// Feet and peak of a triangle
    Triangle { triangle: [f64; 3] },
    /// One membership value per universe sample
    Curve { curve: Vec<f64> },
}

impl VariableConfig {
    pub fn from_toml_str(s: &str) -> FuzzyResult<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl UniverseConfig {
    pub fn build(&self) -> FuzzyResult<Universe> {
        match self {
            Self::Points { points } => Universe::new(points.clone()),
            Self::Range { start, stop, step } => Universe::from_range(*start..=*stop, *step),
        }
    }
}

impl TermConfig {
    /// Samples the shape over `universe`.
    pub fn curve(&self, universe: &Universe) -> FuzzyResult<Vec<f64>> {
        match &self.shape {
            ShapeConfig::Points { points } => {
                if points.is_empty() {
                    return Err(self.invalid("no breakpoints given"));
                }

                let mut points = points.clone();
                points.sort_by(|a, b| a.0.total_cmp(&b.0));

                Ok(interp_all(universe.as_slice(), &points))
            },
            ShapeConfig::Triangle { triangle: [a, b, c] } => {
                if !(a <= b && b <= c) {
                    return Err(self.invalid("triangle corners must satisfy a <= b <= c"));
                }

                Ok(trimf(universe, [*a, *b, *c]))
            },
            ShapeConfig::Curve { curve } => Ok(curve.clone()),
        }
    }

    fn invalid(&self, reason: &str) -> FuzzyError {
        FuzzyError::InvalidShape {
            label: self.label.clone(),
            reason: reason.into(),
        }
    }
}

impl Variables {
    /// Builds and registers a variable from its description.
    ///
    /// If any term is rejected the variable is not added.
    pub fn add_from_config(&mut self, config: &VariableConfig) -> FuzzyResult<VariableKey> {
        let universe = config.universe.build()?;
        let curves = config
            .terms
            .iter()
            .map(|term| Ok((term.label.clone(), term.curve(&universe)?)))
            .collect::<FuzzyResult<Vec<_>>>()?;

        let key = self.add(config.label.clone(), universe, config.defuzzify_method);

        if let Err(err) = self.populate(key, config.automf.as_ref(), curves) {
            self.remove(key);
            return Err(err);
        }

        debug!(variable = %config.label, terms = self[key].labels().len(), "loaded variable from config");

        Ok(key)
    }

    fn populate(&mut self, key: VariableKey, automf: Option<&AutoMf>, curves: Vec<(String, Vec<f64>)>) -> FuzzyResult<()> {
        let var = &mut self[key];

        if let Some(automf) = automf {
            var.automf(automf)?;
        }
        for (label, curve) in curves {
            var.insert(label, curve)?;
        }

        Ok(())
    }
}

#[test]
fn test_from_toml() {
    let config = VariableConfig::from_toml_str(
        r#"
        label = "tip"
        defuzzify_method = "mom"
        universe = { start = 0.0, stop = 10.0, step = 1.0 }

        [[terms]]
        label = "low"
        triangle = [0.0, 0.0, 5.0]

        [[terms]]
        label = "high"
        points = [[10.0, 1.0], [5.0, 0.0]]

        [[terms]]
        label = "flat"
        curve = [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]
        "#,
    )
    .unwrap();

    assert_eq!(config.defuzzify_method, DefuzzifyMethod::MeanOfMaximum);
    assert_eq!(config.terms.len(), 3);

    let mut vars = Variables::new();
    let key = vars.add_from_config(&config).unwrap();
    let var = &vars[key];

    assert_eq!(var.len(), 11);
    assert_eq!(var.labels().collect::<Vec<_>>(), vec!["low", "high", "flat"]);
    assert_eq!(var.term("low").unwrap().membership()[0], 1.);
    assert_eq!(
        var.term("high").unwrap().membership(),
        &[0., 0., 0., 0., 0., 0., 0.2, 0.4, 0.6, 0.8, 1.]
    );
}

#[test]
fn test_from_toml_automf() {
    let config = VariableConfig::from_toml_str(
        r#"
        label = "service"
        universe = { points = [0.0, 2.5, 5.0, 7.5, 10.0] }

        [automf]
        number = 3
        "#,
    )
    .unwrap();

    let mut vars = Variables::new();
    let key = vars.add_from_config(&config).unwrap();

    assert_eq!(vars[key].defuzzify_method(), DefuzzifyMethod::Centroid);
    assert_eq!(vars[key].labels().collect::<Vec<_>>(), vec!["poor", "average", "good"]);
}

#[test]
fn test_bad_config() {
    use crate::error::ErrorKind;

    let err = VariableConfig::from_toml_str(
        r#"
        label = "tip"
        defuzzify_method = "median"
        universe = { points = [0.0, 1.0] }
        "#,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);

    let config = VariableConfig::from_toml_str(
        r#"
        label = "tip"
        universe = { points = [0.0, 1.0] }

        [[terms]]
        label = "wide"
        curve = [0.0, 1.0, 0.0]
        "#,
    )
    .unwrap();

    let mut vars = Variables::new();
    let err = vars.add_from_config(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert!(vars.is_empty());
}
