use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{FuzzyError, FuzzyResult};
use crate::linspace::Linspace;
use crate::math::trimf;
use crate::variable::FuzzyVariable;

const QUALITY_NAMES: [&str; 7] = ["dismal", "poor", "mediocre", "average", "decent", "good", "excellent"];
const QUANT_NAMES: [&str; 7] = ["lowest", "lower", "low", "average", "high", "higher", "highest"];

/// Naming convention for generated terms.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Continuous variable where higher values are better: poor, average, good, ...
    #[default]
    Quality,
    /// Quantitative variable with no value judgement: low, average, high, ...
    Quant,
}

impl FromStr for VariableType {
    type Err = FuzzyError;

    fn from_str(s: &str) -> FuzzyResult<Self> {
        if s.eq_ignore_ascii_case("quality") {
            Ok(Self::Quality)
        } else {
            // Anything that isn't a quality scale is treated as quantitative
            Ok(Self::Quant)
        }
    }
}

/// Parameters for [`FuzzyVariable::automf`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoMf {
    /// 3, 5 or 7; ignored when `names` is given
    pub number: usize,
    pub variable_type: VariableType,
    /// Explicit term names, an odd count of at least three
    pub names: Option<Vec<String>>,
    /// Reverse the naming order. Peaks still march from lowest to highest.
    pub invert: bool,
}

impl Default for AutoMf {
    fn default() -> Self {
        Self {
            number: 5,
            variable_type: VariableType::Quality,
            names: None,
            invert: false,
        }
    }
}

impl AutoMf {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    pub fn with_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn variable_type(mut self, variable_type: VariableType) -> Self {
        self.variable_type = variable_type;
        self
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    fn term_names(&self) -> FuzzyResult<Vec<String>> {
        let mut names = match &self.names {
            Some(names) => {
                if names.len() < 3 || names.len() % 2 != 1 {
                    return Err(FuzzyError::UnsupportedTermCount {
                        reason: format!("must provide an odd number of at least 3 names, got {}", names.len()),
                    });
                }
                names.clone()
            },
            None => {
                let all = match self.variable_type {
                    VariableType::Quality => &QUALITY_NAMES,
                    VariableType::Quant => &QUANT_NAMES,
                };
                let picked: Vec<&str> = match (self.number, self.variable_type) {
                    (3, VariableType::Quality) => all.iter().copied().skip(1).step_by(2).take(3).collect(),
                    (3, VariableType::Quant) => all[2..5].to_vec(),
                    (5, _) => all[1..6].to_vec(),
                    (7, _) => all.to_vec(),
                    (number, _) => {
                        return Err(FuzzyError::UnsupportedTermCount {
                            reason: format!("only number = 3, 5, or 7 supported, got {number}"),
                        })
                    },
                };
                picked.into_iter().map(String::from).collect()
            },
        };

        if self.invert {
            names.reverse();
        }

        Ok(names)
    }
}

impl FuzzyVariable {
    /// Replaces all terms with overlapping triangles spread evenly across the universe.
    ///
    /// With `n` terms the peaks sit at `n` evenly spaced points from the universe minimum to
    /// its maximum, and each triangle reaches the neighbouring peaks.
    pub fn automf(&mut self, params: &AutoMf) -> FuzzyResult<()> {
        let names = params.term_names()?;
        let number = names.len();
        let (min_u, max_u) = (self.universe().min(), self.universe().max());
        let width = (max_u - min_u) / ((number - 1) as f64 / 2.);

        let curves = names
            .into_iter()
            .zip(Linspace::new(min_u, max_u, number))
            .map(|(name, center)| {
                let abc = [center - width / 2., center, center + width / 2.];
                (name, trimf(self.universe(), abc))
            })
            .collect();

        debug!(variable = %self.label(), number, "generating membership functions");

        self.replace_terms(curves)
    }
}

#[cfg(test)]
fn test_variable() -> (crate::variable::Variables, crate::variable::VariableKey) {
    use crate::{DefuzzifyMethod, Universe, Variables};

    let mut vars = Variables::new();
    let key = vars.add(
        "service",
        Universe::from_range(0. ..=10., 1.).unwrap(),
        DefuzzifyMethod::Centroid,
    );

    (vars, key)
}

#[test]
fn test_automf_quality() {
    let (mut vars, key) = test_variable();
    let var = &mut vars[key];

    var.automf(&AutoMf::new(3)).unwrap();

    assert_eq!(var.labels().collect::<Vec<_>>(), vec!["poor", "average", "good"]);
    assert_eq!(
        var.term("poor").unwrap().membership(),
        &[1., 0.8, 0.6, 0.4, 0.2, 0., 0., 0., 0., 0., 0.]
    );
    assert_eq!(
        var.term("average").unwrap().membership(),
        &[0., 0.2, 0.4, 0.6, 0.8, 1., 0.8, 0.6, 0.4, 0.2, 0.]
    );
    assert_eq!(var.term("good").unwrap().membership()[10], 1.);
}

#[test]
fn test_automf_names() {
    let (mut vars, key) = test_variable();
    let var = &mut vars[key];

    var.automf(&AutoMf::new(5).variable_type(VariableType::Quant).invert(true))
        .unwrap();

    assert_eq!(
        var.labels().collect::<Vec<_>>(),
        vec!["higher", "high", "average", "low", "lower"]
    );
    assert_eq!(var.term("higher").unwrap().membership()[0], 1.);

    var.automf(&AutoMf::new(3).variable_type(VariableType::Quant)).unwrap();

    assert_eq!(var.labels().collect::<Vec<_>>(), vec!["low", "average", "high"]);

    var.automf(&AutoMf::with_names(["cold", "mild", "warm", "hot", "scorching"]))
        .unwrap();

    assert_eq!(var.labels().count(), 5);
    assert_eq!(var.term("warm").unwrap().membership()[5], 1.);
}

#[test]
fn test_automf_rejects() {
    use crate::error::ErrorKind;

    let (mut vars, key) = test_variable();
    let var = &mut vars[key];

    assert_eq!(var.automf(&AutoMf::new(4)).unwrap_err().kind(), ErrorKind::Config);
    assert_eq!(
        var.automf(&AutoMf::with_names(["a", "b"])).unwrap_err().kind(),
        ErrorKind::Config
    );

    var.automf(&AutoMf::new(7)).unwrap();
    var.set_crisp_value(5.).unwrap();

    assert_eq!(var.automf(&AutoMf::new(3)).unwrap_err().kind(), ErrorKind::State);
    assert_eq!(var.labels().count(), 7);
}
