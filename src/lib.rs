//! Fuzzy linguistic variables.
//!
//! A [`FuzzyVariable`] is a sampled universe annotated with named, overlapping membership
//! functions ([`Term`]s). Setting a crisp value fuzzifies it into a degree for every term;
//! reading the crisp value cuts each term at its degree, unions the cuts and defuzzifies the
//! result.
//!
//! ```
//! use fuzzy_variable::{DefuzzifyMethod, Universe, Variables};
//!
//! let mut vars = Variables::new();
//! let tip = vars.add("tip", Universe::from_range(0. ..=10., 1.)?, DefuzzifyMethod::Centroid);
//! let var = &mut vars[tip];
//!
//! var.insert("low", (0..=10).map(|u| 1. - f64::from(u) / 10.).collect::<Vec<_>>())?;
//! var.insert("high", (0..=10).map(|u| f64::from(u) / 10.).collect::<Vec<_>>())?;
//!
//! var.term_mut("low")?.set_degree(0.3)?;
//! var.term_mut("high")?.set_degree(0.7)?;
//!
//! let crisp = var.crisp_value()?;
//! assert!(crisp > 5. && crisp < 10.);
//! # Ok::<(), fuzzy_variable::FuzzyError>(())
//! ```

mod automf;
mod config;
mod defuzz;
mod error;
mod linspace;
mod math;
mod term;
mod universe;
mod variable;

pub use automf::{AutoMf, VariableType};
pub use config::{ShapeConfig, TermConfig, UniverseConfig, VariableConfig};
pub use defuzz::DefuzzifyMethod;
pub use error::{ErrorKind, FuzzyError, FuzzyResult};
pub use math::trimf;
pub use term::{Term, ZeroOne, MEMBERSHIP_TOLERANCE};
pub use universe::{Universe, MAX_SAMPLES};
pub use variable::{Aggregation, FuzzyVariable, NewTerm, VariableKey, Variables};
