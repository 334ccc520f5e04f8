use std::ops::{Deref, RangeInclusive};

use crate::error::{FuzzyError, FuzzyResult};
use crate::linspace::Linspace;

/// Upper bound on the number of samples [`Universe::from_range`] will generate.
pub const MAX_SAMPLES: usize = 10_000_000;

/// The sampling grid shared by a variable and all of its terms.
///
/// Non-empty, finite and non-decreasing. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe(Vec<f64>);

impl Universe {
    pub fn new(points: impl Into<Vec<f64>>) -> FuzzyResult<Self> {
        let points = points.into();

        if points.is_empty() {
            return Err(FuzzyError::InvalidUniverse {
                reason: "a universe needs at least one sample".into(),
            });
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(FuzzyError::InvalidUniverse {
                reason: format!("sample {bad} is not finite"),
            });
        }
        if let Some(i) = points.windows(2).position(|w| w[1] < w[0]) {
            return Err(FuzzyError::InvalidUniverse {
                reason: format!("samples must be non-decreasing, but {} follows {}", points[i + 1], points[i]),
            });
        }

        Ok(Self(points))
    }

    /// Evenly spaced samples from `min` to `max` every `step`.
    pub fn from_range(universe_range: RangeInclusive<f64>, step: f64) -> FuzzyResult<Self> {
        let min_u = *universe_range.start();
        let max_u = *universe_range.end();

        if !(step.is_finite() && step > 0.) {
            return Err(FuzzyError::InvalidUniverse {
                reason: format!("step must be positive, got {step}"),
            });
        }
        if !(min_u.is_finite() && max_u.is_finite()) || min_u > max_u {
            return Err(FuzzyError::InvalidUniverse {
                reason: format!("bad range {min_u}..={max_u}"),
            });
        }

        // Truncate like an int() cast. Samples still span the whole range, so spacing may exceed step
        let steps = ((max_u - min_u) / step).floor();

        if !steps.is_finite() || steps >= MAX_SAMPLES as f64 {
            return Err(FuzzyError::InvalidUniverse {
                reason: format!("{min_u}..={max_u} every {step} needs more than {MAX_SAMPLES} samples"),
            });
        }

        let num = (steps as usize)
            .checked_add(1)
            .ok_or_else(|| FuzzyError::InvalidUniverse {
                reason: format!("too many samples in {min_u}..={max_u}"),
            })?;

        Self::new(Linspace::new(min_u, max_u, num).collect::<Vec<_>>())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn min(&self) -> f64 {
        self.0[0]
    }

    pub fn max(&self) -> f64 {
        self.0[self.0.len() - 1]
    }
}

impl Deref for Universe {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Universe {
    type Error = FuzzyError;

    fn try_from(points: Vec<f64>) -> FuzzyResult<Self> {
        Self::new(points)
    }
}

#[test]
fn test_universe_validation() {
    use crate::error::ErrorKind;

    assert_eq!(Universe::new(vec![]).unwrap_err().kind(), ErrorKind::Config);
    assert_eq!(Universe::new(vec![0., f64::NAN]).unwrap_err().kind(), ErrorKind::Config);
    assert_eq!(Universe::new(vec![0., 2., 1.]).unwrap_err().kind(), ErrorKind::Config);

    let universe = Universe::new(vec![0., 1., 1., 3.]).unwrap();

    assert_eq!(universe.len(), 4);
    assert_eq!(universe.min(), 0.);
    assert_eq!(universe.max(), 3.);
}

#[test]
fn test_universe_from_range() {
    let universe = Universe::from_range(0. ..=10., 1.).unwrap();

    assert_eq!(universe.as_slice(), &[0., 1., 2., 3., 4., 5., 6., 7., 8., 9., 10.]);

    let universe = Universe::from_range(5. ..=5., 0.5).unwrap();

    assert_eq!(universe.as_slice(), &[5.]);
    assert!(Universe::from_range(0. ..=1., 0.).is_err());
    assert!(Universe::from_range(1. ..=0., 0.1).is_err());
}

#[test]
fn test_universe_from_range_too_fine() {
    use crate::error::ErrorKind;

    let err = Universe::from_range(0. ..=1e300, 1e-300).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);

    let err = Universe::from_range(0. ..=1., 1e-9).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(Universe::from_range(0. ..=1., 0.25).unwrap().len(), 5);
}
