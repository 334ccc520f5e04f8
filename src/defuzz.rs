use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;
use std::str::FromStr;

use num::Float;
use serde::Deserialize;

use crate::error::{FuzzyError, FuzzyResult};

/// Method for defuzzificating an aggregated membership function.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
pub enum DefuzzifyMethod {
    /// Center of gravity: the membership-weighted mean of the universe samples
    #[default]
    Centroid,
    /// The point splitting the area under the curve into two equal halves
    Bisector,
    /// Mean of the values for which the membership function is maximum
    MeanOfMaximum,
    /// Smallest value for which the membership function is maximum
    SmallestOfMaximum,
    /// Largest value for which the membership function is maximum
    LargestOfMaximum,
}

impl DefuzzifyMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::Centroid => "centroid",
            Self::Bisector => "bisector",
            Self::MeanOfMaximum => "mom",
            Self::SmallestOfMaximum => "som",
            Self::LargestOfMaximum => "lom",
        }
    }

    /// Collapses `membership`, sampled over `universe`, into a single crisp value.
    ///
    /// Maximum-based methods compare samples against the maximum with exact equality, so
    /// plateaus made of identical values are all candidates. An all-zero curve has no area,
    /// which is an error for [`Centroid`](Self::Centroid) and [`Bisector`](Self::Bisector).
    pub fn call<F: Float + Sum + AddAssign>(self, universe: &[F], membership: &[F]) -> FuzzyResult<F> {
        if universe.len() != membership.len() {
            return Err(FuzzyError::ShapeMismatch {
                label: "aggregated membership".into(),
                expected: universe.len(),
                actual: membership.len(),
            });
        }
        if universe.is_empty() {
            return Err(self.degenerate("the curve has no samples"));
        }

        match self {
            Self::Centroid => {
                let den = membership.iter().copied().sum::<F>();

                if den == F::zero() {
                    return Err(self.degenerate("total membership is zero"));
                }

                let num = universe
                    .iter()
                    .zip(membership)
                    .map(|(&u, &m)| u * m)
                    .sum::<F>();

                Ok(num / den)
            },
            Self::Bisector => {
                let two = F::one() + F::one();

                if universe.len() == 1 {
                    return if membership[0] > F::zero() {
                        Ok(universe[0])
                    } else {
                        Err(self.degenerate("total area is zero"))
                    };
                }

                let n_areas = universe.len() - 1;
                let areas: Vec<F> = (0..n_areas)
                    .map(|i| {
                        let base = universe[i + 1] - universe[i];
                        (membership[i] + membership[i + 1]) * base / two
                    })
                    .collect();

                let total_area = areas.iter().copied().sum::<F>();

                if total_area == F::zero() {
                    return Err(self.degenerate("total area is zero"));
                }

                let target = total_area / two;
                let mut cum_area = F::zero();
                let mut i_area = n_areas - 1;

                for (i, &area) in areas.iter().enumerate() {
                    cum_area += area;
                    if cum_area >= target {
                        i_area = i;
                        break;
                    }
                }

                // Rounding may leave cum_area a hair short of target; then the last segment holds it
                let (x0, x1) = (universe[i_area], universe[i_area + 1]);
                let (y0, y1) = (membership[i_area], membership[i_area + 1]);
                let width = x1 - x0;
                let remaining = F::max(target - (cum_area - areas[i_area]), F::zero());

                if width == F::zero() || remaining == F::zero() {
                    return Ok(x0);
                }

                // Area over [x0, x0 + d] is y0·d + k·d²/2; take the root in [0, width].
                // Written as 2r / (y0 + sqrt(y0² + 2kr)) so a flat segment (k = 0) needs no special case.
                let slope = (y1 - y0) / width;
                let disc = F::max(y0 * y0 + two * slope * remaining, F::zero());
                let d = two * remaining / (y0 + disc.sqrt());

                Ok(x0 + F::min(d, width))
            },
            Self::MeanOfMaximum => {
                let (len, sum) = maxima(universe, membership).fold((0usize, F::zero()), |(n, accum), u| (n + 1, accum + u));

                Ok(sum / F::from(len).expect("sample count fits in a float"))
            },
            Self::SmallestOfMaximum => Ok(maxima(universe, membership)
                .reduce(F::min)
                .expect("a non-empty curve has a maximum")),
            Self::LargestOfMaximum => Ok(maxima(universe, membership)
                .reduce(F::max)
                .expect("a non-empty curve has a maximum")),
        }
    }

    fn degenerate(self, reason: &str) -> FuzzyError {
        FuzzyError::DegenerateResult {
            method: self.name(),
            reason: reason.into(),
        }
    }
}

/// Universe coordinates whose membership equals the curve's maximum.
fn maxima<'a, F: Float>(universe: &'a [F], membership: &'a [F]) -> impl Iterator<Item = F> + 'a {
    let maximum = membership.iter().copied().fold(F::neg_infinity(), F::max);

    universe
        .iter()
        .zip(membership)
        .filter_map(move |(&u, &m)| if m == maximum { Some(u) } else { None })
}

impl FromStr for DefuzzifyMethod {
    type Err = FuzzyError;

    fn from_str(s: &str) -> FuzzyResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "centroid" => Ok(Self::Centroid),
            "bisector" => Ok(Self::Bisector),
            "mom" => Ok(Self::MeanOfMaximum),
            "som" => Ok(Self::SmallestOfMaximum),
            "lom" => Ok(Self::LargestOfMaximum),
            _ => Err(FuzzyError::UnknownDefuzzifyMethod { name: s.to_owned() }),
        }
    }
}

impl TryFrom<String> for DefuzzifyMethod {
    type Error = FuzzyError;

    fn try_from(s: String) -> FuzzyResult<Self> {
        s.parse()
    }
}

impl fmt::Display for DefuzzifyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
fn low_high_aggregate() -> (Vec<f64>, Vec<f64>) {
    let universe: Vec<f64> = (0..=10).map(f64::from).collect();
    let membership = vec![0.3, 0.3, 0.3, 0.3, 0.4, 0.5, 0.6, 0.7, 0.7, 0.7, 0.7];

    (universe, membership)
}

#[test]
fn test_centroid() {
    let (universe, membership) = low_high_aggregate();
    let crisp = DefuzzifyMethod::Centroid.call(&universe, &membership).unwrap();

    assert!((crisp - 33.3 / 5.5).abs() < 1e-9);
}

#[test]
fn test_bisector() {
    let (universe, membership) = low_high_aggregate();
    let crisp = DefuzzifyMethod::Bisector.call(&universe, &membership).unwrap();

    // Half the area (2.5) is reached inside [6, 7], where the cumulative area runs 2.25..2.9
    // and the curve rises from 0.6 with slope 0.1: 0.6·d + 0.05·d² = 0.25
    let expected = 6. + (-0.6 + f64::sqrt(0.6 * 0.6 + 2. * 0.1 * 0.25)) / 0.1;

    assert!((crisp - expected).abs() < 1e-9);
    assert!((area_below(&universe, &membership, crisp) - 2.5).abs() < 1e-9);

    let symmetric = [0., 0.5, 1., 0.5, 0.];
    let crisp = DefuzzifyMethod::Bisector
        .call(&[0., 1., 2., 3., 4.], &symmetric)
        .unwrap();

    assert!((crisp - 2.).abs() < 1e-12);
    assert_eq!(DefuzzifyMethod::Bisector.call(&[4.], &[0.5]).unwrap(), 4.);
}

/// Exact area under the piecewise-linear curve from the first sample up to `x`.
#[cfg(test)]
fn area_below(universe: &[f64], membership: &[f64], x: f64) -> f64 {
    let mut area = 0.;

    for i in 0..universe.len() - 1 {
        let (x0, x1) = (universe[i], universe[i + 1]);

        if x <= x0 {
            break;
        }

        let end = f64::min(x, x1);
        let y_end = membership[i] + (membership[i + 1] - membership[i]) * (end - x0) / (x1 - x0);

        area += (membership[i] + y_end) * (end - x0) / 2.;
    }

    area
}

#[test]
fn test_bisector_halves_area() {
    let universe = [0., 1., 3., 4., 7., 10.];
    let curves = [
        vec![0., 1., 0.2, 0.2, 0.9, 0.],
        vec![1., 0., 0., 0.3, 0.3, 0.3],
        vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.1],
        vec![0., 0., 0., 0., 0., 1.],
    ];

    for membership in curves {
        let crisp = DefuzzifyMethod::Bisector.call(&universe, &membership).unwrap();
        let total = area_below(&universe, &membership, 10.);
        let left = area_below(&universe, &membership, crisp);

        assert!((left - total / 2.).abs() < 1e-9, "{membership:?}: {left} vs {}", total / 2.);
    }
}

#[test]
fn test_rejects_bad_input() {
    use crate::error::ErrorKind;

    for method in [
        DefuzzifyMethod::Centroid,
        DefuzzifyMethod::Bisector,
        DefuzzifyMethod::MeanOfMaximum,
        DefuzzifyMethod::SmallestOfMaximum,
        DefuzzifyMethod::LargestOfMaximum,
    ] {
        let empty: [f64; 0] = [];

        assert_eq!(method.call(&empty, &empty).unwrap_err().kind(), ErrorKind::DegenerateResult);
        assert_eq!(
            method.call(&[0., 1., 2.], &[0.5, 1.]).unwrap_err().kind(),
            ErrorKind::ShapeMismatch
        );
    }
}

#[test]
fn test_maximum_methods() {
    let (universe, membership) = low_high_aggregate();

    assert_eq!(DefuzzifyMethod::MeanOfMaximum.call(&universe, &membership).unwrap(), 8.5);
    assert_eq!(DefuzzifyMethod::SmallestOfMaximum.call(&universe, &membership).unwrap(), 7.);
    assert_eq!(DefuzzifyMethod::LargestOfMaximum.call(&universe, &membership).unwrap(), 10.);
}

#[test]
fn test_degenerate() {
    use crate::error::ErrorKind;

    let universe = [0., 1., 2.];
    let zeros = [0., 0., 0.];

    for method in [DefuzzifyMethod::Centroid, DefuzzifyMethod::Bisector] {
        assert_eq!(
            method.call(&universe, &zeros).unwrap_err().kind(),
            ErrorKind::DegenerateResult
        );
    }

    // Every sample attains the (zero) maximum
    assert_eq!(DefuzzifyMethod::MeanOfMaximum.call(&universe, &zeros).unwrap(), 1.);
}

#[test]
fn test_parse() {
    assert_eq!("centroid".parse::<DefuzzifyMethod>().unwrap(), DefuzzifyMethod::Centroid);
    assert_eq!("MOM".parse::<DefuzzifyMethod>().unwrap(), DefuzzifyMethod::MeanOfMaximum);
    assert_eq!(DefuzzifyMethod::LargestOfMaximum.to_string(), "lom");
    assert!("median".parse::<DefuzzifyMethod>().is_err());
}
