use fuzzy_variable::{DefuzzifyMethod, ErrorKind, Universe, Variables};
use proptest::prelude::*;

fn curve() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=1.0, 11)
}

proptest! {
    #[test]
    fn registered_curves_stay_in_range(values in prop::collection::vec(-1.0f64..2.0, 11)) {
        let mut vars = Variables::new();
        let key = vars.add("v", Universe::from_range(0. ..=10., 1.).unwrap(), DefuzzifyMethod::Centroid);
        let in_range = values.iter().all(|v| (-1e-6..=1. + 1e-6).contains(v));

        match vars[key].insert("t", values) {
            Ok(_) => prop_assert!(in_range),
            Err(err) => {
                prop_assert!(!in_range);
                prop_assert_eq!(err.kind(), ErrorKind::Range);
            },
        }
    }

    #[test]
    fn fuzzified_degrees_interpolate_between_neighbours(membership in curve(), x in -2.0f64..12.0) {
        let mut vars = Variables::new();
        let key = vars.add("v", Universe::from_range(0. ..=10., 1.).unwrap(), DefuzzifyMethod::Centroid);

        vars[key].insert("t", membership.clone()).unwrap();
        vars[key].set_crisp_value(x).unwrap();

        let degree = vars[key].term("t").unwrap().degree().unwrap();
        let clamped = x.clamp(0., 10.);
        let (lo, hi) = (clamped.floor() as usize, clamped.ceil() as usize);
        let bounds = (f64::min(membership[lo], membership[hi]), f64::max(membership[lo], membership[hi]));

        prop_assert!(degree >= bounds.0 - 1e-12 && degree <= bounds.1 + 1e-12);
    }

    #[test]
    fn negation_complements_pointwise(membership in curve(), degree in 0.0f64..=1.0) {
        let mut vars = Variables::new();
        let key = vars.add("v", Universe::from_range(0. ..=10., 1.).unwrap(), DefuzzifyMethod::Centroid);
        let var = &mut vars[key];

        var.insert("t", membership.clone()).unwrap();
        var.term_mut("t").unwrap().set_degree(degree).unwrap();

        let negated = var.negation("t").unwrap();

        for (n, m) in negated.membership().iter().zip(&membership) {
            prop_assert_eq!(*n, 1. - m);
        }
        prop_assert_eq!(negated.degree(), Some(1. - degree));
    }

    #[test]
    fn crisp_value_stays_inside_universe(a in curve(), b in curve(), da in 0.01f64..=1.0, db in 0.01f64..=1.0) {
        prop_assume!(a.iter().any(|&m| m > 0.) || b.iter().any(|&m| m > 0.));

        for method in [
            DefuzzifyMethod::Centroid,
            DefuzzifyMethod::Bisector,
            DefuzzifyMethod::MeanOfMaximum,
            DefuzzifyMethod::SmallestOfMaximum,
            DefuzzifyMethod::LargestOfMaximum,
        ] {
            let mut vars = Variables::new();
            let key = vars.add("v", Universe::from_range(0. ..=10., 1.).unwrap(), method);
            let var = &mut vars[key];

            var.insert("a", a.clone()).unwrap();
            var.insert("b", b.clone()).unwrap();
            var.term_mut("a").unwrap().set_degree(da).unwrap();
            var.term_mut("b").unwrap().set_degree(db).unwrap();

            let crisp = var.crisp_value().unwrap();

            prop_assert!((-1e-9..=10. + 1e-9).contains(&crisp), "{} gave {}", method, crisp);
        }
    }
}
