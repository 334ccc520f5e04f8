//! End-to-end tests for fuzzy variables: registration invariants, fuzzification,
//! aggregation and defuzzification working together through the public API.

use fuzzy_variable::{
    AutoMf, DefuzzifyMethod, ErrorKind, Term, Universe, VariableConfig, VariableKey, Variables,
};

fn low_high(vars: &mut Variables, method: DefuzzifyMethod) -> VariableKey {
    let key = vars.add("quality", Universe::from_range(0. ..=10., 1.).unwrap(), method);
    let var = &mut vars[key];

    var.insert("low", (0..=10).map(|u| 1. - f64::from(u) / 10.).collect::<Vec<_>>())
        .unwrap();
    var.insert("high", (0..=10).map(|u| f64::from(u) / 10.).collect::<Vec<_>>())
        .unwrap();

    key
}

#[test]
fn registration_rejects_out_of_range_curve() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::Centroid);
    let mut curve = vec![0.5; 11];
    curve[3] = 1.5;

    let err = vars[key].insert("bad", curve).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(!vars[key].contains("bad"));
}

#[test]
fn registration_rejects_wrong_length() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::Centroid);

    for len in [0, 10, 12] {
        let err = vars[key].insert("bad", vec![0.; len]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }
}

#[test]
fn prebuilt_term_is_adopted() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::Centroid);
    let term = Term::new("mid", vec![0.5; 11]);

    assert!(!term.is_bound());

    let adopted = vars[key].insert("mid", term).unwrap();

    assert_eq!(adopted.parent(), Some(key));
    assert_eq!(vars.full_label(vars[key].term("mid").unwrap()).unwrap(), "quality[mid]");
}

#[test]
fn term_set_freezes_after_crisp_read_or_write() {
    let mut vars = Variables::new();
    let written = low_high(&mut vars, DefuzzifyMethod::Centroid);
    let read = low_high(&mut vars, DefuzzifyMethod::Centroid);

    vars[written].set_crisp_value(4.).unwrap();
    vars[read].term_mut("low").unwrap().set_degree(1.).unwrap();
    vars[read].crisp_value().unwrap();

    for key in [written, read] {
        let err = vars[key].insert("late", vec![0.; 11]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(vars[key].labels().collect::<Vec<_>>(), vec!["low", "high"]);

        let err = vars[key].negation("low").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::State);
    }
}

#[test]
fn failed_read_does_not_lock() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::Centroid);

    let err = vars[key].crisp_value().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::State);
    assert!(!vars[key].is_locked());
    vars[key].insert("mid", vec![0.5; 11]).unwrap();
}

#[test]
fn negation_is_idempotent() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::Centroid);
    let var = &mut vars[key];

    let first = var.negation("low").unwrap().clone();
    let second = var.negation("low").unwrap().clone();

    assert_eq!(first.membership(), second.membership());
    assert_eq!(first.degree(), None);
    assert_eq!(var.labels().filter(|l| *l == "NOT-low").count(), 1);

    let low = var.term("low").unwrap().membership().to_vec();

    for (n, l) in first.membership().iter().zip(&low) {
        assert_eq!(*n, 1. - l);
    }
}

#[test]
fn crisp_value_round_trips_through_interpolation() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::Centroid);
    let var = &mut vars[key];

    for u in 0..=10 {
        var.set_crisp_value(f64::from(u)).unwrap();

        assert_eq!(var.term("low").unwrap().degree(), Some(1. - f64::from(u) / 10.));
        assert_eq!(var.term("high").unwrap().degree(), Some(f64::from(u) / 10.));
    }

    var.set_crisp_value(6.5).unwrap();

    assert!((var.term("high").unwrap().degree().unwrap() - 0.65).abs() < 1e-12);

    var.set_crisp_value(25.).unwrap();

    assert_eq!(var.term("high").unwrap().degree(), Some(1.));
}

#[test]
fn centroid_leans_toward_stronger_term() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::Centroid);
    let var = &mut vars[key];

    var.term_mut("low").unwrap().set_degree(0.3).unwrap();
    var.term_mut("high").unwrap().set_degree(0.7).unwrap();

    let aggregation = var.aggregate().unwrap();
    let cut_low = f64::min(0.3, var.term("low").unwrap().membership()[2]);
    let cut_high = f64::min(0.7, var.term("high").unwrap().membership()[2]);

    assert_eq!(aggregation.membership[2], f64::max(cut_low, cut_high));
    assert_eq!(
        aggregation.membership,
        vec![0.3, 0.3, 0.3, 0.3, 0.4, 0.5, 0.6, 0.7, 0.7, 0.7, 0.7]
    );

    let crisp = var.crisp_value().unwrap();

    assert!((crisp - 33.3 / 5.5).abs() < 1e-9);
    assert!(crisp > 5. && crisp < 10.);
}

#[test]
fn unset_degrees_do_not_contribute() {
    let mut vars = Variables::new();
    let key = low_high(&mut vars, DefuzzifyMethod::LargestOfMaximum);
    let var = &mut vars[key];

    var.term_mut("low").unwrap().set_degree(0.5).unwrap();

    // "high" would push the largest maximum to 10 if it took part
    assert_eq!(var.crisp_value().unwrap(), 5.);
}

#[test]
fn degenerate_aggregation() {
    let mut vars = Variables::new();
    let key = vars.add(
        "flat",
        Universe::new(vec![0., 1., 2., 3.]).unwrap(),
        DefuzzifyMethod::Centroid,
    );
    let var = &mut vars[key];

    var.insert("nothing", vec![0.; 4]).unwrap();
    var.insert("other", vec![0.; 4]).unwrap();

    assert_eq!(var.crisp_value().unwrap_err().kind(), ErrorKind::State);

    var.term_mut("nothing").unwrap().set_degree(0.8).unwrap();

    assert_eq!(var.crisp_value().unwrap_err().kind(), ErrorKind::DegenerateResult);
}

#[test]
fn crisp_write_requires_terms() {
    let mut vars = Variables::new();
    let key = vars.add("empty", Universe::new(vec![0., 1.]).unwrap(), DefuzzifyMethod::Centroid);

    assert_eq!(vars[key].set_crisp_value(0.5).unwrap_err().kind(), ErrorKind::State);
}

#[test]
fn lookup_error_lists_options() {
    let mut vars = Variables::new();
    let key = vars.add("abc", Universe::new(vec![0., 1.]).unwrap(), DefuzzifyMethod::Centroid);

    for label in ["a", "b", "c"] {
        vars[key].insert(label, vec![0., 1.]).unwrap();
    }

    let err = vars[key].term("d").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(err.to_string().contains("'a'; 'b', or 'c'."));
}

#[test]
fn automf_then_fuzzify_and_defuzzify() {
    let mut vars = Variables::new();
    let key = vars.add(
        "service",
        Universe::from_range(0. ..=10., 0.5).unwrap(),
        DefuzzifyMethod::Bisector,
    );
    let var = &mut vars[key];

    var.automf(&AutoMf::new(3)).unwrap();
    var.set_crisp_value(5.).unwrap();

    assert_eq!(
        var.memberships().into_iter().collect::<Vec<_>>(),
        vec![("poor", Some(0.)), ("average", Some(1.)), ("good", Some(0.))]
    );

    let crisp = var.crisp_value().unwrap();

    assert!((crisp - 5.).abs() < 1e-9);
}

#[test]
fn config_round_trip_into_inference() {
    let config = VariableConfig::from_toml_str(
        r#"
        label = "tip"
        defuzzify_method = "centroid"
        universe = { start = 0.0, stop = 25.0, step = 1.0 }

        [[terms]]
        label = "low"
        triangle = [0.0, 0.0, 13.0]

        [[terms]]
        label = "high"
        triangle = [13.0, 25.0, 25.0]
        "#,
    )
    .unwrap();

    let mut vars = Variables::new();
    let key = vars.add_from_config(&config).unwrap();
    let var = &mut vars[key];

    var.term_mut("high").unwrap().set_degree(1.).unwrap();

    let crisp = var.crisp_value().unwrap();

    assert!(crisp > 13. && crisp <= 25.);
}
