use num::Float;

/// Linear interpolation of the sampled function `(xp, fp)` at `x`, similar to numpy.interp.
///
/// `xp` must be non-decreasing and the same length as `fp`. Queries outside `xp` clamp to the
/// boundary sample, and a query landing exactly on a sample returns that sample's value
/// (the last one, when `xp` repeats a coordinate).
pub(crate) fn interp<F: Float>(x: F, xp: &[F], fp: &[F]) -> F {
    debug_assert_eq!(xp.len(), fp.len());
    debug_assert!(!xp.is_empty());

    // Number of samples at or left of x
    let j = xp.partition_point(|&xi| xi <= x);

    // Base cases
    if j == 0 {
        return fp[0];
    }
    if j == xp.len() {
        return fp[fp.len() - 1];
    }

    let (x1, y1) = (xp[j - 1], fp[j - 1]);
    let (x2, y2) = (xp[j], fp[j]);

    if x == x1 {
        return y1;
    }

    // Actual interpolation; x1 < x < x2 here so the width is never zero
    y1 + (x - x1) * (y2 - y1) / (x2 - x1)
}

/// Samples the piecewise-linear function through `coords` at every point of `x_input`.
pub(crate) fn interp_all<F: Float>(x_input: &[F], coords: &[(F, F)]) -> Vec<F> {
    let (xp, fp): (Vec<F>, Vec<F>) = coords.iter().copied().unzip();

    x_input.iter().map(|&x| interp(x, &xp, &fp)).collect()
}

/// Triangular membership function over `x` with feet at `a` and `c` and its peak at `b`.
///
/// Requires `a <= b <= c`.
pub fn trimf(x: &[f64], [a, b, c]: [f64; 3]) -> Vec<f64> {
    debug_assert!(a <= b && b <= c, "trimf requires a <= b <= c");

    x.iter()
        .map(|&x| {
            if x == b {
                1.
            } else if a < x && x < b {
                (x - a) / (b - a)
            } else if b < x && x < c {
                (c - x) / (c - b)
            } else {
                0.
            }
        })
        .collect()
}

#[test]
fn test_interp() {
    let x = [0., 1., 1.5, 2.72, 3.24];
    let xs = [1., 2., 3.];
    let ys = [3., 2., 0.];

    assert_eq!(
        x.iter().map(|&x| interp(x, &xs, &ys)).collect::<Vec<_>>(),
        vec![3., 3., 2.5, 0.5599999999999996, 0.]
    );

    let x = [2.5, -1., 7.5];
    let xs = [0., 1., 2., 3., 4.5];
    let ys = [0., 2., 5., 3., 2.];

    assert_eq!(
        interp_all(&x, &xs.into_iter().zip(ys).collect::<Vec<_>>()),
        vec![4., 0., 2.]
    );
}

#[test]
fn test_interp_exact_samples() {
    let xs = [0., 1., 2.];
    let ys = [0.1, 0.7, 0.3];

    assert_eq!(interp(1., &xs, &ys), 0.7);
    assert_eq!(interp(2., &xs, &ys), 0.3);

    // Repeated coordinate: the right-hand value wins
    let xs = [0., 1., 1., 2.];
    let ys = [0., 0.2, 0.8, 1.];

    assert_eq!(interp(1., &xs, &ys), 0.8);
    assert_eq!(interp(0.5, &xs, &ys), 0.1);
}

#[test]
fn test_trimf() {
    let x = [0., 1., 2., 3., 4.];

    assert_eq!(trimf(&x, [0., 2., 4.]), vec![0., 0.5, 1., 0.5, 0.]);
    assert_eq!(trimf(&x, [0., 0., 4.]), vec![1., 0.75, 0.5, 0.25, 0.]);
    assert_eq!(trimf(&x, [-2., 4., 4.]), vec![2. / 6., 0.5, 4. / 6., 5. / 6., 1.]);
}
