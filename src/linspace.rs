/// `n` evenly spaced samples over `[min, max]`, both ends included.
pub(crate) struct Linspace {
    start: f64,
    end: f64,
    step: f64,
    index: usize,
    len: usize,
}

impl Linspace {
    pub(crate) fn new(min: f64, max: f64, n: usize) -> Self {
        let step = if n > 1 {
            (max - min) / (n - 1) as f64
        } else {
            0.
        };
        Linspace {
            start: min,
            end: max,
            step,
            index: 0,
            len: n,
        }
    }
}

impl Iterator for Linspace {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            None
        } else {
            let i = self.index;
            self.index += 1;
            // Like numpy.linspace, pin the endpoint instead of accumulating rounding into it
            if self.len > 1 && i == self.len - 1 {
                Some(self.end)
            } else {
                Some(self.start + self.step * i as f64)
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Linspace {}

#[test]
fn test_linspace() {
    let points: Vec<_> = Linspace::new(0., 10., 5).collect();

    assert_eq!(points, vec![0., 2.5, 5., 7.5, 10.]);
    assert_eq!(Linspace::new(3., 3., 1).collect::<Vec<_>>(), vec![3.]);
    assert_eq!(Linspace::new(0., 1., 0).count(), 0);

    let points: Vec<_> = Linspace::new(0., 1., 11).collect();

    assert_eq!(points.len(), 11);
    assert_eq!(points[10], 1.);
}
