// src/signal/spline.rs

/// Periodic Akima needs at least this many knots, closing knot included.
pub const AKIMA_MIN_KNOTS: usize = 5;

/// Piecewise interpolant over knots placed at x = 0, 1, .., n-1.
///
/// The caller closes the period by repeating the first value as the last
/// knot, so a signal of `count` samples yields `count + 1` knots.
#[derive(Clone, Debug)]
pub struct Spline {
    y: Vec<f64>,
    kind: SplineKind,
}

#[derive(Clone, Debug)]
enum SplineKind {
    Linear,
    /// Per-segment cubic coefficients: y + b*dx + c*dx^2 + d*dx^3
    Akima { b: Vec<f64>, c: Vec<f64>, d: Vec<f64> },
}

impl Spline {
    pub fn linear(knots: Vec<f64>) -> Self {
        assert!(knots.len() >= 2, "a spline needs at least two knots");
        Self { y: knots, kind: SplineKind::Linear }
    }

    /// Periodic Akima spline. Returns `None` when there are fewer than
    /// [`AKIMA_MIN_KNOTS`] knots.
    pub fn akima_periodic(knots: Vec<f64>) -> Option<Self> {
        let n = knots.len();
        if n < AKIMA_MIN_KNOTS {
            return None;
        }
        let segments = n - 1;

        // m[i + 2] is the slope of segment i, for i in -2..=n
        let mut m = vec![0.0; n + 3];
        for i in 0..segments {
            m[i + 2] = knots[i + 1] - knots[i];
        }
        // Wrap the slopes around the period
        m[0] = m[segments];
        m[1] = m[segments + 1];
        m[segments + 2] = m[2];
        m[segments + 3] = m[3];

        let mut b = vec![0.0; segments];
        let mut c = vec![0.0; segments];
        let mut d = vec![0.0; segments];

        for i in 0..segments {
            let (mm2, mm1, m0, mp1, mp2) = (m[i], m[i + 1], m[i + 2], m[i + 3], m[i + 4]);

            let ne = (mp1 - m0).abs() + (mm1 - mm2).abs();
            if ne == 0.0 {
                b[i] = m0;
                continue;
            }

            let ne_next = (mp2 - mp1).abs() + (m0 - mm1).abs();
            let alpha = (mm1 - mm2).abs() / ne;
            let t_next = if ne_next == 0.0 {
                m0
            } else {
                let alpha_next = (m0 - mm1).abs() / ne_next;
                (1.0 - alpha_next) * m0 + alpha_next * mp1
            };

            b[i] = (1.0 - alpha) * mm1 + alpha * m0;
            c[i] = 3.0 * m0 - 2.0 * b[i] - t_next;
            d[i] = b[i] + t_next - 2.0 * m0;
        }

        Some(Self { y: knots, kind: SplineKind::Akima { b, c, d } })
    }

    pub fn knots(&self) -> usize {
        self.y.len()
    }

    pub fn is_akima(&self) -> bool {
        matches!(self.kind, SplineKind::Akima { .. })
    }

    /// Evaluates at `x`, clamped to the knot range.
    pub fn eval(&self, x: f64) -> f64 {
        let last = (self.y.len() - 1) as f64;
        let x = x.clamp(0.0, last);
        let seg = (x.floor() as usize).min(self.y.len() - 2);
        let dx = x - seg as f64;

        match &self.kind {
            SplineKind::Linear => self.y[seg] + dx * (self.y[seg + 1] - self.y[seg]),
            SplineKind::Akima { b, c, d } => {
                self.y[seg] + dx * (b[seg] + dx * (c[seg] + dx * d[seg]))
            }
        }
    }
}
