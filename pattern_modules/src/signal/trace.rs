// src/signal/trace.rs

use super::Signal;

/// One vertex of a display trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TracePoint {
    /// Fractional display index, in [0, count)
    pub position: f64,
    /// Angle in degrees, in [0, 360)
    pub angle: f64,
    pub value: f64,
}

/// The vertices a polar renderer walks for one signal.
///
/// A finished signal is oversampled by [`Signal::interp_factor`] through
/// the spline and forms a closed loop. A signal still being captured gets
/// one plain sample per index and stays open, so the gap between the last
/// and the first sample is not drawn.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    pub points: Vec<TracePoint>,
    pub closed: bool,
}

impl Trace {
    pub fn build(signal: &Signal) -> Self {
        let count = signal.count();
        if count == 0 {
            return Self::default();
        }

        let finished = signal.finished();
        let steps = if finished { signal.interp_factor() } else { 1 };
        let mut points = Vec::with_capacity(count * steps);

        for i in 0..count {
            for j in 0..steps {
                let frac = j as f64 / steps as f64;
                let value = if finished {
                    signal.get_sample_interp(i as i64, frac)
                } else {
                    signal.get_sample(i as i64)
                };
                let position = i as f64 + frac;
                points.push(TracePoint {
                    position,
                    angle: position / count as f64 * 360.0,
                    value,
                });
            }
        }

        Self { points, closed: finished }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_trace_while_capturing() {
        let s = Signal::from_samples([0.0, -3.0, -10.0, -3.0]);
        let trace = s.trace();
        assert!(!trace.closed);
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.points[2].value, -10.0);
        assert_eq!(trace.points[1].angle, 90.0);
    }

    #[test]
    fn test_finished_trace_is_oversampled() {
        let mut s = Signal::from_samples([0.0, -3.0, -10.0, -3.0]);
        s.set_finished();
        let trace = s.trace();
        assert!(trace.closed);
        assert_eq!(trace.len(), 4 * 256);

        let half = trace.points[256 + 128];
        assert_eq!(half.position, 1.5);
        assert_eq!(half.value, -6.5);
    }

    #[test]
    fn test_empty_trace() {
        let trace = Signal::new().trace();
        assert!(trace.is_empty());
        assert!(!trace.closed);
    }
}
