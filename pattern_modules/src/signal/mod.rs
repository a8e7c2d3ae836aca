// src/signal/mod.rs

//! Circular buffer of measured signal levels covering one full
//! revolution, with display transforms applied at query time.

pub mod spline;
pub mod trace;

use std::cell::OnceCell;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use spline::Spline;
pub use trace::{Trace, TracePoint};

pub const MIN_AVG: i64 = 0;
pub const MAX_AVG: i64 = 10;

/// Samples within this many dB of the peak belong to the main lobe.
const MAINLOBE_DB: f64 = 3.0;

/// Upper bound for the oversampling factor handed to renderers.
const MAX_INTERP_FACTOR: usize = 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Akima,
    /// Akima, limited to the range of the two neighbouring samples
    AkimaClipped,
}

impl Interpolation {
    pub fn is_linear(self) -> bool {
        matches!(self, Interpolation::Linear)
    }
}

/// Growable, 360°-periodic sequence of samples.
///
/// Raw samples are never modified by the display transforms (`rev`,
/// `rotate`, `avg`); those are applied by the accessors. Sample accessors
/// require a non-empty signal and panic otherwise.
#[derive(Clone, Debug)]
pub struct Signal {
    samples: Vec<f64>,
    finished: bool,
    peak: f64,
    rev: bool,
    rotate: i64,
    avg: usize,
    interp: Interpolation,
    changed: bool,
    // Empty cell = needs a rebuild before the next interpolated query
    spline: OnceCell<Spline>,
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal {
    pub fn new() -> Self {
        Self {
            samples: Vec::with_capacity(360),
            finished: false,
            peak: f64::NAN,
            rev: false,
            rotate: 0,
            avg: 0,
            interp: Interpolation::Linear,
            changed: false,
            spline: OnceCell::new(),
        }
    }

    /// Builds a signal by pushing every value in order.
    pub fn from_samples<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        let mut signal = Self::new();
        for value in samples {
            signal.push(value);
        }
        signal
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw samples in acquisition order, without any transform.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn push(&mut self, value: f64) {
        self.samples.push(value);
        if self.peak.is_nan() || self.peak < value {
            self.peak = value;
        }
        self.invalidate_spline();
        self.changed = true;
    }

    // --- SAMPLE ACCESS ---

    pub fn get_sample_raw(&self, idx: i64) -> f64 {
        self.assert_not_empty();
        self.samples[self.wrap(idx)]
    }

    /// Sample at display index `idx` with reversal, rotation and
    /// averaging applied.
    pub fn get_sample(&self, idx: i64) -> f64 {
        self.assert_not_empty();
        self.window_mean(self.display_index(idx), self.avg)
    }

    /// Value between display index `idx` and `idx + 1`, at `frac` in [0, 1).
    pub fn get_sample_interp(&self, idx: i64, frac: f64) -> f64 {
        self.assert_not_empty();
        let count = self.count() as i64;
        let idx = idx.rem_euclid(count);

        // Reversed signals walk the spline backwards: segment `idx` maps to
        // the knot pair ending at `count - idx`.
        let (base, frac) = if !self.rev {
            (idx, frac)
        } else if frac == 0.0 {
            (count - idx, frac)
        } else {
            (count - 1 - idx, 1.0 - frac)
        };

        let position = self.wrap(base + self.rotate.rem_euclid(count)) as f64 + frac;
        let value = self.spline().eval(position);

        if self.interp != Interpolation::AkimaClipped {
            return value;
        }

        let current = self.get_sample(idx);
        let next = self.get_sample(idx + 1);
        if value < current && value < next {
            current.min(next)
        } else if value > current && value > next {
            current.max(next)
        } else {
            value
        }
    }

    /// Oversampling factor for drawing: 1024 for a single sample, halving
    /// with every doubling of the count, never below 1.
    pub fn interp_factor(&self) -> usize {
        match self.count() {
            0 => MAX_INTERP_FACTOR,
            n => MAX_INTERP_FACTOR >> n.ilog2().min(MAX_INTERP_FACTOR.ilog2()),
        }
    }

    /// Display trace as consumed by a polar renderer.
    pub fn trace(&self) -> Trace {
        Trace::build(self)
    }

    // --- PEAK ---

    /// Largest raw sample, NaN while empty.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Shifts every sample so that the peak becomes `peak`, keeping the
    /// shape of the pattern.
    pub fn set_peak(&mut self, peak: f64) {
        if self.is_empty() {
            warn!("Ignoring peak override ({peak}) on an empty signal");
            return;
        }
        if peak == self.peak {
            return;
        }

        let old = self.peak;
        let offset = peak - old;
        for sample in &mut self.samples {
            // Pin the maximum exactly, the sum may round
            *sample = if *sample == old { peak } else { (*sample + offset).min(peak) };
        }
        self.peak = peak;
        self.invalidate_spline();
        self.changed = true;
    }

    // --- TRANSFORMS ---

    pub fn rev(&self) -> bool {
        self.rev
    }

    pub fn set_rev(&mut self, rev: bool) {
        if self.rev != rev {
            self.rev = rev;
            self.changed = true;
        }
    }

    pub fn avg(&self) -> usize {
        self.avg
    }

    /// Sets the averaging half-window, clamped to [`MIN_AVG`, `MAX_AVG`].
    pub fn set_avg(&mut self, avg: i64) {
        let avg = avg.clamp(MIN_AVG, MAX_AVG) as usize;
        if self.avg != avg {
            self.avg = avg;
            self.invalidate_spline();
            self.changed = true;
        }
    }

    pub fn interp(&self) -> Interpolation {
        self.interp
    }

    pub fn set_interp(&mut self, interp: Interpolation) {
        if self.interp == interp {
            return;
        }
        // Akima and clipped Akima share the same spline
        if self.interp.is_linear() != interp.is_linear() {
            self.invalidate_spline();
        }
        self.interp = interp;
        self.changed = true;
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Marks the revolution as complete. There is no way back.
    pub fn set_finished(&mut self) {
        if !self.finished {
            self.finished = true;
            self.changed = true;
        }
    }

    pub fn rotation(&self) -> i64 {
        self.rotate
    }

    pub fn set_rotate(&mut self, rotate: i64) {
        if self.rotate != rotate {
            self.rotate = rotate;
            self.changed = true;
        }
    }

    /// Relative rotation; the direction follows the displayed orientation.
    pub fn rotate(&mut self, delta: i64) {
        let delta = if self.rev { delta.saturating_neg() } else { delta };
        self.set_rotate(self.rotate.saturating_add(delta));
    }

    pub fn rotate_reset(&mut self) {
        self.set_rotate(0);
    }

    /// Rotates so that the centre of the main lobe lands at index 0.
    ///
    /// The main lobe width is estimated from the number of samples within
    /// 3 dB of the peak; samples are smoothed over a third of that width and
    /// the first index with the highest smoothed level wins.
    pub fn rotate_to_peak(&mut self) {
        self.assert_not_empty();

        let mainlobe = self
            .samples
            .iter()
            .filter(|&&v| self.peak - v <= MAINLOBE_DB)
            .count()
            / 3;

        let mut best: Option<(usize, f64)> = None;
        for idx in 0..self.count() {
            let level = self.window_mean(idx as i64, mainlobe);
            if best.is_none_or(|(_, max)| max.is_nan() || max < level) {
                best = Some((idx, level));
            }
        }

        if let Some((idx, level)) = best {
            debug!("Main lobe ({mainlobe} samples) centred at {idx}, level {level:.2}");
            self.set_rotate(idx as i64);
        }
    }

    // --- DIRTY FLAG ---

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn unchanged(&mut self) {
        self.changed = false;
    }

    // --- INTERNALS ---

    fn assert_not_empty(&self) {
        assert!(!self.samples.is_empty(), "sample access on an empty signal");
    }

    /// Circular index into `samples`.
    fn wrap(&self, idx: i64) -> usize {
        idx.rem_euclid(self.samples.len() as i64) as usize
    }

    /// Raw position for display index `idx`, in [0, 2 * count].
    fn display_index(&self, idx: i64) -> i64 {
        let count = self.count() as i64;
        let idx = idx.rem_euclid(count);
        let idx = if self.rev { count - idx } else { idx };
        idx + self.rotate.rem_euclid(count)
    }

    /// Mean of the `2 * half + 1` raw samples centred at `center`.
    fn window_mean(&self, center: i64, half: usize) -> f64 {
        let mut sum = self.get_sample_raw(center);
        for i in 1..=half as i64 {
            sum += self.get_sample_raw(center - i);
            sum += self.get_sample_raw(center + i);
        }
        sum / (half as f64 * 2.0 + 1.0)
    }

    fn spline(&self) -> &Spline {
        self.spline.get_or_init(|| self.build_spline())
    }

    fn build_spline(&self) -> Spline {
        // One extra knot repeats sample 0 and closes the period
        let knots: Vec<f64> = (0..=self.count() as i64)
            .map(|idx| self.window_mean(idx, self.avg))
            .collect();

        if !self.interp.is_linear() {
            let len = knots.len();
            match Spline::akima_periodic(knots.clone()) {
                Some(spline) => {
                    debug!("Built Akima spline over {len} knots (avg {})", self.avg);
                    return spline;
                }
                None => debug!("{len} knots are too few for Akima, falling back to linear"),
            }
        }

        debug!("Built linear spline over {} knots (avg {})", knots.len(), self.avg);
        Spline::linear(knots)
    }

    fn invalidate_spline(&mut self) {
        self.spline.take();
    }
}
