// src/readout.rs

//! Text helpers for the cursor readout and legends.

use std::fmt;

use itertools::Itertools;

use crate::collection::PatternCollection;
use crate::entry::{EntryId, Rgba};

/// `"{n} kHz"` below 1 MHz, otherwise MHz with up to three decimals.
pub fn format_frequency(khz: u32) -> String {
    if khz < 1000 {
        return format!("{khz} kHz");
    }

    let text = format!("{:.3}", khz as f64 / 1000.0);
    let trimmed = text.trim_end_matches('0');
    // Keep one digit after the point: "100.0", not "100."
    if trimmed.ends_with('.') {
        format!("{trimmed}0 MHz")
    } else {
        format!("{trimmed} MHz")
    }
}

/// Maps (180, 360) to (-180, 0) unless the full 0..360 range is shown.
pub fn display_angle(angle: f64, full_angle: bool) -> f64 {
    if !full_angle && angle > 180.0 {
        angle - 360.0
    } else {
        angle
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReadoutRow {
    pub id: EntryId,
    pub name: String,
    pub color: Rgba,
    /// Interpolated level at the cursor, dB
    pub value: f64,
    /// Level relative to the reference peak, dB
    pub relative: f64,
}

/// Levels of all visible entries at one angle.
#[derive(Clone, Debug, PartialEq)]
pub struct Readout {
    /// Angle as displayed, see [`display_angle`]
    pub angle: f64,
    pub rows: Vec<ReadoutRow>,
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Angle: {:.2}°", self.angle)?;
        if self.rows.is_empty() {
            return Ok(());
        }
        let rows = self
            .rows
            .iter()
            .map(|row| format!("{}\n{:.2} ({:.2}) dB", row.name, row.value, row.relative))
            .join("\n\n");
        write!(f, "\n\n{rows}")
    }
}

impl PatternCollection {
    /// Samples every visible, non-empty entry at `angle` degrees.
    ///
    /// The relative level is taken against the entry's own peak when
    /// normalizing, otherwise against the highest peak of the collection.
    pub fn readout(&self, angle: f64) -> Readout {
        let global_peak = self.peak();

        let rows = self
            .entries()
            .filter(|(_, entry)| !entry.hide() && !entry.signal().is_empty())
            .map(|(id, entry)| {
                let signal = entry.signal();
                let x = angle / 360.0 * signal.count() as f64;
                let idx = x.floor();
                let value = signal.get_sample_interp(idx as i64, x - idx);
                let peak = if self.normalize() { signal.peak() } else { global_peak };

                ReadoutRow {
                    id,
                    name: entry.name().to_string(),
                    color: entry.color(),
                    value,
                    relative: value - peak,
                }
            })
            .collect();

        Readout { angle: display_angle(angle, self.full_angle()), rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::PatternEntry;
    use crate::signal::Signal;

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(0), "0 kHz");
        assert_eq!(format_frequency(999), "999 kHz");
        assert_eq!(format_frequency(1000), "1.0 MHz");
        assert_eq!(format_frequency(14_200), "14.2 MHz");
        assert_eq!(format_frequency(100_000), "100.0 MHz");
        assert_eq!(format_frequency(145_525), "145.525 MHz");
        assert_eq!(format_frequency(99_999_999), "99999.999 MHz");
    }

    #[test]
    fn test_display_angle() {
        assert_eq!(display_angle(270.0, true), 270.0);
        assert_eq!(display_angle(270.0, false), -90.0);
        assert_eq!(display_angle(180.0, false), 180.0);
    }

    fn collection() -> (PatternCollection, EntryId, EntryId) {
        let mut c = PatternCollection::new();
        let mut a = PatternEntry::new(Signal::from_samples([0.0, -3.0, -10.0, -3.0]));
        a.set_name("Yagi");
        let mut b = PatternEntry::new(Signal::from_samples([-6.0, -6.0, -6.0, -12.0]));
        b.set_name("Dipole");
        let a = c.add(a);
        let b = c.add(b);
        c.add(PatternEntry::new(Signal::new()));
        (c, a, b)
    }

    #[test]
    fn test_readout_normalized() {
        let (c, a, b) = collection();
        let r = c.readout(135.0);
        assert_eq!(r.rows.len(), 2);
        assert_eq!(r.rows[0].id, a);
        assert_eq!(r.rows[0].value, -6.5);
        assert_eq!(r.rows[0].relative, -6.5);
        assert_eq!(r.rows[1].id, b);
        assert_eq!(r.rows[1].value, -6.0);
        assert_eq!(r.rows[1].relative, 0.0);
    }

    #[test]
    fn test_readout_against_global_peak() {
        let (mut c, _, b) = collection();
        c.set_normalize(false);
        c.set_full_angle(false);
        c.hide(b, true);

        let r = c.readout(270.0);
        assert_eq!(r.angle, -90.0);
        assert_eq!(r.rows.len(), 1);
        assert_eq!(r.rows[0].value, -3.0);
        assert_eq!(r.rows[0].relative, -3.0);
        assert_eq!(r.to_string(), "Angle: -90.00°\n\nYagi\n-3.00 (-3.00) dB");
    }

    #[test]
    fn test_empty_readout_text() {
        let c = PatternCollection::new();
        assert_eq!(c.readout(10.0).to_string(), "Angle: 10.00°");
    }
}
