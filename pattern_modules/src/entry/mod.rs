// src/entry/mod.rs

pub mod color;

pub use color::{ColorSequence, Rgba};

use crate::signal::Signal;

pub const MIN_FREQ: i64 = 0;
pub const MAX_FREQ: i64 = 99_999_999;

/// Identifier for an entry inside a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u32);

/// A signal plus the attributes shown next to it.
///
/// Setters only raise the dirty flag when the stored value actually
/// changes, so refreshing a form with the current values leaves the entry
/// clean.
#[derive(Clone, Debug, Default)]
pub struct PatternEntry {
    signal: Signal,
    name: String,
    freq: u32, // kHz
    color: Rgba,
    hide: bool,
    fill: bool,
    changed: bool,
}

impl PatternEntry {
    pub fn new(signal: Signal) -> Self {
        Self { signal, ..Self::default() }
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn signal_mut(&mut self) -> &mut Signal {
        &mut self.signal
    }

    pub fn into_signal(self) -> Signal {
        self.signal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.changed = true;
        }
    }

    /// Frequency in kHz.
    pub fn freq(&self) -> u32 {
        self.freq
    }

    /// Sets the frequency in kHz, clamped to [`MIN_FREQ`, `MAX_FREQ`].
    pub fn set_freq(&mut self, freq: i64) {
        let freq = freq.clamp(MIN_FREQ, MAX_FREQ) as u32;
        if self.freq != freq {
            self.freq = freq;
            self.changed = true;
        }
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        if self.color != color {
            self.color = color;
            self.changed = true;
        }
    }

    pub fn hide(&self) -> bool {
        self.hide
    }

    // Crate-only: a collection keeps its visible count in step through
    // `PatternCollection::hide`.
    pub(crate) fn set_hide(&mut self, hide: bool) {
        if self.hide != hide {
            self.hide = hide;
            self.changed = true;
        }
    }

    pub fn fill(&self) -> bool {
        self.fill
    }

    pub fn set_fill(&mut self, fill: bool) {
        if self.fill != fill {
            self.fill = fill;
            self.changed = true;
        }
    }

    pub fn changed(&self) -> bool {
        self.changed || self.signal.changed()
    }

    /// Clears the entry and signal dirty flags, typically after a save.
    pub fn unchanged(&mut self) {
        self.changed = false;
        self.signal.unchanged();
    }
}

impl From<Signal> for PatternEntry {
    fn from(signal: Signal) -> Self {
        Self::new(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_defaults() {
        let entry = PatternEntry::new(Signal::new());
        assert_eq!(entry.name(), "");
        assert_eq!(entry.freq(), 0);
        assert_eq!(entry.color(), Rgba::BLACK);
        assert!(!entry.hide());
        assert!(!entry.fill());
        assert!(!entry.changed());
    }

    #[test]
    fn test_freq_is_clamped() {
        let mut entry = PatternEntry::default();
        entry.set_freq(145_525);
        assert_eq!(entry.freq(), 145_525);
        entry.set_freq(-20);
        assert_eq!(entry.freq(), 0);
        entry.set_freq(1_000_000_000);
        assert_eq!(entry.freq(), 99_999_999);
    }

    #[test]
    fn test_setters_are_idempotent() {
        let mut entry = PatternEntry::default();
        entry.set_name("Yagi");
        entry.set_freq(432_100);
        entry.set_color(Rgba::WHITE);
        entry.set_hide(true);
        entry.set_fill(true);
        assert!(entry.changed());
        entry.unchanged();

        entry.set_name("Yagi");
        entry.set_freq(432_100);
        entry.set_color(Rgba::WHITE);
        entry.set_hide(true);
        entry.set_fill(true);
        assert!(!entry.changed());

        // Clamps to the value already stored
        entry.set_freq(MAX_FREQ);
        entry.unchanged();
        entry.set_freq(MAX_FREQ + 5);
        assert!(!entry.changed());
    }

    #[test]
    fn test_changed_follows_signal() {
        let mut entry = PatternEntry::default();
        entry.signal_mut().push(-3.0);
        assert!(entry.changed());

        entry.unchanged();
        assert!(!entry.changed());
        assert!(!entry.signal().changed());

        entry.signal_mut().set_rev(true);
        assert!(entry.changed());
    }
}
