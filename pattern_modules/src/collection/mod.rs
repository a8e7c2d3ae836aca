// src/collection/mod.rs

pub mod settings;

use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use log::debug;

use crate::entry::{EntryId, PatternEntry, Rgba};
use crate::signal::{Interpolation, Signal};
pub use settings::{Scale, Settings, MAX_LINE, MAX_SIZE, MIN_LINE, MIN_SIZE};

/// Notification sent to the observer after a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionEvent {
    Added(EntryId),
    Removed(EntryId),
    Cleared,
    VisibilityChanged(EntryId),
    SettingsChanged,
}

pub type Observer = Box<dyn FnMut(&CollectionEvent)>;

/// Write access to an entry that lives in a collection.
///
/// Reads go through `Deref`. Every setter is forwarded except hiding,
/// which must go through [`PatternCollection::hide`]; the entry itself can
/// not be swapped out.
///
/// ```compile_fail
/// use pattern_modules::{PatternCollection, PatternEntry, Signal};
///
/// let mut c = PatternCollection::new();
/// let id = c.add(PatternEntry::new(Signal::new()));
/// *c.entry_mut(id).unwrap() = PatternEntry::new(Signal::new());
/// ```
#[derive(Debug)]
pub struct EntryMut<'a> {
    entry: &'a mut PatternEntry,
}

impl Deref for EntryMut<'_> {
    type Target = PatternEntry;

    fn deref(&self) -> &PatternEntry {
        self.entry
    }
}

impl EntryMut<'_> {
    pub fn signal_mut(&mut self) -> &mut Signal {
        self.entry.signal_mut()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.entry.set_name(name);
    }

    pub fn set_freq(&mut self, freq: i64) {
        self.entry.set_freq(freq);
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.entry.set_color(color);
    }

    pub fn set_fill(&mut self, fill: bool) {
        self.entry.set_fill(fill);
    }

    pub fn unchanged(&mut self) {
        self.entry.unchanged();
    }
}

/// Ordered set of pattern entries plus the display settings shared by all
/// of them.
///
/// Insertion order is the drawing and legend order. Entries are referred
/// to by the [`EntryId`] handed out by [`add`](Self::add).
pub struct PatternCollection {
    entries: Vec<(EntryId, PatternEntry)>,
    next_id: u32,
    current: Option<EntryId>,
    visible: usize,
    settings: Settings,
    filename: Option<PathBuf>,
    changed: bool,
    observer: Option<Observer>,
}

impl Default for PatternCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PatternCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternCollection")
            .field("entries", &self.entries)
            .field("current", &self.current)
            .field("visible", &self.visible)
            .field("settings", &self.settings)
            .field("filename", &self.filename)
            .field("changed", &self.changed)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

fn update<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    true
}

impl PatternCollection {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            current: None,
            visible: 0,
            settings: Settings::default(),
            filename: None,
            changed: false,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&mut self, event: CollectionEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }

    /// Restores the default settings and drops all entries and the
    /// filename. The collection is clean afterwards.
    pub fn reset(&mut self) {
        self.apply_settings(&Settings::default());
        self.clear();
        self.set_filename(None::<PathBuf>);
        self.changed = false;
    }

    // --- ENTRIES ---

    /// Appends `entry` and switches its signal to the collection's
    /// interpolation mode.
    pub fn add(&mut self, mut entry: PatternEntry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        entry.signal_mut().set_interp(self.settings.interp);
        if !entry.hide() {
            self.visible += 1;
        }
        self.entries.push((id, entry));
        self.changed = true;

        debug!("Added entry {id:?} ({} total)", self.entries.len());
        self.notify(CollectionEvent::Added(id));
        id
    }

    pub fn remove(&mut self, id: EntryId) -> Option<PatternEntry> {
        let pos = self.position(id)?;
        let (_, entry) = self.entries.remove(pos);

        if !entry.hide() {
            self.visible -= 1;
        }
        if self.current == Some(id) {
            self.current = None;
        }
        self.changed = true;

        debug!("Removed entry {id:?} ({} left)", self.entries.len());
        self.notify(CollectionEvent::Removed(id));
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.visible = 0;
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.changed = true;
        self.notify(CollectionEvent::Cleared);
    }

    /// Shows or hides an entry. Returns `false` for an unknown id.
    pub fn hide(&mut self, id: EntryId, hide: bool) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let entry = &mut self.entries[pos].1;
        if entry.hide() != hide {
            entry.set_hide(hide);
            if hide {
                self.visible -= 1;
            } else {
                self.visible += 1;
            }
            self.changed = true;
            self.notify(CollectionEvent::VisibilityChanged(id));
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    /// Entries in drawing order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &PatternEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn entry(&self, id: EntryId) -> Option<&PatternEntry> {
        self.entries.iter().find(|(e, _)| *e == id).map(|(_, entry)| entry)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<EntryMut<'_>> {
        self.entries
            .iter_mut()
            .find(|(e, _)| *e == id)
            .map(|(_, entry)| EntryMut { entry })
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|(e, _)| *e == id)
    }

    // --- CURRENT ---

    pub fn current_id(&self) -> Option<EntryId> {
        self.current
    }

    pub fn current(&self) -> Option<&PatternEntry> {
        self.entry(self.current?)
    }

    pub fn current_mut(&mut self) -> Option<EntryMut<'_>> {
        self.entry_mut(self.current?)
    }

    /// Selects the current entry. An id that is not in the collection
    /// clears the selection and returns `false`.
    pub fn set_current(&mut self, id: Option<EntryId>) -> bool {
        match id {
            Some(id) if self.position(id).is_none() => {
                self.current = None;
                false
            }
            _ => {
                self.current = id;
                true
            }
        }
    }

    /// Highest peak over all entries, NaN when there is none.
    ///
    /// Recomputed on every call since any entry may change its peak.
    pub fn peak(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, entry)| entry.signal().peak())
            .fold(f64::NAN, |peak, p| if peak.is_nan() || peak < p { p } else { peak })
    }

    // --- SETTINGS ---

    pub fn settings(&self) -> Settings {
        self.settings.clone()
    }

    /// Applies every value through its setter, clamping as usual.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_size(settings.size);
        self.set_title(settings.title.clone());
        self.set_scale(settings.scale);
        self.set_line(settings.line);
        self.set_interp(settings.interp);
        self.set_full_angle(settings.full_angle);
        self.set_black(settings.black);
        self.set_normalize(settings.normalize);
        self.set_legend(settings.legend);
    }

    fn settings_changed(&mut self, updated: bool) {
        if updated {
            self.changed = true;
            self.notify(CollectionEvent::SettingsChanged);
        }
    }

    pub fn size(&self) -> i64 {
        self.settings.size
    }

    /// Canvas size in pixels, clamped to [`MIN_SIZE`, `MAX_SIZE`].
    pub fn set_size(&mut self, size: i64) {
        let updated = update(&mut self.settings.size, size.clamp(MIN_SIZE, MAX_SIZE));
        self.settings_changed(updated);
    }

    pub fn title(&self) -> &str {
        &self.settings.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let updated = update(&mut self.settings.title, title.into());
        self.settings_changed(updated);
    }

    pub fn scale(&self) -> Scale {
        self.settings.scale
    }

    pub fn set_scale(&mut self, scale: Scale) {
        let updated = update(&mut self.settings.scale, scale);
        self.settings_changed(updated);
    }

    pub fn line(&self) -> f64 {
        self.settings.line
    }

    /// Line width multiplier, clamped to [`MIN_LINE`, `MAX_LINE`].
    pub fn set_line(&mut self, line: f64) {
        let updated = update(&mut self.settings.line, line.clamp(MIN_LINE, MAX_LINE));
        self.settings_changed(updated);
    }

    pub fn interp(&self) -> Interpolation {
        self.settings.interp
    }

    /// Sets the interpolation mode of the collection and of every entry.
    pub fn set_interp(&mut self, interp: Interpolation) {
        let updated = update(&mut self.settings.interp, interp);
        if updated {
            for (_, entry) in &mut self.entries {
                entry.signal_mut().set_interp(interp);
            }
        }
        self.settings_changed(updated);
    }

    pub fn full_angle(&self) -> bool {
        self.settings.full_angle
    }

    pub fn set_full_angle(&mut self, full_angle: bool) {
        let updated = update(&mut self.settings.full_angle, full_angle);
        self.settings_changed(updated);
    }

    pub fn black(&self) -> bool {
        self.settings.black
    }

    pub fn set_black(&mut self, black: bool) {
        let updated = update(&mut self.settings.black, black);
        self.settings_changed(updated);
    }

    pub fn normalize(&self) -> bool {
        self.settings.normalize
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        let updated = update(&mut self.settings.normalize, normalize);
        self.settings_changed(updated);
    }

    pub fn legend(&self) -> bool {
        self.settings.legend
    }

    pub fn set_legend(&mut self, legend: bool) {
        let updated = update(&mut self.settings.legend, legend);
        self.settings_changed(updated);
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename<P: Into<PathBuf>>(&mut self, filename: Option<P>) {
        let updated = update(&mut self.filename, filename.map(Into::into));
        self.settings_changed(updated);
    }

    // --- DIRTY FLAG ---

    pub fn changed(&self) -> bool {
        self.changed || self.entries.iter().any(|(_, entry)| entry.changed())
    }

    /// Clears the dirty flags of the collection and all of its entries.
    pub fn unchanged(&mut self) {
        self.changed = false;
        for (_, entry) in &mut self.entries {
            entry.unchanged();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn entry(samples: &[f64]) -> PatternEntry {
        PatternEntry::new(Signal::from_samples(samples.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let c = PatternCollection::new();
        assert_eq!(c.size(), 600);
        assert_eq!(c.title(), "");
        assert_eq!(c.scale(), Scale::Arrl);
        assert_eq!(c.line(), 1.0);
        assert_eq!(c.interp(), Interpolation::Linear);
        assert!(c.full_angle() && c.black() && c.normalize() && c.legend());
        assert!(c.filename().is_none());
        assert!(!c.changed());
        assert!(c.peak().is_nan());
    }

    #[test]
    fn test_add_applies_interp() {
        let mut c = PatternCollection::new();
        c.set_interp(Interpolation::Akima);
        let id = c.add(entry(&[0.0, -1.0]));
        assert_eq!(c.entry(id).unwrap().signal().interp(), Interpolation::Akima);

        c.set_interp(Interpolation::AkimaClipped);
        assert_eq!(c.entry(id).unwrap().signal().interp(), Interpolation::AkimaClipped);
    }

    #[test]
    fn test_visible_count_tracks_hide() {
        let mut c = PatternCollection::new();
        let a = c.add(entry(&[0.0]));
        let b = c.add(entry(&[0.0]));
        let d = c.add(entry(&[0.0]));
        assert_eq!(c.visible_count(), 3);

        assert!(c.hide(b, true));
        assert!(c.hide(b, true));
        assert_eq!(c.visible_count(), 2);

        c.remove(b);
        assert_eq!(c.visible_count(), 2);
        c.remove(a);
        assert_eq!(c.visible_count(), 1);

        c.hide(d, true);
        c.hide(d, false);
        assert_eq!(c.visible_count(), 1);
        assert!(!c.hide(a, false));
    }

    #[test]
    fn test_hidden_entry_moved_between_collections() {
        let mut other = PatternCollection::new();
        let h = other.add(entry(&[0.0, -3.0]));
        other.hide(h, true);
        let hidden = other.remove(h).unwrap();
        assert_eq!(other.visible_count(), 0);

        let mut c = PatternCollection::new();
        let id = c.add(hidden);
        assert!(c.entry(id).unwrap().hide());
        assert_eq!(c.visible_count(), 0);

        assert!(c.remove(id).is_some());
        assert_eq!(c.visible_count(), 0);
        assert!(c.is_empty());
    }

    #[test]
    fn test_entry_mut_keeps_visibility() {
        let mut c = PatternCollection::new();
        let a = c.add(entry(&[0.0]));
        let b = c.add(entry(&[-1.0]));
        c.hide(a, true);
        c.set_current(Some(a));

        {
            let mut e = c.entry_mut(a).unwrap();
            e.set_name("Hidden");
            e.set_freq(7_100);
            e.set_color(Rgba::WHITE);
            e.set_fill(true);
            e.signal_mut().push(-2.0);
            assert!(e.hide());
        }
        c.current_mut().unwrap().signal_mut().set_rev(true);
        assert_eq!(c.visible_count(), 1);

        let removed = c.remove(a).unwrap();
        assert_eq!(removed.name(), "Hidden");
        assert!(removed.signal().rev());
        assert_eq!(c.visible_count(), 1);
        c.remove(b);
        assert_eq!(c.visible_count(), 0);
    }

    #[test]
    fn test_remove_current_clears_selection() {
        let mut c = PatternCollection::new();
        let a = c.add(entry(&[0.0]));
        let b = c.add(entry(&[-1.0]));
        assert!(c.set_current(Some(b)));

        c.remove(a);
        assert_eq!(c.current_id(), Some(b));
        let removed = c.remove(b).unwrap();
        assert_eq!(removed.signal().peak(), -1.0);
        assert!(c.current().is_none());
        assert!(c.remove(b).is_none());
    }

    #[test]
    fn test_set_current_unknown_id() {
        let mut c = PatternCollection::new();
        let a = c.add(entry(&[0.0]));
        c.set_current(Some(a));
        assert!(!c.set_current(Some(EntryId(99))));
        assert!(c.current_id().is_none());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut c = PatternCollection::new();
        let a = c.add(entry(&[0.0]));
        c.remove(a);
        let b = c.add(entry(&[0.0]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear() {
        let mut c = PatternCollection::new();
        let a = c.add(entry(&[0.0]));
        c.add(entry(&[0.0]));
        c.set_current(Some(a));
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.visible_count(), 0);
        assert!(c.current_id().is_none());
    }

    #[test]
    fn test_peak_scans_entries() {
        let mut c = PatternCollection::new();
        c.add(PatternEntry::new(Signal::new()));
        assert!(c.peak().is_nan());

        let a = c.add(entry(&[-10.0, -4.0]));
        c.add(PatternEntry::new(Signal::new()));
        c.add(entry(&[-7.0]));
        assert_eq!(c.peak(), -4.0);

        c.entry_mut(a).unwrap().signal_mut().set_peak(-20.0);
        assert_eq!(c.peak(), -7.0);
    }

    #[test]
    fn test_settings_are_clamped_and_idempotent() {
        let mut c = PatternCollection::new();
        c.set_size(10);
        assert_eq!(c.size(), MIN_SIZE);
        c.set_size(10_000);
        assert_eq!(c.size(), MAX_SIZE);
        c.set_line(0.0);
        assert_eq!(c.line(), MIN_LINE);
        c.set_line(5.0);
        assert_eq!(c.line(), MAX_LINE);
        assert!(c.changed());

        c.unchanged();
        c.set_size(MAX_SIZE + 1);
        c.set_line(MAX_LINE);
        c.set_title("");
        c.set_scale(Scale::Arrl);
        c.set_interp(Interpolation::Linear);
        c.set_full_angle(true);
        c.set_black(true);
        c.set_normalize(true);
        c.set_legend(true);
        c.set_filename(None::<PathBuf>);
        assert!(!c.changed());

        let id = c.add(entry(&[0.0]));
        c.hide(id, true);
        c.unchanged();
        assert!(c.hide(id, true));
        assert!(!c.changed());
        c.hide(id, false);
        assert!(c.changed());
        c.unchanged();

        c.set_filename(Some("yagi.json"));
        assert!(c.changed());
        assert_eq!(c.filename(), Some(Path::new("yagi.json")));
    }

    #[test]
    fn test_changed_includes_entries() {
        let mut c = PatternCollection::new();
        let id = c.add(entry(&[0.0]));
        c.unchanged();
        assert!(!c.changed());

        c.entry_mut(id).unwrap().set_name("Dipole");
        assert!(c.changed());
        c.unchanged();
        assert!(!c.entry(id).unwrap().changed());
    }

    #[test]
    fn test_reset() {
        let mut c = PatternCollection::new();
        c.add(entry(&[0.0]));
        c.set_title("Loop");
        c.set_scale(Scale::Linear30);
        c.set_filename(Some("loop.json"));
        c.reset();

        assert_eq!(c.settings(), Settings::default());
        assert!(c.is_empty());
        assert!(c.filename().is_none());
        assert!(!c.changed());
    }

    #[test]
    fn test_apply_settings_round_trip() {
        let mut c = PatternCollection::new();
        let settings = Settings {
            size: 1200,
            title: "Moxon".into(),
            scale: Scale::Linear50,
            line: 1.5,
            interp: Interpolation::Akima,
            full_angle: false,
            black: false,
            normalize: false,
            legend: false,
        };
        c.apply_settings(&settings);
        assert_eq!(c.settings(), settings);

        let wild = Settings { size: 1, line: 9.0, ..settings };
        c.apply_settings(&wild);
        assert_eq!(c.size(), MIN_SIZE);
        assert_eq!(c.line(), MAX_LINE);
    }

    #[test]
    fn test_observer_sees_mutations() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut c = PatternCollection::new();
        c.set_observer(Box::new(move |e: &CollectionEvent| sink.borrow_mut().push(*e)));

        let a = c.add(entry(&[0.0]));
        c.hide(a, true);
        c.hide(a, true);
        c.set_title("Quad");
        c.set_title("Quad");
        c.remove(a);
        c.add(entry(&[0.0]));
        c.clear();
        c.clear();

        assert_eq!(
            *events.borrow(),
            vec![
                CollectionEvent::Added(a),
                CollectionEvent::VisibilityChanged(a),
                CollectionEvent::SettingsChanged,
                CollectionEvent::Removed(a),
                CollectionEvent::Added(EntryId(1)),
                CollectionEvent::Cleared,
            ]
        );
    }
}
