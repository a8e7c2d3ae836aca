// src/lib.rs

pub mod collection;
pub mod control;
pub mod entry;
pub mod error;
pub mod readout;
pub mod signal;

pub use collection::{CollectionEvent, EntryMut, PatternCollection, Scale, Settings};
pub use control::{Command, Controller, Response};
pub use entry::{ColorSequence, EntryId, PatternEntry, Rgba};
pub use error::{PatternError, PatternResult};
pub use readout::{format_frequency, Readout};
pub use signal::{Interpolation, Signal, Trace};
