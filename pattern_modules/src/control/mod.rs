// src/control/mod.rs

//! Line-oriented live capture protocol.
//!
//! A measurement rig streams verbs such as `START`, `PUSH -3.2` and `STOP`,
//! one per line, and gets `OK` or `ERROR` back for each. The
//! [`Controller`] keeps the capture state and applies commands to the
//! collection passed in with every call.

pub mod commands;

use std::fmt;

use log::{info, warn};

pub use commands::Command;

use crate::collection::PatternCollection;
use crate::entry::{ColorSequence, PatternEntry};
use crate::error::{PatternError, PatternResult};
use crate::signal::Signal;

/// Name given to entries created by `START`.
pub const CAPTURE_NAME: &str = "Measurement";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    Ready,
    Ok,
    Error,
    Bye,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Response::Ready => "READY",
            Response::Ok => "OK",
            Response::Error => "ERROR",
            Response::Bye => "BYE",
        })
    }
}

#[derive(Debug, Default)]
pub struct Controller {
    capturing: bool,
    colors: ColorSequence,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Parses and applies one line, logging the reason of any rejection.
    pub fn handle_line(&mut self, collection: &mut PatternCollection, line: &str) -> Response {
        let result = line
            .parse::<Command>()
            .and_then(|command| self.apply(collection, command));

        match result {
            Ok(()) => Response::Ok,
            Err(e) => {
                warn!("Rejected control line {:?}: {e}", line.trim_end());
                Response::Error
            }
        }
    }

    /// Applies a parsed command.
    ///
    /// `START` is the only command accepted while idle. While capturing,
    /// every other command needs the collection's current entry; `STOP`
    /// ends the capture even when that entry is gone.
    pub fn apply(&mut self, collection: &mut PatternCollection, command: Command) -> PatternResult<()> {
        match (self.capturing, command) {
            (false, Command::Start) => {
                self.start(collection);
                Ok(())
            }
            (false, other) => Err(PatternError::NotCapturing(other.name())),
            (true, Command::Start) => Err(PatternError::AlreadyCapturing),
            (true, Command::Stop) => {
                self.stop(collection);
                Ok(())
            }
            (true, command) => {
                let verb = command.name();
                let mut entry = collection
                    .current_mut()
                    .ok_or(PatternError::NoCurrentEntry(verb))?;

                match command {
                    Command::Push(value) => entry.signal_mut().push(value),
                    Command::Name(name) => entry.set_name(name),
                    Command::Freq(freq) => entry.set_freq(freq),
                    Command::Color(color) => entry.set_color(color),
                    Command::Avg(avg) => entry.signal_mut().set_avg(avg),
                    Command::Fill(fill) => entry.set_fill(fill),
                    Command::Rev(rev) => entry.signal_mut().set_rev(rev),
                    Command::Start | Command::Stop => unreachable!("handled above"),
                }
                Ok(())
            }
        }
    }

    /// End of input: a running capture stops as if `STOP` was received.
    /// Returns whether a capture was running.
    pub fn finish(&mut self, collection: &mut PatternCollection) -> bool {
        if !self.capturing {
            return false;
        }
        info!("Control stream closed during capture");
        self.stop(collection);
        true
    }

    fn start(&mut self, collection: &mut PatternCollection) {
        let mut entry = PatternEntry::new(Signal::new());
        entry.set_name(CAPTURE_NAME);
        entry.set_color(self.colors.next_color());

        let id = collection.add(entry);
        collection.set_current(Some(id));
        self.capturing = true;
        info!("Capture started as {id:?}");
    }

    fn stop(&mut self, collection: &mut PatternCollection) {
        self.capturing = false;
        match collection.current_mut() {
            Some(mut entry) => {
                let signal = entry.signal_mut();
                signal.set_finished();
                info!(
                    "Capture finished: {} samples, peak {:.2} dB",
                    signal.count(),
                    signal.peak()
                );
            }
            None => warn!("Capture stopped without a current entry"),
        }
    }
}
