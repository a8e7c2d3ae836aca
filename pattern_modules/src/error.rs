// src/error.rs

//! Errors raised at the edges of the model (text parsing, control
//! commands). Model operations themselves clamp instead of failing.

use thiserror::Error;

/// Result type for boundary operations
pub type PatternResult<T> = Result<T, PatternError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    /// Color text that is neither hex, rgb()/rgba() nor a known name
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Control line with an unknown verb
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    /// Verb that needs a value but got none
    #[error("Command {0} requires an argument")]
    MissingArgument(&'static str),

    /// Value that could not be parsed for the given verb
    #[error("Invalid argument for {command}: {value:?}")]
    InvalidArgument { command: &'static str, value: String },

    /// START received while a capture is already running
    #[error("Capture already running")]
    AlreadyCapturing,

    /// Any verb other than START received while idle
    #[error("Command {0} is only valid while capturing")]
    NotCapturing(&'static str),

    /// Capture running but its entry is gone from the collection
    #[error("No current pattern to apply {0} to")]
    NoCurrentEntry(&'static str),
}
