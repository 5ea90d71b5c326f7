//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while talking to the debugger
#[derive(Error, Debug)]
pub enum DebuggerError {
    #[error("Failed to start debugger: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Debugger I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed debugger output: {0}")]
    Protocol(#[from] MiParseError),

    #[error("Unexpected debugger response: {0}")]
    UnexpectedResponse(String),

    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Debugger exited")]
    DebuggerExited,

    #[error("Target process exited ({0})")]
    TargetExited(String),
}

/// Errors that can occur while parsing a GDB/MI output line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MiParseError {
    #[error("unexpected end of input at column {0}")]
    UnexpectedEnd(usize),

    #[error("unexpected character {found:?} at column {column}")]
    UnexpectedChar { found: char, column: usize },

    #[error("unknown record type in line: {0}")]
    UnknownRecord(String),

    #[error("invalid escape sequence at column {0}")]
    InvalidEscape(usize),
}

/// Errors that can occur while reading a recorded sample file
#[derive(Error, Debug)]
pub enum SampleFileError {
    #[error("Failed to read sample file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Invalid sample on line {line}: {source}")]
    InvalidSample {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
