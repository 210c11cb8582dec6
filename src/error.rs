use crate::lifecycle::State;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("cannot {op} a prompt that is {state}")]
    InvalidState { op: &'static str, state: State },

    #[error("can't listen to keyboard: {0}")]
    Keyboard(#[source] io::Error),

    #[error("couldn't get console size: {0}")]
    TerminalSize(#[source] io::Error),

    #[error("error getting key input: {0}")]
    Read(#[source] io::Error),

    #[error("prompt loop aborted")]
    Aborted,

    #[error("select prompt has no options")]
    NoOptions,

    #[error("failed to write to terminal: {0}")]
    Io(#[from] io::Error),

    /// The keyboard session could not be released, so the terminal may still
    /// be in raw mode. Callers should stop the process.
    #[error("failed to release keyboard session: {0}")]
    SessionRelease(#[source] io::Error),
}

impl PromptError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PromptError::SessionRelease(_))
    }
}

/// Failure reported by a keyboard collaborator.
#[derive(Debug, Error)]
pub enum ReadError {
    /// An escape sequence that could not be decoded. Safe to read again.
    #[error("unrecognized escape sequence")]
    Unrecognized,

    #[error(transparent)]
    Io(#[from] io::Error),
}
