use crate::console::Console;
use crate::error::{PromptError, ReadError};
use crate::key::{self, Key};
use crate::log::{self, Level};
use crate::output::Output;
use serde_json::json;
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Waiting,
    Showing,
    Finished,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Waiting => "waiting",
            State::Showing => "showing",
            State::Finished => "finished",
        })
    }
}

/// Waiting, then Showing, then Finished. Pause takes a showing prompt back to
/// Waiting.
///
/// Owns the console for the prompt's lifetime and a fresh `Output` per show.
pub struct Lifecycle<C: Console> {
    console: C,
    output: Option<Output<C::Writer>>,
    state: State,
}

impl<C: Console> Lifecycle<C> {
    pub fn new(console: C) -> Self {
        Self {
            console,
            output: None,
            state: State::Waiting,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// The current render target. `None` before the first show.
    pub fn output(&mut self) -> Option<&mut Output<C::Writer>> {
        self.output.as_mut()
    }

    fn invalid(&self, op: &'static str) -> PromptError {
        PromptError::InvalidState {
            op,
            state: self.state,
        }
    }

    pub fn show(&mut self) -> Result<(), PromptError> {
        if self.state != State::Waiting {
            return Err(self.invalid("show"));
        }
        let width = self.console.width().map_err(PromptError::TerminalSize)?;
        if width == 0 {
            let err = io::Error::other("terminal has no columns");
            return Err(PromptError::TerminalSize(err));
        }
        self.console.open().map_err(PromptError::Keyboard)?;

        self.output = Some(Output::new(self.console.writer(), width));
        self.state = State::Showing;
        log::entry(Level::Info, "prompt_show", &json!({ "width": width }));
        Ok(())
    }

    /// Erase the prompt and give the keyboard back; a later `show` redraws it.
    pub fn pause(&mut self) -> Result<(), PromptError> {
        if self.state != State::Showing {
            return Err(self.invalid("pause"));
        }
        let flushed = match self.output.as_mut() {
            Some(out) => {
                out.clear();
                out.flush()
            }
            None => Ok(()),
        };
        self.state = State::Waiting;
        self.console.close().map_err(PromptError::SessionRelease)?;
        log::entry(Level::Info, "prompt_pause", &json!({}));
        Ok(flushed?)
    }

    /// Erase a finished prompt's answer so it can be shown again.
    pub fn reset_to_waiting(&mut self) -> Result<(), PromptError> {
        if self.state != State::Finished {
            return Err(self.invalid("reset"));
        }
        self.state = State::Waiting;
        log::entry(Level::Info, "prompt_reset", &json!({}));
        if let Some(out) = self.output.as_mut() {
            out.uncommit()?;
        }
        Ok(())
    }

    /// Release the keyboard and leave the last render on screen.
    pub fn finish(&mut self) -> Result<(), PromptError> {
        let released = self.console.close();
        let committed = match self.output.as_mut() {
            Some(out) => out.commit(),
            None => Ok(()),
        };
        self.state = State::Finished;
        released.map_err(PromptError::SessionRelease)?;
        log::entry(Level::Info, "prompt_finish", &json!({}));
        Ok(committed?)
    }

    /// End an input loop that failed. The session is released first; a
    /// failure to release outranks `err`.
    pub fn bail(&mut self, err: PromptError) -> PromptError {
        if self.state != State::Showing {
            return err;
        }
        match self.finish() {
            Err(fatal) if fatal.is_fatal() => fatal,
            _ => err,
        }
    }

    /// Block for the next key. Undecodable input is skipped; Ctrl+C aborts.
    pub fn next_key(&mut self) -> Result<Key, PromptError> {
        loop {
            match self.console.read_key() {
                Ok(event) if key::is_interrupt(&event) => {
                    log::entry(Level::Info, "prompt_abort", &json!({}));
                    return Err(PromptError::Aborted);
                }
                Ok(event) => return Ok(Key::from_event(&event)),
                Err(ReadError::Unrecognized) => {
                    log::entry(Level::Debug, "key_retry", &json!({}));
                }
                Err(ReadError::Io(e)) => {
                    let data = json!({ "error": e.to_string() });
                    log::entry(Level::Warn, "key_read_failed", &data);
                    return Err(PromptError::Read(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::key::Control;
    use crossterm::event::KeyCode;

    fn refused(result: Result<(), PromptError>) -> bool {
        matches!(result, Err(PromptError::InvalidState { .. }))
    }

    fn shown(console: ScriptedConsole) -> Lifecycle<ScriptedConsole> {
        let mut lc = Lifecycle::new(console);
        lc.show().unwrap();
        lc
    }

    #[test]
    fn show_opens_session_and_output() {
        let lc = shown(ScriptedConsole::new(40));
        assert_eq!(lc.state(), State::Showing);
        assert!(lc.console().is_open());
    }

    #[test]
    fn show_twice_is_rejected() {
        let mut lc = shown(ScriptedConsole::new(40));
        let err = lc.show().unwrap_err();
        assert_eq!(err.to_string(), "cannot show a prompt that is showing");
        assert_eq!(lc.state(), State::Showing);
    }

    #[test]
    fn show_failures_leave_prompt_waiting() {
        let mut lc = Lifecycle::new(ScriptedConsole::new(40).fail_open());
        assert!(matches!(lc.show(), Err(PromptError::Keyboard(_))));
        assert_eq!(lc.state(), State::Waiting);

        let mut lc = Lifecycle::new(ScriptedConsole::without_size());
        assert!(matches!(lc.show(), Err(PromptError::TerminalSize(_))));
        assert_eq!(lc.state(), State::Waiting);
        assert!(!lc.console().is_open());
    }

    #[test]
    fn pause_only_while_showing() {
        let mut lc = Lifecycle::new(ScriptedConsole::new(40));
        assert!(refused(lc.pause()));

        lc.show().unwrap();
        lc.pause().unwrap();
        assert_eq!(lc.state(), State::Waiting);
        assert!(!lc.console().is_open());

        lc.show().unwrap();
        lc.finish().unwrap();
        let err = lc.pause().unwrap_err();
        assert_eq!(err.to_string(), "cannot pause a prompt that is finished");
    }

    #[test]
    fn reset_only_when_finished() {
        let mut lc = shown(ScriptedConsole::new(40));
        assert!(refused(lc.reset_to_waiting()));
        lc.finish().unwrap();
        let err = lc.show().unwrap_err();
        assert_eq!(err.to_string(), "cannot show a prompt that is finished");
        lc.reset_to_waiting().unwrap();
        assert_eq!(lc.state(), State::Waiting);
        assert!(refused(lc.reset_to_waiting()));
    }

    #[test]
    fn release_failures_are_fatal() {
        let mut lc = shown(ScriptedConsole::new(40).fail_close());
        let err = lc.finish().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(lc.state(), State::Finished);

        let mut lc = shown(ScriptedConsole::new(40).fail_close());
        assert!(lc.pause().unwrap_err().is_fatal());
    }

    #[test]
    fn next_key_skips_undecodable_input() {
        let console = ScriptedConsole::new(40)
            .read_error(ReadError::Unrecognized)
            .read_error(ReadError::Unrecognized)
            .key(KeyCode::Up);
        let mut lc = shown(console);
        assert_eq!(lc.next_key().unwrap(), Key::Control(Control::Up));
    }

    #[test]
    fn ctrl_c_aborts_and_bail_releases() {
        let mut lc = shown(ScriptedConsole::new(40).ctrl('c'));
        let err = lc.next_key().unwrap_err();
        assert!(matches!(err, PromptError::Aborted));
        let err = lc.bail(err);
        assert!(matches!(err, PromptError::Aborted));
        assert_eq!(lc.state(), State::Finished);
        assert!(!lc.console().is_open());
    }

    #[test]
    fn bail_prefers_fatal_release_error() {
        let mut lc = shown(ScriptedConsole::new(40).fail_close());
        let err = lc.next_key().unwrap_err();
        assert!(matches!(err, PromptError::Read(_)));
        assert!(lc.bail(err).is_fatal());
    }
}
