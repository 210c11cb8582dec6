use super::{Hooked, KeyHook, Prompt};
use crate::console::{Console, TerminalConsole};
use crate::editor::{TextArea, TextEdit};
use crate::error::PromptError;
use crate::key::{self, Control, Key};
use crate::lifecycle::{Lifecycle, State};
use crate::theme::Theme;

/// Checks the paragraphs typed so far. `Err` carries the message to show.
pub type Validator = Box<dyn Fn(&[String]) -> Result<(), String>>;

/// Free-form text question, single- or multi-line.
///
/// Multi-line input is submitted with two trailing empty lines, or with
/// enter on an empty buffer. Typed text survives `pause`/`show`.
pub struct Text<C: Console = TerminalConsole> {
    lifecycle: Lifecycle<C>,
    question: String,
    single_line: bool,
    validator: Option<Validator>,
    on_key: Option<KeyHook>,
    show_character_count: bool,
    force_lowercase: bool,
    submit_max_line_length: Option<usize>,
    theme: Theme,
    did_attempt_submit: bool,
    editor: Option<TextArea>,
}

impl Text {
    pub fn new(question: impl Into<String>) -> Self {
        Self::with_console(TerminalConsole::new(), question)
    }
}

impl<C: Console> Text<C> {
    pub fn with_console(console: C, question: impl Into<String>) -> Self {
        Self {
            lifecycle: Lifecycle::new(console),
            question: question.into(),
            single_line: false,
            validator: None,
            on_key: None,
            show_character_count: false,
            force_lowercase: false,
            submit_max_line_length: None,
            theme: Theme::default(),
            did_attempt_submit: false,
            editor: None,
        }
    }

    pub fn single_line(mut self) -> Self {
        self.single_line = true;
        self
    }

    pub fn validator(mut self, f: impl Fn(&[String]) -> Result<(), String> + 'static) -> Self {
        self.validator = Some(Box::new(f));
        self
    }

    pub fn on_key(mut self, hook: impl FnMut(&mut dyn Prompt, Key) -> bool + 'static) -> Self {
        self.on_key = Some(Box::new(hook));
        self
    }

    pub fn show_character_count(mut self) -> Self {
        self.show_character_count = true;
        self
    }

    pub fn force_lowercase(mut self) -> Self {
        self.force_lowercase = true;
        self
    }

    /// Re-wrap the answer to this many columns once it is submitted.
    pub fn submit_max_line_length(mut self, len: usize) -> Self {
        self.submit_max_line_length = Some(len).filter(|&n| n > 0);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn console(&self) -> &C {
        self.lifecycle.console()
    }

    /// The typed text, soft-wrapped rows joined with `\n`.
    pub fn response(&self) -> String {
        self.editor.as_ref().map(|e| e.text()).unwrap_or_default()
    }

    pub fn did_attempt_submit(&self) -> bool {
        self.did_attempt_submit
    }

    fn run(&mut self) -> Result<(), PromptError> {
        self.render(false)?;
        while self.lifecycle.state() == State::Showing {
            let key = self.lifecycle.next_key()?;
            self.handle_key(key)?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: Key) -> Result<(), PromptError> {
        if self.lifecycle.state() != State::Showing || !self.offer_to_hook(key) {
            return Ok(());
        }
        let Some(editor) = self.editor.as_mut() else {
            return Ok(());
        };

        self.did_attempt_submit = false;
        let enter = key == Key::Control(Control::Enter);
        let mut finished = false;

        if enter {
            let blank_pair = ends_with_blank_pair(editor.paragraphs());
            if self.single_line || editor.is_empty() {
                self.did_attempt_submit = true;
                finished = validate(self.validator.as_ref(), editor).is_ok();
            } else if blank_pair && editor.cursor_on_last_paragraph() {
                self.did_attempt_submit = true;
                finished = validate(self.validator.as_ref(), editor).is_ok();
                // This enter is applied below unless it submits, so one blank
                // line always goes; both go on submit.
                editor.backspace();
                if finished {
                    editor.backspace();
                }
            }
        }

        if finished {
            if let Some(len) = self.submit_max_line_length {
                editor.set_width(len);
            }
            self.render(true)?;
            return self.lifecycle.finish();
        }

        if !enter || !self.single_line {
            let key = if self.force_lowercase {
                lowercase(key)
            } else {
                key
            };
            key::apply_key(key, editor);
        }

        if self.lifecycle.state() != State::Waiting {
            self.render(false)?;
        }
        Ok(())
    }

    fn render(&mut self, finished: bool) -> Result<(), PromptError> {
        let theme = self.theme;
        let (Some(out), Some(editor)) = (self.lifecycle.output(), self.editor.as_mut()) else {
            return Ok(());
        };
        let verdict = validate(self.validator.as_ref(), editor);

        out.clear();
        out.write_color("? ", theme.accent);
        out.write(&self.question);
        if !self.single_line {
            if editor.is_empty() && verdict.is_ok() {
                out.write(": (press enter to skip)");
            } else {
                out.write(": (enter two empty lines to submit)");
            }
        }
        out.write_ln(":");
        let base_row = out.cursor().0;

        if self.show_character_count {
            let prefix = format!("({}) ", editor.grapheme_count());
            editor.set_first_line_indent(prefix.len());
            let color = if verdict.is_ok() {
                theme.answer
            } else {
                theme.alert
            };
            out.write_color(&prefix, color);
        }

        match &verdict {
            _ if finished => out.write_color(&editor.text(), theme.answer),
            Ok(()) => out.write(&editor.text()),
            Err(message) => {
                out.write_color(&editor.text(), theme.alert);
                if self.did_attempt_submit {
                    out.next_line();
                    out.write_color(">> ", theme.alert);
                    out.write(message);
                }
            }
        }

        out.set_cursor(base_row + editor.cursor_row(), editor.cursor_col());
        Ok(out.flush()?)
    }
}

impl<C: Console> Prompt for Text<C> {
    fn show(&mut self) -> Result<(), PromptError> {
        self.lifecycle.show()?;
        if self.editor.is_none() {
            let width = self.lifecycle.output().map_or(0, |out| out.width());
            self.editor = Some(TextArea::new(width));
        }

        if let Err(err) = self.run() {
            return Err(self.lifecycle.bail(err));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PromptError> {
        self.lifecycle.pause()
    }

    fn reset_to_waiting(&mut self) -> Result<(), PromptError> {
        self.lifecycle.reset_to_waiting()
    }

    fn state(&self) -> State {
        self.lifecycle.state()
    }
}

impl<C: Console> Hooked for Text<C> {
    fn hook_slot(&mut self) -> &mut Option<KeyHook> {
        &mut self.on_key
    }
}

fn validate(validator: Option<&Validator>, editor: &TextArea) -> Result<(), String> {
    match validator {
        Some(f) => f(editor.paragraphs()),
        None => Ok(()),
    }
}

fn ends_with_blank_pair(paragraphs: &[String]) -> bool {
    matches!(paragraphs, [.., a, b] if a.is_empty() && b.is_empty())
}

fn lowercase(key: Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_lowercase().next().unwrap_or(c)),
        other => other,
    }
}
