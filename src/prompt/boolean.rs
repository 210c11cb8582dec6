use super::{Hooked, KeyHook, Prompt};
use crate::console::{Console, TerminalConsole};
use crate::editor::{TextArea, TextEdit};
use crate::error::PromptError;
use crate::key::{self, Control, Key};
use crate::lifecycle::{Lifecycle, State};
use crate::theme::Theme;

/// Decides whether typed input means "yes". Called with `""` for the default.
pub type TruthFn = Box<dyn Fn(&str) -> bool>;

/// Yes/no question answered on the same row.
pub struct Boolean<C: Console = TerminalConsole> {
    lifecycle: Lifecycle<C>,
    question: String,
    is_true: Option<TruthFn>,
    on_key: Option<KeyHook>,
    theme: Theme,
    editor: Option<TextArea>,
}

impl Boolean {
    pub fn new(question: impl Into<String>) -> Self {
        Self::with_console(TerminalConsole::new(), question)
    }
}

impl<C: Console> Boolean<C> {
    pub fn with_console(console: C, question: impl Into<String>) -> Self {
        Self {
            lifecycle: Lifecycle::new(console),
            question: question.into(),
            is_true: None,
            on_key: None,
            theme: Theme::default(),
            editor: None,
        }
    }

    pub fn is_true(mut self, f: impl Fn(&str) -> bool + 'static) -> Self {
        self.is_true = Some(Box::new(f));
        self
    }

    pub fn on_key(mut self, hook: impl FnMut(&mut dyn Prompt, Key) -> bool + 'static) -> Self {
        self.on_key = Some(Box::new(hook));
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn console(&self) -> &C {
        self.lifecycle.console()
    }

    /// What an empty answer means.
    pub fn default_response(&self) -> bool {
        self.truth("")
    }

    pub fn response(&self) -> bool {
        let input = self.editor.as_ref().map(|e| e.text()).unwrap_or_default();
        self.truth(&input)
    }

    fn truth(&self, input: &str) -> bool {
        match &self.is_true {
            Some(f) => f(input),
            None => is_yes(input),
        }
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

        if key == Key::Control(Control::Enter) {
            self.render(true)?;
            return self.lifecycle.finish();
        }

        if let Some(editor) = self.editor.as_mut() {
            key::apply_key(key, editor);
        }
        if self.lifecycle.state() != State::Waiting {
            self.render(false)?;
        }
        Ok(())
    }

    fn render(&mut self, finished: bool) -> Result<(), PromptError> {
        let hint = if self.default_response() {
            " (Y/n) "
        } else {
            " (y/N) "
        };
        let answer = if self.response() { "Yes" } else { "No" };
        let theme = self.theme;
        let (Some(out), Some(editor)) = (self.lifecycle.output(), self.editor.as_mut()) else {
            return Ok(());
        };

        out.clear();
        out.write_color("? ", theme.accent);
        out.write(&self.question);
        out.write_color(hint, theme.accent);

        let (base_row, col) = out.cursor();
        editor.set_first_line_indent(col);

        if finished {
            out.write_color(answer, theme.answer);
        } else {
            out.write(&editor.text());
        }

        out.set_cursor(base_row + editor.cursor_row(), editor.cursor_col());
        Ok(out.flush()?)
    }
}

impl<C: Console> Prompt for Boolean<C> {
    fn show(&mut self) -> Result<(), PromptError> {
        self.lifecycle.show()?;
        let width = self.lifecycle.output().map_or(0, |out| out.width());
        self.editor = Some(TextArea::new(width));

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

impl<C: Console> Hooked for Boolean<C> {
    fn hook_slot(&mut self) -> &mut Option<KeyHook> {
        &mut self.on_key
    }
}

/// `y` or `yes`, any case.
pub fn is_yes(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "y" | "yes")
}
