mod viewport;

pub use viewport::{
    compute_lines, match_mask, RenderLine, Row, SelectionOption, Viewport, DEFAULT_LINES_SHOWN,
};

use super::{Hooked, KeyHook, Prompt};
use crate::console::{Console, TerminalConsole};
use crate::error::PromptError;
use crate::key::{Control, Key};
use crate::lifecycle::{Lifecycle, State};
use crate::output::Output;
use crate::theme::{Color, Theme};
use std::io::Write;
use unicode_segmentation::UnicodeSegmentation;

/// Pick one option from a scrolling, type-to-filter list.
pub struct Select<C: Console = TerminalConsole> {
    lifecycle: Lifecycle<C>,
    question: String,
    options: Vec<SelectionOption>,
    lines_shown: usize,
    on_key: Option<KeyHook>,
    theme: Theme,
    viewport: Option<Viewport>,
}

impl Select {
    pub fn new(question: impl Into<String>, options: Vec<SelectionOption>) -> Self {
        Self::with_console(TerminalConsole::new(), question, options)
    }
}

impl<C: Console> Select<C> {
    pub fn with_console(
        console: C,
        question: impl Into<String>,
        options: Vec<SelectionOption>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(console),
            question: question.into(),
            options,
            lines_shown: 0,
            on_key: None,
            theme: Theme::default(),
            viewport: None,
        }
    }

    /// Rows of options visible at once; zero means the default of seven.
    pub fn lines_shown(mut self, n: usize) -> Self {
        self.lines_shown = n;
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

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// The option under the cursor; `None` until the prompt has been shown.
    pub fn response(&self) -> Option<&SelectionOption> {
        let vp = self.viewport.as_ref()?;
        self.options.get(vp.cursor_option())
    }

    fn run(&mut self) -> Result<(), PromptError> {
        if let Some(out) = self.lifecycle.output() {
            out.hide_cursor();
        }
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
        let Some(vp) = self.viewport.as_mut() else {
            return Ok(());
        };

        match key {
            Key::Control(Control::Up) => vp.move_up(),
            Key::Control(Control::Down) => vp.move_down(),
            Key::Control(Control::Enter) => {
                if vp.match_count() > 0 {
                    if let Some(out) = self.lifecycle.output() {
                        out.show_cursor();
                    }
                    self.render(true)?;
                    return self.lifecycle.finish();
                }
            }
            Key::Control(Control::Backspace) => vp.pop_filter(),
            _ => {
                if let Some(c) = key.text() {
                    vp.push_filter(c);
                }
            }
        }

        if self.lifecycle.state() != State::Waiting {
            self.render(false)?;
        }
        Ok(())
    }

    fn render(&mut self, finished: bool) -> Result<(), PromptError> {
        let theme = self.theme;
        let (Some(out), Some(vp)) = (self.lifecycle.output(), self.viewport.as_ref()) else {
            return Ok(());
        };

        out.clear();
        out.write_color("? ", theme.accent);
        out.write(&self.question);
        out.write(": ");

        if finished {
            let option = &self.options[vp.cursor_option()];
            let answer = match option.description.as_deref() {
                Some(desc) if !desc.is_empty() => format!("{}: {desc}", option.name),
                _ => option.name.clone(),
            };
            out.write_color(&answer, theme.answer);
            return Ok(());
        }

        out.write_color("(Use arrow keys) (Type to filter)", theme.accent);
        out.next_line();

        if vp.match_count() == 0 {
            out.write_color_ln(vp.filter(), theme.alert);
        }

        let selected = vp.cursor_option();
        for row in vp.window() {
            let Row::Line(idx) = row else {
                out.next_line();
                continue;
            };
            let line = &vp.lines()[idx];
            if idx == vp.cursor() {
                out.write_color("> ", theme.answer);
            } else {
                out.write("  ");
            }

            let current = (line.option == selected).then_some(theme.answer);
            if line.is_first {
                let name = &self.options[line.option].name;
                let mask = match_mask(name, vp.filter());
                let colors = line
                    .text
                    .graphemes(true)
                    .enumerate()
                    .map(|(i, g)| match mask.get(i).copied() {
                        Some(true) => (g, Some(theme.alert)),
                        _ => (g, current),
                    });
                write_runs(out, colors);
                out.next_line();
            } else {
                match current {
                    Some(color) => out.write_color_ln(&line.text, color),
                    None => out.write_ln(&line.text),
                }
            }
        }

        if vp.lines().len() > vp.lines_to_show() {
            out.write_color("(Move up and down to reveal more choices)", theme.accent);
        }
        Ok(out.flush()?)
    }
}

/// Write graphemes, switching colour only where it changes.
fn write_runs<'a, W: Write>(
    out: &mut Output<W>,
    graphemes: impl Iterator<Item = (&'a str, Option<Color>)>,
) {
    let mut run = String::new();
    let mut run_color = None;
    for (g, color) in graphemes {
        if color != run_color && !run.is_empty() {
            write_run(out, &run, run_color);
            run.clear();
        }
        run_color = color;
        run.push_str(g);
    }
    write_run(out, &run, run_color);
}

fn write_run<W: Write>(out: &mut Output<W>, text: &str, color: Option<Color>) {
    if text.is_empty() {
        return;
    }
    match color {
        Some(color) => out.write_color(text, color),
        None => out.write(text),
    }
}

impl<C: Console> Prompt for Select<C> {
    fn show(&mut self) -> Result<(), PromptError> {
        if self.options.is_empty() {
            return Err(PromptError::NoOptions);
        }
        self.lifecycle.show()?;
        let width = self.lifecycle.output().map_or(0, |out| out.width());
        match self.viewport.as_mut() {
            Some(vp) => vp.relayout(&self.options, width),
            None => self.viewport = Some(Viewport::new(&self.options, width, self.lines_shown)),
        }

        if let Err(err) = self.run() {
            if let Some(out) = self.lifecycle.output() {
                out.show_cursor();
            }
            return Err(self.lifecycle.bail(err));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PromptError> {
        if let Some(out) = self.lifecycle.output() {
            out.show_cursor();
        }
        self.lifecycle.pause()
    }

    fn reset_to_waiting(&mut self) -> Result<(), PromptError> {
        self.lifecycle.reset_to_waiting()
    }

    fn state(&self) -> State {
        self.lifecycle.state()
    }
}

impl<C: Console> Hooked for Select<C> {
    fn hook_slot(&mut self) -> &mut Option<KeyHook> {
        &mut self.on_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crossterm::event::KeyCode;

    fn abc() -> Vec<SelectionOption> {
        ["Alpha", "Beta", "Gamma"]
            .into_iter()
            .map(SelectionOption::new)
            .collect()
    }

    fn screen(prompt: &Select<ScriptedConsole>) -> vt100::Parser {
        let mut parser = vt100::Parser::new(12, 50, 0);
        parser.process(&prompt.console().output().bytes());
        parser
    }

    fn rows(parser: &vt100::Parser) -> Vec<String> {
        parser
            .screen()
            .rows(0, 50)
            .map(|r| r.trim_end().to_string())
            .collect()
    }

    #[test]
    fn empty_options_fail_before_touching_the_terminal() {
        let mut prompt = Select::with_console(ScriptedConsole::new(50), "Pick", Vec::new());
        assert!(matches!(prompt.show(), Err(PromptError::NoOptions)));
        assert_eq!(prompt.state(), State::Waiting);
        assert!(prompt.console().output().bytes().is_empty());
    }

    #[test]
    fn enter_selects_option_under_cursor() {
        let console = ScriptedConsole::new(50)
            .key(KeyCode::Down)
            .key(KeyCode::Down)
            .key(KeyCode::Enter);
        let mut prompt = Select::with_console(console, "Pick", abc());
        prompt.show().unwrap();
        assert_eq!(prompt.response().unwrap().name, "Gamma");
        let parser = screen(&prompt);
        assert_eq!(rows(&parser)[0], "? Pick: Gamma");
        assert_eq!(rows(&parser)[1], "");
        assert!(!parser.screen().hide_cursor());
    }

    #[test]
    fn answer_includes_description() {
        let options = vec![SelectionOption::new("fix").with_description("a bug fix")];
        let console = ScriptedConsole::new(50).key(KeyCode::Enter);
        let mut prompt = Select::with_console(console, "Type", options);
        prompt.show().unwrap();
        assert_eq!(rows(&screen(&prompt))[0], "? Type: fix: a bug fix");
    }

    #[test]
    fn filter_then_submit() {
        let console = ScriptedConsole::new(50)
            .key(KeyCode::Down)
            .type_str("al\n");
        let mut prompt = Select::with_console(console, "Pick", abc());
        prompt.show().unwrap();
        assert_eq!(prompt.response().unwrap().name, "Alpha");
    }

    #[test]
    fn enter_is_ignored_when_nothing_matches() {
        let console = ScriptedConsole::new(50)
            .type_str("zz\n")
            .key(KeyCode::Backspace)
            .key(KeyCode::Backspace);
        let mut prompt = Select::with_console(console, "Pick", abc());
        let err = prompt.show().unwrap_err();
        assert!(matches!(err, PromptError::Read(_)));
        assert_eq!(prompt.viewport().unwrap().filter(), "");
        let parser = screen(&prompt);
        // The cursor comes back even when the loop ends in an error.
        assert!(!parser.screen().hide_cursor());
    }

    #[test]
    fn unmatched_filter_is_shown_in_alert_colour() {
        let console = ScriptedConsole::new(50).type_str("zz");
        let mut prompt = Select::with_console(console, "Pick", abc());
        let _ = prompt.show();
        let parser = screen(&prompt);
        let rows = rows(&parser);
        assert_eq!(rows[1], "zz");
        let cell = parser.screen().cell(1, 0).unwrap();
        assert_eq!(cell.fgcolor(), vt100::Color::Idx(1));
        assert!(rows[2..4].iter().all(|r| r.is_empty()));
    }

    #[test]
    fn footer_only_when_rows_are_hidden() {
        let mut prompt = Select::with_console(ScriptedConsole::new(50), "Pick", abc())
            .lines_shown(2);
        let _ = prompt.show();
        let rows = rows(&screen(&prompt));
        let footer = "(Move up and down to reveal more choices)";
        assert_eq!(&rows[1..4], ["> Alpha:", "  Beta:", footer]);
    }

    #[test]
    fn cursor_row_is_marked_and_highlighted() {
        let console = ScriptedConsole::new(50).key(KeyCode::Down).type_str("a");
        let mut prompt = Select::with_console(console, "Pick", abc());
        let _ = prompt.show();
        let parser = screen(&prompt);
        let rows = rows(&parser);
        assert_eq!(rows[0], "? Pick: (Use arrow keys) (Type to filter)");
        assert_eq!(&rows[1..4], ["> Beta:", "  Gamma:", "  Alpha:"]);
        assert_eq!(rows[4], "");
        let s = parser.screen();
        assert_eq!(s.cell(1, 0).unwrap().fgcolor(), vt100::Color::Idx(6));
        // "B" takes the answer colour, the matched "a" the alert colour.
        assert_eq!(s.cell(1, 2).unwrap().fgcolor(), vt100::Color::Idx(6));
        assert_eq!(s.cell(1, 5).unwrap().fgcolor(), vt100::Color::Idx(1));
        assert_eq!(s.cell(2, 2).unwrap().fgcolor(), vt100::Color::Default);
    }
}
