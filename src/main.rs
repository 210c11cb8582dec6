use clap::Parser;
use smelt_prompt::config::Config;
use smelt_prompt::prompt::is_yes;
use smelt_prompt::{
    log, Boolean, Control, Key, Prompt, PromptError, Select, SelectionOption, State, Text,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "smelt-prompt", about = "Compose a commit message one prompt at a time")]
struct Args {
    /// Rows of choices the type picker shows at once
    #[arg(long)]
    lines: Option<usize>,

    /// Config file (default: $XDG_CONFIG_HOME/smelt-prompt/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSONL log at this level: debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,
}

/// Where the back hook parks a failed pause until the loop can report it.
type Failure = Rc<RefCell<Option<PromptError>>>;

/// Ctrl+B steps back to the previous prompt.
fn go_back(failure: Failure) -> impl FnMut(&mut dyn Prompt, Key) -> bool {
    move |prompt, key| {
        if key != Key::Control(Control::CtrlB) {
            return true;
        }
        if let Err(e) = prompt.pause() {
            *failure.borrow_mut() = Some(e);
        }
        false
    }
}

fn summary_rule(paragraphs: &[String]) -> Result<(), String> {
    let summary = paragraphs.concat();
    match summary.trim().chars().count() {
        0 => Err("a summary is required".into()),
        n if n > 50 => Err(format!("keep it under 50 characters ({n})")),
        _ => Ok(()),
    }
}

struct Steps {
    kind: Select,
    summary: Text,
    body: Text,
    confirm: Boolean,
}

impl Steps {
    const COUNT: usize = 4;

    fn get(&mut self, i: usize) -> &mut dyn Prompt {
        match i {
            0 => &mut self.kind,
            1 => &mut self.summary,
            2 => &mut self.body,
            _ => &mut self.confirm,
        }
    }

    /// Show each prompt in turn. A paused prompt reopens the one before it.
    fn run(&mut self, failure: &Failure) -> Result<(), PromptError> {
        let mut i = 0;
        while i < Self::COUNT {
            self.get(i).show()?;
            if let Some(e) = failure.borrow_mut().take() {
                return Err(e);
            }
            if self.get(i).state() == State::Finished {
                i += 1;
            } else if i > 0 {
                i -= 1;
                self.get(i).reset_to_waiting()?;
            }
        }
        Ok(())
    }

    fn message(&self) -> String {
        let kind = self.kind.response().map_or("chore", |o| o.name.as_str());
        let mut msg = format!("{kind}: {}", self.summary.response().trim());
        let body = self.body.response();
        if !body.trim().is_empty() {
            msg.push_str("\n\n");
            msg.push_str(&body);
        }
        msg
    }
}

fn kind(name: &str, description: &str) -> SelectionOption {
    SelectionOption::new(name).with_description(description)
}

fn kinds() -> Vec<SelectionOption> {
    vec![
        kind("feat", "A new feature"),
        kind("fix", "A bug fix"),
        kind("docs", "Documentation only changes"),
        kind("style", "Formatting, missing semicolons, white-space"),
        kind("refactor", "Restructures code without changing behaviour"),
        kind("perf", "A code change that improves performance"),
        kind("test", "Adding or fixing tests"),
        kind("chore", "Build process or tooling changes"),
    ]
}

fn main() {
    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    if let Some(level) = args.log_level.or(cfg.log_level) {
        match log::parse_level(&level) {
            Some(level) => {
                log::set_level(level);
                log::init(log::default_path());
            }
            None => eprintln!("warning: unknown log level {level:?}, logging disabled"),
        }
    }

    let lines = args.lines.or(cfg.lines_shown).unwrap_or(0);
    let theme = cfg.theme;
    let failure = Failure::default();

    let mut steps = Steps {
        kind: Select::new("Type of change", kinds())
            .lines_shown(lines)
            .theme(theme)
            .on_key(go_back(failure.clone())),
        summary: Text::new("Summary")
            .single_line()
            .validator(summary_rule)
            .theme(theme)
            .on_key(go_back(failure.clone())),
        body: Text::new("Body")
            .show_character_count()
            .submit_max_line_length(72)
            .theme(theme)
            .on_key(go_back(failure.clone())),
        confirm: Boolean::new("Commit with this message?")
            .is_true(|s| s.is_empty() || is_yes(s))
            .theme(theme)
            .on_key(go_back(failure.clone())),
    };

    match steps.run(&failure) {
        Ok(()) if steps.confirm.response() => println!("\n{}", steps.message()),
        Ok(()) => println!("Discarded."),
        Err(PromptError::Aborted) => std::process::exit(130),
        Err(e) if e.is_fatal() => {
            eprintln!("fatal: {e}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
