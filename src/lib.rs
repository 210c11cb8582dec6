pub mod config;
pub mod console;
pub mod editor;
pub mod error;
mod graphemes;
pub mod key;
pub mod lifecycle;
pub mod log;
pub mod output;
pub mod prompt;
pub mod theme;

pub use console::{Console, ScriptedConsole, SharedBuffer, TerminalConsole};
pub use error::{PromptError, ReadError};
pub use key::{Control, Key};
pub use lifecycle::{Lifecycle, State};
pub use output::Output;
pub use prompt::{Boolean, KeyHook, Prompt, Select, SelectionOption, Text};
pub use theme::{Color, Theme};
