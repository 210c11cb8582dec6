mod boolean;
pub mod select;
mod text;

pub use boolean::{is_yes, Boolean, TruthFn};
pub use select::{Select, SelectionOption};
pub use text::{Text, Validator};

use crate::error::PromptError;
use crate::key::Key;
use crate::lifecycle::State;

/// The operations every prompt variant shares.
pub trait Prompt {
    /// Draw the prompt and block until it finishes, pauses or fails.
    fn show(&mut self) -> Result<(), PromptError>;
    fn pause(&mut self) -> Result<(), PromptError>;
    fn reset_to_waiting(&mut self) -> Result<(), PromptError>;
    fn state(&self) -> State;
}

/// Sees every key before the prompt does. Returning `false` swallows the key.
///
/// The hook gets the prompt itself, so it may `pause` it to step away.
pub type KeyHook = Box<dyn FnMut(&mut dyn Prompt, Key) -> bool>;

pub(crate) trait Hooked: Prompt + Sized {
    fn hook_slot(&mut self) -> &mut Option<KeyHook>;

    /// Offer `key` to the hook; `false` means it was swallowed.
    fn offer_to_hook(&mut self, key: Key) -> bool {
        let Some(mut hook) = self.hook_slot().take() else {
            return true;
        };
        let proceed = hook(self, key);
        *self.hook_slot() = Some(hook);
        proceed
    }
}
