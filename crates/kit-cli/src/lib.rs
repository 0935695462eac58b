//! Terminal helpers for command-line tools: a boxed startup [`Banner`] and
//! trait-based [`prompt`]s that can be scripted in tests.

mod banner;
pub mod prompt;
mod width;

pub use banner::{Banner, BorderStyle};
#[cfg(any(test, feature = "test-support"))]
pub use prompt::ScriptedPrompt;
pub use prompt::{
    ConfirmPrompt, PromptConfirm, PromptError, PromptSecret, PromptSelect, PromptText, SecretPrompt,
    SelectPrompt, TerminalPrompt, TextPrompt,
};
pub use width::{display_width, pad_center, pad_right, truncate};
