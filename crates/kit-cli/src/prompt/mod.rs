//! Interactive prompts, one trait per question kind.
//!
//! | Trait | Request | Answer |
//! |-------|---------|--------|
//! | [`PromptText`] | [`TextPrompt`] | `String` |
//! | [`PromptSecret`] | [`SecretPrompt`] | `String` |
//! | [`PromptConfirm`] | [`ConfirmPrompt`] | `bool` |
//! | [`PromptSelect`] | [`SelectPrompt`] | item index |
//!
//! [`TerminalPrompt`] asks on the controlling terminal. `ScriptedPrompt`
//! (test-support) answers from a queue.

mod request;
#[cfg(any(test, feature = "test-support"))]
mod scripted;
mod terminal;

use std::sync::Arc;

pub use request::{ConfirmPrompt, SecretPrompt, SelectPrompt, TextPrompt, Validator};
#[cfg(any(test, feature = "test-support"))]
pub use scripted::ScriptedPrompt;
pub use terminal::TerminalPrompt;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("cannot prompt: stdin is not a terminal")]
    NotInteractive,

    #[error("prompt interrupted")]
    Interrupted,

    #[error("select prompt has no items")]
    NoItems,

    #[error("invalid answer: {reason}")]
    Invalid { reason: String },

    /// A scripted prompt ran out of answers.
    #[error("no answer queued for prompt '{label}'")]
    NoAnswer { label: String },

    #[error("prompt I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait PromptText {
    fn text(&self, prompt: &TextPrompt) -> Result<String, PromptError>;
}

pub trait PromptSecret {
    fn secret(&self, prompt: &SecretPrompt) -> Result<String, PromptError>;
}

pub trait PromptConfirm {
    fn confirm(&self, prompt: &ConfirmPrompt) -> Result<bool, PromptError>;
}

pub trait PromptSelect {
    fn select(&self, prompt: &SelectPrompt) -> Result<usize, PromptError>;
}

macro_rules! forward_prompt {
    ($($ptr:ty),*) => {$(
        impl<T: PromptText + ?Sized> PromptText for $ptr {
            fn text(&self, prompt: &TextPrompt) -> Result<String, PromptError> {
                (**self).text(prompt)
            }
        }

        impl<T: PromptSecret + ?Sized> PromptSecret for $ptr {
            fn secret(&self, prompt: &SecretPrompt) -> Result<String, PromptError> {
                (**self).secret(prompt)
            }
        }

        impl<T: PromptConfirm + ?Sized> PromptConfirm for $ptr {
            fn confirm(&self, prompt: &ConfirmPrompt) -> Result<bool, PromptError> {
                (**self).confirm(prompt)
            }
        }

        impl<T: PromptSelect + ?Sized> PromptSelect for $ptr {
            fn select(&self, prompt: &SelectPrompt) -> Result<usize, PromptError> {
                (**self).select(prompt)
            }
        }
    )*};
}

forward_prompt!(&T, Arc<T>);
