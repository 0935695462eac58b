use std::io::{self, IsTerminal};

use dialoguer::{Confirm, Input, Password, Select};
use tracing::debug;

use super::{
    ConfirmPrompt, PromptConfirm, PromptError, PromptSecret, PromptSelect, PromptText, SecretPrompt,
    SelectPrompt, TextPrompt,
};

/// Asks on the controlling terminal via `dialoguer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn is_interactive() -> bool {
        io::stdin().is_terminal()
    }

    fn ensure_interactive(label: &str) -> Result<(), PromptError> {
        if Self::is_interactive() {
            debug!(label, "prompting");
            Ok(())
        } else {
            Err(PromptError::NotInteractive)
        }
    }
}

fn map_err(err: dialoguer::Error) -> PromptError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => PromptError::Interrupted,
        dialoguer::Error::IO(e) => PromptError::Io(e),
        #[allow(unreachable_patterns)]
        other => PromptError::Io(io::Error::other(other.to_string())),
    }
}

impl PromptText for TerminalPrompt {
    fn text(&self, prompt: &TextPrompt) -> Result<String, PromptError> {
        Self::ensure_interactive(&prompt.label)?;

        let mut input = Input::<String>::new()
            .with_prompt(&prompt.label)
            .allow_empty(true);
        if let Some(default) = &prompt.default {
            input = input.default(default.clone());
        }
        let check = prompt.clone();
        let answer = input
            .validate_with(move |raw: &String| check.check(raw).map(|_| ()))
            .interact_text()
            .map_err(map_err)?;

        prompt.check(&answer).map_err(|reason| PromptError::Invalid { reason })
    }
}

impl PromptSecret for TerminalPrompt {
    fn secret(&self, prompt: &SecretPrompt) -> Result<String, PromptError> {
        Self::ensure_interactive(&prompt.label)?;

        let mut password = Password::new().with_prompt(&prompt.label);
        if prompt.confirmation {
            password = password.with_confirmation(format!("Confirm {}", prompt.label), "Entries do not match");
        }
        password.interact().map_err(map_err)
    }
}

impl PromptConfirm for TerminalPrompt {
    fn confirm(&self, prompt: &ConfirmPrompt) -> Result<bool, PromptError> {
        Self::ensure_interactive(&prompt.label)?;

        Confirm::new()
            .with_prompt(&prompt.label)
            .default(prompt.default)
            .interact()
            .map_err(map_err)
    }
}

impl PromptSelect for TerminalPrompt {
    fn select(&self, prompt: &SelectPrompt) -> Result<usize, PromptError> {
        if prompt.items.is_empty() {
            return Err(PromptError::NoItems);
        }
        Self::ensure_interactive(&prompt.label)?;

        Select::new()
            .with_prompt(&prompt.label)
            .items(&prompt.items)
            .default(prompt.default.min(prompt.items.len() - 1))
            .interact()
            .map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_select_fails_before_touching_terminal() {
        let err = TerminalPrompt.select(&SelectPrompt::new("pick", Vec::<String>::new())).unwrap_err();
        assert!(matches!(err, PromptError::NoItems));
    }

    #[test]
    fn test_interrupted_io_maps_to_interrupted() {
        let err = map_err(dialoguer::Error::IO(io::Error::new(io::ErrorKind::Interrupted, "^C")));
        assert!(matches!(err, PromptError::Interrupted));

        let err = map_err(dialoguer::Error::IO(io::Error::other("closed")));
        assert!(matches!(err, PromptError::Io(_)));
    }
}
