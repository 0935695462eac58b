use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use kit_env::parse_bool;

use super::{
    ConfirmPrompt, PromptConfirm, PromptError, PromptSecret, PromptSelect, PromptText, SecretPrompt,
    SelectPrompt, TextPrompt,
};

/// Answers prompts from a queue, applying the same defaults and validation
/// as [`TerminalPrompt`](super::TerminalPrompt).
///
/// An empty answer takes the prompt's default. Confirm answers use the
/// lenient bool spellings (`y`, `no`, `1`, ...). Select answers are an
/// index or the exact item text.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, answer: impl Into<String>) {
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(answer.into());
    }

    /// Labels of every prompt asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next(&self, label: &str) -> Result<String, PromptError> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(label.to_string());
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| PromptError::NoAnswer {
                label: label.to_string(),
            })
    }
}

impl PromptText for ScriptedPrompt {
    fn text(&self, prompt: &TextPrompt) -> Result<String, PromptError> {
        let raw = self.next(&prompt.label)?;
        prompt.check(&raw).map_err(|reason| PromptError::Invalid { reason })
    }
}

impl PromptSecret for ScriptedPrompt {
    fn secret(&self, prompt: &SecretPrompt) -> Result<String, PromptError> {
        let first = self.next(&prompt.label)?;
        if prompt.confirmation {
            let second = self.next(&prompt.label)?;
            if first != second {
                return Err(PromptError::Invalid {
                    reason: "entries do not match".to_string(),
                });
            }
        }
        Ok(first)
    }
}

impl PromptConfirm for ScriptedPrompt {
    fn confirm(&self, prompt: &ConfirmPrompt) -> Result<bool, PromptError> {
        let raw = self.next(&prompt.label)?;
        if raw.trim().is_empty() {
            return Ok(prompt.default);
        }
        parse_bool(&raw).map_err(|e| PromptError::Invalid { reason: e.to_string() })
    }
}

impl PromptSelect for ScriptedPrompt {
    fn select(&self, prompt: &SelectPrompt) -> Result<usize, PromptError> {
        if prompt.items.is_empty() {
            return Err(PromptError::NoItems);
        }
        let raw = self.next(&prompt.label)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(prompt.default.min(prompt.items.len() - 1));
        }
        if let Some(index) = prompt.items.iter().position(|item| item == raw) {
            return Ok(index);
        }
        match raw.parse::<usize>() {
            Ok(index) if index < prompt.items.len() => Ok(index),
            _ => Err(PromptError::Invalid {
                reason: format!("{raw:?} is not one of {} items", prompt.items.len()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_uses_default_and_validator() {
        let prompt = ScriptedPrompt::new(["", "abc", "42"]);
        let port = TextPrompt::new("port")
            .default("8080")
            .validate(|s| s.parse::<u16>().map(|_| ()).map_err(|e| e.to_string()));

        assert_eq!(prompt.text(&port).unwrap(), "8080");
        assert!(matches!(prompt.text(&port), Err(PromptError::Invalid { .. })));
        assert_eq!(prompt.text(&port).unwrap(), "42");
        assert!(matches!(prompt.text(&port), Err(PromptError::NoAnswer { label }) if label == "port"));
        assert_eq!(prompt.asked().len(), 4);
    }

    #[test]
    fn test_confirm_parses_lenient_bools() {
        let prompt = ScriptedPrompt::new(["y", "off", "", "perhaps"]);
        let ask = ConfirmPrompt::new("continue?").default(true);
        assert!(prompt.confirm(&ask).unwrap());
        assert!(!prompt.confirm(&ask).unwrap());
        assert!(prompt.confirm(&ask).unwrap());
        assert!(matches!(prompt.confirm(&ask), Err(PromptError::Invalid { .. })));
    }

    #[test]
    fn test_select_by_index_or_text() {
        let prompt = ScriptedPrompt::new(["1", "blue", "", "7"]);
        let ask = SelectPrompt::new("color", ["red", "blue", "green"]).default(2);
        assert_eq!(prompt.select(&ask).unwrap(), 1);
        assert_eq!(prompt.select(&ask).unwrap(), 1);
        assert_eq!(prompt.select(&ask).unwrap(), 2);
        assert!(matches!(prompt.select(&ask), Err(PromptError::Invalid { .. })));
    }

    #[test]
    fn test_select_without_items() {
        let prompt = ScriptedPrompt::new(["0"]);
        let ask = SelectPrompt::new("none", Vec::<String>::new());
        assert!(matches!(prompt.select(&ask), Err(PromptError::NoItems)));
        assert_eq!(prompt.remaining(), 1);
    }

    #[test]
    fn test_secret_confirmation_must_match() {
        let prompt = ScriptedPrompt::new(["hunter2", "hunter2", "a", "b"]);
        let ask = SecretPrompt::new("password").with_confirmation();
        assert_eq!(prompt.secret(&ask).unwrap(), "hunter2");
        assert!(matches!(prompt.secret(&ask), Err(PromptError::Invalid { .. })));
    }

    #[test]
    fn test_works_through_references() {
        fn ask<P: PromptConfirm>(p: P) -> bool {
            p.confirm(&ConfirmPrompt::new("ok?")).unwrap()
        }
        let prompt = ScriptedPrompt::new(["yes"]);
        assert!(ask(&prompt));
    }
}
