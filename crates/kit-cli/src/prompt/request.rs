use std::fmt;
use std::sync::Arc;

pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub struct TextPrompt {
    pub label: String,
    pub default: Option<String>,
    pub validator: Option<Validator>,
    pub allow_empty: bool,
}

impl TextPrompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            default: None,
            validator: None,
            allow_empty: false,
        }
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate(mut self, f: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Resolve a raw answer against the default, emptiness rule and
    /// validator.
    pub(crate) fn check(&self, raw: &str) -> Result<String, String> {
        let answer = match (raw.is_empty(), &self.default) {
            (true, Some(default)) => default.clone(),
            _ => raw.to_string(),
        };
        if answer.is_empty() && !self.allow_empty {
            return Err("a value is required".to_string());
        }
        if let Some(validator) = &self.validator {
            validator(&answer)?;
        }
        Ok(answer)
    }
}

impl fmt::Debug for TextPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPrompt")
            .field("label", &self.label)
            .field("default", &self.default)
            .field("validator", &self.validator.is_some())
            .field("allow_empty", &self.allow_empty)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SecretPrompt {
    pub label: String,
    /// Ask twice and require both entries to match.
    pub confirmation: bool,
}

impl SecretPrompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confirmation: false,
        }
    }

    pub fn with_confirmation(mut self) -> Self {
        self.confirmation = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmPrompt {
    pub label: String,
    pub default: bool,
}

impl ConfirmPrompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            default: false,
        }
    }

    pub fn default(mut self, value: bool) -> Self {
        self.default = value;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SelectPrompt {
    pub label: String,
    pub items: Vec<String>,
    pub default: usize,
}

impl SelectPrompt {
    pub fn new<I, S>(label: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            items: items.into_iter().map(Into::into).collect(),
            default: 0,
        }
    }

    pub fn default(mut self, index: usize) -> Self {
        self.default = index;
        self
    }
}
