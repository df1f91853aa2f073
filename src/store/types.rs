use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-llama-70b";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 800;

pub const MIN_MAX_TOKENS: u32 = 100;
pub const MAX_MAX_TOKENS: u32 = 2000;
pub const MAX_TOKENS_STEP: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation turn. The timestamp is stamped by the store on append.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

/// Generation parameters sent with every chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
        }
    }
}

impl Settings {
    /// Merges `patch` field by field. Returns whether anything changed.
    pub fn merge(&mut self, patch: &SettingsPatch) -> bool {
        let before = self.clone();

        if let Some(model) = &patch.model {
            let model = model.trim();
            if !model.is_empty() {
                self.model = model.to_string();
            }
        }
        if let Some(temperature) = patch.temperature {
            // Non-finite values have no place in the domain; ignore them.
            if temperature.is_finite() {
                self.temperature = temperature.clamp(0.0, 1.0);
            }
        }
        if let Some(max_tokens) = patch.max_tokens {
            self.max_tokens = snap_max_tokens(max_tokens);
        }
        if let Some(stream) = patch.stream {
            self.stream = stream;
        }

        *self != before
    }

    /// Falls back to the first catalog entry when the current model is not
    /// offered. An empty catalog leaves the model untouched.
    pub fn reconcile_model(&mut self, catalog: &[String]) -> bool {
        match catalog.first() {
            Some(first) if !catalog.iter().any(|m| *m == self.model) => {
                self.model = first.clone();
                true
            }
            _ => false,
        }
    }
}

fn snap_max_tokens(value: u32) -> u32 {
    let rounded = value.saturating_add(MAX_TOKENS_STEP / 2) / MAX_TOKENS_STEP * MAX_TOKENS_STEP;
    rounded.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS)
}

/// A partial [`Settings`] update; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
}

impl SettingsPatch {
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    pub fn temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            ..Self::default()
        }
    }

    pub fn max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..Self::default()
        }
    }

    pub fn stream(stream: bool) -> Self {
        Self {
            stream: Some(stream),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.temperature.is_none()
            && self.max_tokens.is_none()
            && self.stream.is_none()
    }
}

/// Point-in-time copy of everything the store holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub settings: Settings,
}
