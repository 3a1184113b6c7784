//! Conversational suggestion engine contract and its structured output.
//!
//! Language models return free text; [`suggestion_from_json`] extracts the
//! structured suggestion leniently — any missing or malformed field simply
//! becomes "no suggestion" for that field.

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A structured coaching suggestion.
///
/// All fields optional in spirit: an entirely empty suggestion means the
/// engine had nothing usable to say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestion {
    /// What the local speaker could say next.
    pub say_now: String,
    /// The conversational intent behind `say_now`.
    pub intent: String,
    /// Terms the local speaker's reply should contain.
    pub must_include: Vec<String>,
    /// Transition phrase for steering to a new topic.
    pub bridge_now: Option<String>,
}

impl Suggestion {
    pub fn is_empty(&self) -> bool {
        self.say_now.is_empty()
            && self.intent.is_empty()
            && self.must_include.is_empty()
            && self.bridge_now.is_none()
    }
}

/// Extract the first `{...}` span from model output and parse it.
fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Build a [`Suggestion`] from raw model output.
///
/// Tolerates junk around the JSON object, missing keys, wrong value types
/// and non-string array entries. Unusable output yields an empty
/// suggestion.
pub fn suggestion_from_json(text: &str) -> Suggestion {
    let Some(value) = extract_json_object(text) else {
        return Suggestion::default();
    };

    let string_field = |key: &str| -> String {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("")
            .to_string()
    };

    let must_include = value
        .get("must_include")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let bridge_now = value
        .get("bridge_now")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Suggestion {
        say_now: string_field("say_now"),
        intent: string_field("intent"),
        must_include,
        bridge_now,
    }
}

/// Trait for the conversational suggestion engine.
///
/// Tolerant contract: failures surface as an empty [`Suggestion`], never
/// as an error.
pub trait SuggestionEngine: Send + Sync {
    /// Generate a suggestion from a system and user prompt.
    fn generate(&self, system: &str, user: &str, max_tokens: u32) -> Suggestion;

    /// Whether a model is loaded. Resolved once at startup.
    fn is_available(&self) -> bool;
}

/// Engine used when no language model is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSuggestionEngine;

impl SuggestionEngine for NoopSuggestionEngine {
    fn generate(&self, _system: &str, _user: &str, _max_tokens: u32) -> Suggestion {
        Suggestion::default()
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Recorded prompt pair from a mock generate call.
#[derive(Debug, Clone)]
pub struct RecordedPrompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

/// Mock suggestion engine for testing.
#[derive(Debug, Default)]
pub struct MockSuggestionEngine {
    queued: Mutex<VecDeque<Suggestion>>,
    fixed: Suggestion,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl MockSuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this suggestion for every call (after any queued ones).
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.fixed = suggestion;
        self
    }

    /// Serve these suggestions first, in order.
    pub fn with_suggestions(self, suggestions: Vec<Suggestion>) -> Self {
        self.queued.lock().unwrap().extend(suggestions);
        self
    }

    /// Prompts seen so far.
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl SuggestionEngine for MockSuggestionEngine {
    fn generate(&self, system: &str, user: &str, max_tokens: u32) -> Suggestion {
        self.prompts.lock().unwrap().push(RecordedPrompt {
            system: system.to_string(),
            user: user.to_string(),
            max_tokens,
        });
        let mut queued = self.queued.lock().unwrap();
        queued.pop_front().unwrap_or_else(|| self.fixed.clone())
    }

    fn is_available(&self) -> bool {
        true
    }
}
