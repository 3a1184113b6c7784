//! Coach: conversation state and suggestion/evaluation policy.
//!
//! Owns the dialogue history, the topic vector of the latest remote
//! utterance and the last suggestion issued. All mutation happens on the
//! orchestrator thread; capture threads never touch this state.

use crate::defaults;
use crate::engine::embedder::{Embedder, dot};
use crate::engine::generator::{Suggestion, SuggestionEngine};
use crate::engine::translator::Translator;
use crate::retrieval::DocumentStore;
use std::sync::Arc;

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    /// The coached user (microphone).
    Local,
    /// The other party (loopback).
    Remote,
}

impl Speaker {
    fn label(&self) -> &'static str {
        match self {
            Speaker::Local => "ME",
            Speaker::Remote => "THEM",
        }
    }
}

/// One finalized utterance in the dialogue history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Outcome status of evaluating a local utterance.
///
/// Only one is reported; `TopicShift` outranks `MissingSlots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalStatus {
    #[default]
    Ok,
    TopicShift,
    MissingSlots,
}

/// Result of evaluating a local utterance against the last suggestion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationResult {
    pub status: EvalStatus,
    pub notes: Vec<String>,
    /// Bridge suggestion, present after a topic shift.
    pub suggestion: Suggestion,
}

/// Coach configuration.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Standing context about the coached user.
    pub profile: String,
    /// What the user wants out of the conversation.
    pub goal: String,
    pub enable_translation: bool,
    pub enable_document: bool,
    /// Prefix retrieved snippets with their page number.
    pub cite_document: bool,
    pub translate_from: String,
    pub translate_to: String,
    /// How many recent turns go into prompts.
    pub history_window: usize,
    /// Cosine similarity below this counts as a topic shift.
    pub topic_shift_threshold: f32,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            goal: String::new(),
            enable_translation: false,
            enable_document: false,
            cite_document: true,
            translate_from: defaults::TRANSLATE_FROM.to_string(),
            translate_to: defaults::TRANSLATE_TO.to_string(),
            history_window: defaults::HISTORY_WINDOW,
            topic_shift_threshold: defaults::TOPIC_SHIFT_THRESHOLD,
        }
    }
}

/// Conversation coach.
pub struct Coach {
    config: CoachConfig,
    suggester: Arc<dyn SuggestionEngine>,
    embedder: Arc<dyn Embedder>,
    translator: Arc<dyn Translator>,
    docstore: DocumentStore,

    history: Vec<ConversationTurn>,
    /// Embedding of the most recent finalized remote utterance.
    topic_vec: Option<Vec<f32>>,
    last_suggestion: Suggestion,
    last_remote_text: String,

    // Capabilities, resolved once at construction.
    can_embed: bool,
    can_generate: bool,
    can_translate: bool,
}

impl Coach {
    pub fn new(
        config: CoachConfig,
        suggester: Arc<dyn SuggestionEngine>,
        embedder: Arc<dyn Embedder>,
        translator: Arc<dyn Translator>,
        docstore: DocumentStore,
    ) -> Self {
        let can_embed = embedder.is_available();
        let can_generate = suggester.is_available();
        let can_translate = translator.is_available();
        Self {
            config,
            suggester,
            embedder,
            translator,
            docstore,
            history: Vec::new(),
            topic_vec: None,
            last_suggestion: Suggestion::default(),
            last_remote_text: String::new(),
            can_embed,
            can_generate,
            can_translate,
        }
    }

    /// Full dialogue history, oldest first.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// The most recent suggestion directed at the remote party.
    pub fn last_suggestion(&self) -> &Suggestion {
        &self.last_suggestion
    }

    fn system_prompt(&self) -> String {
        "You are a real-time conversation copilot. Output STRICT JSON only.\n\
         Max 2 sentences in say_now.\n\
         Return JSON keys: say_now, intent, must_include (array), bridge_now (optional).\n"
            .to_string()
    }

    fn build_user_prompt(&self, remote_latest: &str, doc_context: &str) -> String {
        let window_start = self.history.len().saturating_sub(self.config.history_window);
        let recent: Vec<String> = self.history[window_start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.speaker.label(), turn.text))
            .collect();

        let doc_part = if doc_context.is_empty() {
            String::new()
        } else {
            format!("\nDOCUMENT_CONTEXT:\n{doc_context}\n")
        };

        format!(
            "PROFILE:\n{}\n\nGOAL:\n{}\n\nRECENT:\n{}\n\nTHEIR_LATEST:\n{}\n{}\nWrite only JSON.",
            self.config.profile,
            self.config.goal,
            recent.join("\n"),
            remote_latest,
            doc_part,
        )
    }

    /// Translate the remote party's text for display, when enabled and the
    /// translator is usable. Empty string otherwise.
    pub fn maybe_translate(&self, text: &str) -> String {
        if !self.config.enable_translation || !self.can_translate {
            return String::new();
        }
        self.translator
            .translate(text, &self.config.translate_from, &self.config.translate_to)
    }

    /// Retrieve prompt context from the document index. Empty string when
    /// disabled, empty index or no hits.
    fn retrieve_context(&self, query: &str) -> String {
        if !self.config.enable_document || self.docstore.is_empty() {
            return String::new();
        }

        let hits = self.docstore.retrieve(query, defaults::RETRIEVE_K);
        let parts: Vec<String> = hits
            .iter()
            .map(|hit| {
                let snippet: String = hit.text.chars().take(defaults::SNIPPET_CHARS).collect();
                if self.config.cite_document {
                    format!("(p.{}) {}", hit.page, snippet)
                } else {
                    snippet
                }
            })
            .collect();
        parts.join("\n")
    }

    fn update_topic(&mut self, text: &str) {
        // Overwritten only when an embedding is actually produced.
        if let Some(vector) = self.embedder.embed(text) {
            self.topic_vec = Some(vector);
        }
    }

    fn is_topic_shift(&self, text: &str) -> bool {
        if !self.can_embed {
            return false;
        }
        let Some(topic) = &self.topic_vec else {
            return false;
        };
        let Some(vector) = self.embedder.embed(text) else {
            return false;
        };
        dot(&vector, topic) < self.config.topic_shift_threshold
    }

    /// Draft a suggestion from an in-progress remote utterance.
    ///
    /// Does not mutate history or the stored suggestion. Returns an empty
    /// suggestion for blank input or when no engine is usable.
    pub fn draft(&self, partial_text: &str) -> Suggestion {
        if partial_text.trim().is_empty() || !self.can_generate {
            return Suggestion::default();
        }

        let doc_context = self.retrieve_context(partial_text);
        self.suggester.generate(
            &self.system_prompt(),
            &self.build_user_prompt(partial_text, &doc_context),
            defaults::DRAFT_MAX_TOKENS,
        )
    }

    /// Handle a finalized remote utterance: record it, refresh the topic
    /// vector, and produce the suggestion it calls for.
    pub fn finalize_remote(&mut self, final_text: &str) -> Suggestion {
        if final_text.trim().is_empty() {
            return Suggestion::default();
        }

        self.last_remote_text = final_text.to_string();
        self.history.push(ConversationTurn {
            speaker: Speaker::Remote,
            text: final_text.to_string(),
        });
        self.update_topic(final_text);

        if !self.can_generate {
            self.last_suggestion = Suggestion::default();
            return Suggestion::default();
        }

        let doc_context = self.retrieve_context(final_text);
        let suggestion = self.suggester.generate(
            &self.system_prompt(),
            &self.build_user_prompt(final_text, &doc_context),
            defaults::SUGGEST_MAX_TOKENS,
        );
        self.last_suggestion = suggestion.clone();
        suggestion
    }

    /// Evaluate a finalized local utterance against the last suggestion.
    pub fn evaluate_local(&mut self, final_text: &str) -> EvaluationResult {
        if final_text.trim().is_empty() {
            return EvaluationResult::default();
        }

        self.history.push(ConversationTurn {
            speaker: Speaker::Local,
            text: final_text.to_string(),
        });

        let shifted = self.is_topic_shift(final_text);

        let lower = final_text.to_lowercase();
        let missing: Vec<String> = self
            .last_suggestion
            .must_include
            .iter()
            .filter(|slot| !slot.is_empty() && !lower.contains(&slot.to_lowercase()))
            .cloned()
            .collect();

        let mut notes = Vec::new();
        if shifted {
            notes.push("Topic shift detected.".to_string());
        }
        if !missing.is_empty() {
            notes.push(format!("Missing: {}", missing.join(", ")));
        }

        let status = if shifted {
            EvalStatus::TopicShift
        } else if !missing.is_empty() {
            EvalStatus::MissingSlots
        } else {
            EvalStatus::Ok
        };

        let suggestion = if shifted && self.can_generate {
            let bridge_prompt = format!(
                "Generate a brief bridge phrase to transition from '{}' to a new topic. \
                 Return JSON with bridge_now and say_now keys.",
                self.last_remote_text
            );
            self.suggester
                .generate(&self.system_prompt(), &bridge_prompt, defaults::BRIDGE_MAX_TOKENS)
        } else {
            Suggestion::default()
        };

        EvaluationResult {
            status,
            notes,
            suggestion,
        }
    }
}
