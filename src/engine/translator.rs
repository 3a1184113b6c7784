//! Translation collaborator contract.

/// Trait for text translation.
///
/// Tolerant contract: an unavailable or failing translator returns an
/// empty string, which downstream treats as "no translation".
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, from: &str, to: &str) -> String;

    /// Whether translation is usable. Resolved once at startup.
    fn is_available(&self) -> bool;
}

/// Translator used when no translation backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

impl Translator for NoopTranslator {
    fn translate(&self, _text: &str, _from: &str, _to: &str) -> String {
        String::new()
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Mock translator for testing: tags the input with the language pair.
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    fixed: Option<String>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this response for every call instead of the tagged echo.
    pub fn with_response(mut self, response: &str) -> Self {
        self.fixed = Some(response.to_string());
        self
    }
}

impl Translator for MockTranslator {
    fn translate(&self, text: &str, from: &str, to: &str) -> String {
        match &self.fixed {
            Some(fixed) => fixed.clone(),
            None => format!("[{from}>{to}] {text}"),
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}
