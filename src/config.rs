//! TOML configuration with environment overrides.

use crate::audio::segmenter::SegmenterConfig;
use crate::coach::CoachConfig;
use crate::defaults;
use crate::pipeline::orchestrator::OrchestratorConfig;
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioSettings,
    pub segmenter: SegmenterSettings,
    pub orchestrator: OrchestratorSettings,
    pub coach: CoachSettings,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    /// Microphone device name for the coached user; None for the default.
    pub local_device: Option<String>,
    /// Loopback/monitor device name for the remote party.
    pub remote_device: Option<String>,
    pub sample_rate: u32,
    pub block_ms: u64,
}

/// Segmentation thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterSettings {
    pub frame_ms: u32,
    pub speech_threshold: f32,
    pub silence_end_ms: u32,
    pub partial_every_ms: u32,
    pub max_segment_ms: u32,
}

/// Orchestration loop tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrchestratorSettings {
    pub tick_ms: u64,
    pub batch_max: usize,
    pub partial_throttle_ms: u64,
}

/// Coaching behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoachSettings {
    pub profile: String,
    pub goal: String,
    pub enable_translation: bool,
    pub enable_document: bool,
    pub cite_document: bool,
    /// Reference document path; empty means none.
    pub document_path: String,
    pub translate_from: String,
    pub translate_to: String,
    pub history_window: usize,
    pub topic_shift_threshold: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            local_device: None,
            remote_device: None,
            sample_rate: defaults::SAMPLE_RATE,
            block_ms: defaults::BLOCK_MS,
        }
    }
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            frame_ms: defaults::FRAME_MS,
            speech_threshold: defaults::SPEECH_THRESHOLD,
            silence_end_ms: defaults::SILENCE_END_MS,
            partial_every_ms: defaults::PARTIAL_EVERY_MS,
            max_segment_ms: defaults::MAX_SEGMENT_MS,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            tick_ms: defaults::TICK_MS,
            batch_max: defaults::TICK_BATCH,
            partial_throttle_ms: defaults::PARTIAL_THROTTLE_MS,
        }
    }
}

impl Default for CoachSettings {
    fn default() -> Self {
        Self {
            profile: String::new(),
            goal: String::new(),
            enable_translation: false,
            enable_document: false,
            cite_document: true,
            document_path: String::new(),
            translate_from: defaults::TRANSLATE_FROM.to_string(),
            translate_to: defaults::TRANSLATE_TO.to_string(),
            history_window: defaults::HISTORY_WINDOW,
            topic_shift_threshold: defaults::TOPIC_SHIFT_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if it is missing.
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported:
    /// - WINGMAN_LOCAL_DEVICE → audio.local_device
    /// - WINGMAN_REMOTE_DEVICE → audio.remote_device
    /// - WINGMAN_DOCUMENT → coach.document_path
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("WINGMAN_LOCAL_DEVICE")
            && !device.is_empty()
        {
            self.audio.local_device = Some(device);
        }

        if let Ok(device) = std::env::var("WINGMAN_REMOTE_DEVICE")
            && !device.is_empty()
        {
            self.audio.remote_device = Some(device);
        }

        if let Ok(document) = std::env::var("WINGMAN_DOCUMENT")
            && !document.is_empty()
        {
            self.coach.document_path = document;
        }

        self
    }

    /// Default configuration file path (~/.config/wingman/config.toml).
    #[cfg(feature = "cli")]
    pub fn default_path() -> anyhow::Result<std::path::PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Ok(dir.join("wingman").join("config.toml"))
    }

    /// Session-level view of this configuration.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.audio.sample_rate,
            block_ms: self.audio.block_ms,
            speech_threshold: self.segmenter.speech_threshold,
            segmenter: self.segmenter_config(),
            orchestrator: OrchestratorConfig {
                tick_ms: self.orchestrator.tick_ms,
                batch_max: self.orchestrator.batch_max,
                partial_throttle_ms: self.orchestrator.partial_throttle_ms,
            },
        }
    }

    /// Segmenter view of this configuration.
    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            frame_ms: self.segmenter.frame_ms,
            silence_end_ms: self.segmenter.silence_end_ms,
            partial_every_ms: self.segmenter.partial_every_ms,
            max_segment_ms: self.segmenter.max_segment_ms,
        }
    }

    /// Coach view of this configuration.
    pub fn coach_config(&self) -> CoachConfig {
        CoachConfig {
            profile: self.coach.profile.clone(),
            goal: self.coach.goal.clone(),
            enable_translation: self.coach.enable_translation,
            enable_document: self.coach.enable_document,
            cite_document: self.coach.cite_document,
            translate_from: self.coach.translate_from.clone(),
            translate_to: self.coach.translate_to.clone(),
            history_window: self.coach.history_window,
            topic_shift_threshold: self.coach.topic_shift_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_matches_constants() {
        let config = Config::default();
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.block_ms, 100);
        assert_eq!(config.segmenter.frame_ms, 20);
        assert_eq!(config.segmenter.silence_end_ms, 400);
        assert_eq!(config.segmenter.partial_every_ms, 800);
        assert_eq!(config.segmenter.max_segment_ms, 7000);
        assert_eq!(config.orchestrator.tick_ms, 30);
        assert_eq!(config.orchestrator.batch_max, 40);
        assert_eq!(config.orchestrator.partial_throttle_ms, 700);
        assert_eq!(config.coach.topic_shift_threshold, 0.45);
        assert_eq!(config.coach.history_window, 6);
        assert!(!config.coach.enable_translation);
    }

    #[test]
    fn test_load_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[audio]
remote_device = "Monitor of Built-in Audio"

[coach]
profile = "I sell widgets."
enable_document = true
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(
            config.audio.remote_device.as_deref(),
            Some("Monitor of Built-in Audio")
        );
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.coach.profile, "I sell widgets.");
        assert!(config.coach.enable_document);
        assert_eq!(config.segmenter.silence_end_ms, 400);
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "this is not toml = = =").unwrap();
        assert!(Config::load(file.path()).is_err());
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/wingman.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_roundtrip_serialization() {
        let mut config = Config::default();
        config.coach.goal = "close the deal".to_string();
        config.segmenter.max_segment_ms = 5000;

        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: test-local variables, not read anywhere else
        unsafe {
            std::env::set_var("WINGMAN_LOCAL_DEVICE", "TestMic");
            std::env::set_var("WINGMAN_DOCUMENT", "/tmp/brief.txt");
        }

        let config = Config::default().with_env_overrides();
        assert_eq!(config.audio.local_device.as_deref(), Some("TestMic"));
        assert_eq!(config.coach.document_path, "/tmp/brief.txt");

        unsafe {
            std::env::remove_var("WINGMAN_LOCAL_DEVICE");
            std::env::remove_var("WINGMAN_DOCUMENT");
        }
    }

    #[test]
    fn test_session_view_maps_fields() {
        let mut config = Config::default();
        config.audio.sample_rate = 48000;
        config.segmenter.speech_threshold = 0.05;
        config.orchestrator.tick_ms = 10;

        let session = config.session();
        assert_eq!(session.sample_rate, 48000);
        assert_eq!(session.speech_threshold, 0.05);
        assert_eq!(session.orchestrator.tick_ms, 10);
        assert_eq!(session.segmenter.silence_end_ms, 400);
    }

    #[test]
    fn test_coach_view_maps_fields() {
        let mut config = Config::default();
        config.coach.profile = "profile text".to_string();
        config.coach.enable_translation = true;

        let coach = config.coach_config();
        assert_eq!(coach.profile, "profile text");
        assert!(coach.enable_translation);
        assert_eq!(coach.translate_to, "es");
    }
}
