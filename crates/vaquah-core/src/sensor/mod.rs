//! Sensor adapters: pluggable traits + factories for the camera and speech engines.
//!
//! The adapters only own lifecycle (`start`/`stop`). Frames and transcripts are
//! pushed into the [`Pipeline`](crate::pipeline::Pipeline) by whatever drives
//! the real engine, so the classifier and parser stay testable without one.

pub mod replay;

use serde::{Deserialize, Serialize};

use crate::config::{CameraConfig, VoiceConfig};

/// Hand-landmark producer (camera + detection model).
pub trait LandmarkStream: Send {
    /// Acquire the camera and begin producing frames. An error here means
    /// the camera is unavailable or permission was refused.
    fn start(&mut self) -> anyhow::Result<()>;
    fn stop(&mut self) -> anyhow::Result<()>;
    fn name(&self) -> &str;
}

/// Speech-recognition producer.
pub trait TranscriptStream: Send {
    fn start(&mut self) -> anyhow::Result<()>;
    fn stop(&mut self) -> anyhow::Result<()>;
    fn name(&self) -> &str;
}

/// Which of the two recognizers an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamRole {
    /// Single-shot command recognition while the assistant is open.
    Command,
    /// Continuous wake-word recognition while the assistant is closed.
    Wake,
}

impl std::fmt::Display for StreamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamRole::Command => write!(f, "command"),
            StreamRole::Wake => write!(f, "wake"),
        }
    }
}

/// A recognition result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default = "default_true")]
    pub is_final: bool,
    /// Milliseconds on the pipeline clock.
    #[serde(default)]
    pub timestamp_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Transcript {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            timestamp_ms: 0,
        }
    }
}

/// Recognizer error codes, named after the browser speech API codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    NotAllowed,
    ServiceNotAllowed,
    AudioCapture,
    NoSpeech,
    Aborted,
    Network,
    Other(String),
}

impl RecognitionError {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "audio-capture" => Self::AudioCapture,
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "network" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }

    /// Errors that mean the microphone cannot be used this session.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::NotAllowed | Self::ServiceNotAllowed | Self::AudioCapture)
    }
}

impl std::fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAllowed => write!(f, "not-allowed"),
            Self::ServiceNotAllowed => write!(f, "service-not-allowed"),
            Self::AudioCapture => write!(f, "audio-capture"),
            Self::NoSpeech => write!(f, "no-speech"),
            Self::Aborted => write!(f, "aborted"),
            Self::Network => write!(f, "network"),
            Self::Other(code) => write!(f, "{code}"),
        }
    }
}

// ── Pending placeholders ────────────────────────────────────────────────

/// Placeholder returned when a camera backend can't be initialised.
///
/// `start()` always fails, which the gesture controller reports as a camera
/// denial so the feature disables itself instead of retrying.
pub struct PendingLandmarkStream {
    backend: String,
    reason: String,
}

impl PendingLandmarkStream {
    pub fn new(backend: String, reason: String) -> Self {
        Self { backend, reason }
    }
}

impl LandmarkStream for PendingLandmarkStream {
    fn start(&mut self) -> anyhow::Result<()> {
        anyhow::bail!("{}: {}", self.backend, self.reason)
    }
    fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    fn name(&self) -> &str {
        "pending"
    }
}

/// Placeholder returned when a speech backend can't be initialised.
pub struct PendingTranscriptStream {
    backend: String,
    reason: String,
}

impl PendingTranscriptStream {
    pub fn new(backend: String, reason: String) -> Self {
        Self { backend, reason }
    }
}

impl TranscriptStream for PendingTranscriptStream {
    fn start(&mut self) -> anyhow::Result<()> {
        anyhow::bail!("{}: {}", self.backend, self.reason)
    }
    fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    fn name(&self) -> &str {
        "pending"
    }
}

// ── Factories ───────────────────────────────────────────────────────────

/// External factory for camera backends this crate doesn't know about.
/// Returns `None` to fall through to the "unknown backend" placeholder.
pub type LandmarkFactory =
    dyn Fn(&CameraConfig) -> Option<anyhow::Result<Box<dyn LandmarkStream>>> + Send + Sync;

/// External factory for speech backends, called with the backend name and role.
pub type TranscriptFactory =
    dyn Fn(&str, StreamRole) -> Option<anyhow::Result<Box<dyn TranscriptStream>>> + Send + Sync;

/// Create the camera adapter. Never fails: unknown or broken backends yield
/// a [`PendingLandmarkStream`].
pub fn create_landmark_stream(
    cfg: &CameraConfig,
    extra_factory: Option<&LandmarkFactory>,
) -> Box<dyn LandmarkStream> {
    let result: anyhow::Result<Box<dyn LandmarkStream>> = match cfg.backend.as_str() {
        "replay" => Ok(Box::new(replay::ReplayLandmarkStream::new())),
        other => extra_factory
            .and_then(|factory| factory(cfg))
            .unwrap_or_else(|| Err(anyhow::anyhow!("Unknown camera backend: {other}"))),
    };

    result.unwrap_or_else(|e| {
        let reason = format!("{e:#}");
        log::warn!("Camera backend '{}' unavailable: {reason}; using pending placeholder", cfg.backend);
        Box::new(PendingLandmarkStream::new(cfg.backend.clone(), reason))
    })
}

/// Create a speech adapter for `role`. Never fails; see [`create_landmark_stream`].
pub fn create_transcript_stream(
    cfg: &VoiceConfig,
    role: StreamRole,
    extra_factory: Option<&TranscriptFactory>,
) -> Box<dyn TranscriptStream> {
    let backend = match role {
        StreamRole::Command => cfg.command_backend.as_str(),
        StreamRole::Wake => cfg.wake_backend.as_str(),
    };
    let result: anyhow::Result<Box<dyn TranscriptStream>> = match backend {
        "replay" => Ok(Box::new(replay::ReplayTranscriptStream::new(role))),
        other => extra_factory
            .and_then(|factory| factory(other, role))
            .unwrap_or_else(|| Err(anyhow::anyhow!("Unknown speech backend: {other}"))),
    };

    result.unwrap_or_else(|e| {
        let reason = format!("{e:#}");
        log::warn!("Speech backend '{backend}' ({role}) unavailable: {reason}; using pending placeholder");
        Box::new(PendingTranscriptStream::new(backend.to_string(), reason))
    })
}
