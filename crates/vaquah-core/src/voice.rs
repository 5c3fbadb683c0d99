//! Voice input: the command and wake-word recognizers, the intent parser and
//! the wake detector, coordinated through the [`AssistantStateMachine`].
//!
//! The command recognizer is single-shot: it runs while the assistant is
//! listening and ends itself after one result. The wake recognizer is
//! continuous and only runs while the assistant is closed.

use crate::action::CanonicalAction;
use crate::assistant::AssistantStateMachine;
use crate::config::VoiceConfig;
use crate::permissions::{PermissionKind, PermissionStatus};
use crate::router::{self, IntentParser};
use crate::sensor::{self, RecognitionError, StreamRole, Transcript, TranscriptFactory, TranscriptStream};
use crate::wake::{PhraseWakeDetector, WakeDetector};

/// Spoken feedback. Only a silent placeholder ships.
pub trait Speaker: Send {
    fn speak(&mut self, text: &str) -> anyhow::Result<()>;
}

/// Logs what would have been said.
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn speak(&mut self, text: &str) -> anyhow::Result<()> {
        log::debug!("(tts) {text}");
        Ok(())
    }
}

pub struct VoiceController {
    command: Box<dyn TranscriptStream>,
    wake: Box<dyn TranscriptStream>,
    parser: Box<dyn IntentParser>,
    wake_detector: Box<dyn WakeDetector>,
    speaker: Box<dyn Speaker>,
    command_running: bool,
    wake_running: bool,
}

impl VoiceController {
    pub fn new(
        command: Box<dyn TranscriptStream>,
        wake: Box<dyn TranscriptStream>,
        parser: Box<dyn IntentParser>,
        wake_detector: Box<dyn WakeDetector>,
    ) -> Self {
        Self {
            command,
            wake,
            parser,
            wake_detector,
            speaker: Box::new(NullSpeaker),
            command_running: false,
            wake_running: false,
        }
    }

    /// Build recognizers, parser and wake detector from config.
    pub fn from_config(
        cfg: &VoiceConfig,
        stream_factory: Option<&TranscriptFactory>,
    ) -> anyhow::Result<Self> {
        let parser = router::create_parser(&cfg.parser_backend)?;
        let command = sensor::create_transcript_stream(cfg, StreamRole::Command, stream_factory);
        let wake = sensor::create_transcript_stream(cfg, StreamRole::Wake, stream_factory);
        log::info!(
            "Voice: command={}, wake={}, parser={}",
            command.name(),
            wake.name(),
            parser.name(),
        );
        Ok(Self::new(
            command,
            wake,
            parser,
            Box::new(PhraseWakeDetector::new(&cfg.wake_words)),
        ))
    }

    pub fn with_speaker(mut self, speaker: Box<dyn Speaker>) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn is_command_running(&self) -> bool {
        self.command_running
    }

    pub fn is_wake_running(&self) -> bool {
        self.wake_running
    }

    /// Start the wake recognizer if the assistant wants it and it isn't
    /// already running.
    pub fn arm_wake_word(&mut self, assistant: &mut AssistantStateMachine) {
        if self.wake_running || !assistant.is_wake_word_listening() || assistant.is_open() {
            return;
        }
        match self.wake.start() {
            Ok(()) => {
                self.wake_running = true;
                log::debug!("Wake recognizer started ({})", self.wake.name());
            }
            Err(e) => {
                log::warn!("Wake recognizer failed to start: {e:#}");
                assistant.update_permission(PermissionKind::Microphone, PermissionStatus::Denied);
            }
        }
    }

    fn stop_wake(&mut self) {
        if !self.wake_running {
            return;
        }
        self.wake_running = false;
        if let Err(e) = self.wake.stop() {
            log::warn!("Wake recognizer stop failed: {e:#}");
        }
    }

    fn start_command(&mut self, assistant: &mut AssistantStateMachine) {
        if self.command_running {
            return;
        }
        match self.command.start() {
            Ok(()) => {
                self.command_running = true;
                assistant.update_permission(PermissionKind::Microphone, PermissionStatus::Granted);
            }
            Err(e) => {
                log::warn!("Command recognizer failed to start: {e:#}");
                assistant.update_permission(PermissionKind::Microphone, PermissionStatus::Denied);
            }
        }
    }

    fn stop_command(&mut self) {
        if !self.command_running {
            return;
        }
        self.command_running = false;
        if let Err(e) = self.command.stop() {
            log::warn!("Command recognizer stop failed: {e:#}");
        }
    }

    /// Open the assistant: the wake recognizer is stopped before the command
    /// recognizer starts.
    pub fn open(&mut self, assistant: &mut AssistantStateMachine) {
        self.stop_wake();
        if assistant.open() {
            self.start_command(assistant);
        }
    }

    pub fn close(&mut self, assistant: &mut AssistantStateMachine) {
        self.stop_command();
        assistant.close();
        self.arm_wake_word(assistant);
    }

    /// Stop the command recognizer without closing the assistant, e.g. after
    /// a denial forced the state machine out of `listening`.
    pub fn stop_listening(&mut self) {
        self.stop_command();
    }

    /// Stop both recognizers, e.g. after the microphone was revoked.
    pub fn release(&mut self) {
        self.stop_command();
        self.stop_wake();
    }

    /// Re-arm command recognition after a result or a transient error.
    pub fn start_listening(&mut self, assistant: &mut AssistantStateMachine) -> bool {
        if !assistant.start_listening() {
            return false;
        }
        self.start_command(assistant);
        assistant.is_listening()
    }

    /// Check a continuous-recognizer transcript for a wake phrase. Returns
    /// `true` if it opened the assistant.
    pub fn on_wake_transcript(
        &mut self,
        assistant: &mut AssistantStateMachine,
        transcript: &Transcript,
    ) -> bool {
        if !assistant.is_wake_word_listening() || assistant.is_open() {
            log::trace!("Ignoring wake transcript: wake word not armed");
            return false;
        }
        if !self.wake_detector.detect(&transcript.text) {
            return false;
        }
        log::info!("Wake word detected: {:?}", transcript.text);
        self.open(assistant);
        true
    }

    /// The continuous recognizer ended on its own. Restart it only while it
    /// is still wanted.
    pub fn on_wake_end(&mut self, assistant: &mut AssistantStateMachine) {
        self.wake_running = false;
        if assistant.is_wake_word_listening() && !assistant.is_open() {
            log::debug!("Wake recognizer ended, restarting");
            self.arm_wake_word(assistant);
        }
    }

    /// Consume a command transcript. Non-final transcripts and results that
    /// arrive while not listening are dropped.
    pub fn on_command_transcript(
        &mut self,
        assistant: &mut AssistantStateMachine,
        transcript: &Transcript,
    ) -> Option<CanonicalAction> {
        if !transcript.is_final {
            log::trace!("Interim transcript: {:?}", transcript.text);
            return None;
        }
        if !assistant.on_recognition_result() {
            log::debug!("Dropping transcript while not listening: {:?}", transcript.text);
            return None;
        }
        // Single-shot: one result per listening cycle.
        self.stop_command();
        let action = self.parser.parse(&transcript.text);
        match action {
            Some(a) => log::info!("Heard {:?} → {a}", transcript.text),
            None => log::info!("Heard {:?} → no match", transcript.text),
        }
        action
    }

    /// Recognizer error by code. Permission codes deny the microphone;
    /// everything else is transient.
    pub fn on_error(&mut self, assistant: &mut AssistantStateMachine, role: StreamRole, code: &str) {
        let err = RecognitionError::from_code(code);
        if err.is_permission_error() {
            log::warn!("{role} recognizer: {err}");
            self.release();
            assistant.update_permission(PermissionKind::Microphone, PermissionStatus::Denied);
            return;
        }
        log::debug!("{role} recognizer: transient error {err}");
        match role {
            StreamRole::Command => {
                self.stop_command();
                assistant.on_transient_error();
            }
            // The recognizer's end event restarts it.
            StreamRole::Wake => self.stop_wake(),
        }
    }

    /// Say `text` through the speaker, passing through `speaking`.
    pub fn speak(&mut self, assistant: &mut AssistantStateMachine, text: &str) {
        if !assistant.begin_speaking() {
            return;
        }
        if let Err(e) = self.speaker.speak(text) {
            log::warn!("Speech output failed: {e:#}");
        }
        assistant.end_speaking();
    }
}

impl Drop for VoiceController {
    fn drop(&mut self) {
        self.release();
    }
}
