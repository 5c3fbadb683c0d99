//! Pipeline: wires landmark frames and transcripts through the classifier,
//! the parser and the assistant state machine into dispatched actions.
//!
//! Every producer event has one handler. Handlers run to completion on the
//! caller's thread; the settle delay is a deadline applied by [`Pipeline::tick`].

use std::sync::Arc;
use std::time::Duration;

use crate::action::{surface_navigator, ActionDispatcher, CanonicalAction, DispatchExtra};
use crate::assistant::{AssistantSnapshot, AssistantState, AssistantStateMachine};
use crate::clock::Clock;
use crate::config::Config;
use crate::gesture::GestureController;
use crate::landmarks::LandmarkFrame;
use crate::permissions::{PermissionKind, PermissionStatus};
use crate::sensor::{self, LandmarkFactory, LandmarkStream, StreamRole, Transcript, TranscriptFactory};
use crate::surface::{HostSurface, Pointer};
use crate::voice::VoiceController;

pub struct Pipeline {
    assistant: AssistantStateMachine,
    gesture: GestureController,
    voice: VoiceController,
    dispatcher: ActionDispatcher,
    surface: Box<dyn HostSurface>,
    clock: Arc<dyn Clock>,
    settle_delay: Duration,
}

impl Pipeline {
    /// Build a pipeline from config, creating all adapters.
    ///
    /// The factories let external crates inject camera and speech backends
    /// this crate doesn't know about.
    pub fn from_config(
        cfg: &Config,
        surface: Box<dyn HostSurface>,
        clock: Arc<dyn Clock>,
        landmark_factory: Option<&LandmarkFactory>,
        transcript_factory: Option<&TranscriptFactory>,
    ) -> anyhow::Result<Self> {
        let camera = sensor::create_landmark_stream(&cfg.camera, landmark_factory);
        let voice = VoiceController::from_config(&cfg.voice, transcript_factory)?;
        Ok(Self::new(cfg, surface, clock, camera, voice))
    }

    /// Assemble from ready-made adapters. The wake recognizer is started
    /// immediately since the assistant starts closed.
    pub fn new(
        cfg: &Config,
        surface: Box<dyn HostSurface>,
        clock: Arc<dyn Clock>,
        camera: Box<dyn LandmarkStream>,
        voice: VoiceController,
    ) -> Self {
        log::info!(
            "Pipeline: camera={}, surface={}, viewport={}x{}",
            camera.name(),
            surface.name(),
            cfg.viewport.width,
            cfg.viewport.height,
        );
        let mut pipeline = Self {
            assistant: AssistantStateMachine::new(),
            gesture: GestureController::new(cfg, camera),
            voice,
            dispatcher: ActionDispatcher::from_config(&cfg.dispatch),
            surface,
            clock,
            settle_delay: Duration::from_millis(cfg.voice.settle_delay_ms),
        };
        pipeline.voice.arm_wake_word(&mut pipeline.assistant);
        pipeline
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn assistant(&self) -> &AssistantStateMachine {
        &self.assistant
    }

    pub fn snapshot(&self) -> AssistantSnapshot {
        self.assistant.snapshot()
    }

    pub fn gesture(&self) -> &GestureController {
        &self.gesture
    }

    pub fn voice(&self) -> &VoiceController {
        &self.voice
    }

    pub fn surface(&self) -> &dyn HostSurface {
        self.surface.as_ref()
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.gesture.pointer()
    }

    // ── Producer events ─────────────────────────────────────────────────

    /// One camera tick. A swipe is dispatched here and also returned.
    pub fn on_frame(&mut self, frame: Option<&LandmarkFrame>) -> Option<CanonicalAction> {
        let now = self.clock.now();
        let action = self.gesture.on_frame(frame, now, self.surface.as_ref())?;
        self.dispatch(action);
        Some(action)
    }

    /// A command-recognizer result. A matched action is dispatched; the
    /// assistant settles back to idle after the configured delay.
    pub fn on_command_transcript(&mut self, transcript: &Transcript) -> Option<CanonicalAction> {
        let action = self.voice.on_command_transcript(&mut self.assistant, transcript);
        match action {
            Some(CanonicalAction::CloseAssistant) => {
                self.close_assistant();
                return action;
            }
            Some(a) => {
                self.voice.speak(&mut self.assistant, a.as_str());
                self.dispatch_action(a, None);
            }
            None => {}
        }
        if self.assistant.state() == AssistantState::Processing {
            self.assistant.begin_settle(self.clock.now(), self.settle_delay);
        }
        action
    }

    /// A wake-recognizer result. Returns `true` if it opened the assistant.
    pub fn on_wake_transcript(&mut self, transcript: &Transcript) -> bool {
        self.voice.on_wake_transcript(&mut self.assistant, transcript)
    }

    pub fn on_transcript_error(&mut self, role: StreamRole, code: &str) {
        self.voice.on_error(&mut self.assistant, role, code);
    }

    pub fn on_wake_stream_end(&mut self) {
        self.voice.on_wake_end(&mut self.assistant);
    }

    /// Permission result reported by an adapter or the host.
    pub fn update_permission(&mut self, kind: PermissionKind, status: PermissionStatus) {
        self.assistant.update_permission(kind, status);
        if status != PermissionStatus::Denied {
            return;
        }
        match kind {
            PermissionKind::Camera => {
                self.gesture.disable(&mut self.assistant);
                // The state machine has left `listening`; results would be dropped.
                self.voice.stop_listening();
            }
            PermissionKind::Microphone => self.voice.release(),
        }
    }

    /// Apply a due settle. Call periodically or before each event.
    pub fn tick(&mut self) -> bool {
        self.assistant.tick(self.clock.now())
    }

    // ── Manual controls ─────────────────────────────────────────────────

    pub fn open_assistant(&mut self) {
        self.voice.open(&mut self.assistant);
    }

    pub fn close_assistant(&mut self) {
        self.voice.close(&mut self.assistant);
    }

    pub fn start_listening(&mut self) -> bool {
        self.voice.start_listening(&mut self.assistant)
    }

    pub fn enable_gesture_mode(&mut self) -> bool {
        self.gesture.enable(&mut self.assistant)
    }

    pub fn disable_gesture_mode(&mut self) {
        self.gesture.disable(&mut self.assistant);
    }

    /// Single entry point for external callers. Open/close also drive the
    /// assistant; everything else goes to the dispatcher.
    pub fn dispatch(&mut self, action: CanonicalAction) {
        self.dispatch_with(action, None);
    }

    pub fn dispatch_with(&mut self, action: CanonicalAction, extra: Option<&DispatchExtra>) {
        match action {
            CanonicalAction::OpenAssistant => self.open_assistant(),
            CanonicalAction::CloseAssistant => self.close_assistant(),
            _ => {}
        }
        self.dispatch_action(action, extra);
    }

    /// Dispatch by name. Unknown names are logged and ignored.
    pub fn dispatch_named(&mut self, name: &str) -> Option<CanonicalAction> {
        let action = ActionDispatcher::resolve_named(name)?;
        self.dispatch(action);
        Some(action)
    }

    fn dispatch_action(&self, action: CanonicalAction, extra: Option<&DispatchExtra>) {
        let surface = self.surface.as_ref();
        let mut navigate = surface_navigator(surface);
        self.dispatcher.dispatch(action, surface, &mut navigate, extra);
    }
}
