//! Assistant state machine: which recognizer is listening, and what the assistant is doing.
//!
//! ```text
//! closed ──open()──▶ Listening ──result──▶ Processing ──settle──▶ Idle
//!    ▲                                                        │
//!    └─────────────────────────close()────────────────────────┘
//! any state ──permission denied──▶ Error
//! ```
//!
//! The flags are private: every change goes through a transition here, which
//! is what keeps the wake-word recognizer and the open assistant mutually
//! exclusive.

use std::time::Duration;

use serde::Serialize;

use crate::permissions::{PermissionKind, PermissionStatus, Permissions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantState {
    #[default]
    Idle,
    Listening,
    Processing,
    Speaking,
    Error,
}

/// Serializable view of the machine, for logs and host UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssistantSnapshot {
    pub state: AssistantState,
    pub is_open: bool,
    pub is_listening: bool,
    pub is_wake_word_listening: bool,
    pub is_gesture_mode_enabled: bool,
    pub permissions: Permissions,
}

#[derive(Debug)]
pub struct AssistantStateMachine {
    state: AssistantState,
    is_open: bool,
    is_listening: bool,
    is_wake_word_listening: bool,
    is_gesture_mode_enabled: bool,
    permissions: Permissions,
    settle_deadline: Option<Duration>,
    state_before_speaking: AssistantState,
}

impl AssistantStateMachine {
    /// Closed, idle, with the wake-word path armed.
    pub fn new() -> Self {
        Self {
            state: AssistantState::Idle,
            is_open: false,
            is_listening: false,
            is_wake_word_listening: true,
            is_gesture_mode_enabled: false,
            permissions: Permissions::default(),
            settle_deadline: None,
            state_before_speaking: AssistantState::Idle,
        }
    }

    pub fn state(&self) -> AssistantState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_listening(&self) -> bool {
        self.is_listening
    }

    pub fn is_wake_word_listening(&self) -> bool {
        self.is_wake_word_listening
    }

    pub fn is_gesture_mode_enabled(&self) -> bool {
        self.is_gesture_mode_enabled
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn snapshot(&self) -> AssistantSnapshot {
        AssistantSnapshot {
            state: self.state,
            is_open: self.is_open,
            is_listening: self.is_listening,
            is_wake_word_listening: self.is_wake_word_listening,
            is_gesture_mode_enabled: self.is_gesture_mode_enabled,
            permissions: self.permissions,
        }
    }

    fn microphone_denied(&self) -> bool {
        self.permissions.is_denied(PermissionKind::Microphone)
    }

    /// Open the assistant and start command listening. Disarms the wake-word
    /// path. Returns `true` if command listening is now active; with the
    /// microphone denied the assistant opens but stays in `Error`.
    pub fn open(&mut self) -> bool {
        self.is_open = true;
        self.is_wake_word_listening = false;
        self.settle_deadline = None;
        if self.microphone_denied() {
            self.state = AssistantState::Error;
            self.is_listening = false;
            log::warn!("Assistant opened without microphone access");
            return false;
        }
        self.state = AssistantState::Listening;
        self.is_listening = true;
        log::info!("Assistant opened, listening");
        true
    }

    /// Re-arm the single-shot command recognizer while open.
    pub fn start_listening(&mut self) -> bool {
        if !self.is_open || self.microphone_denied() {
            return false;
        }
        if self.state == AssistantState::Error {
            return false;
        }
        self.state = AssistantState::Listening;
        self.is_listening = true;
        self.settle_deadline = None;
        true
    }

    /// A final command transcript arrived. Ignored unless listening.
    pub fn on_recognition_result(&mut self) -> bool {
        if !self.is_open || !self.is_listening {
            return false;
        }
        self.state = AssistantState::Processing;
        self.is_listening = false;
        true
    }

    /// Schedule the return to idle once `delay` has elapsed after `now`.
    pub fn begin_settle(&mut self, now: Duration, delay: Duration) {
        if self.state == AssistantState::Processing {
            self.settle_deadline = Some(now + delay);
        }
    }

    /// Apply a due settle. Returns `true` if the state went back to idle.
    pub fn tick(&mut self, now: Duration) -> bool {
        let Some(deadline) = self.settle_deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.settle_deadline = None;
        if self.is_open && self.state == AssistantState::Processing {
            self.state = AssistantState::Idle;
            log::debug!("Assistant settled to idle");
            return true;
        }
        false
    }

    /// Close the assistant from any state and re-arm the wake-word path
    /// (unless the microphone is denied).
    pub fn close(&mut self) {
        self.state = AssistantState::Idle;
        self.is_open = false;
        self.is_listening = false;
        self.settle_deadline = None;
        self.is_wake_word_listening = !self.microphone_denied();
        log::info!("Assistant closed");
    }

    /// Record an adapter-reported permission result. A denial forces `Error`
    /// and stops command listening; it is never retried from here.
    pub fn update_permission(&mut self, kind: PermissionKind, status: PermissionStatus) {
        self.permissions.set(kind, status);
        if status != PermissionStatus::Denied {
            return;
        }
        log::warn!("{kind:?} permission denied");
        self.state = AssistantState::Error;
        self.is_listening = false;
        self.settle_deadline = None;
        match kind {
            PermissionKind::Microphone => self.is_wake_word_listening = false,
            PermissionKind::Camera => self.is_gesture_mode_enabled = false,
        }
    }

    /// Recoverable recognition failure (no speech, aborted, network).
    pub fn on_transient_error(&mut self) {
        self.is_listening = false;
        if self.state == AssistantState::Listening {
            self.state = AssistantState::Idle;
        }
    }

    pub fn begin_speaking(&mut self) -> bool {
        if self.state == AssistantState::Error || self.state == AssistantState::Speaking {
            return false;
        }
        self.state_before_speaking = self.state;
        self.state = AssistantState::Speaking;
        true
    }

    pub fn end_speaking(&mut self) {
        if self.state == AssistantState::Speaking {
            self.state = self.state_before_speaking;
        }
    }

    /// Refused while the camera is denied.
    pub fn set_gesture_mode(&mut self, enabled: bool) -> bool {
        if enabled && self.permissions.is_denied(PermissionKind::Camera) {
            return false;
        }
        self.is_gesture_mode_enabled = enabled;
        true
    }
}

impl Default for AssistantStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
