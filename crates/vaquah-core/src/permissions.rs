//! Device permission status, as reported by the adapters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Microphone,
    Camera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    #[default]
    Prompt,
    Granted,
    Denied,
}

/// Last known status per device. Never guessed: only adapters update it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub microphone: PermissionStatus,
    pub camera: PermissionStatus,
}

impl Permissions {
    pub fn get(&self, kind: PermissionKind) -> PermissionStatus {
        match kind {
            PermissionKind::Microphone => self.microphone,
            PermissionKind::Camera => self.camera,
        }
    }

    pub fn set(&mut self, kind: PermissionKind, status: PermissionStatus) {
        match kind {
            PermissionKind::Microphone => self.microphone = status,
            PermissionKind::Camera => self.camera = status,
        }
    }

    pub fn is_denied(&self, kind: PermissionKind) -> bool {
        self.get(kind) == PermissionStatus::Denied
    }
}
