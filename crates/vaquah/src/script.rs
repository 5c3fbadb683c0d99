//! JSON-lines sensor scripts: one timestamped producer event per line.
//!
//! ```text
//! {"t": 0,    "event": "wake", "text": "hey vaquah"}
//! {"t": 200,  "event": "command", "text": "show me the cart"}
//! {"t": 1500, "event": "pose", "pose": {"shape": "fist", "wrist_x": 0.6}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::Context;
use serde::Deserialize;

use vaquah_core::clock::ManualClock;
use vaquah_core::landmarks::{HandPose, LandmarkFrame};
use vaquah_core::permissions::{PermissionKind, PermissionStatus};
use vaquah_core::sensor::{StreamRole, Transcript};
use vaquah_core::{CanonicalAction, Pipeline};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptLine {
    /// Milliseconds on the replay clock.
    #[serde(default)]
    pub t: u64,
    #[serde(flatten)]
    pub event: ScriptEvent,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Raw landmarks; a missing or null frame means no hand.
    Frame {
        #[serde(default)]
        frame: Option<LandmarkFrame>,
    },
    Pose {
        pose: HandPose,
    },
    Command {
        text: String,
        #[serde(default = "default_true", rename = "final")]
        is_final: bool,
    },
    Wake {
        text: String,
    },
    Error {
        stream: StreamRole,
        code: String,
    },
    WakeEnd,
    Permission {
        kind: PermissionKind,
        status: PermissionStatus,
    },
    GestureMode {
        enabled: bool,
    },
    Open,
    Close,
    Listen,
    Dispatch {
        action: String,
    },
}

fn default_true() -> bool {
    true
}

pub fn parse_script(contents: &str) -> anyhow::Result<Vec<ScriptLine>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("script line {}", n + 1))
        })
        .collect()
}

/// Actions that fired during a replay, with the time they fired.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub events: usize,
    pub actions: Vec<(u64, CanonicalAction)>,
}

/// Feed every line into the pipeline. The settle deadline is checked before
/// each event.
pub fn replay(pipeline: &mut Pipeline, clock: &ManualClock, lines: &[ScriptLine]) -> ReplayReport {
    let mut report = ReplayReport::default();
    let mut last_t = 0;
    for line in lines {
        if line.t < last_t {
            log::warn!("Script time went backwards ({} < {last_t}); holding at {last_t}", line.t);
        }
        last_t = last_t.max(line.t);
        clock.set_ms(line.t);
        pipeline.tick();

        log::debug!("t={} {:?}", line.t, line.event);
        if let Some(action) = apply(pipeline, &line.event) {
            report.actions.push((last_t, action));
        }
        report.events += 1;
    }
    pipeline.tick();
    report
}

fn apply(pipeline: &mut Pipeline, event: &ScriptEvent) -> Option<CanonicalAction> {
    match event {
        ScriptEvent::Frame { frame } => pipeline.on_frame(frame.as_ref()),
        ScriptEvent::Pose { pose } => pipeline.on_frame(Some(&pose.to_frame())),
        ScriptEvent::Command { text, is_final } => pipeline.on_command_transcript(&Transcript {
            text: text.clone(),
            is_final: *is_final,
            timestamp_ms: 0,
        }),
        ScriptEvent::Wake { text } => {
            pipeline.on_wake_transcript(&Transcript::final_text(text.as_str()));
            None
        }
        ScriptEvent::Error { stream, code } => {
            pipeline.on_transcript_error(*stream, code);
            None
        }
        ScriptEvent::WakeEnd => {
            pipeline.on_wake_stream_end();
            None
        }
        ScriptEvent::Permission { kind, status } => {
            pipeline.update_permission(*kind, *status);
            None
        }
        ScriptEvent::GestureMode { enabled: true } => {
            pipeline.enable_gesture_mode();
            None
        }
        ScriptEvent::GestureMode { enabled: false } => {
            pipeline.disable_gesture_mode();
            None
        }
        ScriptEvent::Open => {
            pipeline.open_assistant();
            None
        }
        ScriptEvent::Close => {
            pipeline.close_assistant();
            None
        }
        ScriptEvent::Listen => {
            pipeline.start_listening();
            None
        }
        ScriptEvent::Dispatch { action } => pipeline.dispatch_named(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use vaquah_core::assistant::AssistantState;
    use vaquah_core::Config;
    use vaquah_surface::{SurfaceEffect, TreeSurface};

    fn pipeline() -> (Pipeline, Arc<ManualClock>, Arc<TreeSurface>) {
        let surface = Arc::new(TreeSurface::storefront());
        let clock = Arc::new(ManualClock::new());
        let pipeline = Pipeline::from_config(
            &Config::default(),
            Box::new(Arc::clone(&surface)),
            clock.clone(),
            None,
            None,
        )
        .unwrap();
        (pipeline, clock, surface)
    }

    #[test]
    fn parses_every_event_kind() {
        let script = r#"
# comment
{"t": 0, "event": "wake", "text": "vaquah"}
{"t": 10, "event": "command", "text": "go ho", "final": false}
{"t": 20, "event": "command", "text": "go home"}
{"t": 30, "event": "error", "stream": "command", "code": "no-speech"}
{"t": 40, "event": "wake_end"}
{"t": 50, "event": "permission", "kind": "camera", "status": "denied"}
{"t": 60, "event": "gesture_mode", "enabled": true}
{"t": 70, "event": "frame", "frame": null}
{"t": 75, "event": "frame"}
{"t": 80, "event": "pose", "pose": {"shape": "pinch", "x": 0.5, "y": 0.5}}
{"t": 90, "event": "open"}
{"t": 91, "event": "close"}
{"t": 92, "event": "listen"}
{"t": 99, "event": "dispatch", "action": "scroll_top"}
"#;
        let lines = parse_script(script).unwrap();
        assert_eq!(lines.len(), 14);
        assert_eq!(
            lines[1].event,
            ScriptEvent::Command { text: "go ho".into(), is_final: false }
        );
        assert_eq!(lines[2].event, ScriptEvent::Command { text: "go home".into(), is_final: true });
        assert_eq!(lines[7].event, ScriptEvent::Frame { frame: None });
        assert_eq!(lines[8].event, ScriptEvent::Frame { frame: None });
        assert_eq!(lines[13].t, 99);
    }

    #[test]
    fn bad_line_reports_its_number() {
        let err = parse_script("{\"t\":0,\"event\":\"open\"}\n{\"t\":1,\"event\":\"jump\"}")
            .unwrap_err();
        assert!(format!("{err:#}").contains("script line 2"), "{err:#}");
    }

    #[test]
    fn replays_voice_and_gesture_session() {
        let script = r#"
{"t": 0, "event": "gesture_mode", "enabled": true}
{"t": 100, "event": "wake", "text": "ok vaquah"}
{"t": 300, "event": "command", "text": "open my cart"}
{"t": 2000, "event": "pose", "pose": {"shape": "fist", "wrist_x": 0.4}}
{"t": 2200, "event": "pose", "pose": {"shape": "fist", "wrist_x": 0.6}}
{"t": 2300, "event": "dispatch", "action": "FLY"}
"#;
        let (mut pipeline, clock, surface) = pipeline();
        let lines = parse_script(script).unwrap();
        let report = replay(&mut pipeline, &clock, &lines);

        assert_eq!(report.events, 6);
        assert_eq!(
            report.actions,
            vec![(300, CanonicalAction::NavigateCart), (2200, CanonicalAction::NavigateBack)]
        );
        assert_eq!(surface.location(), "/");
        assert_eq!(surface.effects().len(), 2);
        assert!(matches!(surface.effects()[0], SurfaceEffect::Navigate { .. }));
        // Settled by the end of the replay.
        assert_eq!(pipeline.snapshot().state, AssistantState::Idle);
    }
}
