//! Gesture mode: owns the camera adapter and applies classifier output to the surface.

use std::time::Duration;

use crate::action::CanonicalAction;
use crate::assistant::AssistantStateMachine;
use crate::config::Config;
use crate::landmarks::LandmarkFrame;
use crate::permissions::{PermissionKind, PermissionStatus};
use crate::sensor::LandmarkStream;
use crate::surface::{HostSurface, Pointer, ScrollTarget};

use super::{GestureClassifier, GestureState, SwipeDirection};

pub struct GestureController {
    classifier: GestureClassifier,
    state: GestureState,
    stream: Box<dyn LandmarkStream>,
    enabled: bool,
    pointer: Option<Pointer>,
    frames_classified: u64,
}

impl GestureController {
    pub fn new(cfg: &Config, stream: Box<dyn LandmarkStream>) -> Self {
        Self {
            classifier: GestureClassifier::new(cfg.gesture.clone(), cfg.viewport),
            state: GestureState::new(),
            stream,
            enabled: false,
            pointer: None,
            frames_classified: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current cursor position; `None` while no hand is tracked.
    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer
    }

    /// Number of frames handed to the classifier so far.
    pub fn frames_classified(&self) -> u64 {
        self.frames_classified
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Start the camera. A start failure is reported as a camera denial and
    /// the feature stays off.
    pub fn enable(&mut self, assistant: &mut AssistantStateMachine) -> bool {
        if self.enabled {
            return true;
        }
        if !assistant.set_gesture_mode(true) {
            log::warn!("Gesture mode unavailable: camera permission denied");
            return false;
        }
        match self.stream.start() {
            Ok(()) => {
                assistant.update_permission(PermissionKind::Camera, PermissionStatus::Granted);
                self.enabled = true;
                log::info!("Gesture mode enabled ({})", self.stream.name());
                true
            }
            Err(e) => {
                log::warn!("Camera start failed on {}: {e:#}", self.stream.name());
                assistant.update_permission(PermissionKind::Camera, PermissionStatus::Denied);
                false
            }
        }
    }

    /// Stop the camera and forget all gesture state. No-op if already off.
    pub fn disable(&mut self, assistant: &mut AssistantStateMachine) {
        self.release();
        assistant.set_gesture_mode(false);
    }

    fn release(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        if let Err(e) = self.stream.stop() {
            log::warn!("Camera stop failed on {}: {e:#}", self.stream.name());
        }
        self.state.reset();
        self.pointer = None;
        log::info!("Gesture mode disabled");
    }

    /// Classify one camera tick and apply pointer, click and scroll effects.
    /// A swipe is returned as an action for the caller to dispatch.
    pub fn on_frame(
        &mut self,
        frame: Option<&LandmarkFrame>,
        now: Duration,
        surface: &dyn HostSurface,
    ) -> Option<CanonicalAction> {
        if !self.enabled {
            log::trace!("Dropping frame: gesture mode off");
            return None;
        }
        self.frames_classified += 1;
        let out = self.classifier.classify(frame, &mut self.state, now);

        self.pointer = out.pointer;
        if let Some(p) = out.pointer {
            log::trace!("Pointer ({:.0}, {:.0})", p.x, p.y);
        }
        if let Some(p) = out.click {
            click_at(surface, p);
        }
        if let (Some(dy), Some(p)) = (out.scroll_dy, out.pointer) {
            let target = surface
                .scroll_container_at(p.x, p.y)
                .map(ScrollTarget::Element)
                .unwrap_or(ScrollTarget::Viewport);
            if let Err(e) = surface.scroll_by(&target, dy) {
                log::warn!("Gesture scroll failed on {}: {e:#}", surface.name());
            }
        }

        out.swipe.map(|direction| match direction {
            SwipeDirection::Forward => self.classifier.config().swipe_forward_action,
            SwipeDirection::Back => CanonicalAction::NavigateBack,
        })
    }
}

impl Drop for GestureController {
    fn drop(&mut self) {
        self.release();
    }
}

/// Click the interactive target under `p`; a label also activates the
/// control it wraps.
fn click_at(surface: &dyn HostSurface, p: Pointer) {
    let Some(target) = surface.hit_test(p.x, p.y) else {
        log::debug!("Pinch at ({:.0}, {:.0}) hit nothing", p.x, p.y);
        return;
    };
    log::info!("Gesture click on {} ({:?})", target.id, target.kind);
    if let Err(e) = surface.click(&target.id) {
        log::warn!("Click on {} failed: {e:#}", target.id);
    }
    if let Some(control) = &target.wrapped_control {
        if let Err(e) = surface.click(control) {
            log::warn!("Click on wrapped control {control} failed: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::gesture::test_frames::*;
    use crate::sensor::replay::{ReplayLandmarkStream, StreamProbe};
    use crate::surface::{InteractiveTarget, Navigation, ScrollEdge, TargetId, TargetKind};

    struct FailingStop;

    impl LandmarkStream for FailingStop {
        fn start(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
        fn stop(&mut self) -> anyhow::Result<()> {
            anyhow::bail!("device busy")
        }
        fn name(&self) -> &str {
            "failing-stop"
        }
    }

    /// Every point hits a label wrapping checkbox `2`; the right half is a
    /// scrollable list `5`.
    #[derive(Default)]
    struct StubSurface {
        calls: Mutex<Vec<String>>,
    }

    impl StubSurface {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HostSurface for StubSurface {
        fn hit_test(&self, _x: f64, _y: f64) -> Option<InteractiveTarget> {
            Some(InteractiveTarget {
                id: TargetId("1".into()),
                kind: TargetKind::Label,
                wrapped_control: Some(TargetId("2".into())),
            })
        }
        fn scroll_container_at(&self, x: f64, _y: f64) -> Option<TargetId> {
            (x > 500.0).then(|| TargetId("5".into()))
        }
        fn click(&self, target: &TargetId) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(format!("click {target}"));
            Ok(())
        }
        fn scroll_by(&self, target: &ScrollTarget, dy: f64) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(format!("scroll {target:?} {dy}"));
            Ok(())
        }
        fn scroll_to_edge(&self, _t: &ScrollTarget, _e: ScrollEdge) -> anyhow::Result<()> {
            Ok(())
        }
        fn navigate(&self, _nav: &Navigation) -> anyhow::Result<()> {
            Ok(())
        }
        fn name(&self) -> &str {
            "stub"
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn controller(probe: &StreamProbe) -> GestureController {
        let mut cfg = Config::default();
        cfg.viewport.width = 1000.0;
        cfg.viewport.height = 1000.0;
        GestureController::new(&cfg, Box::new(ReplayLandmarkStream::with_probe(probe.clone())))
    }

    #[test]
    fn frames_are_dropped_until_enabled() {
        let probe = StreamProbe::default();
        let mut gc = controller(&probe);
        let surface = StubSurface::default();
        assert!(gc.on_frame(Some(&two_fingers()), ms(0), &surface).is_none());
        assert_eq!(gc.frames_classified(), 0);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn enable_starts_camera_and_grants_permission() {
        let probe = StreamProbe::default();
        let mut gc = controller(&probe);
        let mut assistant = AssistantStateMachine::new();
        assert!(gc.enable(&mut assistant));
        assert!(gc.enable(&mut assistant));
        assert_eq!(probe.stats().starts, 1);
        assert!(assistant.is_gesture_mode_enabled());
        assert_eq!(assistant.permissions().camera, PermissionStatus::Granted);
    }

    #[test]
    fn start_failure_is_camera_denial() {
        let probe = StreamProbe::default();
        probe.deny();
        let mut gc = controller(&probe);
        let mut assistant = AssistantStateMachine::new();
        assert!(!gc.enable(&mut assistant));
        assert!(!gc.is_enabled());
        assert!(!assistant.is_gesture_mode_enabled());
        assert_eq!(assistant.permissions().camera, PermissionStatus::Denied);
        // Not retried automatically, and a manual retry is refused.
        assert!(!gc.enable(&mut assistant));
        assert_eq!(probe.stats().starts, 0);
    }

    #[test]
    fn disable_stops_once_and_blocks_further_classification() {
        let probe = StreamProbe::default();
        let mut gc = controller(&probe);
        let mut assistant = AssistantStateMachine::new();
        let surface = StubSurface::default();
        gc.enable(&mut assistant);
        gc.on_frame(Some(&pointing(0.5, 0.5)), ms(0), &surface);
        assert_eq!(gc.frames_classified(), 1);

        gc.disable(&mut assistant);
        gc.disable(&mut assistant);
        for t in 1..10 {
            gc.on_frame(Some(&two_fingers()), ms(t * 16), &surface);
        }
        assert_eq!(gc.frames_classified(), 1);
        assert_eq!(probe.stats().stops, 1);
        assert!(gc.pointer().is_none());
        assert!(!assistant.is_gesture_mode_enabled());
    }

    #[test]
    fn stop_failure_still_releases() {
        let mut gc = GestureController::new(&Config::default(), Box::new(FailingStop));
        let mut assistant = AssistantStateMachine::new();
        gc.enable(&mut assistant);
        gc.disable(&mut assistant);
        assert!(!gc.is_enabled());
        assert!(!assistant.is_gesture_mode_enabled());
    }

    #[test]
    fn drop_releases_camera() {
        let probe = StreamProbe::default();
        {
            let mut gc = controller(&probe);
            let mut assistant = AssistantStateMachine::new();
            gc.enable(&mut assistant);
        }
        assert_eq!(probe.stats().stops, 1);
        assert!(!probe.stats().running);
    }

    #[test]
    fn pinch_clicks_label_and_wrapped_control() {
        let probe = StreamProbe::default();
        let mut gc = controller(&probe);
        let mut assistant = AssistantStateMachine::new();
        let surface = StubSurface::default();
        gc.enable(&mut assistant);
        gc.on_frame(Some(&pinch(0.5, 0.5, 0.01)), ms(0), &surface);
        assert_eq!(surface.calls(), vec!["click #1", "click #2"]);
    }

    #[test]
    fn scroll_goes_to_container_under_pointer_or_viewport() {
        let probe = StreamProbe::default();
        let mut gc = controller(&probe);
        let mut assistant = AssistantStateMachine::new();
        let surface = StubSurface::default();
        gc.enable(&mut assistant);

        // two_fingers() puts the index tip at x=0.60 → mirrored to 400 px.
        gc.on_frame(Some(&two_fingers()), ms(0), &surface);
        let mut right = two_fingers();
        right.points[crate::landmarks::HandLandmark::IndexTip.index()].x = 0.2;
        gc.on_frame(Some(&right), ms(16), &surface);

        assert_eq!(
            surface.calls(),
            vec!["scroll Viewport -40", "scroll Element(TargetId(\"5\")) -40"]
        );
    }

    #[test]
    fn swipe_becomes_navigation_action() {
        let probe = StreamProbe::default();
        let mut gc = controller(&probe);
        let mut assistant = AssistantStateMachine::new();
        let surface = StubSurface::default();
        gc.enable(&mut assistant);
        assert!(gc.on_frame(Some(&fist(0.3)), ms(0), &surface).is_none());
        assert_eq!(
            gc.on_frame(Some(&fist(0.5)), ms(100), &surface),
            Some(CanonicalAction::NavigateBack)
        );
        gc.on_frame(Some(&fist(0.5)), ms(1_000), &surface);
        assert_eq!(
            gc.on_frame(Some(&fist(0.3)), ms(1_100), &surface),
            Some(CanonicalAction::NavigateCart)
        );
    }

    #[test]
    fn lost_hand_clears_pointer() {
        let probe = StreamProbe::default();
        let mut gc = controller(&probe);
        let mut assistant = AssistantStateMachine::new();
        let surface = StubSurface::default();
        gc.enable(&mut assistant);
        gc.on_frame(Some(&pointing(0.5, 0.5)), ms(0), &surface);
        assert!(gc.pointer().is_some());
        gc.on_frame(None, ms(16), &surface);
        assert!(gc.pointer().is_none());
    }
}
