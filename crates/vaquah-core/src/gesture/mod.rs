//! Gesture classification from hand landmark frames.
//!
//! [`GestureClassifier::classify`] is a pure function of the frame, the
//! previous [`GestureState`] and the current time. It never fails: a missing
//! or malformed frame yields an empty [`GestureOutput`].
//!
//! | Pose | Output |
//! |---|---|
//! | any hand | pointer at the (mirrored) index fingertip |
//! | thumb tip + index tip pinched | one click per pinch, cooldown-gated |
//! | index + middle up | scroll up every tick |
//! | index + middle + ring up | scroll down every tick |
//! | fist moved sideways fast | swipe forward / back, cooldown-gated |

pub mod controller;

use std::time::Duration;

use crate::config::{GestureConfig, ViewportConfig};
use crate::cooldown::{self, CooldownGate};
use crate::landmarks::{HandLandmark, Handedness, LandmarkFrame};
use crate::surface::Pointer;

pub use controller::GestureController;

/// Direction of a fist swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Wrist moved toward smaller `x` in camera space.
    Forward,
    /// Wrist moved toward larger `x` in camera space.
    Back,
}

/// Where and when the current fist started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeAnchor {
    pub x: f32,
    pub time: Duration,
}

/// Mutable classifier state carried between ticks.
#[derive(Debug, Default, Clone)]
pub struct GestureState {
    pub(crate) swipe_anchor: Option<SwipeAnchor>,
    pub(crate) is_clicking: bool,
    cooldowns: CooldownGate,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn swipe_anchor(&self) -> Option<SwipeAnchor> {
        self.swipe_anchor
    }

    /// True while a pinch that already clicked is still held.
    pub fn is_clicking(&self) -> bool {
        self.is_clicking
    }

    pub fn last_click_time(&self) -> Option<Duration> {
        self.cooldowns.last_fire(cooldown::CLICK)
    }

    pub fn last_action_time(&self) -> Option<Duration> {
        self.cooldowns.last_fire(cooldown::NAVIGATE)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Which fingers are extended in a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingersUp {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingersUp {
    /// Evaluate a well-formed frame.
    ///
    /// A finger is up when its tip is above (smaller `y`) its PIP joint. The
    /// thumb compares `x` against its IP joint; the direction depends on the
    /// hand, with unknown handedness treated as right.
    pub fn from_frame(frame: &LandmarkFrame) -> Option<Self> {
        let above = |tip: HandLandmark, pip: HandLandmark| -> Option<bool> {
            Some(frame.get(tip)?.y < frame.get(pip)?.y)
        };
        let thumb_tip = frame.get(HandLandmark::ThumbTip)?;
        let thumb_ip = frame.get(HandLandmark::ThumbIp)?;
        let thumb = match frame.handedness {
            Handedness::Left => thumb_tip.x > thumb_ip.x,
            Handedness::Right | Handedness::Unknown => thumb_tip.x < thumb_ip.x,
        };
        Some(Self {
            thumb,
            index: above(HandLandmark::IndexTip, HandLandmark::IndexPip)?,
            middle: above(HandLandmark::MiddleTip, HandLandmark::MiddlePip)?,
            ring: above(HandLandmark::RingTip, HandLandmark::RingPip)?,
            pinky: above(HandLandmark::PinkyTip, HandLandmark::PinkyPip)?,
        })
    }

    pub fn count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&up| up)
            .count()
    }

    pub fn is_fist(&self) -> bool {
        self.count() == 0
    }

    /// Exactly index + middle among the four fingers (thumb ignored).
    pub fn is_two_finger_pose(&self) -> bool {
        self.index && self.middle && !self.ring && !self.pinky
    }

    /// Exactly index + middle + ring among the four fingers (thumb ignored).
    pub fn is_three_finger_pose(&self) -> bool {
        self.index && self.middle && self.ring && !self.pinky
    }
}

/// Everything one tick produced. All fields empty means "no signal".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureOutput {
    pub pointer: Option<Pointer>,
    /// Pointer position of a click that fired this tick.
    pub click: Option<Pointer>,
    /// Vertical scroll in pixels (negative is up).
    pub scroll_dy: Option<f64>,
    pub swipe: Option<SwipeDirection>,
}

impl GestureOutput {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct GestureClassifier {
    cfg: GestureConfig,
    viewport: ViewportConfig,
}

impl GestureClassifier {
    pub fn new(cfg: GestureConfig, viewport: ViewportConfig) -> Self {
        Self { cfg, viewport }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.cfg
    }

    /// Map a normalized index fingertip to viewport pixels, mirroring `x`
    /// for the front-facing camera.
    pub fn pointer_for(&self, frame: &LandmarkFrame) -> Option<Pointer> {
        let tip = frame.get(HandLandmark::IndexTip)?;
        Some(Pointer {
            x: (1.0 - tip.x as f64) * self.viewport.width,
            y: tip.y as f64 * self.viewport.height,
        })
    }

    pub fn classify(
        &self,
        frame: Option<&LandmarkFrame>,
        state: &mut GestureState,
        now: Duration,
    ) -> GestureOutput {
        let frame = match frame {
            Some(f) if f.is_well_formed() => f,
            _ => {
                // Hand lost: release the pinch latch and any pending swipe.
                state.is_clicking = false;
                state.swipe_anchor = None;
                return GestureOutput::default();
            }
        };
        let (Some(pointer), Some(fingers)) = (self.pointer_for(frame), FingersUp::from_frame(frame))
        else {
            return GestureOutput::default();
        };

        GestureOutput {
            pointer: Some(pointer),
            click: self.detect_click(frame, pointer, state, now),
            scroll_dy: self.detect_scroll(&fingers),
            swipe: self.detect_swipe(frame, &fingers, state, now),
        }
    }

    fn detect_click(
        &self,
        frame: &LandmarkFrame,
        pointer: Pointer,
        state: &mut GestureState,
        now: Duration,
    ) -> Option<Pointer> {
        let index = frame.get(HandLandmark::IndexTip)?;
        let thumb = frame.get(HandLandmark::ThumbTip)?;
        let distance = index.distance_2d(thumb);

        if distance >= self.cfg.pinch_threshold {
            state.is_clicking = false;
            return None;
        }
        if state.is_clicking {
            return None;
        }
        let window = Duration::from_millis(self.cfg.click_cooldown_ms);
        if !state.cooldowns.allow(cooldown::CLICK, window, now) {
            return None;
        }
        state.is_clicking = true;
        log::debug!("Pinch click at ({:.0}, {:.0}), distance={distance:.3}", pointer.x, pointer.y);
        Some(pointer)
    }

    fn detect_scroll(&self, fingers: &FingersUp) -> Option<f64> {
        if fingers.is_two_finger_pose() {
            Some(-self.cfg.scroll_step_px)
        } else if fingers.is_three_finger_pose() {
            Some(self.cfg.scroll_step_px)
        } else {
            None
        }
    }

    fn detect_swipe(
        &self,
        frame: &LandmarkFrame,
        fingers: &FingersUp,
        state: &mut GestureState,
        now: Duration,
    ) -> Option<SwipeDirection> {
        if !fingers.is_fist() {
            state.swipe_anchor = None;
            return None;
        }
        let wrist_x = frame.get(HandLandmark::Wrist)?.x;
        let here = SwipeAnchor { x: wrist_x, time: now };

        let Some(anchor) = state.swipe_anchor else {
            state.swipe_anchor = Some(here);
            return None;
        };

        let dt = now.saturating_sub(anchor.time);
        if dt >= Duration::from_millis(self.cfg.swipe_window_ms) {
            // Too slow to be a swipe; start measuring again from here.
            state.swipe_anchor = Some(here);
            return None;
        }

        let delta_x = wrist_x - anchor.x;
        if delta_x.abs() <= self.cfg.swipe_threshold {
            return None;
        }
        let window = Duration::from_millis(self.cfg.action_cooldown_ms);
        if !state.cooldowns.allow(cooldown::NAVIGATE, window, now) {
            return None;
        }

        state.swipe_anchor = Some(here);
        let direction = if delta_x < 0.0 {
            SwipeDirection::Forward
        } else {
            SwipeDirection::Back
        };
        log::debug!("Swipe {direction:?}: dx={delta_x:.3} dt={}ms", dt.as_millis());
        Some(direction)
    }
}
