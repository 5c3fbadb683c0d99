//! Hand landmark frames as delivered by the landmark stream adapter.

use serde::{Deserialize, Serialize};

/// Number of points in a complete hand frame.
pub const LANDMARK_COUNT: usize = 21;

/// One normalized landmark. `x`/`y` are in [0,1] relative to the camera frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar distance, ignoring depth.
    pub fn distance_2d(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Anatomical landmark ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

/// A single camera tick's worth of hand landmarks.
///
/// Construction does not validate; use [`LandmarkFrame::is_well_formed`] before
/// reading points by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub points: Vec<Point3>,
    #[serde(default)]
    pub handedness: Handedness,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Point3>, handedness: Handedness) -> Self {
        Self { points, handedness }
    }

    /// At least 21 points, all finite.
    pub fn is_well_formed(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT && self.points.iter().all(Point3::is_finite)
    }

    pub fn get(&self, landmark: HandLandmark) -> Option<&Point3> {
        self.points.get(landmark.index())
    }
}

/// Synthetic right-hand poses, for scripted replays and demos.
///
/// `x`/`y` place the index fingertip (the pointer); a fist is placed by its
/// wrist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum HandPose {
    Fist { wrist_x: f32 },
    Point { x: f32, y: f32 },
    Pinch { x: f32, y: f32 },
    TwoFingers { x: f32, y: f32 },
    ThreeFingers { x: f32, y: f32 },
}

impl HandPose {
    pub fn to_frame(&self) -> LandmarkFrame {
        match *self {
            HandPose::Fist { wrist_x } => synth(wrist_x, 0.4, wrist_x, [false; 4], false),
            HandPose::Point { x, y } => synth(x, y, x, [true; 4], false),
            HandPose::Pinch { x, y } => synth(x, y, x, [true; 4], true),
            HandPose::TwoFingers { x, y } => synth(x, y, x, [true, true, false, false], false),
            HandPose::ThreeFingers { x, y } => synth(x, y, x, [true, true, true, false], false),
        }
    }
}

fn synth(x: f32, y: f32, wrist_x: f32, up: [bool; 4], pinch: bool) -> LandmarkFrame {
    use HandLandmark::*;

    let mut points = vec![Point3::new(x, y + 0.2, 0.0); LANDMARK_COUNT];
    points[Wrist.index()] = Point3::new(wrist_x, y + 0.35, 0.0);
    let fingers = [
        (IndexPip, IndexTip),
        (MiddlePip, MiddleTip),
        (RingPip, RingTip),
        (PinkyPip, PinkyTip),
    ];
    for (i, ((pip, tip), is_up)) in fingers.into_iter().zip(up).enumerate() {
        let fx = x + 0.03 * i as f32;
        points[pip.index()] = Point3::new(fx, y + 0.15, 0.0);
        points[tip.index()] = Point3::new(fx, if is_up { y } else { y + 0.2 }, 0.0);
    }
    // Thumb folded across the palm (tip right of the IP joint).
    points[ThumbIp.index()] = Point3::new(x - 0.10, y + 0.15, 0.0);
    points[ThumbTip.index()] = if pinch {
        Point3::new(x + 0.01, y, 0.0)
    } else {
        Point3::new(x - 0.05, y + 0.15, 0.0)
    };
    LandmarkFrame::new(points, Handedness::Right)
}
