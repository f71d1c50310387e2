//! Hand landmarks and per-finger extension state.
//!
//! A detected hand is 21 normalized 2-D points (MediaPipe hand model) plus the
//! detector's handedness label.  [`extract_finger_states`] reduces one hand to
//! five booleans, thumb first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FrameError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Tips of the four non-thumb fingers, index → pinky.
pub const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Mid joints paired with [`FINGER_TIPS`].
pub const FINGER_PIPS: [usize; 4] = [INDEX_PIP, MIDDLE_PIP, RING_PIP, PINKY_PIP];

/// Skeleton edges used when drawing a detected hand.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),  (THUMB_CMC, THUMB_MCP),   (THUMB_MCP, THUMB_IP),   (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),  (INDEX_MCP, INDEX_PIP),   (INDEX_PIP, INDEX_DIP),  (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP),  (RING_MCP, RING_PIP),     (RING_PIP, RING_DIP),     (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP),   (PINKY_MCP, PINKY_PIP),   (PINKY_PIP, PINKY_DIP),   (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Point2 / Handedness
// ════════════════════════════════════════════════════════════════════════════

/// A normalized image-space point.  `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }
}

/// Handedness as reported by the detector.
///
/// With a mirrored camera the label follows the detector's assessment, which
/// may flip between frames for the same physical hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn label(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Handedness {
    type Err = FrameError;

    /// Detector labels are matched exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Left"  => Ok(Handedness::Left),
            "Right" => Ok(Handedness::Right),
            other   => Err(FrameError::UnknownHandedness { hand: 0, label: other.to_string() }),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub landmarks:  [Point2; LANDMARK_COUNT],
    pub handedness: Handedness,
}

impl HandObservation {
    pub fn new(landmarks: [Point2; LANDMARK_COUNT], handedness: Handedness) -> Self {
        HandObservation { landmarks, handedness }
    }

    /// Build from a slice, rejecting anything that is not exactly 21 points.
    pub fn from_slice(points: &[Point2], handedness: Handedness) -> Result<Self, FrameError> {
        let landmarks: [Point2; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| FrameError::LandmarkCount { hand: 0, found: points.len() })?;
        Ok(HandObservation { landmarks, handedness })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerStates
// ════════════════════════════════════════════════════════════════════════════

/// Extended/closed state of one hand's fingers: thumb, index, middle, ring, pinky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    pub const THUMB:  usize = 0;
    pub const INDEX:  usize = 1;
    pub const MIDDLE: usize = 2;
    pub const RING:   usize = 3;
    pub const PINKY:  usize = 4;

    pub fn all_extended() -> Self { FingerStates([true; 5]) }

    pub fn extended_count(&self) -> u32 {
        self.0.iter().filter(|&&open| open).count() as u32
    }

    pub fn is_extended(&self, finger: usize) -> bool { self.0[finger] }

    pub fn as_array(&self) -> [bool; 5] { self.0 }
}

/// Decide which fingers of one hand are extended.
///
/// * Thumb: a right hand's thumb is open when its tip is left of the IP joint;
///   a left hand's when it is right of it.  Rotation and depth are ignored.
/// * Other fingers: open when the tip is above (smaller `y`) its PIP joint.
pub fn extract_finger_states(hand: &HandObservation) -> FingerStates {
    let lm = &hand.landmarks;
    let mut states = [false; 5];

    states[FingerStates::THUMB] = match hand.handedness {
        Handedness::Right => lm[THUMB_TIP].x < lm[THUMB_IP].x,
        Handedness::Left  => lm[THUMB_TIP].x > lm[THUMB_IP].x,
    };

    for (i, (&tip, &pip)) in FINGER_TIPS.iter().zip(FINGER_PIPS.iter()).enumerate() {
        states[i + 1] = lm[tip].y < lm[pip].y;
    }

    FingerStates(states)
}

// ════════════════════════════════════════════════════════════════════════════
// Synthetic hands
// ════════════════════════════════════════════════════════════════════════════

/// Build an upright hand centred on `center_x` whose landmarks read back as
/// `states`.  Used by the keyboard simulator and in tests.
pub fn synthesize_hand(handedness: Handedness, states: FingerStates, center_x: f32) -> HandObservation {
    // Right hands have the thumb toward -x in image space.
    let s = match handedness {
        Handedness::Right => 1.0,
        Handedness::Left  => -1.0,
    };
    let mut lm = [Point2::default(); LANDMARK_COUNT];

    lm[WRIST]     = Point2::new(center_x, 0.90);
    lm[THUMB_CMC] = Point2::new(center_x - s * 0.05, 0.80);
    lm[THUMB_MCP] = Point2::new(center_x - s * 0.08, 0.72);
    lm[THUMB_IP]  = Point2::new(center_x - s * 0.10, 0.66);
    let thumb_reach = if states.is_extended(FingerStates::THUMB) { 0.15 } else { 0.05 };
    lm[THUMB_TIP] = Point2::new(center_x - s * thumb_reach, 0.62);

    for finger in 0..4 {
        let x   = center_x - s * (0.06 - 0.04 * finger as f32);
        let mcp = FINGER_PIPS[finger] - 1;
        lm[mcp]                 = Point2::new(x, 0.65);
        lm[FINGER_PIPS[finger]] = Point2::new(x, 0.55);
        let (dip_y, tip_y) = if states.is_extended(finger + 1) { (0.48, 0.42) } else { (0.60, 0.62) };
        lm[FINGER_PIPS[finger] + 1] = Point2::new(x, dip_y);
        lm[FINGER_TIPS[finger]]     = Point2::new(x, tip_y);
    }

    HandObservation { landmarks: lm, handedness }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_hands_read_back() {
        for handedness in [Handedness::Left, Handedness::Right] {
            for mask in 0u8..32 {
                let mut a = [false; 5];
                for (i, slot) in a.iter_mut().enumerate() { *slot = mask & (1 << i) != 0; }
                let hand = synthesize_hand(handedness, FingerStates(a), 0.5);
                assert_eq!(extract_finger_states(&hand).0, a, "{handedness} mask {mask:05b}");
            }
        }
    }

    fn flat_hand(handedness: Handedness) -> HandObservation {
        // Every tip level with its joint: nothing reads as extended.
        HandObservation::new([Point2::new(0.5, 0.5); LANDMARK_COUNT], handedness)
    }

    #[test]
    fn right_thumb_open_when_tip_left_of_joint() {
        let mut hand = flat_hand(Handedness::Right);
        hand.landmarks[THUMB_TIP].x = 0.40;
        hand.landmarks[THUMB_IP].x  = 0.45;
        assert_eq!(extract_finger_states(&hand).0, [true, false, false, false, false]);
    }

    #[test]
    fn left_thumb_mirrors_right() {
        let mut hand = flat_hand(Handedness::Left);
        hand.landmarks[THUMB_TIP].x = 0.40;
        hand.landmarks[THUMB_IP].x  = 0.45;
        assert!(!extract_finger_states(&hand).is_extended(FingerStates::THUMB));

        hand.landmarks[THUMB_TIP].x = 0.50;
        assert!(extract_finger_states(&hand).is_extended(FingerStates::THUMB));
    }

    #[test]
    fn finger_open_when_tip_above_pip() {
        let mut hand = flat_hand(Handedness::Right);
        hand.landmarks[MIDDLE_TIP].y = 0.2;
        hand.landmarks[MIDDLE_PIP].y = 0.4;
        hand.landmarks[PINKY_TIP].y  = 0.6; // below the joint: curled
        let states = extract_finger_states(&hand);
        assert_eq!(states.0, [false, false, true, false, false]);
        assert_eq!(states.extended_count(), 1);
    }

    #[test]
    fn equal_coordinates_read_as_closed() {
        let states = extract_finger_states(&flat_hand(Handedness::Left));
        assert_eq!(states.extended_count(), 0);
    }

    #[test]
    fn from_slice_rejects_short_input() {
        let pts = vec![Point2::default(); 20];
        let err = HandObservation::from_slice(&pts, Handedness::Right).unwrap_err();
        assert_eq!(err, FrameError::LandmarkCount { hand: 0, found: 20 });
    }

    #[test]
    fn handedness_labels_are_exact() {
        assert_eq!("Left".parse::<Handedness>().unwrap(), Handedness::Left);
        assert_eq!("Right".parse::<Handedness>().unwrap(), Handedness::Right);
        assert!("right".parse::<Handedness>().is_err());
    }
}
