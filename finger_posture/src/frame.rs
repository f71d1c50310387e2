//! The detector's per-frame output, as it arrives over the wire.
//!
//! ```json
//! {"hands":[{"handedness":"Right","landmarks":[{"x":0.5,"y":0.9}, …21 points]}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::landmarks::{Handedness, HandObservation, Point2};

/// Hands the detector is configured to report.
pub const MAX_HANDS: usize = 2;
/// Minimum detection confidence configured on the detector.
pub const DETECTION_CONFIDENCE: f32 = 0.4;
/// Minimum tracking confidence configured on the detector.
pub const TRACKING_CONFIDENCE: f32 = 0.4;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHand {
    pub handedness: String,
    pub landmarks:  Vec<Point2>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    #[serde(default)]
    pub hands: Vec<RawHand>,
}

impl RawFrame {
    pub fn empty() -> Self { RawFrame::default() }

    /// Wrap already-validated hands, e.g. from a simulator.
    pub fn from_observations(hands: &[HandObservation]) -> Self {
        RawFrame {
            hands: hands
                .iter()
                .map(|h| RawHand {
                    handedness: h.handedness.label().to_string(),
                    landmarks:  h.landmarks.to_vec(),
                })
                .collect(),
        }
    }

    /// Check the frame against the detector contract.  Any malformed hand
    /// rejects the whole frame.
    pub fn validate(self, max_hands: usize) -> Result<Vec<HandObservation>, FrameError> {
        if self.hands.len() > max_hands {
            return Err(FrameError::TooManyHands { found: self.hands.len(), max: max_hands });
        }
        self.hands
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let handedness: Handedness = raw.handedness.parse().map_err(|e: FrameError| e.at_hand(i))?;
                HandObservation::from_slice(&raw.landmarks, handedness).map_err(|e| e.at_hand(i))
            })
            .collect()
    }
}
