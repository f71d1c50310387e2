//! Rejections for detector output that breaks the frame contract.

use thiserror::Error;

/// A frame the recognizer refuses to process.
///
/// `hand` is the zero-based position of the offending hand in the frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("hand {hand}: expected 21 landmarks, found {found}")]
    LandmarkCount { hand: usize, found: usize },

    #[error("hand {hand}: unknown handedness label {label:?}")]
    UnknownHandedness { hand: usize, label: String },

    #[error("frame reports {found} hands, at most {max} are supported")]
    TooManyHands { found: usize, max: usize },
}

impl FrameError {
    /// Re-tag an error produced for a single hand with its position in the frame.
    pub fn at_hand(self, index: usize) -> Self {
        match self {
            FrameError::LandmarkCount { found, .. } =>
                FrameError::LandmarkCount { hand: index, found },
            FrameError::UnknownHandedness { label, .. } =>
                FrameError::UnknownHandedness { hand: index, label },
            other => other,
        }
    }
}
