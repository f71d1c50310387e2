//! # finger_posture
//!
//! Count raised fingers from hand landmarks and announce the count only once
//! the posture has held steady.
//!
//! ## Pipeline
//!
//! | Stage | Input | Output |
//! |---|---|---|
//! | [`extract_finger_states`] | 21 landmarks + handedness | 5 booleans, thumb first |
//! | [`build_signature`] | finger states of every hand, in order | fingerprint + total |
//! | [`StabilityFilter`] | one fingerprint per frame | at most one [`StabilityEvent`] |
//! | [`OutputSink`] | events | display / speech |
//!
//! ## Quick start
//!
//! ```rust
//! use finger_posture::{Recognizer, RecordingSink, StabilityFilter, RawFrame, MAX_HANDS};
//!
//! let mut recognizer = Recognizer::new(StabilityFilter::default(), RecordingSink::default());
//! let frame: RawFrame = serde_json::from_str(r#"{"hands":[]}"#).unwrap();
//! let hands = frame.validate(MAX_HANDS).unwrap();
//! assert!(recognizer.process(&hands).is_none());
//! ```

pub mod error;
pub mod frame;
pub mod landmarks;
pub mod signature;
pub mod sink;
pub mod stability;

pub use error::FrameError;
pub use frame::{RawFrame, RawHand, DETECTION_CONFIDENCE, MAX_HANDS, TRACKING_CONFIDENCE};
pub use landmarks::{
    extract_finger_states, synthesize_hand, FingerStates, HandObservation, Handedness, Point2,
    HAND_CONNECTIONS, LANDMARK_COUNT,
};
pub use signature::{build_signature, HandOrdering, PostureSignature};
pub use sink::{dispatch, OutputSink, Recognizer, RecordingSink, SinkCall};
pub use stability::{number_to_word, StabilityEvent, StabilityFilter, DEFAULT_THRESHOLD};
