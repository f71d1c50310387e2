//! Debounce state machine turning per-frame fingerprints into stable events.
//!
//! ```text
//!   Idle ──hands──▶ Tracking ──(confidence ≥ threshold, new posture)──▶ Stable
//!    ▲                 │ ▲                                               │
//!    └──── no hands ───┘ └──────────── fingerprint changes ─────────────┘
//! ```
//!
//! Leaving `Stable` for `Idle` emits [`StabilityEvent::Cleared`] once.

use std::borrow::Cow;

use tracing::debug;

use crate::landmarks::{extract_finger_states, HandObservation};
use crate::signature::{build_signature, HandOrdering, PostureSignature};

/// Extra matching frames, beyond the first, needed before a posture is stable.
pub const DEFAULT_THRESHOLD: u32 = 5;

const NUMBER_WORDS: [&str; 11] = [
    "Nol", "Satu", "Dua", "Tiga", "Empat", "Lima",
    "Enam", "Tujuh", "Delapan", "Sembilan", "Sepuluh",
];

/// Spoken word for a finger count; counts past the table fall back to digits.
pub fn number_to_word(n: u32) -> Cow<'static, str> {
    match NUMBER_WORDS.get(n as usize) {
        Some(word) => Cow::Borrowed(word),
        None       => Cow::Owned(n.to_string()),
    }
}

/// Emitted at most once per processed frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StabilityEvent {
    /// A new posture held long enough.  `count` is the number of extended fingers.
    Stable { count: u32, word: String },
    /// Hands left the frame after a stable posture had been announced.
    Cleared,
}

/// Owns the running confidence for one video stream.
#[derive(Clone, Debug)]
pub struct StabilityFilter {
    threshold:  u32,
    ordering:   HandOrdering,
    raw:        PostureSignature,
    confidence: u32,
    stable:     PostureSignature,
}

impl Default for StabilityFilter {
    fn default() -> Self { Self::new(DEFAULT_THRESHOLD) }
}

impl StabilityFilter {
    pub fn new(threshold: u32) -> Self {
        StabilityFilter {
            threshold,
            ordering:   HandOrdering::AsReported,
            raw:        PostureSignature::empty(),
            confidence: 0,
            stable:     PostureSignature::empty(),
        }
    }

    pub fn with_ordering(mut self, ordering: HandOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn threshold(&self)        -> u32               { self.threshold }
    pub fn ordering(&self)         -> HandOrdering      { self.ordering }
    pub fn confidence(&self)       -> u32               { self.confidence }
    pub fn raw_signature(&self)    -> &PostureSignature { &self.raw }
    pub fn stable_signature(&self) -> &PostureSignature { &self.stable }

    /// Forget everything without emitting anything.
    pub fn reset(&mut self) {
        self.raw = PostureSignature::empty();
        self.confidence = 0;
        self.stable = PostureSignature::empty();
    }

    /// Extract, fingerprint and debounce one frame's hands.
    pub fn process_frame(&mut self, hands: &[HandObservation]) -> Option<StabilityEvent> {
        if hands.is_empty() {
            return self.observe(None);
        }
        let mut arranged: Vec<_> = hands
            .iter()
            .map(|h| (h.handedness, extract_finger_states(h)))
            .collect();
        self.ordering.arrange(&mut arranged);
        let states: Vec<_> = arranged.into_iter().map(|(_, s)| s).collect();
        self.observe(Some(build_signature(&states)))
    }

    /// Advance on a precomputed `(fingerprint, total)`; `None` means no hands.
    pub fn observe(&mut self, frame: Option<(PostureSignature, u32)>) -> Option<StabilityEvent> {
        let Some((signature, total)) = frame else {
            self.confidence = 0;
            self.raw = PostureSignature::empty();
            if self.stable.is_empty() {
                return None;
            }
            self.stable = PostureSignature::empty();
            debug!("hands gone, clearing stable posture");
            return Some(StabilityEvent::Cleared);
        };

        if signature == self.raw {
            self.confidence = self.confidence.saturating_add(1);
        } else {
            debug!(from = %self.raw, to = %signature, "posture changed");
            self.raw = signature;
            self.confidence = 0;
        }

        // Confidence counts repeats after the first frame, so `threshold`
        // repeats means `threshold + 1` identical frames.
        if self.confidence >= self.threshold && self.stable != self.raw {
            self.stable = self.raw.clone();
            let word = number_to_word(total).into_owned();
            debug!(signature = %self.stable, count = total, %word, "posture stable");
            return Some(StabilityEvent::Stable { count: total, word });
        }
        None
    }
}
