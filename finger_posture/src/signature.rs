//! Posture fingerprints.
//!
//! A fingerprint concatenates every hand's five finger bits in the order the
//! hands were reported, e.g. `"10000"` for a lone thumb or `"1111111111"` for
//! two open hands.

use std::fmt;

use crate::landmarks::{FingerStates, Handedness};

/// Canonical encoding of one frame's finger states.  Equal iff the strings match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PostureSignature(String);

impl PostureSignature {
    pub fn empty() -> Self { PostureSignature(String::new()) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Number of hands encoded.
    pub fn hand_count(&self) -> usize { self.0.len() / 5 }
}

impl fmt::Display for PostureSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How hands are ordered before their bits are concatenated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandOrdering {
    /// Detector order.  Two hands reported in swapped order produce a
    /// different fingerprint for the same physical posture.
    #[default]
    AsReported,
    /// Left hands before right hands; ties keep detector order.
    ByHandedness,
}

impl HandOrdering {
    /// Apply this ordering to `(handedness, states)` pairs.
    pub fn arrange(self, hands: &mut [(Handedness, FingerStates)]) {
        if self == HandOrdering::ByHandedness {
            hands.sort_by_key(|(h, _)| *h);
        }
    }
}

/// Build the fingerprint and total extended-finger count for one frame.
pub fn build_signature(hands: &[FingerStates]) -> (PostureSignature, u32) {
    let mut bits = String::with_capacity(hands.len() * 5);
    let mut total = 0;
    for hand in hands {
        for open in hand.as_array() {
            bits.push(if open { '1' } else { '0' });
        }
        total += hand.extended_count();
    }
    (PostureSignature(bits), total)
}
