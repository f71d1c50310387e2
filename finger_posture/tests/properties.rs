use finger_posture::{
    build_signature, extract_finger_states, synthesize_hand, FingerStates, HandObservation,
    Handedness, Point2, PostureSignature, StabilityEvent, StabilityFilter, LANDMARK_COUNT,
};
use proptest::prelude::*;

fn point() -> impl Strategy<Value = Point2> {
    (0.0_f32..1.0, 0.0_f32..1.0).prop_map(|(x, y)| Point2::new(x, y))
}

fn handedness() -> impl Strategy<Value = Handedness> {
    prop_oneof![Just(Handedness::Left), Just(Handedness::Right)]
}

fn observation() -> impl Strategy<Value = HandObservation> {
    (prop::collection::vec(point(), LANDMARK_COUNT), handedness())
        .prop_map(|(pts, h)| HandObservation::from_slice(&pts, h).unwrap())
}

fn states() -> impl Strategy<Value = FingerStates> {
    prop::array::uniform5(any::<bool>()).prop_map(FingerStates)
}

fn frame_of(s: FingerStates) -> Option<(PostureSignature, u32)> {
    Some(build_signature(&[s]))
}

proptest! {
    #[test]
    fn pt_extraction_is_pure(hand in observation()) {
        prop_assert_eq!(extract_finger_states(&hand), extract_finger_states(&hand.clone()));
    }

    #[test]
    fn pt_signature_is_pure_and_counts_bits(hands in prop::collection::vec(states(), 0..=2)) {
        let (sig, total) = build_signature(&hands);
        prop_assert_eq!(build_signature(&hands), (sig.clone(), total));
        prop_assert_eq!(sig.as_str().len(), hands.len() * 5);
        prop_assert_eq!(sig.as_str().chars().filter(|&c| c == '1').count() as u32, total);
        prop_assert!(total <= 10);
    }

    #[test]
    fn pt_synthesized_hands_round_trip(s in states(), h in handedness(), cx in 0.2_f32..0.8) {
        prop_assert_eq!(extract_finger_states(&synthesize_hand(h, s, cx)), s);
    }

    #[test]
    fn pt_change_resets_confidence(seq in prop::collection::vec(states(), 1..60)) {
        let mut f = StabilityFilter::default();
        let mut prev: Option<FingerStates> = None;
        for s in seq {
            f.observe(frame_of(s));
            if prev.is_some_and(|p| p != s) {
                prop_assert_eq!(f.confidence(), 0);
            }
            prev = Some(s);
        }
    }

    #[test]
    fn pt_short_runs_never_stabilise(
        runs in prop::collection::vec((states(), 1_usize..=5), 1..20),
    ) {
        // Merge adjacent equal runs so no posture holds longer than 5 frames.
        let mut frames: Vec<FingerStates> = Vec::new();
        for (s, len) in runs {
            if frames.last() == Some(&s) { continue; }
            frames.extend(std::iter::repeat(s).take(len));
        }
        let mut f = StabilityFilter::default();
        for s in frames {
            prop_assert!(f.observe(frame_of(s)).is_none());
        }
    }

    #[test]
    fn pt_hold_fires_once(s in states(), k in 6_usize..40) {
        let mut f = StabilityFilter::default();
        let events: Vec<_> = (0..k).filter_map(|_| f.observe(frame_of(s))).collect();
        prop_assert_eq!(events.len(), 1);
        let is_stable = matches!(&events[0], StabilityEvent::Stable { count, .. } if *count == s.extended_count());
        prop_assert!(is_stable);
    }

    #[test]
    fn pt_at_most_one_clear_per_departure(
        s in states(), hold in 6_usize..12, empties in 1_usize..10,
    ) {
        let mut f = StabilityFilter::default();
        for _ in 0..hold { f.observe(frame_of(s)); }
        let cleared = (0..empties)
            .filter(|_| f.observe(None) == Some(StabilityEvent::Cleared))
            .count();
        prop_assert_eq!(cleared, 1);
    }
}
