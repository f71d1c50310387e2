//! Where stability events go.
//!
//! The sink is the display/speech side of the system.  [`Recognizer`] binds a
//! filter to a sink so that each frame's event is delivered synchronously,
//! inside the same call that produced it.

use crate::landmarks::HandObservation;
use crate::stability::{StabilityEvent, StabilityFilter};

/// Consumer of stability events.
pub trait OutputSink {
    /// A new stable count: show it, speak `word`, pulse the highlight.
    fn announce(&mut self, count: u32, word: &str);
    /// Hands left the frame: restore the placeholder readout.
    fn clear(&mut self);
}

/// Route one event to the matching sink operation.
pub fn dispatch(event: &StabilityEvent, sink: &mut dyn OutputSink) {
    match event {
        StabilityEvent::Stable { count, word } => sink.announce(*count, word),
        StabilityEvent::Cleared                => sink.clear(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingSink
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkCall {
    Announce { count: u32, word: String },
    Clear,
}

/// Sink that remembers every call, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn announcements(&self) -> impl Iterator<Item = (u32, &str)> {
        self.calls.iter().filter_map(|c| match c {
            SinkCall::Announce { count, word } => Some((*count, word.as_str())),
            SinkCall::Clear                    => None,
        })
    }
}

impl OutputSink for RecordingSink {
    fn announce(&mut self, count: u32, word: &str) {
        self.calls.push(SinkCall::Announce { count, word: word.to_string() });
    }
    fn clear(&mut self) {
        self.calls.push(SinkCall::Clear);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Recognizer
// ════════════════════════════════════════════════════════════════════════════

/// A stability filter wired to its sink.
pub struct Recognizer<S: OutputSink> {
    filter: StabilityFilter,
    sink:   S,
}

impl<S: OutputSink> Recognizer<S> {
    pub fn new(filter: StabilityFilter, sink: S) -> Self {
        Recognizer { filter, sink }
    }

    /// Run one frame through the filter and hand any event to the sink.
    pub fn process(&mut self, hands: &[HandObservation]) -> Option<StabilityEvent> {
        let event = self.filter.process_frame(hands)?;
        dispatch(&event, &mut self.sink);
        Some(event)
    }

    pub fn filter(&self)       -> &StabilityFilter { &self.filter }
    pub fn sink(&self)         -> &S               { &self.sink }
    pub fn sink_mut(&mut self) -> &mut S           { &mut self.sink }

    pub fn into_sink(self) -> S { self.sink }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_maps_variants() {
        let mut sink = RecordingSink::default();
        dispatch(&StabilityEvent::Stable { count: 3, word: "Tiga".into() }, &mut sink);
        dispatch(&StabilityEvent::Cleared, &mut sink);
        assert_eq!(sink.calls, vec![
            SinkCall::Announce { count: 3, word: "Tiga".into() },
            SinkCall::Clear,
        ]);
    }

    #[test]
    fn recognizer_is_quiet_without_hands() {
        let mut r = Recognizer::new(StabilityFilter::default(), RecordingSink::default());
        for _ in 0..10 { assert!(r.process(&[]).is_none()); }
        assert!(r.sink().calls.is_empty());
    }
}
