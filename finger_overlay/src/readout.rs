//! Count readout state: the big number, its word, and the announce pulse.

use std::time::{Duration, Instant};

pub const PLACEHOLDER_NUMBER: &str = "-";
pub const PLACEHOLDER_TEXT:   &str = "READY";

/// Highlight started by an announcement; reverts once `duration` has passed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub started:  Instant,
    pub duration: Duration,
}

impl Pulse {
    /// 0.0 at the start, 1.0 once elapsed.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() { return 1.0; }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn done(&self, now: Instant) -> bool { self.progress(now) >= 1.0 }
}

/// What the count box shows.
#[derive(Clone, Debug)]
pub struct ReadoutState {
    pub number:    String,
    pub text:      String,
    pub pulse:     Option<Pulse>,
    pulse_length:  Duration,
}

impl ReadoutState {
    pub fn new(pulse_length: Duration) -> Self {
        ReadoutState {
            number:  PLACEHOLDER_NUMBER.to_string(),
            text:    PLACEHOLDER_TEXT.to_string(),
            pulse:   None,
            pulse_length,
        }
    }

    /// Show a new stable count and restart the pulse.
    pub fn announce(&mut self, count: u32, word: &str, now: Instant) {
        self.number = count.to_string();
        self.text   = word.to_string();
        self.pulse  = Some(Pulse { started: now, duration: self.pulse_length });
    }

    /// Back to the placeholder.  Any running pulse is left to finish.
    pub fn clear(&mut self) {
        self.number = PLACEHOLDER_NUMBER.to_string();
        self.text   = PLACEHOLDER_TEXT.to_string();
    }

    /// Drop the pulse once it has run out.
    pub fn tick(&mut self, now: Instant) {
        if self.pulse.is_some_and(|p| p.done(now)) {
            self.pulse = None;
        }
    }

    pub fn is_pulsing(&self) -> bool { self.pulse.is_some() }

    pub fn is_placeholder(&self) -> bool { self.number == PLACEHOLDER_NUMBER }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PULSE: Duration = Duration::from_millis(200);

    #[test]
    fn starts_ready() {
        let r = ReadoutState::new(PULSE);
        assert_eq!(r.number, "-");
        assert_eq!(r.text, "READY");
        assert!(r.is_placeholder());
    }

    #[test]
    fn pulse_reverts_after_duration() {
        let t0 = Instant::now();
        let mut r = ReadoutState::new(PULSE);
        r.announce(3, "Tiga", t0);
        assert_eq!(r.number, "3");
        r.tick(t0 + Duration::from_millis(100));
        assert!(r.is_pulsing());
        r.tick(t0 + Duration::from_millis(200));
        assert!(!r.is_pulsing());
        assert_eq!(r.text, "Tiga");
    }

    #[test]
    fn reannounce_restarts_pulse() {
        let t0 = Instant::now();
        let mut r = ReadoutState::new(PULSE);
        r.announce(1, "Satu", t0);
        let t1 = t0 + Duration::from_millis(150);
        r.announce(2, "Dua", t1);
        r.tick(t0 + Duration::from_millis(250));
        assert!(r.is_pulsing());
        assert!((r.pulse.unwrap().progress(t1) - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn clear_restores_placeholder() {
        let mut r = ReadoutState::new(PULSE);
        r.announce(10, "Sepuluh", Instant::now());
        r.clear();
        assert_eq!(r.number, "-");
        assert_eq!(r.text, "READY");
    }

    #[test]
    fn zero_length_pulse_is_done_immediately() {
        let p = Pulse { started: Instant::now(), duration: Duration::ZERO };
        assert!(p.done(p.started));
    }
}
