//! Top-level application state.
//!
//! `AppState` owns the recognizer (bound to the readout + speech sink), the
//! particle background, the camera switch and the latest detected hands.  It
//! processes `SourceMessage`s in arrival order and drives the visualizer each
//! frame.

use std::io::Write;
use std::sync::mpsc::TryRecvError;
use std::time::Instant;

use finger_posture::{HandObservation, OutputSink, Recognizer, StabilityEvent, StabilityFilter};
use tracing::{info, warn};

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::particles::ParticleField;
use crate::readout::ReadoutState;
use crate::source::{load_replay, spawn_hand_source, ReplaySource, SourceMessage};
use crate::speech::Speaker;
use crate::visualizer::{Scene, Visualizer, WindowInput, WIN_H, WIN_W};

// ════════════════════════════════════════════════════════════════════════════
// OverlaySink — production sink over readout + speech
// ════════════════════════════════════════════════════════════════════════════

pub struct OverlaySink {
    pub readout: ReadoutState,
    speaker:     Option<Speaker>,
}

impl OverlaySink {
    pub fn new(readout: ReadoutState, speaker: Option<Speaker>) -> Self {
        OverlaySink { readout, speaker }
    }
}

impl OutputSink for OverlaySink {
    fn announce(&mut self, count: u32, word: &str) {
        info!(count, word, "stable count");
        self.readout.announce(count, word, Instant::now());
        if let Some(speaker) = &self.speaker {
            speaker.say(word);
        }
    }

    fn clear(&mut self) {
        info!("hands gone");
        self.readout.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    recognizer: Recognizer<OverlaySink>,
    max_hands:  usize,
    particles:  ParticleField,
    hands:      Vec<HandObservation>,
    camera_on:  bool,
    frames:     u64,
    rejected:   u64,
    dropped:    u64,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &OverlayConfig, speaker: Option<Speaker>, particles: ParticleField) -> Self {
        let filter = StabilityFilter::new(cfg.threshold).with_ordering(cfg.hand_ordering);
        let sink   = OverlaySink::new(ReadoutState::new(cfg.pulse), speaker);
        AppState {
            recognizer: Recognizer::new(filter, sink),
            max_hands:  cfg.max_hands,
            particles,
            hands:      Vec::new(),
            camera_on:  true,
            frames:     0,
            rejected:   0,
            dropped:    0,
            status:     "Waiting for hands".to_string(),
        }
    }

    // ── process one SourceMessage ────────────────────────────────────────

    pub fn handle_message(&mut self, msg: SourceMessage) {
        match msg {
            // Capture is off: the frame never reaches the recognizer.
            SourceMessage::Frame(_) if !self.camera_on => self.dropped += 1,

            SourceMessage::Frame(raw) => {
                self.frames += 1;
                match raw.validate(self.max_hands) {
                    Ok(hands) => {
                        self.recognizer.process(&hands);
                        self.hands = hands;
                        self.status = format!(
                            "frame {}  hands {}  posture {}  confidence {}",
                            self.frames,
                            self.hands.len(),
                            display_signature(self.recognizer.filter().raw_signature().as_str()),
                            self.recognizer.filter().confidence(),
                        );
                    }
                    Err(e) => {
                        self.rejected += 1;
                        warn!(frame = self.frames, error = %e, "rejecting frame");
                        self.status = format!("frame {} rejected: {}", self.frames, e);
                    }
                }
            }

            SourceMessage::Ended { frames } => {
                info!(frames, "source ended");
                self.status = format!("source finished after {frames} frames");
            }
        }
    }

    // ── Window keys ───────────────────────────────────────────────────────

    /// Apply a window-level key.  Returns false when the app should quit.
    pub fn handle_input(&mut self, input: WindowInput) -> bool {
        match input {
            WindowInput::ToggleCamera => {
                self.set_camera(!self.camera_on);
                true
            }
            WindowInput::Quit => false,
        }
    }

    /// Switch capture on or off.  The filter keeps its state across the gap.
    pub fn set_camera(&mut self, on: bool) {
        if self.camera_on == on { return; }
        self.camera_on = on;
        if !on { self.hands.clear(); }
        info!(on, "camera toggled");
        self.status = if on { "Camera on".into() } else { "Camera off".into() };
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant, pointer: Option<(f32, f32)>) {
        self.recognizer.sink_mut().readout.tick(now);
        self.particles.set_pointer(pointer);
        self.particles.tick();
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn readout(&self)   -> &ReadoutState        { &self.recognizer.sink().readout }
    pub fn hands(&self)     -> &[HandObservation]   { &self.hands }
    pub fn particles(&self) -> &ParticleField       { &self.particles }
    pub fn camera_on(&self) -> bool                 { self.camera_on }
    pub fn frames(&self)    -> u64                  { self.frames }
    pub fn rejected(&self)  -> u64                  { self.rejected }
    pub fn dropped(&self)   -> u64                  { self.dropped }
}

fn display_signature(sig: &str) -> &str {
    if sig.is_empty() { "-" } else { sig }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the windowed application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the overlay window.
///
/// Frames come from the replay file when one is configured, otherwise from
/// the keyboard simulator (or LeapMotion with `--features leap`).
pub fn run(cfg: OverlayConfig) -> Result<(), OverlayError> {
    let (frame_rx, sim_tx) = match &cfg.replay {
        Some(path) => {
            let rx = spawn_hand_source(ReplaySource {
                path:           path.clone(),
                frame_interval: cfg.frame_interval,
            });
            (rx, None)
        }
        #[cfg(feature = "leap")]
        None => (spawn_hand_source(crate::source::LeapHandSource), None),
        #[cfg(not(feature = "leap"))]
        None => {
            let (sim_tx, sim_rx) = std::sync::mpsc::channel();
            let rx = spawn_hand_source(crate::source::SimHandSource {
                rx:             sim_rx,
                frame_interval: cfg.frame_interval,
            });
            (rx, Some(sim_tx))
        }
    };

    let mut vis = Visualizer::new(sim_tx)?;
    let speaker = Speaker::spawn(&cfg.speech);
    let mut app = AppState::new(&cfg, Some(speaker), ParticleField::new(WIN_W, WIN_H));
    let mut source_open = true;

    info!(threshold = cfg.threshold, ordering = ?cfg.hand_ordering, "overlay running");

    'main: while vis.is_open() {
        for input in vis.poll_input() {
            if !app.handle_input(input) { break 'main; }
        }

        // One recognizer invocation per received frame, in order.
        while source_open {
            match frame_rx.try_recv() {
                Ok(msg) => {
                    source_open = !matches!(msg, SourceMessage::Ended { .. });
                    app.handle_message(msg);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    source_open = false;
                    warn!(frames = app.frames(), "frame source stopped");
                    app.status = format!("source stopped after {} frames", app.frames());
                }
            }
        }

        app.tick(Instant::now(), vis.pointer());

        vis.render(&Scene {
            particles: app.particles(),
            hands:     app.hands(),
            readout:   app.readout(),
            camera_on: app.camera_on(),
            status:    &app.status,
            now:       Instant::now(),
        });
    }

    info!(frames = app.frames(), rejected = app.rejected(), dropped = app.dropped(), "overlay closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Headless replay
// ════════════════════════════════════════════════════════════════════════════

/// Sink that writes one line per event.
pub struct WriterSink<W: Write> {
    out:      W,
    pub error: Option<std::io::Error>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self { WriterSink { out, error: None } }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_none() {
            if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn announce(&mut self, count: u32, word: &str) { self.line(format_args!("{count} {word}")); }
    fn clear(&mut self)                            { self.line(format_args!("- READY")); }
}

/// Counters from a headless run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames:   usize,
    pub rejected: usize,
    pub stable:   usize,
    pub cleared:  usize,
}

/// Feed a replay file through the recognizer without a window, writing each
/// event to `out`.
pub fn run_headless<W: Write>(cfg: &OverlayConfig, out: W) -> Result<ReplaySummary, OverlayError> {
    let path = cfg.replay.as_ref().ok_or(OverlayError::Config { key: "FINGER_REPLAY", value: String::new() })?;
    let frames = load_replay(path)?;

    let filter = StabilityFilter::new(cfg.threshold).with_ordering(cfg.hand_ordering);
    let mut recognizer = Recognizer::new(filter, WriterSink::new(out));
    let mut summary = ReplaySummary::default();

    for (i, raw) in frames.into_iter().enumerate() {
        summary.frames += 1;
        let hands = match raw.validate(cfg.max_hands) {
            Ok(h)  => h,
            Err(e) => {
                warn!(frame = i + 1, error = %e, "rejecting frame");
                summary.rejected += 1;
                continue;
            }
        };
        match recognizer.process(&hands) {
            Some(StabilityEvent::Stable { .. }) => summary.stable += 1,
            Some(StabilityEvent::Cleared)       => summary.cleared += 1,
            None => {}
        }
    }

    match recognizer.into_sink().error {
        Some(e) => Err(OverlayError::Output(e)),
        None    => Ok(summary),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use finger_posture::{synthesize_hand, FingerStates, Handedness, RawFrame, RawHand};

    fn make_app() -> AppState {
        AppState::new(&OverlayConfig::default(), None, ParticleField::seeded(200, 200, 1))
    }

    fn thumb_frame() -> SourceMessage {
        let hand = synthesize_hand(Handedness::Right, FingerStates([true, false, false, false, false]), 0.3);
        SourceMessage::Frame(RawFrame::from_observations(&[hand]))
    }

    #[test]
    fn stable_posture_updates_readout() {
        let mut app = make_app();
        for _ in 0..6 { app.handle_message(thumb_frame()); }
        assert_eq!(app.readout().number, "1");
        assert_eq!(app.readout().text, "Satu");
        assert!(app.readout().is_pulsing());
    }

    #[test]
    fn empty_frame_restores_placeholder() {
        let mut app = make_app();
        for _ in 0..6 { app.handle_message(thumb_frame()); }
        app.handle_message(SourceMessage::Frame(RawFrame::empty()));
        assert!(app.readout().is_placeholder());
        assert_eq!(app.readout().text, "READY");
        assert!(app.hands().is_empty());
    }

    #[test]
    fn malformed_frame_leaves_filter_untouched() {
        let mut app = make_app();
        for _ in 0..5 { app.handle_message(thumb_frame()); }
        let bad = RawFrame { hands: vec![RawHand { handedness: "Right".into(), landmarks: vec![] }] };
        app.handle_message(SourceMessage::Frame(bad));
        assert_eq!(app.rejected(), 1);
        // The sixth good frame still completes the run.
        app.handle_message(thumb_frame());
        assert_eq!(app.readout().number, "1");
    }

    #[test]
    fn camera_off_hides_hands() {
        let mut app = make_app();
        app.handle_message(thumb_frame());
        assert_eq!(app.hands().len(), 1);
        assert!(app.handle_input(WindowInput::ToggleCamera));
        assert!(!app.camera_on());
        assert!(app.hands().is_empty());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = make_app();
        assert!(!app.handle_input(WindowInput::Quit));
    }

    #[test]
    fn camera_toggle_works_with_replayed_frames() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let SourceMessage::Frame(frame) = thumb_frame() else { unreachable!() };
        let line = serde_json::to_string(&frame).unwrap();
        for _ in 0..6 { writeln!(file, "{line}").unwrap(); }

        let replay = || spawn_hand_source(ReplaySource {
            path:           file.path().to_path_buf(),
            frame_interval: std::time::Duration::from_millis(1),
        });

        let mut app = make_app();
        app.handle_input(WindowInput::ToggleCamera);
        for msg in replay().iter() { app.handle_message(msg); }
        assert_eq!(app.dropped(), 6);
        assert_eq!(app.frames(), 0);
        assert!(app.readout().is_placeholder());

        app.handle_input(WindowInput::ToggleCamera);
        for msg in replay().iter() { app.handle_message(msg); }
        assert_eq!(app.frames(), 6);
        assert_eq!(app.readout().text, "Satu");
    }

    #[test]
    fn camera_gap_keeps_filter_state() {
        let mut app = make_app();
        for _ in 0..3 { app.handle_message(thumb_frame()); }
        app.set_camera(false);
        app.handle_message(thumb_frame());
        app.set_camera(true);
        for _ in 0..3 { app.handle_message(thumb_frame()); }
        assert_eq!(app.readout().number, "1");
    }

    #[test]
    fn source_end_is_reported() {
        let mut app = make_app();
        app.handle_message(SourceMessage::Ended { frames: 42 });
        assert_eq!(app.status, "source finished after 42 frames");
    }

    #[test]
    fn tick_ends_pulse() {
        let mut app = make_app();
        for _ in 0..6 { app.handle_message(thumb_frame()); }
        app.tick(Instant::now() + std::time::Duration::from_secs(1), None);
        assert!(!app.readout().is_pulsing());
    }

    #[test]
    fn headless_replay_writes_events() {
        use std::io::Write as _;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let SourceMessage::Frame(frame) = thumb_frame() else { unreachable!() };
        let line = serde_json::to_string(&frame).unwrap();
        for _ in 0..6 { writeln!(file, "{line}").unwrap(); }
        writeln!(file, r#"{{"hands":[{{"handedness":"Up","landmarks":[]}}]}}"#).unwrap();
        writeln!(file, r#"{{"hands":[]}}"#).unwrap();

        let cfg = OverlayConfig { replay: Some(file.path().to_path_buf()), ..OverlayConfig::default() };
        let mut out = Vec::new();
        let summary = run_headless(&cfg, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "1 Satu\n- READY\n");
        assert_eq!(summary, ReplaySummary { frames: 8, rejected: 1, stable: 1, cleared: 1 });
    }

    #[test]
    fn headless_requires_replay() {
        let err = run_headless(&OverlayConfig::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, OverlayError::Config { key: "FINGER_REPLAY", .. }));
    }
}
