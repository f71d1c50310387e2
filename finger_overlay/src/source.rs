//! Hand-frame acquisition: keyboard simulation, JSON-lines replay, and
//! LeapMotion hardware.
//!
//! Every source runs on its own thread and delivers [`SourceMessage`]s over a
//! `mpsc` channel, one message per captured frame.  The consumer processes
//! them strictly in order, so the recognizer never sees overlapping frames.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use finger_posture::{synthesize_hand, FingerStates, Handedness, RawFrame};
use tracing::{info, warn};

use crate::error::OverlayError;

// ════════════════════════════════════════════════════════════════════════════
// SourceMessage
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceMessage {
    /// Detector output for one video frame.
    Frame(RawFrame),
    /// A finite source delivered its last frame.
    Ended { frames: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver hand frames over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>);
}

/// Spawn a source on its own thread and return the receiving end.
pub fn spawn_hand_source<S: HandSource>(source: S) -> Receiver<SourceMessage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Which simulated hand a key acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimHand { Right, Left }

/// Raw input from the visualizer window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// Flip one finger (0 = thumb … 4 = pinky); shows the hand if hidden.
    ToggleFinger { hand: SimHand, finger: usize },
    /// Show or hide one hand.
    ToggleHand(SimHand),
    /// Hide both hands.
    ClearHands,
    /// Report the two hands in the opposite order.
    SwapOrder,
}

/// Posture held by the simulator between key presses.
#[derive(Clone, Debug, PartialEq)]
pub struct SimState {
    pub right:      Option<FingerStates>,
    pub left:       Option<FingerStates>,
    pub left_first: bool,
}

impl Default for SimState {
    fn default() -> Self {
        SimState { right: None, left: None, left_first: false }
    }
}

impl SimState {
    fn slot(&mut self, hand: SimHand) -> &mut Option<FingerStates> {
        match hand {
            SimHand::Right => &mut self.right,
            SimHand::Left  => &mut self.left,
        }
    }

    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::ToggleFinger { hand, finger } => {
                let states = self.slot(hand).get_or_insert_with(FingerStates::default);
                if let Some(open) = states.0.get_mut(finger) {
                    *open = !*open;
                }
            }
            SimInput::ToggleHand(hand) => {
                let slot = self.slot(hand);
                *slot = if slot.is_some() { None } else { Some(FingerStates::default()) };
            }
            SimInput::ClearHands => {
                self.right = None;
                self.left  = None;
            }
            SimInput::SwapOrder => self.left_first = !self.left_first,
        }
    }

    /// Synthesize the detector output for the current posture.
    pub fn frame(&self) -> RawFrame {
        let right = self.right.map(|s| synthesize_hand(Handedness::Right, s, 0.32));
        let left  = self.left.map(|s| synthesize_hand(Handedness::Left, s, 0.68));
        let ordered = if self.left_first { [left, right] } else { [right, left] };
        let hands: Vec<_> = ordered.into_iter().flatten().collect();
        RawFrame::from_observations(&hands)
    }
}

/// Hand source driven by [`SimInput`] events from the visualizer's window.
///
/// Emits the held posture once per `frame_interval` until the input side
/// hangs up.
pub struct SimHandSource {
    pub rx:             Receiver<SimInput>,
    pub frame_interval: Duration,
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>) {
        let mut state = SimState::default();
        let mut next_frame = Instant::now();

        loop {
            let wait = next_frame.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(input) => state.apply(input),
                Err(RecvTimeoutError::Timeout) => {
                    next_frame += self.frame_interval;
                    if tx.send(SourceMessage::Frame(state.frame())).is_err() {
                        return;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — recorded detector output
// ════════════════════════════════════════════════════════════════════════════

/// Parse a JSON-lines recording: one [`RawFrame`] per line.
///
/// Blank lines and `#` comments are ignored; unparsable lines are logged and
/// skipped so one bad record does not end the replay.
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<RawFrame>, std::io::Error> {
    let mut frames = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<RawFrame>(trimmed) {
            Ok(frame) => frames.push(frame),
            Err(e)    => warn!(line = n + 1, error = %e, "skipping unparsable replay line"),
        }
    }
    Ok(frames)
}

/// Open and parse a replay file.
pub fn load_replay(path: &PathBuf) -> Result<Vec<RawFrame>, OverlayError> {
    let file = File::open(path).map_err(|source| OverlayError::Replay { path: path.clone(), source })?;
    read_frames(BufReader::new(file)).map_err(|source| OverlayError::Replay { path: path.clone(), source })
}

/// Plays a recording back at a fixed frame rate.
pub struct ReplaySource {
    pub path:           PathBuf,
    pub frame_interval: Duration,
}

impl HandSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>) {
        let frames = match load_replay(&self.path) {
            Ok(f)  => f,
            Err(e) => {
                warn!(error = %e, "replay unavailable");
                return;
            }
        };
        let total = frames.len();
        info!(path = %self.path.display(), frames = total, "replaying");
        for frame in frames {
            if tx.send(SourceMessage::Frame(frame)).is_err() { return; }
            thread::sleep(self.frame_interval);
        }
        info!("replay finished");
        let _ = tx.send(SourceMessage::Ended { frames: total });
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand source backed by a LeapMotion controller.
///
/// Leap joints (millimetres, y up) are projected onto the image plane as if
/// the sensor were a camera looking up at the hands: x spans ±200 mm, y spans
/// 50–450 mm, and image `y` grows downward.  Each digit contributes its four
/// bone ends in MediaPipe order, with the palm centre standing in for the
/// wrist.
#[cfg(feature = "leap")]
pub struct LeapHandSource;

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>) {
        use finger_posture::{Point2, RawHand};
        use leaprs::*;

        fn project(x: f32, y: f32) -> Point2 {
            Point2::new(0.5 + x / 400.0, 1.0 - (y - 50.0) / 400.0)
        }

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                warn!(error = ?e, "failed to create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            warn!(error = ?e, "failed to open LeapMotion device");
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame
                    .hands()
                    .take(finger_posture::MAX_HANDS)
                    .map(|hand| {
                        let palm = hand.palm().position();
                        let mut landmarks = vec![project(palm.x, palm.y)];
                        for digit in hand.digits() {
                            for joint in [
                                digit.metacarpal().next_joint(),
                                digit.proximal().next_joint(),
                                digit.intermediate().next_joint(),
                                digit.distal().next_joint(),
                            ] {
                                landmarks.push(project(joint.x, joint.y));
                            }
                        }
                        let handedness = if hand.hand_type() == HandType::Left { "Left" } else { "Right" };
                        RawHand { handedness: handedness.to_string(), landmarks }
                    })
                    .collect();

                if tx.send(SourceMessage::Frame(RawFrame { hands })).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use finger_posture::{extract_finger_states, MAX_HANDS};
    use std::io::Write;

    #[test]
    fn toggling_a_finger_reveals_the_hand() {
        let mut s = SimState::default();
        s.apply(SimInput::ToggleFinger { hand: SimHand::Right, finger: 0 });
        let hands = s.frame().validate(MAX_HANDS).unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].handedness, Handedness::Right);
        assert_eq!(extract_finger_states(&hands[0]).0, [true, false, false, false, false]);
    }

    #[test]
    fn swap_reverses_report_order() {
        let mut s = SimState::default();
        s.apply(SimInput::ToggleHand(SimHand::Right));
        s.apply(SimInput::ToggleHand(SimHand::Left));
        let order = |s: &SimState| -> Vec<String> {
            s.frame().hands.into_iter().map(|h| h.handedness).collect()
        };
        assert_eq!(order(&s), vec!["Right", "Left"]);
        s.apply(SimInput::SwapOrder);
        assert_eq!(order(&s), vec!["Left", "Right"]);
    }

    #[test]
    fn clear_hides_both_hands() {
        let mut s = SimState::default();
        s.apply(SimInput::ToggleHand(SimHand::Left));
        s.apply(SimInput::ClearHands);
        assert!(s.frame().hands.is_empty());
    }

    #[test]
    fn sim_source_emits_frames_until_input_closes() {
        let (in_tx, in_rx) = mpsc::channel();
        let rx = spawn_hand_source(SimHandSource { rx: in_rx, frame_interval: Duration::from_millis(1) });
        in_tx.send(SimInput::ToggleHand(SimHand::Right)).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(first, SourceMessage::Frame(_)));
        drop(in_tx);
        // The thread exits, so the frame channel drains and closes.
        assert!(rx.iter().all(|m| matches!(m, SourceMessage::Frame(_))));
    }

    #[test]
    fn replay_source_reports_its_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"hands":[]}}"#).unwrap();
        writeln!(file, r#"{{"hands":[]}}"#).unwrap();
        let rx = spawn_hand_source(ReplaySource {
            path:           file.path().to_path_buf(),
            frame_interval: Duration::from_millis(1),
        });
        let messages: Vec<_> = rx.iter().collect();
        assert_eq!(messages, vec![
            SourceMessage::Frame(RawFrame::empty()),
            SourceMessage::Frame(RawFrame::empty()),
            SourceMessage::Ended { frames: 2 },
        ]);
    }

    #[test]
    fn replay_skips_comments_and_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# recorded session").unwrap();
        writeln!(file, r#"{{"hands":[]}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, "{{}}").unwrap();
        let frames = load_replay(&file.path().to_path_buf()).unwrap();
        assert_eq!(frames, vec![RawFrame::empty(), RawFrame::empty()]);
    }

    #[test]
    fn missing_replay_is_an_error() {
        let err = load_replay(&PathBuf::from("/nonexistent/frames.jsonl")).unwrap_err();
        assert!(matches!(err, OverlayError::Replay { .. }));
    }
}
