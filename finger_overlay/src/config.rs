use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use finger_posture::{HandOrdering, DEFAULT_THRESHOLD, MAX_HANDS};

use crate::error::OverlayError;
use crate::speech::SpeechConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub threshold:      u32,
    pub hand_ordering:  HandOrdering,
    pub max_hands:      usize,
    pub pulse:          Duration,
    pub frame_interval: Duration,
    pub speech:         SpeechConfig,
    pub replay:         Option<PathBuf>,
    pub log_level:      String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            threshold:      DEFAULT_THRESHOLD,
            hand_ordering:  HandOrdering::AsReported,
            max_hands:      MAX_HANDS,
            pulse:          Duration::from_millis(200),
            frame_interval: Duration::from_millis(33),
            speech:         SpeechConfig::default(),
            replay:         None,
            log_level:      "info".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn from_env() -> Result<Self, OverlayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key → value lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OverlayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = OverlayConfig::default();
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let hand_ordering = match lookup("FINGER_HAND_ORDER") {
            None    => d.hand_ordering,
            Some(v) => parse_hand_ordering(&v)?,
        };

        let speech_enabled = match lookup("FINGER_SPEECH") {
            None    => d.speech.enabled,
            Some(v) => env_bool("FINGER_SPEECH", &v)?,
        };
        let frame_ms = parsed::<u64, _>(&lookup, "FINGER_FRAME_MS")?.unwrap_or(33);
        if frame_ms == 0 {
            return Err(OverlayError::Config { key: "FINGER_FRAME_MS", value: "0".to_string() });
        }
        let rate = parsed::<f32, _>(&lookup, "FINGER_SPEECH_RATE")?.unwrap_or(d.speech.rate);
        if !(rate.is_finite() && rate > 0.0) {
            return Err(OverlayError::Config { key: "FINGER_SPEECH_RATE", value: rate.to_string() });
        }

        Ok(OverlayConfig {
            threshold:      parsed(&lookup, "FINGER_THRESHOLD")?.unwrap_or(d.threshold),
            hand_ordering,
            max_hands:      d.max_hands,
            pulse:          Duration::from_millis(parsed::<u64, _>(&lookup, "FINGER_PULSE_MS")?.unwrap_or(200)),
            frame_interval: Duration::from_millis(frame_ms),
            speech: SpeechConfig {
                enabled: speech_enabled,
                command: or("FINGER_SPEECH_CMD", &d.speech.command),
                voice:   or("FINGER_SPEECH_LANG", &d.speech.voice),
                rate,
            },
            replay:    lookup("FINGER_REPLAY").filter(|v| !v.is_empty()).map(PathBuf::from),
            log_level: or("RUST_LOG", &d.log_level),
        })
    }

    /// Apply command-line arguments (without the program name).
    pub fn apply_args<I>(&mut self, args: I) -> Result<RunMode, OverlayError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut mode = RunMode::Window;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--replay" => match args.next() {
                    Some(path) if !path.starts_with("--") => self.replay = Some(PathBuf::from(path)),
                    _ => return Err(OverlayError::Usage("--replay needs a file path".into())),
                },
                "--headless" => mode = RunMode::Headless,
                other => return Err(OverlayError::Usage(format!("unknown argument {other:?}"))),
            }
        }
        if mode == RunMode::Headless && self.replay.is_none() {
            return Err(OverlayError::Usage("--headless needs --replay <path> or FINGER_REPLAY".into()));
        }
        Ok(mode)
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Window,
    /// Replay to stdout without opening a window.
    Headless,
}

fn parse_hand_ordering(value: &str) -> Result<HandOrdering, OverlayError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "reported" | "as_reported" => Ok(HandOrdering::AsReported),
        "handedness" | "by_handedness" => Ok(HandOrdering::ByHandedness),
        _ => Err(OverlayError::Config { key: "FINGER_HAND_ORDER", value: value.to_string() }),
    }
}

/// `Ok(None)` when unset; a set but unparsable value is an error.
fn parsed<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, OverlayError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None    => Ok(None),
        Some(v) => v.trim().parse().map(Some).map_err(|_| OverlayError::Config { key, value: v }),
    }
}

fn env_bool(key: &'static str, value: &str) -> Result<bool, OverlayError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on"  => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OverlayError::Config { key, value: value.to_string() }),
    }
}
