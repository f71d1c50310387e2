//! Spoken announcements on a background thread.
//!
//! Speech has overwrite semantics: a new utterance cancels whatever is still
//! playing, and commands that pile up while the thread is busy collapse to
//! the most recent one.

use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// SpeechCommand
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechCommand {
    /// Speak this text, interrupting the current utterance.
    Say(String),
    /// Terminate the thread.
    Quit,
}

/// Settings for the external text-to-speech program.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// Executable, e.g. `espeak-ng`.
    pub command: String,
    /// Voice / language code passed with `-v`.
    pub voice:   String,
    /// Relative speaking rate; 1.0 is the engine default.
    pub rate:    f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            enabled: true,
            command: "espeak-ng".to_string(),
            voice:   "id".to_string(),
            rate:    1.3,
        }
    }
}

/// espeak speaks 175 words per minute at rate 1.0.
pub fn words_per_minute(rate: f32) -> u32 {
    // f32 puts 175 × 1.3 just under 227.5.
    (175.0_f64 * f64::from(rate.max(0.1))).round() as u32
}

// ════════════════════════════════════════════════════════════════════════════
// SpeechOut — abstraction over a TTS process / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub trait SpeechOut: Send {
    fn speak(&mut self, text: &str);
    fn cancel(&mut self);
}

// ── external process backend ──────────────────────────────────────────────

struct ProcessSpeech {
    config: SpeechConfig,
    child:  Option<Child>,
}

impl SpeechOut for ProcessSpeech {
    fn speak(&mut self, text: &str) {
        self.cancel();
        let spawned = Command::new(&self.config.command)
            .arg("-v").arg(&self.config.voice)
            .arg("-s").arg(words_per_minute(self.config.rate).to_string())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.child = Some(child),
            Err(e)    => warn!(command = %self.config.command, error = %e, "speech command failed"),
        }
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Drop for ProcessSpeech {
    fn drop(&mut self) { self.cancel(); }
}

// ── null backend (used when no speech engine is available) ────────────────

struct NullSpeech;
impl SpeechOut for NullSpeech {
    fn speak(&mut self, text: &str) { debug!(text, "speech disabled"); }
    fn cancel(&mut self) {}
}

/// Pick a backend: the configured command if it runs, otherwise silence.
fn open_speech_output(config: &SpeechConfig) -> Box<dyn SpeechOut> {
    if !config.enabled {
        info!("speech disabled by configuration");
        return Box::new(NullSpeech);
    }
    let version_check = Command::new(&config.command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match version_check {
        Ok(_) => {
            info!(command = %config.command, voice = %config.voice, "speech engine ready");
            Box::new(ProcessSpeech { config: config.clone(), child: None })
        }
        Err(e) => {
            warn!(command = %config.command, error = %e, "speech engine unavailable, announcements will be silent");
            Box::new(NullSpeech)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Speaker — handle to the speech thread
// ════════════════════════════════════════════════════════════════════════════

pub struct Speaker {
    cmd_tx: Sender<SpeechCommand>,
    handle: Option<JoinHandle<()>>,
}

impl Speaker {
    /// Spawn the speech thread with the backend described by `config`.
    pub fn spawn(config: &SpeechConfig) -> Self {
        let config = config.clone();
        Self::spawn_with(move || open_speech_output(&config))
    }

    /// Spawn with a caller-supplied backend, built on the speech thread.
    pub fn spawn_with<F>(make_out: F) -> Self
    where
        F: FnOnce() -> Box<dyn SpeechOut> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SpeechCommand>();
        let handle = thread::spawn(move || speaker_thread(make_out(), cmd_rx));
        Speaker { cmd_tx, handle: Some(handle) }
    }

    pub fn say(&self, text: &str) {
        let _ = self.cmd_tx.send(SpeechCommand::Say(text.to_string()));
    }

    /// Stop the thread and wait for it to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(SpeechCommand::Quit);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Speaker {
    fn drop(&mut self) { self.stop(); }
}

/// Collapse everything already queued behind `first` into the command that
/// should actually run: `Quit` wins, otherwise the newest command.
fn latest_command(first: SpeechCommand, rx: &Receiver<SpeechCommand>) -> SpeechCommand {
    let mut latest = first;
    while let Ok(next) = rx.try_recv() {
        if latest == SpeechCommand::Quit { continue; }
        latest = next;
    }
    latest
}

fn speaker_thread(mut out: Box<dyn SpeechOut>, rx: Receiver<SpeechCommand>) {
    while let Ok(first) = rx.recv() {
        match latest_command(first, &rx) {
            SpeechCommand::Say(text) => {
                out.cancel();
                out.speak(&text);
            }
            SpeechCommand::Quit   => break,
        }
    }
    out.cancel();
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
