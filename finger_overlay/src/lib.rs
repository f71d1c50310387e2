//! # finger_overlay
//!
//! Live finger-count overlay: hand frames in, a stable number and its
//! Indonesian word out, on screen and spoken aloud.
//!
//! ## Layout
//!
//! The window shows the hand stage (landmark skeletons over a drifting
//! particle field) on the left and the readout panel on the right.  The
//! readout holds the last stable count and word, or `-` / `READY` while no
//! hands are in view, and pulses green for a moment on every new count.
//!
//! ## Frame sources
//!
//! * (default) **Simulation mode**: keyboard shortcuts shape two hands.
//! * `FINGER_REPLAY=<file>` or `--replay <file>`: JSON-lines detector output.
//! * `leap` feature, **Hardware mode**: polls a LeapMotion controller via LeapC.
//!
//! ### Keyboard shortcuts
//!
//! | Key | Action | Mode |
//! |---|---|---|
//! | `1`–`5` | Toggle right thumb … pinky | simulation |
//! | `6`–`0` | Toggle left thumb … pinky | simulation |
//! | `R` / `L` | Show or hide the right / left hand | simulation |
//! | `C` | Hide both hands | simulation |
//! | `W` | Swap the order the hands are reported in | simulation |
//! | `Space` | Camera on / off | all |
//! | `Q` / `Escape` | Quit | all |

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod particles;
pub mod readout;
pub mod source;
pub mod speech;
pub mod visualizer;
