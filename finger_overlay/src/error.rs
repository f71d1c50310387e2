//! Driver-level failures.  Frame rejections live in `finger_posture::FrameError`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("window: {0}")]
    Window(String),

    #[error("replay {}: {source}", path.display())]
    Replay {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },

    #[error("usage: {0}")]
    Usage(String),

    #[error("output: {0}")]
    Output(#[from] std::io::Error),
}
