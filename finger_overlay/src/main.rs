//! finger_overlay entry point.

use finger_overlay::app::{run, run_headless};
use finger_overlay::config::{OverlayConfig, RunMode};
use finger_overlay::logging::{init_tracing, LogConfig};
use tracing::{error, info};

fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let mut cfg = match OverlayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&LogConfig { log_level: cfg.log_level.clone() });

    let mode = match cfg.apply_args(std::env::args().skip(1)) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: finger_overlay [--replay <file.jsonl>] [--headless]");
            std::process::exit(2);
        }
    };

    if mode == RunMode::Headless {
        match run_headless(&cfg, std::io::stdout().lock()) {
            Ok(summary) => info!(?summary, "replay finished"),
            Err(e) => {
                error!(error = %e, "replay failed");
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Finger Overlay — Stable Finger Count Readout        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    match &cfg.replay {
        Some(path) => println!("  Mode: replay {}", path.display()),
        #[cfg(feature = "leap")]
        None => println!("  Mode: LeapMotion hardware"),
        #[cfg(not(feature = "leap"))]
        None => println!("  Mode: Keyboard simulation  (use --features leap for hardware)"),
    }
    println!("  Stable after {} matching frames", cfg.threshold + 1);
    println!();

    if let Err(e) = run(cfg) {
        error!(error = %e, "overlay failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
