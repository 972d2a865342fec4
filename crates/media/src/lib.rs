//! ClearCast Media
//!
//! Subprocess wrappers around ffprobe/ffmpeg plus WAV sample I/O:
//! - **Probe:** container duration, stream layout, dimensions
//! - **Extract:** demux the audio track to a fixed-rate PCM WAV
//! - **Remux:** merge an audio file back into the visual track with
//!   structured progress reporting
//! - **WAV:** float sample buffers via hound

pub mod extract;
pub mod probe;
pub mod remux;
pub mod wav;

pub use extract::extract_audio;
pub use probe::{probe_media, MediaInfo};
pub use remux::{remux, ProgressCallback, RemuxRequest};

use std::process::Command;

/// Check whether a binary is reachable on PATH.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
