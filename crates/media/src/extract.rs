//! Audio track extraction via ffmpeg.

use std::path::Path;
use std::process::Command;

use clearcast_common::error::{ClearcastError, ClearcastResult};

/// Demux the audio track of `input` to a mono 16-bit PCM WAV at `sample_rate`.
///
/// The caller is responsible for registering `wav_out` with its temp
/// workspace before invoking this, so a crash mid-write still gets cleaned.
pub fn extract_audio(input: &Path, wav_out: &Path, sample_rate: u32) -> ClearcastResult<()> {
    tracing::info!(
        input = %input.display(),
        output = %wav_out.display(),
        sample_rate,
        "Extracting audio track"
    );

    let output = Command::new("ffmpeg")
        .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
        .arg(input)
        .args(["-vn", "-acodec", "pcm_s16le", "-ac", "1", "-ar"])
        .arg(sample_rate.to_string())
        .arg(wav_out)
        .output()
        .map_err(|e| ClearcastError::media(format!("Failed to start ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClearcastError::media(format!(
            "Audio extraction failed (status {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}
