//! Container probing via ffprobe.

use std::path::Path;
use std::process::Command;

use clearcast_common::error::{ClearcastError, ClearcastResult};
use serde::Deserialize;

/// Probed facts about a media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Container duration in seconds.
    pub duration_secs: f64,

    /// Whether the file carries at least one audio stream.
    pub has_audio: bool,

    /// Width of the first video stream, if any.
    pub width: Option<u32>,

    /// Height of the first video stream, if any.
    pub height: Option<u32>,
}

/// Probe a media file with ffprobe.
pub fn probe_media(path: &Path) -> ClearcastResult<MediaInfo> {
    if !path.exists() {
        return Err(ClearcastError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration:stream=codec_type,width,height",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| ClearcastError::media(format!("Failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClearcastError::media(format!(
            "ffprobe failed (status {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    let raw = String::from_utf8(output.stdout)
        .map_err(|e| ClearcastError::media(format!("ffprobe output was not UTF-8: {e}")))?;
    parse_probe_output(&raw)
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    // ffprobe serializes duration as a decimal string.
    duration: Option<String>,
}

fn parse_probe_output(raw: &str) -> ClearcastResult<MediaInfo> {
    let parsed: FfprobeOutput = serde_json::from_str(raw)?;

    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| ClearcastError::media("ffprobe reported no container duration"))?;

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ClearcastError::media("No video stream found in input"))?;

    Ok(MediaInfo {
        duration_secs,
        has_audio,
        width: video.width,
        height: video.height,
    })
}
