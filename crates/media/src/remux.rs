//! Remuxing the enhanced audio back into the visual track.
//!
//! Runs ffmpeg with `-progress pipe:1` and parses its key/value progress
//! stream into a normalized [0, 1] fraction of the expected duration.
//! Progress is best-effort: unrecognized lines are ignored, never surfaced
//! as errors.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};

use clearcast_common::error::{ClearcastError, ClearcastResult};

/// Progress callback invoked with a fraction in [0.0, 1.0].
pub type ProgressCallback = Box<dyn Fn(f64) + Send + Sync>;

/// A remux operation ready to run.
#[derive(Debug)]
pub struct RemuxRequest<'a> {
    /// Source video whose visual track is kept.
    pub video_path: &'a Path,

    /// Replacement audio (WAV).
    pub audio_path: &'a Path,

    /// Output container path.
    pub output_path: &'a Path,

    /// Codec for the output video stream ("copy" to remux without re-encode).
    pub video_codec: &'a str,

    /// Codec for the output audio stream.
    pub audio_codec: &'a str,

    /// Expected output duration, used to normalize progress.
    pub expected_duration_secs: f64,
}

/// Merge the visual track of `video_path` with `audio_path` into
/// `output_path`.
pub fn remux(request: &RemuxRequest<'_>, progress: Option<ProgressCallback>) -> ClearcastResult<()> {
    tracing::info!(
        video = %request.video_path.display(),
        audio = %request.audio_path.display(),
        output = %request.output_path.display(),
        video_codec = request.video_codec,
        audio_codec = request.audio_codec,
        "Starting remux"
    );

    let mut cmd = Command::new("ffmpeg");
    cmd.args([
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostats",
        "-progress",
        "pipe:1",
        "-i",
    ])
    .arg(request.video_path)
    .arg("-i")
    .arg(request.audio_path)
    .args(["-map", "0:v:0", "-map", "1:a:0", "-c:v"])
    .arg(request.video_codec)
    .arg("-c:a")
    .arg(request.audio_codec)
    .arg("-shortest")
    .arg(request.output_path)
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| ClearcastError::media(format!("Failed to start ffmpeg: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ClearcastError::media("Failed to capture ffmpeg stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ClearcastError::media("Failed to capture ffmpeg stderr"))?;

    // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
    let stderr_task = std::thread::spawn(move || -> String {
        let mut reader = BufReader::new(stderr);
        let mut output = String::new();
        match reader.read_to_string(&mut output) {
            Ok(_) => output,
            Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
        }
    });

    let mut reader = BufReader::new(stdout);
    let mut line = String::new();
    let mut state = ProgressState::default();
    let mut last_progress_secs = 0.0f64;
    let mut last_progress_wall = std::time::Instant::now();

    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| ClearcastError::media(format!("Failed reading ffmpeg progress: {e}")))?;
        if bytes == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((key, value)) = trimmed.split_once('=') {
            state.update(key, value);
            if key == "progress" {
                if state.out_time_secs > last_progress_secs + 0.001 {
                    last_progress_secs = state.out_time_secs;
                    last_progress_wall = std::time::Instant::now();
                }
                if let Some(cb) = &progress {
                    cb(normalized_progress(&state, request.expected_duration_secs));
                }
                if last_progress_wall.elapsed().as_secs() >= 10 {
                    tracing::warn!(
                        out_time_secs = state.out_time_secs,
                        "No ffmpeg progress advancement for 10s"
                    );
                    last_progress_wall = std::time::Instant::now();
                }
            }
        }
    }

    let status = child
        .wait()
        .map_err(|e| ClearcastError::media(format!("Failed to wait on ffmpeg: {e}")))?;

    let stderr_output = stderr_task
        .join()
        .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

    if !status.success() {
        return Err(ClearcastError::media(format!(
            "Remux failed (status {}): {}",
            status,
            stderr_output.trim()
        )));
    }

    // Successful completion always lands exactly on 1.0.
    if let Some(cb) = &progress {
        cb(1.0);
    }

    tracing::info!(output = %request.output_path.display(), "Remux finished");
    Ok(())
}

/// Latest values seen on ffmpeg's `-progress` stream.
#[derive(Debug, Default)]
pub(crate) struct ProgressState {
    pub(crate) out_time_secs: f64,
    pub(crate) complete: bool,
}

impl ProgressState {
    pub(crate) fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_ms" => {
                if let Ok(ms) = value.parse::<f64>() {
                    self.out_time_secs = ms / 1_000_000.0;
                }
            }
            "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

pub(crate) fn normalized_progress(state: &ProgressState, expected_duration_secs: f64) -> f64 {
    if state.complete {
        return 1.0;
    }
    if expected_duration_secs <= 0.0 {
        return 0.0;
    }
    (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
}
