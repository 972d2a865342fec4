//! Seam over the media library so tests can substitute spies.

use std::path::Path;

use clearcast_common::error::ClearcastResult;
use clearcast_media::{MediaInfo, ProgressCallback, RemuxRequest};

/// Media operations consumed by the pipeline. All calls are blocking; the
/// orchestrator offloads them with `spawn_blocking`.
pub trait MediaOps: Send + Sync {
    fn probe(&self, path: &Path) -> ClearcastResult<MediaInfo>;

    fn extract_audio(&self, input: &Path, wav_out: &Path, sample_rate: u32)
        -> ClearcastResult<()>;

    fn remux(
        &self,
        request: &RemuxRequest<'_>,
        progress: Option<ProgressCallback>,
    ) -> ClearcastResult<()>;
}

/// Production implementation backed by ffmpeg/ffprobe subprocesses.
pub struct FfmpegMedia;

impl FfmpegMedia {
    pub fn is_available() -> bool {
        clearcast_media::command_exists("ffmpeg") && clearcast_media::command_exists("ffprobe")
    }
}

impl MediaOps for FfmpegMedia {
    fn probe(&self, path: &Path) -> ClearcastResult<MediaInfo> {
        clearcast_media::probe_media(path)
    }

    fn extract_audio(
        &self,
        input: &Path,
        wav_out: &Path,
        sample_rate: u32,
    ) -> ClearcastResult<()> {
        clearcast_media::extract_audio(input, wav_out, sample_rate)
    }

    fn remux(
        &self,
        request: &RemuxRequest<'_>,
        progress: Option<ProgressCallback>,
    ) -> ClearcastResult<()> {
        clearcast_media::remux(request, progress)
    }
}
