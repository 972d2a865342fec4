//! The denoising pipeline orchestrator.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clearcast_common::config::{LimitsConfig, MediaConfig};
use clearcast_common::error::{ClearcastError, ClearcastResult};
use clearcast_enhance::EnhancementEngine;
use clearcast_media::RemuxRequest;

use crate::job::{JobStage, ProcessingJob};
use crate::media_ops::MediaOps;
use crate::temp::TempWorkspace;

/// Per-job progress fraction in [0.0, 1.0].
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Per-job notices surfaced to the caller.
pub type NoticeFn = Arc<dyn Fn(JobNotice) + Send + Sync>;

/// Events a caller may want to relay to the submitting user.
#[derive(Debug, Clone, PartialEq)]
pub enum JobNotice {
    /// The job entered a new stage.
    Stage(JobStage),

    /// The source is longer than the configured ceiling; processing will
    /// take a while but proceeds.
    LongInput { duration_secs: f64 },
}

/// Callbacks observed by a single job.
#[derive(Default)]
pub struct PipelineHooks {
    pub progress: Option<ProgressFn>,
    pub notice: Option<NoticeFn>,
}

impl PipelineHooks {
    pub fn none() -> Self {
        Self::default()
    }

    fn notify(&self, notice: JobNotice) {
        if let Some(cb) = &self.notice {
            cb(notice);
        }
    }
}

/// The video denoising pipeline.
///
/// Stateless across jobs apart from the shared enhancement engine; safe to
/// drive from concurrent tasks.
pub struct DenoisePipeline {
    media: Arc<dyn MediaOps>,
    engine: Arc<EnhancementEngine>,
    limits: LimitsConfig,
    codecs: MediaConfig,
}

impl DenoisePipeline {
    pub fn new(
        media: Arc<dyn MediaOps>,
        engine: Arc<EnhancementEngine>,
        limits: LimitsConfig,
        codecs: MediaConfig,
    ) -> Self {
        Self {
            media,
            engine,
            limits,
            codecs,
        }
    }

    /// Run one video through the full pipeline.
    ///
    /// On success the output file exists at `output` and the returned path
    /// points at it. On any failure the partial output is removed. Temp
    /// artifacts are cleaned on every exit path before this returns.
    pub async fn denoise_video(
        &self,
        input: &Path,
        output: &Path,
        hooks: &PipelineHooks,
    ) -> ClearcastResult<PathBuf> {
        let mut job = ProcessingJob::new(input, output);
        let mut workspace = TempWorkspace::create()?;

        let result = self.run_stages(&mut job, &mut workspace, hooks).await;
        workspace.cleanup();

        match &result {
            Ok(path) => {
                job.complete();
                tracing::info!(job = job.id, output = %path.display(), "Video processing completed");
            }
            Err(err) => {
                job.fail(err.to_string());
                remove_partial_output(&job.output_path);
            }
        }

        result
    }

    async fn run_stages(
        &self,
        job: &mut ProcessingJob,
        workspace: &mut TempWorkspace,
        hooks: &PipelineHooks,
    ) -> ClearcastResult<PathBuf> {
        hooks.notify(JobNotice::Stage(JobStage::Validating));

        let metadata = match tokio::fs::metadata(&job.input_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClearcastError::FileNotFound {
                    path: job.input_path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        job.size_bytes = metadata.len();

        // Size ceiling is enforced before any decode work happens.
        if job.size_bytes > self.limits.max_file_size_bytes {
            return Err(ClearcastError::InputTooLarge {
                size_bytes: job.size_bytes,
                limit_bytes: self.limits.max_file_size_bytes,
            });
        }

        tracing::info!(
            job = job.id,
            input = %job.input_path.display(),
            size_mb = job.size_bytes as f64 / (1024.0 * 1024.0),
            "Starting video processing"
        );

        let info = {
            let media = Arc::clone(&self.media);
            let input = job.input_path.clone();
            run_blocking(move || media.probe(&input)).await??
        };

        if !info.has_audio {
            return Err(ClearcastError::NoAudioTrack);
        }
        job.duration_secs = info.duration_secs;

        if info.duration_secs > self.limits.long_input_warning_secs {
            tracing::warn!(
                job = job.id,
                duration_secs = info.duration_secs,
                "Long video detected, processing may take several minutes"
            );
            hooks.notify(JobNotice::LongInput {
                duration_secs: info.duration_secs,
            });
        }

        job.advance(JobStage::Extracting);
        hooks.notify(JobNotice::Stage(JobStage::Extracting));

        let wav_path = workspace.register("audio.wav");
        {
            let media = Arc::clone(&self.media);
            let input = job.input_path.clone();
            let wav = wav_path.clone();
            let rate = self.codecs.audio_sample_rate;
            run_blocking(move || media.extract_audio(&input, &wav, rate)).await??;
        }

        job.advance(JobStage::Enhancing);
        hooks.notify(JobNotice::Stage(JobStage::Enhancing));

        let (samples, sample_rate) = {
            let wav = wav_path.clone();
            run_blocking(move || clearcast_media::wav::read_samples(&wav)).await??
        };
        let enhanced = self.engine.enhance(samples).await?;

        let enhanced_path = workspace.register("enhanced.wav");
        {
            let path = enhanced_path.clone();
            run_blocking(move || clearcast_media::wav::write_samples(&path, &enhanced, sample_rate))
                .await??;
        }

        job.advance(JobStage::Remuxing);
        hooks.notify(JobNotice::Stage(JobStage::Remuxing));

        {
            let media = Arc::clone(&self.media);
            let video = job.input_path.clone();
            let audio = enhanced_path.clone();
            let out = job.output_path.clone();
            let video_codec = self.codecs.output_video_codec.clone();
            let audio_codec = self.codecs.output_audio_codec.clone();
            let duration = job.duration_secs;
            let progress = hooks.progress.as_ref().map(|p| monotonic(Arc::clone(p)));
            run_blocking(move || {
                media.remux(
                    &RemuxRequest {
                        video_path: &video,
                        audio_path: &audio,
                        output_path: &out,
                        video_codec: &video_codec,
                        audio_codec: &audio_codec,
                        expected_duration_secs: duration,
                    },
                    progress,
                )
            })
            .await??;
        }

        job.advance(JobStage::Delivering);
        hooks.notify(JobNotice::Stage(JobStage::Delivering));

        Ok(job.output_path.clone())
    }
}

async fn run_blocking<T, F>(f: F) -> ClearcastResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ClearcastError::Other(anyhow::anyhow!("Worker task failed: {e}")))
}

fn remove_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial output"),
    }
}

/// Wrap a progress callback so forwarded values never decrease.
///
/// The underlying encoder's reports are best-effort and may jitter; the
/// caller is promised a monotonic sequence in [0, 1].
fn monotonic(inner: ProgressFn) -> clearcast_media::ProgressCallback {
    let highest = Mutex::new(f64::NEG_INFINITY);
    Box::new(move |value| {
        let clamped = value.clamp(0.0, 1.0);
        let mut guard = highest.lock().unwrap_or_else(|p| p.into_inner());
        if clamped >= *guard {
            *guard = clamped;
            inner(clamped);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect_forwarded(raw: &[f64]) -> Vec<f64> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let guard = monotonic(Arc::new(move |v| sink.lock().unwrap().push(v)));
        for &v in raw {
            guard(v);
        }
        let out = seen.lock().unwrap().clone();
        out
    }

    #[test]
    fn decreasing_reports_are_dropped() {
        let forwarded = collect_forwarded(&[0.2, 0.5, 0.3, 0.5, 0.9, 1.0]);
        assert_eq!(forwarded, vec![0.2, 0.5, 0.5, 0.9, 1.0]);
    }

    proptest! {
        #[test]
        fn forwarded_progress_is_monotonic_and_bounded(values in prop::collection::vec(-0.5f64..1.5, 0..64)) {
            let forwarded = collect_forwarded(&values);
            for window in forwarded.windows(2) {
                prop_assert!(window[0] <= window[1]);
            }
            for v in forwarded {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
