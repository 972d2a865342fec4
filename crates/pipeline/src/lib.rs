//! ClearCast Pipeline
//!
//! The end-to-end denoising job: validate the input, demux its audio, run
//! the enhancement engine over the waveform, and remux the cleaned audio
//! into the original visual track. One job per submitted video; every exit
//! path cleans up the job's temp artifacts.

pub mod denoise;
pub mod job;
pub mod media_ops;
pub mod temp;

pub use denoise::{DenoisePipeline, JobNotice, PipelineHooks};
pub use job::{JobStage, JobState, ProcessingJob};
pub use media_ops::{FfmpegMedia, MediaOps};
pub use temp::TempWorkspace;
