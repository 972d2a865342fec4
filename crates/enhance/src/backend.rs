//! Enhancement backends.
//!
//! A backend is the model provider; a session is the initialized model. The
//! session contract is `enhance(samples) -> samples` over float waveforms at
//! the backend's sample rate.

use std::path::PathBuf;
use std::process::Command;

use clearcast_common::error::{ClearcastError, ClearcastResult};

/// Provider of an enhancement model.
pub trait EnhancementBackend: Send + Sync + 'static {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Check whether this backend can run on the system.
    fn is_available(&self) -> bool;

    /// Initialize the model. This is the expensive call bounded by the
    /// engine's init timeout.
    fn init(&self) -> ClearcastResult<Box<dyn EnhancementSession>>;
}

/// An initialized enhancement model.
///
/// Not assumed reentrant: the engine serializes all calls.
pub trait EnhancementSession: Send + std::fmt::Debug {
    /// Sample rate the model operates at (Hz).
    fn sample_rate(&self) -> u32;

    /// Enhance a waveform. Returns a buffer in the same length/sample-rate
    /// domain as the input.
    fn enhance(&mut self, samples: &[f32]) -> ClearcastResult<Vec<f32>>;
}

/// Backend shelling out to the DeepFilterNet `deep-filter` CLI.
///
/// The model stays a true black box: samples go out as a temp WAV, the
/// binary writes the enhanced WAV next to it, and we read it back.
pub struct DeepFilterCliBackend {
    binary: String,
    sample_rate: u32,
}

impl DeepFilterCliBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            binary: "deep-filter".to_string(),
            sample_rate,
        }
    }

    pub fn with_binary(binary: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            binary: binary.into(),
            sample_rate,
        }
    }
}

impl EnhancementBackend for DeepFilterCliBackend {
    fn name(&self) -> &str {
        "deep-filter"
    }

    fn is_available(&self) -> bool {
        clearcast_media::command_exists(&self.binary)
    }

    fn init(&self) -> ClearcastResult<Box<dyn EnhancementSession>> {
        if !self.is_available() {
            return Err(ClearcastError::model_init(format!(
                "{} is not installed or not on PATH",
                self.binary
            )));
        }

        // First invocation downloads/loads the model weights, so warm it up
        // here where the init timeout applies rather than on the first job.
        let status = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| {
                ClearcastError::model_init(format!("Failed to run {}: {e}", self.binary))
            })?;
        if !status.status.success() {
            return Err(ClearcastError::model_init(format!(
                "{} --version exited with {}",
                self.binary, status.status
            )));
        }

        tracing::info!(binary = %self.binary, "DeepFilter backend initialized");
        Ok(Box::new(DeepFilterCliSession {
            binary: self.binary.clone(),
            sample_rate: self.sample_rate,
        }))
    }
}

#[derive(Debug)]
struct DeepFilterCliSession {
    binary: String,
    sample_rate: u32,
}

impl EnhancementSession for DeepFilterCliSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn enhance(&mut self, samples: &[f32]) -> ClearcastResult<Vec<f32>> {
        let workdir = tempfile::Builder::new()
            .prefix("clearcast-df-")
            .tempdir()
            .map_err(|e| anyhow::anyhow!("Failed to create deep-filter workdir: {e}"))?;

        let input_path = workdir.path().join("input.wav");
        let output_dir = workdir.path().join("out");
        std::fs::create_dir(&output_dir)?;
        clearcast_media::wav::write_samples(&input_path, samples, self.sample_rate)?;

        let output = Command::new(&self.binary)
            .arg("-o")
            .arg(&output_dir)
            .arg(&input_path)
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to run {}: {e}", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClearcastError::Other(anyhow::anyhow!(
                "{} failed (status {}): {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let enhanced_path: PathBuf = output_dir.join("input.wav");
        let (enhanced, _) = clearcast_media::wav::read_samples(&enhanced_path)?;
        Ok(enhanced)
    }
}

/// Identity backend: returns the input unchanged.
///
/// Used in tests and as an explicit no-op when no model is installed.
pub struct PassthroughBackend {
    sample_rate: u32,
}

impl PassthroughBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl EnhancementBackend for PassthroughBackend {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn init(&self) -> ClearcastResult<Box<dyn EnhancementSession>> {
        Ok(Box::new(PassthroughSession {
            sample_rate: self.sample_rate,
        }))
    }
}

#[derive(Debug)]
struct PassthroughSession {
    sample_rate: u32,
}

impl EnhancementSession for PassthroughSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn enhance(&mut self, samples: &[f32]) -> ClearcastResult<Vec<f32>> {
        Ok(samples.to_vec())
    }
}
