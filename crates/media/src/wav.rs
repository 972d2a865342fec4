//! WAV sample I/O.
//!
//! The enhancement model works on float waveforms; files on disk are 16-bit
//! PCM for encoder compatibility.

use std::path::Path;

use clearcast_common::error::{ClearcastError, ClearcastResult};

/// Read a WAV file into f32 samples in [-1.0, 1.0].
///
/// Returns the samples and the file's sample rate. Multi-channel files come
/// back interleaved.
pub fn read_samples(path: &Path) -> ClearcastResult<(Vec<f32>, u32)> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| ClearcastError::media(format!("Failed to open WAV {}: {e}", path.display())))?;
    let spec = reader.spec();

    let samples: Result<Vec<f32>, hound::Error> = match spec.sample_format {
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect(),
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect(),
            32 => reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
                .collect(),
            bits => {
                return Err(ClearcastError::media(format!(
                    "Unsupported WAV bit depth: {bits}"
                )))
            }
        },
    };

    let samples =
        samples.map_err(|e| ClearcastError::media(format!("Failed to decode WAV: {e}")))?;
    Ok((samples, spec.sample_rate))
}

/// Write f32 samples to a mono 16-bit PCM WAV at `sample_rate`.
pub fn write_samples(path: &Path, samples: &[f32], sample_rate: u32) -> ClearcastResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        ClearcastError::media(format!("Failed to create WAV {}: {e}", path.display()))
    })?;

    for &sample in samples {
        let clamped = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer
            .write_sample(clamped)
            .map_err(|e| ClearcastError::media(format!("Failed to write WAV sample: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| ClearcastError::media(format!("Failed to finalize WAV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_samples_read_back_within_quantization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let samples: Vec<f32> = (0..480)
            .map(|i| (i as f32 * 0.05).sin() * 0.8)
            .collect();
        write_samples(&path, &samples, 48_000).unwrap();

        let (decoded, rate) = read_samples(&path).unwrap();
        assert_eq!(rate, 48_000);
        assert_eq!(decoded.len(), samples.len());
        for (a, b) in samples.iter().zip(decoded.iter()) {
            assert!((a - b).abs() < 1.0 / 32000.0, "{a} vs {b}");
        }
    }

    #[test]
    fn out_of_range_samples_are_clamped_not_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        write_samples(&path, &[2.0, -2.0], 48_000).unwrap();
        let (decoded, _) = read_samples(&path).unwrap();
        assert!(decoded[0] > 0.99);
        assert!(decoded[1] < -0.99);
    }

    #[test]
    fn missing_file_is_a_media_error() {
        let err = read_samples(Path::new("/nonexistent/input.wav")).unwrap_err();
        assert!(matches!(
            err,
            clearcast_common::error::ClearcastError::Media { .. }
        ));
    }
}
