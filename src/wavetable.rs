//! Wavetable resolution: any source becomes a flat sequence of
//! peak-normalized, fixed-size frames.

use std::f64::consts::TAU;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::Path;
use std::path::PathBuf;

use crate::preset::WavetableSpec;

/// Number of samples per wavetable frame.
pub const FRAME_SIZE: usize = 2048;

/// Frames whose peak stays below this value are considered silent and left
/// untouched by normalization.
pub const SILENCE_PEAK: f64 = 1e-10;

/// Resolves a wavetable source into normalized frames.
///
/// The result's length is always an exact multiple of [`FRAME_SIZE`]. Every
/// frame is normalized independently: its peak magnitude becomes 1.0 unless
/// the frame is silent (peak below [`SILENCE_PEAK`]), in which case it is
/// passed through unchanged.
///
/// # Examples
///
/// ```
/// # use wavesmith::preset::WavetableSpec;
/// # use wavesmith::wavetable::{self, FRAME_SIZE};
/// let spec = WavetableSpec::from_fn(|phase, _| 0.25 * phase.sin(), 1);
/// let samples = wavetable::resolve(&spec).unwrap();
///
/// assert_eq!(samples.len(), FRAME_SIZE);
/// let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
/// assert!((peak - 1.0).abs() < 1e-6);
/// ```
pub fn resolve(spec: &WavetableSpec) -> Result<Vec<f32>, WavetableError> {
    match spec {
        WavetableSpec::Function { shape, n_frames } => Ok(render_frames(shape, *n_frames)),
        WavetableSpec::Samples(samples) => Ok(reframe(samples)),
        WavetableSpec::AudioFile(path) => Ok(reframe(&decode_first_channel(path)?)),
    }
}

fn render_frames(shape: &(dyn Fn(f64, f64) -> f64 + Send + Sync), n_frames: u16) -> Vec<f32> {
    let mut resolved = Vec::with_capacity(usize::from(n_frames) * FRAME_SIZE);
    let last_frame = f64::from(n_frames.saturating_sub(1).max(1));

    for frame in 0..n_frames {
        let morph = f64::from(frame) / last_frame;
        let mut samples: Vec<f64> = (0..FRAME_SIZE)
            .map(|i| shape(i as f64 * TAU / FRAME_SIZE as f64, morph))
            .collect();
        normalize_frame(&mut samples);
        resolved.extend(samples.into_iter().map(|s| s as f32));
    }

    resolved
}

/// Truncates to the largest whole number of frames (never pads) and
/// normalizes each frame.
fn reframe(samples: &[f64]) -> Vec<f32> {
    let n_frames = samples.len() / FRAME_SIZE;
    let mut resolved = Vec::with_capacity(n_frames * FRAME_SIZE);

    for chunk in samples[..n_frames * FRAME_SIZE].chunks_exact(FRAME_SIZE) {
        let mut frame = chunk.to_vec();
        normalize_frame(&mut frame);
        resolved.extend(frame.into_iter().map(|s| s as f32));
    }

    resolved
}

fn normalize_frame(frame: &mut [f64]) {
    let peak = frame.iter().fold(0.0f64, |peak, s| peak.max(s.abs()));
    if peak < SILENCE_PEAK {
        return;
    }
    for sample in frame {
        *sample /= peak;
    }
}

/// Decodes the first channel of a WAV file into `[-1.0, 1.0]` floats.
///
/// Integer PCM is scaled by the declared bit width's maximum magnitude; float
/// data is taken as-is. The declared sample format decides, not the data's
/// magnitude.
fn decode_first_channel(path: &Path) -> Result<Vec<f64>, WavetableError> {
    let file_error = |source| WavetableError::File {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = hound::WavReader::open(path).map_err(file_error)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let samples: Result<Vec<f64>, hound::Error> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .map(|sample| sample.map(f64::from))
            .collect(),
        hound::SampleFormat::Int => {
            let max_magnitude = ((1_i64 << (spec.bits_per_sample - 1)) - 1) as f64;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|sample| sample.map(|value| f64::from(value) / max_magnitude))
                .collect()
        }
    };

    samples.map_err(file_error)
}

/// Reading or decoding a wavetable audio file failed.
#[derive(Debug)]
pub enum WavetableError {
    File { path: PathBuf, source: hound::Error },
}

impl Display for WavetableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let WavetableError::File { path, source } = self;
        write!(f, "Could not read wavetable file {}: {source}", path.display())
    }
}
