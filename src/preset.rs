//! The preset description consumed by the build pipeline.

use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::path::PathBuf;

use crate::expr::WaveExpr;

/// A complete description of the preset to generate.
///
/// The description is immutable input: the pipeline never mutates it but
/// returns derived artifacts in a [`BuildOutcome`](crate::pipeline::BuildOutcome).
///
/// # Examples
///
/// ```
/// # use wavesmith::preset::{ModulationSpec, PresetSpec};
/// let mut preset = PresetSpec::new("BrightPad", "base.fxp");
/// preset
///     .modulations
///     .push(ModulationSpec::new("LFO1", "FILTER_CUTOFF", 0.8));
///
/// assert_eq!(preset.name, "BrightPad");
/// assert!(preset.wavetable.is_none());
/// ```
#[derive(Debug)]
pub struct PresetSpec {
    /// Used for the output file names.
    pub name: String,

    /// Location of the base preset file whose bytes are patched.
    pub base_file: PathBuf,

    pub wavetable: Option<WavetableSpec>,

    /// Slot order in the modulation matrix follows the order of this list.
    pub modulations: Vec<ModulationSpec>,

    pub params: Vec<ParamSpec>,

    pub envelopes: Vec<EnvelopeSpec>,
}

impl PresetSpec {
    /// Creates a description with the two mandatory fields set and everything else empty.
    pub fn new(name: impl Into<String>, base_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_file: base_file.into(),
            wavetable: None,
            modulations: Vec::new(),
            params: Vec::new(),
            envelopes: Vec::new(),
        }
    }
}

/// Where the wavetable samples come from.
///
/// Exactly one source exists per wavetable by construction. Resolution turns
/// any variant into a flat sequence of normalized frames
/// (see [`wavetable::resolve`](crate::wavetable::resolve)).
pub enum WavetableSpec {
    /// A waveform shape evaluated over the phase domain `[0, 2π)`.
    ///
    /// The shape always receives two arguments `(phase, morph)`. The morph
    /// argument sweeps from 0.0 (first frame) to 1.0 (last frame); shapes
    /// that do not morph simply ignore it.
    Function {
        shape: Box<dyn Fn(f64, f64) -> f64 + Send + Sync>,
        /// Number of frames to render, must be within `[1, 256]`.
        n_frames: u16,
    },

    /// Raw samples, reframed and normalized as-is.
    Samples(Vec<f64>),

    /// A WAV file whose first channel becomes the wavetable.
    AudioFile(PathBuf),
}

impl WavetableSpec {
    /// Creates a function source from any two-argument shape.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wavesmith::preset::WavetableSpec;
    /// let spec = WavetableSpec::from_fn(|phase, _| phase.sin(), 16);
    /// assert!(matches!(spec, WavetableSpec::Function { n_frames: 16, .. }));
    /// ```
    pub fn from_fn(shape: impl Fn(f64, f64) -> f64 + Send + Sync + 'static, n_frames: u16) -> Self {
        Self::Function {
            shape: Box::new(shape),
            n_frames,
        }
    }

    /// Creates a function source from a parsed waveform expression.
    pub fn from_expr(expr: WaveExpr, n_frames: u16) -> Self {
        Self::Function {
            shape: expr.into_shape(),
            n_frames,
        }
    }

    pub fn from_samples(samples: impl Into<Vec<f64>>) -> Self {
        Self::Samples(samples.into())
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::AudioFile(path.into())
    }
}

impl Debug for WavetableSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WavetableSpec::Function { n_frames, .. } => f
                .debug_struct("Function")
                .field("n_frames", n_frames)
                .finish_non_exhaustive(),
            WavetableSpec::Samples(samples) => {
                f.debug_tuple("Samples").field(&samples.len()).finish()
            }
            WavetableSpec::AudioFile(path) => f.debug_tuple("AudioFile").field(path).finish(),
        }
    }
}

/// One link in the modulation matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct ModulationSpec {
    /// Must name an entry of [`routing::SOURCES`](crate::routing::SOURCES).
    pub source: String,

    /// Must name an entry of [`routing::DESTINATIONS`](crate::routing::DESTINATIONS).
    pub destination: String,

    /// Modulation depth within `[-1.0, 1.0]`; 0.0 has no effect.
    pub amount: f64,

    /// Optional secondary source scaling the link.
    pub aux: Option<String>,
}

impl ModulationSpec {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            amount,
            aux: None,
        }
    }

    pub fn with_aux(mut self, aux: impl Into<String>) -> Self {
        self.aux = Some(aux.into());
        self
    }
}

/// A static parameter value within `[0.0, 1.0]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub value: f64,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An ADSR shape for one of the envelope generators.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvelopeSpec {
    /// Which envelope generator to write, e.g. `ENV1`.
    pub target: String,

    /// Seconds, must not be negative.
    pub attack: f64,

    /// Seconds, must not be negative.
    pub decay: f64,

    /// Level within `[0.0, 1.0]`.
    pub sustain: f64,

    /// Seconds, must not be negative.
    pub release: f64,
}
