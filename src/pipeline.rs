//! The linear build pipeline: validate, resolve, encode, assemble.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::matrix;
use crate::matrix::MatrixError;
use crate::matrix::ModMatrix;
use crate::params;
use crate::params::ParamBlock;
use crate::params::UnmappedName;
use crate::patch;
use crate::patch::PatchWarning;
use crate::preset::PresetSpec;
use crate::validate;
use crate::validate::ValidationError;
use crate::wavetable;
use crate::wavetable::WavetableError;

/// Runs all pipeline stages in order and returns the derived artifacts.
///
/// Stages run strictly sequentially; the first failing stage aborts the rest.
/// Range and mapping issues do not fail the build but are collected in
/// [`BuildOutcome::warnings`].
///
/// # Examples
///
/// ```
/// # use wavesmith::pipeline;
/// # use wavesmith::preset::{ModulationSpec, ParamSpec, PresetSpec};
/// let base_file = std::env::temp_dir().join("wavesmith-doc-pipeline.fxp");
/// std::fs::write(&base_file, vec![0; 4096]).unwrap();
///
/// let mut preset = PresetSpec::new("Doc", &base_file);
/// preset
///     .modulations
///     .push(ModulationSpec::new("LFO1", "FILTER_CUTOFF", 0.8));
/// preset.params.push(ParamSpec::new("filter_cutoff", 0.4));
///
/// let outcome = pipeline::build(&preset).unwrap();
///
/// assert!(outcome.warnings.is_empty());
/// assert_eq!(&outcome.preset_bytes[0x1A4..0x1A8], 0.4f32.to_be_bytes());
/// ```
pub fn build(preset: &PresetSpec) -> Result<BuildOutcome, BuildError> {
    log::debug!("validating preset '{}'", preset.name);
    validate::validate(preset)?;

    log::debug!("resolving wavetable");
    let resolved = match &preset.wavetable {
        Some(spec) => Some(wavetable::resolve(spec)?),
        None => None,
    };

    log::debug!("encoding modulation matrix");
    let mod_matrix = matrix::encode(&preset.modulations)?;

    log::debug!("encoding parameters and envelopes");
    let param_block = params::encode(&preset.params, &preset.envelopes);

    log::debug!("patching base file {}", preset.base_file.display());
    let mut preset_bytes = fs::read(&preset.base_file).map_err(|source| BuildError::Io {
        path: preset.base_file.clone(),
        source,
    })?;
    let patch_warnings = patch::apply(&mut preset_bytes, &param_block, &mod_matrix);

    let warnings = param_block
        .unmapped
        .iter()
        .cloned()
        .map(BuildWarning::Unmapped)
        .chain(patch_warnings.into_iter().map(BuildWarning::Patch))
        .collect();

    Ok(BuildOutcome {
        wavetable: resolved,
        mod_matrix,
        param_block,
        preset_bytes,
        warnings,
    })
}

/// Everything the pipeline derived from a preset description.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    /// The resolved wavetable frames, when the description had a wavetable.
    pub wavetable: Option<Vec<f32>>,

    pub mod_matrix: ModMatrix,

    pub param_block: ParamBlock,

    /// The patched copy of the base file.
    pub preset_bytes: Vec<u8>,

    /// Non-fatal conditions encountered while encoding and patching.
    pub warnings: Vec<BuildWarning>,
}

/// A non-fatal condition reported by one of the stages.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildWarning {
    Unmapped(UnmappedName),
    Patch(PatchWarning),
}

impl Display for BuildWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::Unmapped(unmapped) => unmapped.fmt(f),
            BuildWarning::Patch(warning) => warning.fmt(f),
        }
    }
}

/// A stage failure that aborted the pipeline.
#[derive(Debug)]
pub enum BuildError {
    Validation(ValidationError),
    Matrix(MatrixError),
    Wavetable(WavetableError),
    Io { path: PathBuf, source: io::Error },
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Validation(err) => err.fmt(f),
            BuildError::Matrix(err) => err.fmt(f),
            BuildError::Wavetable(err) => err.fmt(f),
            BuildError::Io { path, source } => {
                write!(f, "Could not read base file {}: {source}", path.display())
            }
        }
    }
}

impl From<ValidationError> for BuildError {
    fn from(v: ValidationError) -> Self {
        BuildError::Validation(v)
    }
}

impl From<MatrixError> for BuildError {
    fn from(v: MatrixError) -> Self {
        BuildError::Matrix(v)
    }
}

impl From<WavetableError> for BuildError {
    fn from(v: WavetableError) -> Self {
        BuildError::Wavetable(v)
    }
}
