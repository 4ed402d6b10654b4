//! Descriptor validation, run before any encoding happens.

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::path::PathBuf;

use crate::preset::EnvelopeSpec;
use crate::preset::ModulationSpec;
use crate::preset::ParamSpec;
use crate::preset::PresetSpec;
use crate::preset::WavetableSpec;
use crate::routing;

/// Checks every field of the description and reports *all* violations at once.
///
/// Unknown parameter names and envelope targets are deliberately not checked
/// here; they degrade to encode-time warnings
/// (see [`params::encode`](crate::params::encode)).
///
/// # Examples
///
/// ```
/// # use wavesmith::preset::{ModulationSpec, ParamSpec, PresetSpec};
/// # use wavesmith::validate;
/// let base_file = std::env::temp_dir().join("wavesmith-doc-validate.fxp");
/// std::fs::write(&base_file, [0; 16]).unwrap();
///
/// let mut preset = PresetSpec::new("Doc", &base_file);
/// assert!(validate::validate(&preset).is_ok());
///
/// preset
///     .modulations
///     .push(ModulationSpec::new("LFO99", "FILTER_CUTOFF", 3.0));
/// preset.params.push(ParamSpec::new("filter_cutoff", -0.5));
///
/// let violations = validate::validate(&preset).unwrap_err().into_violations();
/// assert_eq!(violations.len(), 3);
/// ```
pub fn validate(preset: &PresetSpec) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    if !preset.base_file.exists() {
        violations.push(Violation::BaseFileMissing {
            path: preset.base_file.clone(),
        });
    }

    if let Some(wavetable) = &preset.wavetable {
        check_wavetable(wavetable, &mut violations);
    }

    for modulation in &preset.modulations {
        check_modulation(modulation, &mut violations);
    }

    for param in &preset.params {
        check_param(param, &mut violations);
    }

    for envelope in &preset.envelopes {
        check_envelope(envelope, &mut violations);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(violations))
    }
}

fn check_wavetable(wavetable: &WavetableSpec, violations: &mut Vec<Violation>) {
    match wavetable {
        WavetableSpec::Function { n_frames, .. } => {
            if !(1..=256).contains(n_frames) {
                violations.push(Violation::FrameCountOutOfRange {
                    n_frames: *n_frames,
                });
            }
        }
        WavetableSpec::Samples(_) => {}
        WavetableSpec::AudioFile(path) => {
            if !path.exists() {
                violations.push(Violation::WavetableFileMissing { path: path.clone() });
            }
        }
    }
}

fn check_modulation(modulation: &ModulationSpec, violations: &mut Vec<Violation>) {
    if routing::source_index(&modulation.source).is_none() {
        violations.push(Violation::UnknownSource {
            name: modulation.source.clone(),
        });
    }

    if routing::destination_index(&modulation.destination).is_none() {
        violations.push(Violation::UnknownDestination {
            name: modulation.destination.clone(),
        });
    }

    if !(-1.0..=1.0).contains(&modulation.amount) {
        violations.push(Violation::AmountOutOfRange {
            source: modulation.source.clone(),
            destination: modulation.destination.clone(),
            amount: modulation.amount,
        });
    }

    if let Some(aux) = &modulation.aux {
        if routing::source_index(aux).is_none() {
            violations.push(Violation::UnknownAuxSource { name: aux.clone() });
        }
    }
}

fn check_param(param: &ParamSpec, violations: &mut Vec<Violation>) {
    if !(0.0..=1.0).contains(&param.value) {
        violations.push(Violation::ParamValueOutOfRange {
            name: param.name.clone(),
            value: param.value,
        });
    }
}

fn check_envelope(envelope: &EnvelopeSpec, violations: &mut Vec<Violation>) {
    for (field, value) in [
        ("attack", envelope.attack),
        ("decay", envelope.decay),
        ("release", envelope.release),
    ] {
        if value < 0.0 {
            violations.push(Violation::EnvelopeTimeNegative {
                target: envelope.target.clone(),
                field,
                value,
            });
        }
    }

    if !(0.0..=1.0).contains(&envelope.sustain) {
        violations.push(Violation::SustainOutOfRange {
            target: envelope.target.clone(),
            value: envelope.sustain,
        });
    }
}

/// The full list of violations found in a description.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError(Vec<Violation>);

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.0
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Invalid preset description:")?;
        for violation in &self.0 {
            writeln!(f, "  - {violation}")?;
        }
        Ok(())
    }
}

/// A single violated constraint.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    BaseFileMissing { path: PathBuf },
    WavetableFileMissing { path: PathBuf },
    FrameCountOutOfRange { n_frames: u16 },
    UnknownSource { name: String },
    UnknownDestination { name: String },
    UnknownAuxSource { name: String },
    AmountOutOfRange { source: String, destination: String, amount: f64 },
    ParamValueOutOfRange { name: String, value: f64 },
    EnvelopeTimeNegative { target: String, field: &'static str, value: f64 },
    SustainOutOfRange { target: String, value: f64 },
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Violation::BaseFileMissing { path } => {
                write!(f, "Base file not found: {}", path.display())
            }
            Violation::WavetableFileMissing { path } => {
                write!(f, "Wavetable file not found: {}", path.display())
            }
            Violation::FrameCountOutOfRange { n_frames } => {
                write!(f, "Frame count must be within [1, 256] (got {n_frames})")
            }
            Violation::UnknownSource { name } => {
                write!(f, "Unknown modulation source '{name}'")
            }
            Violation::UnknownDestination { name } => {
                write!(f, "Unknown modulation destination '{name}'")
            }
            Violation::UnknownAuxSource { name } => {
                write!(f, "Unknown auxiliary modulation source '{name}'")
            }
            Violation::AmountOutOfRange {
                source,
                destination,
                amount,
            } => write!(
                f,
                "Modulation {source} -> {destination}: amount {amount} outside [-1.0, 1.0]"
            ),
            Violation::ParamValueOutOfRange { name, value } => {
                write!(f, "Parameter '{name}': value {value} outside [0.0, 1.0]")
            }
            Violation::EnvelopeTimeNegative {
                target,
                field,
                value,
            } => write!(f, "Envelope {target}: {field} must not be negative (got {value})"),
            Violation::SustainOutOfRange { target, value } => {
                write!(f, "Envelope {target}: sustain {value} outside [0.0, 1.0]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preset::EnvelopeSpec;

    use super::*;

    fn existing_base_file() -> PathBuf {
        let path = std::env::temp_dir().join("wavesmith-validate-tests.fxp");
        std::fs::write(&path, [0; 16]).unwrap();
        path
    }

    #[test]
    fn empty_preset_with_existing_base_file_is_valid() {
        let preset = PresetSpec::new("Empty", existing_base_file());
        assert_eq!(validate(&preset), Ok(()));
    }

    #[test]
    fn missing_base_file_is_reported() {
        let preset = PresetSpec::new("Missing", "no/such/file.fxp");
        let violations = validate(&preset).unwrap_err().into_violations();
        assert_eq!(
            violations,
            [Violation::BaseFileMissing {
                path: "no/such/file.fxp".into()
            }]
        );
    }

    #[test]
    fn all_violations_are_accumulated() {
        let mut preset = PresetSpec::new("Broken", "no/such/file.fxp");
        preset.wavetable = Some(WavetableSpec::from_fn(|phase, _| phase.sin(), 0));
        preset
            .modulations
            .push(ModulationSpec::new("LFO99", "NOWHERE", -1.5).with_aux("BAD_AUX"));
        preset.params.push(ParamSpec::new("filter_cutoff", 1.5));
        preset.envelopes.push(EnvelopeSpec {
            target: "ENV1".to_owned(),
            attack: -0.1,
            decay: 0.1,
            sustain: 2.0,
            release: -1.0,
        });

        let violations = validate(&preset).unwrap_err().into_violations();
        assert_eq!(violations.len(), 10);
    }

    #[test]
    fn frame_count_bounds() {
        let mut preset = PresetSpec::new("Frames", existing_base_file());

        for valid in [1, 8, 256] {
            preset.wavetable = Some(WavetableSpec::from_fn(|phase, _| phase.sin(), valid));
            assert_eq!(validate(&preset), Ok(()));
        }

        for invalid in [0, 257] {
            preset.wavetable = Some(WavetableSpec::from_fn(|phase, _| phase.sin(), invalid));
            assert!(validate(&preset).is_err());
        }
    }

    #[test]
    fn unknown_param_name_is_not_a_violation() {
        let mut preset = PresetSpec::new("Lenient", existing_base_file());
        preset.params.push(ParamSpec::new("no_such_param", 0.5));
        preset.envelopes.push(EnvelopeSpec {
            target: "ENV9".to_owned(),
            attack: 0.0,
            decay: 0.0,
            sustain: 0.5,
            release: 0.0,
        });
        assert_eq!(validate(&preset), Ok(()));
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let mut preset = PresetSpec::new("Amounts", existing_base_file());
        preset
            .modulations
            .push(ModulationSpec::new("LFO1", "FILTER_CUTOFF", -1.0));
        preset
            .modulations
            .push(ModulationSpec::new("LFO2", "FILTER_RES", 1.0));
        assert_eq!(validate(&preset), Ok(()));
    }
}
