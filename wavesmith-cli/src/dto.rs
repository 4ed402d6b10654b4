use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use wavesmith::expr::WaveExpr;
use wavesmith::preset::{EnvelopeSpec, ModulationSpec, ParamSpec, PresetSpec, WavetableSpec};

use crate::CliError;
use crate::CliResult;
use crate::ResultExt;

/// A preset description as stored in a YAML file.
#[derive(Debug, Deserialize, Serialize)]
pub struct PresetDto {
    pub name: String,
    pub base_file: PathBuf,
    #[serde(default)]
    pub wavetable: Option<WavetableDto>,
    #[serde(default)]
    pub modulations: Vec<ModulationDto>,
    #[serde(default)]
    pub params: Vec<ParamDto>,
    #[serde(default)]
    pub envelopes: Vec<EnvelopeDto>,
}

impl PresetDto {
    pub fn read(input: impl Read) -> CliResult<PresetDto> {
        serde_yaml::from_reader(input)
            .handle_error::<CliError>("Could not parse preset description")
    }

    pub fn into_preset(self) -> CliResult<PresetSpec> {
        let wavetable = self.wavetable.map(WavetableDto::into_spec).transpose()?;

        Ok(PresetSpec {
            name: self.name,
            base_file: self.base_file,
            wavetable,
            modulations: self
                .modulations
                .into_iter()
                .map(ModulationDto::into_spec)
                .collect(),
            params: self.params.into_iter().map(ParamDto::into_spec).collect(),
            envelopes: self
                .envelopes
                .into_iter()
                .map(EnvelopeDto::into_spec)
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum WavetableDto {
    /// A waveform expression rendered over a number of frames.
    Function {
        expr: String,
        #[serde(default = "default_frames")]
        frames: u16,
    },

    /// Raw samples listed directly in the description.
    Samples { samples: Vec<f64> },

    /// A WAV file to import.
    File { path: PathBuf },
}

fn default_frames() -> u16 {
    8
}

impl WavetableDto {
    fn into_spec(self) -> CliResult<WavetableSpec> {
        Ok(match self {
            WavetableDto::Function { expr, frames } => {
                let expr = expr.parse::<WaveExpr>().map_err(CliError::CommandError)?;
                WavetableSpec::from_expr(expr, frames)
            }
            WavetableDto::Samples { samples } => WavetableSpec::from_samples(samples),
            WavetableDto::File { path } => WavetableSpec::from_file(path),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ModulationDto {
    pub source: String,
    pub destination: String,
    pub amount: f64,
    #[serde(default)]
    pub aux: Option<String>,
}

impl ModulationDto {
    fn into_spec(self) -> ModulationSpec {
        ModulationSpec {
            source: self.source,
            destination: self.destination,
            amount: self.amount,
            aux: self.aux,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ParamDto {
    pub name: String,
    pub value: f64,
}

impl ParamDto {
    fn into_spec(self) -> ParamSpec {
        ParamSpec {
            name: self.name,
            value: self.value,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EnvelopeDto {
    pub target: String,
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl EnvelopeDto {
    fn into_spec(self) -> EnvelopeSpec {
        EnvelopeSpec {
            target: self.target,
            attack: self.attack,
            decay: self.decay,
            sustain: self.sustain,
            release: self.release,
        }
    }
}

#[cfg(test)]
mod tests {
    use wavesmith::preset::WavetableSpec;

    use super::*;

    #[test]
    fn full_description_round_trips_into_a_preset() {
        let yaml = "\
name: BrightPad
base_file: presets/base.fxp
wavetable:
  type: Function
  expr: sin(x) + sin(3*x)/3
  frames: 16
modulations:
  - source: LFO1
    destination: FILTER_CUTOFF
    amount: 0.8
  - source: MODWHEEL
    destination: LFO1_RATE
    amount: 1.0
    aux: VELOCITY
params:
  - name: filter_cutoff
    value: 0.4
envelopes:
  - target: ENV1
    attack: 0.02
    decay: 0.15
    sustain: 0.6
    release: 0.5
";

        let preset = PresetDto::read(yaml.as_bytes()).unwrap().into_preset().unwrap();

        assert_eq!(preset.name, "BrightPad");
        assert!(matches!(
            preset.wavetable,
            Some(WavetableSpec::Function { n_frames: 16, .. })
        ));
        assert_eq!(preset.modulations.len(), 2);
        assert_eq!(preset.modulations[1].aux.as_deref(), Some("VELOCITY"));
        assert_eq!(preset.params[0].value, 0.4);
        assert_eq!(preset.envelopes[0].target, "ENV1");
    }

    #[test]
    fn frames_default_to_eight() {
        let yaml = "\
name: Defaults
base_file: base.fxp
wavetable:
  type: Function
  expr: sin(x)
";

        let preset = PresetDto::read(yaml.as_bytes()).unwrap().into_preset().unwrap();
        assert!(matches!(
            preset.wavetable,
            Some(WavetableSpec::Function { n_frames: 8, .. })
        ));
    }

    #[test]
    fn invalid_expression_is_rejected() {
        let yaml = "\
name: Broken
base_file: base.fxp
wavetable:
  type: Function
  expr: sin(
";

        assert!(PresetDto::read(yaml.as_bytes()).unwrap().into_preset().is_err());
    }
}
