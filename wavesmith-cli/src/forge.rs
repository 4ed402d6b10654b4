use std::{
    fs,
    fs::File,
    path::{Path, PathBuf},
};

use clap::Parser;
use hound::{WavSpec, WavWriter};
use wavesmith::{
    expr::WaveExpr,
    pipeline,
    preset::{EnvelopeSpec, ModulationSpec, ParamSpec, PresetSpec, WavetableSpec},
};

use crate::{dto::PresetDto, App, CliError, CliResult, ResultExt};

/// Sample rate of generated wavetable files.
const WAVETABLE_SAMPLE_RATE: u32 = 44100;

#[derive(Parser)]
pub(crate) struct ForgeOptions {
    /// Name of the preset, used for the output file names
    #[arg(long = "name")]
    name: String,

    /// Base preset file to start from
    #[arg(long = "base")]
    base_file: PathBuf,

    /// Waveform expression over the phase x and the optional morph position t, e.g. "sin(x) + sin(3*x)/3"
    #[arg(long = "fn")]
    function: Option<WaveExpr>,

    /// WAV file to import as the wavetable
    #[arg(long = "wav", conflicts_with = "function")]
    wav_file: Option<PathBuf>,

    /// Number of frames rendered from the waveform expression
    #[arg(long = "frames", default_value = "8")]
    n_frames: u16,

    /// Modulation link, e.g. "LFO1,FILTER_CUTOFF,0.8" with an optional auxiliary source appended
    #[arg(long = "mod", value_parser = parse_link)]
    modulations: Vec<ModulationSpec>,

    /// Static parameter, e.g. "filter_cutoff,0.4"
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<ParamSpec>,

    /// ADSR envelope, e.g. "ENV1,0.01,0.2,0.6,0.5"
    #[arg(long = "env", value_parser = parse_envelope)]
    envelopes: Vec<EnvelopeSpec>,
}

impl ForgeOptions {
    pub fn run(self, app: &mut App, output_dir: &Path) -> CliResult {
        let wavetable = match self.function {
            Some(expr) => Some(WavetableSpec::from_expr(expr, self.n_frames)),
            None => self.wav_file.map(WavetableSpec::from_file),
        };

        let preset = PresetSpec {
            name: self.name,
            base_file: self.base_file,
            wavetable,
            modulations: self.modulations,
            params: self.params,
            envelopes: self.envelopes,
        };

        forge_preset(&preset, app, output_dir)
    }
}

#[derive(Parser)]
pub(crate) struct FromYamlOptions {
    /// Location of the preset description file
    description_file: PathBuf,
}

impl FromYamlOptions {
    pub fn run(self, app: &mut App, output_dir: &Path) -> CliResult {
        let file = File::open(&self.description_file).map_err(|err| {
            format!(
                "Could not open description file {}: {err}",
                self.description_file.display()
            )
        })?;
        let preset = PresetDto::read(file)?.into_preset()?;
        forge_preset(&preset, app, output_dir)
    }
}

fn forge_preset(preset: &PresetSpec, app: &mut App, output_dir: &Path) -> CliResult {
    let outcome = pipeline::build(preset)?;

    for warning in &outcome.warnings {
        app.errln(format_args!("[WARN] {warning}"))?;
    }

    fs::create_dir_all(output_dir)?;

    if let Some(samples) = &outcome.wavetable {
        let wavetable_file = output_dir.join(format!("{}_wavetable.wav", preset.name));
        write_wavetable(&wavetable_file, samples)
            .handle_error::<CliError>("Could not write wavetable file")?;
        app.errln(format_args!(
            "Wavetable written to {}",
            wavetable_file.display()
        ))?;
    }

    let preset_file = output_dir.join(format!("{}.fxp", preset.name));
    fs::write(&preset_file, &outcome.preset_bytes)?;
    app.errln(format_args!("Preset written to {}", preset_file.display()))?;

    Ok(())
}

fn write_wavetable(path: &Path, samples: &[f32]) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: WAVETABLE_SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

fn parse_link(s: &str) -> Result<ModulationSpec, String> {
    let parts = s.split(',').map(str::trim).collect::<Vec<_>>();

    let (source, destination, amount, aux) = match parts[..] {
        [source, destination, amount] => (source, destination, amount, None),
        [source, destination, amount, aux] => (source, destination, amount, Some(aux)),
        _ => {
            return Err(format!(
                "Invalid modulation '{s}': expected SOURCE,DESTINATION,AMOUNT with an optional ,AUX"
            ))
        }
    };

    let amount = amount
        .parse()
        .map_err(|_| format!("Invalid modulation amount '{amount}': must be a number"))?;

    let link = ModulationSpec::new(source, destination, amount);
    Ok(match aux {
        Some(aux) => link.with_aux(aux),
        None => link,
    })
}

fn parse_param(s: &str) -> Result<ParamSpec, String> {
    match s.split(',').map(str::trim).collect::<Vec<_>>()[..] {
        [name, value] => Ok(ParamSpec::new(name, parse_number("value", value)?)),
        _ => Err(format!("Invalid parameter '{s}': expected NAME,VALUE")),
    }
}

fn parse_envelope(s: &str) -> Result<EnvelopeSpec, String> {
    match s.split(',').map(str::trim).collect::<Vec<_>>()[..] {
        [target, attack, decay, sustain, release] => Ok(EnvelopeSpec {
            target: target.to_owned(),
            attack: parse_number("attack", attack)?,
            decay: parse_number("decay", decay)?,
            sustain: parse_number("sustain", sustain)?,
            release: parse_number("release", release)?,
        }),
        _ => Err(format!(
            "Invalid envelope '{s}': expected TARGET,ATTACK,DECAY,SUSTAIN,RELEASE"
        )),
    }
}

fn parse_number(field: &str, value: &str) -> Result<f64, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid {field} '{value}': must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modulation_links() {
        assert_eq!(
            parse_link("LFO1,FILTER_CUTOFF,0.8"),
            Ok(ModulationSpec::new("LFO1", "FILTER_CUTOFF", 0.8))
        );
        assert_eq!(
            parse_link(" MODWHEEL , LFO1_RATE , 1.0 , VELOCITY "),
            Ok(ModulationSpec::new("MODWHEEL", "LFO1_RATE", 1.0).with_aux("VELOCITY"))
        );
        assert!(parse_link("LFO1,FILTER_CUTOFF").is_err());
        assert!(parse_link("LFO1,FILTER_CUTOFF,loud").is_err());
    }

    #[test]
    fn parses_params() {
        assert_eq!(
            parse_param("filter_cutoff,0.4"),
            Ok(ParamSpec::new("filter_cutoff", 0.4))
        );
        assert!(parse_param("filter_cutoff").is_err());
        assert!(parse_param("filter_cutoff,high").is_err());
    }

    #[test]
    fn parses_envelopes() {
        assert_eq!(
            parse_envelope("ENV1,0.01,0.2,0.6,0.5"),
            Ok(EnvelopeSpec {
                target: "ENV1".to_owned(),
                attack: 0.01,
                decay: 0.2,
                sustain: 0.6,
                release: 0.5,
            })
        );
        assert!(parse_envelope("ENV1,0.01,0.2,0.6").is_err());
    }
}
