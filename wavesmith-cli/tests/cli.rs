use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

use pretty_assertions::assert_eq;

fn call_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wavesmith"))
        .args(args)
        .output()
        .unwrap()
}

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wavesmith-cli-{name}"));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn forge_args<'a>(output_dir: &'a str, name: &'a str, base: &'a str) -> Vec<&'a str> {
    vec![
        "--output", output_dir, "forge", "--name", name, "--base", base,
    ]
}

#[test]
fn forge_patches_param_and_matrix() {
    let dir = test_dir("forge");
    let base = dir.join("base.fxp");
    fs::write(&base, vec![0; 4096]).unwrap();

    let dir_str = dir.to_str().unwrap();
    let mut args = forge_args(dir_str, "Test", base.to_str().unwrap());
    args.extend(["--mod", "LFO1,FILTER_CUTOFF,0.8", "--param", "filter_cutoff,0.4"]);

    let output = call_cli(&args);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let bytes = fs::read(dir.join("Test.fxp")).unwrap();
    assert_eq!(bytes.len(), 4096);
    assert_eq!(&bytes[0x1A4..0x1A8], 0.4f32.to_be_bytes());

    let mut expected_slot = Vec::new();
    for value in [0.0f32, 17.0, 0.9, 255.0] {
        expected_slot.extend(value.to_be_bytes());
    }
    assert_eq!(&bytes[0x2A0..0x2B0], &expected_slot[..]);
}

#[test]
fn forging_twice_is_idempotent() {
    let dir = test_dir("idempotent");
    let base = dir.join("base.fxp");
    fs::write(&base, vec![0x5A; 2048]).unwrap();

    let dir_str = dir.to_str().unwrap();
    let mut args = forge_args(dir_str, "Twice", base.to_str().unwrap());
    args.extend(["--fn", "sin(x)", "--frames", "2", "--env", "ENV1,0.01,0.2,0.6,0.5"]);

    assert!(call_cli(&args).status.success());
    let first_preset = fs::read(dir.join("Twice.fxp")).unwrap();
    let first_wavetable = fs::read(dir.join("Twice_wavetable.wav")).unwrap();

    assert!(call_cli(&args).status.success());
    assert_eq!(fs::read(dir.join("Twice.fxp")).unwrap(), first_preset);
    assert_eq!(
        fs::read(dir.join("Twice_wavetable.wav")).unwrap(),
        first_wavetable
    );
}

#[test]
fn forge_writes_the_resolved_wavetable() {
    let dir = test_dir("wavetable");
    let base = dir.join("base.fxp");
    fs::write(&base, vec![0; 4096]).unwrap();

    let dir_str = dir.to_str().unwrap();
    let mut args = forge_args(dir_str, "Waves", base.to_str().unwrap());
    args.extend(["--fn", "sin(x) + sin(3*x)/3", "--frames", "4"]);

    let output = call_cli(&args);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let reader = hound::WavReader::open(dir.join("Waves_wavetable.wav")).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(reader.len(), 4 * 2048);
}

#[test]
fn from_yaml_builds_the_described_preset() {
    let dir = test_dir("from-yaml");
    let base = dir.join("base.fxp");
    fs::write(&base, vec![0; 4096]).unwrap();

    let description = dir.join("preset.yml");
    fs::write(
        &description,
        format!(
            "\
name: Described
base_file: {}
modulations:
  - source: LFO1
    destination: FILTER_CUTOFF
    amount: 0.8
params:
  - name: filter_cutoff
    value: 0.4
",
            base.display()
        ),
    )
    .unwrap();

    let output = call_cli(&[
        "--output",
        dir.to_str().unwrap(),
        "from-yaml",
        description.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let bytes = fs::read(dir.join("Described.fxp")).unwrap();
    assert_eq!(&bytes[0x1A4..0x1A8], 0.4f32.to_be_bytes());
}

#[test]
fn invalid_descriptions_are_rejected_with_all_violations() {
    let dir = test_dir("invalid");
    let base = dir.join("base.fxp");
    fs::write(&base, vec![0; 4096]).unwrap();

    let dir_str = dir.to_str().unwrap();
    let mut args = forge_args(dir_str, "Broken", base.to_str().unwrap());
    args.extend([
        "--mod", "LFO99,FILTER_CUTOFF,0.8",
        "--mod", "LFO1,FILTER_CUTOFF,7.0",
        "--param", "filter_cutoff,-0.5",
    ]);

    let output = call_cli(&args);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("LFO99"), "{stderr}");
    assert!(stderr.contains("outside [-1.0, 1.0]"), "{stderr}");
    assert!(stderr.contains("outside [0.0, 1.0]"), "{stderr}");
    assert!(!dir.join("Broken.fxp").exists());
}

#[test]
fn short_base_file_degrades_with_a_warning() {
    let dir = test_dir("short-base");
    let base = dir.join("base.fxp");
    fs::write(&base, vec![0; 256]).unwrap();

    let dir_str = dir.to_str().unwrap();
    let mut args = forge_args(dir_str, "Short", base.to_str().unwrap());
    args.extend(["--mod", "LFO1,FILTER_CUTOFF,0.8"]);

    let output = call_cli(&args);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[WARN]"), "{stderr}");
    // The file is too small for any patch, so it comes out unchanged.
    assert_eq!(fs::read(dir.join("Short.fxp")).unwrap(), vec![0; 256]);
}

#[test]
fn lists_sources_and_destinations() {
    let sources = call_cli(&["sources"]);
    assert!(sources.status.success());
    let stdout = String::from_utf8_lossy(&sources.stdout);
    assert!(stdout.contains("LFO1"), "{stdout}");
    assert!(stdout.contains("MODWHEEL"), "{stdout}");

    let destinations = call_cli(&["destinations"]);
    assert!(destinations.status.success());
    let stdout = String::from_utf8_lossy(&destinations.stdout);
    assert!(stdout.contains("FILTER_CUTOFF"), "{stdout}");
    assert!(stdout.contains("index 17"), "{stdout}");
}
