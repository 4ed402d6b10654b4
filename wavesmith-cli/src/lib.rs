mod dto;
mod forge;

use std::{
    fmt::{self, Debug, Display},
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::error::ErrorKind;
use clap::Parser;
use forge::{ForgeOptions, FromYamlOptions};
use wavesmith::pipeline::BuildError;
use wavesmith::routing;

#[derive(Parser)]
#[command(
    name = "wavesmith",
    about = "Build wavetable synthesizer presets by patching binary preset files"
)]
struct MainOptions {
    /// Directory where generated files are written
    #[arg(long = "output", default_value = "output")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: MainCommand,
}

#[derive(Parser)]
enum MainCommand {
    /// Forge a preset from command-line flags
    #[command(name = "forge")]
    Forge(ForgeOptions),

    /// Forge a preset from a YAML description file
    #[command(name = "from-yaml")]
    FromYaml(FromYamlOptions),

    /// List the available modulation sources
    #[command(name = "sources")]
    Sources,

    /// List the available modulation destinations
    #[command(name = "destinations")]
    Destinations,
}

impl MainOptions {
    fn run(self) -> CliResult {
        let stdout = io::stdout();
        let output = Box::new(stdout.lock());

        let stderr = io::stderr();
        let error = Box::new(stderr.lock());

        let mut app = App { output, error };

        self.command.run(&mut app, &self.output_dir)
    }
}

impl MainCommand {
    fn run(self, app: &mut App, output_dir: &Path) -> CliResult {
        match self {
            MainCommand::Forge(options) => options.run(app, output_dir)?,
            MainCommand::FromYaml(options) => options.run(app, output_dir)?,
            MainCommand::Sources => print_sources(app)?,
            MainCommand::Destinations => print_destinations(app)?,
        }
        Ok(())
    }
}

pub fn run_in_shell_env(args: impl IntoIterator<Item = String>) -> CliResult {
    let options = match MainOptions::try_parse_from(args) {
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{err}");
                    Ok(())
                }
                _ => Err(CliError::CommandError(err.to_string())),
            };
        }
        Ok(options) => options,
    };

    options.run()
}

fn print_sources(app: &mut App) -> io::Result<()> {
    app.writeln("Available modulation sources:")?;
    for (name, index) in routing::SOURCES {
        app.writeln(format_args!("  {name:<12} (index {index})"))?;
    }
    Ok(())
}

fn print_destinations(app: &mut App) -> io::Result<()> {
    app.writeln("Available modulation destinations:")?;
    for (name, index) in routing::DESTINATIONS {
        app.writeln(format_args!("  {name:<16} (index {index})"))?;
    }
    Ok(())
}

struct App<'a> {
    output: Box<dyn 'a + Write>,
    error: Box<dyn 'a + Write>,
}

impl App<'_> {
    pub fn writeln(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(&mut self.output, "{message}")
    }

    pub fn errln(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(&mut self.error, "{message}")
    }
}

pub type CliResult<T = ()> = Result<T, CliError>;

pub enum CliError {
    IoError(io::Error),
    CommandError(String),
}

impl Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::IoError(err) => write!(f, "IO error / {err}"),
            CliError::CommandError(err) => write!(f, "The command failed / {err}"),
        }
    }
}

impl From<String> for CliError {
    fn from(v: String) -> Self {
        CliError::CommandError(v)
    }
}

impl From<io::Error> for CliError {
    fn from(v: io::Error) -> Self {
        CliError::IoError(v)
    }
}

impl From<BuildError> for CliError {
    fn from(v: BuildError) -> Self {
        CliError::CommandError(v.to_string())
    }
}

pub trait ResultExt<T, E> {
    fn handle_error<F>(self, context: &str) -> Result<T, F>
    where
        E: Debug,
        F: From<String>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn handle_error<F>(self, context: &str) -> Result<T, F>
    where
        E: Debug,
        F: From<String>,
    {
        self.map_err(|err| F::from(format!("{context}\n{err:#?}")))
    }
}
