use std::{env, io::ErrorKind};
use wavesmith_cli::{self, CliError, CliResult};

fn main() -> CliResult {
    env_logger::init();

    match wavesmith_cli::run_in_shell_env(env::args()) {
        // The BrokenPipe case occurs when stdout tries to communicate with a process that has already terminated.
        // Since wavesmith is an idempotent tool with repeatable results, it is okay to ignore this error and terminate successfully.
        Err(CliError::IoError(err)) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
