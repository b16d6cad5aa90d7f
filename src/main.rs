//! Binary entrypoint for the `studio` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    codegen_studio::logging::init();

    // Recording and replay are handled in commands::dispatch via
    // STUDIO_RECORD=<dir> and STUDIO_REPLAY=<file>.
    match codegen_studio::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
