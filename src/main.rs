//! prog - Lightweight task tracking for agents

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = prog::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
