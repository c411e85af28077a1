//! Cephalo - Cephalometric landmark evaluation engine

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    if let Err(e) = cephalo::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
