//! Citizens service entry point
//!
//! Everything past argument parsing lives in the CLI module; this only
//! reports a failed command and sets the exit code.

use citizens::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
