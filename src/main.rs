//! # pixel-diff CLI
//!
//! Command-line interface for the image comparison engine.
//!
//! ## Usage
//! ```bash
//! pixel-diff compare --img1 before.png --img2 after.png --tolerance 5
//! pixel-diff compare --img1 a.jpg --img2 b.jpg --metric lab --output json
//! ```

mod cli;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    pixel_diff::init_tracing();

    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::from(cli::EXIT_ERROR)
        }
    }
}
