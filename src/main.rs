//! CLI entry point for gfont.

use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use owo_colors::OwoColorize;

use gfont::run;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if io::stderr().is_terminal() {
                eprintln!("{}", error.to_string().red());
            } else {
                eprintln!("{error}");
            }
            error.exit_code()
        }
    }
}
