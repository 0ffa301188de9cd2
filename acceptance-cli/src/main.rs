// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use acceptance_cli::{AcceptanceApp, OutputWriter};
use clap::Parser;
use color_eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = AcceptanceApp::parse();
    let output = opts.init_output();

    match opts.exec(output, &mut OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_palette());
            std::process::exit(error.process_exit_code())
        }
    }
}
