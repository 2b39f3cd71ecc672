// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use gtrun::GtrunApp;

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = GtrunApp::parse();
    let output = app.init_output();

    match app.exec(output) {
        Ok(()) => Ok(()),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}
