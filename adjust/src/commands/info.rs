// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::Write;

use anyhow::Result;

use adjust_core::info::{VERSION, do_info};

pub fn command_version<W: Write>(mut output: W) -> Result<()> {
    writeln!(output, "{} {VERSION}", env!("CARGO_PKG_NAME"))?;
    Ok(())
}

pub fn command_info<W: Write>(mut output: W) -> Result<()> {
    serde_json::to_writer(&mut output, &do_info())?;
    writeln!(output)?;
    Ok(())
}
