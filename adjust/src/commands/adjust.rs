// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::{Read, Write};

use anyhow::Result;
use serde::Serialize;

use adjust_core::{
    adjust::{AdjustContext, do_adjust},
    describe::DescribeInstance,
    inventory::ReadInventory,
    model::SettingsDocumentRaw,
    store::WriteSettingsStore,
};

use crate::CliError;

#[derive(Serialize)]
struct Progress<'a> {
    progress: u8,
    message: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Status<'a> {
    Ok,
    Failed { reason: &'a str },
}

fn write_line<W: Write, T: Serialize>(output: &mut W, line: &T) -> std::io::Result<()> {
    serde_json::to_writer(&mut *output, line)?;
    writeln!(output)?;
    output.flush()
}

/// Reads the settings document from `input` and applies it, reporting
/// progress and the final status as JSON lines on `output`.
pub fn command_adjust<R, W, I, D, St>(
    target: &str,
    input: R,
    mut output: W,
    ctx: AdjustContext<'_, I, D, St>,
) -> Result<()>
where
    R: Read,
    W: Write,
    I: ReadInventory,
    I::Error: Send + Sync + 'static,
    D: DescribeInstance,
    St: WriteSettingsStore,
    St::WriteError: Send + Sync + 'static,
{
    let raw: SettingsDocumentRaw = match serde_json::from_reader(input) {
        Ok(raw) => raw,
        Err(e) => {
            let error = CliError::MalformedInput(e);
            write_line(
                &mut output,
                &Status::Failed {
                    reason: &error.to_string(),
                },
            )?;
            return Err(error.into());
        }
    };

    let mut write_error = None;
    let result = do_adjust(target, &raw, ctx, |progress, message| {
        if write_error.is_none()
            && let Err(e) = write_line(&mut output, &Progress { progress, message })
        {
            write_error = Some(e);
        }
    });
    if let Some(e) = write_error {
        return Err(e.into());
    }

    match result {
        Ok(outcome) => {
            log::debug!(
                "{} instance(s) validated after {} attempt(s)",
                outcome.instances,
                outcome.attempts
            );
            write_line(&mut output, &Status::Ok)?;
            Ok(())
        }
        Err(e) => {
            write_line(
                &mut output,
                &Status::Failed {
                    reason: &e.to_string(),
                },
            )?;
            Err(e.into())
        }
    }
}
