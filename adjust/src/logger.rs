// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use env_logger::{Builder, Target, fmt::Formatter};
use log::{LevelFilter, Record, SetLoggerError};
use std::io::Write;

use crate::style;

/// Logs go to stderr, stdout carries the driver protocol.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    Builder::new()
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper_util", LevelFilter::Warn)
        .filter_level(level)
        .format(format)
        .target(Target::Stderr)
        .try_init()
}

fn format(buf: &mut Formatter, record: &Record<'_>) -> Result<(), std::io::Error> {
    match record.level() {
        log::Level::Error => {
            let style = style::ERROR;
            writeln!(buf, "{style}error{style:#}: {}", record.args())
        }
        log::Level::Warn => {
            let style = style::WARN;
            writeln!(buf, "{style}warning{style:#}: {}", record.args())
        }
        _ => {
            writeln!(buf, "{}", record.args())
        }
    }
}
