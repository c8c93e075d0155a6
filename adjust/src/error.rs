// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid directory: '{0}'")]
    InvalidDirectory(String),
    #[error("a target id is required")]
    MissingTarget,
    #[error("malformed settings document on standard input: {0}")]
    MalformedInput(serde_json::Error),
    #[error("failed to set up async runtime: {0}")]
    Runtime(std::io::Error),
}
