// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Places instances pull their desired configuration from.

use thiserror::Error;

use crate::model::SettingsDocument;

pub mod any;
pub mod local_directory;
pub mod memory;
pub mod reqwest_http;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_STORE_NAME: &str = "adjust_state";

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTarget {
    #[error("target id must not be empty")]
    Empty,
    #[error("target id `{0}` must not contain path separators or be `.`/`..`")]
    PathLike(String),
}

/// Target ids become a path segment of the stored object.
pub fn validate_target<S: AsRef<str>>(target: S) -> Result<(), InvalidTarget> {
    let target = target.as_ref();
    if target.is_empty() {
        Err(InvalidTarget::Empty)
    } else if target == "." || target == ".." || target.contains(['/', '\\']) {
        Err(InvalidTarget::PathLike(target.to_string()))
    } else {
        Ok(())
    }
}

pub trait ReadSettingsStore {
    type ReadError: std::error::Error + std::fmt::Debug;

    /// Last settings published for `target`, if any.
    fn get<S: AsRef<str>>(&self, target: S) -> Result<Option<SettingsDocument>, Self::ReadError>;
}

pub trait WriteSettingsStore: ReadSettingsStore {
    type WriteError: std::error::Error + std::fmt::Debug;

    fn put<S: AsRef<str>>(
        &mut self,
        target: S,
        document: &SettingsDocument,
    ) -> Result<(), Self::WriteError>;
}
