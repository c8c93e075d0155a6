// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::{
    model::{SettingsDocument, SettingsDocumentRaw, SettingsValidationError},
    store::{InvalidTarget, ReadSettingsStore, SETTINGS_FILE_NAME, WriteSettingsStore, validate_target},
};

/// Stores settings as `<root>/<target>/settings.json`.
#[derive(Clone, Debug)]
pub struct LocalDirectoryStore {
    pub root: Utf8PathBuf,
}

#[derive(Error, Debug)]
pub enum LocalDirectoryError {
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),
    #[error("failed to create directory\n  '{0}':\n  {1}")]
    MkDir(Box<Utf8Path>, io::Error),
    #[error("failed to read file\n  '{0}':\n  {1}")]
    ReadFile(Box<Utf8Path>, io::Error),
    #[error("failed to write file\n  '{0}':\n  {1}")]
    WriteFile(Box<Utf8Path>, io::Error),
    #[error("malformed settings file '{0}': {1}")]
    Parse(Box<Utf8Path>, serde_json::Error),
    #[error("invalid settings file '{0}': {1}")]
    Invalid(Box<Utf8Path>, SettingsValidationError),
    #[error("failed to serialize settings: {0}")]
    Serialize(serde_json::Error),
}

impl LocalDirectoryStore {
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        LocalDirectoryStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn settings_path<S: AsRef<str>>(&self, target: S) -> Result<Utf8PathBuf, InvalidTarget> {
        validate_target(&target)?;
        Ok(self.root.join(target.as_ref()).join(SETTINGS_FILE_NAME))
    }
}

impl ReadSettingsStore for LocalDirectoryStore {
    type ReadError = LocalDirectoryError;

    fn get<S: AsRef<str>>(
        &self,
        target: S,
    ) -> Result<Option<SettingsDocument>, LocalDirectoryError> {
        let path = self.settings_path(target)?;
        if !path.is_file() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| LocalDirectoryError::ReadFile(path.as_path().into(), e))?;
        let raw: SettingsDocumentRaw = serde_json::from_str(&contents)
            .map_err(|e| LocalDirectoryError::Parse(path.as_path().into(), e))?;

        raw.validate()
            .map(Some)
            .map_err(|e| LocalDirectoryError::Invalid(path.as_path().into(), e))
    }
}

impl WriteSettingsStore for LocalDirectoryStore {
    type WriteError = LocalDirectoryError;

    fn put<S: AsRef<str>>(
        &mut self,
        target: S,
        document: &SettingsDocument,
    ) -> Result<(), LocalDirectoryError> {
        let path = self.settings_path(target)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| LocalDirectoryError::MkDir(dir.into(), e))?;
        }

        let mut contents =
            serde_json::to_string_pretty(document).map_err(LocalDirectoryError::Serialize)?;
        contents.push('\n');

        std::fs::write(&path, contents)
            .map_err(|e| LocalDirectoryError::WriteFile(path.as_path().into(), e))
    }
}
