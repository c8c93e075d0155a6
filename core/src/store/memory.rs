// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use crate::{
    model::SettingsDocument,
    store::{InvalidTarget, ReadSettingsStore, WriteSettingsStore, validate_target},
};

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub documents: HashMap<String, SettingsDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadSettingsStore for MemoryStore {
    type ReadError = InvalidTarget;

    fn get<S: AsRef<str>>(&self, target: S) -> Result<Option<SettingsDocument>, InvalidTarget> {
        validate_target(&target)?;
        Ok(self.documents.get(target.as_ref()).cloned())
    }
}

impl WriteSettingsStore for MemoryStore {
    type WriteError = InvalidTarget;

    fn put<S: AsRef<str>>(
        &mut self,
        target: S,
        document: &SettingsDocument,
    ) -> Result<(), InvalidTarget> {
        validate_target(&target)?;
        self.documents
            .insert(target.as_ref().to_string(), document.clone());
        Ok(())
    }
}
