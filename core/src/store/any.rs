// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

use crate::{
    auth::HTTPAuthentication,
    model::SettingsDocument,
    store::{
        InvalidTarget, ReadSettingsStore, WriteSettingsStore,
        local_directory::{LocalDirectoryError, LocalDirectoryStore},
        memory::MemoryStore,
        reqwest_http::{HTTPSettingsStore, HTTPStoreError},
    },
};

/// Settings store chosen at runtime from configuration.
#[derive(Debug)]
pub enum AnyStore<Policy> {
    Local(LocalDirectoryStore),
    Http(HTTPSettingsStore<Policy>),
    Memory(MemoryStore),
}

#[derive(Error, Debug)]
pub enum AnyStoreError {
    #[error(transparent)]
    Local(#[from] LocalDirectoryError),
    #[error(transparent)]
    Http(#[from] HTTPStoreError),
    #[error(transparent)]
    Memory(#[from] InvalidTarget),
}

impl<Policy: HTTPAuthentication> AnyStore<Policy> {
    pub fn http(
        base_url: reqwest::Url,
        client: ClientWithMiddleware,
        runtime: Arc<tokio::runtime::Runtime>,
        auth_policy: Arc<Policy>,
    ) -> Self {
        AnyStore::Http(HTTPSettingsStore {
            client,
            runtime,
            auth_policy,
            base_url,
        })
    }
}

impl<Policy: HTTPAuthentication> ReadSettingsStore for AnyStore<Policy> {
    type ReadError = AnyStoreError;

    fn get<S: AsRef<str>>(&self, target: S) -> Result<Option<SettingsDocument>, AnyStoreError> {
        Ok(match self {
            AnyStore::Local(store) => store.get(target)?,
            AnyStore::Http(store) => store.get(target)?,
            AnyStore::Memory(store) => store.get(target)?,
        })
    }
}

impl<Policy: HTTPAuthentication> WriteSettingsStore for AnyStore<Policy> {
    type WriteError = AnyStoreError;

    fn put<S: AsRef<str>>(
        &mut self,
        target: S,
        document: &SettingsDocument,
    ) -> Result<(), AnyStoreError> {
        match self {
            AnyStore::Local(store) => store.put(target, document)?,
            AnyStore::Http(store) => store.put(target, document)?,
            AnyStore::Memory(store) => store.put(target, document)?,
        }
        Ok(())
    }
}
