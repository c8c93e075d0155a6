// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

use crate::{
    auth::HTTPAuthentication,
    model::{SettingsDocument, SettingsDocumentRaw, SettingsValidationError},
    store::{InvalidTarget, ReadSettingsStore, SETTINGS_FILE_NAME, WriteSettingsStore, validate_target},
};

/// Settings kept as objects below a base URL, for example an S3 bucket
/// prefix such as https://bucket.s3.amazonaws.com/adjust/. The document of
/// a target lives at `<base>/<target>/settings.json`.
#[derive(Debug)]
pub struct HTTPSettingsStore<Policy> {
    pub client: ClientWithMiddleware,
    pub runtime: Arc<tokio::runtime::Runtime>,
    pub auth_policy: Arc<Policy>,
    pub base_url: reqwest::Url,
}

#[derive(Error, Debug)]
pub enum HTTPStoreError {
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),
    #[error("store URL `{0}` cannot have path segments appended")]
    CannotBeABase(Box<str>),
    #[error("error making an HTTP request to '{0}':\n{1}")]
    HTTPRequest(Box<str>, reqwest_middleware::Error),
    #[error("failed to read HTTP response from '{0}': {1}")]
    HTTPBody(Box<str>, reqwest::Error),
    #[error("authentication failed for '{0}': {1}")]
    AuthError(Box<str>, String),
    #[error("server error ({1}) for '{0}': {2}")]
    ServerError(Box<str>, u16, String),
    #[error("malformed settings object '{0}': {1}")]
    Parse(Box<str>, serde_json::Error),
    #[error("invalid settings object '{0}': {1}")]
    Invalid(Box<str>, SettingsValidationError),
    #[error("failed to serialize settings: {0}")]
    Serialize(serde_json::Error),
}

impl<Policy: HTTPAuthentication> HTTPSettingsStore<Policy> {
    pub fn settings_url<S: AsRef<str>>(&self, target: S) -> Result<reqwest::Url, HTTPStoreError> {
        validate_target(&target)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HTTPStoreError::CannotBeABase(self.base_url.as_str().into()))?
            .pop_if_empty()
            .push(target.as_ref())
            .push(SETTINGS_FILE_NAME);

        Ok(url)
    }

    async fn fetch(&self, url: &reqwest::Url) -> Result<Option<String>, HTTPStoreError> {
        let this_url = url.clone();
        let request = move |client: &ClientWithMiddleware| {
            client
                .get(this_url.clone())
                .header(reqwest::header::ACCEPT, "application/json")
        };
        let response = self
            .auth_policy
            .with_authentication(&self.client, &request)
            .await
            .map_err(|e| HTTPStoreError::HTTPRequest(url.as_str().into(), e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HTTPStoreError::HTTPBody(url.as_str().into(), e))?;

        match status {
            200..=299 => Ok(Some(body)),
            404 => Ok(None),
            401 | 403 => Err(HTTPStoreError::AuthError(url.as_str().into(), body)),
            _ => Err(HTTPStoreError::ServerError(url.as_str().into(), status, body)),
        }
    }

    async fn upload(&self, url: &reqwest::Url, contents: String) -> Result<(), HTTPStoreError> {
        let this_url = url.clone();
        let request = move |client: &ClientWithMiddleware| {
            client
                .put(this_url.clone())
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(contents.clone())
        };
        let response = self
            .auth_policy
            .with_authentication(&self.client, &request)
            .await
            .map_err(|e| HTTPStoreError::HTTPRequest(url.as_str().into(), e))?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();

        match status {
            401 | 403 => Err(HTTPStoreError::AuthError(url.as_str().into(), body)),
            _ => Err(HTTPStoreError::ServerError(url.as_str().into(), status, body)),
        }
    }
}

impl<Policy: HTTPAuthentication> ReadSettingsStore for HTTPSettingsStore<Policy> {
    type ReadError = HTTPStoreError;

    fn get<S: AsRef<str>>(&self, target: S) -> Result<Option<SettingsDocument>, HTTPStoreError> {
        let url = self.settings_url(target)?;
        let Some(body) = self.runtime.block_on(self.fetch(&url))? else {
            return Ok(None);
        };

        let raw: SettingsDocumentRaw = serde_json::from_str(&body)
            .map_err(|e| HTTPStoreError::Parse(url.as_str().into(), e))?;

        raw.validate()
            .map(Some)
            .map_err(|e| HTTPStoreError::Invalid(url.as_str().into(), e))
    }
}

impl<Policy: HTTPAuthentication> WriteSettingsStore for HTTPSettingsStore<Policy> {
    type WriteError = HTTPStoreError;

    fn put<S: AsRef<str>>(
        &mut self,
        target: S,
        document: &SettingsDocument,
    ) -> Result<(), HTTPStoreError> {
        let url = self.settings_url(target)?;
        let contents = serde_json::to_string(document).map_err(HTTPStoreError::Serialize)?;

        log::debug!("uploading settings to {url}");

        self.runtime.block_on(self.upload(&url, contents))
    }
}
