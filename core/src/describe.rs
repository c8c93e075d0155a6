// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access to the describe endpoint every instance serves, reporting the
//! configuration it is currently running with.

use std::{sync::Arc, time::Duration};

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

use crate::model::{DescribedInstance, SettingsDocument, SettingsDocumentRaw, SettingsValidationError};

pub const DEFAULT_DESCRIBE_PORT: u16 = 8080;
pub const DEFAULT_DESCRIBE_PATH: &str = "/describe.json";
pub const DEFAULT_DESCRIBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("instance `{0}` has neither a public nor a private IP address")]
    NoAddress(Box<str>),
    #[error("failed to build describe URL for address `{0}`: {1}")]
    Url(Box<str>, url::ParseError),
    #[error("error making an HTTP request to '{0}':\n{1}")]
    HTTPRequest(Box<str>, reqwest_middleware::Error),
    #[error("failed to read HTTP response from '{0}': {1}")]
    HTTPBody(Box<str>, reqwest::Error),
    #[error("describe endpoint '{0}' answered with status {1}")]
    Status(Box<str>, u16),
    #[error("describe response is not valid text: {0}")]
    Decode(String),
    #[error("malformed describe response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid describe response: {0}")]
    Invalid(#[from] SettingsValidationError),
}

/// Where the describe endpoint lives on each instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescribeEndpoint {
    pub port: u16,
    pub path: String,
    pub timeout: Duration,
}

impl Default for DescribeEndpoint {
    fn default() -> Self {
        DescribeEndpoint {
            port: DEFAULT_DESCRIBE_PORT,
            path: DEFAULT_DESCRIBE_PATH.to_string(),
            timeout: DEFAULT_DESCRIBE_TIMEOUT,
        }
    }
}

impl DescribeEndpoint {
    pub fn url<S: AsRef<str>>(&self, address: S) -> Result<url::Url, DescribeError> {
        let address = address.as_ref();
        // Bare IPv6 addresses need brackets inside a URL authority.
        let host = if address.contains(':') && !address.starts_with('[') {
            format!("[{address}]")
        } else {
            address.to_string()
        };
        let path = self.path.trim_start_matches('/');

        url::Url::parse(&format!("http://{host}:{}/{path}", self.port))
            .map_err(|e| DescribeError::Url(address.into(), e))
    }
}

/// Something that can report the configuration of an instance.
pub trait DescribeInstance {
    type Error: std::error::Error;

    fn describe(&self, instance: &DescribedInstance) -> Result<SettingsDocument, Self::Error>;
}

/// Decodes a describe response body. Instance agents on Windows hosts answer
/// in UTF-16, with or without a byte order mark.
pub fn decode_body(bytes: &[u8]) -> Result<String, DescribeError> {
    let text = match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest)?,
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes)?,
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes)?,
        [first, 0, ..] if *first != 0 && bytes.len() % 2 == 0 => {
            utf16(bytes, u16::from_le_bytes)?
        }
        [0, second, ..] if *second != 0 && bytes.len() % 2 == 0 => {
            utf16(bytes, u16::from_be_bytes)?
        }
        _ => utf8(bytes)?,
    };

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

fn utf8(bytes: &[u8]) -> Result<String, DescribeError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| DescribeError::Decode(e.to_string()))
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, DescribeError> {
    if bytes.len() % 2 != 0 {
        return Err(DescribeError::Decode(
            "odd number of bytes in UTF-16 text".to_string(),
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|e| DescribeError::Decode(e.to_string()))
}

pub fn parse_description(bytes: &[u8]) -> Result<SettingsDocument, DescribeError> {
    let text = decode_body(bytes)?;
    let raw: SettingsDocumentRaw = serde_json::from_str(&text)?;

    Ok(raw.validate()?)
}

/// Fetches instance reports over HTTP, one blocking request at a time.
#[derive(Debug, Clone)]
pub struct DescribeClient {
    pub client: ClientWithMiddleware,
    pub runtime: Arc<tokio::runtime::Runtime>,
    pub endpoint: DescribeEndpoint,
}

impl DescribeClient {
    pub fn new(
        client: ClientWithMiddleware,
        runtime: Arc<tokio::runtime::Runtime>,
        endpoint: DescribeEndpoint,
    ) -> Self {
        DescribeClient {
            client,
            runtime,
            endpoint,
        }
    }

    async fn fetch(&self, url: &reqwest::Url) -> Result<Vec<u8>, DescribeError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json, text/plain")
            .timeout(self.endpoint.timeout)
            .send()
            .await
            .map_err(|e| DescribeError::HTTPRequest(url.as_str().into(), e))?;

        if !response.status().is_success() {
            return Err(DescribeError::Status(
                url.as_str().into(),
                response.status().as_u16(),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DescribeError::HTTPBody(url.as_str().into(), e))?;

        Ok(body.to_vec())
    }
}

impl DescribeInstance for DescribeClient {
    type Error = DescribeError;

    fn describe(&self, instance: &DescribedInstance) -> Result<SettingsDocument, DescribeError> {
        let address = instance
            .address()
            .ok_or_else(|| DescribeError::NoAddress(instance.instance_id.as_str().into()))?;
        let url = self.endpoint.url(address)?;

        log::debug!("describing instance `{}` at {url}", instance.instance_id);
        let body = self.runtime.block_on(self.fetch(&url))?;

        parse_description(&body)
    }
}
