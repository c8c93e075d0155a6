// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{
    commands::adjust::Settle,
    describe::DescribeEndpoint,
    inventory::{combined::CombinedInventory, file::FileInventory, memory::MemoryInventory},
    model::{Declarations, DescribedInstance},
    store::DEFAULT_STORE_NAME,
};

#[cfg(feature = "filesystem")]
pub mod local_fs;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub describe: Option<DescribeConfig>,
    pub settle: Option<SettleConfig>,
    pub store: Option<StoreConfig>,
    pub inventory: Option<InventoryConfig>,
    #[serde(rename = "instance", default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<InstanceConfig>,
    #[serde(rename = "component", default, skip_serializing_if = "Declarations::is_empty")]
    pub components: Declarations,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeConfig {
    pub port: Option<u16>,
    pub path: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleConfig {
    pub attempts: Option<u32>,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Local,
    Http,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub kind: Option<StoreKind>,
    pub path: Option<Utf8PathBuf>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub file: Option<Utf8PathBuf>,
    pub tag_key: Option<String>,
}

/// A statically configured instance of a target.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub target: String,
    pub instance_id: String,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub instance_type: Option<String>,
}

/// Where published settings go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Local(Utf8PathBuf),
    Http(Url),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("`store.url` is required when `store.kind` is \"http\"")]
    MissingStoreUrl,
    #[error("invalid store URL `{0}`: {1}")]
    StoreUrl(String, url::ParseError),
}

impl Config {
    /// Fills in everything `self` leaves unset from `config`. Instances are
    /// appended and component declarations merged per setting.
    pub fn merge(&mut self, config: Config) {
        self.quiet = self.quiet.or(config.quiet);
        self.verbose = self.verbose.or(config.verbose);
        merge_section(&mut self.describe, config.describe, DescribeConfig::merge);
        merge_section(&mut self.settle, config.settle, SettleConfig::merge);
        merge_section(&mut self.store, config.store, StoreConfig::merge);
        merge_section(&mut self.inventory, config.inventory, InventoryConfig::merge);
        self.instances.extend(config.instances);

        for (name, component) in config.components {
            let known = self.components.entry(name).or_default();
            for (key, declaration) in component.settings {
                known.settings.entry(key).or_insert(declaration);
            }
        }
    }

    pub fn describe_endpoint(&self) -> DescribeEndpoint {
        let mut endpoint = DescribeEndpoint::default();
        if let Some(describe) = &self.describe {
            if let Some(port) = describe.port {
                endpoint.port = port;
            }
            if let Some(path) = &describe.path {
                endpoint.path = path.clone();
            }
            if let Some(timeout_secs) = describe.timeout_secs {
                endpoint.timeout = Duration::from_secs(timeout_secs);
            }
        }
        endpoint
    }

    pub fn settle(&self) -> Settle {
        let mut settle = Settle::default();
        if let Some(config) = &self.settle {
            if let Some(attempts) = config.attempts {
                settle.attempts = attempts.max(1);
            }
            if let Some(interval_secs) = config.interval_secs {
                settle.interval = Duration::from_secs(interval_secs);
            }
        }
        settle
    }

    pub fn declarations(&self) -> &Declarations {
        &self.components
    }

    /// Configured instances plus the inventory file, if one is set. A
    /// relative inventory path is taken relative to `working_dir`.
    pub fn inventory<P: AsRef<Utf8Path>>(&self, working_dir: P) -> CombinedInventory {
        let static_instances: MemoryInventory = self
            .instances
            .iter()
            .map(|instance| (instance.target.as_str(), instance.to_described()))
            .collect();

        let file = self.inventory.as_ref().and_then(|inventory| {
            inventory.file.as_ref().map(|file| {
                let mut file_inventory = FileInventory::new(working_dir.as_ref().join(file));
                if let Some(tag_key) = &inventory.tag_key {
                    file_inventory.tag_key = tag_key.clone();
                }
                file_inventory
            })
        });

        CombinedInventory {
            static_instances,
            file,
        }
    }

    pub fn store_location<P: AsRef<Utf8Path>>(
        &self,
        working_dir: P,
    ) -> Result<StoreLocation, ConfigError> {
        let store = self.store.clone().unwrap_or_default();
        let kind = store.kind.unwrap_or(if store.url.is_some() {
            StoreKind::Http
        } else {
            StoreKind::Local
        });

        match kind {
            StoreKind::Local => Ok(StoreLocation::Local(
                working_dir
                    .as_ref()
                    .join(store.path.as_deref().unwrap_or(Utf8Path::new(DEFAULT_STORE_NAME))),
            )),
            StoreKind::Http => {
                let url = store.url.ok_or(ConfigError::MissingStoreUrl)?;
                Url::parse(&url)
                    .map(StoreLocation::Http)
                    .map_err(|e| ConfigError::StoreUrl(url, e))
            }
        }
    }
}

impl InstanceConfig {
    pub fn to_described(&self) -> DescribedInstance {
        DescribedInstance {
            instance_id: self.instance_id.clone(),
            public_ip_address: self.public_ip.clone(),
            private_ip_address: self.private_ip.clone(),
            instance_type: self.instance_type.clone(),
        }
    }
}

impl DescribeConfig {
    fn merge(&mut self, other: DescribeConfig) {
        self.port = self.port.or(other.port);
        self.path = self.path.take().or(other.path);
        self.timeout_secs = self.timeout_secs.or(other.timeout_secs);
    }
}

impl SettleConfig {
    fn merge(&mut self, other: SettleConfig) {
        self.attempts = self.attempts.or(other.attempts);
        self.interval_secs = self.interval_secs.or(other.interval_secs);
    }
}

impl StoreConfig {
    fn merge(&mut self, other: StoreConfig) {
        self.kind = self.kind.or(other.kind);
        self.path = self.path.take().or(other.path);
        self.url = self.url.take().or(other.url);
    }
}

impl InventoryConfig {
    fn merge(&mut self, other: InventoryConfig) {
        self.file = self.file.take().or(other.file);
        self.tag_key = self.tag_key.take().or(other.tag_key);
    }
}

fn merge_section<T>(target: &mut Option<T>, src: Option<T>, merge: fn(&mut T, T)) {
    let Some(src) = src else {
        return;
    };
    match target {
        Some(target) => merge(target, src),
        None => *target = Some(src),
    }
}
