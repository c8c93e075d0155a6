// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::convert::Infallible;

use indexmap::IndexMap;

use crate::{inventory::ReadInventory, model::DescribedInstance};

/// Fixed list of instances per target, such as the `[[instance]]` entries of
/// the configuration file.
#[derive(Clone, Debug, Default)]
pub struct MemoryInventory {
    pub instances: IndexMap<String, Vec<DescribedInstance>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: AsRef<str>>(&mut self, target: S, instance: DescribedInstance) {
        self.instances
            .entry(target.as_ref().to_string())
            .or_default()
            .push(instance);
    }

    pub fn is_empty(&self) -> bool {
        self.instances.values().all(|v| v.is_empty())
    }
}

impl<S: AsRef<str>> FromIterator<(S, DescribedInstance)> for MemoryInventory {
    fn from_iter<T: IntoIterator<Item = (S, DescribedInstance)>>(iter: T) -> Self {
        let mut inventory = MemoryInventory::new();
        for (target, instance) in iter {
            inventory.insert(target, instance);
        }
        inventory
    }
}

impl ReadInventory for MemoryInventory {
    type Error = Infallible;

    fn instances<S: AsRef<str>>(&self, target: S) -> Result<Vec<DescribedInstance>, Infallible> {
        Ok(self
            .instances
            .get(target.as_ref())
            .cloned()
            .unwrap_or_default())
    }
}
