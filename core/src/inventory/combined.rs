// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use crate::{
    inventory::{
        ReadInventory,
        file::{FileInventory, FileInventoryError},
        memory::MemoryInventory,
    },
    model::DescribedInstance,
};

/// Statically configured instances followed by those of an optional
/// inventory file. An instance listed by both is kept once.
#[derive(Clone, Debug, Default)]
pub struct CombinedInventory {
    pub static_instances: MemoryInventory,
    pub file: Option<FileInventory>,
}

#[derive(Error, Debug)]
pub enum CombinedInventoryError {
    #[error(transparent)]
    File(#[from] FileInventoryError),
}

impl ReadInventory for CombinedInventory {
    type Error = CombinedInventoryError;

    fn instances<S: AsRef<str>>(&self, target: S) -> Result<Vec<DescribedInstance>, Self::Error> {
        let mut instances = match self.static_instances.instances(target.as_ref()) {
            Ok(instances) => instances,
            Err(e) => match e {},
        };

        if let Some(file) = &self.file {
            for instance in file.instances(target.as_ref())? {
                if !instances
                    .iter()
                    .any(|known| known.instance_id == instance.instance_id)
                {
                    instances.push(instance);
                }
            }
        }

        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use camino::Utf8Path;

    use super::CombinedInventory;
    use crate::{
        inventory::{ReadInventory, file::FileInventory, memory::MemoryInventory},
        model::DescribedInstance,
    };

    #[test]
    fn empty_inventory_has_no_instances() -> Result<(), Box<dyn std::error::Error>> {
        let inventory = CombinedInventory::default();

        assert!(inventory.instances("1234")?.is_empty());

        Ok(())
    }

    #[test]
    fn static_instances_are_listed() -> Result<(), Box<dyn std::error::Error>> {
        let inventory = CombinedInventory {
            static_instances: MemoryInventory::from_iter([(
                "1234",
                DescribedInstance::new("1", "192.168.1.1"),
            )]),
            ..Default::default()
        };

        assert_eq!(inventory.instances("1234")?.len(), 1);

        Ok(())
    }

    #[test]
    fn file_instances_follow_static_ones() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            br#"{"Reservations": [{"Instances": [
                {"InstanceId": "1", "PrivateIpAddress": "10.0.0.1",
                 "Tags": [{"Key": "adjust:target", "Value": "1234"}]},
                {"InstanceId": "3", "PrivateIpAddress": "10.0.0.3",
                 "Tags": [{"Key": "adjust:target", "Value": "1234"}]}
            ]}]}"#,
        )?;
        let path = Utf8Path::from_path(file.path()).ok_or("non UTF-8 temporary path")?;

        let inventory = CombinedInventory {
            static_instances: MemoryInventory::from_iter([(
                "1234",
                DescribedInstance::new("1", "192.168.1.1"),
            )]),
            file: Some(FileInventory::new(path)),
        };

        let instances = inventory.instances("1234")?;
        let ids: Vec<&str> = instances.iter().map(|i| i.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(instances[0].address(), Some("192.168.1.1"));

        Ok(())
    }
}
