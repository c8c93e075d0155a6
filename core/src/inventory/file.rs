// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    inventory::{DEFAULT_TARGET_TAG, ReadInventory},
    model::DescribedInstance,
};

/// Instances read from a saved `aws ec2 describe-instances` output. An
/// instance belongs to a target when its `tag_key` tag has the target as
/// value.
#[derive(Clone, Debug)]
pub struct FileInventory {
    pub path: Utf8PathBuf,
    pub tag_key: String,
}

#[derive(Error, Debug)]
pub enum FileInventoryError {
    #[error("failed to read inventory file\n  '{0}':\n  {1}")]
    ReadFile(Box<Utf8Path>, std::io::Error),
    #[error("failed to parse inventory file '{0}' as EC2 describe-instances output: {1}")]
    Parse(Box<Utf8Path>, serde_json::Error),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesOutput {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Ec2Instance>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Ec2Instance {
    #[serde(flatten)]
    described: DescribedInstance,
    #[serde(default)]
    tags: Vec<Tag>,
    state: Option<InstanceState>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Tag {
    key: String,
    value: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct InstanceState {
    name: String,
}

impl Ec2Instance {
    fn serves(&self, tag_key: &str, target: &str) -> bool {
        let running = self
            .state
            .as_ref()
            .is_none_or(|state| state.name == "running");
        let tagged = self
            .tags
            .iter()
            .any(|tag| tag.key == tag_key && tag.value == target);

        running && tagged
    }
}

impl FileInventory {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        FileInventory {
            path: path.as_ref().to_path_buf(),
            tag_key: DEFAULT_TARGET_TAG.to_string(),
        }
    }

    fn read(&self) -> Result<DescribeInstancesOutput, FileInventoryError> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| FileInventoryError::ReadFile(self.path.as_path().into(), e))?;

        serde_json::from_str(&contents)
            .map_err(|e| FileInventoryError::Parse(self.path.as_path().into(), e))
    }
}

impl ReadInventory for FileInventory {
    type Error = FileInventoryError;

    fn instances<S: AsRef<str>>(&self, target: S) -> Result<Vec<DescribedInstance>, Self::Error> {
        let output = self.read()?;

        Ok(output
            .reservations
            .into_iter()
            .flat_map(|reservation| reservation.instances)
            .filter(|instance| instance.serves(&self.tag_key, target.as_ref()))
            .map(|instance| instance.described)
            .collect())
    }
}
