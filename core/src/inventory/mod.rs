// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sources of the instances that make up a target.

use crate::model::DescribedInstance;

pub mod combined;
pub mod file;
pub mod memory;

/// Default tag naming the target an EC2 instance belongs to.
pub const DEFAULT_TARGET_TAG: &str = "adjust:target";

pub trait ReadInventory {
    type Error: std::error::Error + std::fmt::Debug;

    /// Instances currently serving `target`, in a stable order.
    fn instances<S: AsRef<str>>(&self, target: S) -> Result<Vec<DescribedInstance>, Self::Error>;
}
