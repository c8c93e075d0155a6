// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str =
    "Adjust driver for EC2 instances, validating settings through each instance's describe endpoint";
/// An adjust step runs to completion once started.
pub const HAS_CANCEL: bool = false;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DriverInfo {
    pub version: &'static str,
    pub has_cancel: bool,
    pub description: &'static str,
}

impl DriverInfo {
    pub fn current() -> Self {
        DriverInfo {
            version: VERSION,
            has_cancel: HAS_CANCEL,
            description: DESCRIPTION,
        }
    }
}

pub fn do_info() -> DriverInfo {
    DriverInfo::current()
}

#[cfg(test)]
mod tests {
    use super::do_info;

    #[test]
    fn info_json() -> Result<(), serde_json::Error> {
        let info = serde_json::to_value(do_info())?;

        assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(info["has_cancel"], false);
        assert!(info["description"].is_string());

        Ok(())
    }
}
