// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Corresponds to the `--config-file` command line argument. Should be a file path to
/// an `adjust.toml` configuration file.
pub const ADJUST_CONFIG_FILE: &str = "ADJUST_CONFIG_FILE";

/// Corresponds to the `--no-config` command line argument. If set prevents discovery of
/// configuration files.
pub const ADJUST_NO_CONFIG: &str = "ADJUST_NO_CONFIG";

/// Bearer token sent to an HTTP settings store that rejects anonymous requests.
pub const ADJUST_STORE_TOKEN: &str = "ADJUST_STORE_TOKEN";

/// Username for basic authentication against an HTTP settings store. Used together
/// with [`ADJUST_STORE_PASS`] when no token is set.
pub const ADJUST_STORE_USER: &str = "ADJUST_STORE_USER";

/// Password for basic authentication against an HTTP settings store.
pub const ADJUST_STORE_PASS: &str = "ADJUST_STORE_PASS";
