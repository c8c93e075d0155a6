// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::OnceLock;

use anstyle::Style;

pub struct Config {
    pub header: Style,
    pub good: Style,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header: Style::new(),
            good: Style::new(),
        }
    }
}

static STYLE_CONFIG: OnceLock<Config> = OnceLock::new();

pub fn set_style_config(config: Config) {
    let _ = STYLE_CONFIG.set(config);
}

pub fn get_style_config() -> &'static Config {
    STYLE_CONFIG.get_or_init(Config::default)
}
