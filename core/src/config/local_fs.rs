// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use super::Config;

pub const CONFIG_DIR: &str = "adjust";
pub const CONFIG_FILE: &str = "adjust.toml";

#[derive(Error, Debug)]
pub enum ConfigReadError {
    #[error("failed to deserialize TOML file `{0}`: {1}")]
    Toml(Box<Utf8Path>, toml::de::Error),
    #[error("failed to read file\n  '{0}':\n  {1}")]
    ReadFile(Box<Utf8Path>, std::io::Error),
    #[error("configuration directory path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

/// Reads a configuration file, or the default configuration if there is no
/// file at `path`.
pub fn get_config<P: AsRef<Utf8Path>>(path: P) -> Result<Config, ConfigReadError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(Config::default());
    }

    let contents =
        fs::read_to_string(path).map_err(|e| ConfigReadError::ReadFile(path.into(), e))?;
    let config = toml::from_str(&contents).map_err(|e| ConfigReadError::Toml(path.into(), e))?;
    log::debug!("read configuration from `{path}`");

    Ok(config)
}

/// `adjust.toml` in the user configuration directory, if there is one.
pub fn user_config_path() -> Result<Option<Utf8PathBuf>, ConfigReadError> {
    let Some(mut path) = dirs::config_dir() else {
        return Ok(None);
    };
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);

    Utf8PathBuf::from_path_buf(path)
        .map(Some)
        .map_err(|path| ConfigReadError::NonUtf8Path(path.to_string_lossy().into_owned()))
}

/// Configuration of the working directory merged over the user
/// configuration.
pub fn load_configs<P: AsRef<Utf8Path>>(working_dir: P) -> Result<Config, ConfigReadError> {
    let mut config = get_config(working_dir.as_ref().join(CONFIG_FILE))?;
    if let Some(path) = user_config_path()? {
        config.merge(get_config(path)?);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::{error::Error, io::Write};

    use camino::Utf8Path;

    use crate::config::{Config, SettleConfig, local_fs};

    #[test]
    fn load_configs() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let dir_path = Utf8Path::from_path(dir.path()).ok_or("non UTF-8 temporary directory")?;
        let mut config_file = std::fs::File::create(dir_path.join(local_fs::CONFIG_FILE))?;
        let config = Config {
            quiet: Some(true),
            verbose: Some(false),
            settle: Some(SettleConfig {
                attempts: Some(3),
                interval_secs: Some(0),
            }),
            ..Default::default()
        };
        config_file.write_all(toml::to_string_pretty(&config)?.as_bytes())?;

        let config_read = local_fs::get_config(dir_path.join(local_fs::CONFIG_FILE))?;

        assert_eq!(config_read, config);

        Ok(())
    }

    #[test]
    fn missing_file_is_default() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let dir_path = Utf8Path::from_path(dir.path()).ok_or("non UTF-8 temporary directory")?;

        assert_eq!(
            local_fs::get_config(dir_path.join(local_fs::CONFIG_FILE))?,
            Config::default()
        );

        Ok(())
    }

    #[test]
    fn malformed_file_is_an_error() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let dir_path = Utf8Path::from_path(dir.path()).ok_or("non UTF-8 temporary directory")?;
        std::fs::write(dir_path.join(local_fs::CONFIG_FILE), "[settle]\nattempts = \"many\"\n")?;

        assert!(matches!(
            local_fs::get_config(dir_path.join(local_fs::CONFIG_FILE)),
            Err(local_fs::ConfigReadError::Toml(..))
        ));

        Ok(())
    }
}
