// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    error::Error,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Output},
};
use tempfile::TempDir;

pub const ADJUST_SETTINGS: &str = r#"{
    "application": {
        "components": {
            "web": {
                "settings": {
                    "UriEnableCache": {"value": 1},
                    "UriScavengerPeriod": {"value": 260},
                    "WebConfigCacheEnabled": {"value": 0},
                    "WebConfigEnableKernelCache": {"value": 1},
                    "inst_type": {"value": "t2.micro"}
                }
            }
        }
    }
}"#;

pub fn adjust_cmd_in<'a, I: IntoIterator<Item = &'a str>>(
    cwd: &Path,
    args: I,
    cfg: Option<&str>,
) -> Result<Command, Box<dyn Error>> {
    let cfg_args = if let Some(config) = cfg {
        let config_path = cwd.join("adjust.toml");
        let mut config_file = std::fs::File::create(&config_path)?;
        config_file.write_all(config.as_bytes())?;
        vec![
            "--config-file".to_string(),
            config_path.display().to_string(),
        ]
    } else {
        vec![]
    };
    let args = [
        args.into_iter().map(|s| s.to_string()).collect(),
        vec!["--no-config".to_string()],
        cfg_args,
    ]
    .concat();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adjust"));

    cmd.env("NO_COLOR", "1");
    cmd.env_remove("ADJUST_STORE_TOKEN");

    cmd.args(args);

    cmd.current_dir(cwd);

    Ok(cmd)
}

pub fn new_temp_cwd() -> Result<(TempDir, PathBuf), Box<dyn Error>> {
    let temp_dir = TempDir::with_prefix("adjust_test_")?;
    let temp_dir_path = temp_dir.path().canonicalize()?;

    Ok((temp_dir, temp_dir_path))
}

pub fn run_adjust_in<'a, I: IntoIterator<Item = &'a str>>(
    cwd: &Path,
    args: I,
    stdin: Option<&str>,
    cfg: Option<&str>,
) -> Result<Output, Box<dyn Error>> {
    let cmd = adjust_cmd_in(cwd, args, cfg)?;

    Ok(assert_cmd::Command::from_std(cmd)
        .write_stdin(stdin.unwrap_or_default())
        .output()?)
}

pub fn run_adjust<'a, I: IntoIterator<Item = &'a str>>(
    args: I,
    stdin: Option<&str>,
    cfg: Option<&str>,
) -> Result<(TempDir, PathBuf, Output), Box<dyn Error>> {
    let (temp_dir, cwd) = new_temp_cwd()?;
    let out = run_adjust_in(&cwd, args, stdin, cfg)?;

    Ok((temp_dir, cwd, out))
}

/// Configuration pointing instances of target `1234` at a local mock server.
pub fn mock_instances_config(port: u16, instances: usize) -> String {
    let mut config = format!(
        "[describe]\nport = {port}\ntimeout_secs = 5\n\n[settle]\nattempts = 1\ninterval_secs = 0\n"
    );
    for id in 1..=instances {
        config.push_str(&format!(
            "\n[[instance]]\ntarget = \"1234\"\ninstance_id = \"{id}\"\npublic_ip = \"127.0.0.1\"\ninstance_type = \"t2.micro\"\n"
        ));
    }
    config
}

pub fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}
