// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::prelude::*;
use predicates::prelude::*;

// pub due to https://github.com/rust-lang/rust/issues/46379
mod common;
pub use common::*;

#[test]
fn version() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, _cwd, out) = run_adjust(["--version", "1234"], None, None)?;

    out.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    Ok(())
}

#[test]
fn info() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, _cwd, out) = run_adjust(["--info", "1234"], None, None)?;

    out.clone().assert().success();

    let info: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(info["has_cancel"], false);
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));

    Ok(())
}

#[test]
fn query_unknown_target() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, _cwd, out) = run_adjust(["--query", "1234"], None, None)?;

    out.clone().assert().success();

    let document: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert!(document["application"]["components"].is_object());

    Ok(())
}

#[test]
fn missing_target() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, _cwd, out) = run_adjust(["--query"], None, None)?;

    out.assert().failure().code(2);

    Ok(())
}

#[test]
fn exclusive_modes() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, _cwd, out) = run_adjust(["--info", "--query", "1234"], None, None)?;

    out.assert().failure().code(2);

    Ok(())
}
