// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(refining_impl_trait)]

pub mod commands;
pub use commands::*;

pub mod model;

pub mod auth;
pub mod config;
pub mod describe;
pub mod inventory;
pub mod store;
pub mod style;
