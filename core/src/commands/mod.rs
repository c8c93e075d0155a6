// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod adjust;
pub mod info;
pub mod query;
pub mod validate;
