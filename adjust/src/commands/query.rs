// SPDX-FileCopyrightText: © 2025 Adjust driver contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::Write;

use anyhow::Result;

use adjust_core::{
    describe::DescribeInstance, inventory::ReadInventory, model::Declarations, query::do_query,
    store::ReadSettingsStore,
};

pub fn command_query<W, I, D, St>(
    target: &str,
    inventory: &I,
    describer: &D,
    store: &St,
    declarations: &Declarations,
    mut output: W,
) -> Result<()>
where
    W: Write,
    I: ReadInventory,
    D: DescribeInstance,
    St: ReadSettingsStore,
{
    let document = do_query(target, inventory, describer, store, declarations);

    serde_json::to_writer_pretty(&mut output, &document)?;
    writeln!(output)?;

    Ok(())
}
