/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use clap::Command;

use rtsched_rules::file::RuleFiles;

pub(crate) const COMMAND: &str = "rules";

pub(crate) fn command() -> Command {
    Command::new(COMMAND).about("Load the thread rule files and show all rules")
}

pub(crate) fn run(files: &RuleFiles) -> anyhow::Result<()> {
    let hook = crate::common::load_hook(files);
    print!("{}", hook.store().table());
    Ok(())
}
