/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint, value_parser};

use rtsched_rules::RuleStore;
use rtsched_rules::file::load_rules_file;

pub(crate) const COMMAND: &str = "check";

const COMMAND_ARG_FILE: &str = "file";

pub(crate) fn command() -> Command {
    Command::new(COMMAND)
        .about("Check thread rule files")
        .arg(
            Arg::new(COMMAND_ARG_FILE)
                .help("The rule files to check")
                .value_name("FILE")
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath)
                .required(true),
        )
}

pub(crate) fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let Some(files) = args.get_many::<PathBuf>(COMMAND_ARG_FILE) else {
        return Ok(());
    };

    for path in files {
        let store = RuleStore::new();
        let n = load_rules_file(&store, path).context("rule file check failed")?;
        println!("{}: {n} rule(s)", path.display());
        if !store.is_empty() {
            print!("{}", store.table());
        }
    }
    Ok(())
}
