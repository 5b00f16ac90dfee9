/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, value_parser};

use rtsched_rules::file::{RuleFiles, load_rule_files};
use rtsched_rules::{OsThread, RuleApplier, RuleStore, ThreadStartHook};

pub(crate) const ARG_PID: &str = "pid";

pub(crate) fn pid_arg() -> Arg {
    Arg::new(ARG_PID)
        .help("Id of the target process")
        .value_name("PID")
        .num_args(1)
        .value_parser(value_parser!(i32))
        .short('p')
        .long("pid")
        .required(true)
}

pub(crate) fn get_pid(args: &ArgMatches) -> anyhow::Result<i32> {
    args.get_one::<i32>(ARG_PID)
        .copied()
        .ok_or_else(|| anyhow!("no target process id set"))
}

pub(crate) fn load_hook(files: &RuleFiles) -> ThreadStartHook {
    let store = Arc::new(RuleStore::new());
    load_rule_files(&store, files);
    ThreadStartHook::new(store, RuleApplier::default())
}

pub(crate) fn find_thread(pid: i32, ident: &str) -> anyhow::Result<Option<OsThread>> {
    OsThread::find(pid, ident)
        .context(format!("failed to look up thread {ident} in process {pid}"))
}

pub(crate) fn list_threads(pid: i32) -> anyhow::Result<Vec<OsThread>> {
    OsThread::list(pid).context(format!("failed to list threads of process {pid}"))
}
