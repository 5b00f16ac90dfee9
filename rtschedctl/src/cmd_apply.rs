/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use clap::{ArgMatches, Command};

use rtsched_rules::file::RuleFiles;
use rtsched_rules::{ThreadSched, ThreadStartHook};

use crate::common;

pub(crate) const COMMAND: &str = "apply";

pub(crate) fn command() -> Command {
    Command::new(COMMAND)
        .about("Apply the thread rules to all running threads of a process")
        .arg(common::pid_arg())
}

/// Run every thread of `pid` through the thread start hook.
pub(crate) fn apply_all<W: Write>(
    w: &mut W,
    hook: &ThreadStartHook,
    pid: i32,
) -> anyhow::Result<()> {
    let mut total = 0;
    for mut thread in common::list_threads(pid)? {
        let matched = hook.on_thread_start(&mut thread);
        if matched > 0 {
            writeln!(w, "{} {}: {matched} rule(s) applied", thread.tid(), thread.name())?;
            total += 1;
        }
    }
    writeln!(w, "{total} thread(s) of process {pid} matched")?;
    Ok(())
}

pub(crate) fn run(files: &RuleFiles, args: &ArgMatches) -> anyhow::Result<()> {
    let pid = common::get_pid(args)?;
    let hook = common::load_hook(files);
    apply_all(&mut io::stdout().lock(), &hook, pid)
}
