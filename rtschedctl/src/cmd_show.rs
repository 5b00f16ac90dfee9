/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use clap::{Arg, ArgMatches, Command};

use rtsched_compat::SchedParam;
use rtsched_rules::{CpuSet, OsThread, SchedPolicy, ThreadSched};

use crate::common;

pub(crate) const COMMAND: &str = "show";

const COMMAND_ARG_THREAD: &str = "thread";

pub(crate) fn command() -> Command {
    Command::new(COMMAND)
        .about("Show the scheduling of the threads of a process")
        .arg(common::pid_arg())
        .arg(
            Arg::new(COMMAND_ARG_THREAD)
                .help("Only show this thread, by thread id or thread name")
                .value_name("THREAD"),
        )
}

fn write_header<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "{:<16} {:>7} {:>6} {:>4} CPUSET", "NAME", "TID", "POLICY", "PRIO")
}

fn write_line<W: Write>(
    w: &mut W,
    name: &str,
    tid: i32,
    param: Option<SchedParam>,
    cpus: Option<CpuSet>,
) -> io::Result<()> {
    let (policy, priority) = match param {
        Some(p) => (SchedPolicy::raw_name(p.policy), p.priority.to_string()),
        None => ("?", "?".to_string()),
    };
    let cpus = cpus.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string());
    writeln!(w, "{name:<16} {tid:>7} {policy:>6} {priority:>4} {cpus}")
}

fn write_thread<W: Write>(w: &mut W, thread: &OsThread) -> io::Result<()> {
    write_line(
        w,
        thread.name(),
        thread.tid(),
        thread.raw_sched_param().ok(),
        thread.affinity().ok(),
    )
}

/// Print the threads of `pid`, or only the one matching `ident`.
pub(crate) fn show<W: Write>(w: &mut W, pid: i32, ident: Option<&str>) -> anyhow::Result<()> {
    match ident {
        Some(ident) => match common::find_thread(pid, ident)? {
            Some(thread) => {
                write_header(w)?;
                write_thread(w, &thread)?;
            }
            None => writeln!(w, "thread {ident} not found in process {pid}")?,
        },
        None => {
            write_header(w)?;
            for thread in common::list_threads(pid)? {
                write_thread(w, &thread)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let pid = common::get_pid(args)?;
    let ident = args.get_one::<String>(COMMAND_ARG_THREAD).map(|s| s.as_str());
    show(&mut io::stdout().lock(), pid, ident)
}
