/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use rtsched_rules::modify_thread;

use crate::common;

pub(crate) const COMMAND: &str = "modify";

pub(crate) const ARG_THREAD: &str = "thread";
pub(crate) const ARG_POLICY: &str = "policy";
pub(crate) const ARG_PRIORITY: &str = "priority";
pub(crate) const ARG_CPUS: &str = "cpus";

/// The positional arguments shared with the shell `thread-modify` command.
pub(crate) fn modify_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new(ARG_THREAD)
            .help("Thread id or thread name")
            .value_name("THREAD")
            .required(true),
    )
    .arg(
        Arg::new(ARG_POLICY)
            .help("Policy name or prefix, like FIFO, RR or OTHER, '*' to keep")
            .value_name("POLICY")
            .required(true),
    )
    .arg(
        Arg::new(ARG_PRIORITY)
            .help("Priority in 0..99, +N / -N to change relatively, '*' to keep")
            .value_name("PRIORITY")
            .allow_hyphen_values(true)
            .required(true),
    )
    .arg(
        Arg::new(ARG_CPUS)
            .help("CPU list like 0,2-3, '*' to keep")
            .value_name("CPUS")
            .required(true),
    )
}

pub(crate) fn command() -> Command {
    let cmd = Command::new(COMMAND)
        .about("Modify the scheduling of one running thread")
        .arg(common::pid_arg());
    modify_args(cmd)
}

pub(crate) fn get_str<'a>(args: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(id)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("no value set for {id}"))
}

pub(crate) fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let pid = common::get_pid(args)?;
    let ident = get_str(args, ARG_THREAD)?;
    let Some(mut thread) = common::find_thread(pid, ident)? else {
        println!("thread {ident} not found in process {pid}");
        return Ok(());
    };

    modify_thread(
        &mut thread,
        get_str(args, ARG_POLICY)?,
        get_str(args, ARG_PRIORITY)?,
        get_str(args, ARG_CPUS)?,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_priority() {
        let args = command()
            .try_get_matches_from(["modify", "--pid", "1", "cbLow", "*", "-5", "0-1"])
            .unwrap();
        assert_eq!(common::get_pid(&args).unwrap(), 1);
        assert_eq!(get_str(&args, ARG_THREAD).unwrap(), "cbLow");
        assert_eq!(get_str(&args, ARG_PRIORITY).unwrap(), "-5");
        assert_eq!(get_str(&args, ARG_CPUS).unwrap(), "0-1");
    }
}
