/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use rtsched_rules::ThreadStartHook;
use rtsched_rules::file::RuleFiles;

use crate::cmd_modify::{ARG_CPUS, ARG_POLICY, ARG_PRIORITY, ARG_THREAD, get_str, modify_args};
use crate::{cmd_apply, cmd_show, common};

pub(crate) const COMMAND: &str = "shell";

const SHELL_RULE_ADD: &str = "rule-add";
const SHELL_RULE_DELETE: &str = "rule-delete";
const SHELL_RULES_SHOW: &str = "rules-show";
const SHELL_THREAD_MODIFY: &str = "thread-modify";
const SHELL_APPLY: &str = "apply";
const SHELL_SHOW: &str = "show";
const SHELL_QUIT: &str = "quit";

const ARG_NAME: &str = "name";
const ARG_PATTERN: &str = "pattern";

const PROMPT: &str = "rtsched> ";

pub(crate) fn command() -> Command {
    Command::new(COMMAND)
        .about("Read thread rule and thread commands from stdin")
        .arg(common::pid_arg())
}

fn shell_command() -> Command {
    let rule_add = Command::new(SHELL_RULE_ADD)
        .about("Add a thread rule, or replace the one with the same name")
        .arg(Arg::new(ARG_NAME).value_name("NAME").required(true))
        .arg(Arg::new(ARG_POLICY).value_name("POLICY").required(true))
        .arg(
            Arg::new(ARG_PRIORITY)
                .value_name("PRIORITY")
                .allow_hyphen_values(true)
                .required(true),
        )
        .arg(Arg::new(ARG_CPUS).value_name("CPUS").required(true))
        .arg(
            Arg::new(ARG_PATTERN)
                .help("Regular expression matched against thread names")
                .value_name("PATTERN")
                .num_args(1..)
                .allow_hyphen_values(true)
                .trailing_var_arg(true)
                .required(true),
        );

    Command::new("rtsched")
        .no_binary_name(true)
        .subcommand_required(true)
        .subcommand(rule_add)
        .subcommand(
            Command::new(SHELL_RULE_DELETE)
                .about("Delete a thread rule")
                .arg(Arg::new(ARG_NAME).value_name("NAME").required(true)),
        )
        .subcommand(Command::new(SHELL_RULES_SHOW).about("Show all thread rules"))
        .subcommand(modify_args(
            Command::new(SHELL_THREAD_MODIFY).about("Modify the scheduling of one thread"),
        ))
        .subcommand(Command::new(SHELL_APPLY).about("Apply the thread rules to all threads"))
        .subcommand(
            Command::new(SHELL_SHOW)
                .about("Show the scheduling of threads")
                .arg(Arg::new(ARG_THREAD).value_name("THREAD")),
        )
        .subcommand(
            Command::new(SHELL_QUIT)
                .about("Leave the shell")
                .visible_alias("exit"),
        )
}

/// Byte offset of the `n`th whitespace separated word in `line`.
fn word_offset(line: &str, n: usize) -> Option<usize> {
    let mut seen = 0;
    let mut in_word = false;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            if seen == n {
                return Some(i);
            }
            seen += 1;
            in_word = true;
        }
    }
    None
}

struct Shell {
    pid: i32,
    hook: ThreadStartHook,
    cmd: Command,
}

impl Shell {
    fn new(pid: i32, hook: ThreadStartHook) -> Self {
        Shell {
            pid,
            hook,
            cmd: shell_command(),
        }
    }

    /// Execute one input line, returns `false` if the shell should quit.
    fn execute<W: Write>(&mut self, w: &mut W, line: &str) -> anyhow::Result<bool> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(true);
        }

        let args = match self.cmd.try_get_matches_from_mut(words) {
            Ok(args) => args,
            Err(e) => {
                write!(w, "{}", e.render())?;
                return Ok(true);
            }
        };

        if let Some((cmd, args)) = args.subcommand() {
            if cmd == SHELL_QUIT {
                return Ok(false);
            }
            if let Err(e) = self.run_command(w, line, cmd, args) {
                writeln!(w, "error: {e:?}")?;
            }
        }
        Ok(true)
    }

    fn run_command<W: Write>(
        &self,
        w: &mut W,
        line: &str,
        cmd: &str,
        args: &ArgMatches,
    ) -> anyhow::Result<()> {
        let store = self.hook.store();
        match cmd {
            SHELL_RULE_ADD => {
                // the pattern is the raw rest of the line, inner spacing included
                let pattern = word_offset(line, 5)
                    .map(|i| line[i..].trim_end_matches('\r'))
                    .ok_or_else(|| anyhow!("no pattern set"))?;
                store.add_or_replace(
                    get_str(args, ARG_NAME)?,
                    get_str(args, ARG_POLICY)?,
                    get_str(args, ARG_PRIORITY)?,
                    get_str(args, ARG_CPUS)?,
                    pattern,
                )?;
                Ok(())
            }
            SHELL_RULE_DELETE => {
                let name = get_str(args, ARG_NAME)?;
                if !store.delete(name) {
                    writeln!(w, "no rule named {name}")?;
                }
                Ok(())
            }
            SHELL_RULES_SHOW => {
                write!(w, "{}", store.table())?;
                Ok(())
            }
            SHELL_THREAD_MODIFY => {
                let ident = get_str(args, ARG_THREAD)?;
                match common::find_thread(self.pid, ident)? {
                    Some(mut thread) => self.hook.applier().modify(
                        &mut thread,
                        get_str(args, ARG_POLICY)?,
                        get_str(args, ARG_PRIORITY)?,
                        get_str(args, ARG_CPUS)?,
                    ),
                    None => writeln!(w, "thread {ident} not found in process {}", self.pid)?,
                }
                Ok(())
            }
            SHELL_APPLY => cmd_apply::apply_all(w, &self.hook, self.pid),
            SHELL_SHOW => {
                let ident = args.get_one::<String>(ARG_THREAD).map(|s| s.as_str());
                cmd_show::show(w, self.pid, ident)
            }
            _ => Err(anyhow!("invalid command {cmd}")),
        }
    }

    fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        w: &mut W,
        prompt: bool,
    ) -> anyhow::Result<()> {
        if prompt {
            write!(w, "{PROMPT}")?;
            w.flush()?;
        }
        for line in input.lines() {
            let line = line?;
            if !self.execute(w, &line)? {
                break;
            }
            if prompt {
                write!(w, "{PROMPT}")?;
                w.flush()?;
            }
        }
        Ok(())
    }
}

pub(crate) fn run(files: &RuleFiles, args: &ArgMatches) -> anyhow::Result<()> {
    let pid = common::get_pid(args)?;
    let mut shell = Shell::new(pid, common::load_hook(files));

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    shell.run(stdin.lock(), &mut io::stdout().lock(), prompt)
}
