/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgAction, Command, ValueHint, value_parser};
use clap_complete::Shell;
use slog::{Drain, slog_o};
use slog_scope::GlobalLoggerGuard;

use rtsched_rules::file::RuleFiles;

mod common;

mod cmd_apply;
mod cmd_check;
mod cmd_modify;
mod cmd_rules;
mod cmd_shell;
mod cmd_show;

const GLOBAL_ARG_VERBOSE: &str = "verbose";
const GLOBAL_ARG_RULES_FILE: &str = "rules-file";
const GLOBAL_ARG_COMPLETION: &str = "completion";

fn build_cli_args() -> Command {
    Command::new("rtschedctl")
        .about("Tune thread scheduling policy, priority and CPU affinity by thread rules")
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("Show verbose output, repeat to increase")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .long("verbose")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_RULES_FILE)
                .help("Load thread rules from this file instead of the system and user files")
                .value_name("FILE")
                .num_args(1)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath)
                .long("rules-file")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .subcommand(cmd_rules::command())
        .subcommand(cmd_check::command())
        .subcommand(cmd_apply::command())
        .subcommand(cmd_modify::command())
        .subcommand(cmd_show::command())
        .subcommand(cmd_shell::command())
}

fn setup_log(verbose_level: u8) -> Result<GlobalLoggerGuard, log::SetLoggerError> {
    let drain = rtsched_stdlog::new_stderr_drain(verbose_level > 2);
    let logger = slog::Logger::root(drain.ignore_res(), slog_o!());

    let scope_guard = slog_scope::set_global_logger(logger);

    let log_level = match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };

    slog_stdlog::init_with_level(log_level)?;
    Ok(scope_guard)
}

fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let _log_guard = setup_log(args.get_count(GLOBAL_ARG_VERBOSE))
        .map_err(|e| anyhow!("failed to setup logger: {e}"))?;

    let rule_files = match args.get_many::<PathBuf>(GLOBAL_ARG_RULES_FILE) {
        Some(files) => RuleFiles::new(files.cloned().collect()),
        None => RuleFiles::from_env(),
    };

    if let Some((cmd, args)) = args.subcommand() {
        match cmd {
            cmd_rules::COMMAND => cmd_rules::run(&rule_files),
            cmd_check::COMMAND => cmd_check::run(args),
            cmd_apply::COMMAND => cmd_apply::run(&rule_files, args),
            cmd_modify::COMMAND => cmd_modify::run(args),
            cmd_show::COMMAND => cmd_show::run(args),
            cmd_shell::COMMAND => cmd_shell::run(&rule_files, args),
            _ => Err(anyhow!("invalid subcommand {cmd}")),
        }
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli_args().debug_assert();
    }

    #[test]
    fn global_args_after_subcommand() {
        let args = build_cli_args()
            .try_get_matches_from([
                "rtschedctl",
                "rules",
                "-vv",
                "--rules-file",
                "a",
                "--rules-file",
                "b",
            ])
            .unwrap();
        assert_eq!(args.get_count(GLOBAL_ARG_VERBOSE), 2);
        let files: Vec<&PathBuf> = args.get_many(GLOBAL_ARG_RULES_FILE).unwrap().collect();
        assert_eq!(files, [&PathBuf::from("a"), &PathBuf::from("b")]);
    }
}
