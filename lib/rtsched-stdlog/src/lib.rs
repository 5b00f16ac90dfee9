/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, PoisonError};

use anstyle::{AnsiColor, Color, Style};
use chrono::Local;
use slog::{Drain, Level, OwnedKVList, Record};

mod format;
use format::StdLogValue;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A synchronous drain writing one line per record.
pub struct StdLogDrain<W: Write> {
    io: Mutex<W>,
    console: bool,
    append_code_position: bool,
}

/// Log to stderr, with colors if it is a terminal.
pub fn new_stderr_drain(append_code_position: bool) -> StdLogDrain<io::Stderr> {
    let stderr = io::stderr();
    let console = stderr.is_terminal();
    StdLogDrain::new(stderr, console, append_code_position)
}

/// Log to stdout, with colors if it is a terminal.
pub fn new_stdout_drain(append_code_position: bool) -> StdLogDrain<io::Stdout> {
    let stdout = io::stdout();
    let console = stdout.is_terminal();
    StdLogDrain::new(stdout, console, append_code_position)
}

impl<W: Write> StdLogDrain<W> {
    pub fn new(io: W, console: bool, append_code_position: bool) -> Self {
        StdLogDrain {
            io: Mutex::new(io),
            console,
            append_code_position,
        }
    }

    /// Format one record as `<time> <level> [key: value,]... <message> [<location>]`.
    fn format_line(&self, buf: &mut Vec<u8>, v: &StdLogValue) -> io::Result<()> {
        let (level, key, message, location) = if self.console {
            (level_style(v.level), BOLD, BOLD, ITALIC)
        } else {
            (Style::new(), Style::new(), Style::new(), Style::new())
        };

        write!(buf, "{}", Local::now().format(TIME_FORMAT))?;
        write!(buf, " {level}{}{level:#}", v.level)?;
        for (k, value) in &v.kv_pairs {
            if self.console {
                write!(buf, " {key}{k}{key:#}={value},")?;
            } else {
                write!(buf, " {k}: {value},")?;
            }
        }
        write!(buf, " {message}{}{message:#}", v.message_str())?;
        if let Some(position) = &v.location {
            write!(buf, " <{location}{position}{location:#}>")?;
        }
        writeln!(buf)
    }
}

const BOLD: Style = Style::new().bold();
const ITALIC: Style = Style::new().italic();

const fn level_style(level: Level) -> Style {
    let color = match level {
        Level::Critical => AnsiColor::Magenta,
        Level::Error => AnsiColor::Red,
        Level::Warning => AnsiColor::Yellow,
        Level::Info => AnsiColor::Green,
        Level::Debug => AnsiColor::Cyan,
        Level::Trace => AnsiColor::Blue,
    };
    Style::new().fg_color(Some(Color::Ansi(color)))
}

impl<W: Write> Drain for StdLogDrain<W> {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), io::Error> {
        let v = StdLogValue::new(record, logger_values, self.append_code_position)
            .map_err(io::Error::other)?;

        let mut buf: Vec<u8> = Vec::with_capacity(256);
        self.format_line(&mut buf, &v)?;

        let mut io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        io.write_all(&buf)?;
        io.flush()
    }
}
