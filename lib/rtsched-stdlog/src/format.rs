/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::{Arguments, Write};

use slog::{KV, Level, OwnedKVList, Record, Serializer};

pub(crate) struct StdLogValue {
    pub(crate) level: Level,
    pub(crate) message: String,
    pub(crate) kv_pairs: Vec<(String, String)>,
    pub(crate) location: Option<String>,
}

impl StdLogValue {
    pub(crate) fn new(
        record: &Record,
        logger_values: &OwnedKVList,
        append_code_position: bool,
    ) -> Result<Self, slog::Error> {
        let mut kv_pairs = Vec::new();
        let mut kv_formatter = FormatterKv(&mut kv_pairs);
        logger_values.serialize(record, &mut kv_formatter)?;
        record.kv().serialize(record, &mut kv_formatter)?;

        let location = if append_code_position {
            let position = match record.file().rsplit_once('/').map(|x| x.1) {
                Some(filename) => format!("{}({filename}:{})", record.module(), record.line()),
                None => format!("{}({}:{})", record.module(), record.file(), record.line()),
            };
            Some(position)
        } else {
            None
        };

        Ok(StdLogValue {
            level: record.level(),
            message: record.msg().to_string(),
            kv_pairs,
            location,
        })
    }

    pub(crate) fn message_str(&self) -> &str {
        if self.message.is_empty() {
            "()"
        } else {
            &self.message
        }
    }
}

struct FormatterKv<'a>(&'a mut Vec<(String, String)>);

impl Serializer for FormatterKv<'_> {
    fn emit_none(&mut self, _key: slog::Key) -> slog::Result {
        Ok(())
    }

    fn emit_str(&mut self, key: slog::Key, value: &str) -> slog::Result {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn emit_arguments(&mut self, key: slog::Key, value: &Arguments) -> slog::Result {
        let mut s = String::new();
        s.write_fmt(*value)?;
        self.0.push((key.to_string(), s));
        Ok(())
    }
}
