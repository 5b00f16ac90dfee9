/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::num::NonZeroUsize;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use humanize_rs::bytes::Bytes;
use yaml_rust::Yaml;

use super::WorkerRuntimeConfig;

fn as_integer<T>(v: &Yaml) -> anyhow::Result<T>
where
    T: FromStr + TryFrom<i64>,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    <T as TryFrom<i64>>::Error: std::error::Error + Send + Sync + 'static,
{
    match v {
        Yaml::String(s) => Ok(T::from_str(s)?),
        Yaml::Integer(i) => Ok(T::try_from(*i)?),
        _ => Err(anyhow!("yaml value type should be 'string' or 'integer'")),
    }
}

fn as_thread_number(v: &Yaml) -> anyhow::Result<NonZeroUsize> {
    let n = as_integer::<usize>(v)?;
    NonZeroUsize::new(n).ok_or_else(|| anyhow!("thread number should not be zero"))
}

/// Byte size, either an integer or a humanized string like `256KiB`.
fn as_byte_size(v: &Yaml) -> anyhow::Result<usize> {
    if let Yaml::String(s) = v {
        let size = s.parse::<Bytes>()?;
        Ok(size.size())
    } else {
        as_integer(v)
    }
}

fn as_switch(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::Boolean(b) => Ok(*b),
        Yaml::Integer(i) => Ok(*i != 0),
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid boolean string {s}")),
        },
        _ => Err(anyhow!("yaml value type should be 'boolean', 'string' or 'integer'")),
    }
}

impl WorkerRuntimeConfig {
    fn set_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match k.to_lowercase().replace('-', "_").as_str() {
            "thread_number_total" | "threads_total" | "thread_number" => {
                self.set_thread_number_total(as_thread_number(v)?);
            }
            "thread_number_per_runtime" | "threads_per_runtime" => {
                self.set_thread_number_per_rt(as_thread_number(v)?);
            }
            "thread_name" => match v {
                Yaml::String(name) => self.set_thread_name(name),
                _ => return Err(anyhow!("yaml value type should be 'string'")),
            },
            "thread_stack_size" => self.set_thread_stack_size(as_byte_size(v)?),
            "max_io_events_per_tick" => self.set_max_io_events_per_tick(as_integer(v)?),
            "lock_memory" | "memory_lock" => self.set_lock_memory(as_switch(v)?),
            _ => return Err(anyhow!("invalid key {k}")),
        }
        Ok(())
    }

    /// Parse a yaml map, all keys are optional.
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!(
                "yaml value type for 'worker runtime config' should be 'map'"
            ));
        };

        let mut config = WorkerRuntimeConfig::default();
        for (k, v) in map.iter() {
            let Yaml::String(k) = k else {
                return Err(anyhow!("key in worker runtime config should be string"));
            };
            config
                .set_yaml_kv(k, v)
                .context(format!("failed to parse value of key {k}"))?;
        }
        config.check().context("invalid worker runtime config")?;
        Ok(config)
    }
}
