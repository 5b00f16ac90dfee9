/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use super::SchedParam;

pub mod policy {
    pub const OTHER: i32 = 0;
    pub const FIFO: i32 = 1;
    pub const RR: i32 = 2;
    pub const BATCH: Option<i32> = None;
    pub const IDLE: Option<i32> = None;
}

fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "per-thread scheduling is not supported on this platform",
    )
}

#[derive(Clone, Default)]
pub struct CpuAffinity {
    ids: Vec<usize>,
}

impl CpuAffinity {
    pub const fn max_cpu_id(&self) -> usize {
        usize::BITS as usize - 1
    }

    pub fn add_id(&mut self, id: usize) -> io::Result<()> {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
        Ok(())
    }

    pub fn is_set(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    pub fn apply_to_local_thread(&self) -> io::Result<()> {
        Err(unsupported())
    }

    pub fn apply_to_thread(&self, _tid: i32) -> io::Result<()> {
        Err(unsupported())
    }

    pub fn for_thread(_tid: i32) -> io::Result<Self> {
        Err(unsupported())
    }
}

pub fn configured_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub fn current_tid() -> i32 {
    0
}

pub fn current_pid() -> i32 {
    std::process::id() as i32
}

pub fn priority_range(_policy: i32) -> io::Result<(i32, i32)> {
    Err(unsupported())
}

pub fn get_sched_param(_tid: i32) -> io::Result<SchedParam> {
    Err(unsupported())
}

pub fn set_sched_param(_tid: i32, _param: SchedParam) -> io::Result<()> {
    Err(unsupported())
}
