/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use crate::{CpuSet, PRIORITY_MIN, SchedPolicy};

/// Cached scheduling attributes of a thread, as last set through this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedState {
    pub policy: SchedPolicy,
    /// priority on the portable scale
    pub priority: i32,
    pub native_priority: i32,
    pub realtime: bool,
}

impl Default for SchedState {
    fn default() -> Self {
        SchedState {
            policy: SchedPolicy::Other,
            priority: PRIORITY_MIN,
            native_priority: 0,
            realtime: false,
        }
    }
}

/// Live scheduling parameters as the OS sees them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeSchedParam {
    pub policy: SchedPolicy,
    pub priority: i32,
}

/// Access to the scheduling attributes of one thread owned by the host.
pub trait ThreadSched {
    fn name(&self) -> &str;

    fn sched_state(&self) -> SchedState;
    fn set_sched_state(&mut self, state: SchedState);

    fn read_sched_param(&self) -> io::Result<NativeSchedParam>;
    fn write_sched_param(&mut self, param: NativeSchedParam) -> io::Result<()>;
    fn write_affinity(&mut self, cpus: &CpuSet) -> io::Result<()>;
}
