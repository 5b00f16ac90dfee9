/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[cfg_attr(any(target_os = "linux", target_os = "android"), path = "linux.rs")]
#[cfg_attr(
    not(any(target_os = "linux", target_os = "android")),
    path = "unsupported.rs"
)]
mod os;
pub use os::{
    CpuAffinity, configured_cpus, current_pid, current_tid, get_sched_param, policy,
    priority_range, set_sched_param,
};

/// Raw scheduling parameters of one OS thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedParam {
    pub policy: i32,
    pub priority: i32,
    /// Children of the thread start with default scheduling.
    pub reset_on_fork: bool,
}
