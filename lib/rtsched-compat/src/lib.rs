/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod sched;
pub use sched::{
    CpuAffinity, SchedParam, configured_cpus, current_pid, current_tid, get_sched_param,
    policy, priority_range, set_sched_param,
};

pub mod memlock;
