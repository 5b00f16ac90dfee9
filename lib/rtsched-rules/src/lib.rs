/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod util;

mod cpuset;
pub use cpuset::{CpuSet, cpu_count};

mod policy;
pub use policy::{PolicyParseError, SchedPolicy};

mod priority;
pub use priority::{PRIORITY_MAX, PRIORITY_MIN, PriorityChange, PriorityScale};

mod modifier;
pub use modifier::{ModificationRequest, Modifiers};

mod rule;
pub use rule::{Rule, RuleError};

mod store;
pub use store::RuleStore;

mod table;
pub use table::RuleTable;

mod thread;
pub use thread::{NativeSchedParam, SchedState, ThreadSched};

mod os;
pub use os::OsThread;

mod apply;
pub use apply::{RuleApplier, plan_sched};

mod hook;
pub use hook::{ThreadStartHook, global_hook};

mod modify;
pub use modify::modify_thread;

pub mod file;

#[cfg(test)]
mod testing;
