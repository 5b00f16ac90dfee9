/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use crate::{CpuSet, NativeSchedParam, PriorityScale, SchedPolicy, SchedState, ThreadSched};

/// In-memory thread for exercising rule application.
pub(crate) struct FakeThread {
    name: String,
    state: SchedState,
    pub(crate) live: NativeSchedParam,
    pub(crate) affinity: Option<CpuSet>,
    pub(crate) fail_sched: bool,
    pub(crate) fail_affinity: bool,
    pub(crate) sched_writes: usize,
}

impl FakeThread {
    pub(crate) fn new(name: &str, policy: SchedPolicy, priority: i32) -> Self {
        let native = PriorityScale::new(1, 99).to_native(policy, priority);
        FakeThread {
            name: name.to_string(),
            state: SchedState {
                policy,
                priority,
                native_priority: native,
                realtime: policy.is_realtime(),
            },
            live: NativeSchedParam {
                policy,
                priority: native,
            },
            affinity: None,
            fail_sched: false,
            fail_affinity: false,
            sched_writes: 0,
        }
    }
}

fn denied() -> io::Error {
    io::Error::from(io::ErrorKind::PermissionDenied)
}

impl ThreadSched for FakeThread {
    fn name(&self) -> &str {
        &self.name
    }

    fn sched_state(&self) -> SchedState {
        self.state
    }

    fn set_sched_state(&mut self, state: SchedState) {
        self.state = state;
    }

    fn read_sched_param(&self) -> io::Result<NativeSchedParam> {
        if self.fail_sched {
            Err(denied())
        } else {
            Ok(self.live)
        }
    }

    fn write_sched_param(&mut self, param: NativeSchedParam) -> io::Result<()> {
        if self.fail_sched {
            return Err(denied());
        }
        self.live = param;
        self.sched_writes += 1;
        Ok(())
    }

    fn write_affinity(&mut self, cpus: &CpuSet) -> io::Result<()> {
        if self.fail_affinity {
            return Err(denied());
        }
        self.affinity = Some(cpus.clone());
        Ok(())
    }
}
