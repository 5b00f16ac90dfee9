/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::debug;

use crate::{Modifiers, NativeSchedParam, PriorityScale, SchedState, ThreadSched};

/// Compute the scheduling state that results from applying `modifiers` to `current`.
///
/// The native priority is recomputed whenever the policy or the priority
/// changes, as its valid range depends on the policy.
pub fn plan_sched(
    current: &SchedState,
    modifiers: &Modifiers,
    scale: &PriorityScale,
) -> SchedState {
    let mut next = *current;
    if let Some(policy) = modifiers.policy {
        next.policy = policy;
        next.realtime = policy.is_realtime();
    }
    if let Some(change) = modifiers.priority {
        next.priority = change.resolve(current.priority);
    }
    if modifiers.changes_sched() {
        next.native_priority = scale.to_native(next.policy, next.priority);
    }
    next
}

/// Applies modifiers to live threads.
///
/// Every OS call is tried on its own. Failures are logged and never stop the
/// remaining steps.
#[derive(Clone, Copy, Debug)]
pub struct RuleApplier {
    scale: PriorityScale,
}

impl Default for RuleApplier {
    fn default() -> Self {
        RuleApplier::new(PriorityScale::global())
    }
}

impl RuleApplier {
    pub const fn new(scale: PriorityScale) -> Self {
        RuleApplier { scale }
    }

    #[inline]
    pub fn scale(&self) -> &PriorityScale {
        &self.scale
    }

    pub fn apply<T: ThreadSched + ?Sized>(&self, thread: &mut T, modifiers: &Modifiers) {
        if modifiers.changes_sched() {
            self.apply_sched(thread, modifiers);
        }

        if let Some(cpus) = &modifiers.affinity {
            if let Err(e) = thread.write_affinity(cpus) {
                debug!(
                    "failed to set cpu affinity {cpus} for thread {}: {e}",
                    thread.name()
                );
            }
        }
    }

    fn apply_sched<T: ThreadSched + ?Sized>(&self, thread: &mut T, modifiers: &Modifiers) {
        let mut current = thread.sched_state();
        match thread.read_sched_param() {
            Ok(param) => {
                current.policy = param.policy;
                current.native_priority = param.priority;
            }
            Err(e) => debug!("failed to get sched param of thread {}: {e}", thread.name()),
        }

        let next = plan_sched(&current, modifiers, &self.scale);
        let param = NativeSchedParam {
            policy: next.policy,
            priority: next.native_priority,
        };
        match thread.write_sched_param(param) {
            Ok(_) => thread.set_sched_state(next),
            Err(e) => debug!(
                "failed to set sched policy {} priority {} for thread {}: {e}",
                param.policy,
                param.priority,
                thread.name()
            ),
        }
    }
}
