/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::{ModificationRequest, RuleApplier, ThreadSched};

impl RuleApplier {
    /// Apply a one-off set of modifiers to `thread`, without storing any rule.
    pub fn modify<T: ThreadSched + ?Sized>(
        &self,
        thread: &mut T,
        policy: &str,
        priority: &str,
        cpus: &str,
    ) {
        let request = ModificationRequest::parse(policy, priority, cpus);
        self.apply(thread, &request);
    }
}

/// Apply a one-off modification to `thread` with the default applier.
pub fn modify_thread<T: ThreadSched + ?Sized>(
    thread: &mut T,
    policy: &str,
    priority: &str,
    cpus: &str,
) {
    RuleApplier::default().modify(thread, policy, priority, cpus)
}
