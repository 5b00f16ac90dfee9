/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use rtsched_rules::{RuleApplier, RuleStore, ThreadStartHook};

/// Hook with a single rule pinning threads matching `pattern` to CPU 0.
pub(crate) fn pin_cpu0_hook(pattern: &str) -> Arc<ThreadStartHook> {
    let store = Arc::new(RuleStore::new());
    store.add_or_replace("cpu0", "*", "*", "0", pattern).unwrap();
    Arc::new(ThreadStartHook::new(store, RuleApplier::default()))
}

/// Whether the calling thread may only run on CPU 0.
///
/// Always true where affinity is not supported.
pub(crate) fn pinned_to_cpu0() -> bool {
    if !cfg!(any(target_os = "linux", target_os = "android")) {
        return true;
    }
    let Ok(affinity) = rtsched_compat::CpuAffinity::for_thread(0) else {
        return false;
    };
    affinity.is_set(0) && (1..=affinity.max_cpu_id()).all(|i| !affinity.is_set(i))
}
