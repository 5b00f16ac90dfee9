/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, OnceLock};

use crate::file::{RuleFiles, load_rule_files};
use crate::{OsThread, RuleApplier, RuleStore, ThreadSched};

/// Callback for the host threading runtime, to be run once in every new thread.
pub struct ThreadStartHook {
    store: Arc<RuleStore>,
    applier: RuleApplier,
}

static GLOBAL_THREAD_START_HOOK: OnceLock<Arc<ThreadStartHook>> = OnceLock::new();

/// The process wide hook over [`RuleStore::global`].
///
/// The system and user rule files are loaded into the global store on first call.
pub fn global_hook() -> &'static Arc<ThreadStartHook> {
    GLOBAL_THREAD_START_HOOK.get_or_init(|| {
        let store = Arc::clone(RuleStore::global());
        load_rule_files(&store, &RuleFiles::from_env());
        Arc::new(ThreadStartHook::new(store, RuleApplier::default()))
    })
}

impl ThreadStartHook {
    pub fn new(store: Arc<RuleStore>, applier: RuleApplier) -> Self {
        ThreadStartHook { store, applier }
    }

    #[inline]
    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    #[inline]
    pub fn applier(&self) -> &RuleApplier {
        &self.applier
    }

    /// Apply every rule matching the name of `thread`, in insertion order.
    /// Returns the number of matched rules.
    pub fn on_thread_start<T: ThreadSched + ?Sized>(&self, thread: &mut T) -> usize {
        let name = thread.name().to_string();
        self.store
            .foreach_matching(&name, |rule| self.applier.apply(thread, rule.modifiers()))
    }

    /// Run the hook for the calling thread.
    pub fn on_current_thread(&self) -> usize {
        if self.store.is_empty() {
            return 0;
        }
        let mut thread = OsThread::current();
        self.on_thread_start(&mut thread)
    }
}
