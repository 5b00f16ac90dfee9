/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::trace;

use rtsched_rules::ThreadStartHook;

/// Spawn a named std thread which runs the thread start hook before `f`.
pub fn spawn_named<F, T>(
    name: &str,
    hook: &Arc<ThreadStartHook>,
    f: F,
) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let hook = Arc::clone(hook);
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let matched = hook.on_current_thread();
            trace!("{matched} thread rule(s) applied at thread start");
            f()
        })
}
