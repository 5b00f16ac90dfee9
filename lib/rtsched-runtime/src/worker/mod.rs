/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use anyhow::anyhow;
use log::{error, trace, warn};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::watch;

use rtsched_rules::ThreadStartHook;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_THREAD_NAME: &str = "worker";

/// Keeps the worker threads running, they are stopped when this is dropped.
pub enum WorkersGuard {
    /// one thread with its own current thread runtime per worker
    Threads(watch::Sender<()>),
    /// multi thread runtimes, each shared by a group of workers
    Runtimes(Vec<Runtime>),
}

impl WorkersGuard {
    /// Number of the runtime handles delivered at start.
    pub fn runtime_count(&self) -> usize {
        match self {
            WorkersGuard::Threads(sender) => sender.receiver_count(),
            WorkersGuard::Runtimes(list) => list.len(),
        }
    }
}

/// Worker runtime layout.
///
/// Worker thread names are derived from `thread_name`, so that thread rules
/// can select workers by name.
#[derive(Clone, Debug)]
pub struct WorkerRuntimeConfig {
    thread_number_total: NonZeroUsize,
    thread_number_per_rt: NonZeroUsize,
    thread_name: String,
    thread_stack_size: Option<usize>,
    max_io_events_per_tick: Option<usize>,
    lock_memory: bool,
}

impl Default for WorkerRuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn run_start_hook(hook: Option<&ThreadStartHook>) {
    if let Some(hook) = hook {
        let matched = hook.on_current_thread();
        trace!("{matched} thread rule(s) applied at worker thread start");
    }
}

impl WorkerRuntimeConfig {
    pub fn new() -> Self {
        WorkerRuntimeConfig {
            thread_number_total: std::thread::available_parallelism()
                .unwrap_or(NonZeroUsize::MIN),
            thread_number_per_rt: NonZeroUsize::MIN,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            thread_stack_size: None,
            max_io_events_per_tick: None,
            lock_memory: false,
        }
    }

    pub fn set_thread_number_total(&mut self, num: NonZeroUsize) {
        self.thread_number_total = num;
    }

    pub fn set_thread_number_per_rt(&mut self, num: NonZeroUsize) {
        self.thread_number_per_rt = num;
    }

    pub fn set_thread_name(&mut self, name: &str) {
        self.thread_name = name.to_string();
    }

    pub fn set_thread_stack_size(&mut self, size: usize) {
        self.thread_stack_size = Some(size);
    }

    pub fn set_max_io_events_per_tick(&mut self, capacity: usize) {
        self.max_io_events_per_tick = Some(capacity);
    }

    pub fn set_lock_memory(&mut self, enable: bool) {
        self.lock_memory = enable;
    }

    #[inline]
    pub fn thread_number_total(&self) -> usize {
        self.thread_number_total.get()
    }

    #[inline]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    #[inline]
    pub fn lock_memory(&self) -> bool {
        self.lock_memory
    }

    fn runtime_number(&self) -> usize {
        self.thread_number_total.get() / self.thread_number_per_rt.get()
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if self.thread_number_total.get() % self.thread_number_per_rt.get() != 0 {
            return Err(anyhow!(
                "total thread number {} is not a multiple of per-runtime thread number {}",
                self.thread_number_total,
                self.thread_number_per_rt
            ));
        }
        if self.thread_name.is_empty() {
            return Err(anyhow!("empty worker thread name"));
        }
        Ok(())
    }

    fn build_shared_runtime(
        &self,
        rt_id: usize,
        hook: Option<Arc<ThreadStartHook>>,
    ) -> io::Result<Runtime> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder
            .worker_threads(self.thread_number_per_rt.get())
            .enable_all();
        if let Some(size) = self.thread_stack_size {
            builder.thread_stack_size(size);
        }
        if let Some(n) = self.max_io_events_per_tick {
            builder.max_io_events_per_tick(n);
        }

        let prefix = format!("{}-{rt_id}", self.thread_name);
        let next_id = AtomicUsize::new(0);
        builder.thread_name_fn(move || {
            let id = next_id.fetch_add(1, Ordering::Relaxed);
            format!("{prefix}#{id}")
        });
        builder.on_thread_start(move || run_start_hook(hook.as_deref()));
        builder.build()
    }

    fn start_runtimes<F>(
        &self,
        hook: Option<Arc<ThreadStartHook>>,
        recv_handle: F,
    ) -> anyhow::Result<WorkersGuard>
    where
        F: Fn(usize, Handle),
    {
        let rt_number = self.runtime_number();
        let mut runtimes = Vec::with_capacity(rt_number);
        for rt_id in 0..rt_number {
            let rt = self
                .build_shared_runtime(rt_id, hook.clone())
                .map_err(|e| anyhow!("failed to build worker runtime {rt_id}: {e}"))?;
            recv_handle(rt_id, rt.handle().clone());
            runtimes.push(rt);
        }
        Ok(WorkersGuard::Runtimes(runtimes))
    }

    fn start_threads<F>(
        &self,
        hook: Option<Arc<ThreadStartHook>>,
        recv_handle: F,
    ) -> anyhow::Result<WorkersGuard>
    where
        F: Fn(usize, Handle),
    {
        let (stop_sender, _) = watch::channel(());

        for id in 0..self.thread_number_total.get() {
            let mut stop_receiver = stop_sender.subscribe();
            let (handle_sender, handle_receiver) = mpsc::sync_channel(1);
            let max_io_events_per_tick = self.max_io_events_per_tick;
            let hook = hook.clone();

            let mut builder =
                std::thread::Builder::new().name(format!("{}#{id}", self.thread_name));
            if let Some(size) = self.thread_stack_size {
                builder = builder.stack_size(size);
            }
            builder
                .spawn(move || {
                    run_start_hook(hook.as_deref());

                    let mut rt_builder = tokio::runtime::Builder::new_current_thread();
                    rt_builder.enable_all();
                    if let Some(n) = max_io_events_per_tick {
                        rt_builder.max_io_events_per_tick(n);
                    }
                    let rt = match rt_builder.build() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("failed to build runtime in worker thread #{id}: {e}");
                            return;
                        }
                    };

                    trace!("worker thread #{id} started");
                    rt.block_on(async move {
                        if handle_sender.send(Handle::current()).is_ok() {
                            let _ = stop_receiver.changed().await;
                        }
                    });
                    trace!("worker thread #{id} stopped");
                })
                .map_err(|e| anyhow!("failed to spawn worker thread #{id}: {e}"))?;

            let handle = handle_receiver
                .recv()
                .map_err(|_| anyhow!("no runtime handle received from worker thread #{id}"))?;
            recv_handle(id, handle);
        }

        Ok(WorkersGuard::Threads(stop_sender))
    }

    /// Start all worker threads, `hook` is run once at the start of each of them.
    pub fn start<F>(
        &self,
        hook: Option<Arc<ThreadStartHook>>,
        recv_handle: F,
    ) -> anyhow::Result<WorkersGuard>
    where
        F: Fn(usize, Handle),
    {
        if self.lock_memory {
            if let Err(e) = rtsched_compat::memlock::lock_all() {
                warn!("failed to lock process memory: {e}");
            }
        }

        if self.thread_number_per_rt.get() == 1 {
            self.start_threads(hook, recv_handle)
        } else {
            self.start_runtimes(hook, recv_handle)
        }
    }
}
