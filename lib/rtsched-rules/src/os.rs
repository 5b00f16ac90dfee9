/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs;
use std::io;
use std::path::PathBuf;

use rtsched_compat::{CpuAffinity, SchedParam};

use crate::{
    CpuSet, NativeSchedParam, PriorityScale, SchedPolicy, SchedState, ThreadSched, cpu_count,
};

/// A kernel thread, addressed by process id and thread id.
#[derive(Clone, Debug)]
pub struct OsThread {
    pid: i32,
    tid: i32,
    name: String,
    state: SchedState,
}

fn task_dir(pid: i32) -> PathBuf {
    PathBuf::from(format!("/proc/{pid}/task"))
}

fn read_comm(path: PathBuf) -> io::Result<String> {
    let s = fs::read_to_string(path)?;
    Ok(s.trim_end_matches(['\n', '\r']).to_string())
}

impl OsThread {
    fn new(pid: i32, tid: i32, name: String) -> Self {
        let mut thread = OsThread {
            pid,
            tid,
            name,
            state: SchedState::default(),
        };
        thread.state = thread.load_state(&PriorityScale::global());
        thread
    }

    /// The calling thread.
    pub fn current() -> Self {
        let tid = rtsched_compat::current_tid();
        let name = match std::thread::current().name() {
            Some(name) => name.to_string(),
            None => read_comm(PathBuf::from("/proc/thread-self/comm")).unwrap_or_default(),
        };
        OsThread::new(rtsched_compat::current_pid(), tid, name)
    }

    pub fn open(pid: i32, tid: i32) -> io::Result<Self> {
        let name = read_comm(task_dir(pid).join(tid.to_string()).join("comm"))?;
        Ok(OsThread::new(pid, tid, name))
    }

    /// All threads of process `pid`, ordered by thread id.
    pub fn list(pid: i32) -> io::Result<Vec<Self>> {
        let mut tids = Vec::new();
        for entry in fs::read_dir(task_dir(pid))? {
            let entry = entry?;
            if let Some(tid) = entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) {
                tids.push(tid);
            }
        }
        tids.sort_unstable();

        let mut threads = Vec::with_capacity(tids.len());
        for tid in tids {
            // the thread may have exited in between
            if let Ok(thread) = OsThread::open(pid, tid) {
                threads.push(thread);
            }
        }
        Ok(threads)
    }

    /// Find a thread of process `pid` by thread id or by name.
    pub fn find(pid: i32, ident: &str) -> io::Result<Option<Self>> {
        if let Ok(tid) = ident.parse::<i32>() {
            return match OsThread::open(pid, tid) {
                Ok(thread) => Ok(Some(thread)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            };
        }
        Ok(OsThread::list(pid)?.into_iter().find(|t| t.name == ident))
    }

    #[inline]
    pub fn pid(&self) -> i32 {
        self.pid
    }

    #[inline]
    pub fn tid(&self) -> i32 {
        self.tid
    }

    pub fn affinity(&self) -> io::Result<CpuSet> {
        let affinity = CpuAffinity::for_thread(self.tid)?;
        Ok(CpuSet::from_affinity(&affinity, cpu_count()))
    }

    /// Raw policy id and native priority, for policies this crate may not know.
    pub fn raw_sched_param(&self) -> io::Result<SchedParam> {
        rtsched_compat::get_sched_param(self.tid)
    }

    fn load_state(&self, scale: &PriorityScale) -> SchedState {
        match self.read_sched_param() {
            Ok(param) => SchedState {
                policy: param.policy,
                priority: scale.to_portable(param.policy, param.priority),
                native_priority: param.priority,
                realtime: param.policy.is_realtime(),
            },
            Err(_) => SchedState::default(),
        }
    }
}

impl ThreadSched for OsThread {
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
        let param = rtsched_compat::get_sched_param(self.tid)?;
        let policy = SchedPolicy::from_raw(param.policy).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown scheduling policy {}", param.policy),
            )
        })?;
        Ok(NativeSchedParam {
            policy,
            priority: param.priority,
        })
    }

    fn write_sched_param(&mut self, param: NativeSchedParam) -> io::Result<()> {
        let policy = param.policy.to_raw().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("policy {} is not supported", param.policy),
            )
        })?;
        // keep a reset-on-fork flag set by someone else
        let reset_on_fork = rtsched_compat::get_sched_param(self.tid)
            .map(|p| p.reset_on_fork)
            .unwrap_or(false);
        rtsched_compat::set_sched_param(
            self.tid,
            SchedParam {
                policy,
                priority: param.priority,
                reset_on_fork,
            },
        )
    }

    fn write_affinity(&mut self, cpus: &CpuSet) -> io::Result<()> {
        cpus.to_affinity()?.apply_to_thread(self.tid)
    }
}

#[cfg(all(test, any(target_os = "linux", target_os = "android")))]
mod tests {
    use super::*;

    #[test]
    fn current_thread() {
        let handle = std::thread::Builder::new()
            .name("os-test-1".to_string())
            .spawn(|| {
                let thread = OsThread::current();
                assert_eq!(thread.name(), "os-test-1");
                assert_eq!(thread.pid(), std::process::id() as i32);
                let found = OsThread::find(thread.pid(), "os-test-1").unwrap().unwrap();
                assert_eq!(found.tid(), thread.tid());
                let found = OsThread::find(thread.pid(), &thread.tid().to_string())
                    .unwrap()
                    .unwrap();
                assert_eq!(found.name(), "os-test-1");
                assert!(!thread.affinity().unwrap().is_empty());
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn list_self() {
        let pid = std::process::id() as i32;
        let threads = OsThread::list(pid).unwrap();
        assert!(threads.iter().any(|t| t.tid() == pid));
        assert!(OsThread::find(pid, "no-such-thread-name").unwrap().is_none());
    }

    #[test]
    fn write_keeps_reset_on_fork() {
        std::thread::spawn(|| {
            let mut thread = OsThread::current();
            let mut raw = thread.raw_sched_param().unwrap();
            raw.reset_on_fork = true;
            rtsched_compat::set_sched_param(thread.tid(), raw).unwrap();

            thread
                .write_sched_param(NativeSchedParam {
                    policy: SchedPolicy::Batch,
                    priority: 0,
                })
                .unwrap();
            let raw = thread.raw_sched_param().unwrap();
            assert_eq!(SchedPolicy::from_raw(raw.policy), Some(SchedPolicy::Batch));
            assert!(raw.reset_on_fork);
        })
        .join()
        .unwrap();
    }
}
