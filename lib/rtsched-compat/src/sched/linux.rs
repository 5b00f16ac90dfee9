/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::mem;

use super::SchedParam;

pub mod policy {
    pub const OTHER: i32 = libc::SCHED_OTHER;
    pub const FIFO: i32 = libc::SCHED_FIFO;
    pub const RR: i32 = libc::SCHED_RR;
    pub const BATCH: Option<i32> = Some(libc::SCHED_BATCH);
    pub const IDLE: Option<i32> = Some(libc::SCHED_IDLE);
}

// may be or-ed into the value returned by sched_getscheduler
const SCHED_RESET_ON_FORK: libc::c_int = 0x4000_0000;

#[derive(Clone)]
pub struct CpuAffinity {
    cpu_set: libc::cpu_set_t,
}

impl Default for CpuAffinity {
    fn default() -> Self {
        CpuAffinity {
            cpu_set: unsafe { mem::zeroed() },
        }
    }
}

pub const fn max_cpu_id() -> usize {
    let bytes = size_of::<libc::cpu_set_t>();
    (bytes << 3) - 1
}

impl CpuAffinity {
    pub const fn max_cpu_id(&self) -> usize {
        max_cpu_id()
    }

    pub fn add_id(&mut self, id: usize) -> io::Result<()> {
        if id > max_cpu_id() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cpu id {id} out of range"),
            ));
        }
        unsafe {
            libc::CPU_SET(id, &mut self.cpu_set);
        }
        Ok(())
    }

    pub fn is_set(&self, id: usize) -> bool {
        if id > max_cpu_id() {
            return false;
        }
        unsafe { libc::CPU_ISSET(id, &self.cpu_set) }
    }

    pub fn apply_to_local_thread(&self) -> io::Result<()> {
        self.apply_to_thread(0)
    }

    pub fn apply_to_thread(&self, tid: i32) -> io::Result<()> {
        let r = unsafe {
            libc::sched_setaffinity(
                tid,
                size_of::<libc::cpu_set_t>() as libc::size_t,
                &self.cpu_set,
            )
        };
        if r != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    pub fn for_thread(tid: i32) -> io::Result<Self> {
        let mut affinity = CpuAffinity::default();
        let r = unsafe {
            libc::sched_getaffinity(
                tid,
                size_of::<libc::cpu_set_t>() as libc::size_t,
                &mut affinity.cpu_set,
            )
        };
        if r != 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(affinity)
        }
    }
}

/// Number of CPUs configured on this host, which may exceed the online ones.
pub fn configured_cpus() -> usize {
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_CONF) };
    if n < 1 { 1 } else { n as usize }
}

pub fn current_tid() -> i32 {
    rustix::thread::gettid().as_raw_nonzero().get()
}

pub fn current_pid() -> i32 {
    rustix::process::getpid().as_raw_nonzero().get()
}

pub fn priority_range(policy: i32) -> io::Result<(i32, i32)> {
    let min = unsafe { libc::sched_get_priority_min(policy) };
    if min == -1 {
        return Err(io::Error::last_os_error());
    }
    let max = unsafe { libc::sched_get_priority_max(policy) };
    if max == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok((min, max))
}

/// Read the live policy and native priority of the thread with kernel id `tid`.
pub fn get_sched_param(tid: i32) -> io::Result<SchedParam> {
    let policy = unsafe { libc::sched_getscheduler(tid) };
    if policy == -1 {
        return Err(io::Error::last_os_error());
    }
    let mut param: libc::sched_param = unsafe { mem::zeroed() };
    let r = unsafe { libc::sched_getparam(tid, &mut param) };
    if r != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(SchedParam {
        policy: policy & !SCHED_RESET_ON_FORK,
        priority: param.sched_priority,
        reset_on_fork: policy & SCHED_RESET_ON_FORK != 0,
    })
}

pub fn set_sched_param(tid: i32, param: SchedParam) -> io::Result<()> {
    let mut sp: libc::sched_param = unsafe { mem::zeroed() };
    sp.sched_priority = param.priority;
    let policy = if param.reset_on_fork {
        param.policy | SCHED_RESET_ON_FORK
    } else {
        param.policy
    };
    let r = unsafe { libc::sched_setscheduler(tid, policy, &sp) };
    if r != 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
