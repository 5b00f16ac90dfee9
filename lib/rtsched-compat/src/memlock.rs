/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Locking of the whole process address space into RAM, to avoid page faults
//! on latency sensitive threads.

use std::io;

#[cfg(unix)]
pub fn lock_all() -> io::Result<()> {
    let r = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };
    if r != 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(unix)]
pub fn unlock_all() -> io::Result<()> {
    let r = unsafe { libc::munlockall() };
    if r != 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
pub fn lock_all() -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "mlockall"))
}

#[cfg(not(unix))]
pub fn unlock_all() -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "munlockall"))
}
