/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::OnceLock;

use log::debug;

use crate::SchedPolicy;

/// Lowest portable thread priority.
pub const PRIORITY_MIN: i32 = 0;
/// Highest portable thread priority.
pub const PRIORITY_MAX: i32 = 99;

#[inline]
pub(crate) fn clamp_priority(p: i64) -> i32 {
    p.clamp(i64::from(PRIORITY_MIN), i64::from(PRIORITY_MAX)) as i32
}

/// A requested priority change, on the portable scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityChange {
    /// Set to this value, already clamped.
    Absolute(i32),
    /// Add this delta to the current priority, clamped after the addition.
    Relative(i32),
}

impl PriorityChange {
    pub fn resolve(self, current: i32) -> i32 {
        match self {
            PriorityChange::Absolute(p) => clamp_priority(i64::from(p)),
            PriorityChange::Relative(delta) => {
                clamp_priority(i64::from(current) + i64::from(delta))
            }
        }
    }
}

impl fmt::Display for PriorityChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityChange::Absolute(p) => f.pad(&p.to_string()),
            PriorityChange::Relative(d) => f.pad(&format!("{d:+}")),
        }
    }
}

/// Maps portable priorities onto the native priority range of the
/// real-time policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriorityScale {
    native_min: i32,
    native_max: i32,
}

static GLOBAL_PRIORITY_SCALE: OnceLock<PriorityScale> = OnceLock::new();

impl PriorityScale {
    pub const fn new(native_min: i32, native_max: i32) -> Self {
        PriorityScale {
            native_min,
            native_max,
        }
    }

    /// Query the native FIFO priority range of this host.
    pub fn detect() -> Self {
        let fifo = SchedPolicy::Fifo.to_raw().unwrap_or_default();
        match rtsched_compat::priority_range(fifo) {
            Ok((min, max)) => PriorityScale::new(min, max),
            Err(e) => {
                debug!("unable to get native real-time priority range: {e}");
                PriorityScale::new(1, 99)
            }
        }
    }

    pub fn global() -> Self {
        *GLOBAL_PRIORITY_SCALE.get_or_init(Self::detect)
    }

    #[inline]
    pub fn native_range(&self) -> (i32, i32) {
        (self.native_min, self.native_max)
    }

    /// Native priority to use for `policy` at portable priority `priority`.
    ///
    /// Non real-time policies only accept native priority 0.
    pub fn to_native(&self, policy: SchedPolicy, priority: i32) -> i32 {
        if !policy.is_realtime() {
            return 0;
        }
        if self.native_max <= self.native_min {
            return self.native_max;
        }
        let p = i64::from(clamp_priority(i64::from(priority)));
        let span = i64::from(self.native_max - self.native_min);
        self.native_min + (p * span / 100) as i32
    }

    /// Best effort inverse of [`PriorityScale::to_native`].
    pub fn to_portable(&self, policy: SchedPolicy, native: i32) -> i32 {
        if !policy.is_realtime() || self.native_max <= self.native_min {
            return PRIORITY_MIN;
        }
        let offset = i64::from(native) - i64::from(self.native_min);
        let span = i64::from(self.native_max - self.native_min);
        let p = (offset * 100 + span - 1).div_euclid(span);
        clamp_priority(p)
    }
}
