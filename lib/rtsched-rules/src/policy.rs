/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use rtsched_compat::policy;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid policy \"{0}\"")]
pub struct PolicyParseError(String);

/// OS thread scheduling policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedPolicy {
    Other,
    Fifo,
    RoundRobin,
    Batch,
    Idle,
}

impl SchedPolicy {
    const ALL: [SchedPolicy; 5] = [
        SchedPolicy::Other,
        SchedPolicy::Fifo,
        SchedPolicy::RoundRobin,
        SchedPolicy::Batch,
        SchedPolicy::Idle,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SchedPolicy::Other => "OTHER",
            SchedPolicy::Fifo => "FIFO",
            SchedPolicy::RoundRobin => "RR",
            SchedPolicy::Batch => "BATCH",
            SchedPolicy::Idle => "IDLE",
        }
    }

    #[inline]
    pub const fn is_realtime(&self) -> bool {
        matches!(self, SchedPolicy::Fifo | SchedPolicy::RoundRobin)
    }

    /// The OS policy id, or `None` if the host does not support this policy.
    pub fn to_raw(self) -> Option<i32> {
        match self {
            SchedPolicy::Other => Some(policy::OTHER),
            SchedPolicy::Fifo => Some(policy::FIFO),
            SchedPolicy::RoundRobin => Some(policy::RR),
            SchedPolicy::Batch => policy::BATCH,
            SchedPolicy::Idle => policy::IDLE,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.to_raw() == Some(raw))
    }

    #[inline]
    pub fn is_supported(&self) -> bool {
        self.to_raw().is_some()
    }

    /// Name of an OS policy id, `?` for unknown ones.
    pub fn raw_name(raw: i32) -> &'static str {
        Self::from_raw(raw).map(|p| p.as_str()).unwrap_or("?")
    }
}

impl fmt::Display for SchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedPolicy {
    type Err = PolicyParseError;

    /// Case insensitive, with optional `SCHED_` prefix. Only the first
    /// character decides the policy, e.g. `f`, `Fifo`, `SCHED_FIFO`, `fx`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s.get(..6) {
            Some(prefix) if prefix.eq_ignore_ascii_case("SCHED_") => &s[6..],
            _ => s,
        };
        let Some(first) = name.chars().next() else {
            return Err(PolicyParseError(s.to_string()));
        };

        Self::ALL
            .into_iter()
            .filter(|p| p.is_supported())
            .find(|p| p.as_str().starts_with(first.to_ascii_uppercase()))
            .ok_or_else(|| PolicyParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fifo() {
        for s in ["f", "F", "FIFO", "fifo", "Fifo", "SCHED_FIFO", "sched_fi"] {
            assert_eq!(SchedPolicy::from_str(s).unwrap(), SchedPolicy::Fifo, "{s}");
        }
    }

    #[test]
    fn parse_other() {
        assert_eq!(SchedPolicy::from_str("o").unwrap(), SchedPolicy::Other);
        assert_eq!(SchedPolicy::from_str("r").unwrap(), SchedPolicy::RoundRobin);
        assert_eq!(SchedPolicy::from_str("SCHED_RR").unwrap(), SchedPolicy::RoundRobin);
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn parse_linux_ext() {
        assert_eq!(SchedPolicy::from_str("b").unwrap(), SchedPolicy::Batch);
        assert_eq!(SchedPolicy::from_str("idle").unwrap(), SchedPolicy::Idle);
    }

    #[test]
    fn parse_first_char() {
        assert_eq!(SchedPolicy::from_str("FIFO ").unwrap(), SchedPolicy::Fifo);
        assert_eq!(SchedPolicy::from_str("fx").unwrap(), SchedPolicy::Fifo);
        assert_eq!(SchedPolicy::from_str("Fast").unwrap(), SchedPolicy::Fifo);
        assert_eq!(SchedPolicy::from_str("fifox").unwrap(), SchedPolicy::Fifo);
        assert_eq!(SchedPolicy::from_str("rr1").unwrap(), SchedPolicy::RoundRobin);
        assert_eq!(SchedPolicy::from_str("other_x").unwrap(), SchedPolicy::Other);
        assert_eq!(SchedPolicy::from_str("sched_Rx").unwrap(), SchedPolicy::RoundRobin);
    }

    #[test]
    fn parse_invalid() {
        assert!(SchedPolicy::from_str("xyz").is_err());
        assert!(SchedPolicy::from_str("").is_err());
        assert!(SchedPolicy::from_str("SCHED_").is_err());
        assert!(SchedPolicy::from_str(" fifo").is_err());
        let e = SchedPolicy::from_str("xyz").unwrap_err();
        assert_eq!(e.to_string(), "invalid policy \"xyz\"");
    }

    #[test]
    fn raw() {
        let raw = SchedPolicy::Fifo.to_raw().unwrap();
        assert_eq!(SchedPolicy::from_raw(raw), Some(SchedPolicy::Fifo));
        assert_eq!(SchedPolicy::raw_name(raw), "FIFO");
        assert_eq!(SchedPolicy::raw_name(-100), "?");
        assert!(SchedPolicy::RoundRobin.is_realtime());
        assert!(!SchedPolicy::Other.is_realtime());
    }
}
