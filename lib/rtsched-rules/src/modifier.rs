/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use log::warn;

use crate::priority::clamp_priority;
use crate::util::parse_leading_int;
use crate::{CpuSet, PriorityChange, SchedPolicy, cpu_count};

/// Scheduling changes to apply to a thread. `None` means "don't change".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub policy: Option<SchedPolicy>,
    pub priority: Option<PriorityChange>,
    pub affinity: Option<CpuSet>,
}

/// An ad-hoc set of modifiers for one running thread.
pub type ModificationRequest = Modifiers;

fn is_unchanged(s: &str) -> bool {
    s.is_empty() || s.starts_with('*')
}

impl Modifiers {
    /// Parse the three text fields, where `*` or an empty value means "don't change".
    ///
    /// Invalid policy or priority text is logged and treated as "don't change".
    pub fn parse(policy: &str, priority: &str, cpus: &str) -> Self {
        Self::parse_with_cpu_count(policy, priority, cpus, cpu_count())
    }

    pub fn parse_with_cpu_count(policy: &str, priority: &str, cpus: &str, n: usize) -> Self {
        Modifiers {
            policy: parse_policy(policy),
            priority: parse_priority(priority),
            affinity: if is_unchanged(cpus) {
                None
            } else {
                Some(CpuSet::parse_with_cpu_count(cpus, n))
            },
        }
    }

    #[inline]
    pub fn changes_sched(&self) -> bool {
        self.policy.is_some() || self.priority.is_some()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.changes_sched() && self.affinity.is_none()
    }
}

fn parse_policy(s: &str) -> Option<SchedPolicy> {
    if is_unchanged(s) {
        return None;
    }
    match SchedPolicy::from_str(s) {
        Ok(policy) => Some(policy),
        Err(e) => {
            warn!("{e}, policy will not be changed");
            None
        }
    }
}

fn parse_priority(s: &str) -> Option<PriorityChange> {
    if is_unchanged(s) {
        return None;
    }
    let Some(value) = parse_leading_int(s) else {
        warn!("invalid priority \"{s}\", priority will not be changed");
        return None;
    };
    if s.trim_start().starts_with(['+', '-']) {
        let delta = value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Some(PriorityChange::Relative(delta))
    } else {
        Some(PriorityChange::Absolute(clamp_priority(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PRIORITY_MAX, PRIORITY_MIN};

    fn parse(policy: &str, priority: &str, cpus: &str) -> Modifiers {
        Modifiers::parse_with_cpu_count(policy, priority, cpus, 8)
    }

    #[test]
    fn unchanged() {
        let m = parse("*", "*", "*");
        assert!(m.is_empty());
        let m = parse("", "", "");
        assert!(m.is_empty());
    }

    #[test]
    fn full() {
        let m = parse("fifo", "50", "0,2-3");
        assert_eq!(m.policy, Some(SchedPolicy::Fifo));
        assert_eq!(m.priority, Some(PriorityChange::Absolute(50)));
        assert_eq!(m.affinity.unwrap().to_string(), "0,2-3");
    }

    #[test]
    fn priority() {
        assert_eq!(parse("*", "+5", "*").priority, Some(PriorityChange::Relative(5)));
        assert_eq!(parse("*", "-15", "*").priority, Some(PriorityChange::Relative(-15)));
        assert_eq!(parse("*", "+150", "*").priority, Some(PriorityChange::Relative(150)));
        assert_eq!(
            parse("*", "150", "*").priority,
            Some(PriorityChange::Absolute(PRIORITY_MAX))
        );
        assert_eq!(parse("*", "0", "*").priority, Some(PriorityChange::Absolute(PRIORITY_MIN)));
        assert_eq!(parse("*", "abc", "*").priority, None);
    }

    #[test]
    fn bad_policy() {
        let m = parse("xyz", "10", "*");
        assert_eq!(m.policy, None);
        assert_eq!(m.priority, Some(PriorityChange::Absolute(10)));
        assert!(m.changes_sched());
    }
}
