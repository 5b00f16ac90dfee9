/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use crate::{Rule, cpu_count};

const NAME_WIDTH: usize = 16;

/// Printable listing of a rule snapshot.
pub struct RuleTable {
    rules: Vec<Rule>,
    affinity_width: usize,
}

fn affinity_width(cpus: usize) -> usize {
    let max_id = cpus.saturating_sub(1);
    let digits = max_id.checked_ilog10().unwrap_or(0) as usize + 1;
    ((digits + 1) * cpus / 2).max(10)
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self::with_cpu_count(rules, cpu_count())
    }

    pub fn with_cpu_count(rules: Vec<Rule>, cpus: usize) -> Self {
        RuleTable {
            rules,
            affinity_width: affinity_width(cpus),
        }
    }

    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl fmt::Display for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rules.is_empty() {
            return writeln!(f, "No rules defined.");
        }

        let w = self.affinity_width;
        writeln!(f, "{:>NAME_WIDTH$}  PRIO POLICY {:<w$} PATTERN", "NAME", "AFFINITY")?;
        for rule in &self.rules {
            let m = rule.modifiers();
            write!(f, "{:>NAME_WIDTH$}  ", rule.name())?;
            match &m.priority {
                Some(p) => write!(f, "{p:>4} ")?,
                None => write!(f, "   * ")?,
            }
            let policy = m.policy.map(|p| p.as_str()).unwrap_or("*");
            let affinity = m
                .affinity
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "*".to_string());
            writeln!(f, "{policy:>6} {affinity:<w$} {}", rule.pattern())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Modifiers;

    fn rule(name: &str, policy: &str, priority: &str, cpus: &str, pattern: &str) -> Rule {
        let m = Modifiers::parse_with_cpu_count(policy, priority, cpus, 8);
        Rule::with_modifiers(name, pattern, m).unwrap()
    }

    #[test]
    fn width() {
        assert_eq!(affinity_width(1), 10);
        assert_eq!(affinity_width(8), 10);
        assert_eq!(affinity_width(64), 96);
        assert_eq!(affinity_width(128), 256);
    }

    #[test]
    fn empty() {
        let table = RuleTable::with_cpu_count(Vec::new(), 8);
        assert_eq!(table.to_string(), "No rules defined.\n");
    }

    #[test]
    fn rows() {
        let rules = vec![
            rule("cbLow", "fifo", "+5", "*", "cbLow"),
            rule("a-very-long-rule-name", "*", "20", "0,2-3", "^CAS-"),
            rule("scan", "*", "*", "*", "scan.*"),
        ];
        let table = RuleTable::with_cpu_count(rules, 8);
        let expected = concat!(
            "            NAME  PRIO POLICY AFFINITY   PATTERN\n",
            "           cbLow    +5   FIFO *          cbLow\n",
            "a-very-long-rule-name    20      * 0,2-3      ^CAS-\n",
            "            scan     *      * *          scan.*\n",
        );
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn long_names_stay_distinct() {
        let rules = vec![
            rule("callback-thread-A", "*", "10", "*", "cbA"),
            rule("callback-thread-B", "*", "11", "*", "cbB"),
        ];
        let table = RuleTable::with_cpu_count(rules, 8).to_string();
        let mut lines = table.lines().skip(1);
        assert!(lines.next().unwrap().starts_with("callback-thread-A    10 "));
        assert!(lines.next().unwrap().starts_with("callback-thread-B    11 "));
    }
}
