/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use log::trace;

use crate::{Rule, RuleError, RuleTable};

static GLOBAL_RULE_STORE: OnceLock<Arc<RuleStore>> = OnceLock::new();

/// Ordered collection of uniquely named rules.
///
/// All rules matching a thread are applied, in insertion order.
#[derive(Default)]
pub struct RuleStore {
    rules: Mutex<Vec<Rule>>,
}

impl RuleStore {
    pub const fn new() -> Self {
        RuleStore {
            rules: Mutex::new(Vec::new()),
        }
    }

    /// The process wide store, created on first use.
    pub fn global() -> &'static Arc<RuleStore> {
        GLOBAL_RULE_STORE.get_or_init(|| Arc::new(RuleStore::new()))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Rule>> {
        // the list is never left half-modified, so a poisoned lock is still usable
        self.rules.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a rule, replacing any existing rule with the same name.
    ///
    /// Nothing is changed if the pattern fails to compile.
    pub fn add_or_replace(
        &self,
        name: &str,
        policy: &str,
        priority: &str,
        cpus: &str,
        pattern: &str,
    ) -> Result<(), RuleError> {
        let rule = Rule::new(name, policy, priority, cpus, pattern)?;
        self.insert(rule);
        Ok(())
    }

    pub fn insert(&self, rule: Rule) {
        let old = {
            let mut rules = self.lock();
            let old = rules
                .iter()
                .position(|r| r.name() == rule.name())
                .map(|i| rules.remove(i));
            rules.push(rule);
            old
        };
        drop(old);
    }

    /// Delete the rule with this name, returns `false` if there is none.
    pub fn delete(&self, name: &str) -> bool {
        let old = {
            let mut rules = self.lock();
            rules
                .iter()
                .position(|r| r.name() == name)
                .map(|i| rules.remove(i))
        };
        old.is_some()
    }

    /// A point-in-time copy of all rules.
    pub fn list(&self) -> Vec<Rule> {
        self.lock().clone()
    }

    pub fn get(&self, name: &str) -> Option<Rule> {
        self.lock().iter().find(|r| r.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn table(&self) -> RuleTable {
        RuleTable::new(self.list())
    }

    /// Call `visit` for every rule matching `thread_name`, in insertion order.
    ///
    /// The store is locked for the whole scan, so the visitor sees one
    /// consistent rule list. Returns the number of matched rules.
    pub fn foreach_matching<F>(&self, thread_name: &str, mut visit: F) -> usize
    where
        F: FnMut(&Rule),
    {
        let rules = self.lock();
        if rules.is_empty() {
            return 0;
        }

        let mut matched = 0;
        for rule in rules.iter() {
            if rule.matches(thread_name) {
                trace!("thread {thread_name} matched rule {}", rule.name());
                visit(rule);
                matched += 1;
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriorityChange;

    #[test]
    fn replace_same_name() {
        let store = RuleStore::new();
        store.add_or_replace("r1", "*", "10", "*", "a").unwrap();
        store.add_or_replace("r2", "*", "*", "*", "b").unwrap();
        store.add_or_replace("r1", "*", "20", "*", "c").unwrap();

        let rules = store.list();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "r2");
        assert_eq!(rules[1].name(), "r1");
        assert_eq!(rules[1].pattern(), "c");
        assert_eq!(
            rules[1].modifiers().priority,
            Some(PriorityChange::Absolute(20))
        );
    }

    #[test]
    fn bad_pattern_keeps_old() {
        let store = RuleStore::new();
        store.add_or_replace("r1", "*", "10", "*", "a").unwrap();
        assert!(store.add_or_replace("r1", "*", "20", "*", "(").is_err());
        assert!(store.add_or_replace("r2", "*", "20", "*", "[").is_err());
        assert_eq!(store.len(), 1);
        let rule = store.get("r1").unwrap();
        assert_eq!(rule.modifiers().priority, Some(PriorityChange::Absolute(10)));
    }

    #[test]
    fn delete() {
        let store = RuleStore::new();
        store.add_or_replace("r1", "*", "10", "*", "a").unwrap();
        store.add_or_replace("r2", "*", "10", "*", "b").unwrap();
        assert!(!store.delete("none"));
        assert_eq!(store.len(), 2);
        assert!(store.delete("r1"));
        assert!(!store.delete("r1"));
        let rules = store.list();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name(), "r2");
    }

    #[test]
    fn foreach_matching_order() {
        let store = RuleStore::new();
        assert_eq!(store.foreach_matching("anything", |_| panic!("empty store")), 0);

        store.add_or_replace("a", "*", "+5", "*", "callback.*").unwrap();
        store.add_or_replace("b", "*", "*", "0-1", "call.*").unwrap();
        store.add_or_replace("c", "*", "*", "*", "^cas").unwrap();

        let mut seen = Vec::new();
        let n = store.foreach_matching("callback-7", |r| seen.push(r.name().to_string()));
        assert_eq!(n, 2);
        assert_eq!(seen, ["a", "b"]);
    }

    #[test]
    fn concurrent_snapshot() {
        let store = RuleStore::new();
        std::thread::scope(|s| {
            for w in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..200 {
                        let name = format!("r{}", i % 8);
                        let prio = (w * 10 + i % 8).to_string();
                        store
                            .add_or_replace(&name, "*", &prio, "*", "worker")
                            .unwrap();
                        if i % 3 == 0 {
                            store.delete(&name);
                        }
                    }
                });
            }
            s.spawn(|| {
                for _ in 0..500 {
                    let mut names = Vec::new();
                    store.foreach_matching("worker#1", |r| {
                        assert_eq!(r.pattern(), "worker");
                        assert!(matches!(
                            r.modifiers().priority,
                            Some(PriorityChange::Absolute(_))
                        ));
                        names.push(r.name().to_string());
                    });
                    let count = names.len();
                    names.sort();
                    names.dedup();
                    assert_eq!(names.len(), count);
                }
            });
        });
        assert!(store.len() <= 8);
    }
}
