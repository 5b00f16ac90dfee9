/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use regex::Regex;
use thiserror::Error;

use crate::Modifiers;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A named modification template, applied to every new thread whose name
/// matches `pattern`.
#[derive(Clone, Debug)]
pub struct Rule {
    name: String,
    pattern: Regex,
    modifiers: Modifiers,
}

impl Rule {
    pub fn new(
        name: &str,
        policy: &str,
        priority: &str,
        cpus: &str,
        pattern: &str,
    ) -> Result<Self, RuleError> {
        Rule::with_modifiers(name, pattern, Modifiers::parse(policy, priority, cpus))
    }

    pub fn with_modifiers(
        name: &str,
        pattern: &str,
        modifiers: Modifiers,
    ) -> Result<Self, RuleError> {
        let regex = Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        Ok(Rule {
            name: name.to_string(),
            pattern: regex,
            modifiers,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    #[inline]
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Unanchored search of the pattern in `thread_name`.
    #[inline]
    pub fn matches(&self, thread_name: &str) -> bool {
        self.pattern.is_match(thread_name)
    }
}
