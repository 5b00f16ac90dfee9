/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Loading of rule files.
//!
//! Each non-comment line of a rule file holds one rule:
//!
//! ```text
//! name:policy:priority:affinity:pattern
//! ```
//!
//! The pattern is the remainder of the line and may contain `:` itself.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::RuleStore;

pub const SYSTEM_RULES_FILE: &str = "/etc/rtrules";
pub const USER_RULES_FILE_ENV: &str = "RTSCHED_USERCONFIG";
pub const DEFAULT_USER_RULES_FILE: &str = ".rtrules";

#[derive(Debug, Error)]
pub enum RuleFileError {
    #[error("failed to open rule file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {source_name} at line {line}: {source}")]
    Read {
        source_name: String,
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// The ordered list of rule files to load at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleFiles {
    files: Vec<PathBuf>,
}

impl RuleFiles {
    pub fn new(files: Vec<PathBuf>) -> Self {
        RuleFiles { files }
    }

    /// The system file, then the user file found below `$HOME`.
    ///
    /// The user file name may be overridden by `RTSCHED_USERCONFIG`.
    pub fn from_env() -> Self {
        let home = std::env::var_os("HOME").unwrap_or_else(|| "/".into());
        let user_file = std::env::var_os(USER_RULES_FILE_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_RULES_FILE.into());
        RuleFiles::new(vec![
            PathBuf::from(SYSTEM_RULES_FILE),
            Path::new(&home).join(user_file),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|p| p.as_path())
    }
}

/// Load rules from `reader` into `store`, returns the number of rules added.
///
/// A malformed line stops loading of the remaining lines. A rule with an
/// invalid pattern is skipped.
pub fn load_rules_from<R: BufRead>(
    store: &RuleStore,
    reader: R,
    source_name: &str,
) -> Result<usize, RuleFileError> {
    let mut added = 0;
    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line.map_err(|e| RuleFileError::Read {
            source_name: source_name.to_string(),
            line: line_number,
            source: e,
        })?;
        let line = line.trim_start();
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.splitn(5, ':').collect();
        let [name, policy, priority, cpus, pattern] = fields[..] else {
            error!(
                "{source_name}:{line_number}: expected 5 fields in \"name:policy:priority:affinity:pattern\", stop loading"
            );
            break;
        };
        match store.add_or_replace(name, policy, priority, cpus, pattern) {
            Ok(_) => added += 1,
            Err(e) => warn!("{source_name}:{line_number}: rule {name} skipped: {e}"),
        }
    }
    Ok(added)
}

pub fn load_rules_file(store: &RuleStore, path: &Path) -> Result<usize, RuleFileError> {
    let file = File::open(path).map_err(|e| RuleFileError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_rules_from(store, BufReader::new(file), &path.display().to_string())
}

/// Load every file in order, later rules replacing earlier ones of the same
/// name. Missing files are skipped. Returns the total number of rules added.
pub fn load_rule_files(store: &RuleStore, files: &RuleFiles) -> usize {
    let mut total = 0;
    for path in files.iter() {
        match load_rules_file(store, path) {
            Ok(n) => {
                info!("read {n} thread rule(s) from {}", path.display());
                total += n;
            }
            Err(e @ RuleFileError::Open { .. }) => debug!("{e}"),
            Err(e) => error!("{e}"),
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PriorityChange, SchedPolicy};
    use std::io::Cursor;

    const SAMPLE: &str = "\
# realtime tuning
   cbHigh:fifo:90:*:^cbHigh$

cas:rr:+5:0:CAS-.*\r
scan:*:*:*:scan[0-9]+:x
";

    #[test]
    fn load_sample() {
        let store = RuleStore::new();
        let n = load_rules_from(&store, Cursor::new(SAMPLE), "sample").unwrap();
        assert_eq!(n, 3);

        let rules = store.list();
        assert_eq!(rules[0].name(), "cbHigh");
        assert_eq!(rules[0].modifiers().policy, Some(SchedPolicy::Fifo));
        assert_eq!(
            rules[0].modifiers().priority,
            Some(PriorityChange::Absolute(90))
        );
        assert_eq!(rules[1].pattern(), "CAS-.*");
        assert_eq!(
            rules[1].modifiers().priority,
            Some(PriorityChange::Relative(5))
        );
        assert_eq!(rules[2].pattern(), "scan[0-9]+:x");
        assert!(rules[2].modifiers().is_empty());
        assert!(rules[2].matches("scan12:x"));
    }

    #[test]
    fn malformed_line_stops() {
        let store = RuleStore::new();
        let text = "a:*:1:*:a\nbroken:line\nb:*:2:*:b\n";
        let n = load_rules_from(&store, Cursor::new(text), "test").unwrap();
        assert_eq!(n, 1);
        assert!(store.get("b").is_none());
    }

    #[test]
    fn bad_pattern_skipped() {
        let store = RuleStore::new();
        let text = "a:*:1:*:(\nb:*:2:*:b\n";
        let n = load_rules_from(&store, Cursor::new(text), "test").unwrap();
        assert_eq!(n, 1);
        assert!(store.get("a").is_none());
        assert!(store.get("b").is_some());
    }

    #[test]
    fn later_file_replaces() {
        let dir = std::env::temp_dir().join(format!("rtsched-rules-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("first");
        let second = dir.join("second");
        std::fs::write(&first, "r:*:10:*:a\nkeep:*:*:0:k\n").unwrap();
        std::fs::write(&second, "r:*:20:*:b\n").unwrap();

        let store = RuleStore::new();
        let files = RuleFiles::new(vec![first, dir.join("missing"), second]);
        assert_eq!(load_rule_files(&store, &files), 3);
        assert_eq!(store.len(), 2);

        let rules = store.list();
        assert_eq!(rules[0].name(), "keep");
        assert_eq!(rules[1].name(), "r");
        assert_eq!(rules[1].pattern(), "b");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file() {
        let store = RuleStore::new();
        let err = load_rules_file(&store, Path::new("/nonexistent/rtrules")).unwrap_err();
        assert!(matches!(err, RuleFileError::Open { .. }));
    }

    #[test]
    fn default_files() {
        let files = RuleFiles::from_env();
        let paths: Vec<&Path> = files.iter().collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], Path::new(SYSTEM_RULES_FILE));
    }
}
