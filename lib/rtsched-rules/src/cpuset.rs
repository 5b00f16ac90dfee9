/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::convert::Infallible;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::OnceLock;

use fixedbitset::FixedBitSet;

use rtsched_compat::CpuAffinity;

use crate::util::parse_leading_int;

static CONFIGURED_CPU_COUNT: OnceLock<usize> = OnceLock::new();

/// The number of CPUs configured on this host, discovered on first use.
pub fn cpu_count() -> usize {
    *CONFIGURED_CPU_COUNT.get_or_init(rtsched_compat::configured_cpus)
}

/// A set of CPU indices in `[0, N)`.
///
/// The text form is a comma separated list of single CPUs or inclusive
/// ranges, e.g. `0,3-5`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CpuSet {
    bits: FixedBitSet,
}

impl Default for CpuSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSet {
    /// Create an empty set sized to the CPUs configured on this host.
    pub fn new() -> Self {
        Self::with_cpu_count(cpu_count())
    }

    pub fn with_cpu_count(n: usize) -> Self {
        CpuSet {
            bits: FixedBitSet::with_capacity(n),
        }
    }

    #[inline]
    pub fn cpu_count(&self) -> usize {
        self.bits.len()
    }

    /// Add `cpu` to the set. Out of range ids are ignored and `false` returned.
    pub fn insert(&mut self, cpu: usize) -> bool {
        if cpu < self.bits.len() {
            self.bits.insert(cpu);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn contains(&self, cpu: usize) -> bool {
        self.bits.contains(cpu)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }

    /// Parse a CPU list spec, sized to the CPUs configured on this host.
    pub fn parse(spec: &str) -> Self {
        Self::parse_with_cpu_count(spec, cpu_count())
    }

    /// Parse a CPU list spec into a set of `n` CPUs.
    ///
    /// Parsing never fails: an unparsable number counts as CPU 0 and CPUs
    /// outside `[0, n)` are dropped.
    pub fn parse_with_cpu_count(spec: &str, n: usize) -> Self {
        let mut set = CpuSet::with_cpu_count(n);
        if n == 0 {
            return set;
        }

        for token in spec.split(',') {
            let (from, to) = match token.split_once('-') {
                Some((from, to)) => (
                    parse_leading_int(from).unwrap_or(0),
                    parse_leading_int(to).unwrap_or(0),
                ),
                None => {
                    let v = parse_leading_int(token).unwrap_or(0);
                    (v, v)
                }
            };

            let from = from.max(0);
            let to = to.min(n as i64 - 1);
            for cpu in from..=to {
                set.bits.insert(cpu as usize);
            }
        }
        set
    }

    pub fn to_affinity(&self) -> io::Result<CpuAffinity> {
        let mut affinity = CpuAffinity::default();
        for cpu in self.iter() {
            affinity.add_id(cpu)?;
        }
        Ok(affinity)
    }

    pub fn from_affinity(affinity: &CpuAffinity, n: usize) -> Self {
        let mut set = CpuSet::with_cpu_count(n);
        for cpu in 0..n {
            if affinity.is_set(cpu) {
                set.bits.insert(cpu);
            }
        }
        set
    }
}

impl FromStr for CpuSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CpuSet::parse(s))
    }
}

impl fmt::Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut run: Option<(usize, usize)> = None;
        let mut first = true;

        let mut write_run = |f: &mut fmt::Formatter<'_>, from: usize, to: usize| {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if from == to {
                write!(f, "{from}")
            } else {
                write!(f, "{from}-{to}")
            }
        };

        for cpu in self.iter() {
            run = match run {
                Some((from, to)) if to + 1 == cpu => Some((from, cpu)),
                Some((from, to)) => {
                    write_run(f, from, to)?;
                    Some((cpu, cpu))
                }
                None => Some((cpu, cpu)),
            };
        }
        if let Some((from, to)) = run {
            write_run(f, from, to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse8(s: &str) -> CpuSet {
        CpuSet::parse_with_cpu_count(s, 8)
    }

    #[test]
    fn parse_list() {
        let set = parse8("0,3-5");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3, 4, 5]);
        assert_eq!(set.to_string(), "0,3-5");
    }

    #[test]
    fn format_runs() {
        let mut set = CpuSet::with_cpu_count(8);
        assert_eq!(set.to_string(), "");
        set.insert(7);
        assert_eq!(set.to_string(), "7");
        set.insert(1);
        set.insert(2);
        assert_eq!(set.to_string(), "1-2,7");
        for i in 0..8 {
            set.insert(i);
        }
        assert_eq!(set.to_string(), "0-7");
    }

    #[test]
    fn parse_unordered() {
        let set = parse8("5,1,2-3");
        assert_eq!(set.to_string(), "1-3,5");
        assert_eq!(parse8(&set.to_string()), set);
    }

    #[test]
    fn parse_out_of_range() {
        let mut set = parse8("6-12,20");
        assert_eq!(set.to_string(), "6-7");
        assert!(!set.insert(8));
        assert!(!set.contains(8));
    }

    #[test]
    fn parse_malformed() {
        assert_eq!(parse8("x").to_string(), "0");
        assert_eq!(parse8("2,y").to_string(), "0,2");
        assert_eq!(parse8("3-1").to_string(), "");
        assert_eq!(parse8(" 1 , 4").to_string(), "1,4");
    }

    #[test]
    fn round_trip() {
        let mut set = CpuSet::with_cpu_count(16);
        for cpu in [0, 2, 3, 4, 8, 10, 11, 15] {
            set.insert(cpu);
        }
        let s = set.to_string();
        assert_eq!(s, "0,2-4,8,10-11,15");
        assert_eq!(CpuSet::parse_with_cpu_count(&s, 16), set);
    }

    #[test]
    fn affinity() {
        let set = parse8("1,3");
        let affinity = set.to_affinity().unwrap();
        assert!(affinity.is_set(1));
        assert!(!affinity.is_set(2));
        assert_eq!(CpuSet::from_affinity(&affinity, 8), set);
    }
}
