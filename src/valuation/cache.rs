//! Per-request memoization of single-life CNU values
//!
//! Projection loops recompute the CNU at every simulated age. Within one
//! request the same (table, age, rate) triple is valued many times, so results
//! are kept here and discarded with the calculator.

use std::collections::HashMap;

use crate::assumptions::TableKey;

/// Cache key: table, age and the exact bits of the rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CnuKey {
    pub table: TableKey,
    pub age: u32,
    rate_bits: u64,
}

impl CnuKey {
    pub fn new(table: TableKey, age: u32, rate: f64) -> Self {
        Self {
            table,
            age,
            rate_bits: rate.to_bits(),
        }
    }
}

/// Memoized single-life CNU values
#[derive(Debug, Default)]
pub struct CnuCache {
    entries: HashMap<CnuKey, f64>,

    /// Statistics
    pub hits: u64,
    pub misses: u64,
}

impl CnuCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value, recording a hit or miss
    pub fn get(&mut self, key: &CnuKey) -> Option<f64> {
        match self.entries.get(key) {
            Some(&value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CnuKey, value: f64) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
