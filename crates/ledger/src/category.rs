// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{ProtocolError, ProtocolResult};
use cg_events::{Category, RequestId};
use cg_fhe::HeEngine;
use cg_utils::ArcBytes;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCounter {
    pub encrypted_count: ArcBytes,
    /// Newest value the oracle revealed for this counter, if any.
    pub revealed: Option<RevealedCount>,
}

/// A decrypted count together with the request that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealedCount {
    pub request_id: RequestId,
    pub count: u64,
}

/// One encrypted running count per category. Counters are created lazily at an encrypted
/// zero and only ever grow by an encrypted one.
#[derive(Debug, Default)]
pub struct CategoryAggregator {
    order: Vec<Category>,
    counters: HashMap<Category, CategoryCounter>,
}

impl CategoryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the category's counter, creating it first if needed.
    pub fn increment(
        &mut self,
        category: &Category,
        engine: &dyn HeEngine,
    ) -> ProtocolResult<ArcBytes> {
        let next = self.incremented(category, engine)?;
        self.store(category, next.clone());
        Ok(next)
    }

    /// Value the counter would hold after an increment. Nothing is stored.
    pub fn incremented(
        &self,
        category: &Category,
        engine: &dyn HeEngine,
    ) -> ProtocolResult<ArcBytes> {
        let current = match self.counters.get(category) {
            Some(counter) => {
                if !engine.is_initialized(&counter.encrypted_count) {
                    return Err(ProtocolError::Engine(format!(
                        "counter for '{category}' is not an initialized ciphertext"
                    )));
                }
                counter.encrypted_count.clone()
            }
            None => engine.wrap_constant(0).map_err(ProtocolError::engine)?,
        };
        let one = engine.wrap_constant(1).map_err(ProtocolError::engine)?;
        engine.add(&current, &one).map_err(ProtocolError::engine)
    }

    /// Replace the counter's value, registering the category if it is new.
    pub fn store(&mut self, category: &Category, encrypted_count: ArcBytes) {
        match self.counters.get_mut(category) {
            Some(counter) => counter.encrypted_count = encrypted_count,
            None => {
                self.order.push(category.clone());
                self.counters.insert(
                    category.clone(),
                    CategoryCounter {
                        encrypted_count,
                        revealed: None,
                    },
                );
            }
        }
    }

    pub fn encrypted_count(&self, category: &Category) -> ProtocolResult<&ArcBytes> {
        self.get(category).map(|c| &c.encrypted_count)
    }

    /// Known categories in the order they were first seen.
    pub fn categories(&self) -> &[Category] {
        &self.order
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.counters.contains_key(category)
    }

    /// Store a revealed count unless a later request already revealed one. Oracle request
    /// ids increase with issue order and counters never shrink, so the highest id wins.
    /// Returns whether the stored value changed.
    pub fn record_revealed(
        &mut self,
        category: &Category,
        request_id: RequestId,
        count: u64,
    ) -> ProtocolResult<bool> {
        let counter = self
            .counters
            .get_mut(category)
            .ok_or_else(|| ProtocolError::CategoryNotFound(category.clone()))?;
        if matches!(counter.revealed, Some(current) if current.request_id > request_id) {
            return Ok(false);
        }
        counter.revealed = Some(RevealedCount { request_id, count });
        Ok(true)
    }

    pub fn revealed_count(&self, category: &Category) -> ProtocolResult<Option<u64>> {
        self.get(category).map(|c| c.revealed.map(|r| r.count))
    }

    fn get(&self, category: &Category) -> ProtocolResult<&CategoryCounter> {
        self.counters
            .get(category)
            .ok_or_else(|| ProtocolError::CategoryNotFound(category.clone()))
    }
}
