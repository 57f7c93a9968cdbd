// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory session → transition table store
//!
//! Bounded; the least recently used session is evicted once capacity is
//! reached. Nothing survives a restart.

use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::fsa::TransitionTable;

pub struct SessionStore {
    tables: Mutex<LruCache<Uuid, TransitionTable>>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            tables: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn get(&self, id: &Uuid) -> Option<TransitionTable> {
        self.tables.lock().await.get(id).cloned()
    }

    /// Store `table`, replacing whatever the session held
    pub async fn insert(&self, id: Uuid, table: TransitionTable) {
        let mut tables = self.tables.lock().await;
        if let Some((evicted, _)) = tables.push(id, table) {
            if evicted != id {
                debug!("Evicted session {} from the table store", evicted);
            }
        }
    }

    /// Forget the session's table; returns whether one was stored
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.tables.lock().await.pop(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.tables.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
