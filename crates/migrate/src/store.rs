//! Version store - durable record of which (scope, version) pairs have run.
//!
//! The store is the only storage boundary the engine depends on. Any backend
//! qualifies if it can durably record a set of `(scope, i64)` pairs and list
//! them by scope. There is no transactional coupling between hook execution
//! and the version write; see [`crate::MigrationRunner::run`] for how the
//! engine reacts when the write fails after a hook succeeded.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::unit::Scope;

/// Durable record of applied migrations, keyed by scope and ordering number.
///
/// Writes must be idempotent: recording a pair twice, or removing a pair
/// that was never recorded, is not an error.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Every ordering number recorded as applied for `scope`.
    async fn applied_versions(&self, scope: Scope) -> Result<HashSet<i64>, StoreError>;

    /// Record `(scope, number)` as applied.
    async fn record_applied(&self, scope: Scope, number: i64) -> Result<(), StoreError>;

    /// Remove the applied record for `(scope, number)`.
    async fn record_unapplied(&self, scope: Scope, number: i64) -> Result<(), StoreError>;
}

/// In-memory version store for tests and embedded hosts.
///
/// Clones share state, so the handle an orchestrated hook receives observes
/// the same versions as the runner.
#[derive(Clone, Default)]
pub struct MemoryStore {
    versions: Arc<DashMap<Scope, HashSet<i64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn applied_versions(&self, scope: Scope) -> Result<HashSet<i64>, StoreError> {
        Ok(self
            .versions
            .get(&scope)
            .map(|versions| versions.value().clone())
            .unwrap_or_default())
    }

    async fn record_applied(&self, scope: Scope, number: i64) -> Result<(), StoreError> {
        self.versions.entry(scope).or_default().insert(number);
        Ok(())
    }

    async fn record_unapplied(&self, scope: Scope, number: i64) -> Result<(), StoreError> {
        if let Some(mut versions) = self.versions.get_mut(&scope) {
            versions.remove(&number);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scopes_are_independent() {
        let store = MemoryStore::new();
        store.record_applied(Scope::Pre, 100).await.unwrap();

        assert_eq!(
            store.applied_versions(Scope::Pre).await.unwrap(),
            HashSet::from([100])
        );
        assert!(store.applied_versions(Scope::Post).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_are_idempotent() {
        let store = MemoryStore::new();

        store.record_applied(Scope::Pre, 100).await.unwrap();
        store.record_applied(Scope::Pre, 100).await.unwrap();
        assert_eq!(
            store.applied_versions(Scope::Pre).await.unwrap(),
            HashSet::from([100])
        );

        store.record_unapplied(Scope::Pre, 100).await.unwrap();
        store.record_unapplied(Scope::Pre, 100).await.unwrap();
        assert!(store.applied_versions(Scope::Pre).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.record_applied(Scope::Post, 200).await.unwrap();

        assert_eq!(
            store.applied_versions(Scope::Post).await.unwrap(),
            HashSet::from([200])
        );
    }
}
