//! In-memory identity store for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use votegate_core::AppResult;
use votegate_core::traits::IdentityStore;

#[derive(Debug, Clone)]
struct Registration {
    voting_key: String,
    has_voted: bool,
}

/// Identity store keeping registrations in a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    students: Arc<RwLock<HashMap<String, Registration>>>,
}

impl MemoryIdentityStore {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-key) an identity.
    pub async fn register(&self, identity: impl Into<String>, voting_key: impl Into<String>) {
        self.students.write().await.insert(
            identity.into(),
            Registration {
                voting_key: voting_key.into(),
                has_voted: false,
            },
        );
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn verify(&self, identity: &str, proof: &str) -> AppResult<bool> {
        Ok(self
            .students
            .read()
            .await
            .get(identity)
            .is_some_and(|r| r.voting_key == proof))
    }

    async fn has_completed(&self, identity: &str) -> AppResult<bool> {
        Ok(self
            .students
            .read()
            .await
            .get(identity)
            .is_some_and(|r| r.has_voted))
    }

    async fn mark_completed(&self, identity: &str) -> AppResult<()> {
        if let Some(registration) = self.students.write().await.get_mut(identity) {
            registration.has_voted = true;
        }
        Ok(())
    }
}
