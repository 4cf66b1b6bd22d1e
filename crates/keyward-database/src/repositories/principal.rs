//! Principal (user credential) lookup.

use std::fmt::Debug;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_entity::session::Principal;

/// Resolves login names to principals.
#[async_trait]
pub trait PrincipalRepository: Send + Sync + Debug + 'static {
    /// Find a principal by exact username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Principal>>;

    /// Find a principal by user id.
    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<Principal>>;

    /// Insert a principal. `Conflict` if the username or id is taken.
    async fn create(&self, principal: &Principal) -> AppResult<()>;
}

/// In-process principal repository keyed by username.
#[derive(Debug, Default)]
pub struct MemoryPrincipalRepository {
    principals: DashMap<String, Principal>,
}

impl MemoryPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalRepository for MemoryPrincipalRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Principal>> {
        Ok(self.principals.get(username).map(|e| e.value().clone()))
    }

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<Principal>> {
        Ok(self
            .principals
            .iter()
            .find(|e| e.user_id == user_id)
            .map(|e| e.value().clone()))
    }

    async fn create(&self, principal: &Principal) -> AppResult<()> {
        if self.find_by_id(principal.user_id).await?.is_some() {
            return Err(AppError::conflict(format!(
                "User id {} already exists",
                principal.user_id
            )));
        }
        match self.principals.entry(principal.username.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Username '{}' already exists",
                principal.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(principal.clone());
                debug!(user_id = principal.user_id, "Principal created");
                Ok(())
            }
        }
    }
}
