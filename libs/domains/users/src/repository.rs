use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// In-place change applied by [`UserRepository::modify`]; an error aborts the write
pub type UserMutation = Box<dyn FnOnce(&mut User) -> UserResult<()> + Send>;

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Store a new record under a freshly assigned id
    async fn create(&self, user: NewUser) -> UserResult<User>;

    /// Overwrite every field of an existing record; `NotFound` if absent
    async fn replace(&self, id: i64, user: NewUser) -> UserResult<User>;

    /// Returns whether a record was removed
    async fn delete(&self, id: i64) -> UserResult<bool>;

    /// Records with `start <= birth_date <= end`, ordered by id
    async fn find_by_birth_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> UserResult<Vec<User>>;

    /// Fetch, mutate and store one record atomically.
    ///
    /// No other writer can touch the record in between. If `mutation` fails
    /// nothing is persisted.
    async fn modify(&self, id: i64, mutation: UserMutation) -> UserResult<User>;
}

#[derive(Debug)]
struct Store {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        let id = store.next_id;
        store.next_id += 1;

        let user = user.with_id(id);
        store.users.insert(id, user.clone());

        tracing::info!(user_id = id, "Created user");
        Ok(user)
    }

    async fn replace(&self, id: i64, user: NewUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        let slot = store.users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        *slot = user.with_id(id);

        tracing::info!(user_id = id, "Replaced user");
        Ok(slot.clone())
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let mut store = self.store.write().await;

        if store.users.remove(&id).is_some() {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_by_birth_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> UserResult<Vec<User>> {
        let store = self.store.read().await;

        Ok(store
            .users
            .values()
            .filter(|u| (start..=end).contains(&u.birth_date))
            .cloned()
            .collect())
    }

    async fn modify(&self, id: i64, mutation: UserMutation) -> UserResult<User> {
        let mut store = self.store.write().await;

        let current = store.users.get(&id).ok_or(UserError::NotFound(id))?;
        let mut draft = current.clone();
        mutation(&mut draft)?;
        // The id is not patchable
        draft.id = id;

        store.users.insert(id, draft.clone());

        tracing::info!(user_id = id, "Modified user");
        Ok(draft)
    }
}
