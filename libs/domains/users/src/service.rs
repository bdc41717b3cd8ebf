use chrono::NaiveDate;
use std::sync::Arc;

use crate::age::{AgeRule, Clock, SystemClock};
use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User, UserDto};
use crate::patch::{UserPatch, apply_patch};
use crate::repository::UserRepository;
use crate::validation::validate_user;

/// Service layer for User business logic
pub struct UserService<R: UserRepository, C: Clock = SystemClock> {
    repository: Arc<R>,
    rule: AgeRule,
    clock: C,
}

impl<R: UserRepository> UserService<R> {
    /// Service reading "today" from the host clock
    pub fn new(repository: R, rule: AgeRule) -> Self {
        Self::with_clock(repository, rule, SystemClock)
    }
}

impl<R: UserRepository, C: Clock> UserService<R, C> {
    pub fn with_clock(repository: R, rule: AgeRule, clock: C) -> Self {
        Self {
            repository: Arc::new(repository),
            rule,
            clock,
        }
    }

    pub fn allowed_age(&self) -> u32 {
        self.rule.allowed_age
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Users born within `[start, end]`, ordered by id
    pub async fn users_by_birth_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> UserResult<Vec<User>> {
        if start > end {
            return Err(UserError::InvalidRange);
        }

        self.repository.find_by_birth_date_range(start, end).await
    }

    /// Create a new user. Any client-supplied id is ignored.
    pub async fn create_user(&self, input: UserDto) -> UserResult<User> {
        let new_user = self.checked(input)?;
        self.repository.create(new_user).await
    }

    /// Replace every field of an existing user
    pub async fn update_user(&self, id: i64, input: UserDto) -> UserResult<User> {
        let new_user = self.checked(input)?;
        self.repository.replace(id, new_user).await
    }

    /// Apply a partial update atomically
    pub async fn patch_user(&self, id: i64, patch: UserPatch) -> UserResult<User> {
        let rule = self.rule;
        let today = self.clock.today();

        tracing::debug!(user_id = id, fields = ?patch.fields(), "Patching user");

        self.repository
            .modify(
                id,
                Box::new(move |user| apply_patch(user, patch, &rule, today)),
            )
            .await
    }

    /// Delete a user. Deleting an absent id is not an error.
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            tracing::debug!(user_id = id, "Delete requested for absent user");
        }

        Ok(())
    }

    // Field validation first, so every violation is reported before the age rule runs.
    fn checked(&self, input: UserDto) -> UserResult<NewUser> {
        let today = self.clock.today();

        validate_user(&input, today)?;
        let new_user = NewUser::try_from(input)?;
        self.rule.check(new_user.birth_date, today)?;

        Ok(new_user)
    }
}
