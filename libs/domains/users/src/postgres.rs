use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{NewUser, User},
    repository::{UserMutation, UserRepository},
};

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, user: NewUser) -> UserResult<User> {
        let model = entity::ActiveModel::from(user).insert(&self.db).await?;

        tracing::info!(user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn replace(&self, id: i64, user: NewUser) -> UserResult<User> {
        let active_model = entity::ActiveModel::from(user.with_id(id));

        match active_model.update(&self.db).await {
            Ok(model) => {
                tracing::info!(user_id = id, "Replaced user");
                Ok(model.into())
            }
            Err(DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) => Err(UserError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i64) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
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
        let models = entity::Entity::find()
            .filter(entity::Column::BirthDate.between(start, end))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn modify(&self, id: i64, mutation: UserMutation) -> UserResult<User> {
        let txn = self.db.begin().await?;

        // SELECT ... FOR UPDATE holds the row until commit
        let Some(model) = entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            txn.rollback().await?;
            return Err(UserError::NotFound(id));
        };

        let mut user: User = model.into();
        if let Err(e) = mutation(&mut user) {
            txn.rollback().await?;
            return Err(e);
        }
        user.id = id;

        let updated = entity::ActiveModel::from(user).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(user_id = id, "Modified user");
        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i64, last_name: &str) -> entity::Model {
        entity::Model {
            id,
            email: "a@b.com".to_string(),
            first_name: "A".to_string(),
            last_name: last_name.to_string(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            address: None,
            phone_number: Some("1234567890".to_string()),
        }
    }

    fn new_user() -> NewUser {
        NewUser::from(User::from(model(0, "B")))
    }

    #[tokio::test]
    async fn test_get_by_id_maps_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "B")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let user = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.phone_number.as_deref(), Some("1234567890"));
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert_eq!(repo.get_by_id(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_returns_generated_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(7, "B")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let created = repo.create(new_user()).await.unwrap();
        assert_eq!(created.id, 7);
    }

    #[tokio::test]
    async fn test_replace_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.replace(9, new_user()).await;
        assert!(matches!(result, Err(UserError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_range_maps_every_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "B"), model(3, "C")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let users = repo
            .find_by_birth_date_range(
                NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            )
            .await
            .unwrap();

        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_modify_updates_locked_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "B")], vec![model(1, "Z")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let updated = repo
            .modify(
                1,
                Box::new(|u| {
                    u.last_name = "Z".to_string();
                    Ok(())
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.last_name, "Z");
    }

    #[tokio::test]
    async fn test_modify_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.modify(4, Box::new(|_| Ok(()))).await;
        assert!(matches!(result, Err(UserError::NotFound(4))));
    }

    #[tokio::test]
    async fn test_modify_propagates_mutation_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "B")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo
            .modify(1, Box::new(|_| Err(UserError::UnderAge { allowed_age: 18 })))
            .await;
        assert!(matches!(result, Err(UserError::UnderAge { allowed_age: 18 })));
    }
}
