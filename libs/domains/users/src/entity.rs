use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{NewUser, User};

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Date,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            birth_date: model.birth_date,
            address: model.address,
            phone_number: model.phone_number,
        }
    }
}

/// Insert model; the database assigns the id
impl From<NewUser> for ActiveModel {
    fn from(input: NewUser) -> Self {
        ActiveModel {
            id: NotSet,
            email: Set(input.email),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            birth_date: Set(input.birth_date),
            address: Set(input.address),
            phone_number: Set(input.phone_number),
        }
    }
}

/// Full-row update model for an existing id
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        let id = user.id;
        ActiveModel {
            id: Set(id),
            ..ActiveModel::from(NewUser::from(user))
        }
    }
}
