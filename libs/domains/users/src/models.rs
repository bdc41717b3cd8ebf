use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::validation::{
    PHONE_NUMBER_RE, parse_iso_date, validate_email_field, validate_not_blank,
};

/// A stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "a@b.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "2000-01-01")]
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    #[schema(example = "1234567890")]
    pub phone_number: Option<String>,
}

/// Request body for create and full update.
///
/// Missing or `null` text fields deserialize as empty strings so they are
/// reported by validation instead of failing to parse. `id` is accepted and
/// ignored; the path or the store decides it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(default, skip_serializing)]
    #[schema(read_only)]
    pub id: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "validate_email_field"))]
    #[schema(example = "a@b.com")]
    pub email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "validate_not_blank", message = "First name may not be blank"))]
    pub first_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "validate_not_blank", message = "Last name may not be blank"))]
    pub last_name: String,

    /// Checked against the current date, see `validation::validate_user`
    #[serde(default, deserialize_with = "optional_iso_date")]
    #[schema(example = "2000-01-01")]
    pub birth_date: Option<NaiveDate>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    #[validate(regex(path = *PHONE_NUMBER_RE, message = "Wrong phone number format"))]
    #[schema(example = "1234567890")]
    pub phone_number: Option<String>,
}

/// A validated record without an id, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl NewUser {
    pub fn with_id(self, id: i64) -> User {
        User {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            address: self.address,
            phone_number: self.phone_number,
        }
    }
}

impl TryFrom<UserDto> for NewUser {
    type Error = UserError;

    fn try_from(dto: UserDto) -> UserResult<Self> {
        let birth_date = dto.birth_date.ok_or_else(|| {
            UserError::Validation(vec![crate::validation::BIRTH_DATE_NULL.to_string()])
        })?;

        Ok(Self {
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            birth_date,
            address: dto.address,
            phone_number: dto.phone_number,
        })
    }
}

impl From<User> for NewUser {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
            address: user.address,
            phone_number: user.phone_number,
        }
    }
}

/// Inclusive birth-date window for `GET /users`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BirthDateRange {
    /// First birth date included (YYYY-MM-DD)
    #[serde(deserialize_with = "iso_date")]
    pub start_date: NaiveDate,
    /// Last birth date included (YYYY-MM-DD)
    #[serde(deserialize_with = "iso_date")]
    pub end_date: NaiveDate,
}

fn strict_date<E: de::Error>(raw: &str) -> Result<NaiveDate, E> {
    parse_iso_date(raw)
        .ok_or_else(|| E::custom(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

fn iso_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    strict_date(&String::deserialize(deserializer)?)
}

fn optional_iso_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|raw| strict_date(&raw))
        .transpose()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
