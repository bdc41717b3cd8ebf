//! Partial updates.
//!
//! A patch is a flat JSON object of field name to value. Only `birthDate`
//! is checked again; every other field is copied as given.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::ToSchema;

use crate::age::AgeRule;
use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::validation::parse_iso_date;

pub const BIRTH_DATE_FORMAT: &str = "Birth date must be formatted as YYYY-MM-DD";

/// One optional slot per settable field.
///
/// Unknown keys (including `id`) are ignored. `null` leaves a required field
/// alone but clears `address` and `phoneNumber`. Text slots also accept
/// JSON numbers, which are kept as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, deserialize_with = "text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub last_name: Option<String>,
    /// Parsed as YYYY-MM-DD when applied
    #[serde(default, deserialize_with = "text")]
    #[schema(example = "2000-01-01")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "nullable_text")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_text")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
}

impl UserPatch {
    /// Names of the fields this patch sets, for logs and audit records
    pub fn fields(&self) -> Vec<&'static str> {
        [
            ("email", self.email.is_some()),
            ("firstName", self.first_name.is_some()),
            ("lastName", self.last_name.is_some()),
            ("birthDate", self.birth_date.is_some()),
            ("address", self.address.is_some()),
            ("phoneNumber", self.phone_number.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// Applies `patch` onto `user`.
///
/// On error `user` is left exactly as it was.
pub fn apply_patch(
    user: &mut User,
    patch: UserPatch,
    rule: &AgeRule,
    today: NaiveDate,
) -> UserResult<()> {
    let birth_date = match patch.birth_date.as_deref() {
        Some(raw) => {
            let parsed = parse_iso_date(raw)
                .ok_or_else(|| UserError::Validation(vec![BIRTH_DATE_FORMAT.to_string()]))?;
            rule.check(parsed, today)?;
            Some(parsed)
        }
        None => None,
    };

    if let Some(birth_date) = birth_date {
        user.birth_date = birth_date;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    if let Some(first_name) = patch.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        user.last_name = last_name;
    }
    if let Some(address) = patch.address {
        user.address = address;
    }
    if let Some(phone_number) = patch.phone_number {
        user.phone_number = phone_number;
    }

    Ok(())
}

fn scalar_to_text<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(E::custom(format!(
            "expected a string or a number, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    scalar_to_text(Value::deserialize(deserializer)?)
}

/// Present keys map to `Some`, so an explicit `null` becomes `Some(None)`
fn nullable_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error> {
    scalar_to_text(Value::deserialize(deserializer)?).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn user() -> User {
        User {
            id: 1,
            email: "a@b.com".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            address: Some("Main st. 1".into()),
            phone_number: Some("1234567890".into()),
        }
    }

    fn patch(value: Value) -> UserPatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_field_changes_only_that_field() {
        let mut target = user();
        apply_patch(&mut target, patch(json!({"lastName": "Z"})), &AgeRule::new(18), today())
            .unwrap();

        assert_eq!(target, User { last_name: "Z".into(), ..user() });
    }

    #[test]
    fn test_unknown_keys_and_id_are_ignored() {
        let parsed = patch(json!({"nickname": "x", "id": 42}));
        assert!(parsed.is_empty());

        let mut target = user();
        apply_patch(&mut target, parsed, &AgeRule::new(18), today()).unwrap();
        assert_eq!(target, user());
    }

    #[test]
    fn test_null_clears_optional_fields_only() {
        let parsed = patch(json!({"address": null, "email": null}));
        assert_eq!(parsed.address, Some(None));
        assert_eq!(parsed.email, None);

        let mut target = user();
        apply_patch(&mut target, parsed, &AgeRule::new(18), today()).unwrap();
        assert_eq!(target.address, None);
        assert_eq!(target.email, "a@b.com");
    }

    #[test]
    fn test_numbers_are_accepted_as_text() {
        let parsed = patch(json!({"phoneNumber": 5551234567_u64}));
        assert_eq!(parsed.phone_number, Some(Some("5551234567".into())));
    }

    #[test]
    fn test_other_json_types_are_rejected() {
        let result: Result<UserPatch, _> = serde_json::from_value(json!({"firstName": true}));
        assert!(result.is_err());

        let result: Result<UserPatch, _> = serde_json::from_value(json!({"address": ["x"]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_fields_are_not_validated_except_birth_date() {
        let mut target = user();
        apply_patch(
            &mut target,
            patch(json!({"email": "not-an-email", "phoneNumber": "12"})),
            &AgeRule::new(18),
            today(),
        )
        .unwrap();

        assert_eq!(target.email, "not-an-email");
        assert_eq!(target.phone_number.as_deref(), Some("12"));
    }

    #[test]
    fn test_birth_date_is_parsed() {
        let mut target = user();
        apply_patch(
            &mut target,
            patch(json!({"birthDate": "1990-05-17"})),
            &AgeRule::new(18),
            today(),
        )
        .unwrap();

        assert_eq!(target.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());
    }

    #[test]
    fn test_malformed_birth_date_leaves_user_untouched() {
        for raw in ["17.05.1990", "2000-1-1", " 2000-01-01", "+2000-01-01", "2000-01-01T00:00"] {
            let mut target = user();
            let err = apply_patch(
                &mut target,
                patch(json!({"birthDate": raw, "lastName": "Z"})),
                &AgeRule::new(18),
                today(),
            )
            .unwrap_err();

            assert!(
                matches!(err, UserError::Validation(ref m) if m[0] == BIRTH_DATE_FORMAT),
                "{raw:?}"
            );
            assert_eq!(target, user(), "{raw:?}");
        }
    }

    #[test]
    fn test_under_age_birth_date_leaves_user_untouched() {
        let mut target = user();
        let err = apply_patch(
            &mut target,
            patch(json!({"birthDate": "2010-01-01", "firstName": "Kid"})),
            &AgeRule::new(18),
            today(),
        )
        .unwrap_err();

        assert!(matches!(err, UserError::UnderAge { allowed_age: 18 }));
        assert_eq!(target, user());
    }

    #[test]
    fn test_fields_lists_present_slots() {
        let parsed = patch(json!({"lastName": "Z", "address": null}));
        assert_eq!(parsed.fields(), vec!["lastName", "address"]);
    }
}
