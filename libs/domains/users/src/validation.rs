//! Field rules for [`UserDto`].
//!
//! Static rules are declared with `validator` attributes on the DTO. The
//! birth date rule needs the current date, so [`validate_user`] adds it to
//! the same error set by hand before flattening everything into messages.

use chrono::NaiveDate;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::error::{UserError, UserResult};
use crate::models::UserDto;

pub const EMAIL_BLANK: &str = "Email may not be blank";
pub const EMAIL_FORMAT: &str = "Wrong email format";
pub const BIRTH_DATE_NULL: &str = "Birth date may not be null";
pub const BIRTH_DATE_PAST: &str = "Birth date should be in past";

/// Empty, or exactly ten ASCII digits
pub static PHONE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]{10})?$").expect("phone number pattern is valid"));

/// Order in which messages are reported. Keys may arrive camelCased.
const FIELD_ORDER: [&str; 5] = ["email", "first_name", "last_name", "birth_date", "phone_number"];

/// Parses exactly `YYYY-MM-DD`.
///
/// chrono alone also takes single-digit fields, a leading sign or leading
/// whitespace; the round trip through `format` rules those out.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    (parsed.format("%Y-%m-%d").to_string() == raw).then_some(parsed)
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Blank and malformed are distinct failures with distinct messages.
pub fn validate_email_field(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("blank", EMAIL_BLANK));
    }
    if !value.validate_email() {
        return Err(error_with_message("email", EMAIL_FORMAT));
    }
    Ok(())
}

/// Checks every field rule of `dto`, with `today` as the reference date.
///
/// All violations are reported at once, never just the first.
pub fn validate_user(dto: &UserDto, today: NaiveDate) -> UserResult<()> {
    let mut errors = dto.validate().err().unwrap_or_else(ValidationErrors::new);

    match dto.birth_date {
        None => errors.add("birth_date", error_with_message("required", BIRTH_DATE_NULL)),
        Some(date) if date >= today => {
            errors.add("birth_date", error_with_message("past", BIRTH_DATE_PAST))
        }
        Some(_) => {}
    }

    if errors.is_empty() {
        return Ok(());
    }

    Err(UserError::Validation(flatten_messages(&errors)))
}

fn field_rank(field: &str) -> usize {
    FIELD_ORDER
        .iter()
        .position(|name| name.replace('_', "").eq_ignore_ascii_case(&field.replace('_', "")))
        .unwrap_or(FIELD_ORDER.len())
}

fn flatten_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| (field_rank(field), field.to_string()));

    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .map(|err| match &err.message {
            Some(message) => message.to_string(),
            None => err.code.to_string(),
        })
        .collect()
}
