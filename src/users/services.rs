use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::ApiError,
    users::{
        dto::UserPayload,
        repo_types::{NewUser, EMAIL_MAX_LEN, NAME_MAX_LEN},
    },
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Parses a path id. Only positive integers are accepted.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId(raw.to_string())),
    }
}

/// Shape checks only; uniqueness is left to the store.
pub fn validate_payload(payload: UserPayload) -> Result<NewUser, ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation("name", "must not be empty"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::validation(
            "name",
            format!("must be at most {NAME_MAX_LEN} characters"),
        ));
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::validation("email", "must not be empty"));
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(ApiError::validation(
            "email",
            format!("must be at most {EMAIL_MAX_LEN} characters"),
        ));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email", "is not a valid address"));
    }

    Ok(NewUser {
        name,
        email,
        age: payload.age,
    })
}
