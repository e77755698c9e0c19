use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub const MIN_DESCRIPTION_LEN: usize = 10;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_NAME_LEN: usize = 255;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{3,50}$").unwrap();
    static ref NPSN_RE: Regex = Regex::new(r"^[0-9]{8}$").unwrap();
    static ref NISN_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// School identifier: exactly eight digits.
pub fn is_valid_npsn(npsn: &str) -> bool {
    NPSN_RE.is_match(npsn)
}

/// Student identifier: exactly ten digits.
pub fn is_valid_nisn(nisn: &str) -> bool {
    NISN_RE.is_match(nisn)
}

pub fn npsn(value: &str) -> Result<(), AppError> {
    if is_valid_npsn(value) {
        Ok(())
    } else {
        Err(AppError::validation("NPSN must be exactly 8 digits"))
    }
}

pub fn nisn(value: &str) -> Result<(), AppError> {
    if is_valid_nisn(value) {
        Ok(())
    } else {
        Err(AppError::validation("NISN must be exactly 10 digits"))
    }
}

pub fn issue_description(value: &str) -> Result<(), AppError> {
    if value.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(AppError::validation(format!(
            "Issue description must be at least {} characters",
            MIN_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

/// Non-empty after trimming and at most [`MAX_NAME_LEN`] characters.
pub fn required_text(field: &str, value: &str) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), AppError> {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(AppError::validation("Invalid email"))
    }
}

pub fn username(value: &str) -> Result<(), AppError> {
    if is_valid_username(value) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Username must be 3-50 characters of letters, digits or underscore",
        ))
    }
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("Password too short"));
    }
    Ok(())
}

/// Treats a blank optional string as absent.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let t = v.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}
