//! Client-side form checks
//!
//! Everything here runs before any network call is made.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Age must be a non-negative integer, got {0:?}")]
    InvalidAge(String),

    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),
}

/// Validated registration payload, as posted to `/auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("age", &self.age)
            .finish_non_exhaustive()
    }
}

/// Raw registration input, as typed by the user.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        let username = required("username", &self.username)?;
        let email = validate_email(&self.email)?;
        let first_name = required("first name", &self.first_name)?;
        let last_name = required("last name", &self.last_name)?;
        required("password", &self.password)?;

        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }

        let age = parse_age(&self.age)?;

        Ok(Registration {
            username: username.to_string(),
            password: self.password.clone(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
        })
    }
}

/// New password plus its confirmation.
#[derive(Clone, Default)]
pub struct PasswordChange {
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    pub fn new(new_password: impl Into<String>, confirm_password: impl Into<String>) -> Self {
        Self {
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn validate(&self) -> Result<&str, ValidationError> {
        required("new password", &self.new_password)?;
        if self.new_password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(&self.new_password)
    }
}

/// Age as a plain run of ASCII digits. No sign, no whitespace.
pub fn parse_age(raw: &str) -> Result<u32, ValidationError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidAge(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| ValidationError::InvalidAge(raw.to_string()))
}

pub fn validate_email(raw: &str) -> Result<&str, ValidationError> {
    let email = required("email", raw)?;
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(ValidationError::InvalidEmail(raw.to_string())),
    }
}

pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    required("username", username)?;
    required("password", password)?;
    Ok(())
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed)
    }
}
