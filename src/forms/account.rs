//! Registration, profile and password-change forms.

#[cfg(test)]
#[path = "account_test.rs"]
mod account_test;

use crate::error::ApiError;
use crate::types::{RegisterRequest, UserUpdate};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub username: String,
    pub full_name: String,
}

impl RegistrationForm {
    /// Check required fields and build the request. Blank optional fields
    /// are omitted.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with the first failing rule's message.
    pub fn validate(&self) -> Result<RegisterRequest, ApiError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() || self.confirm_password.is_empty() {
            return Err(ApiError::validation("Please fill in all required fields"));
        }
        if self.password != self.confirm_password {
            return Err(ApiError::validation("Passwords do not match"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation("Password must be at least 8 characters long"));
        }
        Ok(RegisterRequest {
            email: email.to_owned(),
            password: self.password.clone(),
            username: non_blank(&self.username),
            full_name: non_blank(&self.full_name),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
}

impl ProfileForm {
    #[must_use]
    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            username: non_blank(&self.username),
            full_name: non_blank(&self.full_name),
            email: non_blank(&self.email),
            ..UserUpdate::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordChangeForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChangeForm {
    /// # Errors
    ///
    /// Returns `Validation` with the first failing rule's message.
    pub fn validate(&self) -> Result<UserUpdate, ApiError> {
        if self.current_password.is_empty() || self.new_password.is_empty() {
            return Err(ApiError::validation("Please fill in all password fields"));
        }
        if self.new_password != self.confirm_password {
            return Err(ApiError::validation("New passwords do not match"));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation("Password must be at least 8 characters long"));
        }
        Ok(UserUpdate::password_change(self.current_password.clone(), self.new_password.clone()))
    }

    /// Blank all fields after a successful change.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
