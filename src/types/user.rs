//! Bank customers

use super::epoch_now;
use super::error::LedgerError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact details of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A registered bank customer, keyed by username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: ContactInfo,
    pub user_id: String,
    pub created_at: f64,
}

/// Partial update of a user; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_info: Option<ContactInfoUpdate>,
}

/// Partial update of contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactInfoUpdate {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl User {
    /// Create a user with a fresh id
    ///
    /// # Errors
    ///
    /// `InvalidUser` if the username, first name, last name or email is blank.
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        contact_info: ContactInfo,
    ) -> Result<Self, LedgerError> {
        let user = User {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            contact_info,
            user_id: Uuid::new_v4().to_string(),
            created_at: epoch_now(),
        };
        user.validate()?;
        Ok(user)
    }

    /// Apply a partial update, leaving the user unchanged if the result is invalid
    pub fn apply(&mut self, update: UserUpdate) -> Result<(), LedgerError> {
        let mut updated = self.clone();
        if let Some(first_name) = update.first_name {
            updated.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            updated.last_name = last_name;
        }
        if let Some(contact) = update.contact_info {
            if let Some(email) = contact.email {
                updated.contact_info.email = email;
            }
            if contact.phone.is_some() {
                updated.contact_info.phone = contact.phone;
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if self.username.trim().is_empty()
            || self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
        {
            return Err(LedgerError::invalid_user(
                "Username, first name, and last name cannot be empty.",
            ));
        }
        if self.contact_info.email.trim().is_empty() {
            return Err(LedgerError::invalid_user("Email cannot be empty."));
        }
        Ok(())
    }
}
