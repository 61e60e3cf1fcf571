use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::user::{normalise_email, Role};

/// Sign-in form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Voter
}

impl LoginRequest {
    /// Check the form is filled in, returning the normalised email.
    pub fn validate(&self) -> Result<String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(Error::BadRequest(
                "Please fill in all fields".to_string(),
            ));
        }
        normalise_email(&self.email)
    }

    /// The admin username this sign-in refers to: the local part of the email.
    pub fn admin_username(&self) -> &str {
        let email = self.email.trim();
        email.split('@').next().unwrap_or(email)
    }
}

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupRequest {
    /// Check the form is filled in and the passwords agree, returning the normalised email.
    pub fn validate(&self) -> Result<String> {
        if self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(Error::BadRequest(
                "Please fill in all fields".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(Error::BadRequest("Passwords do not match".to_string()));
        }
        normalise_email(&self.email)
    }
}
