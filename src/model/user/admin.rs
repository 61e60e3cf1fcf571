use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// An admin account. Only the password hash is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub username: String,
    pub password_hash: String,
}

impl AdminAccount {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        // A malformed hash can only come from outside `TryFrom<AdminCredentials>`; treat it as a mismatch.
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// Raw admin credentials, received from a user. These are never stored directly,
/// since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl TryFrom<AdminCredentials> for AdminAccount {
    type Error = Error;

    /// Convert [`AdminCredentials`] to a new [`AdminAccount`] by hashing the password.
    /// This enforces that the username is non-empty, and the password meets minimum length.
    fn try_from(cred: AdminCredentials) -> Result<Self> {
        let username = cred.username.trim();
        if username.is_empty() || username.contains('@') {
            return Err(Error::BadRequest(
                "Admin username must be non-empty and contain no '@'".to_string(),
            ));
        }
        if cred.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::BadRequest(format!(
                "Admin password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &Config::default())?;
        Ok(Self {
            username: username.to_lowercase(),
            password_hash,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let admin = AdminAccount::try_from(AdminCredentials::example()).unwrap();
        assert_eq!(admin.username, "returning-officer");
        assert_ne!(admin.password_hash, AdminCredentials::example().password);
        assert!(admin.verify_password("ballotbox42"));
        assert!(!admin.verify_password("ballotbox43"));
        assert!(!admin.verify_password(""));
    }

    #[test]
    fn rejects_weak_credentials() {
        assert!(AdminAccount::try_from(AdminCredentials::empty()).is_err());

        let mut short = AdminCredentials::example();
        short.password = "short".into();
        assert!(AdminAccount::try_from(short).is_err());

        let mut email_like = AdminCredentials::example();
        email_like.username = "officer@example.org".into();
        assert!(AdminAccount::try_from(email_like).is_err());
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let admin = AdminAccount {
            username: "broken".into(),
            password_hash: "not a hash".into(),
        };
        assert!(!admin.verify_password("anything"));
    }
}
