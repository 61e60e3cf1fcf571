mod admin;

pub use admin::{AdminAccount, AdminCredentials, MIN_PASSWORD_LENGTH};

use std::fmt::Display;

use hmac::{Hmac, Mac};
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Error, Result};
use crate::model::common::election::{ElectionId, UserId};

/// Length in bytes of a wallet address.
pub const WALLET_ADDRESS_LENGTH: usize = 20;

/// What a signed-in user may do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Voter,
    Admin,
    Observer,
}

impl Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Voter => "voter",
                Self::Admin => "admin",
                Self::Observer => "observer",
            }
        )
    }
}

/// A signed-in person's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// Elections this user has voted in, oldest first.
    pub voted_elections: Vec<ElectionId>,
}

impl User {
    pub fn has_voted(&self, election_id: &str) -> bool {
        self.voted_elections.iter().any(|e| e == election_id)
    }
}

/// Response to a wallet connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConnection {
    pub wallet_address: String,
}

/// Trim and lowercase an email address, rejecting anything that is obviously not one.
pub fn normalise_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::BadRequest(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

/// Derive a display name from an email address: the local part, with the
/// first `.` turned into a space and each word capitalised.
/// `john.smith@company.com` becomes `John Smith`.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let spaced = local.replacen('.', " ", 1);
    let mut name = String::with_capacity(spaced.len());
    let mut word_start = true;
    for c in spaced.chars() {
        if word_start && c.is_alphanumeric() {
            name.extend(c.to_uppercase());
        } else {
            name.push(c);
        }
        word_start = !(c.is_alphanumeric() || c == '_');
    }
    name
}

/// Generate a fresh wallet address: `0x` + 40 hex digits.
pub fn random_wallet_address(rng: &mut (impl RngCore + CryptoRng)) -> String {
    let mut bytes = [0_u8; WALLET_ADDRESS_LENGTH];
    rng.fill(&mut bytes);
    format!("0x{}", data_encoding::HEXLOWER.encode(&bytes))
}

/// A keyed hash of a voter's email address. The ledger records this instead of
/// the email itself, so it can enforce one vote per voter per election without
/// storing who voted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoterKey([u8; 32]);

impl VoterKey {
    /// `email` must already be normalised.
    pub fn derive(email: &str, secret: &[u8]) -> Self {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC can take key of any size");
        mac.update(email.as_bytes());
        Self(mac.finalize().into_bytes().into())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(display_name_from_email("john.smith@company.com"), "John Smith");
        assert_eq!(display_name_from_email("alice@example.org"), "Alice");
        assert_eq!(display_name_from_email("a.b.c@example.org"), "A B.C");
        assert_eq!(display_name_from_email("mary-jane@example.org"), "Mary-Jane");
    }

    #[test]
    fn email_normalisation() {
        assert_eq!(
            normalise_email("  John.Smith@Company.com ").unwrap(),
            "john.smith@company.com"
        );
        assert!(normalise_email("").is_err());
        assert!(normalise_email("no-at-sign").is_err());
        assert!(normalise_email("@example.org").is_err());
        assert!(normalise_email("someone@").is_err());
    }

    #[test]
    fn voter_keys() {
        let a = VoterKey::derive("jane.doe@example.org", b"secret");
        assert_eq!(a, VoterKey::derive("jane.doe@example.org", b"secret"));
        assert_ne!(a, VoterKey::derive("john.doe@example.org", b"secret"));
        assert_ne!(a, VoterKey::derive("jane.doe@example.org", b"other secret"));
    }

    #[test]
    fn wallet_addresses() {
        let address = random_wallet_address(&mut rand::thread_rng());
        assert_eq!(address.len(), 2 + 2 * WALLET_ADDRESS_LENGTH);
        assert!(address.starts_with("0x"));
        assert!(address[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn voted() {
        let user = User::example();
        assert!(user.has_voted("e3"));
        assert!(!user.has_voted("e1"));
    }
}
