use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use data_encoding::HEXLOWER_PERMISSIVE;
use rand::{CryptoRng, Rng, RngCore};
use rocket::request::FromParam;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Length in bytes of a transaction hash.
pub const HASH_LENGTH: usize = 32;
/// Length in bytes of the per-vote nonce.
pub const NONCE_LENGTH: usize = 32;

/// A transaction hash: `0x` followed by 64 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionHash([u8; HASH_LENGTH]);

impl TransactionHash {
    /// Hash the contents of a vote together with its nonce.
    pub fn compute(
        election_id: &str,
        candidate_id: &str,
        timestamp: DateTime<Utc>,
        block_number: u64,
        nonce: &Nonce,
    ) -> Self {
        let mut hasher = Sha256::new();
        // Length-prefix the variable-width fields so boundaries are unambiguous.
        for field in [election_id, candidate_id] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(timestamp.timestamp_millis().to_le_bytes());
        hasher.update(block_number.to_le_bytes());
        hasher.update(nonce.0);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl Display for TransactionHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", data_encoding::HEXLOWER.encode(&self.0))
    }
}

impl FromStr for TransactionHash {
    type Err = Error;

    /// Accepts `0x` plus 64 hex digits in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed =
            || Error::BadRequest(format!("'{s}' is not a transaction hash (0x + 64 hex digits)"));
        let digits = s.strip_prefix("0x").ok_or_else(malformed)?;
        if digits.len() != 2 * HASH_LENGTH {
            return Err(malformed());
        }
        let bytes = HEXLOWER_PERMISSIVE
            .decode(digits.as_bytes())
            .map_err(|_| malformed())?;
        let bytes = <[u8; HASH_LENGTH]>::try_from(bytes).map_err(|_| malformed())?;
        Ok(Self(bytes))
    }
}

impl Serialize for TransactionHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl<'a> FromParam<'a> for TransactionHash {
    type Error = Error;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

/// Random value mixed into a vote's hash, handed to the voter on their receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LENGTH]);

impl Nonce {
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        let mut bytes = [0_u8; NONCE_LENGTH];
        rng.fill(&mut bytes);
        Self(bytes)
    }
}

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&data_encoding::HEXLOWER.encode(&self.0))
    }
}

impl FromStr for Nonce {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::BadRequest(format!("'{s}' is not a vote nonce (64 hex digits)"));
        let bytes = HEXLOWER_PERMISSIVE
            .decode(s.as_bytes())
            .map_err(|_| malformed())?;
        let bytes = <[u8; NONCE_LENGTH]>::try_from(bytes).map_err(|_| malformed())?;
        Ok(Self(bytes))
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn is_canonical(hash: &str) -> bool {
        hash.len() == 66
            && hash.starts_with("0x")
            && hash[2..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn compute_is_deterministic() {
        let nonce = Nonce::random(&mut rand::thread_rng());
        let when = Utc.with_ymd_and_hms(2024, 7, 10, 14, 32, 0).unwrap();
        let a = TransactionHash::compute("e3", "p1", when, 18245678, &nonce);
        let b = TransactionHash::compute("e3", "p1", when, 18245678, &nonce);
        assert_eq!(a, b);
        assert!(is_canonical(&a.to_string()));

        // Any change to the inputs changes the hash.
        assert_ne!(a, TransactionHash::compute("e3", "p2", when, 18245678, &nonce));
        assert_ne!(a, TransactionHash::compute("e3", "p1", when, 18245679, &nonce));
        let other_nonce = Nonce::random(&mut rand::thread_rng());
        assert_ne!(a, TransactionHash::compute("e3", "p1", when, 18245678, &other_nonce));
        // Field boundaries matter.
        assert_ne!(
            TransactionHash::compute("e1", "1c", when, 1, &nonce),
            TransactionHash::compute("e11", "c", when, 1, &nonce)
        );
    }

    #[test]
    fn parse() {
        let lower = "0x8f7d3b2e1a4c5f6d9e0a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e";
        let hash: TransactionHash = lower.parse().unwrap();
        assert_eq!(hash.to_string(), lower);

        // Uppercase is accepted and normalised.
        let upper = format!("0x{}", lower[2..].to_uppercase());
        assert_eq!(upper.parse::<TransactionHash>().unwrap(), hash);

        // Malformed inputs.
        assert!("".parse::<TransactionHash>().is_err());
        assert!(lower[2..].parse::<TransactionHash>().is_err());
        assert!(format!("{lower}3f4").parse::<TransactionHash>().is_err());
        assert!(lower[..65].parse::<TransactionHash>().is_err());
        assert!(lower.replace('f', "g").parse::<TransactionHash>().is_err());
    }

    #[test]
    fn nonce_text_form() {
        let nonce = Nonce::random(&mut rand::thread_rng());
        let text = nonce.to_string();
        assert_eq!(text.len(), 2 * NONCE_LENGTH);
        assert_eq!(text.parse::<Nonce>().unwrap(), nonce);
        assert!("abc".parse::<Nonce>().is_err());
    }
}
