use std::fmt::{Display, Formatter};

use rocket::FromFormField;
use serde::{Deserialize, Serialize};

/// States in the Election lifecycle.
///
/// Variants are declared in lifecycle order, so `a < b` means `b` comes later.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    FromFormField,
)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Under construction, only visible to admins.
    #[field(value = "draft")]
    Draft,
    /// Published, but not yet accepting votes.
    #[field(value = "upcoming")]
    Upcoming,
    /// Accepting votes.
    #[field(value = "active")]
    Active,
    /// Finished. Results are final.
    #[field(value = "closed")]
    Closed,
}

impl ElectionStatus {
    pub const ALL: [ElectionStatus; 4] = [Self::Draft, Self::Upcoming, Self::Active, Self::Closed];

    /// Status only ever moves forward, though stages may be skipped.
    pub fn can_advance_to(self, next: ElectionStatus) -> bool {
        next > self
    }

    /// Whether non-admins may see elections in this state.
    pub fn is_public(self) -> bool {
        self != Self::Draft
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
