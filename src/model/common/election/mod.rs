mod status;

pub use status::ElectionStatus;

/// Our election IDs are strings of the form `e<n>`.
pub type ElectionId = String;
/// Candidate IDs are strings, unique within their election.
pub type CandidateId = String;
/// Our vote IDs are strings of the form `v<n>`.
pub type VoteId = String;
/// Our user IDs are strings of the form `u<n>`.
pub type UserId = String;
