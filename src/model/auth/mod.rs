mod request;
mod token;

pub use request::{LoginRequest, SignupRequest};
pub use token::{AuthRejection, AuthToken, AUTH_TOKEN_COOKIE};

use crate::model::user::Role;

/// Which roles may use an endpoint. Implemented by marker types so the
/// required rights are part of the [`AuthToken`] guard's type.
pub trait Rights: Send + Sync + 'static {
    /// Who may use the endpoint, with an article, for rejection messages.
    const NAME: &'static str;

    fn permits(role: Role) -> bool;
}

/// Any signed-in user.
pub struct SignedIn;

/// Voters only.
pub struct VoterOnly;

/// Admins only.
pub struct AdminOnly;

impl Rights for SignedIn {
    const NAME: &'static str = "a signed-in user";

    fn permits(_role: Role) -> bool {
        true
    }
}

impl Rights for VoterOnly {
    const NAME: &'static str = "a voter";

    fn permits(role: Role) -> bool {
        role == Role::Voter
    }
}

impl Rights for AdminOnly {
    const NAME: &'static str = "an admin";

    fn permits(role: Role) -> bool {
        role == Role::Admin
    }
}
