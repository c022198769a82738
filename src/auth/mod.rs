//! Authentication — credential verification and JWT issue/validate.

pub mod credentials;
pub mod token;

/// The identity a caller proved ownership of. Built from the credential
/// store on login and from the `sub` claim on token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
