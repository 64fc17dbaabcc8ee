use crate::models::user::{User, UserRole};

/// Authorization predicate for every mutation entry point. Only an
/// admin is admitted; a contributor or an absent user is denied and the
/// caller must treat the request as a complete no-op.
///
/// The role is self-declared at login and persisted client-side; a real
/// deployment needs a server-verified credential here, not this field.
pub fn can_mutate(user: Option<&User>) -> bool {
    matches!(user, Some(user) if user.role == UserRole::Admin)
}
