//! Holder identity for seat locks and bookings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The party holding (or attempting to hold) seats.
///
/// Authenticated customers are identified by their user id; guests by a
/// deterministic key derived from their contact email. The derived key is
/// what the lock store compares on every extend/release/promote, so the
/// derivation must be stable across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Holder {
    /// An authenticated user, identified by the upstream gateway.
    Authenticated {
        /// The user's id.
        user_id: Uuid,
    },
    /// A guest, identified by contact email.
    Guest {
        /// The guest's contact email (as provided).
        email: String,
    },
}

impl Holder {
    /// Build a holder for an authenticated user.
    pub fn authenticated(user_id: Uuid) -> Self {
        Self::Authenticated { user_id }
    }

    /// Build a guest holder from a contact email.
    pub fn guest(email: impl Into<String>) -> Self {
        Self::Guest {
            email: email.into(),
        }
    }

    /// The user id, if this holder is authenticated.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Authenticated { user_id } => Some(*user_id),
            Self::Guest { .. } => None,
        }
    }

    /// Derive the stable ownership key used by the seat lock store.
    ///
    /// Guest emails are trimmed and lowercased so that the same contact
    /// address always produces the same key.
    pub fn key(&self) -> String {
        match self {
            Self::Authenticated { user_id } => format!("user:{user_id}"),
            Self::Guest { email } => format!("guest:{}", email.trim().to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_key_is_normalized() {
        let a = Holder::guest("  Jane.Doe@Example.COM ");
        let b = Holder::guest("jane.doe@example.com");
        assert_eq!(a.key(), b.key());
        assert_eq!(b.key(), "guest:jane.doe@example.com");
    }

    #[test]
    fn authenticated_key_embeds_user_id() {
        let id = Uuid::new_v4();
        let holder = Holder::authenticated(id);
        assert_eq!(holder.key(), format!("user:{id}"));
        assert_eq!(holder.user_id(), Some(id));
    }

    #[test]
    fn distinct_holders_have_distinct_keys() {
        let guest = Holder::guest("rider@example.com");
        let user = Holder::authenticated(Uuid::new_v4());
        assert_ne!(guest.key(), user.key());
    }
}
