//! Holder identity extraction.
//!
//! Authentication is handled upstream; the gateway forwards the verified
//! user id in the `X-User-Id` header. Requests without it are guest
//! requests, identified by the contact email they carry.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use ridehub_core::error::AppError;
use ridehub_core::types::Holder;

use crate::error::ApiError;

/// Header carrying the upstream-verified user id.
const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user id, when the gateway forwarded one.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

impl MaybeUser {
    /// Resolve the holder identity from the header or a guest email.
    ///
    /// The authenticated id wins when both are present.
    pub fn resolve(&self, guest_email: Option<&str>) -> Result<Holder, AppError> {
        match (self.0, guest_email) {
            (Some(user_id), _) => Ok(Holder::authenticated(user_id)),
            (None, Some(email)) if !email.trim().is_empty() => Ok(Holder::guest(email)),
            _ => Err(AppError::validation(
                "A user id header or a contact email is required",
            )),
        }
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(USER_ID_HEADER) {
            None => Ok(Self(None)),
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| ApiError(AppError::validation("Malformed X-User-Id header")))?;
                let user_id = Uuid::parse_str(raw).map_err(|_| {
                    ApiError(AppError::validation("X-User-Id is not a valid UUID"))
                })?;
                Ok(Self(Some(user_id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_id_wins_over_guest_email() {
        let user_id = Uuid::new_v4();
        let holder = MaybeUser(Some(user_id))
            .resolve(Some("x@example.com"))
            .expect("resolve");
        assert_eq!(holder, Holder::authenticated(user_id));
    }

    #[test]
    fn guest_email_used_without_header() {
        let holder = MaybeUser(None)
            .resolve(Some("x@example.com"))
            .expect("resolve");
        assert_eq!(holder.key(), "guest:x@example.com");
    }

    #[test]
    fn neither_identity_is_an_error() {
        assert!(MaybeUser(None).resolve(None).is_err());
        assert!(MaybeUser(None).resolve(Some("  ")).is_err());
    }
}
