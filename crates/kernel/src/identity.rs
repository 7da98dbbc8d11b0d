//! Explicit requesting identity.
//!
//! Authentication itself is an external collaborator; the kernel only ever
//! sees its outcome, passed explicitly into each fetch. Over HTTP the
//! outcome arrives as trusted gateway headers: `x-user-id` carries the
//! authenticated user's id, and `x-authenticated: true` marks a session
//! that is authenticated but carries no user id.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use uuid::Uuid;

/// Outcome of authentication for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Identity {
    /// Whether an authenticated session is present.
    pub authenticated: bool,

    /// The requesting user, when one is identified. May be absent on an
    /// authenticated session (identified but anonymous for likes).
    pub user_id: Option<Uuid>,
}

impl Identity {
    /// No session at all.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// An authenticated session for the given user.
    pub fn user(user_id: Uuid) -> Self {
        Self {
            authenticated: true,
            user_id: Some(user_id),
        }
    }

    /// An authenticated session with no identified user.
    pub fn anonymous() -> Self {
        Self {
            authenticated: true,
            user_id: None,
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());

        if let Some(user_id) = user_id {
            return Ok(Identity::user(user_id));
        }

        let flagged = parts
            .headers
            .get("x-authenticated")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        if flagged {
            Ok(Identity::anonymous())
        } else {
            Ok(Identity::unauthenticated())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        assert!(!Identity::unauthenticated().authenticated);
        assert_eq!(Identity::unauthenticated().user_id, None);

        let id = Uuid::now_v7();
        assert!(Identity::user(id).authenticated);
        assert_eq!(Identity::user(id).user_id, Some(id));

        assert!(Identity::anonymous().authenticated);
        assert_eq!(Identity::anonymous().user_id, None);
    }
}
