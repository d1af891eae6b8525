//! Admin authorization.
//!
//! A request is either authorized or not: admin routes take an
//! [`AdminSession`] extractor, which only succeeds when the request carries
//! `Authorization: Bearer <token>` matching the configured admin token.

use crate::{AppState, errors::AppError};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use sha2::{Digest, Sha256};

/// Digest of the configured admin token. `None` locks every admin route.
#[derive(Clone, Debug, Default)]
pub struct AdminAuth {
    token_digest: Option<[u8; 32]>,
}

impl AdminAuth {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token_digest: token
                .filter(|t| !t.is_empty())
                .map(|t| Sha256::digest(t.as_bytes()).into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token_digest.is_some()
    }

    /// Compare digests so the check does not depend on where the strings differ.
    fn accepts(&self, presented: &str) -> bool {
        match &self.token_digest {
            Some(expected) => {
                let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
                presented
                    .iter()
                    .zip(expected.iter())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
            }
            None => false,
        }
    }
}

/// Proof that the caller is the site admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match token {
            Some(token) if state.admin.accepts(token) => Ok(AdminSession),
            _ => {
                tracing::debug!(path = %parts.uri.path(), "rejected unauthorized admin request");
                Err(AppError::unauthorized())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_the_configured_token() {
        let auth = AdminAuth::new(Some("s3cret"));
        assert!(auth.accepts("s3cret"));
        assert!(!auth.accepts("s3cret "));
        assert!(!auth.accepts(""));
    }

    #[test]
    fn unconfigured_auth_rejects_everything() {
        let auth = AdminAuth::new(None);
        assert!(!auth.is_configured());
        assert!(!auth.accepts(""));
        assert!(!AdminAuth::new(Some("")).is_configured());
    }
}
