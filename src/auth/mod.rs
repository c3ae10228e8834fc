//! Bearer-token identity
//!
//! Verification is behind [`IdentityVerifier`] so a real identity provider can
//! be plugged in. The bundled [`DevIdentityVerifier`] only knows the fixed
//! development token.

use async_trait::async_trait;
use thiserror::Error;

use crate::store::UserProfile;

/// Token accepted by [`DevIdentityVerifier`] in development
pub const MOCK_TOKEN: &str = "mock_token";

/// Verified claims of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub name: String,
}

impl Identity {
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            subject_id: self.subject_id.clone(),
            email: Some(self.email.clone()),
            display_name: Some(self.name.clone()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Invalid authentication scheme")]
    UnsupportedScheme,

    #[error("Authentication failed")]
    InvalidToken,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Extract the token from an `Authorization: Bearer <token>` value
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::MalformedHeader);
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::UnsupportedScheme);
    }
    Ok(token)
}

/// Accepts [`MOCK_TOKEN`] when running in development, nothing otherwise
#[derive(Debug, Clone)]
pub struct DevIdentityVerifier {
    development: bool,
}

impl DevIdentityVerifier {
    pub fn new(development: bool) -> Self {
        Self { development }
    }
}

#[async_trait]
impl IdentityVerifier for DevIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if self.development && token == MOCK_TOKEN {
            return Ok(Identity {
                subject_id: "mock_user_123".to_string(),
                email: "test@example.com".to_string(),
                name: "Test User".to_string(),
            });
        }

        tracing::warn!("rejected bearer token");
        Err(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc"), Ok("abc"));
        assert_eq!(parse_bearer("bearer abc"), Ok("abc"));
        assert_eq!(parse_bearer("Basic abc"), Err(AuthError::UnsupportedScheme));
        assert_eq!(parse_bearer("Bearer"), Err(AuthError::MalformedHeader));
        assert_eq!(parse_bearer("Bearer a b"), Err(AuthError::MalformedHeader));
    }

    #[tokio::test]
    async fn test_mock_token_only_in_development() {
        let identity = DevIdentityVerifier::new(true).verify(MOCK_TOKEN).await.unwrap();
        assert_eq!(identity.subject_id, "mock_user_123");
        assert_eq!(identity.email, "test@example.com");
        assert_eq!(identity.to_profile().display_name.as_deref(), Some("Test User"));

        assert_eq!(
            DevIdentityVerifier::new(false).verify(MOCK_TOKEN).await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            DevIdentityVerifier::new(true).verify("other").await,
            Err(AuthError::InvalidToken)
        );
    }
}
