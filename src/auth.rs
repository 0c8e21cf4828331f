//! Verifies bearer tokens issued by the external identity provider.
//!
//! The application never issues tokens to clients itself: users authenticate
//! against the identity provider, and every API request carries the resulting
//! JWT in an `Authorization: Bearer` header. This module extracts and
//! verifies that token and hands route handlers the owning user's ID.

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};

/// The external identity provider's ID for a user.
///
/// Every persisted row carries this ID and every query is scoped by it.
pub type UserId = String;

/// The contents of a bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserId,
    /// The expiry time of the token.
    pub exp: usize,
    /// The time the token was issued.
    pub iat: usize,
}

/// The authenticated user that made the current request.
///
/// Extracting this type performs the bearer token verification; any route
/// handler that takes it rejects unauthenticated requests with a 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    DecodingKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let decoding_key = DecodingKey::from_ref(state);
        let token_data = decode::<Claims>(bearer.token(), &decoding_key, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser(token_data.claims.sub))
    }
}

/// The reasons a request may fail authentication.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// The request had no `Authorization: Bearer` header.
    MissingToken,
    /// The bearer token could not be verified (bad signature, malformed, or
    /// expired).
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let error_message = match self {
            AuthError::MissingToken => "Unauthorized",
            AuthError::InvalidToken => "Invalid or expired token",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": error_message })),
        )
            .into_response()
    }
}

/// Create a signed bearer token for `user_id` that is valid for `valid_for`.
///
/// In production tokens come from the identity provider; this function backs
/// the `issue_token` dev binary and the test suite.
pub fn issue_token(user_id: &str, jwt_secret: &str, valid_for: Duration) -> String {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id.to_owned(),
        exp: (now + valid_for).unix_timestamp() as usize,
        iat: now.unix_timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .expect("HS256 token encoding does not fail")
}
