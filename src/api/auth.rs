use axum::{
    extract::{FromRef, FromRequestParts},
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
    RequestPartsExt, TypedHeader,
};
use bson::oid::ObjectId;
use tap::TapFallible;

use crate::error::{Error, UnauthorizedType};

use super::{
    token::{decode_token, JwtState},
    users::{UserCollection, UserModel, UserRole},
};

/// Claims-level identity taken straight from the bearer token, before any
/// store lookup.
#[derive(Debug)]
pub struct UserAccess {
    pub id: ObjectId,
    pub name: String,
    pub role: UserRole,
}

impl UserAccess {
    pub fn from_token(jwt_state: &JwtState, token: &str) -> Result<Self, Error> {
        // bad signature, malformed payload and expiry all collapse into the
        // same message so the caller cannot tell which check failed
        let token = decode_token(jwt_state, token)
            .map_err(|_| Error::Unauthorized(UnauthorizedType::InvalidToken))?;

        if token.claims.is_expired() {
            return Err(Error::Unauthorized(UnauthorizedType::InvalidToken));
        }

        Ok(Self {
            id: token.claims.sub.0,
            name: token.claims.name,
            role: token.claims.role,
        })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserAccess
where
    JwtState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(token)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::Unauthorized(UnauthorizedType::MissingToken))?;

        let jwt = JwtState::from_ref(state);

        Self::from_token(&jwt, token.token())
    }
}

/// Identity re-resolved from the users collection on every authenticated
/// request; the stored password hash never leaves this module.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<UserModel> for AuthUser {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

impl AuthUser {
    pub async fn from_id(
        id: ObjectId,
        UserCollection(users): &UserCollection,
    ) -> Result<Self, Error> {
        users
            .find_one_by_id(id)
            .await?
            .map(Into::into)
            .ok_or(Error::Unauthorized(UnauthorizedType::InvalidToken))
            .tap_err(|_| tracing::debug!("token resolved to a deleted user"))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    JwtState: FromRef<S>,
    UserCollection: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let access = parts.extract_with_state::<UserAccess, _>(state).await?;
        let users = UserCollection::from_ref(state);

        Self::from_id(access.id, &users).await
    }
}

/// Role gate over the re-fetched identity. Always takes a set of allowed
/// roles, one or more.
pub fn require_role(user: &AuthUser, allowed: &[UserRole]) -> Result<(), Error> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(Error::Forbidden)
            .tap_err(|_| tracing::debug!(role = ?user.role, "role not in the allowed set"))
    }
}
