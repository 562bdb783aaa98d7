use jsonwebtoken::TokenData;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{error::Error, util::ObjectIdString};

use super::users::{UserModel, UserRole};

#[derive(Clone)]
pub struct JwtState {
    validation: jsonwebtoken::Validation,
    header: jsonwebtoken::Header,

    encoding_key: jsonwebtoken::EncodingKey,
    decoding_key: jsonwebtoken::DecodingKey,
}

impl JwtState {
    pub fn new(secret: &str) -> Self {
        let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);

        // expiry is checked manually against the encoded timestamp so that
        // there is no leeway around the boundary
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            header,
            validation,

            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn new_from_env() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .expect("Cannot retreive JWT_SECRET from environment variable.");

        Self::new(&secret)
    }
}

pub fn current_timestamp() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenClaims {
    pub sub: ObjectIdString,
    pub name: String,
    pub role: UserRole,
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_expired(&self) -> bool {
        self.exp < current_timestamp().unix_timestamp()
    }
}

pub fn issue_token(jwt_state: &JwtState, user: &UserModel) -> Result<String, Error> {
    let exp = current_timestamp() + Duration::hours(1);

    issue_token_with_exp(jwt_state, user, exp.unix_timestamp())
}

pub fn issue_token_with_exp(
    jwt_state: &JwtState,
    user: &UserModel,
    exp: i64,
) -> Result<String, Error> {
    let claims = TokenClaims {
        sub: user.id.into(),
        name: user.name.clone(),
        role: user.role,
        exp,
    };

    jsonwebtoken::encode(&jwt_state.header, &claims, &jwt_state.encoding_key).map_err(Into::into)
}

pub fn decode_token(jwt_state: &JwtState, token: &str) -> Result<TokenData<TokenClaims>, Error> {
    jsonwebtoken::decode(token, &jwt_state.decoding_key, &jwt_state.validation).map_err(Into::into)
}
