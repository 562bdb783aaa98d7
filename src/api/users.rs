use std::str::FromStr;

use argon2::Argon2;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tap::TapFallible;
use time::OffsetDateTime;
use validator::Validate;

use crate::{
    error::{Error, UnauthorizedType},
    mongo_ext::Collection,
    util::{hash_password, verify_password, ObjectIdString},
};

use super::{
    auth::{require_role, AuthUser},
    token::{issue_token, JwtState},
};

#[derive(Clone)]
pub struct UserCollection(pub Collection<UserModel>);

impl std::ops::Deref for UserCollection {
    type Target = Collection<UserModel>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserModel {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Buyer,
    Seller,
    Admin,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 124))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 64))]
    pub password: String,

    pub role: UserRole,

    pub image: Option<String>,
}

pub async fn create_user(
    users: UserCollection,
    argon: Argon2<'_>,
    request: CreateUserRequest,
) -> Result<UserModel, Error> {
    request.validate()?;

    let count = users
        .count_documents(
            bson::doc! {
                "email": &request.email
            },
            None,
        )
        .await?;

    if count > 0 {
        return Err(Error::BadRequest("User already exists"))
            .tap_err(|_| tracing::debug!("tried registering an existing email"));
    }

    let model = UserModel {
        id: ObjectId::new(),
        name: request.name,
        email: request.email,
        password: hash_password(&argon, &request.password)?,
        role: request.role,
        image: request.image,
        created_at: OffsetDateTime::now_utc().into(),
        updated_at: OffsetDateTime::now_utc().into(),
    };
    users.insert_one(&model, None).await?;

    Ok(model)
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisteredUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: RegisteredUser,
}

/// Registration never returns a token; the caller logs in separately.
pub async fn register(
    State(users): State<UserCollection>,
    State(argon): State<Argon2<'static>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let (name, email, password) = match (request.name, request.email, request.password) {
        (Some(name), Some(email), Some(password)) => (name, email, password),
        _ => {
            return Err(Error::BadRequest(
                "All fields are required (name, email, password)",
            ))
        }
    };

    let model = create_user(
        users,
        argon,
        CreateUserRequest {
            name,
            email,
            password,
            role: request.role,
            image: request.image,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registered successfully".to_string(),
            user: RegisteredUser {
                name: model.name,
                email: model.email,
                role: model.role,
            },
        }),
    ))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserSummary {
    pub id: ObjectIdString,
    pub name: String,
    pub role: UserRole,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

pub async fn login(
    State(users): State<UserCollection>,
    State(jwt_state): State<JwtState>,
    State(argon): State<Argon2<'static>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Error> {
    let user = users
        .find_one(
            bson::doc! {
                "email": &request.email
            },
            None,
        )
        .await?;

    // unknown email and wrong password are indistinguishable to the caller
    let user = match user {
        Some(user) if verify_password(&argon, &request.password, &user.password) => user,
        _ => return Err(Error::Unauthorized(UnauthorizedType::WrongCredentials)),
    };

    let token = issue_token(&jwt_state, &user)?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserSummary {
            id: user.id.into(),
            name: user.name,
            role: user.role,
        },
    }))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[tracing::instrument(
    skip_all,
    fields(
        user = ?user,
        id = user_id,
    )
)]
pub async fn delete(
    State(users): State<UserCollection>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<DeleteResponse>, Error> {
    require_role(&user, &[UserRole::Admin])?;

    let user_id = ObjectId::from_str(&user_id)
        .map_err(|_| Error::BadRequest("Invalid ID format"))
        .tap_err(|_| tracing::debug!("malformed user id"))?;

    if !users.delete_one_by_id(user_id).await? {
        return Err(Error::NotFound("User not found"))
            .tap_err(|_| tracing::debug!("tried deleting non existing user"));
    }

    tracing::debug!("user deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "User deleted successfully".to_string(),
    }))
}
