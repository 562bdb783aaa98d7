pub mod auth;
pub mod products;
pub mod token;
pub mod users;

#[cfg(test)]
pub(crate) mod tests {
    use argon2::Argon2;
    use axum::extract::State;
    use bson::oid::ObjectId;

    use crate::app::AppState;

    use super::{
        auth::AuthUser,
        products::ProductCollection,
        token::JwtState,
        users::{create_user, CreateUserRequest, UserCollection, UserModel, UserRole},
    };

    pub fn auth_user(role: UserRole) -> AuthUser {
        AuthUser {
            id: ObjectId::new(),
            name: "name".to_string(),
            email: "email@test.com".to_string(),
            role,
        }
    }

    /// App state over a client that never connects; only usable by tests
    /// that reject before the first store call.
    pub async fn lazy_app_state() -> AppState {
        AppState::new(
            "mongodb://localhost:27017",
            &format!("storefront-test-{}", ObjectId::new()),
            JwtState::new("test-secret"),
        )
        .await
        .unwrap()
    }

    #[allow(dead_code)]
    pub struct Bootstrap {
        pub user_model: UserModel,
        user_password: String,
        pub app_state: AppState,
    }

    impl Bootstrap {
        pub fn user_collection(&self) -> State<UserCollection> {
            State(self.app_state.user_collection.clone())
        }

        pub fn product_collection(&self) -> State<ProductCollection> {
            State(self.app_state.product_collection.clone())
        }

        pub fn jwt_state(&self) -> State<JwtState> {
            State(self.app_state.jwt_state.clone())
        }

        pub fn argon(&self) -> State<Argon2<'static>> {
            State(self.app_state.argon.clone())
        }

        pub fn auth_user(&self) -> AuthUser {
            self.user_model.clone().into()
        }

        pub fn user_id(&self) -> ObjectId {
            self.user_model.id
        }

        pub fn user_email(&self) -> String {
            self.user_model.email.clone()
        }

        pub async fn derive(&self, email: &str, password: &str, role: UserRole) -> Bootstrap {
            let user = register_user(&self.app_state, email, password, role).await;

            Bootstrap {
                user_model: user,
                user_password: password.to_string(),
                app_state: self.app_state.clone(),
            }
        }
    }

    pub async fn register_user(
        app: &AppState,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> UserModel {
        create_user(
            app.user_collection.clone(),
            app.argon.clone(),
            CreateUserRequest {
                name: "name".to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role,
                image: None,
            },
        )
        .await
        .unwrap()
    }

    /// Stands up an `AppState` against a throwaway database with one admin
    /// user. Callers needing other roles derive from it.
    pub async fn bootstrap() -> Bootstrap {
        dotenvy::dotenv().ok();
        let mongo_url = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let database_name = format!("storefront-test-{}", ObjectId::new());
        let app_state = AppState::new(&mongo_url, &database_name, JwtState::new("test-secret"))
            .await
            .unwrap();
        app_state.ensure_indexes().await.unwrap();

        let password = "password";
        let user = register_user(&app_state, "admin@test.com", password, UserRole::Admin).await;

        Bootstrap {
            app_state,
            user_model: user,
            user_password: password.to_string(),
        }
    }

    #[tokio::test]
    #[ignore = "requires a running MongoDB"]
    async fn register_login_then_create_product_as_buyer() {
        use assert_matches::assert_matches;
        use axum::{extract::FromRequestParts, http::StatusCode, Json};

        use crate::error::Error;

        let bootstrap = bootstrap().await;

        let request = super::users::RegisterRequest {
            name: Some("Alice".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some("pw1".to_string()),
            role: UserRole::default(),
            image: None,
        };

        let (status, _) = super::users::register(
            bootstrap.user_collection(),
            bootstrap.argon(),
            Json(request.clone()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(login) = super::users::login(
            bootstrap.user_collection(),
            bootstrap.jwt_state(),
            bootstrap.argon(),
            Json(super::users::LoginRequest {
                email: "a@x.com".to_string(),
                password: "pw1".to_string(),
            }),
        )
        .await
        .unwrap();

        // resolve the token the way the auth gate does
        let (mut parts, _) = axum::http::request::Request::get("http://localhost")
            .header("Authorization", format!("Bearer {}", login.token))
            .body(())
            .unwrap()
            .into_parts();
        let alice = AuthUser::from_request_parts(&mut parts, &bootstrap.app_state)
            .await
            .unwrap();
        assert_eq!(alice.role, UserRole::Buyer);

        let err = super::products::create(
            bootstrap.product_collection(),
            alice,
            Json(super::products::CreateRequest {
                name: Some("chair".to_string()),
                price: Some(10.0),
                description: Some("description".to_string()),
                category: Some("furniture".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_matches!(err, Error::Forbidden);

        let err = super::users::register(
            bootstrap.user_collection(),
            bootstrap.argon(),
            Json(request),
        )
        .await
        .unwrap_err();
        assert_matches!(err, Error::BadRequest("User already exists"));
    }
}
