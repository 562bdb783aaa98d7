use anyhow::Context;
use axum::extract::FromRef;

use crate::api::{products::ProductCollection, token::JwtState, users::UserCollection};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub argon: argon2::Argon2<'static>,
    pub jwt_state: JwtState,

    pub mongo_client: mongodb::Client,
    pub user_collection: UserCollection,
    pub product_collection: ProductCollection,
}

impl AppState {
    pub async fn new(
        mongo_url: &str,
        database_name: &str,
        jwt_state: JwtState,
    ) -> anyhow::Result<Self> {
        let argon = argon2::Argon2::default();

        let mongo_client_opt = mongodb::options::ClientOptions::parse(mongo_url).await?;
        let mongo_client = mongodb::Client::with_options(mongo_client_opt)?;

        let db = mongo_client.database(database_name);
        Ok(Self {
            argon,
            jwt_state,

            mongo_client,
            user_collection: UserCollection(db.collection("users").into()),
            product_collection: ProductCollection(db.collection("products").into()),
        })
    }

    pub async fn new_from_env() -> anyhow::Result<Self> {
        let mongo_url = std::env::var("MONGO_URI").context("MONGO_URI must be set")?;

        Self::new(&mongo_url, "storefront", JwtState::new_from_env()).await
    }
}
