use mongodb::{options::IndexOptions, IndexModel};

use crate::app::AppState;

impl AppState {
    /// Backs the register-time duplicate check with a unique index so two
    /// concurrent registrations cannot both pass the lookup.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        tracing::debug!("ensuring unique index on users.email");

        self.user_collection
            .create_index(
                IndexModel::builder()
                    .keys(bson::doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await?;

        Ok(())
    }
}
