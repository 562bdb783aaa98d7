use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tap::TapFallible;
use time::OffsetDateTime;

use crate::{error::Error, mongo_ext::Collection, util::ObjectIdString};

use super::{
    auth::{require_role, AuthUser},
    users::UserRole,
};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProductModel {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,

    #[serde(rename = "createdBy")]
    pub created_by: ObjectId,

    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

#[derive(Clone)]
pub struct ProductCollection(pub Collection<ProductModel>);

impl std::ops::Deref for ProductCollection {
    type Target = Collection<ProductModel>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ObjectIdString,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,

    #[serde(rename = "createdBy")]
    pub created_by: ObjectIdString,
}

impl From<ProductModel> for Product {
    fn from(product: ProductModel) -> Self {
        Self {
            id: product.id.into(),
            name: product.name,
            price: product.price,
            description: product.description,
            category: product.category,
            created_by: product.created_by.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateResponse {
    pub success: bool,
    pub message: String,
    pub data: Product,
}

#[tracing::instrument(
    skip_all,
    fields(
        user = ?user,
    )
)]
pub async fn create(
    State(products): State<ProductCollection>,
    user: AuthUser,
    Json(request): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreateResponse>), Error> {
    require_role(&user, &[UserRole::Admin, UserRole::Seller])?;

    let (name, price, description, category) = match (
        request.name,
        request.price,
        request.description,
        request.category,
    ) {
        (Some(name), Some(price), Some(description), Some(category)) => {
            (name, price, description, category)
        }
        _ => return Err(Error::BadRequest("All fields are required.")),
    };

    if price < 0.0 {
        return Err(Error::BadRequest("Price must not be negative."))
            .tap_err(|_| tracing::debug!("tried creating product with negative price"));
    }

    let model = ProductModel {
        id: ObjectId::new(),
        name,
        price,
        description,
        category,
        created_by: user.id,
        created_at: OffsetDateTime::now_utc().into(),
        updated_at: OffsetDateTime::now_utc().into(),
    };

    tracing::debug!("creating product {:#?}", model);
    products.insert_one(&model, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            success: true,
            message: "Product created successfully".to_string(),
            data: model.into(),
        }),
    ))
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ListQuery {
    #[serde(rename = "priceRange")]
    pub price_range: Option<String>,

    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Product>,
}

/// Parses a `min-max` pair into a closed range.
pub fn parse_price_range(range: &str) -> Result<(f64, f64), Error> {
    let (min, max) = range
        .split_once('-')
        .ok_or(Error::BadRequest("Invalid price range"))?;

    match (min.trim().parse::<f64>(), max.trim().parse::<f64>()) {
        (Ok(min), Ok(max)) if min <= max => Ok((min, max)),
        _ => Err(Error::BadRequest("Invalid price range")),
    }
}

pub async fn index(
    State(products): State<ProductCollection>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, Error> {
    let mut filter = bson::Document::new();

    if let Some(range) = query.price_range {
        let (min, max) = parse_price_range(&range)?;
        filter.insert("price", bson::doc! { "$gte": min, "$lte": max });
    }

    if let Some(category) = query.category {
        filter.insert("category", category);
    }

    let mut cursor = products.find(filter, None).await?;

    let mut data = vec![];

    while cursor.advance().await? {
        let product = cursor.deserialize_current()?;

        data.push(product.into());
    }

    Ok(Json(ListResponse {
        success: true,
        data,
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
        id = product_id,
    )
)]
pub async fn delete(
    State(products): State<ProductCollection>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> Result<Json<DeleteResponse>, Error> {
    require_role(&user, &[UserRole::Admin, UserRole::Seller])?;

    let product_id = ObjectId::from_str(&product_id)
        .map_err(|_| Error::BadRequest("Invalid ID format"))
        .tap_err(|_| tracing::debug!("malformed product id"))?;

    if !products.delete_one_by_id(product_id).await? {
        return Err(Error::NotFound("Product not found"))
            .tap_err(|_| tracing::debug!("tried deleting non existing product"));
    }

    tracing::debug!("product deleted");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Product deleted successfully".to_string(),
    }))
}
