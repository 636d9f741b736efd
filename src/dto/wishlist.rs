use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Product;

/// Outcome of a wishlist toggle, as the storefront's scripts expect it.
#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistToggle {
    pub status: String,
    pub action: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct WishlistProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
