use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Replacement quantities per product id, mirroring the per-line quantity
/// inputs of a cart form. Zero deletes the line.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub quantities: HashMap<Uuid, i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
    /// price x quantity, in cents
    pub subtotal: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}
