use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Catalog product. `price` is integer cents.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image_url: String,
    pub additional_images: Vec<String>,
    pub category_id: Uuid,
    pub stock_quantity: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    // Never serialized to clients.
    #[serde(skip_serializing)]
    #[schema(write_only)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name used to pre-fill the shipping form.
    pub fn full_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim().to_string();
        if name.is_empty() {
            self.username.clone()
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct WishlistEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Cancellation is only permitted before fulfilment starts.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    /// Transitions move forward along pending -> confirmed -> shipped ->
    /// delivered; cancellation branches off while the order is cancellable.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        match next {
            OrderStatus::Cancelled => self.is_cancellable(),
            _ => {
                *self != OrderStatus::Cancelled
                    && *self != OrderStatus::Delivered
                    && next.rank() > self.rank()
            }
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger order. `total_amount` is integer cents; `shipping_address` is the
/// snapshot string taken at commit time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One order line. `price` is the product price copied at commit time and is
/// never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn status_roundtrips_through_strings() {
        for status in [Pending, Confirmed, Shipped, Delivered, Cancelled] {
            assert_eq!(super::OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(super::OrderStatus::parse("paid"), None);
    }

    #[test]
    fn cancellation_only_before_fulfilment() {
        assert!(Pending.is_cancellable());
        assert!(Confirmed.is_cancellable());
        assert!(!Shipped.is_cancellable());
        assert!(!Delivered.is_cancellable());
        assert!(!Cancelled.is_cancellable());
    }

    #[test]
    fn transitions_are_forward_only() {
        assert!(Pending.can_advance_to(Confirmed));
        assert!(Confirmed.can_advance_to(Shipped));
        assert!(Shipped.can_advance_to(Delivered));
        assert!(Pending.can_advance_to(Shipped));

        assert!(!Shipped.can_advance_to(Confirmed));
        assert!(!Delivered.can_advance_to(Shipped));
        assert!(!Cancelled.can_advance_to(Pending));
        assert!(!Cancelled.can_advance_to(Delivered));

        assert!(Pending.can_advance_to(Cancelled));
        assert!(Confirmed.can_advance_to(Cancelled));
        assert!(!Shipped.can_advance_to(Cancelled));
        assert!(!Delivered.can_advance_to(Cancelled));
    }
}
