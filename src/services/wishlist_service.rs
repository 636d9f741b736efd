use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::wishlist::{WishlistProductList, WishlistToggle},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT p.*
        FROM wishlists w
        JOIN products p ON p.id = w.product_id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlists WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        WishlistProductList { items: products },
        Some(meta),
    ))
}

/// Flip the (user, product) wishlist entry. A concurrent insert losing the
/// race against the unique pair constraint reads as already-present, so the
/// toggle still reports `added`.
pub async fn toggle_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistToggle>> {
    let product_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let deleted = sqlx::query("DELETE FROM wishlists WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(pool)
        .await?;

    let action = if deleted.rows_affected() > 0 {
        "removed"
    } else {
        sqlx::query(
            r#"
            INSERT INTO wishlists (id, user_id, product_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(product_id)
        .execute(pool)
        .await?;
        "added"
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_toggle",
        Some("wishlists"),
        Some(serde_json::json!({ "product_id": product_id, "action": action })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = if action == "added" {
        "Added to wishlist"
    } else {
        "Removed from wishlist"
    };
    Ok(ApiResponse::success(
        message,
        WishlistToggle {
            status: "success".to_string(),
            action: action.to_string(),
        },
        Some(Meta::empty()),
    ))
}
