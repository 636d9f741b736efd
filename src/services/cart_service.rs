use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartLine, CartView, UpdateCartRequest},
    error::{AppError, AppResult},
    models::Product,
    pricing,
    response::{ApiResponse, Meta},
    session::{CartMap, SessionId},
    state::AppState,
};

/// Price out the cart against the catalog. Lines whose product has vanished
/// from the catalog are skipped rather than failing the whole view.
pub async fn load_lines(pool: &DbPool, cart: &CartMap) -> AppResult<(Vec<CartLine>, i64)> {
    if cart.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let ids: Vec<Uuid> = cart.keys().copied().collect();
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(pool)
        .await?;
    let by_id: HashMap<Uuid, Product> = products.into_iter().map(|p| (p.id, p)).collect();

    let mut lines = Vec::new();
    let mut subtotal = 0_i64;
    for (product_id, quantity) in cart {
        let Some(product) = by_id.get(product_id) else {
            continue;
        };
        let line_subtotal = pricing::line_subtotal(product.price, *quantity);
        subtotal += line_subtotal;
        lines.push(CartLine {
            product: product.clone(),
            quantity: *quantity,
            subtotal: line_subtotal,
        });
    }

    Ok((lines, subtotal))
}

pub async fn view_cart(
    state: &AppState,
    session: SessionId,
) -> AppResult<ApiResponse<CartView>> {
    let cart = state.sessions.cart(session.0);
    let (items, subtotal) = load_lines(&state.pool, &cart).await?;
    let tax = pricing::tax_on(subtotal);

    Ok(ApiResponse::success(
        "OK",
        CartView {
            items,
            subtotal,
            tax,
            total: subtotal + tax,
        },
        Some(Meta::empty()),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    session: SessionId,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartMap>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound);
    }

    state
        .sessions
        .add_to_cart(session.0, payload.product_id, payload.quantity);

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_add",
        Some("cart"),
        Some(serde_json::json!({
            "session_id": session.0,
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to cart",
        state.sessions.cart(session.0),
        None,
    ))
}

pub async fn update_cart(
    state: &AppState,
    session: SessionId,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartMap>> {
    if payload.quantities.values().any(|q| *q < 0) {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_string(),
        ));
    }

    state.sessions.update_cart(session.0, &payload.quantities);

    Ok(ApiResponse::success(
        "Cart updated",
        state.sessions.cart(session.0),
        None,
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    session: SessionId,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartMap>> {
    state.sessions.remove_from_cart(session.0, product_id);

    Ok(ApiResponse::success(
        "Removed from cart",
        state.sessions.cart(session.0),
        None,
    ))
}

pub async fn clear_cart(state: &AppState, session: SessionId) -> AppResult<ApiResponse<CartMap>> {
    state.sessions.clear_cart(session.0);

    Ok(ApiResponse::success(
        "Cart cleared",
        state.sessions.cart(session.0),
        None,
    ))
}

/// The raw session mapping, product id -> quantity.
pub fn cart_state(state: &AppState, session: SessionId) -> ApiResponse<CartMap> {
    ApiResponse::success("OK", state.sessions.cart(session.0), None)
}
