use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, UpdateCartRequest},
    error::AppResult,
    response::ApiResponse,
    services::cart_service,
    session::{CartMap, SessionId},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(view_cart)
                .post(add_to_cart)
                .put(update_cart)
                .delete(clear_cart),
        )
        .route("/state", get(cart_state))
        .route("/{product_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines with subtotal, tax and total", body = ApiResponse<CartView>),
        (status = 400, description = "Missing session header"),
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    session: SessionId,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::view_cart(&state, session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/state",
    responses(
        (status = 200, description = "Raw cart mapping, product id to quantity", body = ApiResponse<serde_json::Value>),
    ),
    tag = "Cart"
)]
pub async fn cart_state(
    State(state): State<AppState>,
    session: SessionId,
) -> Json<ApiResponse<CartMap>> {
    Json(cart_service::cart_state(&state, session))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Quantity merged into the cart", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionId,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartMap>>> {
    let resp = cart_service::add_to_cart(&state, session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Quantities replaced; zero removes a line", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Bad request"),
    ),
    tag = "Cart"
)]
pub async fn update_cart(
    State(state): State<AppState>,
    session: SessionId,
    Json(payload): Json<UpdateCartRequest>,
) -> AppResult<Json<ApiResponse<CartMap>>> {
    let resp = cart_service::update_cart(&state, session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Line removed (no-op when absent)", body = ApiResponse<serde_json::Value>),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: SessionId,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartMap>>> {
    let resp = cart_service::remove_from_cart(&state, session, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<serde_json::Value>),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    session: SessionId,
) -> AppResult<Json<ApiResponse<CartMap>>> {
    let resp = cart_service::clear_cart(&state, session).await?;
    Ok(Json(resp))
}
