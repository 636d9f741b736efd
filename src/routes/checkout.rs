use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{
        checkout::{
            CheckoutReview, CheckoutSummary, PaymentForm, PaymentRequest, ShippingForm,
            ShippingRequest,
        },
        orders::OrderWithItems,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::checkout_service,
    session::{PaymentInfo, SessionId, ShippingInfo},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(review))
        .route("/shipping", get(shipping_form).post(submit_shipping))
        .route("/payment", get(payment_form).post(submit_payment))
        .route("/confirmation", get(confirmation).post(place_order))
}

#[utoipa::path(
    get,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Cart priced with tax for review", body = ApiResponse<CheckoutReview>),
        (status = 409, description = "Cart is empty"),
    ),
    tag = "Checkout"
)]
pub async fn review(
    State(state): State<AppState>,
    session: SessionId,
) -> AppResult<Json<ApiResponse<CheckoutReview>>> {
    let resp = checkout_service::review(&state, session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/checkout/shipping",
    responses(
        (status = 200, description = "Shipping form pre-filled from the profile", body = ApiResponse<ShippingForm>),
        (status = 409, description = "Cart is empty"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn shipping_form(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
) -> AppResult<Json<ApiResponse<ShippingForm>>> {
    let resp = checkout_service::shipping_form(&state, &user, session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/shipping",
    request_body = ShippingRequest,
    responses(
        (status = 200, description = "Shipping information saved", body = ApiResponse<ShippingInfo>),
        (status = 400, description = "Missing fields, listed individually"),
        (status = 409, description = "Cart is empty"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn submit_shipping(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
    Json(payload): Json<ShippingRequest>,
) -> AppResult<Json<ApiResponse<ShippingInfo>>> {
    let resp = checkout_service::submit_shipping(&state, &user, session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/checkout/payment",
    responses(
        (status = 200, description = "Totals for the payment step", body = ApiResponse<PaymentForm>),
        (status = 409, description = "Cart empty or shipping not provided yet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn payment_form(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
) -> AppResult<Json<ApiResponse<PaymentForm>>> {
    let resp = checkout_service::payment_form(&state, &user, session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment method saved; card fields are never stored", body = ApiResponse<PaymentInfo>),
        (status = 400, description = "Missing method or card fields"),
        (status = 409, description = "Cart empty or shipping not provided yet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn submit_payment(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentInfo>>> {
    let resp = checkout_service::submit_payment(&state, &user, session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/checkout/confirmation",
    responses(
        (status = 200, description = "Full order summary for final review", body = ApiResponse<CheckoutSummary>),
        (status = 409, description = "Wizard state incomplete; restart checkout"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn confirmation(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
) -> AppResult<Json<ApiResponse<CheckoutSummary>>> {
    let resp = checkout_service::confirmation(&state, &user, session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout/confirmation",
    responses(
        (status = 200, description = "Order committed; cart and wizard state purged", body = ApiResponse<OrderWithItems>),
        (status = 409, description = "Wizard state incomplete or cart empty"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    session: SessionId,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = checkout_service::place_order(&state, &user, session).await?;
    Ok(Json(resp))
}
