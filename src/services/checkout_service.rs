use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        cart::CartLine,
        checkout::{
            CheckoutReview, CheckoutSummary, PaymentForm, PaymentFormError, PaymentRequest,
            ShippingForm, ShippingRequest,
        },
        orders::OrderWithItems,
    },
    entity::{order_items::ActiveModel as OrderItemActive, orders::ActiveModel as OrderActive},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{OrderStatus, User},
    pricing,
    response::{ApiResponse, Meta},
    services::{
        cart_service,
        order_service::{order_from_entity, order_item_from_entity},
    },
    session::{PaymentInfo, SessionId, ShippingInfo},
    state::AppState,
};

/// Cart lines priced for checkout; empty carts bounce back to the catalog.
async fn priced_cart(state: &AppState, session: SessionId) -> AppResult<(Vec<CartLine>, i64)> {
    let cart = state.sessions.cart(session.0);
    if cart.is_empty() {
        return Err(AppError::precondition("Your cart is empty", "/products"));
    }

    let (lines, subtotal) = cart_service::load_lines(&state.pool, &cart).await?;
    if lines.is_empty() {
        // Every cart line pointed at a product that no longer exists.
        return Err(AppError::precondition("Your cart is empty", "/products"));
    }

    Ok((lines, subtotal))
}

fn shipping_or_redirect(state: &AppState, session: SessionId) -> AppResult<ShippingInfo> {
    state.sessions.shipping(session.0).ok_or_else(|| {
        AppError::precondition(
            "Please provide shipping information first",
            "/checkout/shipping",
        )
    })
}

/// Confirmation needs the whole wizard present; anything missing means the
/// session lapsed and the flow restarts at review.
fn wizard_or_restart(
    state: &AppState,
    session: SessionId,
) -> AppResult<(ShippingInfo, PaymentInfo)> {
    let expired = || {
        AppError::precondition(
            "Your session has expired. Please start checkout again.",
            "/checkout",
        )
    };
    let shipping = state.sessions.shipping(session.0).ok_or_else(expired)?;
    let payment = state.sessions.payment(session.0).ok_or_else(expired)?;
    Ok((shipping, payment))
}

async fn fetch_user(state: &AppState, user: &AuthUser) -> AppResult<User> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;
    row.ok_or(AppError::NotFound)
}

/// Step 1: review the cart with tax applied.
pub async fn review(state: &AppState, session: SessionId) -> AppResult<ApiResponse<CheckoutReview>> {
    let (items, subtotal) = priced_cart(state, session).await?;
    let tax = pricing::tax_on(subtotal);

    Ok(ApiResponse::success(
        "Checkout review",
        CheckoutReview {
            items,
            subtotal,
            tax,
            total: subtotal + tax,
        },
        Some(Meta::empty()),
    ))
}

/// Step 2 (GET): the shipping form pre-filled from the user's profile.
pub async fn shipping_form(
    state: &AppState,
    user: &AuthUser,
    session: SessionId,
) -> AppResult<ApiResponse<ShippingForm>> {
    priced_cart(state, session).await?;
    let profile = fetch_user(state, user).await?;

    Ok(ApiResponse::success(
        "Shipping form",
        ShippingForm {
            full_name: profile.full_name(),
            phone: profile.phone,
            country: "US".to_string(),
            saved: state.sessions.shipping(session.0),
        },
        Some(Meta::empty()),
    ))
}

/// Step 2 (POST): validate and store the shipping record.
pub async fn submit_shipping(
    state: &AppState,
    _user: &AuthUser,
    session: SessionId,
    payload: ShippingRequest,
) -> AppResult<ApiResponse<ShippingInfo>> {
    priced_cart(state, session).await?;

    let info = payload
        .validate()
        .map_err(AppError::missing_fields)?;
    state.sessions.set_shipping(session.0, info.clone());

    Ok(ApiResponse::success(
        "Shipping information saved",
        info,
        Some(Meta::empty()),
    ))
}

/// Step 3 (GET): totals for the payment form; requires shipping first.
pub async fn payment_form(
    state: &AppState,
    _user: &AuthUser,
    session: SessionId,
) -> AppResult<ApiResponse<PaymentForm>> {
    let (_, subtotal) = priced_cart(state, session).await?;
    shipping_or_redirect(state, session)?;
    let tax = pricing::tax_on(subtotal);

    Ok(ApiResponse::success(
        "Payment form",
        PaymentForm {
            subtotal,
            tax,
            total: subtotal + tax,
        },
        Some(Meta::empty()),
    ))
}

/// Step 3 (POST): validate the method (and card-field presence for
/// credit_card), then keep only the method tag.
pub async fn submit_payment(
    state: &AppState,
    _user: &AuthUser,
    session: SessionId,
    payload: PaymentRequest,
) -> AppResult<ApiResponse<PaymentInfo>> {
    priced_cart(state, session).await?;
    shipping_or_redirect(state, session)?;

    let info = payload.validate().map_err(|err| match err {
        PaymentFormError::MethodMissing => AppError::Validation {
            message: "Please select a payment method".to_string(),
            missing_fields: vec!["payment_method".to_string()],
        },
        PaymentFormError::MissingFields(missing) => AppError::missing_fields(missing),
    })?;
    state.sessions.set_payment(session.0, info.clone());

    Ok(ApiResponse::success(
        "Payment information saved",
        info,
        Some(Meta::empty()),
    ))
}

/// Step 4 (GET): the full order summary shown before the final commit.
pub async fn confirmation(
    state: &AppState,
    _user: &AuthUser,
    session: SessionId,
) -> AppResult<ApiResponse<CheckoutSummary>> {
    let (shipping, payment) = wizard_or_restart(state, session)?;
    let (items, subtotal) = priced_cart(state, session).await?;
    let tax = pricing::tax_on(subtotal);

    Ok(ApiResponse::success(
        "Checkout confirmation",
        CheckoutSummary {
            items,
            subtotal,
            tax,
            total: subtotal + tax,
            shipping,
            payment_method: payment.payment_method,
        },
        Some(Meta::empty()),
    ))
}

/// Step 4 (POST): commit the order. One transaction inserts the order and
/// every line; any failure rolls the whole set back. The item price is the
/// product's price as read in this request, so later catalog changes never
/// touch historical orders. On success the cart and wizard state are purged.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    session: SessionId,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let (shipping, payment) = wizard_or_restart(state, session)?;
    let (lines, subtotal) = priced_cart(state, session).await?;
    let total = pricing::order_total(subtotal);

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_amount: Set(total),
        status: Set(OrderStatus::Confirmed.as_str().to_string()),
        shipping_address: Set(shipping.snapshot()),
        payment_method: Set(payment.payment_method),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product.id),
            quantity: Set(line.quantity),
            price: Set(line.product.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    state.sessions.complete_checkout(session.0);

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total_amount": total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let order = order_from_entity(order)?;
    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}
