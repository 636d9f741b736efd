use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
            UpdateProfileRequest,
        },
        cart::{AddToCartRequest, CartLine, CartView, UpdateCartRequest},
        checkout::{
            CheckoutReview, CheckoutSummary, PaymentForm, PaymentRequest, ShippingForm,
            ShippingRequest,
        },
        orders::{OrderList, OrderWithItems},
        products::{CategoryList, ProductDetail, ProductList},
        wishlist::{WishlistProductList, WishlistToggle},
    },
    models::{Category, Order, OrderItem, OrderStatus, Product, User, WishlistEntry},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, checkout, health, orders, params, products, wishlist},
    session::{PaymentInfo, ShippingInfo},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        auth::change_password,
        products::list_products,
        products::get_product,
        products::list_categories,
        cart::view_cart,
        cart::cart_state,
        cart::add_to_cart,
        cart::update_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        checkout::review,
        checkout::shipping_form,
        checkout::submit_shipping,
        checkout::payment_form,
        checkout::submit_payment,
        checkout::confirmation,
        checkout::place_order,
        orders::list_orders,
        orders::get_order,
        orders::order_success,
        orders::cancel_order,
        wishlist::list_wishlist,
        wishlist::toggle_wishlist,
        admin::list_all_orders,
        admin::update_order_status
    ),
    components(
        schemas(
            User,
            Product,
            Category,
            WishlistEntry,
            Order,
            OrderItem,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            AddToCartRequest,
            UpdateCartRequest,
            CartLine,
            CartView,
            ShippingRequest,
            ShippingForm,
            ShippingInfo,
            PaymentRequest,
            PaymentForm,
            PaymentInfo,
            CheckoutReview,
            CheckoutSummary,
            OrderList,
            OrderWithItems,
            ProductList,
            CategoryList,
            ProductDetail,
            WishlistToggle,
            WishlistProductList,
            admin::UpdateOrderStatusRequest,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutReview>,
            ApiResponse<CheckoutSummary>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Checkout", description = "Checkout wizard endpoints"),
        (name = "Orders", description = "Order ledger endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
