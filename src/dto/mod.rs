pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod wishlist;
