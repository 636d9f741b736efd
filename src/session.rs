//! In-process session state: the shopping cart and the in-progress checkout
//! wizard. Nothing here is persisted; a session lives only as long as the
//! browser keeps presenting its id (and is evicted after an idle TTL).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

pub const SESSION_HEADER: &str = "x-session-id";

const IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Cart mapping: product id -> quantity. Entries are always >= 1; a zero or
/// absent entry means no line. BTreeMap keeps the view order stable.
pub type CartMap = BTreeMap<Uuid, i32>;

/// Shipping record captured by the wizard's second step. Required fields are
/// validated before this is ever constructed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShippingInfo {
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl ShippingInfo {
    /// Single-line address snapshot copied onto the order at commit time.
    pub fn snapshot(&self) -> String {
        let mut parts = vec![self.full_name.clone(), self.address_line1.clone()];
        if let Some(line2) = self.address_line2.as_deref().filter(|s| !s.is_empty()) {
            parts.push(line2.to_string());
        }
        parts.push(format!(
            "{}, {} {}",
            self.city, self.state, self.postal_code
        ));
        parts.push(self.country.clone());
        parts.join(", ")
    }
}

/// Payment record captured by the wizard's third step. Card fields are
/// checked for presence and then discarded; only the method tag survives,
/// so raw card data cannot outlive the request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentInfo {
    pub payment_method: String,
}

/// Wizard state accumulated across checkout steps, keyed by session.
#[derive(Debug, Clone, Default)]
pub struct CheckoutDraft {
    pub shipping: Option<ShippingInfo>,
    pub payment: Option<PaymentInfo>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub cart: CartMap,
    pub checkout: CheckoutDraft,
    last_seen: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            cart: CartMap::new(),
            checkout: CheckoutDraft::default(),
            last_seen: Instant::now(),
        }
    }
}

/// Process-wide store of live sessions. The lock is only ever held for the
/// duration of a closure and never across an await point.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_idle_ttl(IDLE_TTL)
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    fn with<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.retain(|_, s| s.last_seen.elapsed() < self.idle_ttl);
        let session = sessions.entry(id).or_default();
        session.last_seen = Instant::now();
        f(session)
    }

    pub fn cart(&self, id: Uuid) -> CartMap {
        self.with(id, |s| s.cart.clone())
    }

    /// Merge `quantity` into an existing line or create one.
    pub fn add_to_cart(&self, id: Uuid, product_id: Uuid, quantity: i32) {
        self.with(id, |s| {
            *s.cart.entry(product_id).or_insert(0) += quantity;
        });
    }

    /// Apply replacement quantities. Zero deletes the line, positive values
    /// replace it; ids not already in the cart are ignored.
    pub fn update_cart(&self, id: Uuid, quantities: &HashMap<Uuid, i32>) {
        self.with(id, |s| {
            for (product_id, quantity) in quantities {
                if !s.cart.contains_key(product_id) {
                    continue;
                }
                if *quantity == 0 {
                    s.cart.remove(product_id);
                } else {
                    s.cart.insert(*product_id, *quantity);
                }
            }
        });
    }

    /// Idempotent: removing an absent line is a no-op.
    pub fn remove_from_cart(&self, id: Uuid, product_id: Uuid) {
        self.with(id, |s| {
            s.cart.remove(&product_id);
        });
    }

    pub fn clear_cart(&self, id: Uuid) {
        self.with(id, |s| s.cart.clear());
    }

    pub fn shipping(&self, id: Uuid) -> Option<ShippingInfo> {
        self.with(id, |s| s.checkout.shipping.clone())
    }

    pub fn payment(&self, id: Uuid) -> Option<PaymentInfo> {
        self.with(id, |s| s.checkout.payment.clone())
    }

    pub fn set_shipping(&self, id: Uuid, info: ShippingInfo) {
        self.with(id, |s| s.checkout.shipping = Some(info));
    }

    pub fn set_payment(&self, id: Uuid, info: PaymentInfo) {
        self.with(id, |s| s.checkout.payment = Some(info));
    }

    /// Purge the cart and all wizard state after a successful order commit.
    pub fn complete_checkout(&self, id: Uuid) {
        self.with(id, |s| {
            s.cart.clear();
            s.checkout = CheckoutDraft::default();
        });
    }
}

/// Session identity, supplied by the client in the `x-session-id` header.
/// Cookie plumbing is the host's concern; the id itself is all this layer
/// needs.
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub Uuid);

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| AppError::BadRequest("Missing X-Session-Id header".into()))?;

        let value = header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid X-Session-Id header".into()))?;

        let id = Uuid::parse_str(value.trim())
            .map_err(|_| AppError::BadRequest("Invalid X-Session-Id header".into()))?;

        Ok(SessionId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Uuid, Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn add_merges_quantities_per_product() {
        let store = SessionStore::new();
        let (sid, a, b) = ids();

        store.add_to_cart(sid, a, 2);
        store.add_to_cart(sid, b, 1);
        store.add_to_cart(sid, a, 3);

        let cart = store.cart(sid);
        assert_eq!(cart.get(&a), Some(&5));
        assert_eq!(cart.get(&b), Some(&1));
    }

    #[test]
    fn update_replaces_deletes_and_ignores_unknown_lines() {
        let store = SessionStore::new();
        let (sid, a, b) = ids();
        let stranger = Uuid::new_v4();

        store.add_to_cart(sid, a, 4);
        store.add_to_cart(sid, b, 2);

        let mut changes = HashMap::new();
        changes.insert(a, 1); // replace, never add
        changes.insert(b, 0); // delete
        changes.insert(stranger, 7); // not in cart: no-op
        store.update_cart(sid, &changes);

        let cart = store.cart(sid);
        assert_eq!(cart.get(&a), Some(&1));
        assert!(!cart.contains_key(&b));
        assert!(!cart.contains_key(&stranger));
    }

    #[test]
    fn remove_is_idempotent() {
        let store = SessionStore::new();
        let (sid, a, _) = ids();

        store.add_to_cart(sid, a, 1);
        store.remove_from_cart(sid, a);
        store.remove_from_cart(sid, a);
        assert!(store.cart(sid).is_empty());
    }

    #[test]
    fn completing_checkout_purges_cart_and_wizard_state() {
        let store = SessionStore::new();
        let (sid, a, _) = ids();

        store.add_to_cart(sid, a, 2);
        store.set_shipping(
            sid,
            ShippingInfo {
                full_name: "Jane Doe".into(),
                address_line1: "1 Main St".into(),
                address_line2: None,
                city: "Springfield".into(),
                state: "IL".into(),
                postal_code: "62704".into(),
                country: "US".into(),
                phone: None,
            },
        );
        store.set_payment(
            sid,
            PaymentInfo {
                payment_method: "credit_card".into(),
            },
        );

        store.complete_checkout(sid);

        assert!(store.cart(sid).is_empty());
        assert!(store.shipping(sid).is_none());
        assert!(store.payment(sid).is_none());
    }

    #[test]
    fn sessions_are_isolated_from_each_other() {
        let store = SessionStore::new();
        let (sid_one, sid_two, a) = ids();

        store.add_to_cart(sid_one, a, 2);
        assert!(store.cart(sid_two).is_empty());
    }

    #[test]
    fn idle_sessions_are_evicted() {
        let store = SessionStore::with_idle_ttl(Duration::ZERO);
        let (sid, a, _) = ids();

        store.add_to_cart(sid, a, 2);
        assert!(store.cart(sid).is_empty());
    }

    #[test]
    fn shipping_snapshot_reads_as_one_line() {
        let info = ShippingInfo {
            full_name: "Jane Doe".into(),
            address_line1: "1 Main St".into(),
            address_line2: Some("Apt 4".into()),
            city: "Springfield".into(),
            state: "IL".into(),
            postal_code: "62704".into(),
            country: "US".into(),
            phone: None,
        };
        assert_eq!(
            info.snapshot(),
            "Jane Doe, 1 Main St, Apt 4, Springfield, IL 62704, US"
        );
    }
}
