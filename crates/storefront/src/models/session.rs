//! Session-stored state: the cart and the checkout flow.
//!
//! The session record is the durable store behind a shopper's cart. Each
//! browser profile holds one session cookie, so the cart survives reloads;
//! two tabs share the session and the last write wins, which is acceptable
//! for this shop and deliberately not synchronized.

use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;
use uuid::Uuid;

use dar_decor_core::cart::{Cart, LineItem, VariantKey};
use dar_decor_core::checkout::CheckoutFlow;
use dar_decor_core::ProductId;

/// Session keys for storefront data.
pub mod session_keys {
    /// Key for the serialized cart (a JSON array of line items).
    ///
    /// Fixed: renaming it would orphan every existing cart.
    pub const CART: &str = "cart";

    /// Key for the checkout flow (step + draft + field errors).
    pub const CHECKOUT: &str = "checkout";

    /// Key for the submission idempotency key of the current checkout.
    pub const CHECKOUT_TOKEN: &str = "checkout_token";
}

/// The cart aggregate bound to its session store.
///
/// The only way to get one is [`SessionCart::load`], which hydrates the
/// in-memory cart from the session first - so a handler cannot overwrite a
/// shopper's stored cart with an empty one by writing before reading.
/// Mutations happen in memory; [`SessionCart::persist`] writes the whole
/// item list back under the fixed key, ordered after the mutation.
pub struct SessionCart {
    cart: Cart,
}

impl SessionCart {
    /// Hydrate the cart from the session, or start empty on first visit.
    ///
    /// # Errors
    ///
    /// Returns the session error if the store is unreachable. A present but
    /// undecodable value is treated as corruption and propagated rather than
    /// silently replaced.
    pub async fn load(session: &Session) -> Result<Self, SessionError> {
        let cart = session
            .get::<Cart>(session_keys::CART)
            .await?
            .unwrap_or_default();
        Ok(Self { cart })
    }

    /// Read access to the aggregate.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add an item (merging by identity key) and persist.
    ///
    /// # Errors
    ///
    /// Returns the session error if the write-back fails.
    pub async fn add(&mut self, session: &Session, item: LineItem) -> Result<(), SessionError> {
        self.cart.add(item);
        self.persist(session).await
    }

    /// Update a line's quantity (zero removes it) and persist.
    ///
    /// # Errors
    ///
    /// Returns the session error if the write-back fails.
    pub async fn update_quantity(
        &mut self,
        session: &Session,
        key: &VariantKey,
        quantity: u32,
    ) -> Result<(), SessionError> {
        self.cart.update_quantity(key, quantity);
        self.persist(session).await
    }

    /// Remove one exact variant and persist.
    ///
    /// # Errors
    ///
    /// Returns the session error if the write-back fails.
    pub async fn remove(
        &mut self,
        session: &Session,
        key: &VariantKey,
    ) -> Result<(), SessionError> {
        self.cart.remove(key);
        self.persist(session).await
    }

    /// Remove every variant of a product and persist.
    ///
    /// # Errors
    ///
    /// Returns the session error if the write-back fails.
    pub async fn remove_product(
        &mut self,
        session: &Session,
        product_id: ProductId,
    ) -> Result<(), SessionError> {
        self.cart.remove_product(product_id);
        self.persist(session).await
    }

    /// Empty the cart and persist. Part of successful order submission only.
    ///
    /// # Errors
    ///
    /// Returns the session error if the write-back fails.
    pub async fn clear(&mut self, session: &Session) -> Result<(), SessionError> {
        self.cart.clear();
        self.persist(session).await
    }

    /// Write the full item list back to the session.
    async fn persist(&self, session: &Session) -> Result<(), SessionError> {
        session.insert(session_keys::CART, &self.cart).await
    }
}

/// Load the checkout flow from the session, or a fresh one.
///
/// # Errors
///
/// Returns the session error if the store is unreachable.
pub async fn load_checkout(session: &Session) -> Result<CheckoutFlow, SessionError> {
    Ok(session
        .get::<CheckoutFlow>(session_keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

/// Write the checkout flow back to the session.
///
/// # Errors
///
/// Returns the session error if the write fails.
pub async fn save_checkout(session: &Session, flow: &CheckoutFlow) -> Result<(), SessionError> {
    session.insert(session_keys::CHECKOUT, flow).await
}

/// Get the idempotency key for the current checkout, creating one if absent.
///
/// Generated once per checkout attempt (when the payment stage is entered)
/// and cleared on success, so a retried confirmation of the same checkout
/// resolves to the same order instead of creating a duplicate.
///
/// # Errors
///
/// Returns the session error if the store is unreachable.
pub async fn checkout_token(session: &Session) -> Result<Uuid, SessionError> {
    if let Some(token) = session.get::<Uuid>(session_keys::CHECKOUT_TOKEN).await? {
        return Ok(token);
    }
    let token = Uuid::new_v4();
    session.insert(session_keys::CHECKOUT_TOKEN, token).await?;
    Ok(token)
}

/// Drop the idempotency key after a successful submission.
///
/// # Errors
///
/// Returns the session error if the removal fails.
pub async fn clear_checkout_token(session: &Session) -> Result<(), SessionError> {
    session
        .remove::<Uuid>(session_keys::CHECKOUT_TOKEN)
        .await?;
    Ok(())
}
