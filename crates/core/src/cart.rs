//! The cart aggregate: line items, identity keys, derived totals.
//!
//! A cart is an ordered list of line items. Two line items are the same
//! entry exactly when their variant keys match: same product, size, frame,
//! and finish. Totals are always recomputed from the list, never stored.
//!
//! The struct is serde-transparent, so its serialized form is exactly a JSON
//! array of line items. The storefront persists that array in the session
//! under a fixed key after every mutation; see `SessionCart` there for the
//! hydrate-before-write guard.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// The identity of a line item: one product in one exact variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    pub product_id: ProductId,
    pub size: String,
    pub frame: String,
    /// Frame finish, when the chosen frame has one.
    pub finish: Option<String>,
}

/// One product+variant entry in a cart.
///
/// `unit_price` is captured when the item is first added (or re-added after
/// removal) and is never recomputed from the live catalog: a price change in
/// the back office must not silently reprice what a customer already picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub size: String,
    pub frame: String,
    pub finish: Option<String>,
    pub image: String,
}

impl LineItem {
    /// The identity key of this line item.
    #[must_use]
    pub fn key(&self) -> VariantKey {
        VariantKey {
            product_id: self.product_id,
            size: self.size.clone(),
            frame: self.frame.clone(),
            finish: self.finish.clone(),
        }
    }

    /// Whether this line item has the given identity.
    #[must_use]
    pub fn matches(&self, key: &VariantKey) -> bool {
        self.product_id == key.product_id
            && self.size == key.size
            && self.frame == key.frame
            && self.finish == key.finish
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An ordered collection of line items with derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add an item, merging by identity key.
    ///
    /// When a line with the same key already exists its quantity grows by the
    /// incoming quantity and its stored `unit_price` is kept: that price was
    /// captured when the line was created and later adds never rewrite it.
    /// Adding a zero-quantity item is a no-op.
    pub fn add(&mut self, item: LineItem) {
        if item.quantity == 0 {
            return;
        }
        let key = item.key();
        match self.items.iter_mut().find(|line| line.matches(&key)) {
            Some(line) => line.quantity += item.quantity,
            None => self.items.push(item),
        }
    }

    /// Replace the quantity of the line matching `key`.
    ///
    /// A quantity of zero removes the line; a cart never stores a zero
    /// quantity. Unknown keys are ignored.
    pub fn update_quantity(&mut self, key: &VariantKey, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| line.matches(key)) {
            line.quantity = quantity;
        }
    }

    /// Remove the single line matching the full identity key.
    pub fn remove(&mut self, key: &VariantKey) {
        self.items.retain(|line| !line.matches(key));
    }

    /// Remove every variant of a product, regardless of size/frame/finish.
    ///
    /// Kept separate from [`Self::remove`]: some callers clear a product
    /// wholesale (e.g. it was withdrawn from the catalog) while others
    /// target one variant precisely.
    pub fn remove_product(&mut self, product_id: ProductId) {
        self.items.retain(|line| line.product_id != product_id);
    }

    /// Empty the cart. Only called as part of successful order submission.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Sum of `unit_price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn item(product_id: i32, size: &str, frame: &str, quantity: u32, price: i64) -> LineItem {
        LineItem {
            product_id: ProductId::new(product_id),
            name: format!("Print {product_id}"),
            unit_price: dec(price),
            quantity,
            size: size.to_string(),
            frame: frame.to_string(),
            finish: None,
            image: String::new(),
        }
    }

    #[test]
    fn test_add_merges_same_key() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 2, 1000));
        cart.add(item(1, "M", "NONE", 3, 1000));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_add_keeps_first_captured_price() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 1, 1000));
        // Catalog was repriced between the two adds; the line keeps its price.
        cart.add(item(1, "M", "NONE", 2, 1400));
        let line = cart.items().first().expect("one line");
        assert_eq!(line.unit_price, dec(1000));
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.total_price(), dec(3000));
    }

    #[test]
    fn test_different_variants_are_different_lines() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 1, 1000));
        cart.add(item(1, "L", "NONE", 1, 1200));
        cart.add(item(1, "M", "Wood", 1, 1800));
        let mut with_finish = item(1, "M", "Wood", 1, 2000);
        with_finish.finish = Some("Walnut".to_string());
        cart.add(with_finish);
        assert_eq!(cart.len(), 4);
    }

    #[test]
    fn test_update_quantity_replaces_in_place() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 2, 1000));
        cart.update_quantity(&item(1, "M", "NONE", 0, 0).key(), 7);
        assert_eq!(cart.total_items(), 7);
        assert_eq!(cart.total_price(), dec(7000));
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 2, 1000));
        cart.update_quantity(&item(1, "M", "NONE", 0, 0).key(), 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_remove_targets_one_variant() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 1, 1000));
        cart.add(item(1, "L", "NONE", 1, 1200));
        cart.remove(&item(1, "M", "NONE", 0, 0).key());
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().map(|l| l.size.as_str()), Some("L"));
    }

    #[test]
    fn test_remove_product_clears_all_variants() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 1, 1000));
        cart.add(item(1, "L", "Wood", 1, 2000));
        cart.add(item(2, "M", "NONE", 1, 1500));
        cart.remove_product(ProductId::new(1));
        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.items().first().map(|l| l.product_id),
            Some(ProductId::new(2))
        );
    }

    #[test]
    fn test_remove_then_readd_leaves_no_residue() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 5, 1000));
        cart.remove(&item(1, "M", "NONE", 0, 0).key());
        cart.add(item(1, "M", "NONE", 2, 1300));
        let line = cart.items().first().expect("one line");
        assert_eq!(line.quantity, 2);
        // Fresh line captures the price at re-add time.
        assert_eq!(line.unit_price, dec(1300));
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 0, 1000));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_recompute_idempotently() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 2, 1000));
        cart.add(item(2, "L", "Wood", 3, 2500));
        assert_eq!(cart.total_price(), cart.total_price());
        assert_eq!(cart.total_price(), dec(2 * 1000 + 3 * 2500));
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 2, 1000));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut cart = Cart::new();
        cart.add(item(1, "M", "NONE", 2, 1000));
        let json = serde_json::to_value(&cart).expect("serialize");
        assert!(json.is_array());
        let back: Cart = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, cart);
    }
}
