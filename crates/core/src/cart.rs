//! The cart model: line items selected before checkout.
//!
//! A [`Cart`] is owned by exactly one browser session and has exactly one
//! writer, so every operation here is synchronous and infallible; mutations
//! addressing an identity that is not present are no-ops. Persistence is the
//! caller's concern - the storefront serializes the whole cart into the
//! session store after every mutation and hydrates it back on the next
//! request.
//!
//! Line identity is `(product_id, size)`: the same product in two sizes is
//! two lines. Quantities are always at least 1; a line whose quantity would
//! drop to 0 is removed rather than stored at zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog identifier of the product.
    pub product_id: String,
    /// Variant key, e.g. a size. `None` for single-variant products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Display name, forwarded verbatim to the provider line item.
    pub name: String,
    /// Price per unit in the standard currency unit (dollars, not cents).
    pub unit_price: Decimal,
    /// Number of units, always >= 1.
    pub quantity: u32,
    /// Image reference for the provider line item and cart display.
    pub image: String,
}

impl CartItem {
    fn matches(&self, product_id: &str, size: Option<&str>) -> bool {
        self.product_id == product_id && self.size.as_deref() == size
    }

    /// Line subtotal: `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The session-scoped cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add an item. If a line with the same `(product_id, size)` exists, its
    /// quantity is incremented by the incoming quantity; otherwise the item
    /// is appended. A zero-quantity add is a no-op, preserving the >= 1
    /// invariant.
    pub fn add(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        match self
            .items
            .iter_mut()
            .find(|existing| existing.matches(&item.product_id, item.size.as_deref()))
        {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
    }

    /// Increase the matching line's quantity by 1. No-op if absent.
    pub fn increase_quantity(&mut self, product_id: &str, size: Option<&str>) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.matches(product_id, size))
        {
            item.quantity += 1;
        }
    }

    /// Decrease the matching line's quantity by 1, removing the line when it
    /// would drop below 1. No-op if absent.
    ///
    /// Removal (rather than flooring at 1) is the chosen policy: a quantity
    /// can never be stored at zero, and decrementing a single-unit line
    /// deletes it.
    pub fn decrease_quantity(&mut self, product_id: &str, size: Option<&str>) {
        for item in &mut self.items {
            if item.matches(product_id, size) {
                item.quantity = item.quantity.saturating_sub(1);
            }
        }
        self.items.retain(|item| item.quantity > 0);
    }

    /// Remove the matching line outright. No-op if absent.
    pub fn remove(&mut self, product_id: &str, size: Option<&str>) {
        self.items.retain(|item| !item.matches(product_id, size));
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `unit_price * quantity` over all lines.
    ///
    /// Recomputed on every call; the total is never stored, so it cannot
    /// drift from the item list.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, size: Option<&str>, price: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            size: size.map(String::from),
            name: format!("Shirt {product_id}"),
            unit_price: price.parse().expect("valid decimal literal"),
            quantity,
            image: format!("{product_id}.jpg"),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    #[test]
    fn add_merges_same_identity() {
        let mut cart = Cart::new();
        cart.add(item("a", Some("M"), "10.00", 2));
        cart.add(item("a", Some("M"), "10.00", 3));
        cart.add(item("a", Some("M"), "10.00", 1));

        // Quantity equals the sum of added quantities.
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn add_keeps_sizes_separate() {
        let mut cart = Cart::new();
        cart.add(item("a", Some("M"), "10.00", 1));
        cart.add(item("a", Some("L"), "10.00", 1));
        cart.add(item("a", None, "10.00", 1));

        assert_eq!(cart.items().len(), 3);
    }

    #[test]
    fn add_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        cart.add(item("a", None, "10.00", 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        let mut cart = Cart::new();
        cart.add(item("a", None, "10.00", 2));
        cart.add(item("b", Some("S"), "4.50", 3));

        assert_eq!(cart.total(), dec("33.50"));
    }

    #[test]
    fn total_of_single_line_cart() {
        // Cart [{id:"a", price:10.00, qty:2}] has total 20.00.
        let mut cart = Cart::new();
        cart.add(item("a", None, "10.00", 2));
        assert_eq!(cart.total(), dec("20.00"));
    }

    #[test]
    fn total_recomputes_after_mutation() {
        let mut cart = Cart::new();
        cart.add(item("a", None, "10.00", 2));
        assert_eq!(cart.total(), dec("20.00"));

        cart.increase_quantity("a", None);
        assert_eq!(cart.total(), dec("30.00"));

        cart.clear();
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn increase_unknown_identity_is_noop() {
        let mut cart = Cart::new();
        cart.add(item("a", Some("M"), "10.00", 1));
        cart.increase_quantity("a", Some("L"));
        cart.increase_quantity("b", Some("M"));

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn decrease_at_one_removes_item() {
        // The chosen decrement policy: no floor at 1, the line is removed.
        let mut cart = Cart::new();
        cart.add(item("a", Some("M"), "10.00", 1));
        cart.decrease_quantity("a", Some("M"));

        assert!(cart.is_empty());
    }

    #[test]
    fn decrease_above_one_keeps_item() {
        let mut cart = Cart::new();
        cart.add(item("a", None, "10.00", 3));
        cart.decrease_quantity("a", None);

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn remove_deletes_only_matching_line() {
        let mut cart = Cart::new();
        cart.add(item("a", Some("M"), "10.00", 1));
        cart.add(item("a", Some("L"), "10.00", 1));
        cart.remove("a", Some("M"));

        assert_eq!(cart.items().len(), 1);
        let remaining = cart.items().first().expect("one line left");
        assert_eq!(remaining.size.as_deref(), Some("L"));
    }

    #[test]
    fn serde_round_trip_reproduces_items() {
        let mut cart = Cart::new();
        cart.add(item("a", Some("M"), "19.99", 2));
        cart.add(item("b", None, "4.50", 1));

        let json = serde_json::to_string(&cart).expect("serialize");
        let back: Cart = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(back, cart);
        assert_eq!(back.total(), cart.total());
    }

    #[test]
    fn serializes_as_bare_array() {
        // The session store holds a single serialized array of items.
        let mut cart = Cart::new();
        cart.add(item("a", None, "10.00", 1));

        let json = serde_json::to_value(&cart).expect("serialize");
        assert!(json.is_array());
    }
}
