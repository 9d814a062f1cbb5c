//! Session-related constants.
//!
//! The session is the durable client-scoped store for the cart: the full
//! item list is rewritten under one key on every mutation and hydrated back
//! on the next request.

/// Session keys for client-scoped data.
pub mod keys {
    /// Key for the serialized cart (a single JSON array of items).
    pub const CART: &str = "cart";
}
