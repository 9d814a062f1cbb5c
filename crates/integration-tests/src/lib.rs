//! Integration tests for Sevenfold.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! docker compose up -d postgres
//! cargo run -p sevenfold-cli -- migrate
//!
//! # Start the storefront in development mode (unsigned webhooks)
//! STOREFRONT_ENV=development cargo run -p sevenfold-storefront
//!
//! # Run integration tests
//! cargo test -p sevenfold-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Checkout session validation, webhook delivery, and
//!   order reconciliation against a running server
//! - `cart_api` - Session-backed cart endpoints
