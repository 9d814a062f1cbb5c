//! Sevenfold Core - Shared types library.
//!
//! This crate provides common types used across all Sevenfold components:
//! - `storefront` - Public-facing commerce backend
//! - `cli` - Command-line tools for migrations and development
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`cart`] - The client-scoped cart model and its mutation operations
//! - [`types`] - Newtype wrappers for type-safe IDs, money, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem};
pub use types::*;
