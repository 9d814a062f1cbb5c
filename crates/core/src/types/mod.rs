//! Core types for Sevenfold.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::{MinorUnitError, to_minor_units};
pub use status::OrderStatus;
