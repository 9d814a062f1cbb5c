//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order payment status.
///
/// An order is created `pending` when the provider checkout session is
/// created, and flipped to `paid` by the payment webhook. There are no other
/// transitions; an abandoned checkout stays `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
}

impl OrderStatus {
    /// The status as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for status in [OrderStatus::Pending, OrderStatus::Paid] {
            let parsed: OrderStatus = status.as_str().parse().expect("parse back");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn rejects_unknown() {
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Paid).expect("serialize");
        assert_eq!(json, "\"paid\"");
    }
}
