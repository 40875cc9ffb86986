//! Stock status of a product.

use serde::{Deserialize, Serialize};

/// Stock status of a product.
///
/// Serialized exactly as the catalog API spells it: `"In Stock"` or
/// `"Out of Stock"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    #[default]
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl ProductStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 2] = [Self::InStock, Self::OutOfStock];

    /// The wire and display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In Stock" => Ok(Self::InStock),
            "Out of Stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::OutOfStock).unwrap(),
            "\"Out of Stock\""
        );
        let parsed: ProductStatus = serde_json::from_str("\"In Stock\"").unwrap();
        assert_eq!(parsed, ProductStatus::InStock);
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!(serde_json::from_str::<ProductStatus>("\"Discontinued\"").is_err());
        assert!("in stock".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_status_from_str_matches_label() {
        for status in ProductStatus::ALL {
            assert_eq!(status.label().parse::<ProductStatus>().unwrap(), status);
        }
    }
}
