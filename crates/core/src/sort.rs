//! Client-side column sorting for the product table.
//!
//! Sorting only affects what is displayed: callers sort a view of the rows
//! and leave the canonical list untouched, so in-place updates and deletes
//! keep their positions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Sortable table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    DisplayId,
    Name,
    Description,
    Category,
    Price,
    Quantity,
    Status,
}

impl SortColumn {
    /// Path segment used by the table header links.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DisplayId => "display_id",
            Self::Name => "name",
            Self::Description => "description",
            Self::Category => "category",
            Self::Price => "price",
            Self::Quantity => "quantity",
            Self::Status => "status",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::DisplayId => a.display_id.cmp(&b.display_id),
            Self::Name => cmp_text(&a.name, &b.name),
            Self::Description => cmp_text(&a.description, &b.description),
            Self::Category => cmp_text(&a.category, &b.category),
            Self::Price => a.price.cmp(&b.price),
            Self::Quantity => a.quantity.cmp(&b.quantity),
            Self::Status => a.status.cmp(&b.status),
        }
    }
}

impl std::str::FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "display_id" => Ok(Self::DisplayId),
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            "category" => Ok(Self::Category),
            "price" => Ok(Self::Price),
            "quantity" => Ok(Self::Quantity),
            "status" => Ok(Self::Status),
            _ => Err(format!("unknown sort column: {s}")),
        }
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Active sort for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortState {
    /// Next sort after the user clicks `column`'s header.
    ///
    /// A new column starts ascending; clicking the active column flips it.
    #[must_use]
    pub fn toggle(current: Option<Self>, column: SortColumn) -> Self {
        match current {
            Some(state) if state.column == column => Self {
                column,
                direction: match state.direction {
                    SortDirection::Ascending => SortDirection::Descending,
                    SortDirection::Descending => SortDirection::Ascending,
                },
            },
            _ => Self {
                column,
                direction: SortDirection::Ascending,
            },
        }
    }

    /// Stable-sort `rows` in place.
    pub fn apply(&self, rows: &mut [&Product]) {
        rows.sort_by(|a, b| {
            let ordering = self.column.compare(a, b);
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Product, ProductInput, ProductStatus};

    fn product(name: &str, price: &str, quantity: u32) -> Product {
        Product::from_input(ProductInput {
            name: name.to_string(),
            image: "https://images.unsplash.com/x".to_string(),
            description: "A perfectly fine product".to_string(),
            category: "General".to_string(),
            price: price.parse().unwrap(),
            quantity,
            status: ProductStatus::InStock,
        })
    }

    #[test]
    fn test_toggle_cycles_direction() {
        let first = SortState::toggle(None, SortColumn::Price);
        assert_eq!(first.direction, SortDirection::Ascending);

        let second = SortState::toggle(Some(first), SortColumn::Price);
        assert_eq!(second.direction, SortDirection::Descending);

        let other = SortState::toggle(Some(second), SortColumn::Name);
        assert_eq!(other.column, SortColumn::Name);
        assert_eq!(other.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_price_sort_is_numeric() {
        let items = [product("a", "100", 1), product("b", "9.5", 1), product("c", "20", 1)];
        let mut rows: Vec<&Product> = items.iter().collect();

        SortState::toggle(None, SortColumn::Price).apply(&mut rows);
        let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn test_descending_name_sort_ignores_case() {
        let items = [product("apple", "1", 1), product("Banana", "1", 1), product("cherry", "1", 1)];
        let mut rows: Vec<&Product> = items.iter().collect();

        SortState {
            column: SortColumn::Name,
            direction: SortDirection::Descending,
        }
        .apply(&mut rows);

        let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["cherry", "Banana", "apple"]);
    }

    #[test]
    fn test_sort_column_from_str() {
        assert_eq!("quantity".parse::<SortColumn>().unwrap(), SortColumn::Quantity);
        assert!("image".parse::<SortColumn>().is_err());
    }
}
