//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use producthub_core::ProductStatus;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// CSS classes for a product status badge.
///
/// Usage in templates: `{{ product.status|status_badge }}`
#[askama::filter_fn]
pub fn status_badge(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(badge_class(&value.to_string()))
}

fn badge_class(label: &str) -> &'static str {
    match label.parse::<ProductStatus>() {
        Ok(ProductStatus::InStock) => "bg-green-100 text-green-700",
        Ok(ProductStatus::OutOfStock) => "bg-red-100 text-red-700",
        Err(_) => "bg-gray-100 text-gray-700",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_class() {
        assert_eq!(badge_class("In Stock"), "bg-green-100 text-green-700");
        assert_eq!(badge_class("Out of Stock"), "bg-red-100 text-red-700");
        assert_eq!(badge_class("Discontinued"), "bg-gray-100 text-gray-700");
    }
}
