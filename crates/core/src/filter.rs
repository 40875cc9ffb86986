//! Product list filters.
//!
//! A [`FilterState`] is a flat map from filter-field name to the raw string
//! the user typed. Range filters are two independent keys (`minPrice` and
//! `maxPrice`, `minQuantity` and `maxQuantity`) so either bound can be edited
//! without touching the other. A missing key, or an empty value, means "no
//! constraint".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Known filter fields, named as the catalog API expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    DisplayId,
    Name,
    Description,
    Category,
    Status,
    MinPrice,
    MaxPrice,
    MinQuantity,
    MaxQuantity,
}

impl FilterKey {
    /// Every filter field, in table column order.
    pub const ALL: [Self; 9] = [
        Self::DisplayId,
        Self::Name,
        Self::Description,
        Self::Category,
        Self::MinPrice,
        Self::MaxPrice,
        Self::MinQuantity,
        Self::MaxQuantity,
        Self::Status,
    ];

    /// The wire name of this field (also the storage key).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DisplayId => "productId",
            Self::Name => "name",
            Self::Description => "description",
            Self::Category => "category",
            Self::Status => "status",
            Self::MinPrice => "minPrice",
            Self::MaxPrice => "maxPrice",
            Self::MinQuantity => "minQuantity",
            Self::MaxQuantity => "maxQuantity",
        }
    }

    /// Whether this key is one bound of a range pair.
    #[must_use]
    pub const fn is_range_bound(&self) -> bool {
        matches!(
            self,
            Self::MinPrice | Self::MaxPrice | Self::MinQuantity | Self::MaxQuantity
        )
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown filter field: {s}"))
    }
}

/// Current filter values for the product list.
///
/// Serializes as a flat JSON object of strings, the same shape that is
/// persisted in client storage. Keys this version does not know about are
/// kept as-is so a restore never drops saved data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(BTreeMap<String, String>);

impl FilterState {
    /// An empty filter set (no constraints).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, or `""` when unset.
    #[must_use]
    pub fn get(&self, key: FilterKey) -> &str {
        self.0.get(key.as_str()).map_or("", String::as_str)
    }

    /// Set `key` to `value`. Empty values are stored, not removed, so a
    /// cleared input still overwrites a previously saved value.
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        self.0.insert(key.as_str().to_string(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Whether `key` currently constrains the list.
    #[must_use]
    pub fn is_active(&self, key: FilterKey) -> bool {
        !self.get(key).is_empty()
    }

    /// Whether no field constrains the list.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.0.values().all(String::is_empty)
    }

    /// Iterate over the non-empty entries.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Build the URL query string for the filter endpoint.
    ///
    /// Pairs are form-urlencoded; empty values are omitted.
    ///
    /// ```
    /// use producthub_core::{FilterKey, FilterState};
    ///
    /// let filters = FilterState::new()
    ///     .with(FilterKey::MinPrice, "10")
    ///     .with(FilterKey::MaxPrice, "50")
    ///     .with(FilterKey::Name, "");
    /// assert_eq!(filters.to_query(), "maxPrice=50&minPrice=10");
    /// ```
    #[must_use]
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.active())
            .finish()
    }

    /// Parse a persisted filter set.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `raw` is not a flat object of strings.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize for persistence.
    #[must_use]
    pub fn to_json(&self) -> String {
        // A map of strings always serializes.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_range_query_keeps_both_bounds() {
        let filters = FilterState::new()
            .with(FilterKey::MinPrice, "10")
            .with(FilterKey::MaxPrice, "50");

        let query = filters.to_query();
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        assert!(pairs.contains(&("minPrice".to_string(), "10".to_string())));
        assert!(pairs.contains(&("maxPrice".to_string(), "50".to_string())));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_query_omits_empty_values() {
        let filters = FilterState::new()
            .with(FilterKey::Name, "")
            .with(FilterKey::Category, "Lighting")
            .with(FilterKey::Status, "");

        assert_eq!(filters.to_query(), "category=Lighting");
        assert_eq!(FilterState::new().to_query(), "");
    }

    #[test]
    fn test_query_encodes_values() {
        let filters = FilterState::new()
            .with(FilterKey::Status, "Out of Stock")
            .with(FilterKey::Name, "tea & cups");

        assert_eq!(filters.to_query(), "name=tea+%26+cups&status=Out+of+Stock");
    }

    #[test]
    fn test_min_and_max_edit_independently() {
        let mut filters = FilterState::new();
        filters.set(FilterKey::MinQuantity, "5");
        filters.set(FilterKey::MaxQuantity, "9");
        filters.set(FilterKey::MinQuantity, "");

        assert_eq!(filters.get(FilterKey::MinQuantity), "");
        assert_eq!(filters.get(FilterKey::MaxQuantity), "9");
        assert!(!filters.is_active(FilterKey::MinQuantity));
    }

    #[test]
    fn test_restore_then_save_is_stable() {
        let saved = r#"{"name":"lamp","maxPrice":"50","legacyField":"x"}"#;

        let restored = FilterState::from_json(saved).unwrap();
        let resaved = restored.to_json();
        let again = FilterState::from_json(&resaved).unwrap();

        assert_eq!(again, restored);
        assert_eq!(again.to_json(), resaved);
        assert!(resaved.contains("\"legacyField\":\"x\""));
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        assert!(FilterState::from_json("not json").is_err());
        assert!(FilterState::from_json(r#"{"minPrice": 10}"#).is_err());
    }

    #[test]
    fn test_filter_key_round_trip() {
        for key in FilterKey::ALL {
            assert_eq!(key.as_str().parse::<FilterKey>().unwrap(), key);
        }
        assert!("price".parse::<FilterKey>().is_err());
    }

    #[test]
    fn test_unconstrained() {
        assert!(FilterState::new().is_unconstrained());
        assert!(FilterState::new().with(FilterKey::Name, "").is_unconstrained());
        assert!(!FilterState::new().with(FilterKey::Name, "a").is_unconstrained());
    }
}
