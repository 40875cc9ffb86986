//! Product table layout.
//!
//! Describes the header row (labels, sort affordances) and the filter row
//! beneath it. Templates render whatever [`header_cells`] returns, so the
//! column order lives in one place.

use producthub_core::{FilterKey, FilterState, ProductStatus, SortColumn, SortDirection, SortState};

/// Column definition for the product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableColumn {
    /// Display label for the column header.
    pub label: &'static str,
    /// Column to sort by when the header is clicked.
    pub sort: Option<SortColumn>,
    /// Width utility class.
    pub width: &'static str,
    /// Filter shown beneath the header.
    pub filter: FilterKind,
}

impl TableColumn {
    const fn new(label: &'static str, width: &'static str, filter: FilterKind) -> Self {
        Self {
            label,
            sort: None,
            width,
            filter,
        }
    }

    const fn sortable(mut self, column: SortColumn) -> Self {
        self.sort = Some(column);
        self
    }
}

/// Kind of filter control for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Free-text input.
    Text(FilterKey),
    /// Min/max number inputs.
    Range { min: FilterKey, max: FilterKey },
    /// Status dropdown.
    Status,
    /// No filter.
    None,
}

/// Every column of the product table, in display order.
pub const COLUMNS: [TableColumn; 9] = [
    TableColumn::new("Product ID", "", FilterKind::Text(FilterKey::DisplayId))
        .sortable(SortColumn::DisplayId),
    TableColumn::new("Name", "", FilterKind::Text(FilterKey::Name)).sortable(SortColumn::Name),
    TableColumn::new("Image", "w-[100px]", FilterKind::None),
    TableColumn::new("Description", "", FilterKind::Text(FilterKey::Description))
        .sortable(SortColumn::Description),
    TableColumn::new("Category", "", FilterKind::Text(FilterKey::Category))
        .sortable(SortColumn::Category),
    TableColumn::new(
        "Price",
        "w-[180px]",
        FilterKind::Range {
            min: FilterKey::MinPrice,
            max: FilterKey::MaxPrice,
        },
    )
    .sortable(SortColumn::Price),
    TableColumn::new(
        "Quantity",
        "w-[180px]",
        FilterKind::Range {
            min: FilterKey::MinQuantity,
            max: FilterKey::MaxQuantity,
        },
    )
    .sortable(SortColumn::Quantity),
    TableColumn::new("Status", "w-[160px]", FilterKind::Status).sortable(SortColumn::Status),
    TableColumn::new("Action", "w-[80px]", FilterKind::None),
];

/// One input inside a filter control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    /// Filter key posted back to the page.
    pub key: &'static str,
    pub value: String,
    pub placeholder: &'static str,
}

impl FilterField {
    fn new(filters: &FilterState, key: FilterKey, placeholder: &'static str) -> Self {
        Self {
            key: key.as_str(),
            value: filters.get(key).to_string(),
            placeholder,
        }
    }

    /// Whether the field currently constrains the list.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.value.is_empty()
    }

    /// Whether `option` is the selected dropdown entry.
    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        self.value == option
    }
}

/// Rendered filter control for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterControl {
    kind: FilterKind,
    /// Inputs in display order (one for text/status, two for ranges).
    pub fields: Vec<FilterField>,
}

impl FilterControl {
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, FilterKind::Text(_))
    }

    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self.kind, FilterKind::Range { .. })
    }

    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self.kind, FilterKind::Status)
    }

    /// Status labels offered by the dropdown.
    #[must_use]
    pub fn status_options(&self) -> Vec<&'static str> {
        ProductStatus::ALL.iter().map(ProductStatus::label).collect()
    }
}

/// Header plus filter cell for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: &'static str,
    pub width: &'static str,
    /// Path segment for the sort endpoint, empty when not sortable.
    pub sort_key: &'static str,
    /// Arrow for the active sort column.
    pub sort_indicator: &'static str,
    pub filter: FilterControl,
}

/// Build the header cells for the current filters and sort.
#[must_use]
pub fn header_cells(filters: &FilterState, sort: Option<SortState>) -> Vec<HeaderCell> {
    COLUMNS
        .iter()
        .map(|column| {
            let fields = match column.filter {
                FilterKind::Text(key) => vec![FilterField::new(filters, key, "")],
                FilterKind::Range { min, max } => vec![
                    FilterField::new(filters, min, "Min"),
                    FilterField::new(filters, max, "Max"),
                ],
                FilterKind::Status => vec![FilterField::new(filters, FilterKey::Status, "All Status")],
                FilterKind::None => Vec::new(),
            };

            let sort_indicator = match (column.sort, sort) {
                (Some(col), Some(active)) if active.column == col => match active.direction {
                    SortDirection::Ascending => "▲",
                    SortDirection::Descending => "▼",
                },
                _ => "",
            };

            HeaderCell {
                label: column.label,
                width: column.width,
                sort_key: column.sort.map_or("", |c| c.as_str()),
                sort_indicator,
                filter: FilterControl {
                    kind: column.filter,
                    fields,
                },
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order() {
        let labels: Vec<&str> = COLUMNS.iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            [
                "Product ID",
                "Name",
                "Image",
                "Description",
                "Category",
                "Price",
                "Quantity",
                "Status",
                "Action"
            ]
        );
    }

    #[test]
    fn test_range_cells_show_both_bounds() {
        let filters = FilterState::new().with(FilterKey::MinPrice, "10");
        let cells = header_cells(&filters, None);
        let price = cells.iter().find(|c| c.label == "Price").unwrap();

        assert!(price.filter.is_range());
        let keys: Vec<&str> = price.filter.fields.iter().map(|f| f.key).collect();
        assert_eq!(keys, ["minPrice", "maxPrice"]);
        assert!(price.filter.fields.first().unwrap().is_active());
        assert!(!price.filter.fields.last().unwrap().is_active());
    }

    #[test]
    fn test_sort_indicator_on_active_column_only() {
        let sort = SortState::toggle(None, SortColumn::Quantity);
        let cells = header_cells(&FilterState::new(), Some(sort));

        let quantity = cells.iter().find(|c| c.label == "Quantity").unwrap();
        assert_eq!(quantity.sort_indicator, "▲");
        assert!(cells.iter().filter(|c| !c.sort_indicator.is_empty()).count() == 1);

        let image = cells.iter().find(|c| c.label == "Image").unwrap();
        assert_eq!(image.sort_key, "");
        assert!(image.filter.fields.is_empty());
    }

    #[test]
    fn test_status_options() {
        let cells = header_cells(&FilterState::new(), None);
        let status = cells.iter().find(|c| c.label == "Status").unwrap();
        assert!(status.filter.is_status());
        assert_eq!(status.filter.status_options(), ["In Stock", "Out of Stock"]);

        let filters = FilterState::new().with(FilterKey::Status, "Out of Stock");
        let cells = header_cells(&filters, None);
        let field = cells
            .iter()
            .find(|c| c.label == "Status")
            .and_then(|c| c.filter.fields.first())
            .unwrap();
        assert!(field.is_selected("Out of Stock"));
        assert!(!field.is_selected("In Stock"));
    }
}
