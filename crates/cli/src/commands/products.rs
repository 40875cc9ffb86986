//! Product listing and mutations.
//!
//! Uses the same filter, form and sort rules as the dashboard. `list`
//! without filter flags restores the saved filters; with flags it replaces
//! them.

use clap::Args;
use producthub_core::{
    FilterKey, FilterState, Product, ProductForm, ProductId, SortColumn, SortDirection, SortState,
};
use producthub_dashboard::live::truncate_description;
use producthub_dashboard::services::{SessionToken, keys};

use super::{CliError, Client, emit};

/// Filter and sort flags for `products list`.
#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Product display id contains
    #[arg(long)]
    pub product_id: Option<String>,
    /// Name contains
    #[arg(long)]
    pub name: Option<String>,
    /// Description contains
    #[arg(long)]
    pub description: Option<String>,
    /// Category contains
    #[arg(long)]
    pub category: Option<String>,
    /// Exact status (`In Stock`, `Out of Stock`)
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub min_price: Option<String>,
    #[arg(long)]
    pub max_price: Option<String>,
    #[arg(long)]
    pub min_quantity: Option<String>,
    #[arg(long)]
    pub max_quantity: Option<String>,
    /// Forget the saved filters
    #[arg(long, conflicts_with_all = ["product_id", "name", "description", "category", "status", "min_price", "max_price", "min_quantity", "max_quantity"])]
    pub clear: bool,
    /// Sort column (`display_id`, `name`, `description`, `category`, `price`, `quantity`, `status`)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl ListArgs {
    /// Filters given on the command line, if any.
    #[must_use]
    pub fn filters(&self) -> Option<FilterState> {
        let given = [
            (FilterKey::DisplayId, &self.product_id),
            (FilterKey::Name, &self.name),
            (FilterKey::Description, &self.description),
            (FilterKey::Category, &self.category),
            (FilterKey::Status, &self.status),
            (FilterKey::MinPrice, &self.min_price),
            (FilterKey::MaxPrice, &self.max_price),
            (FilterKey::MinQuantity, &self.min_quantity),
            (FilterKey::MaxQuantity, &self.max_quantity),
        ];

        let mut filters = FilterState::new();
        let mut any = false;
        for (key, value) in given {
            if let Some(value) = value {
                filters.set(key, value.as_str());
                any = true;
            }
        }
        any.then_some(filters)
    }

    fn sort(&self) -> Result<Option<SortState>, CliError> {
        let Some(column) = &self.sort else {
            return Ok(None);
        };
        let column = column.parse::<SortColumn>().map_err(CliError::Usage)?;
        Ok(Some(SortState {
            column,
            direction: if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }))
    }
}

/// Product fields for `create` and `update`. Omitted fields keep their
/// current (or default) value.
#[derive(Debug, Default, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// Image URL
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub quantity: Option<String>,
    /// `In Stock` or `Out of Stock`
    #[arg(long)]
    pub status: Option<String>,
}

impl ProductArgs {
    /// `base` with every given field replaced.
    #[must_use]
    pub fn apply_to(self, mut base: ProductForm) -> ProductForm {
        let fields = [
            (&mut base.name, self.name),
            (&mut base.image, self.image),
            (&mut base.description, self.description),
            (&mut base.category, self.category),
            (&mut base.price, self.price),
            (&mut base.quantity, self.quantity),
            (&mut base.status, self.status),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
        base
    }
}

fn token(client: &Client) -> Result<SessionToken, CliError> {
    client.context.token().cloned().ok_or(CliError::NotLoggedIn)
}

/// The filters to list with, saving or clearing them as asked.
async fn resolve_filters(client: &Client, args: &ListArgs) -> Result<FilterState, CliError> {
    let storage = client.context.storage();

    if args.clear {
        storage.remove(keys::FILTERS).await?;
        return Ok(FilterState::new());
    }

    if let Some(filters) = args.filters() {
        storage.set(keys::FILTERS, &filters.to_json()).await?;
        return Ok(filters);
    }

    let saved = storage.get(keys::FILTERS).await?;
    Ok(match saved.as_deref().map(FilterState::from_json) {
        Some(Ok(filters)) => filters,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Ignoring unreadable saved filters");
            FilterState::new()
        }
        None => FilterState::new(),
    })
}

/// `products list`
pub async fn list(client: &Client, args: ListArgs) -> Result<(), CliError> {
    let token = token(client)?;
    let sort = args.sort()?;
    let filters = resolve_filters(client, &args).await?;

    let products = if filters.is_unconstrained() {
        client.api.list_products(&token).await?
    } else {
        tracing::debug!(query = %filters.to_query(), "Filtering products");
        client.api.filter_products(&filters, &token).await?
    };

    let mut rows: Vec<&Product> = products.iter().collect();
    if let Some(sort) = sort {
        sort.apply(&mut rows);
    }

    if rows.is_empty() {
        return emit("No products found");
    }
    for product in rows {
        emit(format_row(product))?;
    }
    emit(format_args!("{} product(s)", products.len()))
}

fn format_row(product: &Product) -> String {
    format!(
        "{:<8} {:<10} {:<24} {:<14} {:>10} {:>6}  {:<12} {}",
        product.id.map(|id| id.to_string()).unwrap_or_default(),
        product.display_id.as_deref().unwrap_or("-"),
        product.name,
        product.category,
        product.price,
        product.quantity,
        product.status,
        truncate_description(&product.description),
    )
}

/// `products create`
pub async fn create(client: &Client, args: ProductArgs) -> Result<(), CliError> {
    let token = token(client)?;
    let input = args
        .apply_to(ProductForm::default())
        .validate()
        .map_err(CliError::Invalid)?;

    let product = client.api.create_product(&input, &token).await?;
    emit("Product added successfully!")?;
    emit(format_row(&product))
}

/// `products update <id>`
///
/// Starts from the record as the server has it, so omitted fields keep
/// their current values.
pub async fn update(client: &Client, id: i64, args: ProductArgs) -> Result<(), CliError> {
    let token = token(client)?;
    let id = ProductId::new(id);

    let current = client
        .api
        .list_products(&token)
        .await?
        .into_iter()
        .find(|p| p.id == Some(id))
        .ok_or_else(|| CliError::Usage(format!("No product with id {id}")))?;

    let input = args
        .apply_to(ProductForm::from_product(&current))
        .validate()
        .map_err(CliError::Invalid)?;
    let product = current.merged_with(input);

    client.api.update_product(id, &product, &token).await?;
    emit("Product updated successfully!")?;
    emit(format_row(&product))
}

/// `products delete <id>`
pub async fn delete(client: &Client, id: i64) -> Result<(), CliError> {
    let token = token(client)?;
    let message = client.api.delete_product(ProductId::new(id), &token).await?;
    tracing::debug!(%message, "Delete confirmed");
    emit("Product deleted successfully!")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_means_restore() {
        assert!(ListArgs::default().filters().is_none());
    }

    #[test]
    fn test_range_flags_build_query() {
        let args = ListArgs {
            min_price: Some("10".to_string()),
            max_price: Some("50".to_string()),
            ..ListArgs::default()
        };
        let filters = args.filters().unwrap();
        assert_eq!(filters.to_query(), "maxPrice=50&minPrice=10");
    }

    #[test]
    fn test_empty_flag_still_replaces_saved_filters() {
        let args = ListArgs {
            name: Some(String::new()),
            ..ListArgs::default()
        };
        let filters = args.filters().unwrap();
        assert!(filters.is_unconstrained());
    }

    #[test]
    fn test_sort_flags() {
        let args = ListArgs {
            sort: Some("price".to_string()),
            desc: true,
            ..ListArgs::default()
        };
        let sort = args.sort().unwrap().unwrap();
        assert_eq!(sort.column, SortColumn::Price);
        assert_eq!(sort.direction, SortDirection::Descending);

        let bad = ListArgs {
            sort: Some("colour".to_string()),
            ..ListArgs::default()
        };
        assert!(matches!(bad.sort(), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_product_args_override_only_given_fields() {
        let base = ProductForm {
            name: "Lamp".to_string(),
            price: "10".to_string(),
            ..ProductForm::default()
        };
        let args = ProductArgs {
            price: Some("12.5".to_string()),
            ..ProductArgs::default()
        };
        let form = args.apply_to(base);
        assert_eq!(form.name, "Lamp");
        assert_eq!(form.price, "12.5");
    }

    #[test]
    fn test_invalid_create_lists_fields() {
        let errors = ProductArgs {
            name: Some("Chair".to_string()),
            ..ProductArgs::default()
        }
        .apply_to(ProductForm::default())
        .validate()
        .unwrap_err();

        let message = CliError::Invalid(errors).to_string();
        assert!(message.starts_with("Invalid input: "));
        assert!(message.contains("image: Valid image URL required"));
        assert!(!message.contains("name:"));
    }
}
