//! Catalog product records.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, ProductStatus};

/// A catalog product as exchanged with the API.
///
/// Both identifiers are assigned by the server: `id` is the numeric key used
/// in URLs, `display_id` is the human-facing code shown in the table
/// (`productId` on the wire). Records built on the client before creation
/// carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(rename = "productId", default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub quantity: u32,
    pub status: ProductStatus,
}

impl Product {
    /// Build an unsaved record from create input.
    #[must_use]
    pub fn from_input(input: ProductInput) -> Self {
        Self {
            id: None,
            display_id: None,
            name: input.name,
            image: input.image,
            description: input.description,
            category: input.category,
            price: input.price,
            quantity: input.quantity,
            status: input.status,
        }
    }

    /// Overwrite the editable fields, keeping both identifiers.
    #[must_use]
    pub fn merged_with(&self, input: ProductInput) -> Self {
        Self {
            id: self.id,
            display_id: self.display_id.clone(),
            ..Self::from_input(input)
        }
    }

    /// The editable fields of this record.
    #[must_use]
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            name: self.name.clone(),
            image: self.image.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            quantity: self.quantity,
            status: self.status,
        }
    }
}

/// Fields submitted when creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub image: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub quantity: u32,
    pub status: ProductStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "Desk Lamp".to_string(),
            image: "https://images.unsplash.com/lamp.jpg".to_string(),
            description: "Warm light for late nights".to_string(),
            category: "Lighting".to_string(),
            price: "24.50".parse().unwrap(),
            quantity: 12,
            status: ProductStatus::InStock,
        }
    }

    #[test]
    fn test_deserialize_server_record() {
        let json = r#"{
            "id": 7,
            "productId": "PRD-0007",
            "name": "Desk Lamp",
            "image": "https://images.unsplash.com/lamp.jpg",
            "description": "Warm light for late nights",
            "category": "Lighting",
            "price": 24.5,
            "quantity": 12,
            "status": "In Stock"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, Some(ProductId::new(7)));
        assert_eq!(product.display_id.as_deref(), Some("PRD-0007"));
        assert_eq!(product.price.to_string(), "24.5");
    }

    #[test]
    fn test_unsaved_record_omits_identifiers() {
        let product = Product::from_input(input());
        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("productId").is_none());
        assert_eq!(value["status"], "In Stock");
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let json = r#"{"name":"x","image":"https://a.b/c","description":"0123456789",
            "category":"c","price":1,"quantity":-1,"status":"In Stock"}"#;
        assert!(serde_json::from_str::<ProductInput>(json).is_err());
    }

    #[test]
    fn test_merge_preserves_identifiers() {
        let mut original = Product::from_input(input());
        original.id = Some(ProductId::new(7));
        original.display_id = Some("PRD-0007".to_string());

        let mut changed = input();
        changed.name = "Floor Lamp".to_string();
        changed.quantity = 0;

        let merged = original.merged_with(changed);
        assert_eq!(merged.id, Some(ProductId::new(7)));
        assert_eq!(merged.display_id.as_deref(), Some("PRD-0007"));
        assert_eq!(merged.name, "Floor Lamp");
        assert_eq!(merged.quantity, 0);
    }
}
