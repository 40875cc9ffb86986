//! Form input and validation.
//!
//! Forms hold the raw strings a browser (or CLI) submitted. Validation turns
//! them into typed values or a [`FormErrors`] map keyed by field name, which
//! the views render inline next to each field. Invalid input never reaches
//! the API client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Email, Price, Product, ProductInput, ProductStatus};

/// Minimum description length for a product.
pub const MIN_DESCRIPTION_LENGTH: usize = 10;

/// Minimum password length for sign-in and sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// The message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether any field failed validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// Raw product fields as submitted by the create/edit modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub image: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub quantity: String,
    pub status: String,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: String::new(),
            description: String::new(),
            category: String::new(),
            price: "0".to_string(),
            quantity: "0".to_string(),
            status: ProductStatus::InStock.label().to_string(),
        }
    }
}

impl ProductForm {
    /// A form pre-filled from an existing record.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            image: product.image.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
            status: product.status.label().to_string(),
        }
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns a [`FormErrors`] with one message per invalid field.
    pub fn validate(&self) -> Result<ProductInput, FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Product name is required");
        }
        if url::Url::parse(self.image.trim()).is_err() {
            errors.add("image", "Valid image URL required");
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_LENGTH {
            errors.add("description", "Description required");
        }
        if self.category.trim().is_empty() {
            errors.add("category", "Category is required");
        }

        let price = self.price.parse::<Price>();
        if price.is_err() {
            errors.add("price", "Price is required");
        }
        let quantity = self.quantity.trim().parse::<u32>();
        if quantity.is_err() {
            errors.add("quantity", "Quantity must be at least 0");
        }
        let status = self.status.parse::<ProductStatus>();
        if status.is_err() {
            errors.add("status", "Select a valid status");
        }

        match (price, quantity, status) {
            (Ok(price), Ok(quantity), Ok(status)) => errors.into_result(|| ProductInput {
                name: self.name.trim().to_string(),
                image: self.image.trim().to_string(),
                description: self.description.trim().to_string(),
                category: self.category.trim().to_string(),
                price,
                quantity,
                status,
            }),
            _ => Err(errors),
        }
    }
}

/// What a successful modal submission asks the page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalSubmission {
    /// Create a new product.
    Create(ProductInput),
    /// Update an existing product (identifiers preserved from the original).
    Update(Product),
}

/// The create/edit product modal.
///
/// Seeded with an existing record it acts as an edit form; otherwise it is a
/// create form with default values.
#[derive(Debug, Clone, Default)]
pub struct ProductModal {
    original: Option<Product>,
    form: ProductForm,
    errors: FormErrors,
}

impl ProductModal {
    /// An empty create form.
    #[must_use]
    pub fn create() -> Self {
        Self::default()
    }

    /// An edit form seeded with `product`.
    #[must_use]
    pub fn edit(product: Product) -> Self {
        Self {
            form: ProductForm::from_product(&product),
            original: Some(product),
            errors: FormErrors::default(),
        }
    }

    /// Whether this modal edits an existing record.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    /// The record being edited.
    #[must_use]
    pub const fn original(&self) -> Option<&Product> {
        self.original.as_ref()
    }

    /// Current field values.
    #[must_use]
    pub const fn form(&self) -> &ProductForm {
        &self.form
    }

    /// Inline validation messages from the last submit.
    #[must_use]
    pub const fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Submit `form`.
    ///
    /// Valid input clears the fields and returns what to delegate; the caller
    /// closes the modal right away without waiting for the outcome. Invalid
    /// input keeps the submitted values and records the errors.
    pub fn submit(&mut self, form: ProductForm) -> Option<ModalSubmission> {
        match form.validate() {
            Ok(input) => {
                let submission = match &self.original {
                    Some(original) => ModalSubmission::Update(original.merged_with(input)),
                    None => ModalSubmission::Create(input),
                };
                self.form = ProductForm::default();
                self.errors = FormErrors::default();
                Some(submission)
            }
            Err(errors) => {
                self.form = form;
                self.errors = errors;
                None
            }
        }
    }
}

/// Raw sign-in / sign-up fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// Credentials that passed validation.
#[derive(Debug, Clone)]
pub struct ValidCredentials {
    pub email: Email,
    pub password: String,
}

impl CredentialsForm {
    /// Validate the email and password.
    ///
    /// # Errors
    ///
    /// Returns a [`FormErrors`] keyed by `email` and/or `password`.
    pub fn validate(&self) -> Result<ValidCredentials, FormErrors> {
        let mut errors = FormErrors::default();

        let email = Email::parse(self.email.trim());
        if email.is_err() {
            errors.add("email", "Invalid email");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }

        match email {
            Ok(email) => errors.into_result(|| ValidCredentials {
                email,
                password: self.password.clone(),
            }),
            Err(_) => Err(errors),
        }
    }
}
