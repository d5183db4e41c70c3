//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use crate::domain::value_objects::{LocalizedText, Sku};
use crate::domain::events::{DomainEvent, ProductEvent};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// A named axis such as "Storage", with its options in display order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: LocalizedText,
    #[serde(default)]
    pub options: Vec<VariantOption>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOption {
    pub sku: Sku,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub price_after_discount: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub label: LocalizedText,
    #[serde(default)]
    pub color: LocalizedText,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub ram: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl VariantOption {
    /// The price a buyer pays: the discounted price when set and non-zero,
    /// otherwise the base price.
    pub fn effective_price(&self) -> Decimal {
        self.price_after_discount.filter(|d| !d.is_zero()).unwrap_or(self.price)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus { #[default] Active, Draft, Archived }

impl Product {
    pub fn create(name: LocalizedText, variants: Vec<Variant>) -> Result<Self, ProductError> {
        let now = Utc::now();
        let mut product = Self {
            id: Uuid::now_v7().to_string(), name, description: LocalizedText::Absent,
            category_id: None, variants, images: vec![], status: ProductStatus::Active,
            created_at: now, updated_at: now, events: vec![],
        };
        product.validate()?;
        product.raise_event(DomainEvent::Product(ProductEvent::Created { product_id: product.id.clone() }));
        Ok(product)
    }

    /// Finds the first option whose SKU equals `sku`, scanning variant groups
    /// and then their options in stored order.
    pub fn resolve(&self, sku: &str) -> Option<&VariantOption> {
        self.variants.iter().flat_map(|v| v.options.iter()).find(|o| o.sku == *sku)
    }

    /// The variant group holding the first option matching `sku`.
    pub fn variant_of(&self, sku: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.options.iter().any(|o| o.sku == *sku))
    }

    pub fn option_count(&self) -> usize { self.variants.iter().map(|v| v.options.len()).sum() }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.is_blank() { return Err(ProductError::MissingName); }
        if self.variants.is_empty() { return Err(ProductError::NoVariants); }
        let mut seen = HashSet::new();
        for option in self.variants.iter().flat_map(|v| v.options.iter()) {
            if !seen.insert(option.sku.as_str()) {
                return Err(ProductError::DuplicateSku(option.sku.to_string()));
            }
            if option.price.is_sign_negative() { return Err(ProductError::NegativePrice(option.sku.to_string())); }
            match option.price_after_discount {
                Some(d) if d.is_sign_negative() => return Err(ProductError::NegativePrice(option.sku.to_string())),
                Some(d) if d > option.price => return Err(ProductError::DiscountAbovePrice(option.sku.to_string())),
                _ => {}
            }
        }
        Ok(())
    }

    /// Replaces the editable fields, keeping identity and creation time.
    pub fn update(&mut self, changes: Product) -> Result<(), ProductError> {
        let mut next = changes;
        next.id = self.id.clone();
        next.created_at = self.created_at;
        next.updated_at = Utc::now();
        next.validate()?;
        next.events = std::mem::take(&mut self.events);
        *self = next;
        self.raise_event(DomainEvent::Product(ProductEvent::Updated { product_id: self.id.clone() }));
        Ok(())
    }

    pub fn archive(&mut self) {
        self.status = ProductStatus::Archived;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Archived { product_id: self.id.clone() }));
    }

    pub fn is_active(&self) -> bool { self.status == ProductStatus::Active }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProductError {
    #[error("Product name is required")]
    MissingName,
    #[error("Product needs at least one variant group")]
    NoVariants,
    #[error("Duplicate SKU {0} within product")]
    DuplicateSku(String),
    #[error("Negative price on SKU {0}")]
    NegativePrice(String),
    #[error("Discounted price above base price on SKU {0}")]
    DiscountAbovePrice(String),
}

impl From<ProductError> for crate::ShopError {
    fn from(e: ProductError) -> Self { crate::ShopError::Validation(e.to_string()) }
}
