use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use crate::domain::aggregates::{PriceCorrection, Product, Variant, VariantOption};
use crate::domain::value_objects::{Lang, Sku};
use super::{aggregate, reconcile, PricedLine, Totals};

/// Line shape returned to the dashboard.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedItem {
    pub product_id: String,
    pub name: String,
    pub sku: Sku,
    pub quantity: u32,
    pub notes: Option<String>,
    pub price: Decimal,
    pub total_price: Decimal,
    pub variant: Option<VariantView>,
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantView {
    pub label: String,
    pub color: String,
    pub color_hex: Option<String>,
    pub storage: Option<String>,
    pub ram: Option<String>,
    pub stock: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

impl VariantView {
    fn new(group: Option<&Variant>, option: &VariantOption, lang: Lang) -> Self {
        Self {
            label: option.label.localize(lang),
            color: option.color.localize(lang),
            color_hex: option.color_hex.clone(),
            storage: option.storage.clone(),
            ram: option.ram.clone(),
            stock: option.stock,
            kind: group.map(|g| g.name.localize(lang)).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnrichedLines {
    pub items: Vec<EnrichedItem>,
    /// Prices derived from variant options for lines stored without one.
    pub corrections: Vec<PriceCorrection>,
}

impl EnrichedLines {
    pub fn totals(&self, discount_percent: Decimal) -> Totals {
        aggregate(self.items.iter().map(|i| (i.price, i.quantity)), discount_percent)
    }
}

/// Resolves, reconciles and localizes every line. Lines whose product is
/// missing keep their stored price (or zero) and carry no variant.
pub fn enrich_lines<L: PricedLine>(lines: &[L], products: &HashMap<String, Product>, lang: Lang) -> EnrichedLines {
    let mut out = EnrichedLines::default();
    for line in lines {
        let product = products.get(line.product_id());
        let option = product.and_then(|p| p.resolve(line.sku().as_str()));
        let reconciled = reconcile(line, option);
        if reconciled.was_corrected {
            out.corrections.push(PriceCorrection {
                product_id: line.product_id().to_string(),
                sku: line.sku().clone(),
                price: reconciled.price,
            });
        }
        let quantity = line.quantity().value();
        let images = match (option, product) {
            (Some(o), _) if !o.images.is_empty() => o.images.clone(),
            (_, Some(p)) => p.images.clone(),
            _ => vec![],
        };
        out.items.push(EnrichedItem {
            product_id: line.product_id().to_string(),
            name: product.map(|p| p.name.localize(lang)).unwrap_or_default(),
            sku: line.sku().clone(),
            quantity,
            notes: line.notes().map(str::to_string),
            price: reconciled.price,
            total_price: reconciled.price * Decimal::from(quantity),
            variant: option.map(|o| VariantView::new(product.and_then(|p| p.variant_of(o.sku.as_str())), o, lang)),
            images,
        });
    }
    out
}
