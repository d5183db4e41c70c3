//! Application services: load documents, run domain operations, persist, publish.

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod order;

pub use analytics::{AnalyticsService, AnalyticsSummary};
pub use cart::{AddItemRequest, CartService, CartView, PriceFixReport, UpdateItemRequest};
pub use catalog::{CatalogService, ProductSummary};
pub use order::{CheckoutRequest, OrderService, OrderView};

use std::collections::HashMap;
use crate::domain::aggregates::Product;
use crate::pricing::PricedLine;
use crate::store::Stores;
use crate::Result;

/// Products referenced by `lines`, keyed by id. Missing products are simply absent.
pub(crate) async fn product_index<L: PricedLine>(stores: &Stores, lines: &[L]) -> Result<HashMap<String, Product>> {
    let mut ids: Vec<String> = lines.iter().map(|l| l.product_id().to_string()).collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() { return Ok(HashMap::new()); }
    let products = stores.products.find_many(&ids).await?;
    Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
}
